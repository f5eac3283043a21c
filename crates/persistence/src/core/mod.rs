//! Core engine abstraction.
//!
//! The gateway never talks to a concrete client. It holds an injected
//! [`SearchEngine`], which makes every backend (the Elasticsearch client, the
//! in-memory engine, or a recording stub in tests) interchangeable.

mod engine;

pub use engine::SearchEngine;
