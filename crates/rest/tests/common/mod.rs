//! Common test utilities for REST API testing.
//!
//! - [`harness`] - Test servers over the in-memory engine and a failing engine
//! - [`assertions`] - HTTP response assertions

#![allow(dead_code)]

pub mod assertions;
pub mod harness;
