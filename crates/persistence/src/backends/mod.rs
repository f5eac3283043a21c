//! Search engine implementations.
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | Memory | always | In-process engine for development and tests |
//! | Elasticsearch | `elasticsearch` | Cluster-backed engine over the official client |

pub mod memory;

#[cfg(feature = "elasticsearch")]
pub mod elasticsearch;
