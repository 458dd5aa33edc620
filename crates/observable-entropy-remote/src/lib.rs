//! # Observable Entropy Remote
//!
//! Clients for the two external services the verifier talks to: the key
//! registry and the artifact endpoint.
//!
//! ## Key Types
//!
//! - [`KeyRegistry`] - Handle to key record lookup
//! - [`ArtifactSource`] - Fetch latest or hash-addressed artifacts
//! - [`HttpKeyRegistry`] / [`HttpArtifactSource`] - reqwest implementations
//! - [`memory`] - In-memory implementations for tests

pub mod artifacts;
pub mod error;
pub mod http;
pub mod memory;
pub mod registry;

pub use artifacts::{parse_base_url, resource_url, ArtifactSource};
pub use error::{RemoteError, Result};
pub use http::{HttpArtifactSource, HttpKeyRegistry, HttpRemoteConfig};
pub use memory::{MemoryArtifactSource, MemoryKeyRegistry};
pub use registry::KeyRegistry;
