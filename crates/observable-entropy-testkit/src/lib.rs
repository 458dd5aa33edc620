//! # Observable Entropy Testkit
//!
//! Testing utilities for Observable Entropy.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Canonical JSON bytes, hashes and signatures pinned for fixed inputs
//! - **Generators**: Proptest strategies for JSON values, documents and keys
//! - **Fixtures**: Signers with an in-memory key registry
//!
//! ## Golden Vectors
//!
//! ```rust
//! use observable_entropy_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, detail) in verify_all_vectors() {
//!     assert!(matches, "{}: {}", name, detail);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use observable_entropy_testkit::generators::{artifact_from_params, ArtifactParams};
//!
//! proptest! {
//!     #[test]
//!     fn hash_is_deterministic(params: ArtifactParams) {
//!         let a1 = artifact_from_params(&params).unwrap();
//!         let a2 = artifact_from_params(&params).unwrap();
//!         prop_assert_eq!(a1.hash, a2.hash);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use observable_entropy_testkit::fixtures::{scenario_doc, TestFixture};
//!
//! let fixture = TestFixture::with_seed([0x42; 32]);
//! let artifact = fixture.sign(&scenario_doc()).unwrap();
//! assert_eq!(fixture.handle().as_str(), "3097e2de");
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{init_tracing, multi_party_fixtures, populate, scenario_doc, TestFixture};
pub use generators::{artifact_from_params, ArtifactParams};
pub use vectors::{all_vectors, signing_vectors, verify_all_vectors, GoldenVector, SigningVector};
