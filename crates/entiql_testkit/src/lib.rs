//! # EntiQL Testkit
//!
//! Test utilities for EntiQL.
//!
//! This crate provides:
//! - A sample `User` entity, its managed table and scripted result sets
//! - Property-based test generators using proptest
//! - Dialect render vectors shared as JSON
//!
//! ## Usage
//!
//! ```rust
//! use entiql_testkit::prelude::*;
//!
//! let fixture = UserFixture::new(Config::default());
//! fixture.serve_all();
//! let users = fixture.manager.stream().to_vec().unwrap();
//! assert_eq!(users.len(), sample_users().len());
//! assert_eq!(fixture.journal.open_resources(), 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::vectors::*;
    pub use entiql_core::Config;
}

pub use fixtures::*;
pub use generators::*;
pub use vectors::*;
