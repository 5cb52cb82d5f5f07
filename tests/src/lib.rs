//! # Component Loader Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Recording components and tree builders
//! └── integration/      # End-to-end scenarios against MemoryTree
//!     ├── lifecycle.rs  # scan / construct / destroy
//!     ├── mediator.rs   # publish / subscribe between components
//!     ├── rendering.rs  # deferred render and notify_all
//!     ├── invocation.rs # key lookup and method paths
//!     └── properties.rs # proptest: idempotence and dedup
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cl-tests
//! cargo test -p cl-tests integration::properties::
//! ```

pub mod fixtures;
pub mod integration;
