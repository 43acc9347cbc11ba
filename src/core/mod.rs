//! # Core Module
//!
//! Concurrency primitives shared by the world and its background updater.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource behind a single
//!   exclusive lock
//!
//! ## Usage
//! ```rust
//! use voxel_streaming::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.lock() += 1;
//! assert_eq!(*counter.lock(), 1);
//! ```

pub mod mt_resource;

pub use mt_resource::MtResource;
