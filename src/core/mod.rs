//! # Core Module
//!
//! Concurrency and memory primitives shared by the rest of the crate.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking,
//!   used as the chunk handle passed between the render thread and workers
//! - `memory`: Named byte counters for allocation diagnostics

pub mod memory;
pub mod mt_resource;

pub use mt_resource::MtResource;
