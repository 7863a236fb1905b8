//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, ProcessRunner, etc.)
//! but are themselves concrete structs, not traits.

mod packaging;

pub use packaging::PackagingService;
