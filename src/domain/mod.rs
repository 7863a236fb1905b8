//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod command_line;
pub mod entities;
pub mod error;

pub use command_line::build_command_line;
pub use entities::*;
pub use error::{DomainError, DomainResult};
