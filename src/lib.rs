//! Build and validate component packages with the `xamarin-component` tool.
//!
//! Layers:
//! - [`domain`]: package parameters and command-line serialization (pure)
//! - [`application`]: pack/validate orchestration and manifests
//! - [`infrastructure`]: process, filesystem and tool discovery
//! - [`cli`]: argument parsing and command dispatch
//!
//! ```no_run
//! use xampack::config::Settings;
//! use xampack::infrastructure::di::ServiceContainer;
//!
//! let container = ServiceContainer::new(Settings::default());
//! let service = container.packaging_service();
//! service.pack(|p| {
//!     p.with_package_name("Acme")
//!         .with_icon("icons/acme_128x128.png")
//!         .with_library("ios", "bin/ios/Acme.dll")
//! })?;
//! service.validate(|p| p.with_package_name("Acme"))?;
//! # Ok::<(), xampack::application::ApplicationError>(())
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
