//! Common utilities and shared types for racehub.
//!
//! This crate provides foundational components used across all racehub crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Media**: Cloudinary delivery URLs for race images via [`ImageFormatter`]
//!
//! # Example
//!
//! ```no_run
//! use racehub_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod media;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use media::ImageFormatter;
