//! Common utilities and shared types for verdant.
//!
//! This crate provides foundational components used across all verdant
//! crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Pagination**: Cursor-free `first`/`offset` windows via [`Page`]
//! - **Storage**: Local file storage for uploaded media
//!
//! # Example
//!
//! ```no_run
//! use verdant_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {id}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod page;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use page::Page;
pub use storage::{LocalStorage, StorageBackend};
