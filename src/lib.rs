//! Local note repository library
//!
//! Notes are plain `.md` files in one directory. Their derived metadata
//! (titles, tags, timestamps, word and character counts) is cached in small
//! JSON documents next to a trash area, so that listing, searching, tagging,
//! pinning and trashing never rescan the filesystem.

mod cli;
mod config;
mod dates;
mod editor;
mod errors;
mod helper;
mod lock;
mod note;
mod pins;
mod query;
mod storage;
mod tags;
mod templates;
mod trash;
mod types;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use dates::*;
pub use editor::*;
pub use errors::*;
pub use helper::*;
pub use lock::*;
pub use note::*;
pub use pins::*;
pub use query::*;
pub use storage::*;
pub use tags::*;
pub use types::*;
