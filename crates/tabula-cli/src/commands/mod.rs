//! CLI command implementations
//!
//! Commands are organized by direction:
//! - `core` - Shared utilities (settings, format names, output)
//! - `import` - Source file to normalized JSON
//! - `export` - Normalized JSON dataset to a native table

pub mod core;
pub mod export;
pub mod import;

// Re-export command functions for main.rs
pub use self::core::*;
pub use export::*;
pub use import::*;
