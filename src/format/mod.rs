//! Reading and writing the editor's on-disk files.
//!
//! - [`annotations`]: per-image `.txt` box files
//! - [`classes`]: class-name files (mapping or plain text)

pub mod annotations;
pub mod classes;
mod error;

pub use error::FormatError;

#[cfg(test)]
mod tests;
