//! Shared data models.

mod category;

pub use category::ClassNames;
