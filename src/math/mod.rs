//! Mathematical utilities: direction conventions.

pub mod direction;

pub use direction::*;
