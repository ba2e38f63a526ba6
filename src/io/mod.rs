//! Input/output helpers.
//!
//! - line decoding for driver files (`line`)
//! - the 13-line driver grammar (`driver`)
//! - observation read/write (`observations`)
//! - JSON/CSV exports of assembled inputs (`export`)

pub mod driver;
pub mod export;
pub mod line;
pub mod observations;

pub use driver::*;
pub use export::*;
pub use observations::*;
