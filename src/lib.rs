//! `magdriver` library crate.
//!
//! Turns a magnetic-inversion driver file and the files it references into
//! resolved inversion inputs. The binary (`magdriver`) is a thin wrapper
//! around this library so that:
//!
//! - parsing and resolution are testable without spawning processes
//! - the derived-property graph can be embedded in other tools

pub mod app;
pub mod cli;
pub mod domain;
pub mod driver;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod mesh;
pub mod report;
