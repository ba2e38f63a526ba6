//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the decoded driver configuration (`ConfigRecord` and its tagged fields)
//! - the survey produced by the observation parser (`SurveyRecord`)
//! - cell index sets shared by the derived-property graph

pub mod types;

pub use types::*;
