//! Output module for reporting on indexed data
//!
//! This module handles:
//! - Loading per-group statistics from storage
//! - Printing them for the `--stats` mode

pub mod stats;

pub use stats::{load_statistics, print_statistics, GroupStatistics, IndexStatistics};
