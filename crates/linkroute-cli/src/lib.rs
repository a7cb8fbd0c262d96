//! Link routing CLI library.
//!
//! This crate provides the command-line utilities around the routing
//! library: terminal styling and output formatting of route summaries.

pub mod output;
pub mod terminal;
