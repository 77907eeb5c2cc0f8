//! groupfold-cli: command-line front end for grouped time series splits.
//!
//! Reads a headed CSV file, takes group labels from one of its columns,
//! and prints the train/test splits (or just their geometry) as text or
//! JSON. A `downcast` command previews numeric column narrowing.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod report;
