//! # lootdata
//!
//! Command-line front end for `lootdata-core`: configuration, table
//! fetching, whole-file output writes and exit status.

pub mod cli;
pub mod config;
pub mod fetch;
