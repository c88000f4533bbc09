pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod git;
pub mod logging;
pub mod model;
pub mod report;
pub mod stats;
