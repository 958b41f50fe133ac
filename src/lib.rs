pub mod cli;
pub mod config;
pub mod logging;

// Core engine and its boundaries.
pub mod client;
pub mod retry;
pub mod source;
