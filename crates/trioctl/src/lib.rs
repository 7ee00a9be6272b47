//! Trioctl library - exposes modules for testing

pub mod cli;
pub mod errors;
pub mod input;
pub mod logging;
pub mod output;
