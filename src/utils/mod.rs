//! Common utilities and helpers

pub mod logging;
pub mod media_files;
