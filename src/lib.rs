//! ConcatX Library
//!
//! Plans and runs ffmpeg concatenations. The planner validates an ordered
//! list of media items, picks the concat demuxer when all video streams are
//! stream-copy compatible (the concat filter otherwise) and builds the
//! argument vector together with the scratch files it refers to.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod error;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{
    ConcatRequest, ConcatStrategy, Concatenable, ItemState, MediaItem, TimeSpec, Timebase,
    VideoStreamDescriptor,
};
pub use error::ConcatXError;
pub use planner::{ConcatPlan, ConcatPlanner};
