// Domain rules - Business logic and policies

use std::path::Path;

use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Smallest number of items that makes a concatenation meaningful
pub const MIN_CONCAT_ITEMS: usize = 2;

/// Message shown when the request has too few items
pub const TOO_FEW_ITEMS_MESSAGE: &str = "At least two items are required for concatenation.";

/// Message shown when an item is not ready
pub const ITEMS_NOT_READY_MESSAGE: &str =
    "Concatenation cancelled! Some items are invalid or are still being processed.";

/// Stream-copy compatibility between two video streams
pub struct StreamCompatibility;

impl StreamCompatibility {
    /// True when the concat demuxer can join the two streams without re-encoding.
    ///
    /// Only width, height, codec tag, TBN, TBC and TBR take part.
    pub fn matches(a: &VideoStreamDescriptor, b: &VideoStreamDescriptor) -> bool {
        a.width == b.width
            && a.height == b.height
            && a.codec_tag == b.codec_tag
            && a.tbn == b.tbn
            && a.tbc == b.tbc
            && a.tbr == b.tbr
    }
}

/// Request-level validation performed before anything touches the disk
pub struct RequestValidator;

impl RequestValidator {
    /// Check item count and readiness, returning the aggregate duration.
    ///
    /// Every item is inspected in a single pass; the first item that is not
    /// valid fails the whole request.
    pub fn validate<I: Concatenable>(items: &[I]) -> Result<TimeSpec, DomainError> {
        if items.len() < MIN_CONCAT_ITEMS {
            return Err(DomainError::ValidationFailed(TOO_FEW_ITEMS_MESSAGE.to_string()));
        }

        let mut total = TimeSpec::zero();
        for (position, item) in items.iter().enumerate() {
            if item.state() != ItemState::Valid {
                debug!(
                    position,
                    path = %item.path().display(),
                    state = %item.state(),
                    "Item is not ready for concatenation"
                );
                return Err(DomainError::ValidationFailed(ITEMS_NOT_READY_MESSAGE.to_string()));
            }
            total = total + item.duration();
        }

        Ok(total)
    }

    /// Reject item paths that contain a line break.
    ///
    /// The concat manifest holds one path per line, so such a path would
    /// split into several entries.
    pub fn check_paths<I: Concatenable>(items: &[I]) -> Result<(), DomainError> {
        match items.iter().find(|item| !is_single_line(item.path())) {
            Some(item) => Err(DomainError::BadArgs(format!(
                "Path contains a line break: {:?}",
                item.path()
            ))),
            None => Ok(()),
        }
    }
}

/// True when `path` has no `\n` or `\r` in it
pub fn is_single_line(path: &Path) -> bool {
    !path.to_string_lossy().contains(['\n', '\r'])
}

/// Location of the first stream that disagrees with the reference stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamMismatch {
    /// Position of the offending item in the request
    pub item: usize,
    /// Position of the offending stream among that item's video streams
    pub stream: usize,
}

/// Outcome of the strategy scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyDecision {
    pub strategy: ConcatStrategy,
    /// Set when the filter path was chosen
    pub mismatch: Option<StreamMismatch>,
}

/// Picks the cheapest strategy that can join the given items
pub struct StrategySelector;

impl StrategySelector {
    /// Scan every video stream of every item in request order.
    ///
    /// The first stream seen is the reference; the scan stops at the first
    /// stream that does not match it and selects the filter path. With no
    /// mismatch (including zero or one stream overall) the demuxer is used.
    pub fn select<I: Concatenable>(items: &[I]) -> StrategyDecision {
        let mut reference: Option<&VideoStreamDescriptor> = None;

        for (item_index, item) in items.iter().enumerate() {
            for (stream_index, stream) in item.video_streams().iter().enumerate() {
                let Some(first) = reference else {
                    reference = Some(stream);
                    continue;
                };

                if !StreamCompatibility::matches(first, stream) {
                    debug!(
                        item = item_index,
                        stream = stream_index,
                        "Video stream differs from the first one, falling back to the concat filter"
                    );
                    return StrategyDecision {
                        strategy: ConcatStrategy::Filter,
                        mismatch: Some(StreamMismatch {
                            item: item_index,
                            stream: stream_index,
                        }),
                    };
                }
            }
        }

        StrategyDecision {
            strategy: ConcatStrategy::Demuxer,
            mismatch: None,
        }
    }
}

#[cfg(test)]
mod tests;
