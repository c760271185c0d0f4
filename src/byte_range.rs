use std::fmt;

use crate::error::{FetchError, Result};

/// A span of object bytes to request. Offsets are those the operator passed,
/// so a bounded range's `end` is exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteRange {
    Bounded { start: u64, end: u64 },
    From { start: u64 },
}

impl ByteRange {
    /// Build a range from raw offsets. A negative `end` means "through the end
    /// of the object", `end == start` is an empty range.
    pub fn new(start: i64, end: i64) -> Result<Self> {
        let start = u64::try_from(start).map_err(|_| {
            FetchError::ConfigValidation(format!("start must not be negative, got {}", start))
        })?;
        if end < 0 {
            return Ok(ByteRange::From { start });
        }
        let end = end as u64;
        if end < start {
            return Err(FetchError::ConfigValidation(format!(
                "end ({}) must not be less than start ({})",
                end, start
            )));
        }
        Ok(ByteRange::Bounded { start, end })
    }

    pub fn start(&self) -> u64 {
        match *self {
            ByteRange::Bounded { start, .. } | ByteRange::From { start } => start,
        }
    }

    /// Number of bytes requested, `None` when open-ended.
    pub fn expected_len(&self) -> Option<u64> {
        match *self {
            ByteRange::Bounded { start, end } => Some(end - start),
            ByteRange::From { .. } => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expected_len() == Some(0)
    }

    /// Value for the HTTP `Range` header. HTTP ranges are inclusive on both
    /// ends, hence `end - 1`. An empty range has no header form.
    pub fn header_value(&self) -> Option<String> {
        match *self {
            ByteRange::Bounded { start, end } if end > start => {
                Some(format!("bytes={}-{}", start, end - 1))
            }
            ByteRange::Bounded { .. } => None,
            ByteRange::From { start } => Some(format!("bytes={}-", start)),
        }
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ByteRange::Bounded { start, end } => write!(f, "{}-{}", start, end),
            ByteRange::From { start } => write!(f, "{}-", start),
        }
    }
}
