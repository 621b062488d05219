//! 1-based inclusive frame ranges

use std::fmt;

use crate::error::{DenoiseError, Result};

/// Frames `start..=end`, numbered from 1 like the source timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRange {
    start: u32,
    end: u32,
}

impl FrameRange {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start == 0 {
            return Err(DenoiseError::InvalidRange {
                start,
                end,
                reason: "frame numbers start at 1".to_string(),
            });
        }
        if end < start {
            return Err(DenoiseError::InvalidRange {
                start,
                end,
                reason: "end frame is before start frame".to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn contains(&self, frame: u32) -> bool {
        (self.start..=self.end).contains(&frame)
    }

    /// Intersect with the frames `first..=last` actually present.
    ///
    /// A range that overhangs the sequence is clipped with a warning; one that
    /// misses it entirely is an error.
    pub fn resolve(&self, first: u32, last: u32) -> Result<Self> {
        if self.end < first || self.start > last {
            return Err(DenoiseError::InvalidRange {
                start: self.start,
                end: self.end,
                reason: format!("input only contains frames {}-{}", first, last),
            });
        }
        let resolved = Self {
            start: self.start.max(first),
            end: self.end.min(last),
        };
        if resolved != *self {
            tracing::warn!(
                "Frame range {} exceeds available frames {}-{}, processing {}",
                self,
                first,
                last,
                resolved
            );
        }
        Ok(resolved)
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
