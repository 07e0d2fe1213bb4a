use crate::foundation::error::{RaceError, RaceResult};

/// Championship season, as written in the input table.
pub type Year = i32;

/// 0-based index of a frame in the assembled video.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Inclusive `[first, last]` range of seasons covered by the race.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct YearSpan {
    pub first: Year,
    pub last: Year,
}

impl YearSpan {
    pub fn new(first: Year, last: Year) -> RaceResult<Self> {
        if first > last {
            return Err(RaceError::validation("YearSpan first must be <= last"));
        }
        Ok(Self { first, last })
    }

    /// Number of seasons (and therefore rendered frames) in the span.
    pub fn len_years(self) -> u64 {
        (i64::from(self.last) - i64::from(self.first) + 1) as u64
    }

    pub fn years(self) -> impl Iterator<Item = Year> {
        self.first..=self.last
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> RaceResult<Self> {
        if den == 0 {
            return Err(RaceError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(RaceError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }
}

/// Pixel dimensions of a chart or video frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> RaceResult<Self> {
        if width == 0 || height == 0 {
            return Err(RaceError::validation("canvas width/height must be non-zero"));
        }
        Ok(Self { width, height })
    }
}
