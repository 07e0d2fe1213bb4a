use std::path::{Path, PathBuf};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, Year};
use crate::foundation::error::{RaceError, RaceResult};
use crate::render::frame::FrameRGBA;

/// File-name prefix shared by every rendered chart frame.
pub const FRAME_PREFIX: &str = "chart_";

pub fn frame_file_name(year: Year) -> String {
    format!("{FRAME_PREFIX}{year}.png")
}

pub fn frame_path(dir: &Path, year: Year) -> PathBuf {
    dir.join(frame_file_name(year))
}

/// Options for turning chart frames into a video.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssembleOpts {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Times the last frame is shown in total (1 = no hold).
    pub final_hold_frames: u32,
}

impl AssembleOpts {
    pub fn validate(&self) -> RaceResult<()> {
        if self.final_hold_frames == 0 {
            return Err(RaceError::validation("final_hold_frames must be >= 1"));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        if self.width == 0 || self.height == 0 {
            return Err(RaceError::validation("video width/height must be non-zero"));
        }
        Ok(())
    }

    /// Video frame count for `source_frames` inputs.
    pub fn video_frame_count(&self, source_frames: usize) -> u64 {
        if source_frames == 0 {
            return 0;
        }
        source_frames as u64 + u64::from(self.final_hold_frames.saturating_sub(1))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssembleStats {
    pub source_frames: usize,
    pub video_frames: u64,
}

/// Chart frames in `dir`, ordered by the year in their file name.
///
/// Names that do not parse as a year sort after the ones that do, by name.
pub fn collect_frame_paths(dir: &Path) -> RaceResult<Vec<PathBuf>> {
    let rd = std::fs::read_dir(dir).map_err(|e| {
        RaceError::Io(std::io::Error::new(
            e.kind(),
            format!("read frame directory '{}': {e}", dir.display()),
        ))
    })?;

    let mut frames: Vec<(Option<i64>, String, PathBuf)> = Vec::new();
    for entry in rd {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(suffix) = stem.strip_prefix(FRAME_PREFIX) else {
            continue;
        };
        if !is_png {
            continue;
        }
        let year = suffix.parse::<i64>().ok();
        let name = stem.to_owned();
        frames.push((year, name, path));
    }

    if frames.is_empty() {
        return Err(RaceError::not_found(format!(
            "no chart frames ({FRAME_PREFIX}*.png) found in '{}'",
            dir.display()
        )));
    }

    frames.sort_by(|a, b| {
        (a.0.is_none(), a.0, &a.1).cmp(&(b.0.is_none(), b.0, &b.1))
    });
    Ok(frames.into_iter().map(|(_, _, p)| p).collect())
}

/// Resize every frame in `paths` and push it to `sink`, then repeat the last one to hold it.
#[tracing::instrument(skip_all, fields(frames = paths.len()))]
pub fn assemble_frames(
    paths: &[PathBuf],
    opts: &AssembleOpts,
    sink: &mut dyn FrameSink,
) -> RaceResult<AssembleStats> {
    opts.validate()?;
    if paths.is_empty() {
        return Err(RaceError::not_found("no chart frames to assemble"));
    }

    let expected = opts.video_frame_count(paths.len());
    tracing::info!(
        video_frames = expected,
        seconds = opts.fps.frames_to_secs(expected),
        "assembling video"
    );

    sink.begin(SinkConfig {
        width: opts.width,
        height: opts.height,
        fps: opts.fps,
    })?;

    let mut idx = 0u64;
    let mut last: Option<FrameRGBA> = None;
    for path in paths {
        let frame = FrameRGBA::load(path)?.resized(opts.width, opts.height)?;
        sink.push_frame(FrameIndex(idx), &frame)?;
        idx += 1;
        last = Some(frame);
    }

    if let Some(frame) = last.as_ref() {
        for _ in 1..opts.final_hold_frames {
            sink.push_frame(FrameIndex(idx), frame)?;
            idx += 1;
        }
    }

    sink.end()?;
    tracing::info!(video_frames = idx, "assembled video frames");
    Ok(AssembleStats {
        source_frames: paths.len(),
        video_frames: idx,
    })
}

/// [`collect_frame_paths`] followed by [`assemble_frames`].
pub fn assemble_dir(
    dir: &Path,
    opts: &AssembleOpts,
    sink: &mut dyn FrameSink,
) -> RaceResult<AssembleStats> {
    let paths = collect_frame_paths(dir)?;
    assemble_frames(&paths, opts, sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_names_are_year_based() {
        assert_eq!(frame_file_name(1999), "chart_1999.png");
        assert_eq!(
            frame_path(Path::new("charts"), 2024),
            PathBuf::from("charts/chart_2024.png")
        );
    }

    #[test]
    fn frame_count_includes_hold() {
        let opts = AssembleOpts {
            width: 4,
            height: 4,
            fps: Fps { num: 1, den: 1 },
            final_hold_frames: 20,
        };
        assert_eq!(opts.video_frame_count(3), 22);
        assert_eq!(opts.video_frame_count(0), 0);
        assert!(
            AssembleOpts {
                final_hold_frames: 0,
                ..opts
            }
            .validate()
            .is_err()
        );
    }
}
