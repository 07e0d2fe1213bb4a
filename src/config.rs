use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::assets::color::ColorDef;
use crate::data::ranking::max_final_count;
use crate::data::table::ChampionshipIndex;
use crate::encode::assemble::AssembleOpts;
use crate::encode::ffmpeg::{VideoContainer, validate_sink_config};
use crate::encode::sink::SinkConfig;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{RaceError, RaceResult};
use crate::render::cpu::ChartStyle;
use crate::render::layout::AxisScale;
use crate::render::logo::LogoPolicy;

/// Settings for one bar chart race. Every field has a default, so `{}` is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RaceConfig {
    /// Championship table with `Team`, `Year` and `Logo` columns.
    pub input: PathBuf,
    /// Directory receiving one `chart_<year>.png` per season.
    pub charts_dir: PathBuf,
    /// Video file; `.mp4` or `.avi`.
    pub output: PathBuf,
    /// Abort instead of skipping logos that fail to load.
    pub strict_logos: bool,
    pub chart: ChartConfig,
    pub video: VideoConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    /// Fixed value-axis maximum; derived from the data when unset.
    pub axis_max: Option<f64>,
    /// Font file for all chart text; a system sans-serif is used when unset.
    pub font: Option<PathBuf>,
    pub background: ColorDef,
    pub foreground: ColorDef,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Times the final frame is shown in total.
    pub final_hold_frames: u32,
    pub overwrite: bool,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("championship_data_logos.csv"),
            charts_dir: PathBuf::from("charts"),
            output: PathBuf::from("video.avi"),
            strict_logos: false,
            chart: ChartConfig::default(),
            video: VideoConfig::default(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            axis_max: None,
            font: None,
            background: ColorDef::WHITE,
            foreground: ColorDef::BLACK,
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 1,
            final_hold_frames: 20,
            overwrite: true,
        }
    }
}

impl RaceConfig {
    pub fn from_json_file(path: &Path) -> RaceResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        serde_json::from_reader(BufReader::new(f))
            .map_err(|e| RaceError::validation(format!("parse config '{}': {e}", path.display())))
    }

    pub fn validate(&self) -> RaceResult<()> {
        Canvas::new(self.chart.width, self.chart.height)?;
        if let Some(max) = self.chart.axis_max {
            AxisScale::fixed(max)?;
        }
        validate_sink_config(&SinkConfig {
            width: self.video.width,
            height: self.video.height,
            fps: Fps::new(self.video.fps, 1)?,
        })?;
        if self.video.final_hold_frames == 0 {
            return Err(RaceError::validation("video.final_hold_frames must be >= 1"));
        }
        VideoContainer::from_path(&self.output)?;
        Ok(())
    }

    /// Chart look for a race over `index`; the axis is fixed across all of its frames.
    pub fn chart_style(&self, index: &ChampionshipIndex) -> RaceResult<ChartStyle> {
        let axis = match self.chart.axis_max {
            Some(max) => AxisScale::fixed(max)?,
            None => AxisScale::for_max_count(max_final_count(index)),
        };
        Ok(ChartStyle {
            canvas: Canvas::new(self.chart.width, self.chart.height)?,
            background: self.chart.background.to_rgba8(),
            foreground: self.chart.foreground.to_rgba8(),
            axis,
        })
    }

    pub fn assemble_opts(&self) -> RaceResult<AssembleOpts> {
        Ok(AssembleOpts {
            width: self.video.width,
            height: self.video.height,
            fps: Fps::new(self.video.fps, 1)?,
            final_hold_frames: self.video.final_hold_frames,
        })
    }

    pub fn logo_policy(&self) -> LogoPolicy {
        if self.strict_logos {
            LogoPolicy::Strict
        } else {
            LogoPolicy::Skip
        }
    }

    /// Extra font directories: `fonts/` beside the input table and in the working directory.
    pub fn font_search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(parent) = self.input.parent()
            && !parent.as_os_str().is_empty()
        {
            dirs.push(parent.join("fonts"));
        }
        dirs.push(PathBuf::from("fonts"));
        dirs
    }
}
