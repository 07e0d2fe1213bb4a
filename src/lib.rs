//! Championship bar chart race renderer.
//!
//! A table of championship wins (`Team`, `Year`, `Logo`) becomes one ranked horizontal bar chart
//! per season, and the charts become a video:
//!
//! - Load a [`ChampionshipTable`] and rank teams per year with [`rank_for_year`]
//! - Render frames with a [`ChartRenderer`] (or drive everything through a [`RaceSession`])
//! - Stream the frames into a [`FrameSink`], usually the `ffmpeg`-backed [`FfmpegSink`]
#![forbid(unsafe_code)]

mod foundation;

/// Logo, color and font assets.
pub mod assets;
/// Run configuration.
pub mod config;
/// Championship table, rankings and team colors.
pub mod data;
pub mod encode;
/// End-to-end race pipeline.
pub mod pipeline;
/// Chart rendering.
pub mod render;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Year, YearSpan};
pub use crate::foundation::error::{RaceError, RaceResult};

pub use crate::assets::color::ColorDef;
pub use crate::config::{ChartConfig, RaceConfig, VideoConfig};
pub use crate::data::palette::TeamColors;
pub use crate::data::ranking::{
    RankEntry, YearRanking, cumulative_count, max_final_count, rank_for_year,
};
pub use crate::data::table::{
    ChampionshipIndex, ChampionshipRecord, ChampionshipTable, LogoIndex, load_from_reader,
    load_table,
};
pub use crate::encode::assemble::{
    AssembleOpts, AssembleStats, assemble_dir, assemble_frames, collect_frame_paths, frame_path,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoContainer, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::pipeline::{RaceSession, RunSummary, assemble_video, run, run_with_sink};
pub use crate::render::logo::LogoPolicy;
pub use crate::render::{AxisScale, ChartLayout, ChartRenderer, ChartStyle, FrameRGBA};
