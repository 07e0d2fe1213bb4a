use std::path::{Path, PathBuf};

use crate::assets::font::resolve_font;
use crate::config::RaceConfig;
use crate::data::palette::TeamColors;
use crate::data::ranking::{YearRanking, rank_for_year};
use crate::data::table::{ChampionshipTable, load_table};
use crate::encode::assemble::{AssembleStats, assemble_dir, assemble_frames, frame_path};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoContainer};
use crate::encode::sink::FrameSink;
use crate::foundation::core::{Year, YearSpan};
use crate::foundation::error::RaceResult;
use crate::render::cpu::ChartRenderer;
use crate::render::frame::FrameRGBA;

/// Outcome of a full run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub span: YearSpan,
    pub frames_rendered: usize,
    pub video_frames: u64,
    pub video_path: PathBuf,
}

/// A loaded race: table, colors and a renderer sized for the configured chart.
pub struct RaceSession {
    config: RaceConfig,
    table: ChampionshipTable,
    span: YearSpan,
    colors: TeamColors,
    renderer: ChartRenderer,
}

impl RaceSession {
    /// Validate `config` and load its input table.
    pub fn new(config: RaceConfig) -> RaceResult<Self> {
        config.validate()?;
        let table = load_table(&config.input)?;
        Self::from_table(config, table)
    }

    /// Build a session over an already loaded table.
    pub fn from_table(config: RaceConfig, table: ChampionshipTable) -> RaceResult<Self> {
        config.validate()?;
        let span = table.span()?;
        let colors = TeamColors::assign(&table.index);
        let style = config.chart_style(&table.index)?;
        let font = resolve_font(config.chart.font.as_deref(), &config.font_search_dirs())?;
        let renderer = ChartRenderer::new(style, font.as_ref(), config.logo_policy())?;

        tracing::debug!(
            first = span.first,
            last = span.last,
            teams = colors.len(),
            axis_max = style.axis.max,
            "race session ready"
        );
        Ok(Self {
            config,
            table,
            span,
            colors,
            renderer,
        })
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn table(&self) -> &ChampionshipTable {
        &self.table
    }

    pub fn span(&self) -> YearSpan {
        self.span
    }

    pub fn colors(&self) -> &TeamColors {
        &self.colors
    }

    pub fn ranking(&self, year: Year) -> YearRanking {
        rank_for_year(&self.table.index, year)
    }

    pub fn render_year(&mut self, year: Year) -> RaceResult<FrameRGBA> {
        let ranking = self.ranking(year);
        self.renderer
            .render(&ranking, &self.colors, &self.table.logos)
    }

    /// Render `year` and write it as an opaque PNG at `path`.
    pub fn write_frame(&mut self, year: Year, path: &Path) -> RaceResult<()> {
        let frame = self.render_year(year)?;
        frame.save_png(path, self.config.chart.background.to_rgba8())
    }

    /// Render every year of the span into `charts_dir`, returning the frame paths in year order.
    #[tracing::instrument(skip_all, fields(first = self.span.first, last = self.span.last))]
    pub fn render_charts(&mut self) -> RaceResult<Vec<PathBuf>> {
        let dir = self.config.charts_dir.clone();
        std::fs::create_dir_all(&dir)?;

        let mut paths = Vec::new();
        for year in self.span.years() {
            tracing::info!(year, "processing year");
            let path = frame_path(&dir, year);
            self.write_frame(year, &path)?;
            paths.push(path);
        }
        tracing::info!(frames = paths.len(), dir = %dir.display(), "wrote chart frames");
        Ok(paths)
    }
}

/// Sink writing `config.output` through the system `ffmpeg`.
pub fn ffmpeg_sink(config: &RaceConfig) -> RaceResult<FfmpegSink> {
    VideoContainer::from_path(&config.output)?;
    Ok(FfmpegSink::new(FfmpegSinkOpts {
        out_path: config.output.clone(),
        overwrite: config.video.overwrite,
        bg_rgba: config.chart.background.to_rgba8(),
    }))
}

/// Assemble the frames already present in `config.charts_dir` into `config.output`.
pub fn assemble_video(config: &RaceConfig) -> RaceResult<AssembleStats> {
    config.validate()?;
    let mut sink = ffmpeg_sink(config)?;
    let stats = assemble_dir(&config.charts_dir, &config.assemble_opts()?, &mut sink)?;
    tracing::info!(path = %config.output.display(), "wrote video");
    Ok(stats)
}

/// Full run into an arbitrary sink: load, render every year, then assemble.
pub fn run_with_sink(config: RaceConfig, sink: &mut dyn FrameSink) -> RaceResult<RunSummary> {
    let mut session = RaceSession::new(config)?;
    let paths = session.render_charts()?;
    let opts = session.config().assemble_opts()?;
    let stats = assemble_frames(&paths, &opts, sink)?;

    let summary = RunSummary {
        span: session.span(),
        frames_rendered: paths.len(),
        video_frames: stats.video_frames,
        video_path: session.config().output.clone(),
    };
    tracing::info!(
        first = summary.span.first,
        last = summary.span.last,
        frames = summary.frames_rendered,
        video_frames = summary.video_frames,
        "race complete"
    );
    Ok(summary)
}

/// Full run writing `config.output` with `ffmpeg`.
pub fn run(config: RaceConfig) -> RaceResult<RunSummary> {
    config.validate()?;
    let mut sink = ffmpeg_sink(&config)?;
    let summary = run_with_sink(config, &mut sink)?;
    tracing::info!(path = %summary.video_path.display(), "wrote video");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::load_from_reader;
    use crate::encode::sink::InMemorySink;
    use crate::foundation::error::RaceError;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("target")
            .join("pipeline_unit")
            .join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn small_config(dir: &Path) -> RaceConfig {
        let mut cfg = RaceConfig {
            input: dir.join("table.csv"),
            charts_dir: dir.join("charts"),
            output: dir.join("race.mp4"),
            ..RaceConfig::default()
        };
        cfg.chart.width = 160;
        cfg.chart.height = 90;
        cfg.video.width = 80;
        cfg.video.height = 46;
        cfg.video.final_hold_frames = 3;
        cfg
    }

    #[test]
    fn session_renders_every_year_of_the_span() {
        let dir = scratch_dir("span");
        let table = load_from_reader(
            "Team,Year,Logo\nA,2001,\nB,2003,\n".as_bytes(),
            dir.as_path(),
        )
        .unwrap();
        let mut session = RaceSession::from_table(small_config(&dir), table).unwrap();
        assert_eq!(session.span(), YearSpan::new(2001, 2003).unwrap());

        let paths = session.render_charts().unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["chart_2001.png", "chart_2002.png", "chart_2003.png"]);
        for p in &paths {
            let frame = FrameRGBA::load(p).unwrap();
            assert_eq!((frame.width, frame.height), (160, 90));
        }
    }

    #[test]
    fn run_with_sink_holds_the_last_frame() {
        let dir = scratch_dir("run");
        std::fs::write(dir.join("table.csv"), "Team,Year,Logo\nA,2001,\nB,2002,\n").unwrap();

        let mut sink = InMemorySink::new();
        let summary = run_with_sink(small_config(&dir), &mut sink).unwrap();
        assert_eq!(summary.frames_rendered, 2);
        assert_eq!(summary.video_frames, 4);
        assert_eq!(sink.frames().len(), 4);
        assert!(sink.is_ended());
        assert_eq!(sink.frames()[3].1, sink.frames()[1].1);
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let dir = scratch_dir("missing");
        let err = RaceSession::new(small_config(&dir)).err().unwrap();
        assert!(
            matches!(&err, RaceError::Io(e) if e.kind() == std::io::ErrorKind::NotFound),
            "{err:?}"
        );
    }

    #[test]
    fn huge_year_span_fails_before_rendering() {
        let dir = scratch_dir("huge_span");
        let table = load_from_reader(
            "Team,Year,Logo\nA,-2000000000,\nB,2000000000,\n".as_bytes(),
            dir.as_path(),
        )
        .unwrap();
        let err = RaceSession::from_table(small_config(&dir), table).err().unwrap();
        assert!(matches!(err, RaceError::Data(_)), "{err:?}");
        assert!(!dir.join("charts").exists());
    }
}
