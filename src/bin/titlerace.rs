use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use titlerace::{RaceConfig, RaceSession, Year, frame_path, load_table, rank_for_year};

#[derive(Parser, Debug)]
#[command(name = "titlerace", version, about = "Render a championship bar chart race video")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    /// Defaults to `render`.
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// JSON run configuration; flags below override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Championship table (CSV with Team, Year, Logo columns).
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Directory for per-year chart PNGs.
    #[arg(long, global = true)]
    charts_dir: Option<PathBuf>,

    /// Output video (.mp4 or .avi).
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Font file for chart text.
    #[arg(long, global = true)]
    font: Option<PathBuf>,

    /// Fail on unreadable logos instead of skipping them.
    #[arg(long, global = true)]
    strict_logos: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every chart and assemble the video (requires `ffmpeg` on PATH).
    Render,
    /// Render the per-year chart PNGs only.
    Charts,
    /// Render a single year's chart as a PNG.
    Frame(FrameArgs),
    /// Assemble the video from an existing charts directory.
    Assemble,
    /// Print one year's ranking as JSON.
    Ranking(RankingArgs),
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[arg(long)]
    year: Year,

    /// Output PNG path (defaults to the charts directory).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RankingArgs {
    #[arg(long)]
    year: Year,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = build_config(&cli.global)?;
    match cli.cmd.unwrap_or(Command::Render) {
        Command::Render => cmd_render(config),
        Command::Charts => cmd_charts(config),
        Command::Frame(args) => cmd_frame(config, args),
        Command::Assemble => cmd_assemble(config),
        Command::Ranking(args) => cmd_ranking(config, args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(args: &GlobalArgs) -> anyhow::Result<RaceConfig> {
    let mut config = match &args.config {
        Some(path) => RaceConfig::from_json_file(path)?,
        None => RaceConfig::default(),
    };
    if let Some(input) = &args.input {
        config.input = input.clone();
    }
    if let Some(dir) = &args.charts_dir {
        config.charts_dir = dir.clone();
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if let Some(font) = &args.font {
        config.chart.font = Some(font.clone());
    }
    if args.strict_logos {
        config.strict_logos = true;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn cmd_render(config: RaceConfig) -> anyhow::Result<()> {
    let summary = titlerace::run(config)?;
    eprintln!(
        "wrote {} ({} charts, {} video frames)",
        summary.video_path.display(),
        summary.frames_rendered,
        summary.video_frames
    );
    Ok(())
}

fn cmd_charts(config: RaceConfig) -> anyhow::Result<()> {
    let dir = config.charts_dir.clone();
    let mut session = RaceSession::new(config)?;
    let paths = session.render_charts()?;
    eprintln!("wrote {} charts to {}", paths.len(), dir.display());
    Ok(())
}

fn cmd_frame(config: RaceConfig, args: FrameArgs) -> anyhow::Result<()> {
    let out = args
        .out
        .unwrap_or_else(|| frame_path(&config.charts_dir, args.year));
    let mut session = RaceSession::new(config)?;
    session.write_frame(args.year, &out)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_assemble(config: RaceConfig) -> anyhow::Result<()> {
    let stats = titlerace::assemble_video(&config)?;
    eprintln!(
        "wrote {} ({} charts, {} video frames)",
        config.output.display(),
        stats.source_frames,
        stats.video_frames
    );
    Ok(())
}

fn cmd_ranking(config: RaceConfig, args: RankingArgs) -> anyhow::Result<()> {
    let table = load_table(&config.input)?;
    let ranking = rank_for_year(&table.index, args.year);
    let json = serde_json::to_string_pretty(&ranking).context("serialize ranking")?;
    println!("{json}");
    Ok(())
}
