use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use titlerace::{RaceConfig, is_ffmpeg_on_path, run};

fn ffprobe_available() -> bool {
    Command::new("ffprobe")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn count_video_frames(path: &Path) -> anyhow::Result<u64> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-count_frames",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=nb_read_frames",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .output()?;
    anyhow::ensure!(out.status.success(), "ffprobe failed");
    Ok(String::from_utf8(out.stdout)?.trim().parse()?)
}

fn small_config(dir: &Path, output: &str) -> RaceConfig {
    let mut cfg = RaceConfig {
        input: dir.join("table.csv"),
        charts_dir: dir.join("charts"),
        output: dir.join(output),
        ..RaceConfig::default()
    };
    cfg.chart.width = 320;
    cfg.chart.height = 180;
    cfg.video.width = 160;
    cfg.video.height = 90;
    cfg
}

#[test]
fn avi_race_has_years_plus_hold_frames() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }

    let dir = PathBuf::from("target").join("video_pipeline");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("table.csv"),
        "Team,Year,Logo\nTeamA,2001,\nTeamB,2002,\nTeamA,2004,\n",
    )
    .unwrap();

    let summary = run(small_config(&dir, "race.avi")).unwrap();
    assert_eq!(summary.frames_rendered, 4);
    assert_eq!(summary.video_frames, 4 + 19);

    let meta = std::fs::metadata(&summary.video_path).unwrap();
    assert!(meta.len() > 0);

    if ffprobe_available() {
        assert_eq!(count_video_frames(&summary.video_path).unwrap(), 4 + 19);
    }
}
