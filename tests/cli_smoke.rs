use std::path::PathBuf;
use std::process::Command;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_titlerace")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "titlerace.exe"
            } else {
                "titlerace"
            });
            p
        })
}

fn fixture(name: &str) -> (PathBuf, PathBuf) {
    let dir = PathBuf::from("target").join("cli_smoke").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let csv = dir.join("championship_data_logos.csv");
    std::fs::write(&csv, "Team,Year,Logo\nTeamA,2001,\nTeamB,2002,missing.png\n").unwrap();
    (dir, csv)
}

#[test]
fn cli_frame_writes_png() {
    let (dir, csv) = fixture("frame");
    let out = dir.join("out.png");

    let status = Command::new(exe())
        .args(["frame", "--year", "2002", "--input"])
        .arg(&csv)
        .arg("--out")
        .arg(&out)
        .status()
        .unwrap();

    assert!(status.success());
    let img = image::open(&out).unwrap();
    assert_eq!((img.width(), img.height()), (1920, 1080));
}

#[test]
fn cli_ranking_prints_json() {
    let (_dir, csv) = fixture("ranking");

    let output = Command::new(exe())
        .arg("--input")
        .arg(&csv)
        .args(["ranking", "--year", "2001"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["year"], 2001);
    assert_eq!(v["entries"][0]["team"], "TeamA");
    assert_eq!(v["entries"][0]["count"], 1);
    assert_eq!(v["entries"][1]["team"], "TeamB");
    assert_eq!(v["entries"][1]["count"], 0);
}

#[test]
fn cli_reports_missing_column() {
    let (dir, _) = fixture("bad_header");
    let csv = dir.join("bad.csv");
    std::fs::write(&csv, "Team,Season,Logo\nTeamA,2001,\n").unwrap();

    let output = Command::new(exe())
        .arg("--input")
        .arg(&csv)
        .args(["ranking", "--year", "2001"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Year"), "{stderr}");
}
