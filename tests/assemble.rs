use std::path::PathBuf;

use titlerace::{
    AssembleOpts, Fps, FrameIndex, InMemorySink, RaceError, assemble_dir, collect_frame_paths,
    frame_path,
};

fn fresh_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("assemble_it").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_solid_png(path: &std::path::Path, w: u32, h: u32, rgb: [u8; 3]) {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
    img.save(path).unwrap();
}

fn opts() -> AssembleOpts {
    AssembleOpts {
        width: 64,
        height: 36,
        fps: Fps::new(1, 1).unwrap(),
        final_hold_frames: 20,
    }
}

#[test]
fn video_has_one_frame_per_year_plus_hold() {
    let dir = fresh_dir("hold");
    let years = [1998, 1999, 2000, 2001];
    for (i, year) in years.iter().enumerate() {
        write_solid_png(&frame_path(&dir, *year), 96, 54, [i as u8 * 60, 0, 0]);
    }

    let mut sink = InMemorySink::new();
    let stats = assemble_dir(&dir, &opts(), &mut sink).unwrap();
    assert_eq!(stats.source_frames, years.len());
    assert_eq!(stats.video_frames, (years.len() + 19) as u64);
    assert_eq!(sink.frames().len(), years.len() + 19);
    assert!(sink.is_ended());

    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (64, 36));
    for (i, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(*idx, FrameIndex(i as u64));
        assert_eq!((frame.width, frame.height), (64, 36));
    }

    let last = &sink.frames()[years.len() - 1].1;
    assert_eq!(last.pixel(10, 10).unwrap(), [180, 0, 0, 255]);
    for (_, held) in &sink.frames()[years.len()..] {
        assert_eq!(held, last);
    }
}

#[test]
fn frames_are_ordered_by_year_not_name() {
    let dir = fresh_dir("order");
    for year in [10, 9, 100] {
        write_solid_png(&frame_path(&dir, year), 4, 4, [0, 0, 0]);
    }
    write_solid_png(&dir.join("notes.png"), 4, 4, [0, 0, 0]);
    std::fs::write(dir.join("chart_readme.txt"), "not a frame").unwrap();

    let names: Vec<String> = collect_frame_paths(&dir)
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["chart_9.png", "chart_10.png", "chart_100.png"]);
}

#[test]
fn empty_directory_is_an_io_error() {
    let dir = fresh_dir("empty");
    let mut sink = InMemorySink::new();
    let err = assemble_dir(&dir, &opts(), &mut sink).unwrap_err();
    assert!(matches!(err, RaceError::Io(_)), "{err:?}");
    assert!(err.to_string().starts_with("i/o error:"));
    assert!(sink.frames().is_empty());
}

#[test]
fn hold_of_one_adds_nothing() {
    let dir = fresh_dir("no_hold");
    write_solid_png(&frame_path(&dir, 2020), 8, 8, [0, 255, 0]);

    let mut sink = InMemorySink::new();
    let stats = assemble_dir(
        &dir,
        &AssembleOpts {
            final_hold_frames: 1,
            ..opts()
        },
        &mut sink,
    )
    .unwrap();
    assert_eq!(stats.video_frames, 1);
    assert_eq!(sink.frames().len(), 1);
}
