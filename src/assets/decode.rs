use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{RaceError, RaceResult};

/// Logo thumbnail ready to paint.
#[derive(Clone, Debug)]
pub struct LogoBitmap {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Read a logo from disk and scale it to fit inside `max_w x max_h`, keeping its aspect ratio.
///
/// `.svg` files are rasterized at the target size; everything else goes through `image`.
pub fn load_logo(path: &Path, max_w: u32, max_h: u32) -> RaceResult<LogoBitmap> {
    let bytes = std::fs::read(path).with_context(|| format!("read logo '{}'", path.display()))?;
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        let tree = parse_svg(&bytes, path.parent())?;
        rasterize_svg_fit(&tree, max_w, max_h)
    } else {
        decode_image(&bytes, max_w, max_h)
    }
}

pub fn decode_image(bytes: &[u8], max_w: u32, max_h: u32) -> RaceResult<LogoBitmap> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (src_w, src_h) = rgba.dimensions();
    let (width, height) = fit_within(src_w, src_h, max_w, max_h)?;

    let rgba = if (width, height) == (src_w, src_h) {
        rgba
    } else {
        image::imageops::resize(&rgba, width, height, image::imageops::FilterType::Lanczos3)
    };

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(LogoBitmap {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub fn parse_svg(bytes: &[u8], resources_dir: Option<&Path>) -> RaceResult<usvg::Tree> {
    let opts = usvg::Options {
        resources_dir: resources_dir.map(Path::to_path_buf),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

fn rasterize_svg_fit(tree: &usvg::Tree, max_w: u32, max_h: u32) -> RaceResult<LogoBitmap> {
    let size = tree.size();
    let src_w = size.width().ceil().max(1.0) as u32;
    let src_h = size.height().ceil().max(1.0) as u32;
    let (width, height) = fit_within(src_w, src_h, max_w, max_h)?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RaceError::render("failed to allocate svg pixmap"))?;
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
    resvg::render(tree, xform, &mut pixmap.as_mut());

    Ok(LogoBitmap {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

/// Largest size with the source aspect ratio that fits inside the box (at least 1x1).
pub fn fit_within(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> RaceResult<(u32, u32)> {
    if src_w == 0 || src_h == 0 {
        return Err(RaceError::render("image has zero width or height"));
    }
    if max_w == 0 || max_h == 0 {
        return Err(RaceError::render("thumbnail box must be non-zero"));
    }
    let scale = (f64::from(max_w) / f64::from(src_w)).min(f64::from(max_h) / f64::from(src_h));
    let w = ((f64::from(src_w) * scale).round() as u32).clamp(1, max_w);
    let h = ((f64::from(src_h) * scale).round() as u32).clamp(1, max_h);
    Ok((w, h))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
