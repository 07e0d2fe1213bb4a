use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{RaceError, RaceResult};

/// A frame as RGBA8 pixels.
///
/// Frames rendered by the chart renderer are premultiplied; frames read back from disk are
/// straight alpha. The `premultiplied` flag records which one this is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn new(width: u32, height: u32, data: Vec<u8>, premultiplied: bool) -> RaceResult<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(RaceError::validation(
                "frame data size mismatch with width*height*4",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied,
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Composite over `bg_rgba` into opaque RGBA8.
    pub fn to_opaque_rgba8(&self, bg_rgba: [u8; 4]) -> RaceResult<Vec<u8>> {
        let mut out = vec![0u8; self.data.len()];
        flatten_to_opaque_rgba8(&mut out, &self.data, self.premultiplied, bg_rgba)?;
        Ok(out)
    }

    /// Write an opaque PNG, creating the parent directory if needed.
    pub fn save_png(&self, path: &Path, bg_rgba: [u8; 4]) -> RaceResult<()> {
        ensure_parent_dir(path)?;
        let opaque = self.to_opaque_rgba8(bg_rgba)?;
        image::save_buffer_with_format(
            path,
            &opaque,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }

    /// Read any image `image` understands as a straight-alpha frame.
    pub fn load(path: &Path) -> RaceResult<Self> {
        let img = image::open(path)
            .with_context(|| format!("read frame '{}'", path.display()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw(), false)
    }

    /// Bilinear resample to `width x height`, ignoring aspect ratio.
    pub fn resized(self, width: u32, height: u32) -> RaceResult<Self> {
        if width == 0 || height == 0 {
            return Err(RaceError::validation("resize target must be non-zero"));
        }
        if self.width == width && self.height == height {
            return Ok(self);
        }
        let premultiplied = self.premultiplied;
        let src = image::RgbaImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| RaceError::validation("frame data size mismatch"))?;
        let dst =
            image::imageops::resize(&src, width, height, image::imageops::FilterType::Triangle);
        Self::new(width, height, dst.into_raw(), premultiplied)
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> RaceResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

pub(crate) fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> RaceResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(RaceError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            d[3] = 255;
            continue;
        }

        let inv = 255u16 - a;

        let (r, g, b) = if src_is_premul {
            (
                s[0] as u16 + mul_div255(bg_r, inv),
                s[1] as u16 + mul_div255(bg_g, inv),
                s[2] as u16 + mul_div255(bg_b, inv),
            )
        } else {
            (
                mul_div255(s[0] as u16, a) + mul_div255(bg_r, inv),
                mul_div255(s[1] as u16, a) + mul_div255(bg_g, inv),
                mul_div255(s[2] as u16, a) + mul_div255(bg_b, inv),
            )
        };

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}
