use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::assets::decode::{LogoBitmap, load_logo};
use crate::foundation::error::{RaceError, RaceResult};

/// What to do when a logo cannot be read or decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogoPolicy {
    /// Warn once and draw the team without a logo.
    #[default]
    Skip,
    /// Abort the frame.
    Strict,
}

/// A decoded logo ready to paint.
#[derive(Clone)]
pub struct LogoPaint {
    pub image: vello_cpu::Image,
    pub width: u32,
    pub height: u32,
}

/// Per-team thumbnail cache, valid for a single thumbnail box size.
pub struct LogoCache {
    policy: LogoPolicy,
    box_px: u32,
    entries: HashMap<String, Option<LogoPaint>>,
}

impl LogoCache {
    pub fn new(policy: LogoPolicy) -> Self {
        Self {
            policy,
            box_px: 0,
            entries: HashMap::new(),
        }
    }

    /// Thumbnail for `team` fitting a `box_px` square, loading it on first use.
    ///
    /// Returns `Ok(None)` for teams without a logo and, under [`LogoPolicy::Skip`], for logos
    /// that failed to load.
    pub fn get(
        &mut self,
        team: &str,
        path: Option<&Path>,
        box_px: u32,
    ) -> RaceResult<Option<LogoPaint>> {
        let Some(path) = path else {
            return Ok(None);
        };
        if box_px != self.box_px {
            self.entries.clear();
            self.box_px = box_px;
        }
        if let Some(cached) = self.entries.get(team) {
            return Ok(cached.clone());
        }

        let loaded = load_logo(path, box_px, box_px).and_then(|bmp| logo_paint(&bmp));
        let entry = match loaded {
            Ok(paint) => Some(paint),
            Err(e) => match self.policy {
                LogoPolicy::Strict => {
                    return Err(RaceError::render(format!(
                        "logo for '{team}' at '{}' is unusable: {e}",
                        path.display()
                    )));
                }
                LogoPolicy::Skip => {
                    tracing::warn!(
                        team,
                        path = %path.display(),
                        error = %e,
                        "logo unusable; drawing bar without it"
                    );
                    None
                }
            },
        };
        self.entries.insert(team.to_owned(), entry.clone());
        Ok(entry)
    }
}

fn logo_paint(bmp: &LogoBitmap) -> RaceResult<LogoPaint> {
    let pixmap = pixmap_from_premul_bytes(&bmp.rgba8_premul, bmp.width, bmp.height)?;
    Ok(LogoPaint {
        image: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        width: bmp.width,
        height: bmp.height,
    })
}

fn pixmap_from_premul_bytes(bytes: &[u8], width: u32, height: u32) -> RaceResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| RaceError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| RaceError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(RaceError::render("pixmap byte len mismatch"));
    }
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn fixture_dir() -> PathBuf {
        let dir = PathBuf::from("target").join("logo_unit");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_path_means_no_logo() {
        let mut cache = LogoCache::new(LogoPolicy::Strict);
        assert!(cache.get("Team", None, 32).unwrap().is_none());
    }

    #[test]
    fn unreadable_logo_is_skipped_by_default() {
        let mut cache = LogoCache::new(LogoPolicy::default());
        let missing = fixture_dir().join("missing.png");
        assert!(cache.get("Team", Some(&missing), 32).unwrap().is_none());
        // Cached failure; still no error on the second frame.
        assert!(cache.get("Team", Some(&missing), 32).unwrap().is_none());
    }

    #[test]
    fn unreadable_logo_fails_when_strict() {
        let mut cache = LogoCache::new(LogoPolicy::Strict);
        let missing = fixture_dir().join("missing.png");
        let err = cache.get("Team", Some(&missing), 32).err().unwrap();
        assert!(matches!(err, RaceError::Render(_)));
        assert!(err.to_string().contains("'Team'"));
    }

    #[test]
    fn loads_and_fits_png_logo() {
        let path = fixture_dir().join("wide.png");
        image::RgbaImage::from_pixel(40, 20, image::Rgba([0, 128, 0, 255]))
            .save(&path)
            .unwrap();

        let mut cache = LogoCache::new(LogoPolicy::Strict);
        let paint = cache.get("Team", Some(&path), 16).unwrap().unwrap();
        assert_eq!((paint.width, paint.height), (16, 8));

        let refit = cache.get("Team", Some(&path), 10).unwrap().unwrap();
        assert_eq!((refit.width, refit.height), (10, 5));
    }
}
