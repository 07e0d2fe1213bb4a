use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use usvg::fontdb;

use crate::foundation::error::{RaceError, RaceResult};

/// Raw font face used for every piece of chart text.
#[derive(Clone, Debug)]
pub struct FontFace {
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside `bytes` (non-zero only for collections).
    pub index: u32,
    pub family: String,
}

/// Families tried, in order, before falling back to whatever the database holds.
const PREFERRED_FAMILIES: [&str; 6] = [
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
    "Helvetica",
    "Roboto",
];

/// Load the configured font file, or find a bold sans-serif face.
///
/// `search_dirs` are scanned for `.ttf`/`.otf`/`.ttc` files in addition to the system fonts.
/// Returns `Ok(None)` when nothing usable is installed.
pub fn resolve_font(explicit: Option<&Path>, search_dirs: &[PathBuf]) -> RaceResult<Option<FontFace>> {
    if let Some(path) = explicit {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font file '{}'", path.display()))?;
        return face_from_bytes(bytes)
            .map(Some)
            .ok_or_else(|| RaceError::render(format!("no font face found in '{}'", path.display())));
    }

    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    for dir in search_dirs {
        load_fonts_from_dir(&mut db, dir);
    }

    let Some(id) = query_bold_sans(&db) else {
        return Ok(None);
    };
    let family = db
        .face(id)
        .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
        .unwrap_or_default();
    let Some((bytes, index)) = db.with_face_data(id, |data, index| (data.to_vec(), index)) else {
        return Ok(None);
    };

    tracing::debug!(%family, index, "resolved chart font");
    Ok(Some(FontFace {
        bytes: Arc::new(bytes),
        index,
        family,
    }))
}

fn face_from_bytes(bytes: Vec<u8>) -> Option<FontFace> {
    let mut db = fontdb::Database::new();
    db.load_font_data(bytes.clone());
    let face = db.faces().next()?;
    let family = face.families.first().map(|(name, _)| name.clone())?;
    let index = face.index;
    Some(FontFace {
        bytes: Arc::new(bytes),
        index,
        family,
    })
}

fn query_bold_sans(db: &fontdb::Database) -> Option<fontdb::ID> {
    let mut families: Vec<fontdb::Family<'_>> = PREFERRED_FAMILIES
        .iter()
        .map(|&name| fontdb::Family::Name(name))
        .collect();
    families.push(fontdb::Family::SansSerif);

    let query = fontdb::Query {
        families: &families,
        weight: fontdb::Weight::BOLD,
        ..Default::default()
    };
    db.query(&query).or_else(|| db.faces().next().map(|f| f.id))
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        let _ = db.load_font_file(&path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_font_is_an_error() {
        let err = resolve_font(Some(Path::new("target/no-such-font.ttf")), &[]).unwrap_err();
        assert!(err.to_string().contains("no-such-font.ttf"));
    }

    #[test]
    fn explicit_non_font_file_is_rejected() {
        let dir = PathBuf::from("target").join("font_unit");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("not_a_font.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        let err = resolve_font(Some(&path), &[]).unwrap_err();
        assert!(matches!(err, RaceError::Render(_)));
    }

    #[test]
    fn system_lookup_never_errors() {
        // Machines without fonts yield `None`; either way the lookup must not fail.
        let found = resolve_font(None, &[PathBuf::from("target/does-not-exist")]).unwrap();
        if let Some(face) = found {
            assert!(!face.bytes.is_empty());
        }
    }
}
