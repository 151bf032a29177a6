//! Font loading and point-size scaling.
//!
//! The watermark face is a bold sans-serif. DejaVu Sans Bold is embedded in the
//! binary so the tool works on hosts with no fonts installed; a different face
//! (for instance a licensed Arial Bold) can be loaded from disk instead.

use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale};

use crate::error::{Error, Result};

/// DejaVu Sans Bold, see `assets/DejaVu-LICENSE`.
const EMBEDDED_BOLD_SANS: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

/// Parse the embedded bold sans-serif face.
///
/// # Errors
///
/// Returns [`Error::InvalidFont`] if the embedded data cannot be parsed.
pub fn default_font() -> Result<FontArc> {
    Ok(FontArc::try_from_slice(EMBEDDED_BOLD_SANS)?)
}

/// Load a TrueType/OpenType face from disk.
///
/// # Errors
///
/// Returns [`Error::FontRead`] if the file cannot be read and
/// [`Error::InvalidFont`] if its contents are not a usable font.
pub fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path).map_err(|source| Error::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FontArc::try_from_vec(bytes)?)
}

/// Convert a point size to the pixel scale `ab_glyph` expects.
///
/// Points are taken at 72 dpi, so the em square is `points` pixels tall.
/// `PxScale` measures ascent-to-descent instead of the em, hence the ratio.
#[must_use]
pub fn scale_for_points(font: &impl Font, points: f32) -> PxScale {
    let Some(units_per_em) = font.units_per_em() else {
        return PxScale::from(points);
    };
    PxScale::from(points * font.height_unscaled() / units_per_em)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_font_parses() {
        let font = default_font().unwrap();
        assert!(font.glyph_count() > 0);
        assert_ne!(font.glyph_id('W').0, 0);
    }

    #[test]
    fn scale_makes_em_match_point_size() {
        let font = default_font().unwrap();
        let scale = scale_for_points(&font, 36.0);
        // Line height exceeds the em for virtually every face.
        assert!(scale.y > 36.0);
        let em = scale.y * font.units_per_em().unwrap() / font.height_unscaled();
        assert!((em - 36.0).abs() < 0.01);
    }

    #[test]
    fn load_font_reports_missing_file() {
        let err = load_font(Path::new("/definitely/not/here.ttf")).unwrap_err();
        assert!(matches!(err, Error::FontRead { .. }));
    }

    #[test]
    fn load_font_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        let err = load_font(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidFont(_)));
    }
}
