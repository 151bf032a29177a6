//! Batch watermarking engine.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use image::{DynamicImage, ImageFormat, ImageReader, Rgba};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::font;
use crate::rendering::{self, TextMask};

/// Prefix prepended to every output file name.
pub const OUTPUT_PREFIX: &str = "watermarked_";

/// What gets drawn and where.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSpec {
    /// The watermark text.
    pub text: String,
    /// Font size in points (72 dpi, so also the em height in pixels).
    pub font_size: f32,
    /// Text colour, straight alpha.
    pub color: Rgba<u8>,
    /// Distance of the text origin from the left edge.
    pub margin_left: u32,
    /// Distance of the text baseline above the bottom edge.
    pub margin_bottom: u32,
}

impl WatermarkSpec {
    /// Bold 36pt half-transparent red, baseline 20px in from the bottom-left corner.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: 36.0,
            color: Rgba([255, 0, 0, 128]),
            margin_left: 20,
            margin_bottom: 20,
        }
    }

    /// Baseline origin `(x, y)` for an image of the given height.
    ///
    /// `y` goes negative for images shorter than the bottom margin.
    #[must_use]
    pub fn baseline_origin(&self, height: u32) -> (i32, i32) {
        (
            saturating_i32(self.margin_left),
            saturating_i32(height).saturating_sub(saturating_i32(self.margin_bottom)),
        )
    }
}

fn saturating_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Outcome of watermarking a single file.
#[derive(Debug)]
pub struct ProcessResult {
    /// The input file.
    pub path: PathBuf,
    /// Where the watermarked copy goes.
    pub output: PathBuf,
    /// Decoded `(width, height)`, if decoding got that far.
    pub dimensions: Option<(u32, u32)>,
    /// Why the file failed, if it did.
    pub error: Option<Error>,
}

impl ProcessResult {
    /// Whether the watermarked copy was written.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// File name of the input, for reporting.
    #[must_use]
    pub fn input_name(&self) -> String {
        display_name(&self.path)
    }

    /// File name of the output, for reporting.
    #[must_use]
    pub fn output_name(&self) -> String {
        display_name(&self.output)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().into_owned(),
    )
}

/// Renders a [`WatermarkSpec`] onto images with a fixed font face.
///
/// Build once and reuse for every file; the engine holds no per-file state.
pub struct WatermarkEngine {
    spec: WatermarkSpec,
    font: FontArc,
    scale: PxScale,
}

impl WatermarkEngine {
    /// Create an engine using the embedded bold sans-serif face.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFont`] if the embedded face cannot be parsed.
    pub fn new(spec: WatermarkSpec) -> Result<Self> {
        Ok(Self::with_font(spec, font::default_font()?))
    }

    /// Create an engine using the face stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FontRead`] or [`Error::InvalidFont`] if the face
    /// cannot be loaded.
    pub fn from_font_file(spec: WatermarkSpec, path: &Path) -> Result<Self> {
        Ok(Self::with_font(spec, font::load_font(path)?))
    }

    /// Create an engine from an already-parsed face.
    #[must_use]
    pub fn with_font(spec: WatermarkSpec, font: FontArc) -> Self {
        let scale = font::scale_for_points(&font, spec.font_size);
        Self { spec, font, scale }
    }

    /// The spec this engine draws.
    #[must_use]
    pub fn spec(&self) -> &WatermarkSpec {
        &self.spec
    }

    /// Coverage mask of the watermark text, placed for an image `height` tall.
    #[must_use]
    pub fn mask_for(&self, height: u32) -> TextMask {
        let (x, baseline_y) = self.spec.baseline_origin(height);
        rendering::coverage_mask(&self.font, self.scale, &self.spec.text, x, baseline_y)
    }

    /// Draw the watermark onto `image` in place.
    ///
    /// 8- and 16-bit RGB(A) images are drawn on directly and keep their depth.
    /// Grayscale cannot hold red, so it is widened to RGB(A) of the same depth;
    /// float images are narrowed to 16-bit, the deepest layout PNG can store.
    /// Only pixels under the text change value. Dimensions never change.
    pub fn apply(&self, image: &mut DynamicImage) {
        let (width, height) = (image.width(), image.height());

        let text_width = rendering::text_width(&self.font, self.scale, &self.spec.text);
        if text_width.saturating_add(self.spec.margin_left) > width {
            debug!(text_width, width, "watermark text overflows image width");
        }

        if let Some(converted) = drawable_layout(image) {
            debug!(from = ?image.color(), to = ?converted.color(), "converted pixel layout");
            *image = converted;
        }

        let mask = self.mask_for(height);
        let color = self.spec.color;
        match image {
            DynamicImage::ImageRgb8(buf) => rendering::composite(buf, &mask, color),
            DynamicImage::ImageRgba8(buf) => rendering::composite(buf, &mask, color),
            DynamicImage::ImageRgb16(buf) => rendering::composite(buf, &mask, color),
            DynamicImage::ImageRgba16(buf) => rendering::composite(buf, &mask, color),
            other => warn!(color = ?other.color(), "unsupported pixel layout, watermark skipped"),
        }
    }

    /// Watermark one file, writing the result next to it.
    ///
    /// Failures are captured in the returned [`ProcessResult`] rather than
    /// propagated, so a batch can carry on past a bad file.
    #[must_use]
    pub fn process_file(&self, input: &Path) -> ProcessResult {
        let output = output_path(input);
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            output,
            dimensions: None,
            error: None,
        };

        // The raster lives only inside this closure and is dropped on every path out.
        let outcome = decode(input).and_then(|mut image| {
            result.dimensions = Some((image.width(), image.height()));
            self.apply(&mut image);
            encode(&image, &result.output)
        });

        match outcome {
            Ok(()) => {
                debug!(input = %input.display(), output = %result.output.display(), "watermark added");
            }
            Err(e) => {
                warn!(input = %input.display(), error = %e, "failed to watermark file");
                result.error = Some(e);
            }
        }

        result
    }

    /// Watermark every PNG directly inside `folder`.
    ///
    /// Files are processed one at a time in name order. An empty vector means
    /// no entry matched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FolderNotFound`] if `folder` is missing or not a
    /// directory, and [`Error::ReadFolder`] if it cannot be listed.
    pub fn process_folder(&self, folder: &Path) -> Result<Vec<ProcessResult>> {
        let inputs = find_png_files(folder)?;
        debug!(folder = %folder.display(), count = inputs.len(), "found PNG files");
        Ok(inputs.iter().map(|p| self.process_file(p)).collect())
    }
}

/// `image` converted to a layout `composite` can draw on, or `None` if it
/// already is. Gray widens losslessly; float narrows to 16-bit.
fn drawable_layout(image: &DynamicImage) -> Option<DynamicImage> {
    match image {
        DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => None,
        DynamicImage::ImageLuma8(_) => Some(DynamicImage::ImageRgb8(image.to_rgb8())),
        DynamicImage::ImageLumaA8(_) => Some(DynamicImage::ImageRgba8(image.to_rgba8())),
        other if other.color().has_alpha() => {
            Some(DynamicImage::ImageRgba16(other.to_rgba16()))
        }
        other => Some(DynamicImage::ImageRgb16(other.to_rgb16())),
    }
}

fn encode(image: &DynamicImage, path: &Path) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
}

fn decode(path: &Path) -> Result<DynamicImage> {
    let to_err = |source: image::ImageError| Error::Decode {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(|e| to_err(image::ImageError::IoError(e)))?
        .decode()
        .map_err(to_err)
}

/// Whether a file name ends in `.png`, ignoring case.
///
/// This is a plain suffix test: `.png` on its own matches, and so does a
/// previous run's `watermarked_*.png`.
#[must_use]
pub fn is_png_name(name: &OsStr) -> bool {
    name.to_string_lossy().to_lowercase().ends_with(".png")
}

/// List the entries directly inside `folder` whose names pass [`is_png_name`],
/// sorted by name.
///
/// Entries are not filtered by type; a directory called `x.png` is returned
/// and later fails to decode.
///
/// # Errors
///
/// Returns [`Error::FolderNotFound`] if `folder` is missing or not a
/// directory, and [`Error::ReadFolder`] if it cannot be listed.
pub fn find_png_files(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(Error::FolderNotFound(folder.to_path_buf()));
    }

    let read_dir = std::fs::read_dir(folder).map_err(|source| Error::ReadFolder {
        path: folder.to_path_buf(),
        source,
    })?;

    Ok(png_paths(folder, read_dir.map(|entry| entry.map(|e| e.path()))))
}

/// Keep the `.png` paths from a folder listing, sorted. Entries the OS failed
/// to report are logged and left out; the rest of the listing still counts.
fn png_paths<I>(folder: &Path, entries: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = std::io::Result<PathBuf>>,
{
    let mut files: Vec<PathBuf> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(folder = %folder.display(), error = %e, "skipping unreadable folder entry");
                None
            }
        })
        .filter(|p| p.file_name().is_some_and(is_png_name))
        .collect();
    files.sort();
    files
}

/// Sibling path for the watermarked copy of `input`.
///
/// Example: `"shots/logo.png"` becomes `"shots/watermarked_logo.png"`.
#[must_use]
pub fn output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(OUTPUT_PREFIX);
    name.push(input.file_name().unwrap_or_default());
    input.with_file_name(name)
}
