//! Batch-apply a semi-transparent text watermark to PNG images.
//!
//! Every `*.png` directly inside a folder gets a bold 36pt, half-transparent
//! red caption burned in near its bottom-left corner. The result is written
//! next to the original as `watermarked_<name>`; originals are never touched.
//!
//! # Quick Start
//!
//! ```no_run
//! use watermark_adder::{WatermarkEngine, WatermarkSpec};
//!
//! let engine = WatermarkEngine::new(WatermarkSpec::new("CONFIDENTIAL"))
//!     .expect("failed to init engine");
//! let mut img = image::open("logo.png").unwrap();
//! engine.apply(&mut img);
//! img.save("watermarked_logo.png").unwrap();
//! ```
//!
//! # Folders
//!
//! [`WatermarkEngine::process_folder`] handles a whole folder. Each file is
//! processed on its own, so a corrupt image only fails its own entry.
//!
//! ```no_run
//! use std::path::Path;
//! use watermark_adder::{WatermarkEngine, WatermarkSpec};
//!
//! let engine = WatermarkEngine::new(WatermarkSpec::new("DRAFT")).unwrap();
//! for r in engine.process_folder(Path::new("shots")).unwrap() {
//!     println!("{}: {}", r.input_name(), r.is_success());
//! }
//! ```

#![deny(missing_docs)]

mod engine;
pub mod error;
pub mod font;
pub mod rendering;

pub use engine::{
    find_png_files, is_png_name, output_path, ProcessResult, WatermarkEngine, WatermarkSpec,
    OUTPUT_PREFIX,
};
pub use error::{Error, Result};
