//! Watermark a single image.
//!
//! Usage:
//! ```sh
//! cargo run --example add_watermark -- input.png "CONFIDENTIAL"
//! ```

use std::env;
use std::process;

use watermark_adder::{WatermarkEngine, WatermarkSpec};

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let [input, text, ..] = args.as_slice() else {
        eprintln!("Usage: add_watermark <input.png> <text>");
        process::exit(1);
    };

    let engine = match WatermarkEngine::new(WatermarkSpec::new(text.as_str())) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Fatal: Failed to initialize engine: {e}");
            process::exit(1);
        }
    };
    let result = engine.process_file(input.as_ref());

    match result.error {
        None => println!("Done: {}", result.output.display()),
        Some(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
