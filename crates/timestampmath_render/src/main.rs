use std::path::Path;

use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        let program = args.first().map_or("timestampmath_render", String::as_str);
        eprintln!("Usage: {program} <input.arrow> <params.json> <output.arrow>");
        std::process::exit(1);
    }

    let warnings = match timestampmath_render::render_file(
        Path::new(&args[1]),
        Path::new(&args[2]),
        Path::new(&args[3]),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("render failed: {e}");
            std::process::exit(1);
        }
    };

    // Warnings go to stdout for the host to translate.
    match serde_json::to_string(&warnings) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("failed to encode warnings: {e}");
            std::process::exit(1);
        }
    }
}
