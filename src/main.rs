//! SVG Basic CLI
//!
//! Usage:
//!   svg-basic [OPTIONS] [FILE]
//!
//! Options:
//!   -s, --scale <SCALE>        Coordinate scale factor [default: 1]
//!   -c, --config <FILE>        Render configuration (TOML format)
//!   -o, --origin <X,Y>         Starting cursor position [default: 0,0]
//!       --skip-invalid-paths   Drop undecodable paths instead of failing
//!       --summary              Print a document summary instead of the trace
//!   -v, --verbose...           Increase log verbosity
//!   -h, --help                 Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use svg_basic::{
    parse_with_config, render_with_config, Document, ParseConfig, PathErrorPolicy, Point,
    RecordingSurface, RenderConfig, Surface,
};

#[derive(Parser)]
#[command(name = "svg-basic")]
#[command(about = "Replay basic SVG images as drawing primitives")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Coordinate scale factor
    #[arg(short, long, default_value_t = 1.0)]
    scale: f64,

    /// Render configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Starting cursor position, as X,Y
    #[arg(short, long, value_parser = parse_origin, default_value = "0,0")]
    origin: Point,

    /// Drop undecodable paths instead of failing
    #[arg(long)]
    skip_invalid_paths: bool,

    /// Print a document summary instead of the primitive trace
    #[arg(long)]
    summary: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_origin(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{}'", value))?;
    let x = x.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok(Point::new(x, y))
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load render configuration
    let render_config = match &cli.config {
        Some(path) => match RenderConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => RenderConfig::default(),
    };

    // Read input
    let (filename, bytes) = match &cli.input {
        Some(path) => match fs::read(path) {
            Ok(content) => (path.display().to_string(), content),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = Vec::new();
            match io::stdin().read_to_end(&mut buffer) {
                Ok(_) => ("<stdin>".to_string(), buffer),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let policy = if cli.skip_invalid_paths {
        PathErrorPolicy::Skip
    } else {
        PathErrorPolicy::Abort
    };
    let parse_config = ParseConfig::new().with_path_errors(policy);

    let doc = match parse_with_config(&bytes, &parse_config) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{}", e.format(&filename));
            std::process::exit(1);
        }
    };

    for diagnostic in &doc.diagnostics {
        eprintln!(
            "warning: skipped path {} (class '{}'): {}",
            diagnostic.index, diagnostic.class, diagnostic.error
        );
    }

    for skipped in doc.styles.skipped() {
        eprintln!("warning: skipped stylesheet statement '{}'", skipped.text);
    }

    let mut surface = RecordingSurface::new().with_origin(cli.origin);
    render_with_config(&doc, cli.scale, &mut surface, &render_config);

    if cli.summary {
        print_summary(&doc, &surface);
    } else {
        print!("{}", surface.trace());
    }

    if let Some(error) = surface.error() {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}

fn print_summary(doc: &Document, surface: &RecordingSurface) {
    let segments: usize = doc.paths.iter().map(Vec::len).sum();
    let lines: usize = doc.texts.iter().map(|t| t.lines.len()).sum();

    println!(
        "extent:     {:.2} x {:.2} at {:.2},{:.2}",
        doc.width, doc.height, doc.x, doc.y
    );
    println!("paths:      {} ({} segments)", doc.paths.len(), segments);
    println!("texts:      {} ({} lines)", doc.texts.len(), lines);
    println!("selectors:  {}", doc.styles.len());
    println!("skipped:    {}", doc.diagnostics.len());
    println!("primitives: {}", surface.commands().len());
    println!("status:     {}", if surface.ok() { "ok" } else { "error" });
}
