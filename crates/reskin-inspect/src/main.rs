//! reskin-inspect: CLI tool for checking how an image would be treated.
//!
//! Runs the layout classifier, the transparency detector and the
//! category selector against a local image file plus a declared layout,
//! and prints what the in-page replacer would do with it. Useful for:
//!
//! - Seeing which score contributions push an image over the threshold
//! - Checking the alpha statistics behind a transparency verdict
//! - Trying `--aggressive` and threshold overrides before deploying them
//!
//! # Usage
//!
//! ```text
//! cargo run --bin reskin-inspect -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use reskin_pipeline::transparency::decode_rgba;
use reskin_pipeline::{ElementNode, ImageSnapshot, Offsets, Positioning, ReplacerConfig, Viewport};

use crate::report::Report;

/// Check how reskin would classify and replace an image.
///
/// The image's pixels feed the transparency check; everything about its
/// placement on a page is given with flags.
#[derive(Parser)]
#[command(name = "reskin-inspect", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP, GIF).
    image_path: PathBuf,

    /// Rendered width in CSS pixels (default: natural width).
    #[arg(long)]
    width: Option<f64>,

    /// Rendered height in CSS pixels (default: natural height).
    #[arg(long)]
    height: Option<f64>,

    /// Viewport width.
    #[arg(long, default_value_t = 1920.0)]
    viewport_width: f64,

    /// Viewport height.
    #[arg(long, default_value_t = 1080.0)]
    viewport_height: f64,

    /// Source URL used for the URL heuristics (default: the file name).
    #[arg(long)]
    src: Option<String>,

    /// Ancestor element as `tag.class1.class2[role]`, innermost first.
    /// Repeat for each level.
    #[arg(long = "ancestor", value_parser = parse_ancestor)]
    ancestors: Vec<ElementNode>,

    /// Computed CSS `position`.
    #[arg(long, value_enum, default_value_t = Position::Static)]
    position: Position,

    /// Computed `top` offset in pixels.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    top: f64,

    /// Computed `right` offset in pixels.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    right: f64,

    /// Computed `bottom` offset in pixels.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    bottom: f64,

    /// Computed `left` offset in pixels.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    left: f64,

    /// Start from the aggressive preset (lower thresholds).
    #[arg(long)]
    aggressive: bool,

    /// Minimum score override.
    #[arg(long, allow_negative_numbers = true)]
    min_score: Option<i32>,

    /// Minimum rendered width override.
    #[arg(long)]
    min_width: Option<u32>,

    /// Minimum rendered height override.
    #[arg(long)]
    min_height: Option<u32>,

    /// Seed for the replacement selector.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output the report as JSON instead of human-readable text.
    #[arg(long)]
    json: bool,
}

/// CSS `position` selection.
#[derive(Clone, Copy, ValueEnum)]
enum Position {
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl From<Position> for Positioning {
    fn from(p: Position) -> Self {
        match p {
            Position::Static => Self::Static,
            Position::Relative => Self::Relative,
            Position::Absolute => Self::Absolute,
            Position::Fixed => Self::Fixed,
            Position::Sticky => Self::Sticky,
        }
    }
}

/// Parse `tag.class1.class2[role]` into an [`ElementNode`].
fn parse_ancestor(spec: &str) -> Result<ElementNode, String> {
    let (selector, role) = match spec.split_once('[') {
        Some((selector, rest)) => {
            let role = rest
                .strip_suffix(']')
                .ok_or_else(|| format!("unterminated role in {spec:?}"))?;
            (selector, Some(role))
        }
        None => (spec, None),
    };

    let mut parts = selector.split('.');
    let tag = parts.next().unwrap_or_default();
    if tag.is_empty() {
        return Err(format!("missing tag name in {spec:?}"));
    }
    let classes: Vec<&str> = parts.filter(|c| !c.is_empty()).collect();

    let mut node = ElementNode::new(tag).with_class(&classes.join(" "));
    if let Some(role) = role {
        node = node.with_role(role);
    }
    Ok(node)
}

/// Build the [`ReplacerConfig`] from CLI flags: preset first, then overrides.
fn config_from_cli(cli: &Cli) -> ReplacerConfig {
    let mut config = if cli.aggressive {
        ReplacerConfig::aggressive()
    } else {
        ReplacerConfig::default()
    };
    if let Some(n) = cli.min_score {
        config.min_score = n;
    }
    if let Some(n) = cli.min_width {
        config.min_width = n;
    }
    if let Some(n) = cli.min_height {
        config.min_height = n;
    }
    config
}

/// Build the [`ImageSnapshot`] the classifier would have seen on a page.
fn snapshot_from_cli(cli: &Cli, natural_width: u32, natural_height: u32) -> ImageSnapshot {
    let src = cli.src.clone().unwrap_or_else(|| {
        cli.image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let width = cli.width.unwrap_or_else(|| f64::from(natural_width));
    let height = cli.height.unwrap_or_else(|| f64::from(natural_height));

    let offsets = Offsets {
        top: cli.top,
        right: cli.right,
        bottom: cli.bottom,
        left: cli.left,
    };
    cli.ancestors.iter().cloned().fold(
        ImageSnapshot::new(&src, width, height).positioned(cli.position.into(), offsets),
        ImageSnapshot::within,
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };
    let pixels = match decode_rgba(&image_bytes) {
        Ok(pixels) => pixels,
        Err(e) => {
            eprintln!("Error decoding {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };
    log::debug!(
        "decoded {} ({}x{})",
        cli.image_path.display(),
        pixels.width(),
        pixels.height()
    );

    let config = config_from_cli(&cli);
    let viewport = Viewport::new(cli.viewport_width, cli.viewport_height);
    let snapshot = snapshot_from_cli(&cli, pixels.width(), pixels.height());
    let report = Report::build(
        cli.image_path.display().to_string(),
        &pixels,
        snapshot,
        viewport,
        &config,
        cli.seed,
    );

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", report.render());
    }

    ExitCode::SUCCESS
}
