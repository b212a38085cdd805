//! Sandfall: falling-sand cellular automaton in the terminal.

mod app;
mod clock;
mod grain;
mod grid;
mod input;
mod logging;
mod schedule;
mod simulation;
mod surface;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

/// Settings the simulation and frame loop are built from.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub dimension: usize,
    pub frame_rate: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_file.as_deref())?;
    let theme = match theme::Theme::load(args.theme.as_deref(), args.palette) {
        Ok(theme) => theme,
        Err(err) => {
            warn!(%err, "failed to load theme, using defaults");
            theme::Theme::default_for_palette(args.palette)
        }
    };
    let config = SimConfig {
        dimension: usize::from(args.dimension),
        frame_rate: args.frame_rate,
    };
    info!(
        dimension = config.dimension,
        palette = theme.sand.len(),
        frame_rate = config.frame_rate,
        "starting sandfall"
    );
    let mut app = App::new(config, theme)?;
    app.run()?;
    Ok(())
}

/// Falling-sand cellular automaton in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "sandfall",
    version,
    about = "Falling-sand cellular automaton in the terminal. Drag with the mouse to pour sand.",
    long_about = "Sandfall is a square grid of cells, each empty or holding a grain of sand. \
        Every frame each grain falls one row, slides diagonally when blocked, or settles.\n\n\
        CONTROLS:\n  Left click     Toggle pouring (move the mouse to pour)\n  \
        C              Clear the grid\n  P / Space      Pause\n  Q / Esc        Quit\n\n\
        Use --theme to load a btop-style theme file; theme[sand] takes a list of hex colours."
)]
pub struct Args {
    /// Grid size: the world is DIMENSION x DIMENSION cells.
    #[arg(short, long, default_value = "100", value_name = "N", value_parser = clap::value_parser!(u16).range(1..=simulation::MAX_DIMENSION as i64))]
    pub dimension: u16,

    /// Sand colour palette.
    #[arg(short, long, default_value = "desert")]
    pub palette: Palette,

    /// Path to theme file (btop-style theme[key]="value").
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Target frames per second (display refresh rate).
    #[arg(long, default_value = "60.0", value_name = "RATE", value_parser = parse_frame_rate)]
    pub frame_rate: f64,

    /// Write logs to this file (RUST_LOG filters, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Desert,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,
}

fn parse_frame_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("frame rate must be positive, got {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["sandfall"]).unwrap();
        assert_eq!(args.dimension, 100);
        assert_eq!(args.palette, Palette::Desert);
        assert!((args.frame_rate - 60.0).abs() < f64::EPSILON);
        assert!(args.theme.is_none());
        assert!(args.log_file.is_none());
    }

    #[test]
    fn test_dimension_range() {
        assert!(Args::try_parse_from(["sandfall", "--dimension", "0"]).is_err());
        assert!(Args::try_parse_from(["sandfall", "--dimension", "2049"]).is_err());
        assert!(Args::try_parse_from(["sandfall", "--dimension", "65535"]).is_err());
        let args = Args::try_parse_from(["sandfall", "-d", "2048"]).unwrap();
        assert_eq!(args.dimension, 2048);
        let args = Args::try_parse_from(["sandfall", "-d", "1"]).unwrap();
        assert_eq!(args.dimension, 1);
    }

    #[test]
    fn test_frame_rate_must_be_positive() {
        assert!(Args::try_parse_from(["sandfall", "--frame-rate", "0"]).is_err());
        assert!(Args::try_parse_from(["sandfall", "--frame-rate", "-5"]).is_err());
        assert!(Args::try_parse_from(["sandfall", "--frame-rate", "fast"]).is_err());
        let args = Args::try_parse_from(["sandfall", "--frame-rate", "30"]).unwrap();
        assert!((args.frame_rate - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_palette_aliases() {
        let args = Args::try_parse_from(["sandfall", "--palette", "contrast"]).unwrap();
        assert_eq!(args.palette, Palette::HighContrast);
    }
}
