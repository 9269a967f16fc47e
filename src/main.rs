//! bricktui: classic falling-brick puzzle game in the terminal.

use anyhow::{Context, Result};
use bricktui::app::{App, GameConfig};
use bricktui::bricks::BrickCatalog;
use bricktui::game::Tetris;
use bricktui::highscores::{self, HighScoreFile};
use bricktui::theme::{Palette, Preset, Theme};
use clap::Parser;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let theme = Theme::load(args.theme.as_deref(), args.preset, args.palette).unwrap_or_else(
        |err| {
            log::warn!("falling back to the {:?} preset: {err}", args.preset);
            Theme::new(args.preset, args.palette)
        },
    );
    let store = HighScoreFile::new(
        args.highscore_file
            .clone()
            .unwrap_or_else(highscores::default_path),
    );
    log::info!("high score file: {}", store.path().display());

    let mut game = Tetris::new(BrickCatalog::standard(args.seed), store);
    if args.custom_bricks {
        game.enable_custom_bricks();
    }

    let config = GameConfig {
        motd: !args.no_motd,
        animation: !args.no_animation,
    };
    let mut app = App::new(config, theme, game);
    app.run()?;
    Ok(())
}

/// Logging goes to a file only; the terminal belongs to the game.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Classic falling-brick puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "bricktui",
    version,
    about = "Classic falling-brick puzzle in the terminal. Fill rows to clear them; the game speeds up as you score.",
    long_about = "bricktui is a terminal take on the classic falling-brick puzzle.\n\n\
        Steer the falling brick, complete horizontal rows to erase them and score. \
        Every 600 points raises the level and the drop speed.\n\n\
        CONTROLS:\n  Left/Right  Move      Space     Rotate     Down      Drop (hold: hard drop)\n  Enter       Start     Esc / P   Pause      Q         Quit\n  ! @ #       Theme: default / dark / light   [ ]  Brightness\n\n\
        Vim keys h/l/j move and drop, k rotates. Use --theme to load a btop-style theme file."
)]
pub struct Args {
    /// Path to theme file (btop-style theme[key]=\"value\"). Overrides UI colours of the preset.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Built-in colour preset; switch in game with ! @ #.
    #[arg(long, default_value = "dark")]
    pub preset: Preset,

    /// Brick palette: normal, high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Where the high score is kept. Defaults to $XDG_CONFIG_HOME/bricktui/highscore.
    #[arg(long, value_name = "PATH")]
    pub highscore_file: Option<PathBuf>,

    /// Add the custom bricks to the catalog.
    #[arg(long)]
    pub custom_bricks: bool,

    /// Seed for the brick sequence (same seed, same bricks).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Skip the welcome screen.
    #[arg(long)]
    pub no_motd: bool,

    /// Disable the game-over fade.
    #[arg(long)]
    pub no_animation: bool,

    /// Write logs to this file (filter with RUST_LOG, default info).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
