// Command-line front end: timed exploration runs and games against the explorer

mod play;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rchess_core::{Color, Explorer, ExplorerConfig, MaterialOracle, Position};

#[derive(Parser, Debug)]
#[command(author, version, about = "Concurrent chess position-graph explorer", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Write log lines to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// TOML file with explorer settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Worker threads (0 = available parallelism)
    #[arg(short, long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Explore from a position for a fixed time and print a report
    Explore {
        #[command(flatten)]
        root: RootArgs,
        /// Run length in milliseconds
        #[arg(long)]
        duration: Option<u64>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play a game on stdin/stdout; moves in coordinate notation (e2e4)
    Play {
        #[command(flatten)]
        root: RootArgs,
        /// Side the engine plays
        #[arg(long, value_enum, default_value_t = Side::Black)]
        engine: Side,
        /// Thinking time per engine move in milliseconds
        #[arg(long)]
        think: Option<u64>,
        /// Save the final position record here
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

/// Starting position: FEN text, a saved record, or the standard start
#[derive(Args, Debug)]
struct RootArgs {
    #[arg(long, conflicts_with = "position")]
    fen: Option<String>,
    /// JSON position record
    #[arg(long)]
    position: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Color {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.debug, cli.log_file.as_deref()) {
        eprintln!("error: {e:#}");
        std::process::exit(2);
    }

    if let Err(e) = run(cli) {
        log::error!("Fatal error: {e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let log_level = if debug { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    );
    builder.write_style(env_logger::WriteStyle::Never);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            builder
                .format(|buf, record| {
                    writeln!(
                        buf,
                        "{} [{}] {}: {}",
                        chrono::Local::now().format("%H:%M:%S%.3f"),
                        record.level(),
                        record.target(),
                        record.args()
                    )
                })
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder
                .format(|buf, record| {
                    writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
                })
                .target(env_logger::Target::Stderr);
        }
    }

    builder.try_init().context("initialising logger")?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }

    match cli.cmd {
        Cmd::Explore { root, duration, json } => {
            if let Some(ms) = duration {
                config.duration_ms = ms;
            }
            config.validate().context("invalid settings")?;
            explore(load_root(&root)?, config, json)
        }
        Cmd::Play { root, engine, think, save } => {
            if let Some(ms) = think {
                config.think_ms = ms;
            }
            config.validate().context("invalid settings")?;
            let root = load_root(&root)?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            let final_position =
                play::run(root, config, engine.into(), stdin.lock(), &mut stdout.lock())?;
            if let Some(path) = save {
                fs::write(&path, final_position.to_json())
                    .with_context(|| format!("saving position to {}", path.display()))?;
            }
            Ok(())
        }
    }
}

/// Settings file (or defaults), with the thread override from the environment
fn load_config(path: Option<&Path>) -> Result<ExplorerConfig> {
    match path {
        Some(path) => ExplorerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => {
            let mut config = ExplorerConfig::default();
            config.apply_env().context("reading thread override")?;
            Ok(config)
        }
    }
}

fn load_root(args: &RootArgs) -> Result<Position> {
    match (&args.fen, &args.position) {
        (Some(fen), _) => Position::from_fen(fen).with_context(|| format!("parsing FEN {fen:?}")),
        (None, Some(path)) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading position record {}", path.display()))?;
            Position::from_json(&text)
                .with_context(|| format!("decoding position record {}", path.display()))
        }
        (None, None) => Ok(Position::startpos()),
    }
}

fn explore(root: Position, config: ExplorerConfig, json: bool) -> Result<()> {
    let duration = config.duration();
    let mut explorer = Explorer::new(MaterialOracle, root, config);
    let report = explorer.run_for(duration).context("exploration failed")?;

    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        writeln!(out, "{root}")?;
        writeln!(out, "{report}")?;
    }
    Ok(())
}
