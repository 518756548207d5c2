//! mindread CLI
//!
//! Usage:
//!   mindread --replay trace.txt                # Replay a recorded sample trace
//!   mindread --interactive                     # Type trace lines on stdin
//!   mindread --serve                           # HTTP + WebSocket API
//!   mindread --replay trace.txt --json         # JSON lines output

use clap::Parser;
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mindread::core::{parse_line, parse_trace, replay, run_server, GameSession, TraceEvent};
use mindread::types::{Direction, EngineConfig, QuadrantCount, SessionEvent, Theme};
use mindread::{Error, Result, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "mindread",
    version = VERSION,
    about = "Directional intent engine - guesses the word you are thinking of",
    long_about = "mindread narrows a pool of words through a few rounds of left/right choices.\n\n\
                  Each round the pool is split into groups on the left and right of the screen.\n\
                  Holding a direction for the stable duration commits that side.\n\n\
                  Modes:\n  \
                  --replay <file>  Replay a recorded trace\n  \
                  --interactive    Type trace lines (or just 'left'/'right')\n  \
                  --serve          HTTP API server mode\n\n\
                  Trace lines:\n  \
                  <t_ms> head <nose_x> <left_eye_x> <right_eye_x>\n  \
                  <t_ms> gaze <x>\n  \
                  <t_ms> offset <value>\n  \
                  <t_ms> choose left|right\n  \
                  <t_ms> none"
)]
struct Args {
    /// Replay a trace file through a new game
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Interactive mode - read trace lines from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Word theme to draw the pool from
    #[arg(short, long, value_enum, default_value_t = Theme::Countries)]
    theme: Theme,

    /// Seed for the word draw
    #[arg(long)]
    seed: Option<u64>,

    /// Explicit comma-separated word pool (overrides --theme)
    #[arg(long, value_delimiter = ',')]
    words: Option<Vec<String>>,

    /// JSON engine config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hold needed to commit (ms)
    #[arg(long)]
    stable_ms: Option<u64>,

    /// Activation threshold
    #[arg(long)]
    activation: Option<f64>,

    /// Maintain threshold
    #[arg(long)]
    maintain: Option<f64>,

    /// Quadrant schedule, e.g. 4,4,4,2
    #[arg(long, value_delimiter = ',')]
    schedule: Option<Vec<u8>>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging();

    if args.no_color {
        colored::control::set_override(false);
    }

    let result = match load_config(&args) {
        Ok(config) => {
            if args.serve {
                run_serve(&args, config).await
            } else if let Some(ref path) = args.replay {
                run_replay(path, &args, config)
            } else {
                if !args.interactive {
                    info!("no mode given, defaulting to interactive");
                }
                run_interactive(&args, config)
            }
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mindread=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Config file (or defaults) with flag overrides on top
fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match args.config {
        Some(ref path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(ms) = args.stable_ms {
        config.stable_duration_ms = ms;
    }
    if let Some(a) = args.activation {
        config.activation_threshold = a;
    }
    if let Some(m) = args.maintain {
        config.maintain_threshold = m;
    }
    if let Some(ref schedule) = args.schedule {
        config.quadrant_schedule = schedule
            .iter()
            .map(|&q| QuadrantCount::try_from(q).map_err(Error::Config))
            .collect::<Result<Vec<_>>>()?;
    }
    config.validate()?;
    Ok(config)
}

fn word_pool(args: &Args, config: &EngineConfig) -> Vec<String> {
    if let Some(ref words) = args.words {
        return words.iter().map(|w| w.trim().to_string()).collect();
    }
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    args.theme.sample_words(config.word_pool_size, &mut rng)
}

/// Run a trace file to completion
fn run_replay(path: &PathBuf, args: &Args, config: EngineConfig) -> Result<()> {
    let text = std::fs::read_to_string(path)?;
    let events = parse_trace(&text)?;
    info!(path = %path.display(), events = events.len(), "replaying trace");

    let pool = word_pool(args, &config);
    let mut session = GameSession::new(config, pool)?;

    if !args.json {
        print_header("Replay", args.no_color);
    }
    print_events(&session.announce(), args)?;
    print_events(&replay(&mut session, &events), args)?;

    if !session.is_finished() && !args.json {
        let round = session.round().map(|r| r.round_index + 1).unwrap_or(0);
        println!("{}", format!("trace ended in round {} without a selection", round).yellow());
    }
    Ok(())
}

/// Run interactive mode
fn run_interactive(args: &Args, config: EngineConfig) -> Result<()> {
    let pool = word_pool(args, &config);
    let mut session = GameSession::new(config, pool)?;
    let started = Instant::now();

    print_header("Interactive", args.no_color);
    println!("Think of one word. Type trace lines, or just 'left' / 'right'.");
    println!("Type 'restart' for a new pool, 'quit' to exit.");
    println!();
    print_events(&session.announce(), args)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}", format_prompt(&session));
        stdout.flush()?;

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            session.teardown();
            println!("\nSession ended.");
            break;
        }
        if line.eq_ignore_ascii_case("restart") {
            let pool = word_pool(args, session.config());
            print_events(&session.restart(pool), args)?;
            continue;
        }
        if line.is_empty() {
            continue;
        }

        let event = match Direction::parse(line) {
            Some(direction) => Some(TraceEvent::Choose {
                timestamp_ms: started.elapsed().as_millis() as u64,
                direction,
            }),
            None => match parse_line(line) {
                Ok(event) => event,
                Err(reason) => {
                    warn!(%reason, "unreadable line");
                    println!("{}", format!("⚠ {}", reason).yellow());
                    continue;
                }
            },
        };

        if let Some(event) = event {
            let produced = replay(&mut session, &[event]);
            print_events(&produced, args)?;
        }
    }
    Ok(())
}

fn print_events(events: &[SessionEvent], args: &Args) -> Result<()> {
    for event in events {
        if args.json {
            println!("{}", serde_json::to_string(event)?);
        } else if args.no_color {
            println!("{}", event.to_parseable_string());
        } else {
            println!("{}", event.to_terminal_string());
        }
    }
    Ok(())
}

/// Print header
fn print_header(mode: &str, no_color: bool) {
    let title = format!("mindread v{} - {}", VERSION, mode);
    if no_color {
        println!("========================================");
        println!("  {}", title);
        println!("========================================");
    } else {
        println!("{}", "════════════════════════════════════════".bold());
        println!("  {}", title.bold());
        println!("{}", "════════════════════════════════════════".bold());
    }
    println!();
}

/// Prompt shows the timer phase and round
fn format_prompt(session: &GameSession) -> String {
    let phase = session.phase();
    match session.round() {
        Some(round) => format!("{} [{} | round {}] > ", phase.emoji(), phase, round.round_index + 1)
            .color(phase.color())
            .to_string(),
        None => "[done] > ".dimmed().to_string(),
    }
}

/// Run HTTP API server
async fn run_serve(args: &Args, config: EngineConfig) -> Result<()> {
    println!();
    println!("🜂 mindread API Server v{}", VERSION);
    println!();
    run_server(&args.addr, config).await
}
