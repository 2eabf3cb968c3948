use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use nano_explainers::{
    AppConfig, BufferHost, Command, Deck, DeckId, DeckVisitor, Host, KeywordHighlighter,
    TerminalHost, Visual, Widget, parse_line,
};

#[derive(Parser, Debug)]
#[command(name = "nano-explainers")]
#[command(about = "Step-by-step explainers for LLM inference and training")]
#[command(version)]
struct Args {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Seed for the sampling draw
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Disable code highlighting
    #[arg(long, global = true)]
    no_highlight: bool,

    /// Log debug output to stderr (-vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available decks
    List,
    /// Step through a deck interactively
    Show {
        /// Deck name, see `list`
        deck: DeckId,
    },
    /// Print one step (or every step) of a deck and exit
    Render {
        /// Deck name, see `list`
        deck: DeckId,

        /// Step to print, 1-based
        #[arg(long, default_value_t = 1)]
        step: usize,

        /// Print every step
        #[arg(long)]
        all: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    debug!(?config, "configuration loaded");

    match args.command {
        Commands::List => {
            for id in DeckId::ALL {
                let steps = id.visit(StepCount);
                println!("{:<10} {:<36} {steps} steps", id.name(), id.title());
            }
            Ok(())
        }
        Commands::Show { deck } => deck.visit(Interactive { config }),
        Commands::Render { deck, step, all } => {
            let out = deck.visit(RenderDeck { config, step, all })?;
            print!("{out}");
            Ok(())
        }
    }
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
        .with_target(false)
        .init();
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.animation.seed = Some(seed);
    }
    if args.no_highlight {
        config.display.highlight = false;
    }
    config.validate()?;
    Ok(config)
}

struct StepCount;

impl DeckVisitor for StepCount {
    type Output = usize;

    fn visit<V: Visual>(self, deck: Deck<V>) -> usize {
        deck.len()
    }
}

/// Non-interactive dump through the in-memory host.
struct RenderDeck {
    config: AppConfig,
    step: usize,
    all: bool,
}

impl DeckVisitor for RenderDeck {
    type Output = Result<String>;

    fn visit<V: Visual>(self, deck: Deck<V>) -> Result<String> {
        let len = deck.len();
        let host = if self.config.display.highlight {
            BufferHost::new().with_highlighter(KeywordHighlighter)
        } else {
            BufferHost::new()
        };
        let mut widget = Widget::init(deck, host, &self.config)?;

        if self.all {
            let mut out = String::new();
            for index in 0..len {
                widget.go_to(index);
                out.push_str(&widget.host().snapshot());
                out.push('\n');
            }
            return Ok(out);
        }

        if self.step == 0 || self.step > len {
            bail!("step {} out of range, deck has {len} steps", self.step);
        }
        widget.go_to(self.step - 1);
        Ok(widget.host().snapshot())
    }
}

/// Interactive session on the terminal.
struct Interactive {
    config: AppConfig,
}

impl DeckVisitor for Interactive {
    type Output = Result<()>;

    fn visit<V: Visual>(self, deck: Deck<V>) -> Result<()> {
        let host = TerminalHost::new(deck.title, deck.inputs, &self.config.display);
        let mut widget = Widget::init(deck, host, &self.config)?;
        let lines = spawn_stdin_reader();

        loop {
            let line = if widget.is_animating() {
                match lines.recv_timeout(widget.tick_interval()) {
                    Ok(line) => line,
                    Err(RecvTimeoutError::Timeout) => {
                        widget.tick();
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            } else {
                match lines.recv() {
                    Ok(line) => line,
                    Err(_) => break,
                }
            };

            match parse_line(&line) {
                Command::Press(button) => widget.press(button),
                Command::Keys(keys) => {
                    for key in keys {
                        if !widget.handle_key(key) {
                            debug!(?key, "unbound key");
                        }
                    }
                }
                Command::Draw => {
                    widget.start_draw();
                }
                Command::Set { field, raw } => {
                    if !widget.deck().inputs.contains(&field) {
                        notify(&mut widget, &format!("this deck has no {field} input"));
                    } else if !widget.set_input(field, &raw) {
                        let value = widget.controls().display(field);
                        notify(
                            &mut widget,
                            &format!("invalid {field} `{raw}`, using default {value}"),
                        );
                    }
                }
                Command::Goto(index) => widget.go_to(index),
                Command::Help => widget.host().print_help(),
                Command::Quit => break,
                Command::Unknown(text) => {
                    notify(&mut widget, &format!("unknown command `{text}`, h for help"));
                }
            }
        }

        Ok(())
    }
}

fn notify<V: Visual>(widget: &mut Widget<V, TerminalHost>, message: &str) {
    let host = widget.host_mut();
    host.notify(message);
    host.present();
}

/// Forward stdin lines to the main thread.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
