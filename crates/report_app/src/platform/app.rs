use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use report_core::{update, AppState, Msg};
use report_logging::{report_error, report_info};

use super::cli::Args;
use super::config::{ClientConfig, InitialFilters};
use super::effects::EffectRunner;
use super::logging;
use super::ui;

/// Everything the main loop reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    Msg(Msg),
    Help,
    Quit,
}

pub fn run_app(args: Args) -> anyhow::Result<()> {
    logging::initialize(args.log, args.verbose);

    if args.write_default_config {
        let path = ClientConfig::default().save(&args.config)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let mut config = ClientConfig::load(&args.config)?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    report_info!(
        "report-client {} talking to {}",
        env!("CARGO_PKG_VERSION"),
        config.base_url
    );

    let (tx, rx) = mpsc::channel::<ShellEvent>();
    let runner = EffectRunner::new(&config, tx.clone())?;
    spawn_console_reader(tx);

    let mut shell = Shell::new(runner);
    for msg in initial_messages(&config.filters) {
        shell.dispatch(msg);
    }
    println!("{}", ui::input::HELP);

    while let Ok(event) = rx.recv() {
        match event {
            ShellEvent::Msg(msg) => shell.dispatch(msg),
            ShellEvent::Help => println!("{}", ui::input::HELP),
            ShellEvent::Quit => break,
        }
    }
    report_info!("Shutting down");
    Ok(())
}

struct Shell {
    state: AppState,
    runner: EffectRunner,
}

impl Shell {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.run(effects);
        if state.consume_dirty() {
            print!("\n{}", ui::render::render(&state.view()));
            let _ = io::stdout().flush();
        }
        self.state = state;
    }
}

/// Configured filters followed by the first status fetch.
fn initial_messages(filters: &InitialFilters) -> Vec<Msg> {
    let mut msgs = Vec::new();
    if !filters.block_types.is_empty() {
        msgs.push(Msg::BlockTypesSelected(filters.block_types.clone()));
    }
    if !filters.root_block_id.is_empty() {
        msgs.push(Msg::RootBlockChanged(filters.root_block_id.clone()));
    }
    if !filters.usernames.is_empty() {
        msgs.push(Msg::UsernamesChanged(filters.usernames.clone()));
    }
    if !filters.match_string.is_empty() {
        msgs.push(Msg::MatchStringChanged(filters.match_string.clone()));
    }
    msgs.push(Msg::Initialized);
    msgs
}

fn spawn_console_reader(tx: mpsc::Sender<ShellEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    report_error!("Failed to read console input: {}", err);
                    break;
                }
            };
            match ui::input::parse_line(&line) {
                Ok(Some(event)) => {
                    if tx.send(event).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => eprintln!("{err}"),
            }
        }
        // End of input behaves like `quit`.
        let _ = tx.send(ShellEvent::Quit);
    });
}
