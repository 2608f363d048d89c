mod alerts;
mod config;
mod error;
mod pomodoro;
mod pump;
mod storage;
mod ui;

use std::io::{self, BufRead, Stderr, Stdout};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use clap::Parser;
use timer_core::{Settings, TickOutcome};
use tracing_subscriber::EnvFilter;

use crate::alerts::TerminalAlerts;
use crate::config::{Cli, Config};
use crate::pomodoro::PomodoroState;
use crate::pump::Pump;
use crate::storage::{FileStore, TimerStorage};

#[derive(Clone, Debug)]
enum AppOp {
    Pump,
    Input(String),
    InputClosed,
}

#[derive(Debug, PartialEq)]
enum Command {
    Start,
    Pause,
    Toggle,
    Reset,
    Skip,
    Set(Settings),
    Status,
    Help,
    Quit,
}

struct TimersApp {
    pomodoro: PomodoroState<FileStore, TerminalAlerts<Stdout, Stderr>>,
    pump: Pump,
    tick_interval: Duration,
    out: Stdout,
}

impl TimersApp {
    fn redraw(&mut self) {
        if let Err(e) = ui::draw_status(&mut self.out, self.pomodoro.engine()) {
            log::debug!("redraw failed: {}", e);
        }
    }

    /// Keep the tick source in step with the engine's running flag.
    fn sync_pump(&mut self) {
        if self.pomodoro.engine().is_running() {
            self.pump.start(self.tick_interval);
        } else {
            self.pump.stop();
        }
    }

    fn handle_pump(&mut self) {
        if let TickOutcome::Completed(_) = self.pomodoro.tick() {
            self.sync_pump();
        }
        self.redraw();
    }

    /// Returns false when the app should exit.
    fn handle_line(&mut self, line: &str) -> bool {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(msg) => {
                println!();
                println!("{}", msg);
                ui::draw_help(&mut self.out).ok();
                self.redraw();
                return true;
            }
        };
        log::debug!("command: {:?}", command);

        match command {
            Command::Start => self.pomodoro.start(),
            Command::Pause => self.pomodoro.pause(),
            Command::Toggle => {
                self.pomodoro.toggle();
            }
            Command::Reset => self.pomodoro.reset(),
            Command::Skip => {
                self.pomodoro.skip();
            }
            Command::Set(settings) => {
                for field in self.pomodoro.apply_settings(settings) {
                    println!("{}", ui::range_warning(field));
                }
            }
            Command::Status => {
                ui::draw_summary(&mut self.out, self.pomodoro.engine()).ok();
            }
            Command::Help => {
                ui::draw_help(&mut self.out).ok();
            }
            Command::Quit => return false,
        }
        self.sync_pump();
        self.redraw();
        true
    }
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Toggle);
    };
    let command = match head.to_ascii_lowercase().as_str() {
        "start" | "s" => Command::Start,
        "pause" | "p" => Command::Pause,
        "toggle" | "t" => Command::Toggle,
        "reset" | "r" => Command::Reset,
        "skip" | "n" => Command::Skip,
        "status" | "i" => Command::Status,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        "set" => {
            let args: Vec<&str> = words.collect();
            return parse_settings(&args).map(Command::Set);
        }
        other => return Err(format!("Unknown command: {}", other)),
    };
    match words.next() {
        Some(extra) => Err(format!("Unexpected argument: {}", extra)),
        None => Ok(command),
    }
}

/// Parse "WORK SHORT LONG N", durations in whole minutes.
fn parse_settings(args: &[&str]) -> Result<Settings, String> {
    let [work, short, long, sessions] = args else {
        return Err("Usage: set WORK SHORT LONG N".to_string());
    };
    Ok(Settings::from_minutes(
        whole_number(work)?,
        whole_number(short)?,
        whole_number(long)?,
        whole_number(sessions)?,
    ))
}

fn whole_number(s: &str) -> Result<u32, String> {
    s.parse::<u32>()
        .map_err(|_| format!("Not a whole number: {}", s))
}

fn input_thread(events: Sender<AppOp>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) => {
                if events.send(AppOp::Input(line)).is_err() {
                    return;
                }
            }
            Err(e) => {
                log::error!("stdin read failed: {}", e);
                break;
            }
        }
    }
    events.send(AppOp::InputClosed).ok();
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|e| {
        eprintln!("invalid log filter {:?}: {}", filter, e);
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_cli(Cli::parse())?;
    init_logging(&config.log_filter);
    log::info!("Timer state in {}", config.data_dir.display());

    let (events, ops) = mpsc::channel();
    let pump = Pump::spawn(events.clone(), AppOp::Pump);
    thread::spawn(move || input_thread(events));

    let storage = TimerStorage::new(FileStore::new(&config.data_dir));
    let alerts = TerminalAlerts::new(config.alerts.clone(), io::stdout(), io::stderr());
    let mut app = TimersApp {
        pomodoro: PomodoroState::open(storage, alerts),
        pump,
        tick_interval: config.tick_interval,
        out: io::stdout(),
    };

    ui::draw_help(&mut app.out)?;
    app.redraw();

    for op in ops {
        match op {
            AppOp::Pump => app.handle_pump(),
            AppOp::Input(line) => {
                if !app.handle_line(&line) {
                    break;
                }
            }
            AppOp::InputClosed => break,
        }
    }

    app.pump.stop();
    ui::draw_summary(&mut app.out, app.pomodoro.engine())?;
    Ok(())
}
