use std::time::Duration;

use chrono::Local;
use clap::Args;
use lockin_core::error::Result;
use lockin_core::focus::FocusPoller;
use lockin_core::{
    AlertResolution, Config, Database, Event, FocusSignal, Phase, SessionController, SharedFocus,
    Snapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::FocusSource;

#[derive(Args)]
pub struct RunArgs {
    /// Keep lives in memory only; nothing is written to disk
    #[arg(long)]
    pub ephemeral: bool,
    /// Only print events, not the per-tick status line
    #[arg(long, short)]
    pub quiet: bool,
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    /// Answer to the pause prompt.
    Confirm(bool),
    Refocus,
    GiveUp,
    Reset,
    Work(String),
    Break(String),
    Status,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let command = match word.to_ascii_lowercase().as_str() {
        "start" => Command::Start,
        "pause" => Command::Pause,
        "yes" | "y" => Command::Confirm(true),
        "no" | "n" => Command::Confirm(false),
        "refocus" => Command::Refocus,
        "giveup" => Command::GiveUp,
        "reset" => Command::Reset,
        "work" => Command::Work(rest.to_string()),
        "break" => Command::Break(rest.to_string()),
        "status" => Command::Status,
        "quit" | "exit" => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// Hand a command to the controller. Rejected intents yield no events.
pub fn apply(controller: &mut SessionController, command: Command) -> Vec<Event> {
    match command {
        Command::Start => controller.start().into_iter().collect(),
        Command::Pause => controller.request_pause().into_iter().collect(),
        Command::Confirm(confirmed) => controller.resolve_pause(confirmed),
        Command::Refocus => controller.resolve_alert(AlertResolution::Refocus),
        Command::GiveUp => controller.resolve_alert(AlertResolution::GiveUp),
        Command::Reset => controller.reset().into_iter().collect(),
        Command::Work(text) => controller.set_work_minutes_text(&text).into_iter().collect(),
        Command::Break(text) => controller.set_break_minutes_text(&text).into_iter().collect(),
        Command::Status | Command::Quit => Vec::new(),
    }
}

pub fn status_line(snapshot: &Snapshot) -> String {
    let phase = match snapshot.phase {
        Phase::Locked => "locked",
        Phase::Idle => "idle",
        Phase::Active => "active",
        Phase::Alerting => "alert",
    };
    let mut line = format!(
        "[{phase}] {} {} lives={} focused={}",
        snapshot.kind.label(),
        snapshot.remaining_label(),
        snapshot.lives,
        snapshot.is_focused,
    );
    if snapshot.unfocused_secs > 0 {
        line.push_str(&format!(" unfocused={}s", snapshot.unfocused_secs));
    }
    if let Some(date) = snapshot.lockout_date {
        line.push_str(&format!(" locked_on={date}"));
    }
    line
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = Config::load()?;
    let controller = super::build_controller(&config, args.ephemeral)?;
    let history = if args.ephemeral {
        None
    } else {
        Some(Database::open()?)
    };
    let source = super::focus_source(&config.focus)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session_loop(controller, history, source, &config, args.quiet))
}

async fn session_loop(
    mut controller: SessionController,
    history: Option<Database>,
    source: FocusSource,
    config: &Config,
    quiet: bool,
) -> Result<()> {
    let focus = SharedFocus::new();
    let mut poller = match source {
        FocusSource::Static(signal) => {
            focus.set(signal.read());
            None
        }
        FocusSource::Http(client) => Some(FocusPoller::spawn(
            client,
            focus.clone(),
            config.focus.poll_interval(),
        )),
    };

    info!(
        work_minutes = config.schedule.work_minutes,
        break_minutes = config.schedule.break_minutes,
        "session loop started"
    );
    println!("{}", status_line(&controller.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = controller.tick(focus.read());
                emit(&report.events, history.as_ref());
                if !quiet {
                    println!("{}", status_line(&report.snapshot));
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(Command::Quit) => break,
                    Some(Command::Status) => {
                        println!("{}", serde_json::to_string(&controller.snapshot())?);
                    }
                    Some(command) => {
                        let events = apply(&mut controller, command);
                        if events.is_empty() {
                            eprintln!("ignored in phase {:?}: {}", controller.phase(), line.trim());
                        }
                        emit(&events, history.as_ref());
                    }
                    None => eprintln!(
                        "unknown command: {} (start, pause, yes, no, refocus, giveup, reset, work <min>, break <min>, status, quit)",
                        line.trim()
                    ),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    if let Some(poller) = poller.as_mut() {
        poller.stop().await;
    }
    info!("session loop stopped");
    Ok(())
}

fn emit(events: &[Event], history: Option<&Database>) {
    for event in events {
        if let (Event::SessionCompleted { kind, duration_secs, .. }, Some(db)) = (event, history) {
            if let Err(e) = db.record_session(*kind, *duration_secs, Local::now()) {
                warn!(error = %e, "failed to record completed session");
            }
        }
        match serde_json::to_string(event) {
            Ok(json) => println!("{json}"),
            Err(e) => warn!(error = %e, "failed to encode event"),
        }
    }
}
