//! Command dispatch and the interactive logging loop

use std::io::{self, BufRead};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use clap::CommandFactory;
use clap_complete::generate;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::services::{EmotionSession, MonthHistory, YearMonth};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{
    DomainError, EmotionNode, NavInput, StoredSession, Taxonomy, TraversalState,
    DEFAULT_INTENSITY, TRIGGER_MAX_CHARS,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{RealFileSystem, SystemClock};
use crate::infrastructure::{InMemorySessionStore, InfraError};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `feelflow --help`".to_string(),
        ));
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = load_settings(cli)?;
    match command {
        Commands::Log { dry_run } => cmd_log(settings, *dry_run),
        Commands::History { year, month, day } => cmd_history(settings, *year, *month, *day),
        Commands::Recent { limit } => cmd_recent(settings, *limit),
        Commands::Taxonomy { file } => cmd_taxonomy(settings, file.as_deref()),
        Commands::Config { command } => cmd_config(&settings, command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(user) = &cli.user {
        settings.user_id = user.clone();
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

// ============================================================
// log
// ============================================================

/// One line of user input while browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Nav(NavInput),
    Quit,
}

/// Map typed input to a gesture. Case-insensitive.
pub fn parse_gesture(line: &str) -> Option<Gesture> {
    match line.trim().to_ascii_lowercase().as_str() {
        "a" | "advance" | "right" | "l" => Some(Gesture::Nav(NavInput::Advance)),
        "s" | "skip" | "left" | "h" => Some(Gesture::Nav(NavInput::Skip)),
        "r" | "reset" => Some(Gesture::Nav(NavInput::Reset)),
        "q" | "quit" | "exit" => Some(Gesture::Quit),
        _ => None,
    }
}

/// Counts of what an interactive run produced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogSummary {
    /// Sessions the store accepted
    pub logged: usize,
    /// Sessions finalized but rejected by the store
    pub unsaved: usize,
}

#[instrument(skip(settings))]
fn cmd_log(settings: Settings, dry_run: bool) -> CliResult<()> {
    let container = if dry_run {
        ServiceContainer::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(SystemClock),
            Arc::new(InMemorySessionStore::new()),
        )?
    } else {
        ServiceContainer::new(settings)?
    };

    let mut session = container.emotion_session();
    let stdin = io::stdin();
    let summary = run_interactive(&mut session, &mut stdin.lock())?;

    output::info(&format!(
        "{} session(s) logged{}",
        summary.logged,
        if dry_run { " (dry run)" } else { "" }
    ));
    if summary.unsaved > 0 {
        output::warning(&format!("{} session(s) could not be saved", summary.unsaved));
    }
    Ok(())
}

/// Drive a session from line-based input until quit or end of input.
pub fn run_interactive<R: BufRead>(
    session: &mut EmotionSession,
    input: &mut R,
) -> CliResult<LogSummary> {
    let mut summary = LogSummary::default();
    let max_depth = session.navigator().taxonomy().max_depth();

    loop {
        if let Some(pending) = session.pending().cloned() {
            let leaf = pending.leaf();
            output::info(&format!("Selected {}", output::emotion(&leaf.name, &leaf.color)));
            output::hint(&pending.path_names().join(" → "));
            output::prompt(&format!(
                "Intensity 1-10 [{}], c to cancel, r to reset:",
                DEFAULT_INTENSITY
            ));

            let Some(line) = read_line(input)? else {
                break;
            };
            let intensity = match line.trim() {
                "c" | "cancel" => {
                    session
                        .apply(NavInput::CancelContext)
                        .map_err(ApplicationError::from)?;
                    continue;
                }
                "r" | "reset" => {
                    session.apply(NavInput::Reset).map_err(ApplicationError::from)?;
                    continue;
                }
                "q" | "quit" => break,
                "" => i64::from(DEFAULT_INTENSITY),
                s => match s.parse::<i64>() {
                    Ok(v) => v,
                    Err(_) => {
                        output::warning(&format!("not a number: {s}"));
                        continue;
                    }
                },
            };

            output::prompt(&format!(
                "What triggered this? (max {} chars):",
                TRIGGER_MAX_CHARS
            ));
            let Some(trigger) = read_line(input)? else {
                break;
            };

            match session.submit(intensity, &trigger) {
                Ok(outcome) => match &outcome.persisted {
                    Ok(_) => {
                        summary.logged += 1;
                        output::success(&format!(
                            "Logged {} ({})",
                            outcome.record.leaf_emotion,
                            output::intensity(outcome.record.intensity)
                        ));
                    }
                    Err(e) => {
                        summary.unsaved += 1;
                        output::warning(&format!("not saved: {e}"));
                    }
                },
                Err(ApplicationError::Domain(e @ DomainError::IntensityOutOfRange { .. })) => {
                    output::warning(&e);
                }
                Err(e) => return Err(e.into()),
            }
            continue;
        }

        if let Some(traversal) = session.navigator().browsing() {
            render_card(traversal, max_depth);
        }
        output::prompt("[a]dvance [s]kip [r]eset [q]uit:");
        let Some(line) = read_line(input)? else {
            break;
        };
        match parse_gesture(&line) {
            Some(Gesture::Quit) => break,
            Some(Gesture::Nav(nav)) => {
                if let Err(e) = session.apply(nav) {
                    output::warning(&e);
                }
            }
            None => output::warning(&format!("unknown input {:?}", line.trim())),
        }
    }

    Ok(summary)
}

fn read_line<R: BufRead>(input: &mut R) -> CliResult<Option<String>> {
    let mut buf = String::new();
    let n = input
        .read_line(&mut buf)
        .map_err(|e| InfraError::io("read input", e))?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(
        buf.trim_end_matches(|c| c == '\r' || c == '\n').to_string(),
    ))
}

fn render_card(traversal: &TraversalState, max_depth: usize) {
    let node = traversal.current();
    output::info("");
    output::header(&format!("Layer {} of {}", traversal.depth(), max_depth));
    if !traversal.path().is_empty() {
        let path: Vec<&str> = traversal.path().iter().map(|n| n.name.as_str()).collect();
        output::hint(&path.join(" → "));
    }
    output::info(&format!(
        "{}  ({}/{})",
        output::emotion(&node.name, &node.color),
        traversal.cursor() + 1,
        traversal.level().len()
    ));
    if !node.definition.is_empty() {
        output::detail(&node.definition);
    }
    output::hint(if node.is_leaf() {
        "advance to select"
    } else {
        "advance to explore"
    });
}

// ============================================================
// history / recent
// ============================================================

#[instrument(skip(settings))]
fn cmd_history(
    settings: Settings,
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
) -> CliResult<()> {
    let user_id = settings.user_id.clone();
    let container = ServiceContainer::new(settings)?;
    let history = container.history_service();
    let offset = history.offset();

    let today = Utc::now().with_timezone(&offset);
    let ym = YearMonth::new(year.unwrap_or(today.year()), month.unwrap_or(today.month()))
        .map_err(|e| CliError::InvalidArgs(e.to_string()))?;
    if let Some(d) = day {
        if !(1..=ym.days_in_month()).contains(&d) {
            return Err(CliError::InvalidArgs(format!("{ym} has no day {d}")));
        }
    }

    let month_history = history.month(&user_id, ym)?;
    render_calendar(&month_history);

    let days: Vec<u32> = match day {
        Some(d) => vec![d],
        None => month_history.by_day.keys().rev().copied().collect(),
    };
    for d in days {
        output::info("");
        output::header(&format!("{} {}", MONTHS[(ym.month - 1) as usize], d));
        let sessions = month_history.sessions_on(d);
        if sessions.is_empty() {
            output::detail(&"no sessions");
        }
        for session in sessions {
            render_session(session, offset, "%H:%M");
        }
    }
    Ok(())
}

fn render_calendar(history: &MonthHistory) {
    let ym = history.month;
    output::header(&format!("{} {}", MONTHS[(ym.month - 1) as usize], ym.year));
    let head: String = WEEKDAYS.iter().map(|d| format!("{:>3} ", d)).collect();
    output::info(head.trim_end());
    for week in history.calendar.chunks(7) {
        let row: String = week
            .iter()
            .map(|cell| match cell {
                Some(d) if history.has_sessions(*d) => format!("{:>3}*", d),
                Some(d) => format!("{:>3} ", d),
                None => "    ".to_string(),
            })
            .collect();
        output::info(row.trim_end());
    }
    output::hint(&format!(
        "{} session(s); * marks days with entries",
        history.total()
    ));
}

fn render_session(session: &StoredSession, offset: FixedOffset, time_format: &str) {
    let record = &session.record;
    let when = DateTime::parse_from_rfc3339(&record.timestamp)
        .map(|ts| ts.with_timezone(&offset).format(time_format).to_string())
        .unwrap_or_else(|_| record.timestamp.clone());
    output::detail(&format!(
        "{}  {}  {}",
        when,
        record.emotion_path.join(" → "),
        output::intensity(record.intensity)
    ));
    if !record.trigger.is_empty() {
        output::detail(&format!("    \"{}\"", record.trigger));
    }
}

#[instrument(skip(settings))]
fn cmd_recent(settings: Settings, limit: Option<usize>) -> CliResult<()> {
    let user_id = settings.user_id.clone();
    let limit = limit.unwrap_or(settings.history.recent_limit);
    let container = ServiceContainer::new(settings)?;
    let history = container.history_service();

    let sessions = history.recent(&user_id, limit)?;
    if sessions.is_empty() {
        output::info(&format!("no sessions for {user_id}"));
        return Ok(());
    }
    for session in &sessions {
        render_session(session, history.offset(), "%Y-%m-%d %H:%M");
    }
    Ok(())
}

// ============================================================
// taxonomy / config
// ============================================================

fn emotion_tree(node: &EmotionNode) -> Tree<String> {
    Tree::new(format!("{} ({})", node.name, node.id))
        .with_leaves(node.children.iter().map(|child| emotion_tree(child)))
}

#[instrument(skip(settings))]
fn cmd_taxonomy(settings: Settings, file: Option<&Path>) -> CliResult<()> {
    let container = ServiceContainer::new(settings)?;
    let loaded: Taxonomy;
    let taxonomy: &Taxonomy = match file {
        Some(path) => {
            loaded = container.taxonomy_service().load_file(path)?;
            &loaded
        }
        None => container.taxonomy.as_ref(),
    };

    for root in taxonomy.roots() {
        output::info(&emotion_tree(root));
    }
    output::hint(&format!(
        "{} emotions, {} selectable, {} levels",
        taxonomy.node_count(),
        taxonomy.leaves().len(),
        taxonomy.max_depth()
    ));
    Ok(())
}

fn cmd_config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("config", &path.display()),
                None => output::action("config", "(no config directory)"),
            }
            output::action("sessions", &settings.sessions_path().display());
        }
    }
    Ok(())
}
