//! Operator Console
//!
//! Line-oriented command set for driving a [`ProductionFloor`] headlessly.
//! Commands are parsed with [`FromStr`] and run through [`Console::execute`],
//! which returns the floor events plus human-readable output lines. Machine
//! arguments are 0-based positions in the floor's current ordering.
//!
//! ```text
//! add [model]            remove <n>             on <n|all>
//! off <n|all>            toggle <n>             replace <n> <bearing|all>
//! multiplier <x>         step [count]           advance <seconds>
//! pause | resume | reset status                 attention [threshold]
//! schedule               alerts                 inspect <n> [full]
//! bearings               threshold [warning|critical <x>]
//! help | quit
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::config::{defaults, AlertLevel, HealthThresholds};
use crate::twin::{AttentionItem, FloorEvent, Machine, MachineId, ProductionFloor, TwinError};
use crate::types::Feature;

// ============================================================================
// Commands
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    One(usize),
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add { model: Option<String> },
    Remove(usize),
    On(Target),
    Off(Target),
    Toggle(usize),
    Replace { machine: usize, bearing: Target },
    Multiplier(f64),
    Step(u32),
    Advance(f64),
    Pause,
    Resume,
    Reset,
    Status,
    Attention(Option<f64>),
    Schedule,
    Alerts,
    Inspect { machine: usize, full: bool },
    Bearings,
    /// `None` shows the current settings.
    Threshold(Option<(AlertLevel, f64)>),
    Help,
    Quit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("Usage: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid argument '{value}' for {command}: {reason}")]
    InvalidArgument {
        command: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("No machine at index {index} (floor has {count})")]
    MachineIndexOutOfRange { index: usize, count: usize },

    #[error(transparent)]
    Twin(#[from] TwinError),
}

const HELP: &[&str] = &[
    "add [model]              add a machine (random catalogue model if omitted)",
    "remove <n>               remove machine n",
    "on <n|all> / off <n|all> power machines on or off",
    "toggle <n>               flip power on machine n",
    "replace <n> <b|all>      replace bearing b (or all bearings) on machine n",
    "multiplier <x>           set the time multiplier (>= 0)",
    "step [count]             run count forced iterations (default 1)",
    "advance <seconds>        feed real seconds to the clock, running every due iteration",
    "pause / resume           suspend or resume clock-driven ticks",
    "reset                    remove every machine and reset the clock",
    "status                   floor and machine overview",
    "attention [threshold]    bearings at or above a RUL threshold",
    "schedule                 maintenance schedule (critical / warning)",
    "alerts                   recent failure alerts",
    "inspect <n> [full]       bearing health of machine n (full: every feature)",
    "bearings                 every bearing on the floor, most degraded first",
    "threshold [level <x>]    show settings, or set the warning/critical alert RUL (0..1)",
    "quit                     leave the console",
];

fn parse_index(command: &'static str, value: &str) -> Result<usize, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        value: value.to_string(),
        reason: "expected a non-negative integer",
    })
}

fn parse_target(command: &'static str, value: &str) -> Result<Target, CommandError> {
    if value.eq_ignore_ascii_case("all") {
        Ok(Target::All)
    } else {
        parse_index(command, value).map(Target::One)
    }
}

fn parse_non_negative(command: &'static str, value: &str) -> Result<f64, CommandError> {
    let trimmed = value.trim_end_matches(['x', 'X']);
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(CommandError::InvalidArgument {
            command,
            value: value.to_string(),
            reason: "expected a finite number >= 0",
        }),
    }
}

fn parse_fraction(command: &'static str, value: &str) -> Result<f64, CommandError> {
    match value.parse::<f64>() {
        Ok(v) if (0.0..=1.0).contains(&v) => Ok(v),
        _ => Err(CommandError::InvalidArgument {
            command,
            value: value.to_string(),
            reason: "expected a number within [0, 1]",
        }),
    }
}

fn parse_level(value: &str) -> Result<AlertLevel, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "warning" | "warn" | "w" => Ok(AlertLevel::Warning),
        "critical" | "crit" | "c" => Ok(AlertLevel::Critical),
        _ => Err(CommandError::InvalidArgument {
            command: "threshold",
            value: value.to_string(),
            reason: "expected 'warning' or 'critical'",
        }),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Err(CommandError::Empty);
        };
        let args: Vec<&str> = parts.collect();
        let first = args.first().copied();

        let command = match word.to_ascii_lowercase().as_str() {
            "add" => Self::Add {
                model: (!args.is_empty()).then(|| args.join(" ")),
            },
            "remove" | "rm" => {
                let n = first.ok_or(CommandError::MissingArgument("remove <n>"))?;
                Self::Remove(parse_index("remove", n)?)
            }
            "on" => Self::On(parse_target(
                "on",
                first.ok_or(CommandError::MissingArgument("on <n|all>"))?,
            )?),
            "off" => Self::Off(parse_target(
                "off",
                first.ok_or(CommandError::MissingArgument("off <n|all>"))?,
            )?),
            "toggle" => {
                let n = first.ok_or(CommandError::MissingArgument("toggle <n>"))?;
                Self::Toggle(parse_index("toggle", n)?)
            }
            "replace" => {
                let (Some(machine), Some(bearing)) = (args.first(), args.get(1)) else {
                    return Err(CommandError::MissingArgument("replace <n> <bearing|all>"));
                };
                Self::Replace {
                    machine: parse_index("replace", machine)?,
                    bearing: parse_target("replace", bearing)?,
                }
            }
            "multiplier" | "speed" => {
                let x = first.ok_or(CommandError::MissingArgument("multiplier <x>"))?;
                Self::Multiplier(parse_non_negative("multiplier", x)?)
            }
            "step" => match first {
                None => Self::Step(1),
                Some(n) => match n.parse::<u32>() {
                    Ok(count) if count > 0 => Self::Step(count),
                    _ => {
                        return Err(CommandError::InvalidArgument {
                            command: "step",
                            value: n.to_string(),
                            reason: "expected a positive integer",
                        })
                    }
                },
            },
            "advance" => {
                let s = first.ok_or(CommandError::MissingArgument("advance <seconds>"))?;
                Self::Advance(parse_non_negative("advance", s)?)
            }
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "reset" => Self::Reset,
            "status" | "ls" => Self::Status,
            "attention" => Self::Attention(first.map(|t| parse_non_negative("attention", t)).transpose()?),
            "schedule" => Self::Schedule,
            "alerts" => Self::Alerts,
            "inspect" | "info" => {
                let n = first.ok_or(CommandError::MissingArgument("inspect <n> [full]"))?;
                let full = match args.get(1) {
                    None => false,
                    Some(mode) if mode.eq_ignore_ascii_case("full") => true,
                    Some(mode) => {
                        return Err(CommandError::InvalidArgument {
                            command: "inspect",
                            value: (*mode).to_string(),
                            reason: "expected 'full'",
                        })
                    }
                };
                Self::Inspect {
                    machine: parse_index("inspect", n)?,
                    full,
                }
            }
            "bearings" | "monitor" => Self::Bearings,
            "threshold" | "settings" => match (args.first(), args.get(1)) {
                (None, _) => Self::Threshold(None),
                (Some(level), Some(value)) => {
                    Self::Threshold(Some((parse_level(level)?, parse_fraction("threshold", value)?)))
                }
                (Some(_), None) => {
                    return Err(CommandError::MissingArgument("threshold <warning|critical> <x>"))
                }
            },
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

// ============================================================================
// Alert Log
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub timestamp: DateTime<Utc>,
    pub iteration: u64,
    pub message: String,
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Bounded log of failure alerts, oldest dropped first.
#[derive(Debug, Clone)]
pub struct AlertLog {
    entries: VecDeque<Alert>,
    capacity: usize,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::with_capacity(defaults::MAX_ALERT_LOG)
    }
}

impl AlertLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Log every `BearingFailed` in `events`.
    pub fn record(&mut self, events: &[FloorEvent]) {
        for event in events {
            if let FloorEvent::BearingFailed {
                machine,
                model,
                bearing_index,
                position,
                iteration,
                ..
            } = event
            {
                if self.entries.len() == self.capacity {
                    self.entries.pop_front();
                }
                self.entries.push_back(Alert {
                    timestamp: Utc::now(),
                    iteration: *iteration,
                    message: format!(
                        "FAILURE: Machine {model} ({machine}) - Bearing {bearing_index} ({position}) has FAILED!"
                    ),
                });
            }
        }
    }

    /// Newest first.
    pub fn recent(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ============================================================================
// Execution
// ============================================================================

#[derive(Debug, Default, Clone)]
pub struct CommandOutcome {
    pub events: Vec<FloorEvent>,
    pub lines: Vec<String>,
    pub quit: bool,
}

impl CommandOutcome {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            ..Self::default()
        }
    }
}

/// A floor plus the console-side alert log.
#[derive(Debug)]
pub struct Console {
    floor: ProductionFloor,
    alerts: AlertLog,
}

impl Console {
    pub fn new(floor: ProductionFloor) -> Self {
        Self {
            floor,
            alerts: AlertLog::default(),
        }
    }

    pub const fn floor(&self) -> &ProductionFloor {
        &self.floor
    }

    pub fn floor_mut(&mut self) -> &mut ProductionFloor {
        &mut self.floor
    }

    pub const fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    /// Feed real elapsed seconds, logging any failures.
    pub fn tick(&mut self, real_delta_seconds: f64) -> Result<Vec<FloorEvent>, TwinError> {
        let result = self.floor.tick(real_delta_seconds);
        self.record(&result);
        result
    }

    /// Failures committed before an aborted sweep are logged too.
    fn record(&mut self, result: &Result<Vec<FloorEvent>, TwinError>) {
        match result {
            Ok(events) => self.alerts.record(events),
            Err(e) => self.alerts.record(e.committed_events()),
        }
    }

    /// Parse and run one line.
    pub fn run_line(&mut self, line: &str) -> Result<CommandOutcome, CommandError> {
        let command: Command = line.parse()?;
        self.execute(&command)
    }

    pub fn execute(&mut self, command: &Command) -> Result<CommandOutcome, CommandError> {
        let outcome = match command {
            Command::Add { model } => {
                let id = self.floor.add_new_machine(model.as_deref());
                let machine = self.machine_by_id(id)?;
                CommandOutcome::line(format!(
                    "Added {id} ({}) with {} bearings at index {}",
                    machine.model(),
                    machine.bearing_count(),
                    self.floor.machine_count() - 1
                ))
            }
            Command::Remove(index) => {
                let id = self.id_at(*index)?;
                self.floor.remove_machine(id);
                CommandOutcome::line(format!("Removed {id}"))
            }
            Command::On(Target::All) => {
                let switched = self.floor.turn_all_on();
                CommandOutcome::line(format!("{switched} machine(s) powered on"))
            }
            Command::On(Target::One(index)) => {
                let machine = self.machine_at(*index)?;
                if machine.turn_on() {
                    CommandOutcome::line(format!("{} is RUNNING", machine.id()))
                } else {
                    CommandOutcome::line(format!(
                        "{} refused power-on: replace failed bearing {} first",
                        machine.id(),
                        machine.failed_bearing_index().unwrap_or_default()
                    ))
                }
            }
            Command::Off(Target::All) => {
                let switched = self.floor.turn_all_off();
                CommandOutcome::line(format!("{switched} machine(s) powered off"))
            }
            Command::Off(Target::One(index)) => {
                let machine = self.machine_at(*index)?;
                machine.turn_off();
                CommandOutcome::line(format!("{} is {}", machine.id(), machine.status()))
            }
            Command::Toggle(index) => {
                let machine = self.machine_at(*index)?;
                machine.toggle_power();
                CommandOutcome::line(format!("{} is {}", machine.id(), machine.status()))
            }
            Command::Replace { machine, bearing } => {
                let id = self.id_at(*machine)?;
                match bearing {
                    Target::All => {
                        self.floor.replace_all_bearings(id)?;
                        CommandOutcome::line(format!("Replaced all bearings on {id}"))
                    }
                    Target::One(b) => {
                        self.floor.replace_bearing(id, *b)?;
                        let status = self.machine_by_id(id)?.status();
                        CommandOutcome::line(format!("Replaced bearing {b} on {id} (machine {status})"))
                    }
                }
            }
            Command::Multiplier(x) => {
                self.floor.set_time_multiplier(*x);
                CommandOutcome::line(format!("Time multiplier {}x", self.floor.time_multiplier()))
            }
            Command::Step(count) => {
                let mut events = Vec::new();
                for _ in 0..*count {
                    match self.floor.force_tick() {
                        Ok(batch) => events.extend(batch),
                        Err(e) => {
                            let e = e.after(events);
                            self.alerts.record(e.committed_events());
                            return Err(e.into());
                        }
                    }
                }
                self.alerts.record(&events);
                let mut lines: Vec<String> = events
                    .iter()
                    .filter(|e| e.is_failure())
                    .map(ToString::to_string)
                    .collect();
                lines.push(format!("Iteration {}", self.floor.total_iterations()));
                CommandOutcome {
                    events,
                    lines,
                    quit: false,
                }
            }
            Command::Advance(seconds) => {
                let result = self.floor.advance(*seconds);
                self.record(&result);
                let events = result?;
                let ran = events.iter().filter(|e| !e.is_failure()).count();
                let mut lines: Vec<String> = events
                    .iter()
                    .filter(|e| e.is_failure())
                    .map(ToString::to_string)
                    .collect();
                lines.push(format!(
                    "{ran} iteration(s) run, {:.0}% toward the next",
                    self.floor.progress_to_next_tick() * 100.0
                ));
                CommandOutcome {
                    events,
                    lines,
                    quit: false,
                }
            }
            Command::Pause => {
                self.floor.pause();
                CommandOutcome::line("Paused")
            }
            Command::Resume => {
                self.floor.resume();
                CommandOutcome::line("Resumed")
            }
            Command::Reset => {
                self.floor.reset();
                self.alerts.clear();
                CommandOutcome::line("Production floor reset")
            }
            Command::Status => CommandOutcome {
                lines: status_lines(&self.floor),
                ..CommandOutcome::default()
            },
            Command::Attention(threshold) => {
                let threshold = threshold.unwrap_or(self.floor.health_thresholds().attention_rul);
                let mut lines: Vec<String> = self
                    .floor
                    .bearings_needing_attention(threshold)
                    .map(|item| {
                        format!(
                            "  {} {:<22} bearing {} ({}) RUL {:.3} health {:.1}%",
                            item.machine.id(),
                            item.machine.model(),
                            item.index,
                            item.bearing.position(),
                            item.rul(),
                            item.bearing.health_percentage()
                        )
                    })
                    .collect();
                lines.insert(0, format!("{} bearing(s) with RUL >= {threshold}", lines.len()));
                CommandOutcome {
                    lines,
                    ..CommandOutcome::default()
                }
            }
            Command::Schedule => CommandOutcome {
                lines: schedule_lines(&self.floor),
                ..CommandOutcome::default()
            },
            Command::Alerts => {
                let mut lines = vec![format!("Last {} alert(s):", self.alerts.len())];
                lines.extend(self.alerts.recent().map(|a| format!("  {a}")));
                CommandOutcome {
                    lines,
                    ..CommandOutcome::default()
                }
            }
            Command::Inspect { machine, full } => CommandOutcome {
                lines: inspect_lines(self.machine_ref(*machine)?, self.floor.health_thresholds(), *full),
                ..CommandOutcome::default()
            },
            Command::Bearings => CommandOutcome {
                lines: bearing_monitor_lines(&self.floor),
                ..CommandOutcome::default()
            },
            Command::Threshold(None) => CommandOutcome {
                lines: settings_lines(&self.floor),
                ..CommandOutcome::default()
            },
            Command::Threshold(Some((level, rul))) => {
                self.floor.set_alert_threshold(*level, *rul)?;
                let mut lines = vec![format!("{level} alert threshold set to RUL >= {rul}")];
                lines.extend(settings_lines(&self.floor));
                CommandOutcome {
                    lines,
                    ..CommandOutcome::default()
                }
            }
            Command::Help => CommandOutcome {
                lines: HELP.iter().map(|l| format!("  {l}")).collect(),
                ..CommandOutcome::default()
            },
            Command::Quit => CommandOutcome {
                quit: true,
                ..CommandOutcome::default()
            },
        };
        debug!(command = ?command, "Console command executed");
        Ok(outcome)
    }

    fn id_at(&self, index: usize) -> Result<MachineId, CommandError> {
        self.machine_ref(index).map(Machine::id)
    }

    fn machine_ref(&self, index: usize) -> Result<&Machine, CommandError> {
        self.floor
            .get_machine_by_index(index)
            .ok_or(CommandError::MachineIndexOutOfRange {
                index,
                count: self.floor.machine_count(),
            })
    }

    fn machine_at(&mut self, index: usize) -> Result<&mut Machine, CommandError> {
        let count = self.floor.machine_count();
        self.floor
            .machine_by_index_mut(index)
            .ok_or(CommandError::MachineIndexOutOfRange { index, count })
    }

    fn machine_by_id(&self, id: MachineId) -> Result<&Machine, CommandError> {
        self.floor
            .get_machine(id)
            .ok_or(CommandError::Twin(TwinError::MachineNotFound(id)))
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Floor overview: header, counts, one line per machine.
pub fn status_lines(floor: &ProductionFloor) -> Vec<String> {
    let snapshot = floor.snapshot();
    let mut lines = vec![
        format!(
            "Iteration {} | {:.2} h simulated | multiplier {}x{}",
            snapshot.total_iterations,
            snapshot.simulated_hours,
            snapshot.time_multiplier,
            if snapshot.paused { " | PAUSED" } else { "" }
        ),
        format!(
            "Machines: {} total | {} active | {} off | {} failed | {} bearings",
            floor.machine_count(),
            floor.active_machine_count(),
            floor.off_machine_count(),
            floor.failed_machine_count(),
            floor.total_bearing_count()
        ),
    ];
    for (index, machine) in snapshot.machines.iter().enumerate() {
        let revolutions = machine
            .bearings
            .iter()
            .map(|b| b.revolutions)
            .fold(0.0_f64, f64::max);
        lines.push(format!(
            "  [{index}] {} {:<22} {:<8} {} bearings  lowest health {:>5.1}%  {revolutions:>12.0} rev",
            machine.id,
            machine.model,
            machine.status.to_string(),
            machine.bearings.len(),
            machine.lowest_health_percentage,
        ));
    }
    lines
}

/// Maintenance schedule split by the alert thresholds.
pub fn schedule_lines(floor: &ProductionFloor) -> Vec<String> {
    let thresholds = floor.health_thresholds();
    let items: Vec<AttentionItem<'_>> = floor
        .bearings_needing_attention(thresholds.alert_warning_rul)
        .collect();
    if items.is_empty() {
        return vec!["No bearings currently require scheduled maintenance.".to_string()];
    }

    let (critical, warning): (Vec<&AttentionItem<'_>>, Vec<&AttentionItem<'_>>) = items
        .iter()
        .partition(|item| item.rul() >= thresholds.alert_critical_rul);

    let mut lines = Vec::new();
    for (title, group) in [("IMMEDIATE ACTION REQUIRED:", &critical), ("SCHEDULE MAINTENANCE:", &warning)] {
        if group.is_empty() {
            continue;
        }
        lines.push(title.to_string());
        for item in group {
            lines.push(format!(
                "  - {} ({}) bearing {} ({}) health {:.1}% [{}]",
                item.machine.model(),
                item.machine.id(),
                item.index,
                item.bearing.position(),
                item.bearing.health_percentage(),
                item.bearing.classify(thresholds)
            ));
        }
    }
    lines.push(format!(
        "Total requiring attention: {} (critical {}, warning {})",
        items.len(),
        critical.len(),
        warning.len()
    ));
    lines
}

const MONITOR_ROWS: usize = 20;
const HEALTH_BAR_WIDTH: usize = 30;

/// `[###---]` with `width` cells, filled in proportion to `percentage`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn health_bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Per-bearing detail of one machine. `full` appends every feature, grouped.
pub fn inspect_lines(machine: &Machine, thresholds: &HealthThresholds, full: bool) -> Vec<String> {
    let mut lines = vec![
        format!("{} {} | {}", machine.id(), machine.model(), machine.status()),
        format!("{} bearings", machine.bearing_count()),
    ];
    for bearing in machine.bearings() {
        let state = bearing.state();
        let marker = if machine.failed_bearing_index() == Some(bearing.index()) {
            " [FAILED COMPONENT]"
        } else {
            ""
        };
        lines.push(format!("Bearing {} ({}){marker}", bearing.index(), bearing.position()));
        lines.push(format!(
            "  Health      {} {:.1}% ({})",
            health_bar(bearing.health_percentage(), HEALTH_BAR_WIDTH),
            bearing.health_percentage(),
            bearing.classify(thresholds)
        ));
        lines.push(format!("  RUL         {:.6}", bearing.rul()));
        lines.push(format!("  Revolutions {:.0}", state.revolutions()));
        lines.push(format!(
            "  RMS {:.4} | Peak {:.4} | Kurtosis {:.4} | BPFO {:.6} | BPFI {:.6}",
            state.feature(Feature::Rms),
            state.feature(Feature::Peak),
            state.feature(Feature::Kurtosis),
            state.feature(Feature::EnergyBpfo),
            state.feature(Feature::EnergyBpfi)
        ));
        if full {
            let mut group = None;
            for (feature, value) in state.iter() {
                if group != Some(feature.group()) {
                    group = Some(feature.group());
                    lines.push(format!("  {}:", feature.group()));
                }
                lines.push(format!("    {:<20} {value:.6}", feature.name()));
            }
        }
    }
    lines
}

/// Every bearing on the floor, most degraded first, capped at a screenful,
/// followed by the alert-level tallies.
pub fn bearing_monitor_lines(floor: &ProductionFloor) -> Vec<String> {
    let thresholds = floor.health_thresholds();
    let items: Vec<AttentionItem<'_>> = floor.bearings_by_degradation().collect();
    if items.is_empty() {
        return vec!["No bearings on the production floor.".to_string()];
    }

    let mut lines = vec![format!("{} bearing(s), most degraded first:", items.len())];
    for item in items.iter().take(MONITOR_ROWS) {
        lines.push(format!(
            "  {} {:<22} {:<12} {:>5.1}%  {:<8} RUL {:.4}",
            item.machine.id(),
            item.machine.model(),
            item.bearing.position().to_string(),
            item.bearing.health_percentage(),
            item.bearing.classify(thresholds).to_string(),
            item.rul()
        ));
    }
    if items.len() > MONITOR_ROWS {
        lines.push(format!("  ... and {} more bearings", items.len() - MONITOR_ROWS));
    }

    let critical = items
        .iter()
        .filter(|i| i.rul() >= thresholds.alert_critical_rul)
        .count();
    let warning = items
        .iter()
        .filter(|i| i.rul() >= thresholds.alert_warning_rul && i.rul() < thresholds.alert_critical_rul)
        .count();
    if critical > 0 {
        lines.push(format!("CRITICAL: {critical} bearing(s) at or past the critical alert threshold"));
    }
    if warning > 0 {
        lines.push(format!("WARNING: {warning} bearing(s) showing significant wear"));
    }
    lines
}

/// Alert thresholds and time multiplier.
pub fn settings_lines(floor: &ProductionFloor) -> Vec<String> {
    let thresholds = floor.health_thresholds();
    let mut lines: Vec<String> = [AlertLevel::Warning, AlertLevel::Critical]
        .into_iter()
        .map(|level| {
            let rul = thresholds.alert(level);
            format!("{:<9} alert at RUL >= {rul:.2} ({:.0}% degradation)", level.to_string(), rul * 100.0)
        })
        .collect();
    lines.push(format!("Time multiplier {}x", floor.time_multiplier()));
    lines
}
