//! Colorful console output for exploration runs.
//!
//! Provides a `tracing` layer that formats cpspace events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (setup, baseline capture)
//! - **DEBUG**: Structural changes (points added, points locked)
//! - **TRACE**: Individual residual evaluations

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();

const DEFAULT_DIRECTIVES: &str = "cpspace_solver=info,cpspace_core=info";

/// Initializes console output.
///
/// Safe to call multiple times - only the first call has effect. `RUST_LOG`
/// overrides the default `info` level of the cpspace crates.
pub fn init() {
    INIT.get_or_init(|| {
        EPOCH.get_or_init(Instant::now);
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(ExplorationConsoleLayer)
            .try_init();
    });
}

fn elapsed_secs() -> f64 {
    EPOCH.get().map_or(0.0, |epoch| epoch.elapsed().as_secs_f64())
}

/// A tracing layer that formats exploration events with colors.
pub struct ExplorationConsoleLayer;

impl<S: Subscriber> Layer<S> for ExplorationConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("cpspace") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    layer: Option<u64>,
    layers: Option<u64>,
    count: Option<u64>,
    total: Option<u64>,
    movable: Option<u64>,
    locked: Option<u64>,
    variables: Option<u64>,
    residuals: Option<u64>,
    vision_types: Option<u64>,
    functors: Option<u64>,
    linked: Option<u64>,
    cost: Option<f64>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "event" {
            self.event = Some(format!("{:?}", value).trim_matches('"').to_string());
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        let slot = match field.name() {
            "layer" => &mut self.layer,
            "layers" => &mut self.layers,
            "count" => &mut self.count,
            "total" => &mut self.total,
            "movable" => &mut self.movable,
            "locked" => &mut self.locked,
            "variables" => &mut self.variables,
            "residuals" => &mut self.residuals,
            "vision_types" => &mut self.vision_types,
            "functors" => &mut self.functors,
            "linked" => &mut self.linked,
            _ => return,
        };
        *slot = Some(value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if field.name() == "cost" {
            self.cost = Some(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "event" {
            self.event = Some(value.to_string());
        }
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    match v.event.as_deref().unwrap_or("") {
        "exploration_setup" => format_setup(v),
        "cps_initialized" => format_initialized(v),
        "cps_points_added" => format_points_added(v),
        "exploration_locked" | "exploration_unlocked" => format_locked(v),
        "cps_buddies_linked" => format_linked(v),
        "exploration_evaluated" if level == Level::TRACE => format_evaluated(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn number(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_setup(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} Exploring layer {} │ {} movable │ {} locked │ {} variables │ {} residuals",
        format_elapsed(),
        "▶".bright_green().bold(),
        number(v.layer).white().bold(),
        number(v.movable).bright_yellow(),
        number(v.locked).bright_yellow(),
        number(v.variables).bright_magenta(),
        number(v.residuals).bright_magenta(),
    );
    if let Some(vision) = v.vision_types.filter(|&n| n > 1) {
        output.push_str(&format!(" │ {} vision types", vision.bright_cyan()));
    }
    output
}

fn format_initialized(v: &EventVisitor) -> String {
    format!(
        "{} {} Baselines captured │ {} functors │ {} layers",
        format_elapsed(),
        "◆".bright_cyan().bold(),
        number(v.functors).bright_yellow(),
        number(v.layers).white(),
    )
}

fn format_points_added(v: &EventVisitor) -> String {
    format!(
        "{} {} {} points on layer {} │ {} total",
        format_elapsed(),
        "+".bright_blue(),
        number(v.count).white(),
        number(v.layer).white(),
        number(v.total).bright_black(),
    )
}

fn format_locked(v: &EventVisitor) -> String {
    let verb = if v.event.as_deref() == Some("exploration_locked") {
        "Locked"
    } else {
        "Unlocked"
    };
    format!(
        "{} {} {} {} points │ {} locked",
        format_elapsed(),
        "●".bright_blue(),
        verb,
        number(v.count).white(),
        number(v.total).bright_yellow(),
    )
}

fn format_linked(v: &EventVisitor) -> String {
    format!(
        "{} {} Linked {} buddy constraints",
        format_elapsed(),
        "↔".bright_blue(),
        number(v.linked).white(),
    )
}

fn format_evaluated(v: &EventVisitor) -> String {
    format!(
        "{} {} {:>8} residuals │ cost {}",
        format_elapsed(),
        "·".bright_black(),
        number(v.residuals).bright_black(),
        format_cost(v.cost.unwrap_or(f64::NAN)),
    )
}

fn format_cost(cost: f64) -> String {
    let text = format!("{:.6e}", cost);
    if !cost.is_finite() {
        text.bright_red().to_string()
    } else if cost == 0.0 {
        text.bright_green().to_string()
    } else {
        text.white().to_string()
    }
}
