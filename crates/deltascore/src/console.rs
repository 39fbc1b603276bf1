//! Colorful console output for scoring sessions.
//!
//! Provides a custom `tracing` layer that formats session events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Session construction and weight overrides
//! - **DEBUG**: One line per flush with its work and resulting score
//! - **TRACE**: Per-node queue drains (left to the default formatter)

use std::io::{self, Write};
use std::sync::OnceLock;

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

/// Directive applied when `RUST_LOG` is unset or invalid.
const DEFAULT_DIRECTIVE: &str = "deltascore_scoring=info";

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect. If another
/// global subscriber is already installed, it is left in place.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(ScoreConsoleLayer)
            .try_init();
    });
}

/// A tracing layer that formats session events with colors.
pub struct ScoreConsoleLayer;

impl<S: Subscriber> Layer<S> for ScoreConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with("deltascore") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    score: Option<String>,
    constraint: Option<String>,
    declared: Option<String>,
    weight: Option<String>,
    environment_mode: Option<String>,
    node_count: Option<u64>,
    constraint_count: Option<u64>,
    fact_count: Option<u64>,
    settled: Option<u64>,
    propagated: Option<u64>,
    aborted: Option<u64>,
    elapsed_us: Option<u64>,
}

impl EventVisitor {
    fn set_text(&mut self, name: &str, value: String) {
        let slot = match name {
            "event" => &mut self.event,
            "score" => &mut self.score,
            "constraint" => &mut self.constraint,
            "declared" => &mut self.declared,
            "weight" => &mut self.weight,
            "environment_mode" => &mut self.environment_mode,
            _ => return,
        };
        *slot = Some(value);
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.set_text(field.name(), s.trim_matches('"').to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set_text(field.name(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "node_count" => self.node_count = Some(value),
            "constraint_count" => self.constraint_count = Some(value),
            "fact_count" => self.fact_count = Some(value),
            "settled" => self.settled = Some(value),
            "propagated" => self.propagated = Some(value),
            "aborted" => self.aborted = Some(value),
            "elapsed_us" => self.elapsed_us = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }
}

fn format_event(v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "session_start" => format_session_start(v),
        "flush" => format_flush(v),
        "weight_override" => format_weight_override(v),
        "unknown_weight_override" => format_unknown_override(v),
        "reset" => format_reset(v),
        _ => String::new(),
    }
}

fn format_session_start(v: &EventVisitor) -> String {
    format!(
        "{} Session │ {} nodes │ {} constraints │ {}",
        "▶".bright_green().bold(),
        count(v.node_count).bright_yellow(),
        count(v.constraint_count).bright_yellow(),
        v.environment_mode
            .as_deref()
            .unwrap_or("reproducible")
            .bright_magenta()
    )
}

fn format_flush(v: &EventVisitor) -> String {
    let mut output = format!(
        "    {} {:>8} settled │ {:>8} propagated",
        "->".bright_blue(),
        count(v.settled).white(),
        count(v.propagated).white(),
    );
    if let Some(aborted) = v.aborted.filter(|&n| n > 0) {
        output.push_str(&format!(
            " │ {} aborted",
            aborted.to_formatted_string(&Locale::en).yellow()
        ));
    }
    if let Some(elapsed) = v.elapsed_us {
        output.push_str(&format!(" │ {}", format_duration_us(elapsed).yellow()));
    }
    output.push_str(&format!(
        " │ {}",
        format_score(v.score.as_deref().unwrap_or("N/A"))
    ));
    output
}

fn format_weight_override(v: &EventVisitor) -> String {
    format!(
        "{} {} weight {} -> {}",
        "⚖".bright_cyan(),
        v.constraint.as_deref().unwrap_or("?").white().bold(),
        v.declared.as_deref().unwrap_or("?"),
        format_score(v.weight.as_deref().unwrap_or("?"))
    )
}

fn format_unknown_override(v: &EventVisitor) -> String {
    format!(
        "{} no constraint named {} (weight override ignored)",
        "!".bright_red().bold(),
        v.constraint.as_deref().unwrap_or("?").white().bold()
    )
}

fn format_reset(v: &EventVisitor) -> String {
    format!(
        "{} Reset │ {} facts replayed",
        "↺".bright_cyan(),
        count(v.fact_count).bright_yellow()
    )
}

fn count(n: Option<u64>) -> String {
    n.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_duration_us(us: u64) -> String {
    if us < 1_000 {
        format!("{}µs", us)
    } else if us < 1_000_000 {
        format!("{:.2}ms", us as f64 / 1_000.0)
    } else {
        format!("{:.2}s", us as f64 / 1_000_000.0)
    }
}

/// Colors each level of a score string by its sign.
///
/// Handles every score format, e.g. `-2hard/5soft`, `0hard/-1medium/3soft`
/// or a bare `-7`.
fn format_score(score: &str) -> String {
    score
        .split('/')
        .map(|level| {
            let digits_end = level
                .find(|c: char| c.is_ascii_alphabetic())
                .unwrap_or(level.len());
            match level[..digits_end].parse::<f64>() {
                Ok(n) if n < 0.0 => level.bright_red().to_string(),
                Ok(n) if n > 0.0 => level.bright_green().to_string(),
                _ => level.white().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        tracing::info!(target: "deltascore_scoring", event = "reset", fact_count = 3u64);
    }

    #[test]
    fn test_format_flush_groups_digits() {
        let visitor = EventVisitor {
            event: Some("flush".to_string()),
            settled: Some(12_345),
            propagated: Some(2),
            aborted: Some(0),
            score: Some("-2hard/0soft".to_string()),
            ..EventVisitor::default()
        };
        let output = format_event(&visitor);
        assert!(output.contains("12,345"));
        assert!(!output.contains("aborted"));
        assert!(output.contains("-2hard"));
    }

    #[test]
    fn test_format_score_keeps_every_level() {
        let output = format_score("0hard/-1medium/3soft");
        assert!(output.contains("0hard"));
        assert!(output.contains("-1medium"));
        assert!(output.contains("3soft"));
        assert!(format_score("-7").contains("-7"));
    }

    #[test]
    fn test_unrelated_events_are_not_formatted() {
        let visitor = EventVisitor {
            event: Some("drain".to_string()),
            ..EventVisitor::default()
        };
        assert!(format_event(&visitor).is_empty());
    }

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration_us(15), "15µs");
        assert_eq!(format_duration_us(1_500), "1.50ms");
        assert_eq!(format_duration_us(2_000_000), "2.00s");
    }
}
