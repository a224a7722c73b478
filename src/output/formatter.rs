//! Output formatters for recommendation reports

use crate::config::{OutputConfig, OutputFormat};
use crate::error::Result;
use crate::output::report::RecommendationReport;
use colored::{Color, Colorize};

pub trait OutputFormatter {
    fn format_report(&self, report: &RecommendationReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Ranked list for a terminal, optionally colored.
pub struct ConsoleFormatter {
    use_colors: bool,
}

/// JSON for scripts and other services.
pub struct JsonFormatter {
    pretty: bool,
}

/// Formatter matching the configured output format.
pub fn formatter_for(config: &OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Console => Box::new(ConsoleFormatter::new(config.color_output)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{}\n", title.color(Color::Blue).bold())
        } else {
            format!("\n{}\n", title)
        }
    }

    fn format_score(&self, score: f32) -> String {
        let color = match score {
            s if s >= 0.5 => Color::Green,
            s if s >= 0.2 => Color::Yellow,
            s if s > 0.0 => Color::White,
            _ => Color::BrightBlack,
        };
        self.colorize(&format!("{:.3}", score), color)
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &RecommendationReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header(&format!(
            "Recommendations for {} {}: {}",
            report.pivot.kind, report.pivot.id, report.pivot.label
        )));

        let strategy = if report.fell_back() {
            format!(
                "{} (requested {}, pivot has no embedding yet)",
                report.strategy, report.requested_strategy
            )
        } else {
            report.strategy.to_string()
        };
        output.push_str(&format!("Strategy: {}\n", strategy));
        output.push_str(&format!(
            "Generated: {}\n\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        if report.entries.is_empty() {
            output.push_str(&self.colorize("No candidates to rank.\n", Color::Yellow));
            return Ok(output);
        }

        for entry in &report.entries {
            let mut missing = Vec::new();
            if !entry.has_text {
                missing.push("text");
            }
            if !entry.has_embedding {
                missing.push("embedding");
            }
            let note = if missing.is_empty() {
                String::new()
            } else {
                self.colorize(&format!("  [no {}]", missing.join(", ")), Color::BrightBlack)
            };

            output.push_str(&format!(
                "{:>3}. {}  {} {}: {}{}\n",
                entry.rank,
                self.format_score(entry.score),
                entry.entity.kind,
                entry.entity.id,
                entry.entity.label,
                note
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &RecommendationReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntityKind;
    use crate::output::report::{EntitySummary, ReportEntry};
    use crate::recommendation::Strategy;
    use chrono::Utc;

    fn report(entries: Vec<ReportEntry>) -> RecommendationReport {
        RecommendationReport {
            generated_at: Utc::now(),
            pivot: EntitySummary {
                kind: EntityKind::Candidate,
                id: 1,
                label: "Joana".to_string(),
            },
            requested_strategy: Strategy::Semantic,
            strategy: Strategy::Lexical,
            entries,
        }
    }

    fn entry(rank: usize, id: u64, score: f32) -> ReportEntry {
        ReportEntry {
            rank,
            entity: EntitySummary {
                kind: EntityKind::Posting,
                id,
                label: format!("Vaga {}", id),
            },
            score,
            has_text: true,
            has_embedding: false,
        }
    }

    #[test]
    fn test_console_output_without_colors() {
        let formatter = ConsoleFormatter::new(false);
        let output = formatter
            .format_report(&report(vec![entry(1, 10, 0.75), entry(2, 11, 0.0)]))
            .unwrap();

        assert!(output.contains("Recommendations for candidate 1: Joana"));
        assert!(output.contains("requested semantic"));
        assert!(output.contains("  1. 0.750  posting 10: Vaga 10  [no embedding]"));
        assert!(output.contains("  2. 0.000  posting 11: Vaga 11"));
    }

    #[test]
    fn test_console_output_for_empty_ranking() {
        let output = ConsoleFormatter::new(false).format_report(&report(vec![])).unwrap();
        assert!(output.contains("No candidates to rank."));
    }

    #[test]
    fn test_json_output_is_structured() {
        let output = JsonFormatter::new(false)
            .format_report(&report(vec![entry(1, 10, 0.5)]))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["strategy"], "lexical");
        assert_eq!(value["requested_strategy"], "semantic");
        assert_eq!(value["entries"][0]["entity"]["kind"], "posting");
        assert_eq!(value["entries"][0]["score"], 0.5);
    }
}
