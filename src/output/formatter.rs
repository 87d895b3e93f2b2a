//! Output formatters for ranking reports

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::RankingReport;
use colored::{Color, Colorize};
use std::path::Path;

/// Renders a ranking report into one output format.
pub trait ResultFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Human-oriented table with optional colors.
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// Machine-readable CSV with a fixed column set.
///
/// Two runs over the same inputs and configuration produce byte-identical
/// CSV, so the output never includes timestamps or timings. Skipped
/// candidates are reported by the other formats and the log, not here.
pub struct CsvFormatter;

/// Full report as JSON, including skips and run metadata.
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown table for docs and pull-request style sharing.
pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub const CSV_HEADER: &str = "rank,candidate_id,score,semantic_score,entity_overlap";

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self {
            use_colors,
            detailed,
        }
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
            format!("\n{} {}\n", "█".blue().bold(), title.blue().bold())
        } else {
            format!("\n█ {}\n", title)
        }
    }

    fn score_color(score: f32) -> Color {
        if score >= 0.7 {
            Color::Green
        } else if score >= 0.4 {
            Color::Yellow
        } else {
            Color::Red
        }
    }
}

impl ResultFormatter for ConsoleFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 RESUME SCREENING RESULTS"));
        output.push_str(&format!(
            "Reference: {} | Model: {} ({}d)\n",
            report.reference_id,
            report.metadata.embedding_model,
            report.metadata.embedding_dimension
        ));
        output.push_str(&format!(
            "Ranked {} of {} candidates in {}ms\n",
            report.metadata.candidates_ranked,
            report.metadata.candidates_total,
            report.metadata.processing_time_ms
        ));

        if report.results.is_empty() {
            output.push_str("\nNo candidates were ranked.\n");
        } else {
            output.push_str(&format!(
                "\n{:>4}  {:<32} {:>9} {:>9} {:>9}\n",
                "RANK", "CANDIDATE", "SCORE", "SEMANTIC", "ENTITY"
            ));
            for result in &report.results {
                let score = format!("{:>9.4}", result.score);
                output.push_str(&format!(
                    "{:>4}  {:<32} {} {:>9.4} {:>9.4}\n",
                    result.rank,
                    result.candidate_id,
                    self.colorize(&score, Self::score_color(result.score)),
                    result.semantic_score,
                    result.entity_overlap,
                ));

                if self.detailed && !result.matched_entities.is_empty() {
                    output.push_str(&format!(
                        "      matched: {}\n",
                        result.matched_entities.join(", ")
                    ));
                }
            }
        }

        if report.has_skips() {
            output.push_str(&self.format_header("⚠️ Skipped candidates"));
            for skip in &report.skipped {
                output.push_str(&format!(
                    "  • {}: {}\n",
                    self.colorize(&skip.candidate_id, Color::Yellow),
                    skip.reason
                ));
            }
        }

        output.push_str(&format!(
            "\n{} Generated by resume-screener v{}\n",
            self.colorize("ℹ️", Color::Blue),
            report.metadata.screener_version
        ));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self
    }

    fn escape_field(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFormatter for CsvFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::with_capacity(64 * (report.results.len() + 1));
        output.push_str(CSV_HEADER);
        output.push('\n');

        for result in &report.results {
            output.push_str(&format!(
                "{},{},{:.6},{:.6},{:.6}\n",
                result.rank,
                Self::escape_field(&result.candidate_id),
                result.score,
                result.semantic_score,
                result.entity_overlap,
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Csv
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl ResultFormatter for JsonFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
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

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }
}

impl ResultFormatter for MarkdownFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# 📊 Resume Screening Report\n\n");
        output.push_str(&format!("**Reference:** `{}`\n\n", report.reference_id));

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing time:** {}ms\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.processing_time_ms
            ));
            output.push_str(&format!(
                "**Model:** `{}` ({} dimensions) | **Weights:** semantic {:.2}, entity {:.2}\n\n",
                report.metadata.embedding_model,
                report.metadata.embedding_dimension,
                report.metadata.weight_semantic,
                report.metadata.weight_entity
            ));
        }

        if report.results.is_empty() {
            output.push_str("No candidates were ranked.\n");
        } else {
            output.push_str("| Rank | Candidate | Score | Semantic | Entity overlap |\n");
            output.push_str("|-----:|-----------|------:|---------:|---------------:|\n");
            for result in &report.results {
                output.push_str(&format!(
                    "| {} | `{}` | {:.4} | {:.4} | {:.4} |\n",
                    result.rank,
                    result.candidate_id,
                    result.score,
                    result.semantic_score,
                    result.entity_overlap,
                ));
            }
            output.push('\n');
        }

        if report.has_skips() {
            output.push_str("## ⚠️ Skipped candidates\n\n");
            for skip in &report.skipped {
                output.push_str(&format!("- `{}`: {}\n", skip.candidate_id, skip.reason));
            }
            output.push('\n');
        }

        if self.include_metadata {
            output.push_str("---\n\n");
            output.push_str(&format!(
                "*Generated by resume-screener v{} using `{}`*\n",
                report.metadata.screener_version, report.metadata.embedding_model
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

/// Dispatches a report to the formatter for the requested output format.
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    csv_formatter: CsvFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true, true)
    }

    pub fn with_options(
        use_colors: bool,
        detailed: bool,
        pretty_json: bool,
        include_metadata: bool,
    ) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            csv_formatter: CsvFormatter::new(),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate(&self, report: &RankingReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Csv => self.csv_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, reference_name: &str) -> String {
    let base_name = Path::new(reference_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    match format {
        OutputFormat::Console => format!("{}_ranking.txt", base_name),
        OutputFormat::Csv => format!("{}_ranking.csv", base_name),
        OutputFormat::Json => format!("{}_ranking.json", base_name),
        OutputFormat::Markdown => format!("{}_ranking.md", base_name),
    }
}
