use std::io::{self, Write};

use colored::Colorize;
use log::{debug, trace};

use crate::types::{AnalysisReport, ApiStat, PluginTable};

fn branch(is_last: bool) -> &'static str {
    if is_last { "└──" } else { "├──" }
}

fn noun(count: usize, word: &str) -> String {
    if count == 1 { word.to_string() } else { format!("{word}s") }
}

/// Most-called APIs first, ties broken by name.
fn ranked(table: &PluginTable) -> Vec<(&String, &ApiStat)> {
    let mut apis: Vec<_> = table.apis.iter().collect();
    apis.sort_by(|(a_name, a), (b_name, b)| b.call_num.cmp(&a.call_num).then(a_name.cmp(b_name)));
    apis
}

pub fn print_no_usage_message<W: Write>(writer: &mut W, report: &AnalysisReport) -> io::Result<()> {
    debug!("No usages of '{}'", report.analysis_target);
    writeln!(
        writer,
        "{} No usages of {} found in {} {}.",
        "✓".green().bold(),
        report.analysis_target.bold(),
        report.files_analyzed,
        noun(report.files_analyzed, "file")
    )?;
    writer.flush()?;
    Ok(())
}

/// Prints every table as a tree with its `top` most-called APIs, followed by
/// installed versions, failed files and the score.
pub fn print_summary<W: Write>(
    writer: &mut W,
    report: &AnalysisReport,
    top: usize,
) -> io::Result<()> {
    let used: Vec<&PluginTable> = report.tables.iter().filter(|t| !t.apis.is_empty()).collect();
    if used.is_empty() {
        print_no_usage_message(writer, report)?;
    } else {
        writeln!(
            writer,
            "{} Usage of {} ({} of {} {} import it)\n",
            "●".bright_blue(),
            report.analysis_target.bold(),
            report.files_with_target.to_string().cyan(),
            report.files_analyzed.to_string().cyan(),
            noun(report.files_analyzed, "file")
        )?;
    }

    for table in used {
        let apis = ranked(table);
        trace!("Printing table {} with {} APIs", table.name, apis.len());
        writeln!(writer, "{} ({} APIs)", table.name.bright_white().bold(), apis.len())?;

        let shown = apis.len().min(top);
        let hidden = apis.len() - shown;
        for (idx, (api_name, stat)) in apis.iter().take(shown).enumerate() {
            let is_last = idx + 1 == shown && hidden == 0;
            let origin = match &stat.call_origin {
                Some(origin) => format!(" as {}", origin.dimmed()),
                None => String::new(),
            };
            let black = match stat.is_black {
                true => format!(" {}", "black-listed".red().bold()),
                false => String::new(),
            };
            writeln!(
                writer,
                "{}  {}{} ({} {} in {} {}){}",
                branch(is_last).dimmed(),
                api_name,
                origin,
                stat.call_num.to_string().yellow(),
                noun(stat.call_num, "call"),
                stat.call_files.len(),
                noun(stat.call_files.len(), "file"),
                black
            )?;
        }
        if hidden > 0 {
            writeln!(writer, "{}  ... {} more", branch(true).dimmed(), hidden)?;
        }
        writeln!(writer)?;
    }

    if !report.version_map.is_empty() {
        let count = report.version_map.len().to_string();
        let count = if report.version_map.len() > 1 { count.red() } else { count.green() };
        writeln!(writer, "{} ({})", "Installed versions".bold(), count)?;
        let last = report.version_map.len() - 1;
        for (idx, (version, record)) in report.version_map.iter().enumerate() {
            writeln!(
                writer,
                "{}  {} - {}",
                branch(idx == last).dimmed(),
                version.cyan(),
                record.call_source.join(", ")
            )?;
        }
        writeln!(writer)?;
    }

    if !report.diagnosis_infos.is_empty() {
        writeln!(
            writer,
            "{} {} {} could not be analyzed",
            "⚠".yellow().bold(),
            report.diagnosis_infos.len().to_string().yellow(),
            noun(report.diagnosis_infos.len(), "file")
        )?;
        let last = report.diagnosis_infos.len() - 1;
        for (idx, info) in report.diagnosis_infos.iter().enumerate() {
            // parser output can span several lines
            let detail = info.detail.split_whitespace().collect::<Vec<_>>().join(" ");
            writeln!(
                writer,
                "{}  {}&{}: {}",
                branch(idx == last).dimmed(),
                info.project_name,
                info.file.blue(),
                detail.dimmed()
            )?;
        }
        writeln!(writer)?;
    }

    if let Some(score) = &report.score_map {
        writeln!(writer, "{}", "─".repeat(60).dimmed())?;
        writeln!(writer, "{} {}", "Score:".bold(), score.score.to_string().bold())?;
        for message in &score.messages {
            writeln!(writer, "  - {}", message)?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Number of black-listed entries that were actually called.
pub fn black_listed_usages(report: &AnalysisReport) -> usize {
    report.tables.iter().flat_map(|t| t.apis.values()).filter(|s| s.is_black).count()
}
