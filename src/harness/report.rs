//! Run reports
//!
//! Human-readable output lists every case with expected vs. actual; the JSON
//! form is the serialized [`RunSummary`].

use colored::Colorize;

use crate::common::{ellipsize, Result};

use super::fixture::{CaseCategory, TestCase};
use super::golden::GoldenReport;
use super::oracle::Verdict;
use super::runner::RunSummary;

/// Longest expected/actual text shown inline before it is cut
const MAX_INLINE_CHARS: usize = 120;

/// Print the full report for a run
pub fn print_summary(summary: &RunSummary, verbose: bool) {
    println!("\n{}", "Cases:".cyan());
    for verdict in &summary.verdicts {
        print_verdict(verdict, verbose);
    }

    let unclassified = summary
        .verdicts
        .iter()
        .filter(|v| v.category == CaseCategory::Unclassified)
        .count();
    if unclassified > 0 {
        println!(
            "\n  {} {} case(s) had no Pos_/Neg_ prefix and were only checked for non-empty output",
            "!".yellow(),
            unclassified
        );
    }

    if let Some(reason) = &summary.aborted {
        println!("\n  {} Run aborted: {}", "✗".red(), reason.red());
    }

    println!(
        "\n{} {} passed, {} failed, {} total ({} ms)",
        "Summary:".blue().bold(),
        summary.passed.to_string().green(),
        summary.failed.to_string().red(),
        summary.total,
        summary.duration_ms
    );

    if summary.run_passed() {
        println!("\n{} {}\n", "✓".green().bold(), "Run Passed".green().bold());
    } else {
        println!("\n{} {}\n", "✗".red().bold(), "Run Failed".red().bold());
    }
}

fn print_verdict(verdict: &Verdict, verbose: bool) {
    let mark = if verdict.passed() {
        "✓".green()
    } else {
        "✗".red()
    };

    println!(
        "  {} [{}] {} ({} ms)",
        mark,
        verdict.test_case_id.white().bold(),
        verdict.category.label().dimmed(),
        verdict.elapsed_ms
    );

    if verbose || !verdict.passed() {
        if !verdict.input.is_empty() {
            println!("      Input:    {}", ellipsize(&verdict.input, MAX_INLINE_CHARS));
        }
        println!("      Expected: {}", ellipsize(&verdict.expected, MAX_INLINE_CHARS));
        println!("      Actual:   {}", ellipsize(&verdict.actual, MAX_INLINE_CHARS));
    }

    if let Some(reason) = verdict.failure_message() {
        println!("      {}", reason.red());
    }
}

/// Serialize a run for machine consumption
pub fn summary_json(summary: &RunSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Print the golden-path result
pub fn print_golden(report: &GoldenReport) {
    println!(
        "\n{} {} → {} ({} ms)\n",
        "✓".green().bold(),
        report.input.white().bold(),
        report.output.green(),
        report.elapsed_ms
    );
}

/// Print the cases of a validated fixture, grouped by category
pub fn print_cases(cases: &[TestCase]) {
    println!("\n{} {} case(s)", "Fixture:".blue().bold(), cases.len());
    for category in [
        CaseCategory::Positive,
        CaseCategory::Negative,
        CaseCategory::UiClear,
        CaseCategory::Unclassified,
    ] {
        let ids: Vec<&str> = cases
            .iter()
            .filter(|c| c.category == category)
            .map(|c| c.id.as_str())
            .collect();
        if !ids.is_empty() {
            println!("  {:<13} {}", category.label().cyan(), ids.join(", "));
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::oracle::{classify, Observed};

    #[test]
    fn test_summary_json_lists_verdicts_in_order() {
        let cases = [
            TestCase::new("Pos_001", "X", "Y"),
            TestCase::new("Neg_001", "X", "Y"),
        ];
        let verdicts: Vec<Verdict> = cases
            .iter()
            .map(|c| classify(c, &Observed::Output("Y".to_string())))
            .collect();
        let summary = RunSummary {
            total: 2,
            passed: 1,
            failed: 1,
            duration_ms: 10,
            verdicts,
            aborted: None,
        };

        let json: serde_json::Value = serde_json::from_str(&summary_json(&summary).unwrap()).unwrap();
        assert_eq!(json["failed"], 1);
        assert_eq!(json["verdicts"][0]["test_case_id"], "Pos_001");
        assert_eq!(json["verdicts"][1]["outcome"], "FAIL");
        assert!(json.get("aborted").is_none());
    }
}
