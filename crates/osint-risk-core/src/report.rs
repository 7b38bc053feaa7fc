use std::fmt::Write;

use crate::engine::IntelligenceReport;
use crate::format::{format_number, truncate_text};
use crate::snapshot::Severity;

const PROFILE_FIELD_CAP: usize = 60;

/// Format styles supported by [`render_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Produce a report string from an `IntelligenceReport` using the desired format.
pub fn render_report(report: &IntelligenceReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => render_human(report),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn render_human(report: &IntelligenceReport) -> anyhow::Result<String> {
    let mut out = String::new();

    if let Some(name) = &report.profile.name {
        writeln!(out, "Organization: {name}")?;
    }
    if report.risk.is_unknown() {
        writeln!(out, "Security Score: n/a ({})", report.risk.label)?;
    } else {
        writeln!(
            out,
            "Security Score: {}/100 ({}, {})",
            report.risk.score, report.risk.label, report.risk.color_tier
        )?;
    }
    writeln!(
        out,
        "Completeness: {}% (checklist v{})",
        report.completeness.percentage, report.checklist_version
    )?;
    writeln!(out)?;

    writeln!(out, "Vulnerabilities:")?;
    if report.distribution.total == 0 {
        writeln!(out, "  none reported")?;
    } else {
        writeln!(out, "  total {}", format_number(report.distribution.total))?;
        for severity in Severity::ALL {
            writeln!(
                out,
                "  - {severity:>8}: {pct:>3}%",
                pct = report.distribution.percentage(severity)
            )?;
        }
    }
    writeln!(out)?;

    let leaks = &report.leaks;
    writeln!(out, "Leaked Credentials:")?;
    writeln!(
        out,
        "  {} record(s), {} unique email(s), {} source database(s)",
        format_number(leaks.total_records as u64),
        format_number(leaks.unique_emails as u64),
        format_number(leaks.unique_databases as u64)
    )?;
    if leaks.has_plaintext_password_exposure {
        writeln!(out, "  ! plaintext passwords exposed")?;
    }
    if let Some(date) = leaks.most_recent_leak {
        writeln!(out, "  most recent leak: {}", date.format("%b %-d, %Y"))?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "Documents: {}",
        format_number(report.documents.total_count as u64)
    )?;
    for (category, count) in &report.documents.per_category_counts {
        writeln!(out, "  - {category:>6}: {count}")?;
    }

    let missing: Vec<_> = report
        .completeness
        .missing()
        .map(|probe| probe.as_str())
        .collect();
    if !missing.is_empty() {
        writeln!(out, "\nMissing sections: {}", missing.join(", "))?;
    }

    let profile = &report.profile;
    let fields = [
        ("Description", &profile.description),
        ("Employees", &profile.employees),
        ("Revenue", &profile.revenue),
        ("Funding", &profile.funding),
        ("Market cap", &profile.market_cap),
        ("Phone", &profile.phone),
        ("Email", &profile.email),
    ];
    if fields.iter().any(|(_, value)| value.is_some()) {
        writeln!(out, "\nProfile:")?;
        for (label, value) in fields {
            if let Some(value) = value {
                writeln!(
                    out,
                    "  {label:<11} {}",
                    sanitize(&truncate_text(value, PROFILE_FIELD_CAP))
                )?;
            }
        }
    }

    Ok(out)
}

fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\n' | '\r' => ' ',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RiskEngine;
    use crate::snapshot::{LeakRecord, OrganizationFacts, OsintSnapshot, SeverityCounts};

    fn sample_report() -> IntelligenceReport {
        let snapshot = OsintSnapshot::builder()
            .vulnerability_counts(SeverityCounts::new(2, 0, 1, 0))
            .leak_record(
                LeakRecord::new("ceo@acme.io", "Collection1")
                    .with_password("hunter2")
                    .with_leak_date("2019-01-07"),
            )
            .file_category("PDF", ["https://acme.io/a.pdf"])
            .file_category("XLS", Vec::<String>::new())
            .organization(OrganizationFacts {
                name: Some("Acme Corp".into()),
                description: Some("Line one\nline two".into()),
                ..OrganizationFacts::default()
            })
            .build();
        RiskEngine::new().assess(&snapshot)
    }

    #[test]
    fn human_report_contains_sections() {
        let output = render_report(&sample_report(), OutputFormat::Human).unwrap();
        assert!(output.contains("Organization: Acme Corp"));
        assert!(output.contains("Security Score: 78/100 (Good, blue)"));
        assert!(output.contains("plaintext passwords exposed"));
        assert!(output.contains("most recent leak: Jan 7, 2019"));
        assert!(output.contains("Documents: 1"));
        assert!(output.contains("Missing sections:"));
        assert!(output.contains("Line one line two"));
    }

    #[test]
    fn human_report_marks_unknown_score() {
        let report = RiskEngine::new().assess(&OsintSnapshot::builder().build());
        let output = render_report(&report, OutputFormat::Human).unwrap();
        assert!(output.contains("Security Score: n/a (Unknown)"));
        assert!(output.contains("none reported"));
        assert!(!output.contains("Profile:"));
    }

    #[test]
    fn json_report_serializes() {
        let report = sample_report();
        let output = render_report(&report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["risk"]["score"], serde_json::json!(78));
        assert_eq!(value["risk"]["label"], serde_json::json!("good"));
        assert_eq!(value["documents"]["per_category_counts"]["XLS"], 0);
        assert_eq!(value["leaks"]["most_recent_leak"], "2019-01-07");
    }
}
