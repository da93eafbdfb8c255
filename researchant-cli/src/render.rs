//! Plain-text rendering of statuses and finished reports.

use researchant_core::{ResearchResult, TaskStatus};

/// Human-friendly label for a task status. The service's `pending` reads
/// better as an activity indicator; everything else is shown verbatim.
pub fn display_status(status: &TaskStatus) -> String {
    if status.as_str() == "pending" {
        "Processing...".to_string()
    } else {
        status.as_str().to_string()
    }
}

/// Render a report with its optional sections.
pub fn format_report(report: &ResearchResult) -> String {
    let mut out = String::new();
    out.push_str("\n📊 Research Report\n\n");
    out.push_str("Summary: ");
    out.push_str(&report.summary);
    out.push('\n');

    push_section(&mut out, "Findings", &report.findings);
    if let Some(competitors) = &report.competitors {
        push_section(&mut out, "Competitors", competitors);
    }
    if let Some(trends) = &report.trends {
        push_section(&mut out, "Trends", trends);
    }
    if let Some(recommendations) = &report.recommendations {
        push_section(&mut out, "Recommendations", recommendations);
    }
    out
}

fn push_section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push('\n');
    out.push_str(title);
    out.push_str(":\n");
    for item in items {
        out.push_str("  - ");
        out.push_str(item);
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_status() {
        assert_eq!(display_status(&TaskStatus::new("pending")), "Processing...");
        assert_eq!(display_status(&TaskStatus::new("completed")), "completed");
        assert_eq!(display_status(&TaskStatus::new("queued")), "queued");
    }

    #[test]
    fn test_format_report_full() {
        let report = ResearchResult {
            summary: "Growing market.".to_string(),
            findings: vec!["F1".to_string(), "F2".to_string()],
            competitors: Some(vec!["Acme".to_string()]),
            trends: Some(vec!["T1".to_string()]),
            recommendations: Some(vec!["R1".to_string()]),
        };
        let text = format_report(&report);
        assert!(text.contains("Research Report"));
        assert!(text.contains("Summary: Growing market."));
        assert!(text.contains("Findings:\n  - F1\n  - F2\n"));
        assert!(text.contains("Competitors:\n  - Acme\n"));
        assert!(text.contains("Trends:\n  - T1\n"));
        assert!(text.contains("Recommendations:\n  - R1\n"));
    }

    #[test]
    fn test_format_report_omits_absent_sections() {
        let report = ResearchResult {
            summary: "Short.".to_string(),
            findings: vec![],
            competitors: None,
            trends: None,
            recommendations: None,
        };
        let text = format_report(&report);
        assert!(!text.contains("Findings:"));
        assert!(!text.contains("Competitors:"));
        assert!(!text.contains("Trends:"));
        assert!(!text.contains("Recommendations:"));
    }
}
