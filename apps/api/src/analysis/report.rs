use crate::analysis::schema::{Level, TenderAnalysis};

/// Qualitative band for a bid score.
pub fn score_band(score: u32) -> &'static str {
    match score {
        70.. => "Strong",
        40..=69 => "Moderate",
        _ => "Weak",
    }
}

/// Renders an analysis as a markdown report.
pub fn render_markdown(file_name: &str, analysis: &TenderAnalysis) -> String {
    let summary = &analysis.summary;
    let bid = &analysis.bid_score;

    let mut md = format!("# Tender Analysis - {}\n\n", summary.project_name);
    md.push_str(&format!("_Source file: {file_name}_\n\n"));

    md.push_str(&format!(
        "## Recommendation: {} ({}/100, {})\n\n{}\n\n",
        bid.recommendation.as_str(),
        bid.score,
        score_band(bid.score),
        bid.reasoning
    ));

    md.push_str("## Summary\n\n");
    for (label, value) in [
        ("Issuing authority", &summary.issuing_authority),
        ("Reference", &summary.tender_reference),
        ("Estimated value", &summary.estimated_value),
        ("Currency", &summary.currency),
        ("Submission deadline", &summary.submission_deadline),
        ("Duration", &summary.project_duration),
        ("Location", &summary.location),
        ("Sector", &summary.sector),
    ] {
        md.push_str(&format!("- **{label}:** {value}\n"));
    }
    md.push_str(&format!("\n{}\n\n", summary.brief_description));

    if !analysis.requirements.is_empty() {
        md.push_str("## Requirements\n\n");
        for req in &analysis.requirements {
            let kind = if req.mandatory { "mandatory" } else { "optional" };
            md.push_str(&format!(
                "- [{}] **{}** ({kind}): {}\n",
                req.priority.as_str(),
                req.category,
                req.requirement
            ));
        }
        md.push('\n');
    }

    if !analysis.compliance_checklist.is_empty() {
        md.push_str("## Compliance Checklist\n\n");
        for item in &analysis.compliance_checklist {
            let marker = if item.critical { " **(critical)**" } else { "" };
            md.push_str(&format!("- [ ] {} - {}{marker}\n", item.item, item.category));
        }
        md.push('\n');
    }

    if !analysis.risk_flags.is_empty() {
        md.push_str("## Risk Flags\n\n");
        // Highest severity first; stable sort keeps the model's order within a level.
        let mut risks: Vec<_> = analysis.risk_flags.iter().collect();
        risks.sort_by_key(|r| match r.severity {
            Level::High => 0,
            Level::Medium => 1,
            Level::Low => 2,
        });
        for risk in risks {
            md.push_str(&format!(
                "- [{}] {}\n  - Mitigation: {}\n",
                risk.severity.as_str(),
                risk.risk,
                risk.recommendation
            ));
        }
        md.push('\n');
    }

    if !analysis.key_dates.is_empty() {
        md.push_str("## Key Dates\n\n| Event | Date |\n|---|---|\n");
        for date in &analysis.key_dates {
            md.push_str(&format!("| {} | {} |\n", date.event, date.date));
        }
        md.push('\n');
    }

    if !analysis.evaluation_criteria.is_empty() {
        md.push_str("## Evaluation Criteria\n\n| Criterion | Weight | Details |\n|---|---|---|\n");
        for c in &analysis.evaluation_criteria {
            md.push_str(&format!("| {} | {} | {} |\n", c.criterion, c.weight, c.details));
        }
        md.push('\n');
    }

    let fin = &analysis.financial_requirements;
    md.push_str("## Financial Requirements\n\n");
    md.push_str(&format!("- **Bid bond:** {}\n", fin.bid_bond));
    md.push_str(&format!("- **Performance bond:** {}\n", fin.performance_bond));
    md.push_str(&format!("- **Minimum turnover:** {}\n", fin.minimum_turnover));
    md.push_str(&format!("- **Other:** {}\n", fin.other_financial));

    md
}
