//! Terminal and Markdown views of a normalized report.

use founderslens_core::report::{LabeledItem, Report};
use std::fmt::Write;

/// Default export name: spaces in the idea become underscores
pub fn blueprint_filename(idea: &str) -> String {
    let stem: String = idea
        .trim()
        .chars()
        .map(|c| match c {
            ' ' => '_',
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            other => other,
        })
        .collect();
    format!("{}_blueprint.md", stem)
}

/// Short plain-text summary for the terminal
pub fn summary(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", report.idea, report.industry);
    let _ = writeln!(out, "Viability score: {}/100", report.viability_score);
    let _ = writeln!(out, "\nOpportunity:\n  {}", report.opportunity);

    if let Some(f) = &report.financials {
        let _ = writeln!(
            out,
            "\nRevenue/user: {}  Min investment: {}  Break-even: {}  Growth: {}",
            f.revenue_per_user, f.min_investment, f.break_even, f.user_growth_rate
        );
    }

    if !report.competitors.is_empty() {
        let _ = writeln!(out, "\nCompetitors:");
        for c in &report.competitors {
            let _ = writeln!(out, "  {:<24} {:>6.1}%", c.name, c.market_share_percent);
        }
    }

    if report.has_demographics() {
        let _ = writeln!(out, "\nAge groups:");
        for (bracket, pct) in &report.age_demographics {
            let _ = writeln!(out, "  {:<10} {:>6.1}%", bracket, pct);
        }
    }

    if let Some(risk) = &report.risk_analysis {
        let _ = writeln!(out, "\nRisk: {}", risk);
    }

    out
}

/// Full Markdown blueprint, titled with the idea as submitted
pub fn markdown(idea: &str, report: &Report) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# FoundersLens Report: {}\n", idea.trim());
    if !report.industry.is_empty() {
        let _ = writeln!(md, "**Industry:** {}\n", report.industry);
    }
    let _ = writeln!(md, "**Viability score:** {}/100\n", report.viability_score);

    if let Some(summary) = &report.summary {
        let _ = writeln!(md, "{}\n", summary);
    }

    let _ = writeln!(md, "## Opportunity\n\n{}\n", report.opportunity);
    bullets(&mut md, "Market Trends", &report.market_trends);

    if let Some(f) = &report.financials {
        let _ = writeln!(md, "## Financials\n");
        let _ = writeln!(md, "| Metric | Value |\n|---|---|");
        let _ = writeln!(md, "| Revenue / user | {} |", f.revenue_per_user);
        let _ = writeln!(md, "| Min investment | {} |", f.min_investment);
        let _ = writeln!(md, "| Break-even | {} |", f.break_even);
        let _ = writeln!(md, "| Growth rate | {} |\n", f.user_growth_rate);
    }

    let _ = writeln!(md, "## Competitor Landscape\n");
    if report.competitors.is_empty() {
        let _ = writeln!(md, "No competitor share data.\n");
    } else {
        let _ = writeln!(md, "| Competitor | Share |\n|---|---|");
        for c in &report.competitors {
            let _ = writeln!(md, "| {} | {}% |", c.name, c.market_share_percent);
        }
        let _ = writeln!(md);
    }
    let _ = writeln!(md, "{}\n", report.market_share_insight);

    let _ = writeln!(md, "## Demographics\n");
    for (bracket, pct) in &report.age_demographics {
        let _ = writeln!(md, "- {}: {}%", bracket, pct);
    }
    let _ = writeln!(md, "\n{}\n", report.demographics_insight);

    if let Some(target) = &report.target_users {
        let _ = writeln!(md, "## Target Users\n\n{}\n", target);
    }

    labeled(&mut md, "User Acquisition", &report.user_acquisition);
    labeled(&mut md, "Business Models", &report.business_models);

    if let Some(risk) = &report.risk_analysis {
        let _ = writeln!(md, "## Risk Analysis\n\n{}\n", risk);
    }

    bullets(&mut md, "Roadmap", &report.roadmap);
    bullets(&mut md, "Strengths", &report.swot.strengths);
    bullets(&mut md, "Weaknesses", &report.swot.weaknesses);
    bullets(&mut md, "Opportunities", &report.swot.opportunities);
    bullets(&mut md, "Threats", &report.swot.threats);

    md
}

fn bullets(md: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(md, "## {}\n", heading);
    for item in items {
        let _ = writeln!(md, "- {}", item);
    }
    let _ = writeln!(md);
}

fn labeled(md: &mut String, heading: &str, items: &[LabeledItem]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(md, "## {}\n", heading);
    for item in items {
        match &item.detail {
            Some(detail) => {
                let _ = writeln!(md, "- **{}**: {}", item.title, detail);
            }
            None => {
                let _ = writeln!(md, "- **{}**", item.title);
            }
        }
    }
    let _ = writeln!(md);
}
