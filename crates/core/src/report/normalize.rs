//! # Normalize
//!
//! Turns the loosely-typed payload returned by the analysis service into a
//! [`Report`]. Nothing in the payload is trusted field-by-field, so this pass
//! never fails: anything missing or malformed falls back to its default.

use super::{
    Competitor, Financials, LabeledItem, Report, Swot, DEMOGRAPHICS_INSIGHT_PLACEHOLDER,
    FINANCIAL_PLACEHOLDER, MARKET_SHARE_INSIGHT_PLACEHOLDER, OPPORTUNITY_PLACEHOLDER,
    UNKNOWN_COMPETITOR,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Normalize a raw analysis payload
pub fn normalize(raw: &Value) -> Report {
    let report = Report {
        idea: text(raw.get("idea")).unwrap_or_default(),
        industry: text(raw.get("industry")).unwrap_or_default(),
        viability_score: score(raw.pointer("/strategy/viability_score")),
        opportunity: text(raw.pointer("/research/opportunity"))
            .unwrap_or_else(|| OPPORTUNITY_PLACEHOLDER.to_string()),
        market_trends: text_list(raw.pointer("/research/market_trends")),
        competitors: competitors(raw.pointer("/research/competitors")),
        market_share_insight: text(raw.pointer("/research/market_share_insight"))
            .unwrap_or_else(|| MARKET_SHARE_INSIGHT_PLACEHOLDER.to_string()),
        age_demographics: age_groups(raw.pointer("/strategy/demographics/age_groups")),
        demographics_insight: text(raw.pointer("/strategy/demographics/demographics_insight"))
            .unwrap_or_else(|| DEMOGRAPHICS_INSIGHT_PLACEHOLDER.to_string()),
        financials: financials(raw.pointer("/strategy/financials")),
        user_acquisition: labeled_list(raw.pointer("/strategy/user_acquisition")),
        business_models: labeled_list(raw.pointer("/strategy/business_models")),
        risk_analysis: text(raw.pointer("/strategy/risk_analysis")),
        roadmap: text_list(raw.pointer("/strategy/roadmap")),
        summary: text(raw.pointer("/strategy/summary")),
        target_users: text(raw.pointer("/strategy/target_users")),
        swot: Swot {
            strengths: text_list(raw.pointer("/strategy/swot/strengths")),
            weaknesses: text_list(raw.pointer("/strategy/swot/weaknesses")),
            opportunities: text_list(raw.pointer("/strategy/swot/opportunities")),
            threats: text_list(raw.pointer("/strategy/swot/threats")),
        },
    };

    tracing::debug!(
        competitors = report.competitors.len(),
        age_brackets = report.age_demographics.len(),
        has_financials = report.financials.is_some(),
        "Normalized analysis payload"
    );

    report
}

/// Parse a percent-like value: a number, or text such as `"42%"`.
///
/// Unparsable or non-finite input yields `0.0`.
pub fn parse_percent(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            s.strip_suffix('%').unwrap_or(s).trim().parse::<f64>().ok()
        }
        _ => None,
    };

    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Split `"Title: detail"` on the first colon only
pub fn split_label(line: &str) -> LabeledItem {
    match line.split_once(':') {
        Some((title, detail)) => {
            let detail = detail.trim();
            LabeledItem {
                title: title.trim().to_string(),
                detail: (!detail.is_empty()).then(|| detail.to_string()),
            }
        }
        None => LabeledItem {
            title: line.trim().to_string(),
            detail: None,
        },
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn text_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(|item| text(Some(item))).collect())
        .unwrap_or_default()
}

fn labeled_list(value: Option<&Value>) -> Vec<LabeledItem> {
    text_list(value).iter().map(|line| split_label(line)).collect()
}

fn score(value: Option<&Value>) -> u8 {
    let raw = value.map(parse_percent).unwrap_or(0.0);
    raw.round().clamp(0.0, 100.0) as u8
}

fn competitors(value: Option<&Value>) -> Vec<Competitor> {
    let Some(entries) = value.and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let share = entry.get("market_share").map(parse_percent).unwrap_or(0.0);
            if share <= 0.0 {
                return None;
            }
            Some(Competitor {
                name: text(entry.get("name")).unwrap_or_else(|| UNKNOWN_COMPETITOR.to_string()),
                market_share_percent: share,
                target_audience: text(entry.get("target_audience")),
                marketing_strategy: text(entry.get("marketing_strategy")),
            })
        })
        .collect()
}

fn age_groups(value: Option<&Value>) -> BTreeMap<String, f64> {
    value
        .and_then(|v| v.as_object())
        .map(|groups| {
            groups
                .iter()
                .map(|(bracket, pct)| (bracket.clone(), parse_percent(pct)))
                .collect()
        })
        .unwrap_or_default()
}

fn financials(value: Option<&Value>) -> Option<Financials> {
    let fields = value?.as_object()?;
    let display = |key: &str| match fields.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => FINANCIAL_PLACEHOLDER.to_string(),
    };

    Some(Financials {
        revenue_per_user: display("revenue_per_user"),
        min_investment: display("min_investment"),
        break_even: display("break_even"),
        user_growth_rate: display("user_growth_rate"),
    })
}
