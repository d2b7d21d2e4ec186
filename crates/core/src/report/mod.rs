//! # Report
//!
//! The normalized analysis report handed to presentation layers.
//!
//! Every field here is fully resolved: sequences are never null, numbers are
//! always finite, and absent text either carries a display default or is an
//! explicit `None`. Build one with [`normalize`].

mod normalize;

pub use normalize::{normalize, parse_percent, split_label};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shown when the service did not describe an opportunity
pub const OPPORTUNITY_PLACEHOLDER: &str = "Analysis pending...";

/// Shown when the service gave no competitor insight
pub const MARKET_SHARE_INSIGHT_PLACEHOLDER: &str =
    "Competitors are fighting for dominance in this fragmented landscape.";

/// Shown when the service gave no demographics insight
pub const DEMOGRAPHICS_INSIGHT_PLACEHOLDER: &str =
    "Targeting the most active user base for maximum adoption.";

/// Shown for a financial metric the service left out
pub const FINANCIAL_PLACEHOLDER: &str = "N/A";

/// Name used for competitors that arrive without one
pub const UNKNOWN_COMPETITOR: &str = "Unknown";

/// A fully-defaulted analysis report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Idea as echoed back by the service
    pub idea: String,
    /// Industry as echoed back by the service
    pub industry: String,
    /// Viability score, 0..=100
    pub viability_score: u8,
    /// Whitespace opportunity
    pub opportunity: String,
    pub market_trends: Vec<String>,
    /// Competitors with a positive market share, in source order
    pub competitors: Vec<Competitor>,
    pub market_share_insight: String,
    /// Age bracket label -> percent of users
    pub age_demographics: BTreeMap<String, f64>,
    pub demographics_insight: String,
    pub financials: Option<Financials>,
    pub user_acquisition: Vec<LabeledItem>,
    pub business_models: Vec<LabeledItem>,
    pub risk_analysis: Option<String>,
    pub roadmap: Vec<String>,
    pub summary: Option<String>,
    pub target_users: Option<String>,
    pub swot: Swot,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            idea: String::new(),
            industry: String::new(),
            viability_score: 0,
            opportunity: OPPORTUNITY_PLACEHOLDER.to_string(),
            market_trends: Vec::new(),
            competitors: Vec::new(),
            market_share_insight: MARKET_SHARE_INSIGHT_PLACEHOLDER.to_string(),
            age_demographics: BTreeMap::new(),
            demographics_insight: DEMOGRAPHICS_INSIGHT_PLACEHOLDER.to_string(),
            financials: None,
            user_acquisition: Vec::new(),
            business_models: Vec::new(),
            risk_analysis: None,
            roadmap: Vec::new(),
            summary: None,
            target_users: None,
            swot: Swot::default(),
        }
    }
}

impl Report {
    /// Sum of the visible competitor shares
    pub fn competitor_share_total(&self) -> f64 {
        self.competitors.iter().map(|c| c.market_share_percent).sum()
    }

    /// Whether there is any age data worth charting
    pub fn has_demographics(&self) -> bool {
        !self.age_demographics.is_empty()
    }
}

/// A competitor entry with a strictly positive share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub market_share_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing_strategy: Option<String>,
}

/// Display-only financial projections.
///
/// Values are shown exactly as the service phrased them ("$12/mo", "18 months").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Financials {
    pub revenue_per_user: String,
    pub min_investment: String,
    pub break_even: String,
    pub user_growth_rate: String,
}

/// A "Title: detail" line split on its first colon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swot {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report_is_renderable() {
        let report = Report::default();
        assert_eq!(report.viability_score, 0);
        assert_eq!(report.opportunity, OPPORTUNITY_PLACEHOLDER);
        assert!(report.competitors.is_empty());
        assert!(!report.has_demographics());
        assert_eq!(report.competitor_share_total(), 0.0);
    }

    #[test]
    fn test_labeled_item_omits_absent_detail() {
        let item = LabeledItem {
            title: "Referrals".to_string(),
            detail: None,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"title":"Referrals"}"#);
    }
}
