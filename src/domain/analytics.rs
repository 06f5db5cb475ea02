//! Analytics reports, one variant per category.
//!
//! Decoding is total: a payload that does not fit its category yields the
//! category's "unavailable" report instead of an error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsCategory {
    Traffic,
    Listings,
    Content,
    Engagement,
}

impl AnalyticsCategory {
    pub const ALL: [AnalyticsCategory; 4] = [
        AnalyticsCategory::Traffic,
        AnalyticsCategory::Listings,
        AnalyticsCategory::Content,
        AnalyticsCategory::Engagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsCategory::Traffic => "traffic",
            AnalyticsCategory::Listings => "listings",
            AnalyticsCategory::Content => "content",
            AnalyticsCategory::Engagement => "engagement",
        }
    }
}

impl fmt::Display for AnalyticsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyticsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown analytics category: {s}"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageCount {
    pub path: String,
    pub views: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrafficStats {
    pub page_views: u64,
    pub unique_visitors: u64,
    pub bounce_rate: f64,
    pub top_pages: Vec<PageCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListingStats {
    pub total: u64,
    pub available: u64,
    pub sold: u64,
    pub rented: u64,
    pub average_price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentStats {
    pub published_posts: u64,
    pub draft_posts: u64,
    pub subscribers: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngagementStats {
    pub contacts: u64,
    pub emails_sent: u64,
    pub open_rate: f64,
    pub click_rate: f64,
}

// == Analytics Report ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", content = "stats", rename_all = "lowercase")]
pub enum AnalyticsReport {
    Traffic(TrafficStats),
    Listings(ListingStats),
    Content(ContentStats),
    Engagement(EngagementStats),
}

impl AnalyticsReport {
    /// The all-zero report shown when a category's data is unavailable.
    pub fn unavailable(category: AnalyticsCategory) -> Self {
        match category {
            AnalyticsCategory::Traffic => AnalyticsReport::Traffic(TrafficStats::default()),
            AnalyticsCategory::Listings => AnalyticsReport::Listings(ListingStats::default()),
            AnalyticsCategory::Content => AnalyticsReport::Content(ContentStats::default()),
            AnalyticsCategory::Engagement => {
                AnalyticsReport::Engagement(EngagementStats::default())
            }
        }
    }

    pub fn category(&self) -> AnalyticsCategory {
        match self {
            AnalyticsReport::Traffic(_) => AnalyticsCategory::Traffic,
            AnalyticsReport::Listings(_) => AnalyticsCategory::Listings,
            AnalyticsReport::Content(_) => AnalyticsCategory::Content,
            AnalyticsReport::Engagement(_) => AnalyticsCategory::Engagement,
        }
    }

    /// Decodes a backend payload. Missing fields default to zero; a payload
    /// of the wrong shape falls back to [`AnalyticsReport::unavailable`].
    pub fn decode(category: AnalyticsCategory, payload: &Value) -> Self {
        let decoded = match category {
            AnalyticsCategory::Traffic => {
                serde_json::from_value(payload.clone()).map(AnalyticsReport::Traffic)
            }
            AnalyticsCategory::Listings => {
                serde_json::from_value(payload.clone()).map(AnalyticsReport::Listings)
            }
            AnalyticsCategory::Content => {
                serde_json::from_value(payload.clone()).map(AnalyticsReport::Content)
            }
            AnalyticsCategory::Engagement => {
                serde_json::from_value(payload.clone()).map(AnalyticsReport::Engagement)
            }
        };

        decoded.unwrap_or_else(|e| {
            warn!("Unusable {} analytics payload: {}", category, e);
            Self::unavailable(category)
        })
    }
}
