//! Durable personal facts about a user, owned by an external service.
//!
//! The engine only ever reads this. Every field is optional on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A short observation accumulated over past conversations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LifeContext {
    pub spouse_name: Option<String>,
    pub children: Vec<String>,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub goals: Vec<String>,
    pub fears: Vec<String>,
    pub insights: Vec<Insight>,
}

impl LifeContext {
    /// Up to `limit` insights, newest first.
    ///
    /// Ties on `created_at` keep their original order so the result is
    /// stable for identical inputs.
    pub fn recent_insights(&self, limit: usize) -> Vec<&Insight> {
        let mut sorted: Vec<&Insight> = self.insights.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted.truncate(limit);
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn insight(text: &str, day: u32) -> Insight {
        Insight {
            text: text.into(),
            created_at: Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn recent_insights_newest_first_and_capped() {
        let ctx = LifeContext {
            insights: (1..=7).map(|d| insight(&format!("i{d}"), d)).collect(),
            ..Default::default()
        };
        let texts: Vec<&str> = ctx
            .recent_insights(5)
            .iter()
            .map(|i| i.text.as_str())
            .collect();
        assert_eq!(texts, vec!["i7", "i6", "i5", "i4", "i3"]);
    }

    #[test]
    fn missing_keys_decode_as_absent() {
        let ctx: LifeContext = serde_json::from_str(r#"{"companyName":"Acme"}"#).unwrap();
        assert_eq!(ctx.company_name.as_deref(), Some("Acme"));
        assert!(ctx.spouse_name.is_none());
        assert!(ctx.children.is_empty());
    }
}
