//! Result payloads produced by finished backend jobs.
//!
//! Nested fields default to zero or empty so that partial analysis output
//! still renders; the top-level field each job kind is known by is required.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResult {
    pub comment_count: u64,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResult {
    #[serde(default)]
    pub analysis_filename: Option<String>,
    pub analysis_results: AnalysisResults,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResults {
    #[serde(deserialize_with = "null_as_default")]
    pub basic_stats: BasicStats,
    #[serde(deserialize_with = "null_as_default")]
    pub sentiments: Sentiments,
    #[serde(deserialize_with = "null_as_default")]
    pub keywords: Vec<Keyword>,
    #[serde(deserialize_with = "null_as_default")]
    pub labels: Labels,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicStats {
    #[serde(deserialize_with = "null_as_default")]
    pub total_comments: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub average_rating: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub unique_users: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub average_length: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sentiments {
    #[serde(deserialize_with = "null_as_default")]
    pub distribution: SentimentDistribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentDistribution {
    #[serde(deserialize_with = "null_as_default")]
    pub positive: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub neutral: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub negative: u64,
}

impl SentimentDistribution {
    pub fn total(&self) -> u64 {
        self.positive
            .saturating_add(self.neutral)
            .saturating_add(self.negative)
    }
}

/// A `[word, score]` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword(pub String, pub f64);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    #[serde(deserialize_with = "null_as_default")]
    pub category_counts: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WordcloudResult {
    #[serde(default)]
    pub overall_wordcloud: Option<WordcloudImage>,
    #[serde(default)]
    pub category_wordclouds: BTreeMap<String, WordcloudImage>,
}

impl WordcloudResult {
    pub fn is_empty(&self) -> bool {
        self.overall_wordcloud.is_none() && self.category_wordclouds.is_empty()
    }
}

/// A base64-encoded PNG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordcloudImage {
    pub image_base64: String,
}

/// Data files available on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileListing {
    pub comment_files: Vec<String>,
    pub analysis_files: Vec<String>,
}

/// Reads an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn analysis_tolerates_missing_sections() {
        let value = json!({
            "basic_stats": { "total_comments": 12 },
            "sentiments": { "distribution": { "positive": 7 } }
        });
        let parsed: AnalysisResults = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.basic_stats.total_comments, 12);
        assert_eq!(parsed.basic_stats.average_rating, 0.0);
        assert_eq!(
            parsed.sentiments.distribution,
            SentimentDistribution {
                positive: 7,
                neutral: 0,
                negative: 0
            }
        );
        assert!(parsed.keywords.is_empty());
        assert!(parsed.labels.category_counts.is_empty());
    }

    #[test]
    fn keywords_read_from_pairs() {
        let value = json!({ "keywords": [["好吃", 0.42], ["服务", 0.1]] });
        let parsed: AnalysisResults = serde_json::from_value(value).unwrap();
        assert_eq!(
            parsed.keywords,
            vec![Keyword("好吃".into(), 0.42), Keyword("服务".into(), 0.1)]
        );
    }

    #[test]
    fn null_fields_read_as_zero_or_empty() {
        let value = json!({
            "basic_stats": null,
            "sentiments": { "distribution": { "positive": 3, "neutral": null } },
            "keywords": null,
            "labels": { "category_counts": null }
        });
        let parsed: AnalysisResults = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.basic_stats, BasicStats::default());
        assert_eq!(parsed.sentiments.distribution.positive, 3);
        assert_eq!(parsed.sentiments.distribution.neutral, 0);
        assert!(parsed.keywords.is_empty());
        assert!(parsed.labels.category_counts.is_empty());
    }

    #[test]
    fn sentiment_total_saturates() {
        let distribution = SentimentDistribution {
            positive: u64::MAX,
            neutral: 1,
            negative: 5,
        };
        assert_eq!(distribution.total(), u64::MAX);
    }

    #[test]
    fn crawl_result_requires_comment_count() {
        assert!(serde_json::from_value::<CrawlResult>(json!({ "filename": "x.json" })).is_err());
    }
}
