use crate::{AnalysisResults, FileListing, JobKind};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub progress: Vec<ProgressRow>,
    pub files: Option<FileListingView>,
    pub idle: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRow {
    pub kind: JobKind,
    pub percent: u8,
    pub message: String,
    pub poll_failures: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListingView {
    pub comment_files: FileSection,
    pub analysis_files: FileSection,
}

/// An empty section must render a placeholder rather than nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSection {
    Empty,
    Files(Vec<String>),
}

impl FileSection {
    fn from_names(names: &[String]) -> Self {
        if names.is_empty() {
            FileSection::Empty
        } else {
            FileSection::Files(names.to_vec())
        }
    }
}

impl FileListingView {
    pub fn from_listing(listing: &FileListing) -> Self {
        Self {
            comment_files: FileSection::from_names(&listing.comment_files),
            analysis_files: FileSection::from_names(&listing.analysis_files),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisView {
    pub total_comments: u64,
    pub average_rating: f64,
    pub unique_users: u64,
    /// Rounded to the nearest whole character.
    pub average_length: u64,
    pub sentiment: Vec<SentimentSlice>,
    pub keywords: Vec<KeywordWeight>,
    pub categories: Vec<CategoryBar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentSlice {
    pub label: &'static str,
    pub count: u64,
    /// Share of all classified comments, 0.0 when there are none.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordWeight {
    pub word: String,
    pub weight: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBar {
    pub category: String,
    pub count: u64,
}

impl AnalysisView {
    pub fn from_results(results: &AnalysisResults) -> Self {
        let stats = &results.basic_stats;
        let distribution = results.sentiments.distribution;
        let total = distribution.total();
        let slice = |label, count: u64| SentimentSlice {
            label,
            count,
            percent: if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            },
        };

        Self {
            total_comments: stats.total_comments,
            average_rating: stats.average_rating,
            unique_users: stats.unique_users,
            average_length: non_negative_round(stats.average_length),
            sentiment: vec![
                slice("positive", distribution.positive),
                slice("neutral", distribution.neutral),
                slice("negative", distribution.negative),
            ],
            keywords: results
                .keywords
                .iter()
                .map(|keyword| KeywordWeight {
                    word: keyword.0.clone(),
                    weight: non_negative_round(keyword.1 * 1000.0),
                })
                .collect(),
            categories: results
                .labels
                .category_counts
                .iter()
                .map(|(category, count)| CategoryBar {
                    category: category.clone(),
                    count: *count,
                })
                .collect(),
        }
    }
}

fn non_negative_round(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}
