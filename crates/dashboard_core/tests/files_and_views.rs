use dashboard_core::{
    update, AnalysisResults, AnalysisView, AppState, BasicStats, CategoryBar, Effect,
    FileListing, FileSection, Keyword, KeywordWeight, Labels, Msg, NoticeLevel, Sentiments,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn empty_listing_renders_placeholders() {
    let (state, effects) = update(AppState::new(), Msg::RefreshFilesRequested);
    assert_eq!(effects, vec![Effect::RefreshFiles]);
    assert!(!state.is_idle());

    let (state, effects) = update(state, Msg::FilesListed(FileListing::default()));
    assert_eq!(effects, vec![Effect::PresentFiles]);
    assert!(state.is_idle());

    let files = state.view().files.expect("listing stored");
    assert_eq!(files.comment_files, FileSection::Empty);
    assert_eq!(files.analysis_files, FileSection::Empty);
}

#[test]
fn listing_keeps_sections_apart() {
    let (state, _) = update(AppState::new(), Msg::RefreshFilesRequested);
    let (state, _) = update(
        state,
        Msg::FilesListed(FileListing {
            comment_files: vec!["comments_a.json".into()],
            analysis_files: Vec::new(),
        }),
    );
    let files = state.view().files.unwrap();
    assert_eq!(
        files.comment_files,
        FileSection::Files(vec!["comments_a.json".into()])
    );
    assert_eq!(files.analysis_files, FileSection::Empty);
}

#[test]
fn loading_a_stored_analysis_presents_it() {
    let (state, effects) = update(
        AppState::new(),
        Msg::AnalysisRequested {
            filename: " comments_a_analysis.json ".into(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::LoadAnalysis {
            filename: "comments_a_analysis.json".into()
        }]
    );

    let (state, effects) = update(
        state,
        Msg::AnalysisLoaded {
            filename: "comments_a_analysis.json".into(),
            data: json!({ "basic_stats": { "total_comments": 9 } }),
        },
    );
    assert!(matches!(effects.as_slice(), [Effect::PresentAnalysis(_)]));
    assert_eq!(state.latest_analysis().unwrap().basic_stats.total_comments, 9);
    assert!(state.is_idle());
}

#[test]
fn analysis_load_failure_is_surfaced() {
    let (state, _) = update(
        AppState::new(),
        Msg::AnalysisRequested {
            filename: "missing.json".into(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::AnalysisLoadFailed {
            filename: "missing.json".into(),
            error: "文件未找到".into(),
        },
    );
    let [Effect::Notify(notice)] = effects.as_slice() else {
        panic!("expected one notice, got {effects:?}");
    };
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.text.contains("文件未找到"));
    assert!(state.is_idle());
}

#[test]
fn blank_download_name_issues_no_request() {
    let (state, effects) = update(
        AppState::new(),
        Msg::DownloadRequested {
            filename: "  ".into(),
        },
    );
    assert!(!effects.iter().any(|e| matches!(e, Effect::Download { .. })));
    assert!(state.is_idle());
}

#[test]
fn download_round_trip_settles() {
    let (state, effects) = update(
        AppState::new(),
        Msg::DownloadRequested {
            filename: "comments_a.json".into(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Download {
            filename: "comments_a.json".into()
        }]
    );
    let (state, effects) = update(
        state,
        Msg::Downloaded {
            filename: "comments_a.json".into(),
            path: "downloads/comments_a.json".into(),
        },
    );
    assert!(matches!(effects.as_slice(), [Effect::Notify(n)] if n.level == NoticeLevel::Info));
    assert!(state.is_idle());
}

#[test]
fn analysis_view_tolerates_zero_and_empty_sections() {
    let view = AnalysisView::from_results(&AnalysisResults::default());
    assert_eq!(view.total_comments, 0);
    assert_eq!(view.sentiment.len(), 3);
    assert!(view.sentiment.iter().all(|slice| slice.count == 0 && slice.percent == 0.0));
    assert!(view.keywords.is_empty());
    assert!(view.categories.is_empty());
}

#[test]
fn analysis_view_derives_weights_and_shares() {
    let mut results = AnalysisResults {
        basic_stats: BasicStats {
            total_comments: 4,
            average_rating: 4.2,
            unique_users: 3,
            average_length: 21.5,
        },
        sentiments: Sentiments::default(),
        keywords: vec![Keyword("好吃".into(), 0.1234), Keyword("排队".into(), 0.0)],
        labels: Labels::default(),
    };
    results.sentiments.distribution.positive = 3;
    results.sentiments.distribution.negative = 1;
    results.labels.category_counts.insert("服务".into(), 5);
    results.labels.category_counts.insert("口味".into(), 2);

    let view = AnalysisView::from_results(&results);
    assert_eq!(view.average_length, 22);
    assert_eq!(view.sentiment[0].percent, 75.0);
    assert_eq!(view.sentiment[1].percent, 0.0);
    assert_eq!(view.sentiment[2].percent, 25.0);
    assert_eq!(
        view.keywords,
        vec![
            KeywordWeight {
                word: "好吃".into(),
                weight: 123
            },
            KeywordWeight {
                word: "排队".into(),
                weight: 0
            },
        ]
    );
    assert_eq!(
        view.categories,
        vec![
            CategoryBar {
                category: "口味".into(),
                count: 2
            },
            CategoryBar {
                category: "服务".into(),
                count: 5
            },
        ]
    );
}

#[test]
fn huge_sentiment_counts_do_not_overflow_the_view() {
    let mut results = AnalysisResults::default();
    results.sentiments.distribution.positive = u64::MAX;
    results.sentiments.distribution.neutral = 1;

    let view = AnalysisView::from_results(&results);
    assert_eq!(view.sentiment[0].count, u64::MAX);
    assert!(view.sentiment.iter().all(|slice| slice.percent.is_finite()));
    assert!(view.sentiment[0].percent <= 100.0);
}
