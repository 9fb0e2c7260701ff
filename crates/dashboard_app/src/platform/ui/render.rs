use dashboard_core::{
    AnalysisView, AppViewModel, FileListingView, FileSection, Notice, NoticeLevel,
};

const NO_FILES: &str = "no files";
const BAR_WIDTH: usize = 30;

pub(crate) fn render_progress(view: &AppViewModel) -> Vec<String> {
    view.progress
        .iter()
        .map(|row| {
            let mut line = format!("[{}] {}% {}", row.kind, row.percent, row.message);
            if row.poll_failures > 0 {
                line.push_str(&format!(" ({} failed polls)", row.poll_failures));
            }
            line.trim_end().to_string()
        })
        .collect()
}

pub(crate) fn render_notice(notice: &Notice) -> String {
    let level = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    match notice.kind {
        Some(kind) => format!("{level} [{kind}]: {}", notice.text),
        None => format!("{level}: {}", notice.text),
    }
}

pub(crate) fn render_files(files: &FileListingView, download_hint: &str) -> Vec<String> {
    let mut lines = vec!["Comment files:".to_string()];
    push_section(&mut lines, &files.comment_files);
    lines.push("Analysis files:".to_string());
    push_section(&mut lines, &files.analysis_files);
    if matches!(files.comment_files, FileSection::Files(_))
        || matches!(files.analysis_files, FileSection::Files(_))
    {
        lines.push(download_hint.to_string());
    }
    lines
}

fn push_section(lines: &mut Vec<String>, section: &FileSection) {
    match section {
        FileSection::Empty => lines.push(format!("  ({NO_FILES})")),
        FileSection::Files(names) => lines.extend(names.iter().map(|name| format!("  {name}"))),
    }
}

pub(crate) fn render_analysis(view: &AnalysisView) -> Vec<String> {
    let mut lines = vec![
        "Summary".to_string(),
        format!("  total comments : {}", view.total_comments),
        format!("  average rating : {}", view.average_rating),
        format!("  unique users   : {}", view.unique_users),
        format!("  average length : {}", view.average_length),
        "Sentiment".to_string(),
    ];

    let sentiment_max = view.sentiment.iter().map(|slice| slice.count).max().unwrap_or(0);
    for slice in &view.sentiment {
        lines.push(format!(
            "  {:<8} {} {} ({:.1}%)",
            slice.label,
            bar(slice.count, sentiment_max),
            slice.count,
            slice.percent
        ));
    }

    lines.push("Keywords".to_string());
    if view.keywords.is_empty() {
        lines.push("  (none)".to_string());
    }
    for keyword in &view.keywords {
        lines.push(format!("  {} {}", keyword.word, keyword.weight));
    }

    lines.push("Categories".to_string());
    if view.categories.is_empty() {
        lines.push("  (none)".to_string());
    }
    let category_max = view.categories.iter().map(|c| c.count).max().unwrap_or(0);
    for category in &view.categories {
        lines.push(format!(
            "  {} {} {}",
            category.category,
            bar(category.count, category_max),
            category.count
        ));
    }
    lines
}

fn bar(value: u64, max: u64) -> String {
    if max == 0 {
        return "|".to_string();
    }
    let width = (value.saturating_mul(BAR_WIDTH as u64) / max) as usize;
    format!("|{}", "=".repeat(width))
}
