//! Terminal presentation of progress, notices and results.

pub(crate) mod render;
pub(crate) mod wordcloud;

use std::io::{self, Write};
use std::path::PathBuf;

use dashboard_core::{
    AnalysisResults, AnalysisView, AppViewModel, FileListingView, Notice, NoticeLevel,
    WordcloudResult,
};
use dashboard_engine::AtomicFileWriter;
use engine_logging::{engine_info, engine_warn};

const DOWNLOAD_HINT: &str = "Fetch a file with `dashboard download <filename>`.";

pub(crate) struct Presenter<W: Write> {
    out: W,
    images: AtomicFileWriter,
    errors: usize,
    last_progress: Vec<String>,
}

impl<W: Write> Presenter<W> {
    pub fn new(out: W, output_dir: PathBuf) -> Self {
        Self {
            out,
            images: AtomicFileWriter::new(output_dir),
            errors: 0,
            last_progress: Vec::new(),
        }
    }

    /// Error notices shown so far.
    pub fn error_count(&self) -> usize {
        self.errors
    }

    /// Prints progress rows that changed since the last call.
    pub fn progress(&mut self, view: &AppViewModel) -> io::Result<()> {
        let lines = render::render_progress(view);
        let changed: Vec<&String> = lines
            .iter()
            .filter(|line| !self.last_progress.contains(line))
            .collect();
        for line in changed {
            writeln!(self.out, "{line}")?;
        }
        self.last_progress = lines;
        self.out.flush()
    }

    pub fn notice(&mut self, notice: &Notice) -> io::Result<()> {
        match notice.level {
            NoticeLevel::Error => {
                self.errors += 1;
                engine_warn!("{}", notice.text);
            }
            NoticeLevel::Warning => engine_warn!("{}", notice.text),
            NoticeLevel::Info => engine_info!("{}", notice.text),
        }
        writeln!(self.out, "{}", render::render_notice(notice))?;
        self.out.flush()
    }

    pub fn files(&mut self, view: Option<&FileListingView>) -> io::Result<()> {
        let Some(view) = view else {
            return Ok(());
        };
        for line in render::render_files(view, DOWNLOAD_HINT) {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }

    pub fn analysis(&mut self, results: &AnalysisResults) -> io::Result<()> {
        for line in render::render_analysis(&AnalysisView::from_results(results)) {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }

    pub fn wordclouds(&mut self, result: &WordcloudResult, timestamp: &str) -> io::Result<()> {
        let saved = wordcloud::save_wordclouds(&self.images, result, timestamp);
        for (label, path) in &saved.written {
            writeln!(self.out, "word cloud [{label}] saved to {}", path.display())?;
        }
        for skipped in &saved.skipped {
            self.notice(&Notice::warning(
                None,
                format!("could not save word cloud {}: {}", skipped.label, skipped.reason),
            ))?;
        }
        self.out.flush()
    }
}
