//! Writes generated word clouds to disk as PNG files.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use dashboard_core::{WordcloudImage, WordcloudResult};
use dashboard_engine::{AtomicFileWriter, PersistError};

/// One image the presenter could not save.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SkippedImage {
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SavedWordclouds {
    pub written: Vec<(String, PathBuf)>,
    pub skipped: Vec<SkippedImage>,
}

/// Decodes and writes every image in `result`, overall first.
///
/// `timestamp` keeps repeated runs from overwriting each other.
pub(crate) fn save_wordclouds(
    writer: &AtomicFileWriter,
    result: &WordcloudResult,
    timestamp: &str,
) -> SavedWordclouds {
    let mut saved = SavedWordclouds::default();

    let overall = result
        .overall_wordcloud
        .as_ref()
        .map(|image| ("overall".to_string(), format!("wordcloud_overall_{timestamp}.png"), image));
    let categories = result.category_wordclouds.iter().map(|(category, image)| {
        (
            category.clone(),
            format!("wordcloud_{}_{timestamp}.png", sanitize(category)),
            image,
        )
    });

    for (label, filename, image) in overall.into_iter().chain(categories) {
        match write_image(writer, &filename, image) {
            Ok(path) => saved.written.push((label, path)),
            Err(reason) => saved.skipped.push(SkippedImage { label, reason }),
        }
    }
    saved
}

fn write_image(
    writer: &AtomicFileWriter,
    filename: &str,
    image: &WordcloudImage,
) -> Result<PathBuf, String> {
    let bytes = STANDARD
        .decode(image.image_base64.trim())
        .map_err(|err| format!("invalid image data: {err}"))?;
    writer
        .write(filename, &bytes)
        .map_err(|err: PersistError| err.to_string())
}

/// Category names are free text; keep them to one path component.
fn sanitize(category: &str) -> String {
    let cleaned: String = category
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    match cleaned.trim_matches('.') {
        "" => "category".to_string(),
        name => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn image(bytes: &[u8]) -> WordcloudImage {
        WordcloudImage {
            image_base64: STANDARD.encode(bytes),
        }
    }

    #[test]
    fn writes_overall_and_category_images() {
        let temp = TempDir::new().unwrap();
        let writer = AtomicFileWriter::new(temp.path().to_path_buf());
        let result = WordcloudResult {
            overall_wordcloud: Some(image(PNG_MAGIC)),
            category_wordclouds: BTreeMap::from([("服务".to_string(), image(PNG_MAGIC))]),
        };

        let saved = save_wordclouds(&writer, &result, "20240101_120000");

        assert!(saved.skipped.is_empty());
        let names: Vec<_> = saved
            .written
            .iter()
            .map(|(label, path)| (label.as_str(), path.file_name().unwrap().to_str().unwrap()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("overall", "wordcloud_overall_20240101_120000.png"),
                ("服务", "wordcloud_服务_20240101_120000.png"),
            ]
        );
        assert_eq!(std::fs::read(&saved.written[0].1).unwrap(), PNG_MAGIC);
    }

    #[test]
    fn bad_base64_is_skipped_not_fatal() {
        let temp = TempDir::new().unwrap();
        let writer = AtomicFileWriter::new(temp.path().to_path_buf());
        let result = WordcloudResult {
            overall_wordcloud: Some(WordcloudImage {
                image_base64: "not base64!".into(),
            }),
            category_wordclouds: BTreeMap::from([("环境".to_string(), image(PNG_MAGIC))]),
        };

        let saved = save_wordclouds(&writer, &result, "ts");

        assert_eq!(saved.written.len(), 1);
        assert_eq!(saved.skipped.len(), 1);
        assert_eq!(saved.skipped[0].label, "overall");
    }

    #[test]
    fn category_names_cannot_escape_the_directory() {
        assert_eq!(sanitize("../etc/passwd"), "_etc_passwd");
        assert_eq!(sanitize("口味 / 菜品"), "口味___菜品");
        assert_eq!(sanitize(".."), "category");
    }
}
