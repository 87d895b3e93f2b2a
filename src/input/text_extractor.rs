//! Per-format text extraction for resumes and job descriptions

use crate::error::{Result, ScreenerError};
use pulldown_cmark::{html, Parser};
use regex::Regex;
use std::path::Path;
use tokio::fs;

// `&amp;` is unescaped last so that escaped entities like `&amp;lt;` come
// out as literal text instead of being unescaped twice.
const HTML_ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            ScreenerError::PdfExtraction(format!(
                "Failed to extract text from PDF '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(text)
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).await?;
        Ok(content)
    }
}

/// Renders markdown to HTML and strips the tags, which drops formatting
/// markers while keeping heading and list text.
pub struct MarkdownExtractor {
    tag_regex: Regex,
}

impl MarkdownExtractor {
    pub fn new() -> Self {
        Self {
            // The pattern is a constant, so compilation cannot fail.
            tag_regex: Regex::new(r"<[^>]*>").expect("valid tag regex"),
        }
    }

    fn html_to_text(&self, html: &str) -> String {
        let mut text = html.replace("<br>", "\n").replace("</p>", "\n\n");
        for (entity, plain) in HTML_ENTITIES {
            text = text.replace(entity, plain);
        }

        let without_tags = self.tag_regex.replace_all(&text, "");

        without_tags
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for MarkdownExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await?;

        let parser = Parser::new(&markdown_content);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        let text = self.html_to_text(&html_output);
        Ok(text)
    }
}
