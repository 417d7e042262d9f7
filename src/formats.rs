//! Input format detection
//!
//! A cheap heuristic used to hint which converter fits a pasted input. It is
//! not a validator: a detected format only means the text looks like it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

static YAML_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*[\w-]+:\s").unwrap());

static MARKDOWN_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]\(").unwrap());

/// Formats the detector can recognise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// JSON object or array
    Json,
    /// XML Schema document
    Xsd,
    /// Generic XML
    Xml,
    /// HTML page
    Html,
    /// Comma-separated values
    Csv,
    /// YAML mapping or list
    Yaml,
    /// Markdown text
    Markdown,
    /// Nothing recognised
    Unknown,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Json => "json",
            Format::Xsd => "xsd",
            Format::Xml => "xml",
            Format::Html => "html",
            Format::Csv => "csv",
            Format::Yaml => "yaml",
            Format::Markdown => "markdown",
            Format::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Guess the format of some input text
pub fn detect_format(input: &str) -> Format {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Format::Unknown;
    }

    if looks_like_json(trimmed) {
        Format::Json
    } else if looks_like_xsd(trimmed) {
        Format::Xsd
    } else if looks_like_html(trimmed) {
        Format::Html
    } else if looks_like_xml(trimmed) {
        Format::Xml
    } else if looks_like_csv(trimmed) {
        Format::Csv
    } else if looks_like_yaml(trimmed) {
        Format::Yaml
    } else if looks_like_markdown(trimmed) {
        Format::Markdown
    } else {
        Format::Unknown
    }
}

fn looks_like_json(text: &str) -> bool {
    let bracketed = (text.starts_with('{') && text.ends_with('}'))
        || (text.starts_with('[') && text.ends_with(']'));
    bracketed && serde_json::from_str::<serde_json::Value>(text).is_ok()
}

fn looks_like_xsd(text: &str) -> bool {
    text.starts_with('<')
        && ["<xs:schema", "<xsd:schema", "xmlns:xs=", "xmlns:xsd="]
            .iter()
            .any(|marker| text.contains(marker))
}

fn looks_like_html(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    ["<!doctype html", "<html", "<head>", "<body>"]
        .iter()
        .any(|marker| lower.contains(marker))
}

fn looks_like_xml(text: &str) -> bool {
    text.starts_with('<')
        && text.contains('>')
        && (text.contains("<?xml") || (MARKUP_TAG.is_match(text) && text.contains("</")))
}

fn looks_like_csv(text: &str) -> bool {
    let mut lines = text.lines();
    match (lines.next(), lines.next()) {
        (Some(first), Some(second)) => {
            let commas = first.matches(',').count();
            commas > 0 && commas == second.matches(',').count()
        }
        _ => false,
    }
}

fn looks_like_yaml(text: &str) -> bool {
    text.contains(':')
        && (text.contains("\n- ") || YAML_KEY.is_match(text))
        && text
            .lines()
            .map(str::trim)
            .any(|line| line.contains(':') && !line.starts_with('#'))
}

fn looks_like_markdown(text: &str) -> bool {
    text.contains("# ") || text.contains("**") || text.contains('*') || MARKDOWN_LINK.is_match(text)
}
