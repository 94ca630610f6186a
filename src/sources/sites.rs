//! Ukrainian streaming-site adapters
//!
//! The target sites run DataLife Engine, so search results are plain
//! HTML pages. We do not need a full DOM: result links always appear
//! as `<a href="...">title</a>` anchors, so a small anchor scanner
//! plus a title/year scoring heuristic is enough.

use async_trait::async_trait;

use super::fetch::FetchClient;
use super::{SourceMatch, StreamingSource};
use crate::error::AppError;

/// Candidate link scraped from a search results page.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Anchor {
    pub href: String,
    pub text: String,
}

/// Pull every `<a href="...">...</a>` out of an HTML fragment.
///
/// Nested tags inside the anchor body are stripped; anchors without
/// an href or with empty text are dropped.
pub(crate) fn extract_anchors(html: &str) -> Vec<Anchor> {
    let mut anchors = Vec::new();
    let mut rest = html;

    while let Some(start) = rest.find("<a ") {
        rest = &rest[start..];
        let Some(tag_end) = rest.find('>') else {
            break;
        };
        let tag = &rest[..tag_end];
        let href = attribute_value(tag, "href");
        rest = &rest[tag_end + 1..];

        let Some(close) = rest.find("</a>") else {
            break;
        };
        let text = strip_tags(&rest[..close]);
        rest = &rest[close + 4..];

        if let Some(href) = href {
            if !text.is_empty() {
                anchors.push(Anchor { href, text });
            }
        }
    }

    anchors
}

fn attribute_value(tag: &str, name: &str) -> Option<String> {
    let marker = format!("{name}=\"");
    let start = tag.find(&marker)? + marker.len();
    let end = tag[start..].find('"')?;
    Some(tag[start..start + end].to_string())
}

/// Drop markup and collapse whitespace in an HTML fragment.
pub(crate) fn strip_tags(fragment: &str) -> String {
    let mut text = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            ch if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First plausible release year (1900..=2099) found in the text.
pub(crate) fn extract_year(text: &str) -> Option<i32> {
    let bytes = text.as_bytes();
    for (i, window) in bytes.windows(4).enumerate() {
        if !window.iter().all(u8::is_ascii_digit) {
            continue;
        }
        // Reject digits that are part of a longer run.
        let before_digit = i > 0 && bytes[i - 1].is_ascii_digit();
        let after_digit = bytes.get(i + 4).is_some_and(u8::is_ascii_digit);
        if before_digit || after_digit {
            continue;
        }
        if let Ok(year) = std::str::from_utf8(window).unwrap_or("").parse::<i32>() {
            if (1900..=2099).contains(&year) {
                return Some(year);
            }
        }
    }
    None
}

pub(crate) fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_alphanumeric() || ch.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Relevance of a scraped candidate to the wanted title/year.
///
/// Exact normalized title match scores highest, substring containment
/// next, and a matching (or adjacent) year breaks ties between
/// re-releases and originals.
pub(crate) fn score_match(
    candidate_title: &str,
    candidate_year: Option<i32>,
    wanted_title: &str,
    wanted_year: Option<i32>,
) -> i32 {
    let candidate = normalize_title(candidate_title);
    let wanted = normalize_title(wanted_title);
    if candidate.is_empty() || wanted.is_empty() {
        return 0;
    }

    let mut score = 0;
    if candidate == wanted {
        score += 100;
    } else if candidate.contains(&wanted) || wanted.contains(&candidate) {
        score += 50;
    }

    if let (Some(candidate_year), Some(wanted_year)) = (candidate_year, wanted_year) {
        if candidate_year == wanted_year {
            score += 25;
        } else if (candidate_year - wanted_year).abs() == 1 {
            score += 10;
        }
    }

    score
}

/// Whether an anchor looks like a title page rather than site chrome.
fn is_title_link(anchor: &Anchor, host: &str) -> bool {
    let href = &anchor.href;
    let on_site = href.starts_with('/') || href.contains(host);
    on_site && href.ends_with(".html")
}

fn absolute_url(base: &str, href: &str) -> String {
    if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        href.to_string()
    }
}

fn search_url(base: &str, title: &str) -> String {
    format!(
        "{base}/index.php?do=search&subaction=search&story={}",
        urlencoding::encode(title)
    )
}

const MIN_SCORE: i32 = 50;

/// uakino: scores every result and keeps the best one.
///
/// The site lists re-releases, trailers, and dubbed variants together,
/// so first-result-wins picks the wrong entry too often here.
pub struct UakinoSource;

const UAKINO_BASE: &str = "https://uakino.me";

#[async_trait]
impl StreamingSource for UakinoSource {
    fn id(&self) -> &'static str {
        "uakino"
    }

    fn display_name(&self) -> &'static str {
        "UAKino"
    }

    async fn search(
        &self,
        fetch: &FetchClient,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<SourceMatch>, AppError> {
        let html = fetch.get_text(&search_url(UAKINO_BASE, title)).await?;

        let best = extract_anchors(&html)
            .into_iter()
            .filter(|anchor| is_title_link(anchor, "uakino"))
            .map(|anchor| {
                let candidate_year = extract_year(&anchor.text);
                let score = score_match(&anchor.text, candidate_year, title, year);
                (anchor, candidate_year, score)
            })
            .filter(|(_, _, score)| *score >= MIN_SCORE)
            .max_by_key(|(_, _, score)| *score);

        Ok(best.map(|(anchor, candidate_year, _)| SourceMatch {
            title: anchor.text,
            url: absolute_url(UAKINO_BASE, &anchor.href),
            year: candidate_year,
        }))
    }
}

/// kinoukr: first result whose text contains the wanted title.
pub struct KinoukrSource;

const KINOUKR_BASE: &str = "https://kinoukr.com";

#[async_trait]
impl StreamingSource for KinoukrSource {
    fn id(&self) -> &'static str {
        "kinoukr"
    }

    fn display_name(&self) -> &'static str {
        "Kino.ukr"
    }

    async fn search(
        &self,
        fetch: &FetchClient,
        title: &str,
        _year: Option<i32>,
    ) -> Result<Option<SourceMatch>, AppError> {
        let html = fetch.get_text(&search_url(KINOUKR_BASE, title)).await?;
        Ok(first_containing(&html, "kinoukr", KINOUKR_BASE, title))
    }
}

/// eneyida: first result whose text contains the wanted title.
pub struct EneyidaSource;

const ENEYIDA_BASE: &str = "https://eneyida.tv";

#[async_trait]
impl StreamingSource for EneyidaSource {
    fn id(&self) -> &'static str {
        "eneyida"
    }

    fn display_name(&self) -> &'static str {
        "Енеїда"
    }

    async fn search(
        &self,
        fetch: &FetchClient,
        title: &str,
        _year: Option<i32>,
    ) -> Result<Option<SourceMatch>, AppError> {
        let html = fetch.get_text(&search_url(ENEYIDA_BASE, title)).await?;
        Ok(first_containing(&html, "eneyida", ENEYIDA_BASE, title))
    }
}

fn first_containing(html: &str, host: &str, base: &str, title: &str) -> Option<SourceMatch> {
    let wanted = normalize_title(title);
    extract_anchors(html)
        .into_iter()
        .filter(|anchor| is_title_link(anchor, host))
        .find(|anchor| normalize_title(&anchor.text).contains(&wanted))
        .map(|anchor| {
            let year = extract_year(&anchor.text);
            SourceMatch {
                url: absolute_url(base, &anchor.href),
                title: anchor.text,
                year,
            }
        })
}
