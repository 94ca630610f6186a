//! IMDb rating lookup
//!
//! IMDb has no public rating API, but its autocomplete endpoint
//! returns candidate title ids as JSON, and every title page embeds a
//! JSON-LD block with the aggregate rating. Resolution is two hops:
//! suggestion lookup to pick the best id, then a string scan of the
//! title page for `ratingValue` / `ratingCount`.

use serde::Serialize;

use super::fetch::FetchClient;
use super::sites::score_match;
use crate::error::AppError;

const SUGGESTION_BASE: &str = "https://v3.sg.media-imdb.com/suggestion/x";
const TITLE_BASE: &str = "https://www.imdb.com/title";

/// Aggregate rating for one IMDb title.
#[derive(Debug, Clone, Serialize)]
pub struct ImdbRating {
    pub imdb_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub rating: f64,
    pub votes: i64,
    pub url: String,
}

#[derive(Clone)]
pub struct ImdbClient {
    fetch: FetchClient,
}

impl ImdbClient {
    pub fn new(fetch: FetchClient) -> Self {
        Self { fetch }
    }

    /// Look up the rating for a title; `Ok(None)` when no candidate
    /// matches or the matched page carries no rating.
    pub async fn rating(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<ImdbRating>, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }

        let Some(candidate) = self.resolve_title(title, year).await? else {
            return Ok(None);
        };

        let url = format!("{TITLE_BASE}/{}/", candidate.id);
        let page = self.fetch.get_text(&url).await?;

        let Some(rating) = scan_number(&page, "\"ratingValue\":") else {
            return Ok(None);
        };
        let votes = scan_number(&page, "\"ratingCount\":").unwrap_or(0.0) as i64;

        Ok(Some(ImdbRating {
            imdb_id: candidate.id,
            title: candidate.title,
            year: candidate.year,
            rating,
            votes,
            url,
        }))
    }

    async fn resolve_title(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<Candidate>, AppError> {
        let url = format!("{SUGGESTION_BASE}/{}.json", urlencoding::encode(title));
        let body = self.fetch.get_json(&url).await?;

        let suggestions = body
            .get("d")
            .and_then(|d| d.as_array())
            .cloned()
            .unwrap_or_default();

        let best = suggestions
            .iter()
            .filter_map(parse_suggestion)
            .map(|candidate| {
                let score = score_match(&candidate.title, candidate.year, title, year);
                (candidate, score)
            })
            .filter(|(_, score)| *score > 0)
            .max_by_key(|(_, score)| *score);

        Ok(best.map(|(candidate, _)| candidate))
    }
}

struct Candidate {
    id: String,
    title: String,
    year: Option<i32>,
}

/// Keep only title entries (tt-prefixed ids); the endpoint mixes in
/// people and keywords.
fn parse_suggestion(entry: &serde_json::Value) -> Option<Candidate> {
    let id = entry.get("id")?.as_str()?;
    if !id.starts_with("tt") {
        return None;
    }
    let title = entry.get("l")?.as_str()?;
    let year = entry.get("y").and_then(|y| y.as_i64()).map(|y| y as i32);
    Some(Candidate {
        id: id.to_string(),
        title: title.to_string(),
        year,
    })
}

/// First JSON number following `marker` in the page text.
fn scan_number(page: &str, marker: &str) -> Option<f64> {
    let start = page.find(marker)? + marker.len();
    let rest = &page[start..];
    let end = rest
        .find(|ch: char| !ch.is_ascii_digit() && ch != '.')
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_number_reads_rating_from_json_ld() {
        let page = r#"{"@type":"AggregateRating","ratingCount":2300000,"ratingValue":8.8}"#;
        assert_eq!(scan_number(page, "\"ratingValue\":"), Some(8.8));
        assert_eq!(scan_number(page, "\"ratingCount\":"), Some(2_300_000.0));
    }

    #[test]
    fn scan_number_missing_marker() {
        assert_eq!(scan_number("<html></html>", "\"ratingValue\":"), None);
    }

    #[test]
    fn parse_suggestion_skips_people() {
        let person = serde_json::json!({"id": "nm0000138", "l": "Leonardo DiCaprio"});
        assert!(parse_suggestion(&person).is_none());

        let movie = serde_json::json!({"id": "tt1375666", "l": "Inception", "y": 2010});
        let candidate = parse_suggestion(&movie).expect("movie entry should parse");
        assert_eq!(candidate.id, "tt1375666");
        assert_eq!(candidate.year, Some(2010));
    }
}
