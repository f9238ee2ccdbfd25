use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::FetchError;

/// A movie as the rest of the app sees it, whatever backend it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MovieRecord {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) opening_text: String,
    pub(crate) release_date: String,
}

/// Body of a create request: a record before the store has assigned its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewMovie {
    pub(crate) title: String,
    pub(crate) opening_text: String,
    pub(crate) release_date: String,
}

impl NewMovie {
    #[cfg(test)]
    pub(crate) fn into_record(self, id: String) -> MovieRecord {
        MovieRecord {
            id,
            title: self.title,
            opening_text: self.opening_text,
            release_date: self.release_date,
        }
    }
}

fn parse_json(raw: &str) -> Result<Value, FetchError> {
    serde_json::from_str(raw)
        .map_err(|err| FetchError::Transport(format!("invalid JSON response: {err}")))
}

fn text_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

/// Maps a film catalog page (`{"results": [...]}`) into records.
pub(crate) fn parse_films_response(raw: &str) -> Result<Vec<MovieRecord>, FetchError> {
    let parsed = parse_json(raw)?;
    let Some(results) = parsed.get("results").and_then(Value::as_array) else {
        return Err(FetchError::Transport(
            "unexpected response: missing `results` array".to_string(),
        ));
    };

    Ok(results
        .iter()
        .map(|film| MovieRecord {
            id: text_field(film, "episode_id"),
            title: text_field(film, "title"),
            opening_text: text_field(film, "opening_crawl"),
            release_date: text_field(film, "release_date"),
        })
        .collect())
}

/// Maps a store listing (`{"<key>": {...}, ...}`) into records ordered by key.
///
/// An empty store answers `null`.
pub(crate) fn parse_store_response(raw: &str) -> Result<Vec<MovieRecord>, FetchError> {
    let parsed = parse_json(raw)?;
    let entries = match parsed {
        Value::Null => return Ok(Vec::new()),
        Value::Object(entries) => entries,
        _ => {
            return Err(FetchError::Transport(
                "unexpected response: expected an object keyed by movie id".to_string(),
            ));
        }
    };

    let mut movies: Vec<MovieRecord> = entries
        .iter()
        .filter(|(_, movie)| !movie.is_null())
        .map(|(key, movie)| MovieRecord {
            id: key.clone(),
            title: text_field(movie, "title"),
            opening_text: text_field(movie, "openingText"),
            release_date: text_field(movie, "releaseDate"),
        })
        .collect();
    movies.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(movies)
}

/// Reads the generated key out of a create reply (`{"name": "<key>"}`).
pub(crate) fn parse_created_id(raw: &str) -> Result<String, FetchError> {
    let parsed = parse_json(raw)?;
    parsed
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| FetchError::Transport("create reply did not include a key".to_string()))
}

pub(crate) fn truncate(input: &str, max: usize) -> String {
    let count = input.chars().count();
    if count <= max {
        return input.to_string();
    }
    let mut out = input.chars().take(max.saturating_sub(3)).collect::<String>();
    out.push_str("...");
    out
}
