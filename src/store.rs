use crate::cli::SourceKind;
use crate::config::AppConfig;
use crate::http::{FetchError, HttpClient};
use crate::movies::{
    MovieRecord, NewMovie, parse_created_id, parse_films_response, parse_store_response,
};

/// Remote movie list. Implementations block; callers run them off the UI thread.
pub(crate) trait MovieStore: Send + Sync {
    fn fetch_movies(&self) -> Result<Vec<MovieRecord>, FetchError>;

    /// Creates the movie and returns the id the store assigned to it.
    fn add_movie(&self, movie: &NewMovie) -> Result<String, FetchError>;

    fn delete_movie(&self, id: &str) -> Result<(), FetchError>;
}

#[derive(Debug, Clone)]
pub(crate) struct RemoteStore {
    http: HttpClient,
    source: SourceKind,
    url: String,
}

impl RemoteStore {
    pub(crate) fn new(config: &AppConfig) -> Self {
        Self::with_client(HttpClient::new(), config)
    }

    pub(crate) fn with_client(http: HttpClient, config: &AppConfig) -> Self {
        Self {
            http,
            source: config.source,
            url: config.url.clone(),
        }
    }

    fn store_base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    fn collection_url(&self) -> String {
        format!("{}/movies.json", self.store_base())
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/movies/{}.json", self.store_base(), id)
    }
}

impl MovieStore for RemoteStore {
    fn fetch_movies(&self) -> Result<Vec<MovieRecord>, FetchError> {
        match self.source {
            SourceKind::Films => parse_films_response(&self.http.get_text(&self.url)?),
            SourceKind::Store => parse_store_response(&self.http.get_text(&self.collection_url())?),
        }
    }

    fn add_movie(&self, movie: &NewMovie) -> Result<String, FetchError> {
        if self.source == SourceKind::Films {
            return Err(FetchError::Unsupported {
                operation: "add",
                backend: "films",
            });
        }
        let body = serde_json::to_string(movie)
            .map_err(|err| FetchError::Transport(format!("failed to encode movie: {err}")))?;
        let reply = self.http.post_json(&self.collection_url(), &body)?;
        parse_created_id(&reply)
    }

    fn delete_movie(&self, id: &str) -> Result<(), FetchError> {
        if self.source == SourceKind::Films {
            return Err(FetchError::Unsupported {
                operation: "delete",
                backend: "films",
            });
        }
        check_item_id(id)?;
        self.http.delete(&self.item_url(id))
    }
}

/// A store key must address exactly one child of the collection.
fn check_item_id(id: &str) -> Result<(), FetchError> {
    let unsafe_char = |ch: char| {
        ch.is_whitespace()
            || ch.is_control()
            || matches!(ch, '/' | '\\' | '.' | '?' | '#' | '%' | '$' | '[' | ']')
    };
    if id.is_empty() || id.contains(unsafe_char) {
        return Err(FetchError::InvalidId { id: id.to_string() });
    }
    Ok(())
}
