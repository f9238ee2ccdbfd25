use anyhow::{Result, bail};

use crate::cli::{Cli, SourceKind};

pub const DEFAULT_FILMS_URL: &str = "https://swapi.dev/api/films/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub source: SourceKind,
    pub url: String,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Self::resolve(cli.source, cli.url.as_deref())
    }

    fn resolve(source: SourceKind, url: Option<&str>) -> Result<Self> {
        let url = url.map(str::trim).filter(|url| !url.is_empty());
        let url = match (source, url) {
            (_, Some(url)) => url.to_string(),
            (SourceKind::Films, None) => DEFAULT_FILMS_URL.to_string(),
            (SourceKind::Store, None) => {
                bail!("the store source needs a database URL (--url or MOVIEDECK_URL)")
            }
        };
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!("unsupported endpoint '{url}': expected an http(s) URL");
        }
        Ok(Self { source, url })
    }

    pub fn source_label(&self) -> &'static str {
        match self.source {
            SourceKind::Films => "films",
            SourceKind::Store => "store",
        }
    }
}
