mod controller;
mod tui;


use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};

use crate::cli::{AddArgs, Cli, Command};
use crate::config::AppConfig;
use crate::movies::{MovieRecord, NewMovie, truncate};
use crate::store::{MovieStore, RemoteStore};

use self::controller::{FetchState, MovieController, NoticeLevel, RetryState};

pub fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::from_cli(&cli)?;
    tracing::debug!(?config, "configuration resolved");

    match cli.command {
        Some(Command::List { json, no_retry }) => run_list(&config, json, no_retry)?,
        Some(Command::Add(args)) => run_add(&config, args)?,
        Some(Command::Delete { id }) => run_delete(&config, &id)?,
        Some(Command::Tui) | None => tui::run_tui(&config)?,
    }

    Ok(())
}

fn run_list(config: &AppConfig, json: bool, no_retry: bool) -> Result<()> {
    let store: Arc<dyn MovieStore> = Arc::new(RemoteStore::new(config));
    let mut controller = MovieController::new(store);
    controller.fetch_movies();

    loop {
        for notice in controller.wait(Duration::from_millis(250)) {
            if notice.level == NoticeLevel::Error {
                eprintln!("{}", notice.message);
            }
        }

        match controller.state() {
            FetchState::Success { .. } => break,
            FetchState::Failed {
                message,
                retry: RetryState::Cancelled,
                ..
            } => bail!("fetch failed: {message}"),
            FetchState::Failed {
                message,
                retry: RetryState::Pending(_),
                ..
            } if no_retry => {
                let message = message.clone();
                controller.cancel_retry();
                bail!("fetch failed: {message}");
            }
            _ => {}
        }
    }

    let movies = controller.movies();
    if json {
        println!("{}", serde_json::to_string_pretty(movies)?);
    } else {
        print_table(movies);
    }
    Ok(())
}

fn print_table(movies: &[MovieRecord]) {
    if movies.is_empty() {
        println!("No movies found.");
        return;
    }

    println!("{:<24} {:<40} {:<12}", "ID", "TITLE", "RELEASED");
    for movie in movies {
        println!(
            "{:<24} {:<40} {:<12}",
            truncate(&movie.id, 24),
            truncate(&movie.title, 40),
            movie.release_date
        );
    }
}

fn run_add(config: &AppConfig, args: AddArgs) -> Result<()> {
    let title = args.title.trim();
    if title.is_empty() {
        bail!("title must not be empty");
    }
    let movie = NewMovie {
        title: title.to_string(),
        opening_text: args.opening_text.trim().to_string(),
        release_date: args.release_date.trim().to_string(),
    };

    let store = RemoteStore::new(config);
    let id = store.add_movie(&movie)?;
    tracing::info!(%id, title = %movie.title, "movie added");
    println!("Added {} with id {id}", movie.title);
    Ok(())
}

fn run_delete(config: &AppConfig, id: &str) -> Result<()> {
    let id = id.trim();
    if id.is_empty() {
        bail!("movie id is required");
    }
    let store = RemoteStore::new(config);
    store.delete_movie(id)?;
    tracing::info!(%id, "movie deleted");
    println!("Deleted movie {id}");
    Ok(())
}
