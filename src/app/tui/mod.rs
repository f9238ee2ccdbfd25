mod actions;
pub(super) mod form;
mod render;
mod session;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::TableState;

use crate::config::AppConfig;
use crate::store::{MovieStore, RemoteStore};

use super::controller::MovieController;

use self::actions::{
    fetch_state_label, selected_movie, status_error, status_from_notice, status_info,
    sync_selection,
};
use self::form::AddMovieForm;
use self::render::draw_tui;
use self::session::TuiSession;

#[derive(Debug, Clone)]
pub(super) struct PendingDelete {
    pub(super) id: String,
    pub(super) title: String,
}

/// Modal that currently owns the keyboard.
#[derive(Debug, Clone)]
pub(super) enum Overlay {
    AddForm(AddMovieForm),
    ConfirmDelete(PendingDelete),
}

enum Flow {
    Continue,
    Quit,
}

pub(crate) fn run_tui(config: &AppConfig) -> Result<()> {
    let store: Arc<dyn MovieStore> = Arc::new(RemoteStore::new(config));
    let mut controller = MovieController::new(store);

    let session = TuiSession::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;

    let mut table_state = TableState::default();
    let mut overlay = None::<Overlay>;
    controller.fetch_movies();
    let mut status = status_info("Fetching movies...");
    tracing::info!(source = config.source_label(), url = %config.url, "dashboard started");

    loop {
        let now = Instant::now();
        let selected_id = selected_movie(controller.movies(), &table_state).map(|m| m.id.clone());
        for notice in controller.pump(now) {
            status = status_from_notice(&notice);
        }
        sync_selection(controller.movies(), &mut table_state, selected_id.as_deref());

        let retry_in = controller.retry_timer().map(|timer| timer.remaining(now));
        let fetch_label = fetch_state_label(controller.state(), retry_in);
        terminal.draw(|frame| {
            draw_tui(
                frame,
                controller.movies(),
                &mut table_state,
                config.source_label(),
                &fetch_label,
                controller.is_loading(),
                controller.is_retrying(),
                controller.error(),
                &status,
                overlay.as_ref(),
            )
        })?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let flow = match overlay.take() {
            Some(Overlay::AddForm(form)) => {
                overlay = handle_form_key(key, form, &mut controller, &mut status);
                Flow::Continue
            }
            Some(Overlay::ConfirmDelete(pending)) => {
                overlay = handle_confirm_key(key, pending, &mut controller, &mut status);
                Flow::Continue
            }
            None => handle_dashboard_key(
                key,
                &mut controller,
                &mut table_state,
                &mut overlay,
                &mut status,
            ),
        };
        if matches!(flow, Flow::Quit) {
            break;
        }
    }

    controller.shutdown();
    session.leave()?;
    tracing::info!("dashboard closed");
    Ok(())
}

fn handle_dashboard_key(
    key: KeyEvent,
    controller: &mut MovieController,
    table_state: &mut TableState,
    overlay: &mut Option<Overlay>,
    status: &mut String,
) -> Flow {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
        KeyCode::Char('f') => {
            controller.fetch_movies();
            *status = status_info("Fetching movies...");
        }
        KeyCode::Char('c') => {
            *status = if controller.cancel_retry() {
                status_info("Retry cancelled. Press f to fetch again.")
            } else {
                status_info("No retry pending.")
            };
        }
        KeyCode::Char('a') => {
            *overlay = Some(Overlay::AddForm(AddMovieForm::default()));
        }
        KeyCode::Char('d') => match selected_movie(controller.movies(), table_state) {
            Some(movie) => {
                *overlay = Some(Overlay::ConfirmDelete(PendingDelete {
                    id: movie.id.clone(),
                    title: movie.title.clone(),
                }));
                *status = status_info("Confirm delete: y/Enter to delete, n/Esc to cancel.");
            }
            None => *status = status_error("Delete failed: no movie selected."),
        },
        KeyCode::Up => {
            if let Some(selected) = table_state.selected() {
                table_state.select(Some(selected.saturating_sub(1)));
            }
        }
        KeyCode::Down => {
            let count = controller.movies().len();
            if let Some(selected) = table_state.selected()
                && count > 0
            {
                table_state.select(Some((selected + 1).min(count - 1)));
            }
        }
        _ => {}
    }
    Flow::Continue
}

fn handle_form_key(
    key: KeyEvent,
    mut form: AddMovieForm,
    controller: &mut MovieController,
    status: &mut String,
) -> Option<Overlay> {
    match key.code {
        KeyCode::Esc => {
            *status = status_info("Add canceled.");
            return None;
        }
        KeyCode::Enter => match form.submit() {
            Ok(movie) => {
                *status = status_info(&format!("Adding {}...", movie.title));
                controller.add_movie(movie);
                return None;
            }
            Err(reason) => *status = status_error(&format!("Cannot add movie: {reason}.")),
        },
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_previous(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(ch) => form.push_char(ch),
        _ => {}
    }
    Some(Overlay::AddForm(form))
}

fn handle_confirm_key(
    key: KeyEvent,
    pending: PendingDelete,
    controller: &mut MovieController,
    status: &mut String,
) -> Option<Overlay> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            *status = status_info(&format!("Deleting {}...", pending.title));
            controller.delete_movie(&pending.id);
            None
        }
        KeyCode::Esc | KeyCode::Char('n') => {
            *status = status_info("Delete canceled.");
            None
        }
        _ => Some(Overlay::ConfirmDelete(pending)),
    }
}
