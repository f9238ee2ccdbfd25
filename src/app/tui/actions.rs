use std::time::Duration;

use ratatui::widgets::TableState;

use crate::movies::MovieRecord;

use super::super::controller::{FetchState, Notice, NoticeLevel, RetryState};

pub(super) fn sync_selection(
    movies: &[MovieRecord],
    table_state: &mut TableState,
    preferred_id: Option<&str>,
) {
    if movies.is_empty() {
        table_state.select(None);
        return;
    }

    if let Some(id) = preferred_id
        && let Some(idx) = movies.iter().position(|movie| movie.id == id)
    {
        table_state.select(Some(idx));
        return;
    }

    match table_state.selected() {
        Some(selected) => table_state.select(Some(selected.min(movies.len() - 1))),
        None => table_state.select(Some(0)),
    }
}

pub(super) fn selected_movie<'a>(
    movies: &'a [MovieRecord],
    table_state: &TableState,
) -> Option<&'a MovieRecord> {
    table_state.selected().and_then(|idx| movies.get(idx))
}

pub(super) fn status_info(msg: &str) -> String {
    format!("INFO: {msg}")
}

pub(super) fn status_error(msg: &str) -> String {
    format!("ERROR: {msg}")
}

pub(super) fn status_from_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => status_info(&notice.message),
        NoticeLevel::Error => status_error(&notice.message),
    }
}

/// One-line summary of the fetch cycle for the header.
pub(super) fn fetch_state_label(state: &FetchState, retry_in: Option<Duration>) -> String {
    match state {
        FetchState::Idle => "not loaded".to_string(),
        FetchState::Loading { attempt: 1, .. } => "loading...".to_string(),
        FetchState::Loading { attempt, .. } => format!("retrying (attempt {attempt})..."),
        FetchState::Success { count, fetched_at } => {
            format!("loaded {count} at {}", fetched_at.format("%H:%M:%S"))
        }
        FetchState::Failed {
            retry: RetryState::Pending(_),
            ..
        } => {
            let secs = retry_in.map(|left| left.as_secs_f32().ceil() as u64).unwrap_or(0);
            format!("failed, retry in {secs}s")
        }
        FetchState::Failed {
            retry: RetryState::Cancelled,
            ..
        } => "failed, retry stopped".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;

    fn movie(id: &str) -> MovieRecord {
        MovieRecord {
            id: id.to_string(),
            title: format!("Movie {id}"),
            opening_text: String::new(),
            release_date: String::new(),
        }
    }

    #[test]
    fn selection_follows_preferred_id_after_refresh() {
        let movies = vec![movie("a"), movie("b"), movie("c")];
        let mut state = TableState::default();
        state.select(Some(0));
        sync_selection(&movies, &mut state, Some("c"));
        assert_eq!(state.selected(), Some(2));
    }

    #[test]
    fn selection_clamps_when_selected_row_disappears() {
        let movies = vec![movie("a"), movie("b")];
        let mut state = TableState::default();
        state.select(Some(4));
        sync_selection(&movies, &mut state, Some("gone"));
        assert_eq!(state.selected(), Some(1));

        sync_selection(&[], &mut state, None);
        assert_eq!(state.selected(), None);

        sync_selection(&movies, &mut state, None);
        assert_eq!(state.selected(), Some(0));
    }

    #[test]
    fn fetch_state_labels_cover_retry_cycle() {
        assert_eq!(fetch_state_label(&FetchState::Idle, None), "not loaded");
        assert_eq!(
            fetch_state_label(
                &FetchState::Loading {
                    attempt: 3,
                    auto_retry: true
                },
                None
            ),
            "retrying (attempt 3)..."
        );
        let cancelled = FetchState::Failed {
            message: "x".to_string(),
            attempt: 1,
            retry: RetryState::Cancelled,
        };
        assert_eq!(fetch_state_label(&cancelled, None), "failed, retry stopped");

        let fetched_at = Local
            .with_ymd_and_hms(2024, 5, 1, 9, 30, 15)
            .single()
            .expect("valid local time");
        let success = FetchState::Success {
            count: 2,
            fetched_at,
        };
        assert_eq!(fetch_state_label(&success, None), "loaded 2 at 09:30:15");
    }

    #[test]
    fn notices_map_to_prefixed_status() {
        let notice = Notice {
            level: NoticeLevel::Error,
            message: "Delete failed: boom".to_string(),
        };
        assert_eq!(status_from_notice(&notice), "ERROR: Delete failed: boom");
    }
}
