//! History browser state and event handling.
//!
//! `App` owns the loaded entries, a `nucleo` matcher over "name + payload" and the
//! transient status line. Mutations (delete, clear) go through [`HistoryStore`] and
//! the entry list is reloaded from the store afterwards, so the view never drifts
//! from what is persisted.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use nucleo::{Config, Nucleo};
use ratatui::Terminal;
use ratatui::backend::Backend;

use super::events::{Action, poll_event};
use super::rendering::{RenderState, render_ui};
use crate::clipboard::copy_text_to_clipboard;
use crate::history::HistoryStore;
use crate::models::{HistoryEntry, PayloadConfig};
use crate::payload;
use crate::render::{build_grid, raster};
use crate::utils::sanitize_single_line;

const STATUS_SUCCESS_DURATION_MS: u64 = 3000;
const STATUS_ERROR_DURATION_MS: u64 = 5000;

const MAX_QUERY_LEN: usize = 256;
const PAGE_SIZE: isize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Instant,
}

/// Cached half-block rendering for the selected entry
struct Preview {
    id: String,
    symbol: String,
}

pub struct App<'a> {
    store: &'a HistoryStore,
    nucleo: Nucleo<HistoryEntry>,
    all_entries: Vec<HistoryEntry>,
    selected_idx: usize,
    search_query: String,
    should_quit: bool,
    picked: Option<HistoryEntry>,
    clear_armed: bool,
    preview: Option<Preview>,
    status_message: Option<StatusMessage>,
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl<'a> App<'a> {
    pub fn new(store: &'a HistoryStore) -> Self {
        let all_entries = store.list();
        let mut app = Self {
            store,
            nucleo: new_matcher(),
            all_entries,
            selected_idx: 0,
            search_query: String::new(),
            should_quit: false,
            picked: None,
            clear_armed: false,
            preview: None,
            status_message: None,
            needs_redraw: true,
            last_draw_time: Instant::now(),
        };
        app.inject_entries();
        app
    }

    /// Run until the user quits or picks an entry. Returns the picked entry.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<Option<HistoryEntry>> {
        while !self.should_quit {
            if self.clear_expired_status() {
                self.needs_redraw = true;
            }

            if self.nucleo.tick(10).changed {
                self.needs_redraw = true;
            }
            self.refresh_preview();

            let matched_items = self.collect_matched_items();
            let matched_count = matched_items.len();

            // Periodic redraw picks up terminal resizes
            let now = Instant::now();
            if self.needs_redraw
                || now.duration_since(self.last_draw_time) >= Duration::from_millis(100)
            {
                terminal.draw(|f| {
                    let state = RenderState {
                        search_query: &self.search_query,
                        total_count: self.all_entries.len(),
                        selected_idx: self.selected_idx,
                        preview_symbol: self.preview.as_ref().map(|p| p.symbol.as_str()),
                        clear_armed: self.clear_armed,
                        status_message: self.status_message.as_ref(),
                    };
                    render_ui(f, &matched_items, &state);
                })?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            let action = poll_event(Duration::from_millis(100))?;
            self.handle_action(action, matched_count);
        }

        Ok(self.picked.take())
    }

    fn collect_matched_items(&self) -> Vec<&HistoryEntry> {
        let snapshot = self.nucleo.snapshot();
        snapshot.matched_items(..snapshot.matched_item_count()).map(|item| item.data).collect()
    }

    fn selected_entry(&self) -> Option<&HistoryEntry> {
        let snapshot = self.nucleo.snapshot();
        snapshot
            .matched_items(..snapshot.matched_item_count())
            .nth(self.selected_idx)
            .map(|item| item.data)
    }

    fn handle_action(&mut self, action: Action, total_items: usize) {
        if !matches!(action, Action::ClearHistory | Action::None) {
            self.clear_armed = false;
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::ClearSearch => {
                if self.search_query.is_empty() {
                    self.should_quit = true;
                } else {
                    self.search_query.clear();
                    self.update_pattern();
                }
            }
            Action::MoveUp => self.move_selection(-1, total_items),
            Action::MoveDown => self.move_selection(1, total_items),
            Action::PageUp => self.move_selection(-PAGE_SIZE, total_items),
            Action::PageDown => self.move_selection(PAGE_SIZE, total_items),
            Action::UpdateSearch(c) => self.update_search(c),
            Action::DeleteChar => self.delete_char(),
            Action::Select => {
                if let Some(entry) = self.selected_entry().cloned() {
                    self.picked = Some(entry);
                    self.should_quit = true;
                }
            }
            Action::CopyPayload => self.copy_selected(),
            Action::DeleteEntry => self.delete_selected(),
            Action::ClearHistory => self.clear_history(),
            Action::None => {}
        }
    }

    fn copy_selected(&mut self) {
        let payload = match self.selected_entry().map(|e| payload::encode_if_ready(&e.config)) {
            Some(Some(payload)) => payload,
            Some(None) => {
                self.set_status(
                    "✗ Entry is incomplete, nothing to copy",
                    MessageType::Error,
                    STATUS_ERROR_DURATION_MS,
                );
                return;
            }
            None => {
                self.set_status("✗ No entry selected", MessageType::Error, STATUS_ERROR_DURATION_MS);
                return;
            }
        };

        match copy_text_to_clipboard(&payload) {
            Ok(()) => self.set_status(
                "✓ Payload copied to clipboard",
                MessageType::Success,
                STATUS_SUCCESS_DURATION_MS,
            ),
            Err(e) => self.set_status(
                format!("✗ Clipboard error: {}", e),
                MessageType::Error,
                STATUS_ERROR_DURATION_MS,
            ),
        }
    }

    fn delete_selected(&mut self) {
        let Some((id, name)) = self.selected_entry().map(|e| (e.id.clone(), e.name.clone())) else {
            self.set_status("✗ No entry selected", MessageType::Error, STATUS_ERROR_DURATION_MS);
            return;
        };

        match self.store.delete(&id) {
            Ok(_) => {
                self.reload();
                self.set_status(
                    format!("✓ Deleted '{}'", sanitize_single_line(&name)),
                    MessageType::Success,
                    STATUS_SUCCESS_DURATION_MS,
                );
            }
            Err(e) => self.set_status(
                format!("✗ Delete failed: {}", e),
                MessageType::Error,
                STATUS_ERROR_DURATION_MS,
            ),
        }
    }

    fn clear_history(&mut self) {
        if self.all_entries.is_empty() {
            self.set_status("✗ History is already empty", MessageType::Error, STATUS_ERROR_DURATION_MS);
            return;
        }

        if !self.clear_armed {
            self.clear_armed = true;
            self.set_status(
                "Press Ctrl+X again to delete all history",
                MessageType::Error,
                STATUS_ERROR_DURATION_MS,
            );
            return;
        }

        self.clear_armed = false;
        match self.store.clear() {
            Ok(()) => {
                self.reload();
                self.set_status("✓ History cleared", MessageType::Success, STATUS_SUCCESS_DURATION_MS);
            }
            Err(e) => self.set_status(
                format!("✗ Clear failed: {}", e),
                MessageType::Error,
                STATUS_ERROR_DURATION_MS,
            ),
        }
    }

    fn set_status(&mut self, text: impl Into<String>, message_type: MessageType, duration_ms: u64) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: Instant::now() + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    /// Drop an expired status message; returns whether one was dropped
    fn clear_expired_status(&mut self) -> bool {
        let expired =
            self.status_message.as_ref().is_some_and(|msg| Instant::now() >= msg.expires_at);
        if expired {
            self.status_message = None;
        }
        expired
    }

    fn move_selection(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.selected_idx = 0;
            return;
        }

        let old_idx = self.selected_idx;
        let new_idx = (self.selected_idx as isize + delta).max(0) as usize;
        self.selected_idx = new_idx.min(total - 1);

        if old_idx != self.selected_idx {
            self.needs_redraw = true;
        }
    }

    fn update_search(&mut self, c: char) {
        if self.search_query.len() < MAX_QUERY_LEN {
            self.search_query.push(c);
            self.update_pattern();
        }
    }

    fn delete_char(&mut self) {
        if self.search_query.pop().is_some() {
            self.update_pattern();
        }
    }

    fn update_pattern(&mut self) {
        self.nucleo.pattern.reparse(
            0,
            &self.search_query,
            nucleo::pattern::CaseMatching::Smart,
            nucleo::pattern::Normalization::Smart,
            false,
        );
        self.nucleo.tick(10);
        self.selected_idx = 0;
        self.needs_redraw = true;
    }

    /// Re-read the store and rebuild the matcher, keeping the current query
    fn reload(&mut self) {
        self.all_entries = self.store.list();
        self.nucleo = new_matcher();
        self.inject_entries();
        self.update_pattern();
        self.preview = None;
    }

    fn inject_entries(&mut self) {
        let injector = self.nucleo.injector();
        for entry in &self.all_entries {
            let haystack = format!("{} {}", entry.name, payload::encode(&entry.config));
            injector.push(entry.clone(), move |_entry, cols| {
                cols[0] = haystack.as_str().into();
            });
        }
    }

    fn refresh_preview(&mut self) {
        let selected = self.selected_entry().map(|e| (e.id.clone(), e.config.clone()));
        match selected {
            Some((id, config)) => {
                if self.preview.as_ref().is_none_or(|p| p.id != id) {
                    self.preview = Some(Preview { id, symbol: preview_symbol(&config) });
                    self.needs_redraw = true;
                }
            }
            None => self.preview = None,
        }
    }
}

fn new_matcher() -> Nucleo<HistoryEntry> {
    Nucleo::new(Config::DEFAULT, Arc::new(|| {}), None, 1)
}

/// Half-block QR of the entry's payload, or the reason there is none
fn preview_symbol(config: &PayloadConfig) -> String {
    let Some(payload) = payload::encode_if_ready(config) else {
        return "(incomplete configuration)".to_string();
    };
    match build_grid(&payload, config.render_params.error_correction_level) {
        Ok(grid) => raster::to_half_blocks(&grid, 1),
        Err(e) => format!("(cannot render: {})", e),
    }
}
