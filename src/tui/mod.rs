//! Interactive history browser: fuzzy search, preview, copy, delete, clear.
mod app;
mod events;
mod layout;
mod rendering;
mod terminal;
mod timestamps;

use anyhow::Result;
pub use app::App;
pub use timestamps::format_millis;

use self::terminal::TerminalSession;
use crate::history::HistoryStore;
use crate::models::HistoryEntry;

/// Browse `store` until the user quits. Returns the entry picked with Enter, if any.
pub fn browse_history(store: &HistoryStore) -> Result<Option<HistoryEntry>> {
    let mut session = TerminalSession::enter()?;
    let mut app = App::new(store);
    let picked = app.run(session.terminal_mut());
    session.leave()?;
    picked
}
