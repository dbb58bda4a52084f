use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct AppLayout {
    pub search_area: Rect,
    pub results_area: Rect,
    pub preview_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Search line on top, entry list (55%) beside the preview (45%), status row at the bottom
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[1]);

        Self {
            search_area: rows[0],
            results_area: columns[0],
            preview_area: columns[1],
            status_area: rows[2],
        }
    }
}
