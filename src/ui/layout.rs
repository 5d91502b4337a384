use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main layout structure
pub struct MainLayout {
    pub keybindings_area: Rect,
    pub header_area: Rect,
    pub main_area: Rect,
    pub side_area: Rect,
}

/// Create the main layout
/// - Top bar: keybindings / status (1 row)
/// - Header: list name + counter, or timer mode tabs (3 rows)
/// - Content: main pane (65%) | side pane (35%)
pub fn create_layout(area: Rect) -> MainLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Keybindings bar
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
        ])
        .split(area);

    let keybindings_area = vertical[0];
    let header_area = vertical[1];

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(65), // Main pane
            Constraint::Percentage(35), // Side pane
        ])
        .split(vertical[2]);

    MainLayout {
        keybindings_area,
        header_area,
        main_area: horizontal[0],
        side_area: horizontal[1],
    }
}

/// Create a centered modal area
pub fn create_modal_area(area: Rect) -> Rect {
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(16),
            Constraint::Percentage(25),
        ])
        .split(area);

    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(vertical_chunks[1]);

    horizontal_chunks[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_layout() {
        let area = Rect::new(0, 0, 100, 50);
        let layout = create_layout(area);

        assert_eq!(layout.keybindings_area.height, 1);
        assert_eq!(layout.header_area.height, 3);
        assert!(layout.main_area.width > layout.side_area.width);
        assert!(layout.main_area.height > 0);
    }

    #[test]
    fn test_create_modal_area() {
        let area = Rect::new(0, 0, 100, 50);
        let modal = create_modal_area(area);

        assert!(modal.width < area.width);
        assert!(modal.height < area.height);
        assert_eq!(modal.height, 16);
    }
}
