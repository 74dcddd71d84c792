use ratatui::Frame;
use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

/// A reusable UI component.
///
/// Components receive data via props (struct fields), may hold internal
/// state, and render to a `Frame` within a given `Rect`.
///
/// `render` takes `&mut self` so components can update presentation state
/// (list selection, scroll offsets) during the render pass, in line with
/// ratatui's `StatefulWidget` pattern.
pub trait Component {
    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that handles terminal events.
pub trait EventHandler {
    /// The type of high-level event this component emits.
    type Event;

    /// Handle a low-level `TuiEvent` and optionally return a high-level event.
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}

/// Column just past `text` when drawn from column `start`, clamped to the
/// terminal's coordinate range.
pub fn text_end_x(start: u16, text: &str) -> u16 {
    let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
    start.saturating_add(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_end_x() {
        assert_eq!(text_end_x(1, "abc"), 4);
        assert_eq!(text_end_x(0, "日本"), 4);
    }

    #[test]
    fn test_text_end_x_saturates_on_huge_text() {
        let pasted = "x".repeat(70_000);
        assert_eq!(text_end_x(10, &pasted), u16::MAX);
        assert_eq!(text_end_x(u16::MAX, "a"), u16::MAX);
    }
}
