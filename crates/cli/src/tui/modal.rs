//! Modal host: one centred popup at a time.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalData {
    pub title: String,
    pub body: Vec<String>,
    /// Button labels. Empty means a single "OK".
    pub buttons: Vec<String>,
}

impl ModalData {
    pub fn new(title: impl Into<String>, body: Vec<String>) -> Self {
        Self { title: title.into(), body, buttons: Vec::new() }
    }

    pub fn button_labels(&self) -> Vec<&str> {
        if self.buttons.is_empty() {
            vec!["OK"]
        } else {
            self.buttons.iter().map(String::as_str).collect()
        }
    }
}

/// Popup rectangle for `modal`, clamped to `area`.
pub fn popup_rect(modal: &ModalData, area: Rect) -> Rect {
    let body_width = modal.body.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = (body_width.max(modal.title.chars().count() + 4) + 4) as u16;
    // borders + blank + body + blank + buttons
    let height = modal.body.len() as u16 + 5;

    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

pub fn draw(frame: &mut Frame, area: Rect, modal: &ModalData) {
    let popup = popup_rect(modal, area);

    let mut lines: Vec<Line> = vec![Line::from("")];
    lines.extend(
        modal
            .body
            .iter()
            .map(|s| Line::from(Span::styled(format!(" {}", s), Style::default().fg(Color::White)))),
    );
    lines.push(Line::from(""));

    let mut buttons = Vec::new();
    for label in modal.button_labels() {
        buttons.push(Span::styled(
            format!(" {} ", label),
            Style::default().fg(Color::Black).bg(Color::Blue).add_modifier(Modifier::BOLD),
        ));
        buttons.push(Span::raw(" "));
    }
    lines.push(Line::from(buttons).alignment(Alignment::Right));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", modal.title))
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Black));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_button() {
        let modal = ModalData::new("Title", vec!["body".into()]);
        assert_eq!(modal.button_labels(), vec!["OK"]);
    }

    #[test]
    fn test_popup_centred_and_clamped() {
        let modal = ModalData::new("Keys", vec!["x".repeat(20), "y".into()]);
        let rect = popup_rect(&modal, Rect::new(0, 0, 80, 24));
        assert_eq!(rect.width, 24);
        assert_eq!(rect.height, 7);
        assert_eq!(rect.x, 28);

        let tiny = popup_rect(&modal, Rect::new(0, 0, 10, 4));
        assert_eq!((tiny.width, tiny.height), (10, 4));
    }
}
