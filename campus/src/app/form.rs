use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

/// A set of fields making up a form. Implement with `form_fields!`.
pub trait Field: Copy + PartialEq + 'static {
    /// Every field, in tab order
    const FIELDS: &'static [Self];

    /// Where this field sits in `FIELDS`
    fn index(self) -> usize;

    /// What to call this field on screen
    fn label(self) -> &'static str;

    /// Should we hide what's typed (e.g. passwords)?
    fn masked(self) -> bool;

    /// Rotate through the options (e.g. with tab)
    fn next(self) -> Self {
        Self::FIELDS[(self.index() + 1) % Self::FIELDS.len()]
    }

    /// Rotate through the options in reverse (e.g. with shift-tab)
    fn prev(self) -> Self {
        Self::FIELDS[(self.index() + Self::FIELDS.len() - 1) % Self::FIELDS.len()]
    }
}

/// A popover form with one text input per field
#[derive(Debug)]
pub struct Form<F> {
    /// Shown in the border
    title: &'static str,

    /// Which field we're editing
    active: F,

    /// One input per field, in the same order as `F::FIELDS`
    inputs: Vec<Input>,
}

impl<F: Field> Form<F> {
    /// An empty form, editing the first field
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            active: F::FIELDS[0],
            inputs: F::FIELDS.iter().map(|_| Input::default()).collect(),
        }
    }

    /// Pre-fill a field
    #[must_use]
    pub fn with_value(mut self, field: F, value: &str) -> Self {
        self.inputs[field.index()] = Input::new(value.to_string());
        self
    }

    /// The current value of a field
    pub fn value(&self, field: F) -> &str {
        self.inputs[field.index()].value()
    }

    /// The current value of a field, or `None` if nothing was typed
    pub fn optional(&self, field: F) -> Option<String> {
        Some(self.value(field))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Move between fields or type into the active one.
    pub fn handle_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => {
                self.active = self.active.next();
            }
            KeyCode::BackTab => {
                self.active = self.active.prev();
            }
            _ => {
                self.inputs[self.active.index()].handle_event(&Event::Key(key));
            }
        }
    }

    /// Render the form centered in `body_area`. `subtitle` is added to the
    /// title, for things like captcha codes.
    #[expect(clippy::cast_possible_truncation)]
    pub fn render(&self, subtitle: Option<&str>, body_area: Rect, frame: &mut Frame<'_>) {
        let height = (F::FIELDS.len() * 3 + 2) as u16; // 3 rows per field, +2 for the border

        let popup_vert = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);
        let popup_horiz = Layout::horizontal([Constraint::Percentage(50)]).flex(Flex::Center);

        let [popup_area] = popup_vert.areas(body_area);
        let [popup_area] = popup_horiz.areas(popup_area);
        frame.render_widget(Clear, popup_area);

        let title = match subtitle {
            Some(subtitle) => format!("{} ({subtitle})", self.title),
            None => self.title.to_string(),
        };

        let outer = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Blue));
        let inner = outer.inner(popup_area);
        frame.render_widget(outer, popup_area);

        let width = inner.width.saturating_sub(2 + 1); // -2 for the border, -1 for the cursor

        let rows = Layout::vertical(F::FIELDS.iter().map(|_| Constraint::Length(3))).split(inner);

        for (field, area) in F::FIELDS.iter().zip(rows.iter()) {
            let input = &self.inputs[field.index()];
            let input_scroll = input.visual_scroll(width as usize);
            let is_active = *field == self.active;

            let shown = if field.masked() {
                "*".repeat(input.value().chars().count())
            } else {
                input.value().to_string()
            };

            let paragraph = Paragraph::new(shown)
                .scroll((0, input_scroll as u16))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(field.label())
                        .border_style(Style::default().fg(if is_active {
                            Color::Yellow
                        } else {
                            Color::Blue
                        })),
                );

            frame.render_widget(paragraph, *area);

            if is_active {
                frame.set_cursor_position((
                    area.x
                        + (input.visual_cursor().max(input_scroll) - input_scroll) as u16 // current end of text
                        + 1, // just past the end of the text
                    area.y + 1, // +1 row for the border/title
                ));
            }
        }
    }
}
