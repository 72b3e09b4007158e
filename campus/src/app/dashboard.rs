use campus_core::api::records::{self, Record};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
    Frame,
};

/// Where a user lands after logging in
#[derive(Debug, Default)]
pub struct Dashboard {
    /// The role stored by the last login, once we've read it
    pub role: Option<String>,

    /// Records visible to the role. `None` until loaded, or if the role has
    /// no records view.
    pub records: Option<Vec<Record>>,

    /// Are we waiting to hear back from the server?
    pub loading: bool,

    /// State of the records table
    table_state: TableState,
}

impl Dashboard {
    /// A dashboard that still has to load its data
    pub fn loading(role: Option<String>) -> Self {
        Self {
            role,
            records: None,
            loading: true,
            table_state: TableState::new().with_selected(0),
        }
    }

    /// Take the result of loading.
    pub fn loaded(&mut self, role: Option<String>, records: Option<Vec<Record>>) {
        self.role = role;
        self.records = records;
        self.loading = false;
    }

    /// Faculty get to add records.
    pub fn can_add_records(&self) -> bool {
        self.role.as_deref() == Some(records::FACULTY_ROLE)
    }

    /// Select the record below
    pub fn select_next(&mut self) {
        self.table_state.select_next();
    }

    /// Select the record above
    pub fn select_previous(&mut self) {
        self.table_state.select_previous();
    }

    /// Render the dashboard
    pub fn render(&mut self, frame: &mut Frame, body_area: Rect) {
        let vertical = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]);
        let [header_area, table_area] = vertical.areas(body_area);

        let header = Paragraph::new(match &self.role {
            Some(role) => format!("Logged in as {role}"),
            None => "Not logged in".to_string(),
        })
        .block(Block::default().borders(Borders::ALL).title("Dashboard"));

        frame.render_widget(header, header_area);

        match (&self.records, self.loading) {
            (_, true) => frame.render_widget(Paragraph::new("Loading…"), table_area),
            (None, false) => frame.render_widget(
                Paragraph::new("There are no records to show for this role."),
                table_area,
            ),
            (Some(records), false) if records.is_empty() => {
                frame.render_widget(Paragraph::new("No records yet."), table_area);
            }
            (Some(records), false) => {
                let rows: Vec<Row> = records
                    .iter()
                    .map(|record| {
                        Row::new(vec![
                            record.username.clone().unwrap_or_else(|| "you".to_string()),
                            record.semester.to_string(),
                            record.subject.clone(),
                            record.marks.to_string(),
                            format!("{}%", record.attendance),
                        ])
                    })
                    .collect();

                let table = Table::new(
                    rows,
                    [
                        Constraint::Min(12),
                        Constraint::Length(8),
                        Constraint::Min(16),
                        Constraint::Length(5),
                        Constraint::Length(10),
                    ],
                )
                .header(
                    Row::new(["Student", "Semester", "Subject", "Marks", "Attendance"])
                        .bg(Color::DarkGray)
                        .fg(Color::White),
                )
                .column_spacing(2)
                .highlight_symbol("● ")
                .row_highlight_style(Style::new().add_modifier(Modifier::BOLD));

                frame.render_stateful_widget(table, table_area, &mut self.table_state);
            }
        }
    }
}
