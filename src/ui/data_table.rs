use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::App;
use crate::record::AttemptRecord;
use crate::scoring::{LabelTier, ScoreLabel};

const DATA_LEGEND: &str =
    "(↑/↓) scroll  (PgUp/PgDn) page  (Home) top  (d) dashboard  (r)efresh  (esc)ape";

pub fn label_color(label: ScoreLabel) -> Color {
    match label.tier() {
        LabelTier::Excellent => Color::Green,
        LabelTier::Good => Color::Cyan,
        LabelTier::Fair => Color::Yellow,
        LabelTier::Poor => Color::Red,
    }
}

/// `attempted / total (xx.xx%)`
pub fn count_cell(count: u32, total: u32, percent: f64) -> String {
    format!("{count} / {total} ({percent:.2}%)")
}

/// Pure presenter for a single attempt row
pub fn present_row(record: &AttemptRecord) -> Row<'static> {
    Row::new(vec![
        Cell::from(record.date.to_string()),
        Cell::from(record.person.clone()),
        Cell::from(record.subject.clone()),
        Cell::from(count_cell(
            record.attempted,
            record.total_questions,
            record.attempted_percent,
        )),
        Cell::from(count_cell(
            record.correct,
            record.total_questions,
            record.correct_percent,
        )),
        Cell::from(record.score_label.to_string()).style(
            Style::default()
                .fg(label_color(record.score_label))
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

/// Render every stored attempt, newest first
pub fn render_data_table(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Table
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let title = Paragraph::new("Data Progress")
        .block(Block::default().borders(Borders::ALL).title("growlog"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    if app.rows.is_empty() {
        let no_data = Paragraph::new("No attempts recorded yet. Add one with `growlog add`.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(no_data, chunks[1]);
    } else {
        let table_height = chunks[1].height.saturating_sub(3) as usize; // borders + header
        let total_rows = app.rows.len();
        let max_scroll = total_rows.saturating_sub(table_height);
        if app.data_state.scroll_offset > max_scroll {
            app.data_state.scroll_offset = max_scroll;
        }

        let header = Row::new(vec![
            Cell::from("Date"),
            Cell::from("Person"),
            Cell::from("Subject"),
            Cell::from("Attempted"),
            Cell::from("Correct"),
            Cell::from("Label"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let visible_rows: Vec<Row> = app
            .rows
            .iter()
            .skip(app.data_state.scroll_offset)
            .take(table_height)
            .map(present_row)
            .collect();

        let scroll_info = if total_rows > table_height {
            format!(
                " ({}/{} rows)",
                app.data_state.scroll_offset + visible_rows.len(),
                total_rows
            )
        } else {
            String::new()
        };

        let widths = [
            Constraint::Length(10), // Date
            Constraint::Min(8),     // Person
            Constraint::Min(8),     // Subject
            Constraint::Length(22), // Attempted
            Constraint::Length(22), // Correct
            Constraint::Length(5),  // Label
        ];

        let table = Table::new(visible_rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Attempts{scroll_info}")),
            )
            .column_spacing(2);

        f.render_widget(table, chunks[1]);
    }

    let instructions = Paragraph::new(DATA_LEGEND)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(instructions, chunks[2]);
}
