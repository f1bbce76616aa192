pub mod charting;
pub mod data_table;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, BarChart, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
    Frame,
};

use crate::analysis::{AnalysisSummary, Performance, Trend};
use crate::app::App;
use crate::charts::ChartData;
use crate::ui::charting::{format_label, line_bounds, scatter_bounds};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

pub const LEGEND: &str =
    "(1) 7 days (2) 2 weeks (3) 1 month (4) 3 months / (p)erson / (d)ata / (r)efresh / (esc)ape";

/// Draw whichever screen matches the app state
pub fn draw(app: &mut App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);
}

fn performance_color(p: Performance) -> Color {
    match p {
        Performance::Good => Color::Green,
        Performance::Average => Color::Yellow,
        Performance::NeedsImprovement => Color::Red,
    }
}

fn trend_color(t: Trend) -> Color {
    match t {
        Trend::Improving => Color::Green,
        Trend::Stable => Color::Gray,
        Trend::Declining => Color::Red,
    }
}

pub fn summary_lines(summary: &AnalysisSummary) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let field = |name: &'static str, value: String, style: Style| {
        Line::from(vec![Span::styled(name, bold), Span::styled(value, style)])
    };

    vec![
        field(
            "Overall Performance: ",
            summary.overall_performance.to_string(),
            Style::default().fg(performance_color(summary.overall_performance)),
        ),
        field("Best Subject: ", summary.best_subject.clone(), Style::default()),
        field("Worst Subject: ", summary.worst_subject.clone(), Style::default()),
        field(
            "Performance Trend: ",
            summary.trend.to_string(),
            Style::default().fg(trend_color(summary.trend)),
        ),
        field(
            "Recommendation: ",
            summary.recommendation.clone(),
            Style::default().add_modifier(Modifier::ITALIC),
        ),
    ]
}

fn render_line_chart(charts: &ChartData, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let points = charts.line_points();
    let (x_bounds, y_bounds) = line_bounds(&points);

    let dates = charts.dates();
    let first_date = dates.first().copied().unwrap_or_default().to_string();
    let last_date = dates.last().copied().unwrap_or_default().to_string();

    let datasets = vec![Dataset::default()
        .name("correct")
        .marker(Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&points)];

    Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Correct Answers Over Time"),
        )
        .x_axis(
            Axis::default()
                .bounds(x_bounds)
                .labels(vec![
                    Span::styled(first_date, bold_style),
                    Span::styled(last_date, bold_style),
                ]),
        )
        .y_axis(Axis::default().bounds(y_bounds).labels(vec![
            Span::styled("0", bold_style),
            Span::styled(format_label(y_bounds[1]), bold_style),
        ]))
        .render(area, buf);
}

fn render_subject_bars(charts: &ChartData, area: Rect, buf: &mut Buffer) {
    let bars: Vec<(&str, u64)> = charts
        .by_subject
        .iter()
        .map(|(subject, correct)| (subject.as_str(), *correct))
        .collect();

    let inner_width = area.width.saturating_sub(2);
    let per_bar = inner_width / (bars.len() as u16).max(1);
    let bar_width = per_bar.saturating_sub(1).clamp(1, 12);

    BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Performance by Subject"),
        )
        .data(bars.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Blue))
        .value_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .render(area, buf);
}

fn render_scatter(charts: &ChartData, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let (x_bounds, y_bounds) = scatter_bounds(&charts.attempted_vs_correct);

    let datasets = vec![Dataset::default()
        .name("attempted vs correct")
        .marker(Marker::Dot)
        .style(Style::default().fg(Color::Red))
        .graph_type(GraphType::Scatter)
        .data(&charts.attempted_vs_correct)];

    Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Attempted vs Correct"),
        )
        .x_axis(Axis::default().title("attempted").bounds(x_bounds).labels(vec![
            Span::styled("0", bold_style),
            Span::styled(format_label(x_bounds[1]), bold_style),
        ]))
        .y_axis(Axis::default().title("correct").bounds(y_bounds).labels(vec![
            Span::styled("0", bold_style),
            Span::styled(format_label(y_bounds[1]), bold_style),
        ]))
        .render(area, buf);
}

/// Each subject's share of correct answers, one row per subject
pub fn distribution_lines(charts: &ChartData) -> Vec<Line<'static>> {
    let width = charts
        .distribution
        .iter()
        .map(|(subject, _)| subject.chars().count())
        .max()
        .unwrap_or(0);
    charts
        .distribution
        .iter()
        .map(|(subject, share)| {
            Line::from(vec![
                Span::raw(format!("{subject:<width$}  ")),
                Span::styled(
                    format!("{share:>5.1}%"),
                    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect()
}

fn render_distribution(charts: &ChartData, area: Rect, buf: &mut Buffer) {
    Paragraph::new(distribution_lines(charts))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Distribution by Subject"),
        )
        .render(area, buf);
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dashboard = &self.dashboard;
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // filter header
                Constraint::Length(7), // conclusion
                Constraint::Min(6),    // line + bar charts
                Constraint::Min(6),    // scatter
                Constraint::Length(1), // status
                Constraint::Length(1), // legend
            ])
            .split(area);

        let header = format!(
            "Time range: {}   Person: {}   Records: {}",
            dashboard.filter.range.label(),
            dashboard.filter.person.as_deref().unwrap_or("all"),
            dashboard.records.len()
        );
        Paragraph::new(Span::styled(
            header,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let conclusion_block = Block::default()
            .borders(Borders::ALL)
            .title("Expert System Conclusion");
        match &dashboard.summary {
            Some(summary) => Paragraph::new(summary_lines(summary)).block(conclusion_block),
            None => Paragraph::new(Span::styled(
                "No attempts in this time range.",
                Style::default().fg(Color::Gray),
            ))
            .alignment(Alignment::Center)
            .block(conclusion_block),
        }
        .render(chunks[1], buf);

        if dashboard.charts.is_empty() {
            Paragraph::new(Span::styled("Nothing to chart yet.", italic_style))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Charts"))
                .render(chunks[2], buf);
        } else {
            let top = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(chunks[2]);
            render_line_chart(&dashboard.charts, top[0], buf);
            render_subject_bars(&dashboard.charts, top[1], buf);
            let bottom = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[3]);
            render_scatter(&dashboard.charts, bottom[0], buf);
            render_distribution(&dashboard.charts, bottom[1], buf);
        }

        if let Some(status) = &self.status {
            Paragraph::new(Span::styled(status.clone(), Style::default().fg(Color::Red)))
                .alignment(Alignment::Center)
                .render(chunks[4], buf);
        }

        Paragraph::new(Span::styled(LEGEND, italic_style)).render(chunks[5], buf);
    }
}
