pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use heliotype::engine::Status;
use heliotype::settings::Mode;

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.engine.status() {
            Status::Loading => render_loading(area, buf),
            Status::Waiting | Status::Running => render_typing(self, area, buf),
            Status::Finished => render_results(self, area, buf),
        }
    }
}

fn render_loading(area: Rect, buf: &mut Buffer) {
    let message = Paragraph::new(Span::styled(
        "growing sunflowers...",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Percentage(45),
        ])
        .split(area);

    message.render(chunks[1], buf);
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let green_bold = bold.fg(Color::Green);
    let red_bold = bold.fg(Color::Red);
    let dim_bold = bold.add_modifier(Modifier::DIM);
    let cursor_style = dim_bold.add_modifier(Modifier::UNDERLINED);

    let engine = &app.engine;
    let target = engine.target();
    let input = engine.input();
    let prompt: String = target.iter().collect();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let mut prompt_occupied_lines =
        ((prompt.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16;
    if prompt.width() <= max_chars_per_line as usize {
        prompt_occupied_lines = 1;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(
                ((area.height as f64 - prompt_occupied_lines as f64) / 2.0) as u16,
            ),
            Constraint::Length(2),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Length(
                ((area.height as f64 - prompt_occupied_lines as f64) / 2.0) as u16,
            ),
        ])
        .split(area);

    // header: progress on the left, live speed on the right; the progress
    // figure flashes red for the frame after a mistyped character
    let progress = match engine.settings().mode {
        Mode::Time => format!("{}", engine.time_left()),
        Mode::Words => format!("{}/{}", engine.words_typed(), engine.settings().word_count),
    };
    let progress_style = if app.error_flash {
        bold.fg(Color::Red)
    } else {
        bold.fg(Color::Yellow)
    };
    let mute_marker = if engine.is_muted() { "  [muted]" } else { "" };
    let header = Line::from(vec![
        Span::styled(progress, progress_style),
        Span::styled(mute_marker, dim_bold),
        Span::raw("   "),
        Span::styled(format!("{} wpm", engine.stats().wpm), dim_bold),
    ]);
    Paragraph::new(header)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    // target text with per-character status; wrong positions show the
    // expected character in red, matching the mistake's location
    let mut spans: Vec<Span> = target
        .iter()
        .take(input.len())
        .enumerate()
        .map(|(idx, expected)| {
            if input[idx] == *expected {
                Span::styled(expected.to_string(), green_bold)
            } else {
                Span::styled(
                    match *expected {
                        ' ' => "·".to_owned(),
                        c => c.to_string(),
                    },
                    red_bold.add_modifier(Modifier::UNDERLINED),
                )
            }
        })
        .collect();

    if input.len() < target.len() {
        spans.push(Span::styled(
            target[input.len()].to_string(),
            cursor_style,
        ));
        let rest: String = target[input.len() + 1..].iter().collect();
        spans.push(Span::styled(rest, dim_bold));
    }

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let italic = Style::default().add_modifier(Modifier::ITALIC);

    let engine = &app.engine;
    let Some(result) = engine.result() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // headline stats
            Constraint::Length(1), // character split
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let (overall_duration, highest) = charting::compute_chart_params(&result.history);
    let (net, raw) = charting::series(&result.history);

    let datasets = vec![
        Dataset::default()
            .name("raw")
            .marker(ratatui::symbols::Marker::Braille)
            .style(Style::default().fg(Color::DarkGray))
            .graph_type(GraphType::Line)
            .data(&raw),
        Dataset::default()
            .name("wpm")
            .marker(ratatui::symbols::Marker::Braille)
            .style(Style::default().fg(Color::Yellow))
            .graph_type(GraphType::Line)
            .data(&net),
    ];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([1.0, overall_duration])
                .labels(vec![
                    Span::styled("1", bold),
                    Span::styled(charting::format_label(overall_duration), bold),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest])
                .labels(vec![
                    Span::styled("0", bold),
                    Span::styled(charting::format_label(highest), bold),
                ]),
        );

    chart.render(chunks[0], buf);

    let headline = Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {} raw",
            result.wpm, result.accuracy, result.raw_wpm
        ),
        bold,
    ))
    .alignment(Alignment::Center);
    headline.render(chunks[1], buf);

    let settings = engine.settings();
    let test_type = match settings.mode {
        Mode::Time => format!("time {}", settings.duration),
        Mode::Words => format!("words {}", settings.word_count),
    };
    let split = Paragraph::new(Span::styled(
        format!(
            "chars {}/{}/{}/{}   consistency --%   {}",
            result.correct_chars,
            result.incorrect_chars,
            result.missed_chars,
            result.extra_chars,
            test_type,
        ),
        Style::default().fg(Color::Gray),
    ))
    .alignment(Alignment::Center);
    split.render(chunks[2], buf);

    let legend = Paragraph::new(Span::styled(
        "(tab) next test / (t)ime (w)ords (d)uration (c)ount (p)unct (n)umbers (m)ute / (esc)ape",
        italic,
    ));
    legend.render(chunks[4], buf);
}
