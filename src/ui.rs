use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, ChatRole, FocusPane, InputMode};

const CHAT_PANE_WIDTH: u16 = 46;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    // Body: chat console on the left, report viewer on the right
    let [chat_area, report_area] =
        Layout::horizontal([Constraint::Length(CHAT_PANE_WIDTH), Constraint::Min(0)])
            .areas(body_area);

    let [messages_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(chat_area);

    render_messages(app, frame, messages_area);
    render_input(app, frame, input_area);
    render_report(app, frame, report_area);

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" TITAN ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("CONSOLE ", Style::default().fg(Color::White).bold()),
        Span::styled(
            format!("[{}] ", app.thread_id()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_messages(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Chat;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Conversation ");

    let inner = block.inner(area);
    app.chat_area = Some(inner);
    app.chat_height = inner.height;
    app.chat_width = inner.width;

    let mut lines: Vec<Line> = Vec::new();
    for msg in &app.messages {
        let label = match msg.role {
            ChatRole::User => Span::styled("You", Style::default().fg(Color::Blue).bold()),
            ChatRole::Assistant => Span::styled("TITAN", Style::default().fg(Color::Cyan).bold()),
        };
        lines.push(Line::from(label));
        for content_line in msg.content.lines() {
            lines.push(Line::from(content_line.to_string()));
        }
        lines.push(Line::default());
    }

    if app.loading {
        lines.push(Line::from(Span::styled(
            "TITAN",
            Style::default().fg(Color::Cyan).bold(),
        )));
        let dots = ".".repeat(app.animation_frame as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{dots}"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let messages = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(messages, area);
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Ask TITAN ");

    // Render the cursor as a reversed cell inside the input text
    let chars: Vec<char> = app.input.chars().collect();
    let spans: Vec<Span> = if editing {
        let cursor = app.cursor.min(chars.len());
        let before: String = chars[..cursor].iter().collect();
        let at_cursor = chars
            .get(cursor)
            .map(|c| c.to_string())
            .unwrap_or_else(|| " ".to_string());
        let after: String = chars.get(cursor + 1..).unwrap_or(&[]).iter().collect();
        vec![
            Span::raw(before),
            Span::styled(at_cursor, Style::default().add_modifier(Modifier::REVERSED)),
            Span::raw(after),
        ]
    } else if app.input.is_empty() {
        vec![Span::styled(
            "e.g. \"Analyze Apple's risks\"",
            Style::default().fg(Color::DarkGray),
        )]
    } else {
        vec![Span::raw(app.input.clone())]
    };

    let input = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(input, area);
}

fn render_report(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Report;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Report ");

    let inner = block.inner(area);
    app.report_area = Some(inner);
    app.report_height = inner.height;

    if app.report.is_none() {
        let placeholder = Text::from(vec![
            Line::default(),
            Line::from(Span::styled(
                "AWAITING ANALYSIS",
                Style::default().fg(Color::DarkGray).bold(),
            )),
            Line::default(),
            Line::from(Span::styled(
                "No report generated yet.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "When the agent generates a strategic report,",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "it will appear here automatically.",
                Style::default().fg(Color::DarkGray),
            )),
        ]);
        let empty = Paragraph::new(placeholder)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false });
        frame.render_widget(empty, area);
        return;
    }

    let lines: Vec<Line> = app
        .report_lines
        .iter()
        .map(|l| Line::from(l.clone()))
        .collect();

    let report = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.report_scroll, 0));

    frame.render_widget(report, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " VIEW ",
        InputMode::Editing => " INPUT ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" view ", label_style),
            Span::styled(" Ctrl-C ", key_style),
            Span::styled(" quit ", label_style),
        ],
        InputMode::Normal => vec![
            Span::styled(" Tab ", key_style),
            Span::styled(" focus ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" g/G ", key_style),
            Span::styled(" top/bottom ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" ask ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
