mod forms;
mod lists;
mod reports;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
};

use crate::app::{App, HomeTab, Page, Screen};
use crate::components::{Notice, NoticeLevel};
use crate::remote::Remote;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_body(frame, app, chunks[1]);
    render_status(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(26)])
        .split(area);

    let titles: Vec<String> = Page::ALL
        .iter()
        .enumerate()
        .map(|(i, page)| format!("F{} {}", i + 1, page.title()))
        .collect();
    let selected = Page::ALL.iter().position(|p| *p == app.page).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Learning Advisor "),
        )
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[0]);

    let (dot, color, text) = match &app.health {
        Remote::Ready(status) if status.is_healthy() => {
            ("●", Color::Green, format!("online v{}", status.version))
        }
        Remote::Ready(status) => ("●", Color::Yellow, status.status.clone()),
        Remote::Failed(_) => ("○", Color::Red, "offline".to_string()),
        Remote::Pending | Remote::Idle => ("○", Color::DarkGray, "checking".to_string()),
    };
    let mut spans = vec![
        Span::styled(format!("{} ", dot), Style::default().fg(color)),
        Span::raw(text),
    ];
    if let Some(at) = app.health_checked {
        spans.push(Span::styled(
            format!(" {}", at.format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let health = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" Service "));
    frame.render_widget(health, chunks[1]);
}

fn render_body(frame: &mut Frame, app: &App, area: Rect) {
    let area = if app.page == Page::Home {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(5)])
            .split(area);

        let titles: Vec<String> = HomeTab::ALL
            .iter()
            .map(|tab| tab.title().to_string())
            .collect();
        let selected = HomeTab::ALL.iter().position(|t| *t == app.tab).unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, chunks[0]);
        chunks[1]
    } else {
        area
    };

    match &app.screen {
        Screen::Upload(view) => forms::render_upload(frame, view, area),
        Screen::NewStudent(view) => forms::render_student_form(frame, view, area),
        Screen::Advice(view) => reports::render_advice(frame, view, &app.config.display, area),
        Screen::Students(view) => lists::render_students(frame, view, area),
        Screen::Courses(view) => lists::render_courses(frame, view, area),
        Screen::Analysis(view) => reports::render_analysis(frame, view, area),
    }
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = Paragraph::new(app.status_text()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, area);
}

pub(crate) fn notice_line(notice: &Notice) -> Line<'static> {
    let (label, color) = match notice.level {
        NoticeLevel::Success => ("✓", Color::Green),
        NoticeLevel::Error => ("✗", Color::Red),
    };
    Line::from(vec![
        Span::styled(format!("{} ", label), Style::default().fg(color)),
        Span::styled(notice.text.clone(), Style::default().fg(color)),
        Span::styled(
            format!("  {}", notice.at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

/// Loading and failure placeholders for a fetched collection.
pub(crate) fn placeholder<T>(remote: &Remote<T>, what: &str) -> Option<Line<'static>> {
    match remote {
        Remote::Idle | Remote::Pending => Some(Line::styled(
            format!("Loading {}...", what),
            Style::default().fg(Color::DarkGray),
        )),
        Remote::Failed(message) => Some(Line::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )),
        Remote::Ready(_) => None,
    }
}

pub(crate) fn render_confirm(frame: &mut Frame, title: &str, message: &str) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", Style::default().fg(Color::Red)),
            Span::raw(" Yes  "),
            Span::styled("[n]", Style::default().fg(Color::Green)),
            Span::raw(" No"),
        ]),
    ];
    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title))
                .border_style(Style::default().fg(Color::Yellow)),
        );
    frame.render_widget(dialog, area);
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Config;
    use crate::task::Reply;
    use crate::testing::{key, ok, sample_students};
    use advisor_api::HealthStatus;
    use crossterm::event::KeyCode;
    use ratatui::backend::TestBackend;

    /// Draw the app and return the screen text. Wide glyphs occupy two cells,
    /// so callers compare CJK text with spaces removed.
    pub(crate) fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let mut text = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                if let Some(cell) = buffer.cell((x, y)) {
                    text.push_str(cell.symbol());
                }
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_header_and_status_bar() {
        let app = App::new(Config::default());
        let screen = draw(&app, 100, 30);
        assert!(screen.contains("F1 Home"));
        assert!(screen.contains("F4 Analysis"));
        assert!(screen.contains("Upload Course"));
        assert!(screen.contains("checking"));
        assert!(screen.contains("^C:quit"));
    }

    #[test]
    fn test_health_online() {
        let mut app = App::new(Config::default());
        app.tick(std::time::Instant::now());
        let sent = app.take_outbox();
        app.deliver(ok(
            &sent[0],
            Reply::Health(HealthStatus {
                status: "healthy".to_string(),
                version: "1.0.0".to_string(),
            }),
        ));
        let screen = draw(&app, 100, 30);
        assert!(screen.contains("online v1.0.0"));
    }

    #[test]
    fn test_delete_confirmation_dialog() {
        let mut app = App::new(Config::default());
        app.navigate(Page::Students);
        let sent = app.take_outbox();
        app.deliver(ok(&sent[0], Reply::Students(sample_students())));
        app.handle_key(key(KeyCode::Char('d')));

        let screen = draw(&app, 100, 30);
        assert!(screen.contains("Delete Student"));
        assert!(screen.contains("[y]"));
        assert!(screen.contains("y:delete n:cancel"));
    }
}
