use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use advisor_api::Course;

use super::centered_rect;
use crate::components::{GradeForm, StudentForm, UploadForm};
use crate::form::{Field, Form};
use crate::remote::Remote;

pub fn render_student_form(frame: &mut Frame, view: &StudentForm, area: Rect) {
    render_form(frame, &view.form, view.title(), &view.phase, area);
}

/// Grade entry drawn over the student list.
pub fn render_grade_modal(frame: &mut Frame, view: &GradeForm) {
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);
    let title = format!(" Add Grade: {} ", view.student_name);
    render_form(frame, &view.form, &title, &view.phase, area);
}

pub fn render_edit_modal(frame: &mut Frame, view: &StudentForm) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);
    render_form(frame, &view.form, view.title(), &view.phase, area);
}

fn render_form(frame: &mut Frame, form: &Form, title: &str, phase: &Remote<String>, area: Rect) {
    let mut lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| field_line(field, i == form.focus))
        .collect();

    lines.push(Line::from(""));
    lines.push(phase_line(phase));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(paragraph, area);
}

fn field_line(field: &Field, focused: bool) -> Line<'static> {
    let marker = if focused { "▶ " } else { "  " };
    let label = format!(
        "{}{}{}: ",
        marker,
        field.label,
        if field.required { "*" } else { "" }
    );
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let value = if field.value.is_empty() {
        Span::styled(
            field.placeholder.to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(field.value.clone())
    };

    let mut spans = vec![Span::styled(label, label_style)];
    if field.is_choice() {
        spans.push(Span::raw("◀ "));
        spans.push(if field.value.is_empty() {
            Span::styled("(none)", Style::default().fg(Color::DarkGray))
        } else {
            value
        });
        spans.push(Span::raw(" ▶"));
    } else {
        spans.push(value);
        if focused {
            spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
        }
    }
    Line::from(spans)
}

fn phase_line(phase: &Remote<String>) -> Line<'static> {
    match phase {
        Remote::Idle => Line::from(""),
        Remote::Pending => Line::styled("Submitting...", Style::default().fg(Color::Yellow)),
        Remote::Ready(message) => {
            Line::styled(format!("✓ {}", message), Style::default().fg(Color::Green))
        }
        Remote::Failed(message) => {
            Line::styled(format!("✗ {}", message), Style::default().fg(Color::Red))
        }
    }
}

pub fn render_upload(frame: &mut Frame, view: &UploadForm, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(area);

    let mut lines = vec![Line::from(vec![
        Span::styled("File: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(view.path.clone()),
        Span::raw("_"),
    ])];
    match (&view.selected, &view.selection_error) {
        (_, Some(error)) => lines.push(Line::styled(
            format!("✗ {}", error),
            Style::default().fg(Color::Red),
        )),
        (Some(document), None) => lines.push(Line::styled(
            format!("Selected {} ({})", document.file_name, document.size_display()),
            Style::default().fg(Color::Green),
        )),
        (None, None) => lines.push(Line::styled(
            "Type the path of a PDF course description and press Enter",
            Style::default().fg(Color::DarkGray),
        )),
    }
    lines.push(match &view.upload {
        Remote::Idle => Line::from(""),
        Remote::Pending => Line::styled("Uploading...", Style::default().fg(Color::Yellow)),
        Remote::Ready(result) => Line::styled(
            format!("✓ {}", result.message),
            Style::default().fg(Color::Green),
        ),
        Remote::Failed(message) => {
            Line::styled(format!("✗ {}", message), Style::default().fg(Color::Red))
        }
    });

    let input = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Upload Course Description "),
    );
    frame.render_widget(input, chunks[0]);

    // Result area: the uploaded course, else the parsed text, else the raw text.
    let (title, body) = if let Some(result) = view.upload.ready() {
        (" Parsed Course ", course_lines(&result.course_info))
    } else if let Some(course) = view.parsed.ready() {
        (" Parsed Text ", course_lines(course))
    } else {
        match (&view.parsed, &view.extracted) {
            (Remote::Pending, _) => (" Parsed Text ", vec![Line::from("Parsing...")]),
            (Remote::Failed(message), _) => (" Parsed Text ", vec![error_line(message)]),
            (_, Remote::Pending) => (" Extracted Text ", vec![Line::from("Extracting...")]),
            (_, Remote::Failed(message)) => (" Extracted Text ", vec![error_line(message)]),
            (_, Remote::Ready(text)) => (
                " Extracted Text ",
                text.text.lines().map(|l| Line::from(l.to_string())).collect(),
            ),
            _ => (" Result ", Vec::new()),
        }
    };
    let result = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(result, chunks[1]);
}

fn error_line(message: &str) -> Line<'static> {
    Line::styled(format!("✗ {}", message), Style::default().fg(Color::Red))
}

pub(crate) fn course_lines(course: &Course) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(vec![Span::styled("Code: ", bold), Span::raw(course.course_code.clone())]),
        Line::from(vec![Span::styled("Name: ", bold), Span::raw(course.course_name.clone())]),
    ];
    if !course.description.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Description: ", bold),
            Span::raw(course.description.clone()),
        ]));
    }
    push_section(&mut lines, "Objectives", &course.objectives);
    lines
}

/// Heading plus bullets, skipped entirely when empty.
pub(crate) fn push_section(lines: &mut Vec<Line<'static>>, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(Line::styled(
        format!("{}:", heading),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    lines.extend(items.iter().map(|item| Line::from(format!("  • {}", item))));
}
