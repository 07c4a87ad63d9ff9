use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
};

use advisor_api::models::{format_number, percent};
use advisor_api::{AdviceResponse, PerformanceAnalysis};

use super::placeholder;
use crate::components::{AdviceFocus, AdviceGenerator, PerformanceReport, Picker};
use crate::config::DisplayConfig;
use crate::remote::Remote;

fn selector<T>(
    frame: &mut Frame,
    title: &str,
    items: &Remote<Vec<T>>,
    options: Vec<String>,
    picker: Picker,
    focused: bool,
    area: Rect,
) {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {} ", title));

    if let Some(line) = placeholder(items, "options") {
        frame.render_widget(Paragraph::new(line).block(block), area);
        return;
    }

    let mut list_items = vec![ListItem::new("-- none --").style(
        if picker.selected.is_none() {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default().fg(Color::DarkGray)
        },
    )];
    list_items.extend(options.into_iter().enumerate().map(|(i, label)| {
        let style = if picker.selected == Some(i) {
            Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        ListItem::new(label).style(style)
    }));
    frame.render_widget(List::new(list_items).block(block), area);
}

pub fn render_advice(
    frame: &mut Frame,
    view: &AdviceGenerator,
    display: &DisplayConfig,
    area: Rect,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    let selectors = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[0]);

    selector(
        frame,
        "Student",
        &view.students,
        view.student_options(),
        view.student_picker,
        view.focus == AdviceFocus::Student,
        selectors[0],
    );
    selector(
        frame,
        "Course",
        &view.courses,
        view.course_options(),
        view.course_picker,
        view.focus == AdviceFocus::Course,
        selectors[1],
    );

    let lines = match &view.advice {
        Remote::Idle if view.can_generate() => vec![Line::styled(
            "Press Enter to generate advice",
            Style::default().fg(Color::Green),
        )],
        Remote::Idle => vec![Line::styled(
            "Select a student and a course",
            Style::default().fg(Color::DarkGray),
        )],
        Remote::Pending => vec![Line::styled(
            "Generating advice...",
            Style::default().fg(Color::Yellow),
        )],
        Remote::Failed(message) => vec![Line::styled(
            format!("✗ {}", message),
            Style::default().fg(Color::Red),
        )],
        Remote::Ready(advice) => advice_lines(advice, display),
    };

    let result = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Advice "));
    frame.render_widget(result, columns[1]);
}

fn advice_lines(response: &AdviceResponse, display: &DisplayConfig) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let result = &response.advice_result;

    let mut lines = vec![
        Line::styled(
            format!("{} · {}", response.student_name, response.course_name),
            bold.fg(Color::Cyan),
        ),
        Line::from(""),
    ];
    lines.extend(result.advice.lines().map(|l| Line::from(l.to_string())));

    let plan = result.plan();
    if !plan.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::styled("Study plan:", bold));
        for week in plan.iter().take(display.plan_weeks) {
            lines.push(Line::from(format!(
                "  Week {}: {} ({}h)",
                week.week,
                week.topic,
                format_number(week.estimated_hours)
            )));
            lines.extend(
                week.activities
                    .iter()
                    .take(display.plan_activities)
                    .map(|a| Line::from(format!("    - {}", a))),
            );
        }
    }

    let resources = result.resources();
    if !resources.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::styled("Resources:", bold));
        for resource in resources.iter().take(display.resources) {
            let mut spans = vec![
                Span::raw(format!("  [{}] ", resource.kind)),
                Span::raw(resource.title.clone()),
            ];
            if !resource.priority.is_empty() {
                spans.push(Span::styled(
                    format!(" ({})", resource.priority),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            lines.push(Line::from(spans));
            if !resource.description.is_empty() {
                lines.push(Line::from(format!("      {}", resource.description)));
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Difficulty: ", bold),
        Span::raw(result.difficulty_assessment.clone()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Estimated study time: ", bold),
        Span::raw(result.estimated_study_time.clone()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Success probability: ", bold),
        Span::raw(percent(result.success_probability)),
    ]));
    lines
}

pub fn render_analysis(frame: &mut Frame, view: &PerformanceReport, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    selector(
        frame,
        "Student",
        &view.students,
        view.student_options(),
        view.picker,
        true,
        columns[0],
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Performance ");
    match &view.report {
        Remote::Ready(report) => render_report(frame, report, block, columns[1]),
        other => {
            let line = match other {
                Remote::Pending => {
                    Line::styled("Analyzing...", Style::default().fg(Color::Yellow))
                }
                Remote::Failed(message) => {
                    Line::styled(format!("✗ {}", message), Style::default().fg(Color::Red))
                }
                _ => Line::styled(
                    "Select a student and press Enter",
                    Style::default().fg(Color::DarkGray),
                ),
            };
            frame.render_widget(Paragraph::new(line).block(block), columns[1]);
        }
    }
}

fn render_report(frame: &mut Frame, report: &PerformanceAnalysis, block: Block, area: Rect) {
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(3)])
        .split(inner);

    let level = report.level();
    let color = match level {
        advisor_api::PerformanceLevel::Excellent => Color::Green,
        advisor_api::PerformanceLevel::Good => Color::Cyan,
        advisor_api::PerformanceLevel::Fair => Color::Yellow,
        advisor_api::PerformanceLevel::NeedsImprovement => Color::Red,
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio((report.average_score.min(100.0) / 100.0).max(0.0))
        .label(format!(
            "{} {}",
            level.label(),
            format_number(report.average_score)
        ));
    frame.render_widget(gauge, chunks[0]);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Average score: ", bold),
            Span::raw(format_number(report.average_score)),
        ]),
        Line::from(vec![
            Span::styled("Total courses: ", bold),
            Span::raw(report.total_courses.to_string()),
        ]),
    ];
    if let Some(recent) = report.recent_average {
        lines.push(Line::from(vec![
            Span::styled("Recent average: ", bold),
            Span::raw(format_number(recent)),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("Trend: ", bold),
        Span::raw(report.performance_trend.label()),
    ]));
    if !report.recommendations.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::styled("Recommendations:", bold));
        lines.extend(
            report
                .recommendations
                .iter()
                .map(|r| Line::from(format!("  • {}", r))),
        );
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[2]);
}
