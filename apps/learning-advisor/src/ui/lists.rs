use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, Wrap},
};

use advisor_api::models::format_number;

use super::forms::{course_lines, push_section, render_edit_modal, render_grade_modal};
use super::{notice_line, placeholder, render_confirm};
use crate::components::{CourseList, Modal, StudentList};

pub fn render_students(frame: &mut Frame, view: &StudentList, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(8),
            Constraint::Length(1),
        ])
        .split(area);

    let title = if view.query.is_empty() {
        format!(" Students ({}) ", view.students.items().len())
    } else {
        format!(
            " Students matching \"{}\" ({}) ",
            view.query,
            view.students.items().len()
        )
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if let Some(line) = placeholder(&view.students, "students") {
        frame.render_widget(Paragraph::new(line).block(block), chunks[0]);
    } else if view.students.items().is_empty() {
        frame.render_widget(
            Paragraph::new("No students yet. Add one from the Home page.").block(block),
            chunks[0],
        );
    } else {
        let header = Row::new(vec![
            "Name", "Student ID", "Major", "Year", "Email", "Courses", "Average",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD))
        .bottom_margin(1);

        let rows: Vec<Row> = view
            .students
            .items()
            .iter()
            .enumerate()
            .map(|(i, student)| {
                let style = if i == view.cursor {
                    Style::default().bg(Color::DarkGray)
                } else {
                    Style::default()
                };
                let average = student.average_score();
                let average_style = if student.grades.is_empty() {
                    Style::default().fg(Color::DarkGray)
                } else if average >= 80.0 {
                    Style::default().fg(Color::Green)
                } else if average >= 60.0 {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::Red)
                };
                Row::new(vec![
                    Cell::from(student.name.clone()),
                    Cell::from(student.student_id.clone()),
                    Cell::from(student.major.clone()),
                    Cell::from(student.grade.clone()),
                    Cell::from(student.email.clone()),
                    Cell::from(student.grades.len().to_string()),
                    Cell::from(format!("{:.2}", average)).style(average_style),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Min(16),
            Constraint::Length(11),
            Constraint::Length(22),
            Constraint::Length(8),
            Constraint::Length(8),
        ];
        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, chunks[0]);
    }

    render_grades(frame, view, chunks[1]);

    let footer = match (&view.search, &view.notice) {
        (Some(text), _) => Line::from(vec![
            Span::styled("/", Style::default().fg(Color::Yellow)),
            Span::raw(text.clone()),
            Span::raw("_"),
        ]),
        (None, Some(notice)) => notice_line(notice),
        (None, None) => Line::from(""),
    };
    frame.render_widget(Paragraph::new(footer), chunks[2]);

    if let Some(confirm) = &view.confirm {
        render_confirm(
            frame,
            "Delete Student",
            &format!("Delete {}? This cannot be undone.", confirm.name),
        );
    }
    match &view.modal {
        Some(Modal::Grade(form)) => render_grade_modal(frame, form),
        Some(Modal::Edit(form)) => render_edit_modal(frame, form),
        None => {}
    }
}

/// Grade records of the selected student.
fn render_grades(frame: &mut Frame, view: &StudentList, area: Rect) {
    let Some(student) = view.selected() else {
        frame.render_widget(
            Block::default().borders(Borders::ALL).title(" Grades "),
            area,
        );
        return;
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Grades: {} ", student.name));

    if student.grades.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::styled(
                "No grades recorded. Press g to add one.",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block),
            area,
        );
        return;
    }

    let header = Row::new(vec!["Course", "Score", "Semester", "Year"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = student
        .grades
        .iter()
        .map(|grade| {
            Row::new(vec![
                grade.course.clone(),
                format_number(grade.score),
                grade.semester.clone(),
                grade.year.clone(),
            ])
        })
        .collect();
    let widths = [
        Constraint::Min(16),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(6),
    ];
    frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
}

pub fn render_courses(frame: &mut Frame, view: &CourseList, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Courses ({}) ", view.courses.items().len()));

    if let Some(line) = placeholder(&view.courses, "courses") {
        frame.render_widget(Paragraph::new(line).block(block), chunks[0]);
    } else if view.courses.items().is_empty() {
        frame.render_widget(
            Paragraph::new("No courses yet. Upload a course description first.").block(block),
            chunks[0],
        );
    } else {
        let items: Vec<ListItem> = view
            .courses
            .items()
            .iter()
            .enumerate()
            .map(|(i, course)| {
                let expanded = view.expanded.as_deref() == Some(course.id.as_str());
                let marker = if expanded { "▼ " } else { "▶ " };
                let style = if i == view.cursor {
                    Style::default().bg(Color::DarkGray)
                } else {
                    Style::default()
                };
                ListItem::new(format!("{}{}", marker, course.option_label())).style(style)
            })
            .collect();
        frame.render_widget(List::new(items).block(block), chunks[0]);
    }

    let mut lines = match view.expanded_course() {
        Some(course) => {
            let mut lines = course_lines(course);
            push_section(&mut lines, "Topics", &course.topics);
            push_section(&mut lines, "Prerequisites", &course.prerequisites);
            push_section(&mut lines, "Assessment", &course.assessment);
            lines
        }
        None => vec![Line::styled(
            "Press Enter on a course to show its details",
            Style::default().fg(Color::DarkGray),
        )],
    };
    if let Some(notice) = &view.notice {
        lines.push(Line::from(""));
        lines.push(notice_line(notice));
    }
    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Details "));
    frame.render_widget(detail, chunks[1]);
}
