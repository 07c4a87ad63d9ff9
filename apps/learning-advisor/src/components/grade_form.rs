//! Grade entry for one student.

use advisor_api::{Grade, Semester};
use crossterm::event::KeyEvent;

use super::Component;
use crate::form::{Field, Form, FormInput};
use crate::remote::{failure_message, Remote};
use crate::task::{Delivery, MountId, Outgoing, Reply, Request, Requester, Slot};

pub struct GradeForm {
    requester: Requester,
    /// Record identity of the student receiving the grade.
    pub student_id: String,
    pub student_name: String,
    pub form: Form,
    pub phase: Remote<String>,
}

impl GradeForm {
    pub fn new(student_id: impl Into<String>, student_name: impl Into<String>) -> Self {
        let semesters: Vec<&str> = Semester::ALL.iter().map(Semester::as_str).collect();
        Self {
            requester: Requester::new(),
            student_id: student_id.into(),
            student_name: student_name.into(),
            form: Form::new(vec![
                Field::text("course", "Course")
                    .required()
                    .placeholder("Course name or code"),
                Field::number("score", "Score", 0.0, 100.0)
                    .required()
                    .placeholder("0-100"),
                Field::choice("semester", "Semester", &semesters),
                Field::year("year", "Year", 2020.0, 2030.0).placeholder("e.g. 2024"),
            ]),
            phase: Remote::Idle,
        }
    }

    pub fn saved(&self) -> bool {
        matches!(self.phase, Remote::Ready(_))
    }

    /// The validated draft as a grade. Score text becomes a number here.
    pub fn grade(&self) -> Result<Grade, String> {
        self.form.validate()?;
        let score = self
            .form
            .value("score")
            .parse::<f64>()
            .map_err(|_| "Score must be a number".to_string())?;
        Ok(Grade {
            course: self.form.value("course").to_string(),
            score,
            semester: self.form.value("semester").to_string(),
            year: self.form.value("year").to_string(),
        })
    }

    pub fn submit(&mut self) -> Vec<Outgoing> {
        if self.phase.is_pending() {
            return Vec::new();
        }
        match self.grade() {
            Ok(grade) => {
                self.phase = Remote::Pending;
                vec![self.requester.issue(
                    Slot::Submit,
                    Request::AddGrade {
                        id: self.student_id.clone(),
                        grade,
                    },
                )]
            }
            Err(message) => {
                self.phase = Remote::Failed(message);
                Vec::new()
            }
        }
    }
}

impl Component for GradeForm {
    fn mount_id(&self) -> MountId {
        self.requester.mount()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Outgoing> {
        match self.form.handle_key(key) {
            FormInput::Submit => self.submit(),
            FormInput::Edited if !self.phase.is_pending() => {
                self.phase = Remote::Idle;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn on_delivery(&mut self, delivery: Delivery) -> Vec<Outgoing> {
        if !self.requester.accept(&delivery.ticket) {
            return Vec::new();
        }
        match delivery.outcome {
            Ok(Reply::GradeAdded) => {
                tracing::info!(student = %self.student_id, "grade added");
                self.phase = Remote::Ready("Grade added".to_string());
                self.form.reset();
            }
            Ok(other) => tracing::debug!(?other, "unexpected reply for grade form"),
            Err(e) => self.phase = Remote::Failed(failure_message(&e, "Failed to add grade")),
        }
        Vec::new()
    }

    fn hints(&self) -> &'static str {
        "Tab/↑↓:field ←→:semester Enter:add Esc:close"
    }
}
