//! Student creation and edit form.

use advisor_api::models::ACADEMIC_YEARS;
use advisor_api::{Student, StudentFields};
use crossterm::event::KeyEvent;

use super::Component;
use crate::form::{Field, Form, FormInput};
use crate::remote::{failure_message, Remote};
use crate::task::{Delivery, MountId, Outgoing, Reply, Request, Requester, Slot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Editing the record with this identity.
    Edit { id: String },
}

pub struct StudentForm {
    requester: Requester,
    pub mode: FormMode,
    pub form: Form,
    /// Submission phase. `Ready` holds the success message.
    pub phase: Remote<String>,
}

impl Default for StudentForm {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentForm {
    pub fn new() -> Self {
        Self {
            requester: Requester::new(),
            mode: FormMode::Create,
            form: Form::new(fields()),
            phase: Remote::Idle,
        }
    }

    /// A form pre-filled from an existing record.
    pub fn edit(student: &Student) -> Self {
        let mut form = Form::new(fields());
        let current = student.fields();
        form.set("name", current.name);
        form.set("student_id", current.student_id);
        form.set("major", current.major);
        form.set("grade", current.grade);
        form.set("email", current.email);
        form.set("phone", current.phone);

        Self {
            requester: Requester::new(),
            mode: FormMode::Edit {
                id: student.id.clone(),
            },
            form,
            phase: Remote::Idle,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => " Add Student ",
            FormMode::Edit { .. } => " Edit Student ",
        }
    }

    /// Identity of the record being edited.
    pub fn record_id(&self) -> Option<&str> {
        match &self.mode {
            FormMode::Edit { id } => Some(id),
            FormMode::Create => None,
        }
    }

    /// Whether the last submission succeeded.
    pub fn saved(&self) -> bool {
        matches!(self.phase, Remote::Ready(_))
    }

    pub fn draft(&self) -> StudentFields {
        StudentFields {
            name: self.form.value("name").to_string(),
            student_id: self.form.value("student_id").to_string(),
            major: self.form.value("major").to_string(),
            grade: self.form.value("grade").to_string(),
            email: self.form.value("email").to_string(),
            phone: self.form.value("phone").to_string(),
        }
    }

    pub fn submit(&mut self) -> Vec<Outgoing> {
        if self.phase.is_pending() {
            return Vec::new();
        }
        if let Err(message) = self.form.validate() {
            self.phase = Remote::Failed(message);
            return Vec::new();
        }

        let fields = self.draft();
        let request = match &self.mode {
            FormMode::Create => Request::CreateStudent(fields),
            FormMode::Edit { id } => Request::UpdateStudent {
                id: id.clone(),
                fields,
            },
        };
        self.phase = Remote::Pending;
        vec![self.requester.issue(Slot::Submit, request)]
    }
}

fn fields() -> Vec<Field> {
    vec![
        Field::text("name", "Name")
            .required()
            .placeholder("Student's full name"),
        Field::text("student_id", "Student ID")
            .required()
            .placeholder("e.g. 2021001"),
        Field::text("major", "Major")
            .required()
            .placeholder("Major or programme"),
        Field::choice("grade", "Year", ACADEMIC_YEARS),
        Field::email("email", "Email").placeholder("name@example.com"),
        Field::text("phone", "Phone"),
    ]
}

impl Component for StudentForm {
    fn mount_id(&self) -> MountId {
        self.requester.mount()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Outgoing> {
        match self.form.handle_key(key) {
            FormInput::Submit => self.submit(),
            FormInput::Edited => {
                if !self.phase.is_pending() {
                    self.phase = Remote::Idle;
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn on_delivery(&mut self, delivery: Delivery) -> Vec<Outgoing> {
        if !self.requester.accept(&delivery.ticket) {
            return Vec::new();
        }

        match (&self.mode, delivery.outcome) {
            (FormMode::Create, Ok(Reply::Created(created))) => {
                tracing::info!(id = %created.student_id, "student created");
                self.phase = Remote::Ready("Student created".to_string());
                self.form.reset();
            }
            (FormMode::Edit { .. }, Ok(Reply::Updated)) => {
                self.phase = Remote::Ready("Student updated".to_string());
            }
            (FormMode::Create, Err(e)) => {
                self.phase = Remote::Failed(failure_message(
                    &e,
                    "Failed to create student, please try again",
                ));
            }
            (FormMode::Edit { .. }, Err(e)) => {
                self.phase = Remote::Failed(failure_message(&e, "Failed to update student"));
            }
            (_, Ok(other)) => {
                tracing::debug!(?other, "unexpected reply for student form");
            }
        }
        Vec::new()
    }

    fn hints(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Tab/↑↓:field ←→:choose Enter:create",
            FormMode::Edit { .. } => "Tab/↑↓:field ←→:choose Enter:save Esc:cancel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{failed, key, ok, type_text};
    use advisor_api::CreatedStudent;
    use crossterm::event::KeyCode;

    fn fill(form: &mut StudentForm) {
        for (i, text) in ["张三", "2021001", "Computer Science"].iter().enumerate() {
            form.form.focus = i;
            for k in type_text(text) {
                form.handle_key(k);
            }
        }
    }

    #[test]
    fn test_missing_required_fields_send_nothing() {
        let mut form = StudentForm::new();
        for k in type_text("张三") {
            form.handle_key(k);
        }
        let sent = form.handle_key(key(KeyCode::Enter));
        assert!(sent.is_empty());
        assert_eq!(form.phase.error(), Some("Student ID is required"));
        assert_eq!(form.form.value("name"), "张三");
    }

    #[test]
    fn test_successful_create_resets_draft() {
        let mut form = StudentForm::new();
        fill(&mut form);
        let sent = form.handle_key(key(KeyCode::Enter));
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].request,
            Request::CreateStudent(StudentFields {
                name: "张三".to_string(),
                student_id: "2021001".to_string(),
                major: "Computer Science".to_string(),
                ..StudentFields::default()
            })
        );
        assert!(form.phase.is_pending());

        // A second Enter while submitting does nothing.
        assert!(form.handle_key(key(KeyCode::Enter)).is_empty());

        form.on_delivery(ok(
            &sent[0],
            Reply::Created(CreatedStudent {
                message: "学生创建成功".to_string(),
                student_id: "65f0".to_string(),
            }),
        ));
        assert_eq!(form.phase, Remote::Ready("Student created".to_string()));
        assert!(form.form.is_blank());
    }

    #[test]
    fn test_failed_create_keeps_draft_and_shows_server_text() {
        let mut form = StudentForm::new();
        fill(&mut form);
        let sent = form.submit();
        form.on_delivery(failed(&sent[0], 400, Some("学号已存在")));

        assert_eq!(form.phase.error(), Some("学号已存在"));
        assert_eq!(form.form.value("student_id"), "2021001");
        assert_eq!(form.form.value("major"), "Computer Science");
    }

    #[test]
    fn test_failed_create_without_message_uses_fallback() {
        let mut form = StudentForm::new();
        fill(&mut form);
        let sent = form.submit();
        form.on_delivery(failed(&sent[0], 500, None));
        assert_eq!(
            form.phase.error(),
            Some("Failed to create student, please try again")
        );
    }

    #[test]
    fn test_edit_sends_update() {
        let student = crate::testing::sample_students().remove(0);
        let mut form = StudentForm::edit(&student);
        assert_eq!(form.form.value("name"), "张三");

        form.form.focus = 2;
        for k in type_text(" II") {
            form.handle_key(k);
        }
        let sent = form.submit();
        match &sent[0].request {
            Request::UpdateStudent { id, fields } => {
                assert_eq!(id, "s1");
                assert_eq!(fields.major, "Computer Science II");
            }
            other => panic!("unexpected request {:?}", other),
        }

        form.on_delivery(ok(&sent[0], Reply::Updated));
        assert!(form.saved());
        // Edits keep the values on screen.
        assert_eq!(form.form.value("name"), "张三");
    }
}
