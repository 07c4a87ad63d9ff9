//! Student records with delete, grade entry, edit and search.

use advisor_api::Student;
use crossterm::event::{KeyCode, KeyEvent};
use tracing::info;

use super::{clamp_cursor, Component, GradeForm, Notice, StudentForm};
use crate::remote::{failure_message, Remote};
use crate::task::{Delivery, MountId, Outgoing, Reply, Request, Requester, Slot};

/// A delete awaiting a yes/no answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDelete {
    pub id: String,
    pub name: String,
}

/// Form shown over the list.
pub enum Modal {
    Grade(GradeForm),
    Edit(StudentForm),
}

impl Modal {
    fn component(&mut self) -> &mut dyn Component {
        match self {
            Modal::Grade(form) => form,
            Modal::Edit(form) => form,
        }
    }

    fn mount_id(&self) -> MountId {
        match self {
            Modal::Grade(form) => form.mount_id(),
            Modal::Edit(form) => form.mount_id(),
        }
    }

    fn is_pending(&self) -> bool {
        match self {
            Modal::Grade(form) => form.phase.is_pending(),
            Modal::Edit(form) => form.phase.is_pending(),
        }
    }
}

pub struct StudentList {
    requester: Requester,
    pub students: Remote<Vec<Student>>,
    pub cursor: usize,
    pub notice: Option<Notice>,
    pub confirm: Option<ConfirmDelete>,
    pub modal: Option<Modal>,
    /// Search text while the search box is open.
    pub search: Option<String>,
    /// Query behind the displayed list. Empty for the full list.
    pub query: String,
    /// Ids deleted since the last list arrived. A list fetched before the
    /// delete landed may still carry them.
    deleted: Vec<String>,
}

impl Default for StudentList {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentList {
    pub fn new() -> Self {
        Self {
            requester: Requester::new(),
            students: Remote::Idle,
            cursor: 0,
            notice: None,
            confirm: None,
            modal: None,
            search: None,
            query: String::new(),
            deleted: Vec::new(),
        }
    }

    pub fn selected(&self) -> Option<&Student> {
        self.students.items().get(self.cursor)
    }

    pub fn deleting(&self) -> bool {
        self.requester.is_pending(Slot::Delete)
    }

    fn fetch(&mut self) -> Outgoing {
        let request = if self.query.is_empty() {
            Request::ListStudents
        } else {
            Request::SearchStudents(self.query.clone())
        };
        self.requester.issue(Slot::Students, request)
    }

    /// Fetch the list, showing the loading state.
    fn load(&mut self) -> Vec<Outgoing> {
        self.students = Remote::Pending;
        vec![self.fetch()]
    }

    /// Ask before deleting the selected student.
    pub fn request_delete(&mut self) {
        if self.deleting() {
            self.notice = Some(Notice::error("A delete is already in progress"));
            return;
        }
        self.confirm = self.selected().map(|s| ConfirmDelete {
            id: s.id.clone(),
            name: s.name.clone(),
        });
    }

    /// Answer the pending confirmation.
    pub fn confirm_delete(&mut self, yes: bool) -> Vec<Outgoing> {
        let Some(confirm) = self.confirm.take() else {
            return Vec::new();
        };
        if !yes || self.deleting() {
            return Vec::new();
        }
        info!(id = %confirm.id, "deleting student");
        vec![self
            .requester
            .issue(Slot::Delete, Request::DeleteStudent(confirm.id))]
    }

    pub fn open_grade_form(&mut self) {
        if let Some(student) = self.selected() {
            self.modal = Some(Modal::Grade(GradeForm::new(&student.id, &student.name)));
        }
    }

    pub fn open_edit_form(&mut self) {
        if let Some(student) = self.selected() {
            self.modal = Some(Modal::Edit(StudentForm::edit(student)));
        }
    }

    fn search_key(&mut self, key: KeyEvent) -> Vec<Outgoing> {
        let Some(text) = self.search.as_mut() else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Char(c) => text.push(c),
            KeyCode::Backspace => {
                text.pop();
            }
            KeyCode::Enter => {
                self.query = text.trim().to_string();
                self.search = None;
                self.cursor = 0;
                return self.load();
            }
            KeyCode::Esc => {
                self.search = None;
                self.cursor = 0;
                if !self.query.is_empty() {
                    self.query.clear();
                    return self.load();
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn modal_key(&mut self, key: KeyEvent) -> Vec<Outgoing> {
        let Some(modal) = self.modal.as_mut() else {
            return Vec::new();
        };
        if key.code == KeyCode::Esc && !modal.is_pending() {
            self.modal = None;
            return Vec::new();
        }
        modal.component().handle_key(key)
    }

    fn modal_delivery(&mut self, delivery: Delivery) -> Vec<Outgoing> {
        let Some(modal) = self.modal.as_mut() else {
            return Vec::new();
        };
        let mut out = modal.component().on_delivery(delivery);

        match modal {
            Modal::Grade(form) => {
                if form.saved() {
                    self.modal = None;
                    self.notice = Some(Notice::success("Grade added"));
                    // Refresh in the background; the current rows stay visible.
                    out.push(self.fetch());
                } else if let Some(message) = form.phase.error() {
                    self.notice = Some(Notice::error(message));
                }
            }
            Modal::Edit(form) => {
                if form.saved() {
                    let id = form.record_id().map(str::to_string);
                    self.modal = None;
                    self.notice = Some(Notice::success("Student updated"));
                    if let Some(id) = id {
                        out.push(self.requester.issue(Slot::Detail, Request::GetStudent(id)));
                    }
                } else if let Some(message) = form.phase.error() {
                    self.notice = Some(Notice::error(message));
                }
            }
        }
        out
    }
}

impl Component for StudentList {
    fn mount_id(&self) -> MountId {
        self.requester.mount()
    }

    fn owns(&self, mount: MountId) -> bool {
        mount == self.mount_id() || self.modal.as_ref().is_some_and(|m| m.mount_id() == mount)
    }

    fn mount(&mut self) -> Vec<Outgoing> {
        self.load()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Outgoing> {
        if self.confirm.is_some() {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.confirm_delete(true)
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_delete(false)
                }
                _ => Vec::new(),
            };
        }
        if self.modal.is_some() {
            return self.modal_key(key);
        }
        if self.search.is_some() {
            return self.search_key(key);
        }

        let len = self.students.items().len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = clamp_cursor(self.cursor + 1, len);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Char('d') | KeyCode::Delete => self.request_delete(),
            KeyCode::Char('g') => self.open_grade_form(),
            KeyCode::Char('e') => self.open_edit_form(),
            KeyCode::Char('/') => self.search = Some(self.query.clone()),
            KeyCode::Char('r') => {
                self.query.clear();
                self.cursor = 0;
                return self.load();
            }
            _ => {}
        }
        Vec::new()
    }

    fn on_delivery(&mut self, delivery: Delivery) -> Vec<Outgoing> {
        if delivery.ticket.mount != self.mount_id() {
            return self.modal_delivery(delivery);
        }
        if !self.requester.accept(&delivery.ticket) {
            return Vec::new();
        }

        match (delivery.ticket.slot, delivery.outcome) {
            (Slot::Students, outcome) => {
                let deleted = std::mem::take(&mut self.deleted);
                let outcome = outcome.and_then(|reply| match reply {
                    Reply::Students(mut students) => {
                        students.retain(|s| !deleted.contains(&s.id));
                        Ok(students)
                    }
                    other => Err(other.unexpected()),
                });
                self.students = Remote::settle(outcome, "Failed to load students");
                self.cursor = clamp_cursor(self.cursor, self.students.items().len());
            }
            (Slot::Delete, Ok(Reply::Deleted(id))) => {
                if let Some(students) = self.students.ready_mut() {
                    students.retain(|s| s.id != id);
                }
                self.deleted.push(id);
                self.cursor = clamp_cursor(self.cursor, self.students.items().len());
                self.notice = Some(Notice::success("Student deleted"));
            }
            (Slot::Delete, Err(e)) => {
                self.notice = Some(Notice::error(failure_message(
                    &e,
                    "Failed to delete student",
                )));
            }
            (Slot::Detail, Ok(Reply::Student(student))) => {
                if let Some(existing) = self
                    .students
                    .ready_mut()
                    .and_then(|list| list.iter_mut().find(|s| s.id == student.id))
                {
                    *existing = student;
                }
            }
            (Slot::Detail, Err(e)) => {
                self.notice = Some(Notice::error(failure_message(
                    &e,
                    "Failed to refresh student",
                )));
            }
            (slot, outcome) => tracing::debug!(?slot, ?outcome, "unexpected reply for student list"),
        }
        Vec::new()
    }

    fn hints(&self) -> &'static str {
        if self.confirm.is_some() {
            "y:delete n:cancel"
        } else if let Some(modal) = &self.modal {
            match modal {
                Modal::Grade(form) => form.hints(),
                Modal::Edit(form) => form.hints(),
            }
        } else if self.search.is_some() {
            "type query Enter:search Esc:clear"
        } else {
            "↑↓:move g:add grade e:edit d:delete /:search r:reload"
        }
    }
}
