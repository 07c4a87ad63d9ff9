use advisor_api::{PerformanceAnalysis, Student};
use crossterm::event::{KeyCode, KeyEvent};

use super::{Component, Picker};
use crate::remote::Remote;
use crate::task::{Delivery, MountId, Outgoing, Reply, Request, Requester, Slot};

/// Performance analysis for one selected student.
pub struct PerformanceReport {
    requester: Requester,
    pub students: Remote<Vec<Student>>,
    pub picker: Picker,
    pub report: Remote<PerformanceAnalysis>,
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceReport {
    pub fn new() -> Self {
        Self {
            requester: Requester::new(),
            students: Remote::Idle,
            picker: Picker::default(),
            report: Remote::Idle,
        }
    }

    pub fn selected_student(&self) -> Option<&Student> {
        self.picker.pick(self.students.items())
    }

    pub fn student_options(&self) -> Vec<String> {
        self.students.items().iter().map(Student::option_label).collect()
    }

    fn load(&mut self) -> Vec<Outgoing> {
        self.students = Remote::Pending;
        self.picker.clear();
        vec![self.requester.issue(Slot::Students, Request::ListStudents)]
    }

    pub fn analyze(&mut self) -> Vec<Outgoing> {
        if self.report.is_pending() {
            return Vec::new();
        }
        let Some(id) = self.selected_student().map(|s| s.id.clone()) else {
            self.report = Remote::Failed("Please select a student".to_string());
            return Vec::new();
        };
        self.report = Remote::Pending;
        vec![self
            .requester
            .issue(Slot::Report, Request::AnalyzePerformance(id))]
    }
}

impl Component for PerformanceReport {
    fn mount_id(&self) -> MountId {
        self.requester.mount()
    }

    fn mount(&mut self) -> Vec<Outgoing> {
        self.load()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Outgoing> {
        let len = self.students.items().len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.picker.next(len),
            KeyCode::Up | KeyCode::Char('k') => self.picker.previous(len),
            KeyCode::Enter => return self.analyze(),
            KeyCode::Char('r') => return self.load(),
            _ => {}
        }
        Vec::new()
    }

    fn on_delivery(&mut self, delivery: Delivery) -> Vec<Outgoing> {
        if !self.requester.accept(&delivery.ticket) {
            return Vec::new();
        }

        match delivery.ticket.slot {
            Slot::Students => {
                self.students = Remote::settle(
                    delivery.outcome.and_then(|reply| match reply {
                        Reply::Students(students) => Ok(students),
                        other => Err(other.unexpected()),
                    }),
                    "Failed to load students",
                );
            }
            Slot::Report => {
                self.report = Remote::settle(
                    delivery.outcome.and_then(|reply| match reply {
                        Reply::Analysis(analysis) => Ok(analysis),
                        other => Err(other.unexpected()),
                    }),
                    "Failed to analyze performance",
                );
            }
            slot => tracing::debug!(?slot, "unexpected slot for analysis"),
        }
        Vec::new()
    }

    fn hints(&self) -> &'static str {
        "↑↓:select student Enter:analyze r:reload"
    }
}
