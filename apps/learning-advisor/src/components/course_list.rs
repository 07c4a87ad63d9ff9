use advisor_api::Course;
use crossterm::event::{KeyCode, KeyEvent};

use super::{clamp_cursor, Component, Notice};
use crate::remote::{failure_message, Remote};
use crate::task::{Delivery, MountId, Outgoing, Reply, Request, Requester, Slot};

/// Stored courses with an expandable detail section.
pub struct CourseList {
    requester: Requester,
    pub courses: Remote<Vec<Course>>,
    pub cursor: usize,
    /// Identity of the expanded course.
    pub expanded: Option<String>,
    pub notice: Option<Notice>,
}

impl Default for CourseList {
    fn default() -> Self {
        Self::new()
    }
}

impl CourseList {
    pub fn new() -> Self {
        Self {
            requester: Requester::new(),
            courses: Remote::Idle,
            cursor: 0,
            expanded: None,
            notice: None,
        }
    }

    pub fn selected(&self) -> Option<&Course> {
        self.courses.items().get(self.cursor)
    }

    pub fn expanded_course(&self) -> Option<&Course> {
        let id = self.expanded.as_deref()?;
        self.courses.items().iter().find(|c| c.id == id)
    }

    fn load(&mut self) -> Vec<Outgoing> {
        self.courses = Remote::Pending;
        self.expanded = None;
        vec![self.requester.issue(Slot::Courses, Request::ListCourses)]
    }

    /// Expand or collapse the selected course. Expanding refreshes it.
    pub fn toggle(&mut self) -> Vec<Outgoing> {
        let Some(id) = self.selected().map(|c| c.id.clone()) else {
            return Vec::new();
        };
        if self.expanded.as_deref() == Some(id.as_str()) {
            self.expanded = None;
            return Vec::new();
        }
        self.expanded = Some(id.clone());
        vec![self.requester.issue(Slot::Detail, Request::GetCourse(id))]
    }
}

impl Component for CourseList {
    fn mount_id(&self) -> MountId {
        self.requester.mount()
    }

    fn mount(&mut self) -> Vec<Outgoing> {
        self.load()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Outgoing> {
        let len = self.courses.items().len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.cursor = clamp_cursor(self.cursor + 1, len),
            KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Enter | KeyCode::Char(' ') => return self.toggle(),
            KeyCode::Char('r') => return self.load(),
            _ => {}
        }
        Vec::new()
    }

    fn on_delivery(&mut self, delivery: Delivery) -> Vec<Outgoing> {
        if !self.requester.accept(&delivery.ticket) {
            return Vec::new();
        }

        match (delivery.ticket.slot, delivery.outcome) {
            (Slot::Courses, outcome) => {
                let outcome = outcome.and_then(|reply| match reply {
                    Reply::Courses(courses) => Ok(courses),
                    other => Err(other.unexpected()),
                });
                self.courses = Remote::settle(outcome, "Failed to load courses");
                self.cursor = clamp_cursor(self.cursor, self.courses.items().len());
            }
            (Slot::Detail, Ok(Reply::Course(course))) => {
                if let Some(existing) = self
                    .courses
                    .ready_mut()
                    .and_then(|list| list.iter_mut().find(|c| c.id == course.id))
                {
                    *existing = course;
                }
            }
            (Slot::Detail, Err(e)) => {
                self.notice = Some(Notice::error(failure_message(
                    &e,
                    "Failed to load course details",
                )));
            }
            (slot, outcome) => tracing::debug!(?slot, ?outcome, "unexpected reply for course list"),
        }
        Vec::new()
    }

    fn hints(&self) -> &'static str {
        "↑↓:move Enter:details r:reload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{failed, key, ok, sample_courses};

    fn loaded() -> CourseList {
        let mut view = CourseList::new();
        let sent = view.mount();
        assert_eq!(sent[0].request, Request::ListCourses);
        view.on_delivery(ok(&sent[0], Reply::Courses(sample_courses())));
        view
    }

    #[test]
    fn test_toggle_fetches_detail() {
        let mut view = loaded();
        let sent = view.handle_key(key(KeyCode::Enter));
        assert_eq!(sent[0].request, Request::GetCourse("c1".to_string()));
        assert_eq!(
            view.expanded_course().map(|c| c.course_code.as_str()),
            Some("CS5187")
        );

        let mut refreshed = sample_courses().remove(0);
        refreshed.assessment = vec!["Final exam 60%".to_string()];
        view.on_delivery(ok(&sent[0], Reply::Course(refreshed)));
        assert_eq!(view.expanded_course().unwrap().assessment.len(), 1);

        assert!(view.handle_key(key(KeyCode::Enter)).is_empty());
        assert!(view.expanded.is_none());
    }

    #[test]
    fn test_detail_failure_keeps_list() {
        let mut view = loaded();
        view.handle_key(key(KeyCode::Down));
        let sent = view.toggle();
        view.on_delivery(failed(&sent[0], 404, Some("课程不存在")));
        assert_eq!(view.courses.items().len(), 2);
        assert_eq!(view.notice.as_ref().map(|n| n.text.as_str()), Some("课程不存在"));
    }

    #[test]
    fn test_load_failure() {
        let mut view = CourseList::new();
        let sent = view.mount();
        view.on_delivery(failed(&sent[0], 500, None));
        assert_eq!(view.courses.error(), Some("Failed to load courses"));
    }
}
