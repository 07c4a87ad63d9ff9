//! Personalized learning advice for a (student, course) pair.

use advisor_api::{AdviceResponse, Course, Student};
use crossterm::event::{KeyCode, KeyEvent};

use super::{Component, Picker};
use crate::remote::Remote;
use crate::task::{Delivery, MountId, Outgoing, Reply, Request, Requester, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceFocus {
    Student,
    Course,
}

pub struct AdviceGenerator {
    requester: Requester,
    pub students: Remote<Vec<Student>>,
    pub courses: Remote<Vec<Course>>,
    pub student_picker: Picker,
    pub course_picker: Picker,
    pub focus: AdviceFocus,
    pub advice: Remote<AdviceResponse>,
}

impl Default for AdviceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl AdviceGenerator {
    pub fn new() -> Self {
        Self {
            requester: Requester::new(),
            students: Remote::Idle,
            courses: Remote::Idle,
            student_picker: Picker::default(),
            course_picker: Picker::default(),
            focus: AdviceFocus::Student,
            advice: Remote::Idle,
        }
    }

    pub fn selected_student(&self) -> Option<&Student> {
        self.student_picker.pick(self.students.items())
    }

    pub fn selected_course(&self) -> Option<&Course> {
        self.course_picker.pick(self.courses.items())
    }

    pub fn can_generate(&self) -> bool {
        self.selected_student().is_some()
            && self.selected_course().is_some()
            && !self.advice.is_pending()
    }

    pub fn student_options(&self) -> Vec<String> {
        self.students.items().iter().map(Student::option_label).collect()
    }

    pub fn course_options(&self) -> Vec<String> {
        self.courses.items().iter().map(Course::option_label).collect()
    }

    fn load(&mut self) -> Vec<Outgoing> {
        self.students = Remote::Pending;
        self.courses = Remote::Pending;
        self.student_picker.clear();
        self.course_picker.clear();
        vec![
            self.requester.issue(Slot::Students, Request::ListStudents),
            self.requester.issue(Slot::Courses, Request::ListCourses),
        ]
    }

    pub fn generate(&mut self) -> Vec<Outgoing> {
        if self.advice.is_pending() {
            return Vec::new();
        }
        let (Some(student), Some(course)) = (self.selected_student(), self.selected_course())
        else {
            self.advice = Remote::Failed("Please select a student and a course".to_string());
            return Vec::new();
        };

        let request = Request::GenerateAdvice {
            student_id: student.id.clone(),
            course_id: course.id.clone(),
        };
        self.advice = Remote::Pending;
        vec![self.requester.issue(Slot::Report, request)]
    }

    fn step(&mut self, forward: bool) {
        let (picker, len) = match self.focus {
            AdviceFocus::Student => (&mut self.student_picker, self.students.items().len()),
            AdviceFocus::Course => (&mut self.course_picker, self.courses.items().len()),
        };
        if forward {
            picker.next(len);
        } else {
            picker.previous(len);
        }
    }
}

impl Component for AdviceGenerator {
    fn mount_id(&self) -> MountId {
        self.requester.mount()
    }

    fn mount(&mut self) -> Vec<Outgoing> {
        self.load()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Outgoing> {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    AdviceFocus::Student => AdviceFocus::Course,
                    AdviceFocus::Course => AdviceFocus::Student,
                };
            }
            KeyCode::Down | KeyCode::Char('j') => self.step(true),
            KeyCode::Up | KeyCode::Char('k') => self.step(false),
            KeyCode::Enter => return self.generate(),
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
            Slot::Courses => {
                self.courses = Remote::settle(
                    delivery.outcome.and_then(|reply| match reply {
                        Reply::Courses(courses) => Ok(courses),
                        other => Err(other.unexpected()),
                    }),
                    "Failed to load courses",
                );
            }
            Slot::Report => {
                self.advice = Remote::settle(
                    delivery.outcome.and_then(|reply| match reply {
                        Reply::Advice(advice) => Ok(advice),
                        other => Err(other.unexpected()),
                    }),
                    "Failed to generate advice",
                );
            }
            slot => tracing::debug!(?slot, "unexpected slot for advice"),
        }
        Vec::new()
    }

    fn hints(&self) -> &'static str {
        "Tab:student/course ↑↓:select Enter:generate r:reload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{failed, key, ok, sample_advice, sample_courses, sample_students};

    fn loaded() -> AdviceGenerator {
        let mut view = AdviceGenerator::new();
        let sent = view.mount();
        assert_eq!(sent.len(), 2);
        view.on_delivery(ok(&sent[0], Reply::Students(sample_students())));
        view.on_delivery(ok(&sent[1], Reply::Courses(sample_courses())));
        view
    }

    #[test]
    fn test_options_follow_received_order() {
        let view = loaded();
        assert_eq!(
            view.student_options(),
            vec![
                "张三 (2021001) - Computer Science".to_string(),
                "李四 (2021002) - Mathematics".to_string(),
            ]
        );
        assert_eq!(view.course_options()[0], "CS5187 - Computer Vision");
    }

    #[test]
    fn test_generate_requires_both_selections() {
        let mut view = loaded();
        assert!(!view.can_generate());
        assert!(view.handle_key(key(KeyCode::Enter)).is_empty());
        assert_eq!(
            view.advice.error(),
            Some("Please select a student and a course")
        );

        view.handle_key(key(KeyCode::Down));
        assert!(!view.can_generate());
        assert!(view.generate().is_empty());

        view.handle_key(key(KeyCode::Tab));
        view.handle_key(key(KeyCode::Down));
        assert!(view.can_generate());
    }

    #[test]
    fn test_generate_clears_previous_result() {
        let mut view = loaded();
        view.student_picker.selected = Some(0);
        view.course_picker.selected = Some(0);

        let sent = view.generate();
        assert_eq!(
            sent[0].request,
            Request::GenerateAdvice {
                student_id: "s1".to_string(),
                course_id: "c1".to_string(),
            }
        );
        view.on_delivery(ok(&sent[0], Reply::Advice(sample_advice())));
        assert_eq!(
            view.advice.ready().map(|a| a.student_name.as_str()),
            Some("张三")
        );

        let sent = view.generate();
        assert!(view.advice.is_pending());
        assert!(!view.can_generate());
        view.on_delivery(failed(&sent[0], 500, None));
        assert_eq!(view.advice.error(), Some("Failed to generate advice"));
    }

    #[test]
    fn test_reload_resets_selection() {
        let mut view = loaded();
        view.student_picker.selected = Some(1);
        let sent = view.handle_key(key(KeyCode::Char('r')));
        assert_eq!(sent.len(), 2);
        assert_eq!(view.student_picker.selected, None);
        assert!(view.students.is_pending());
    }

    #[test]
    fn test_late_response_after_remount_ignored() {
        let mut old = AdviceGenerator::new();
        let sent = old.mount();

        let mut fresh = AdviceGenerator::new();
        fresh.mount();
        fresh.on_delivery(ok(&sent[0], Reply::Students(sample_students())));
        assert!(fresh.students.is_pending());
    }
}
