//! Views. Each one owns its own fetched data and request state; nothing is
//! shared between them.

mod advice;
mod analysis;
mod course_list;
mod grade_form;
mod student_form;
mod student_list;
mod upload;

pub use advice::{AdviceFocus, AdviceGenerator};
pub use analysis::PerformanceReport;
pub use course_list::CourseList;
pub use grade_form::GradeForm;
pub use student_form::StudentForm;
pub use student_list::{Modal, StudentList};
pub use upload::UploadForm;

use chrono::{DateTime, Local};
use crossterm::event::KeyEvent;

use crate::task::{Delivery, MountId, Outgoing};

/// A mounted view.
pub trait Component {
    fn mount_id(&self) -> MountId;

    /// Whether a response for `mount` should be routed here. Views hosting a
    /// nested view answer for it too.
    fn owns(&self, mount: MountId) -> bool {
        self.mount_id() == mount
    }

    /// Requests to issue when the view appears.
    fn mount(&mut self) -> Vec<Outgoing> {
        Vec::new()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Outgoing>;

    fn on_delivery(&mut self, delivery: Delivery) -> Vec<Outgoing>;

    /// Key help for the status bar.
    fn hints(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A one-line result message, the terminal counterpart of an alert.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub at: DateTime<Local>,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
            at: Local::now(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
            at: Local::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Selection over a fetched collection, with an explicit "nothing selected"
/// position before the first item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Picker {
    pub selected: Option<usize>,
}

impl Picker {
    pub fn next(&mut self, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = match self.selected {
            None => Some(0),
            Some(i) if i + 1 < len => Some(i + 1),
            Some(_) => None,
        };
    }

    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = match self.selected {
            None => Some(len - 1),
            Some(0) => None,
            Some(i) => Some(i - 1),
        };
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        self.selected.and_then(|i| items.get(i))
    }
}

/// Keep a list cursor inside `len` items.
pub fn clamp_cursor(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picker_cycles_through_none() {
        let mut picker = Picker::default();
        picker.next(2);
        assert_eq!(picker.selected, Some(0));
        picker.next(2);
        assert_eq!(picker.selected, Some(1));
        picker.next(2);
        assert_eq!(picker.selected, None);
        picker.previous(2);
        assert_eq!(picker.selected, Some(1));
        assert_eq!(picker.pick(&["a", "b"]), Some(&"b"));
    }

    #[test]
    fn test_picker_empty_list() {
        let mut picker = Picker { selected: Some(3) };
        picker.next(0);
        assert_eq!(picker.selected, None);
        assert_eq!(picker.pick::<u8>(&[]), None);
    }

    #[test]
    fn test_clamp_cursor() {
        assert_eq!(clamp_cursor(5, 2), 1);
        assert_eq!(clamp_cursor(0, 0), 0);
    }
}
