//! Background requests and response routing.
//!
//! Views never call the service directly. They hand an [`Outgoing`] request to
//! the [`Dispatcher`], which runs it on the tokio runtime and sends a
//! [`Delivery`] back to the UI loop. Each request carries a [`Ticket`] so that
//! responses for a view that has since been closed, or for a request that has
//! been superseded, are dropped instead of applied.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use advisor_api::{
    AdviceResponse, AdvisorApi, ApiResult, Course, CreatedStudent, Document, ExtractedText, Grade,
    HealthStatus, PerformanceAnalysis, RequestError, Student, StudentFields, UploadResult,
};
use tokio::sync::mpsc;
use tracing::debug;

/// Identity of one mounted view.
pub type MountId = u64;

static NEXT_MOUNT: AtomicU64 = AtomicU64::new(1);

/// Independent request streams within a view. Only the newest request per slot
/// is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Students,
    Courses,
    Detail,
    Submit,
    Delete,
    Report,
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub mount: MountId,
    pub slot: Slot,
    pub seq: u64,
}

/// One call against the service.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    ListStudents,
    GetStudent(String),
    CreateStudent(StudentFields),
    UpdateStudent { id: String, fields: StudentFields },
    DeleteStudent(String),
    AddGrade { id: String, grade: Grade },
    SearchStudents(String),
    ListCourses,
    GetCourse(String),
    UploadDocument(Document),
    ExtractText(Document),
    ParseCourseText(String),
    GenerateAdvice { student_id: String, course_id: String },
    AnalyzePerformance(String),
    Health,
}

/// Successful result of a [`Request`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Students(Vec<Student>),
    Student(Student),
    Created(CreatedStudent),
    Updated,
    Deleted(String),
    GradeAdded,
    Courses(Vec<Course>),
    Course(Course),
    Uploaded(UploadResult),
    Extracted(ExtractedText),
    Parsed(Course),
    Advice(AdviceResponse),
    Analysis(PerformanceAnalysis),
    Health(HealthStatus),
}

impl Reply {
    /// Error for a reply of the wrong shape for the slot it arrived on.
    pub fn unexpected(self) -> RequestError {
        RequestError::Decode(format!("unexpected reply: {:?}", self))
    }
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::ListStudents => "list_students",
            Request::GetStudent(_) => "get_student",
            Request::CreateStudent(_) => "create_student",
            Request::UpdateStudent { .. } => "update_student",
            Request::DeleteStudent(_) => "delete_student",
            Request::AddGrade { .. } => "add_grade",
            Request::SearchStudents(_) => "search_students",
            Request::ListCourses => "list_courses",
            Request::GetCourse(_) => "get_course",
            Request::UploadDocument(_) => "upload_document",
            Request::ExtractText(_) => "extract_text",
            Request::ParseCourseText(_) => "parse_course_text",
            Request::GenerateAdvice { .. } => "generate_advice",
            Request::AnalyzePerformance(_) => "analyze_performance",
            Request::Health => "health",
        }
    }

    pub async fn execute(self, api: &dyn AdvisorApi) -> ApiResult<Reply> {
        match self {
            Request::ListStudents => api.list_students().await.map(Reply::Students),
            Request::GetStudent(id) => api.get_student(&id).await.map(Reply::Student),
            Request::CreateStudent(fields) => {
                api.create_student(&fields).await.map(Reply::Created)
            }
            Request::UpdateStudent { id, fields } => {
                api.update_student(&id, &fields).await.map(|_| Reply::Updated)
            }
            Request::DeleteStudent(id) => {
                api.delete_student(&id).await?;
                Ok(Reply::Deleted(id))
            }
            Request::AddGrade { id, grade } => {
                api.add_grade(&id, &grade).await.map(|_| Reply::GradeAdded)
            }
            Request::SearchStudents(query) => {
                api.search_students(&query).await.map(Reply::Students)
            }
            Request::ListCourses => api.list_courses().await.map(Reply::Courses),
            Request::GetCourse(id) => api.get_course(&id).await.map(Reply::Course),
            Request::UploadDocument(doc) => api.upload_document(&doc).await.map(Reply::Uploaded),
            Request::ExtractText(doc) => api.extract_text(&doc).await.map(Reply::Extracted),
            Request::ParseCourseText(text) => {
                api.parse_course_text(&text).await.map(Reply::Parsed)
            }
            Request::GenerateAdvice {
                student_id,
                course_id,
            } => api
                .generate_advice(&student_id, &course_id)
                .await
                .map(Reply::Advice),
            Request::AnalyzePerformance(student_id) => api
                .analyze_performance(&student_id)
                .await
                .map(Reply::Analysis),
            Request::Health => api.health().await.map(Reply::Health),
        }
    }
}

/// A ticketed request waiting to be dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub ticket: Ticket,
    pub request: Request,
}

/// A finished request on its way back to the view that issued it.
#[derive(Debug)]
pub struct Delivery {
    pub ticket: Ticket,
    pub outcome: ApiResult<Reply>,
}

/// Per-view ticket issuer and acceptance check.
#[derive(Debug)]
pub struct Requester {
    mount: MountId,
    next_seq: u64,
    latest: HashMap<Slot, u64>,
}

impl Default for Requester {
    fn default() -> Self {
        Self::new()
    }
}

impl Requester {
    /// Create a requester with a fresh mount identity.
    pub fn new() -> Self {
        Self {
            mount: NEXT_MOUNT.fetch_add(1, Ordering::Relaxed),
            next_seq: 0,
            latest: HashMap::new(),
        }
    }

    pub fn mount(&self) -> MountId {
        self.mount
    }

    /// Ticket a request. Any earlier request on the same slot is superseded.
    pub fn issue(&mut self, slot: Slot, request: Request) -> Outgoing {
        self.next_seq += 1;
        self.latest.insert(slot, self.next_seq);
        Outgoing {
            ticket: Ticket {
                mount: self.mount,
                slot,
                seq: self.next_seq,
            },
            request,
        }
    }

    /// Whether a response belongs to this view and is the newest on its slot.
    /// Accepting settles the slot.
    pub fn accept(&mut self, ticket: &Ticket) -> bool {
        if ticket.mount != self.mount || self.latest.get(&ticket.slot) != Some(&ticket.seq) {
            debug!(mount = ticket.mount, slot = ?ticket.slot, seq = ticket.seq, "stale response dropped");
            return false;
        }
        self.latest.remove(&ticket.slot);
        true
    }

    pub fn is_pending(&self, slot: Slot) -> bool {
        self.latest.contains_key(&slot)
    }
}

/// Runs requests on the tokio runtime and queues their results.
pub struct Dispatcher {
    api: Arc<dyn AdvisorApi>,
    tx: mpsc::UnboundedSender<Delivery>,
    rx: mpsc::UnboundedReceiver<Delivery>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn AdvisorApi>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { api, tx, rx }
    }

    /// Start a request in the background. Must be called inside a tokio runtime.
    pub fn dispatch(&self, outgoing: Outgoing) {
        let Outgoing { ticket, request } = outgoing;
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();

        debug!(request = request.name(), mount = ticket.mount, seq = ticket.seq, "dispatching");
        tokio::spawn(async move {
            let outcome = request.execute(api.as_ref()).await;
            // The receiver only goes away at shutdown.
            let _ = tx.send(Delivery { ticket, outcome });
        });
    }

    /// Next finished request, if any, without waiting.
    pub fn try_next(&mut self) -> Option<Delivery> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next finished request.
    pub async fn next(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_students, FakeApi};

    #[test]
    fn test_requester_accepts_latest_only() {
        let mut requester = Requester::new();
        let first = requester.issue(Slot::Report, Request::Health);
        let second = requester.issue(Slot::Report, Request::Health);

        assert!(!requester.accept(&first.ticket));
        assert!(requester.is_pending(Slot::Report));
        assert!(requester.accept(&second.ticket));
        assert!(!requester.is_pending(Slot::Report));
        // Settled tickets are not accepted twice.
        assert!(!requester.accept(&second.ticket));
    }

    #[test]
    fn test_requester_slots_are_independent() {
        let mut requester = Requester::new();
        let students = requester.issue(Slot::Students, Request::ListStudents);
        let courses = requester.issue(Slot::Courses, Request::ListCourses);
        assert!(requester.accept(&courses.ticket));
        assert!(requester.accept(&students.ticket));
    }

    #[test]
    fn test_requester_rejects_other_mounts() {
        let mut old = Requester::new();
        let mut new = Requester::new();
        assert_ne!(old.mount(), new.mount());

        let outgoing = old.issue(Slot::Students, Request::ListStudents);
        new.issue(Slot::Students, Request::ListStudents);
        assert!(!new.accept(&outgoing.ticket));
    }

    #[tokio::test]
    async fn test_dispatcher_round_trip() {
        let api = Arc::new(FakeApi::with_students(sample_students()));
        let mut dispatcher = Dispatcher::new(api.clone());
        let mut requester = Requester::new();

        let outgoing = requester.issue(Slot::Students, Request::ListStudents);
        let ticket = outgoing.ticket;
        dispatcher.dispatch(outgoing);

        let delivery = dispatcher.next().await.unwrap();
        assert_eq!(delivery.ticket, ticket);
        match delivery.outcome {
            Ok(Reply::Students(students)) => assert_eq!(students.len(), 2),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(api.calls(), vec!["list_students".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_reply_carries_id() {
        let api = FakeApi::with_students(sample_students());
        let reply = Request::DeleteStudent("s1".to_string())
            .execute(&api)
            .await
            .unwrap();
        assert_eq!(reply, Reply::Deleted("s1".to_string()));
    }
}
