//! In-memory service double for view and dispatcher tests.

use std::collections::HashMap;
use std::sync::Mutex;

use advisor_api::models::PerformanceAnalysis;
use advisor_api::{
    AdviceResponse, AdviceResult, AdvisorApi, ApiResult, Course, CreatedStudent, Document,
    ExtractedText, Grade, HealthStatus, RequestError, Student, StudentFields, Trend, UploadResult,
};
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::task::{Delivery, Outgoing, Reply};

pub fn student(id: &str, name: &str, student_id: &str, major: &str) -> Student {
    Student {
        id: id.to_string(),
        name: name.to_string(),
        student_id: student_id.to_string(),
        major: major.to_string(),
        grade: String::new(),
        email: String::new(),
        phone: String::new(),
        grades: Vec::new(),
    }
}

pub fn sample_students() -> Vec<Student> {
    let mut first = student("s1", "张三", "2021001", "Computer Science");
    first.grades = vec![
        Grade {
            course: "CS101".to_string(),
            score: 85.0,
            semester: "spring".to_string(),
            year: "2023".to_string(),
        },
        Grade {
            course: "CS102".to_string(),
            score: 90.0,
            semester: "autumn".to_string(),
            year: "2023".to_string(),
        },
        Grade {
            course: "MA201".to_string(),
            score: 78.0,
            semester: "spring".to_string(),
            year: "2024".to_string(),
        },
    ];
    let second = student("s2", "李四", "2021002", "Mathematics");
    vec![first, second]
}

pub fn sample_courses() -> Vec<Course> {
    vec![
        Course {
            id: "c1".to_string(),
            course_code: "CS5187".to_string(),
            course_name: "Computer Vision".to_string(),
            description: "Image formation and recognition".to_string(),
            objectives: vec!["Understand camera models".to_string()],
            topics: vec!["Filtering".to_string(), "Features".to_string()],
            prerequisites: vec!["Linear algebra".to_string()],
            assessment: Vec::new(),
        },
        Course {
            id: "c2".to_string(),
            course_code: "CS5489".to_string(),
            course_name: "Machine Learning".to_string(),
            ..Course::default()
        },
    ]
}

pub fn sample_advice() -> AdviceResponse {
    AdviceResponse {
        student_name: "张三".to_string(),
        course_name: "Computer Vision".to_string(),
        advice_result: AdviceResult {
            advice: "Review linear algebra before week 3.".to_string(),
            study_plan: None,
            recommended_resources: None,
            difficulty_assessment: "medium".to_string(),
            estimated_study_time: "8-12 hours per week".to_string(),
            success_probability: 0.873,
        },
    }
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

pub fn type_text(text: &str) -> Vec<KeyEvent> {
    text.chars().map(|c| key(KeyCode::Char(c))).collect()
}

/// Deliver a successful reply for an outgoing request.
pub fn ok(outgoing: &Outgoing, reply: Reply) -> Delivery {
    Delivery {
        ticket: outgoing.ticket,
        outcome: Ok(reply),
    }
}

/// Deliver a server failure for an outgoing request.
pub fn failed(outgoing: &Outgoing, status: u16, message: Option<&str>) -> Delivery {
    Delivery {
        ticket: outgoing.ticket,
        outcome: Err(RequestError::Status {
            status,
            message: message.map(str::to_string),
        }),
    }
}

/// Records every call and answers from canned data.
#[derive(Default)]
pub struct FakeApi {
    students: Mutex<Vec<Student>>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, (u16, Option<String>)>>,
}

impl FakeApi {
    pub fn with_students(students: Vec<Student>) -> Self {
        Self {
            students: Mutex::new(students),
            ..Self::default()
        }
    }

    /// Make every call to `operation` fail with the given status and message.
    pub fn fail(&self, operation: &'static str, status: u16, message: Option<&str>) {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, (status, message.map(str::to_string)));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, detail: &str) -> ApiResult<()> {
        let entry = if detail.is_empty() {
            operation.to_string()
        } else {
            format!("{}:{}", operation, detail)
        };
        self.calls.lock().unwrap().push(entry);

        match self.failures.lock().unwrap().get(operation) {
            Some((status, message)) => Err(RequestError::Status {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AdvisorApi for FakeApi {
    async fn list_students(&self) -> ApiResult<Vec<Student>> {
        self.record("list_students", "")?;
        Ok(self.students.lock().unwrap().clone())
    }

    async fn get_student(&self, id: &str) -> ApiResult<Student> {
        self.record("get_student", id)?;
        self.students
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(RequestError::Status {
                status: 404,
                message: Some("学生不存在".to_string()),
            })
    }

    async fn create_student(&self, fields: &StudentFields) -> ApiResult<CreatedStudent> {
        self.record("create_student", &fields.student_id)?;
        Ok(CreatedStudent {
            message: "ok".to_string(),
            student_id: "new".to_string(),
        })
    }

    async fn update_student(&self, id: &str, _fields: &StudentFields) -> ApiResult<()> {
        self.record("update_student", id)
    }

    async fn delete_student(&self, id: &str) -> ApiResult<()> {
        self.record("delete_student", id)?;
        self.students.lock().unwrap().retain(|s| s.id != id);
        Ok(())
    }

    async fn add_grade(&self, id: &str, _grade: &Grade) -> ApiResult<()> {
        self.record("add_grade", id)
    }

    async fn search_students(&self, query: &str) -> ApiResult<Vec<Student>> {
        self.record("search_students", query)?;
        Ok(self
            .students
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.name.contains(query) || s.student_id.contains(query))
            .cloned()
            .collect())
    }

    async fn list_courses(&self) -> ApiResult<Vec<Course>> {
        self.record("list_courses", "")?;
        Ok(sample_courses())
    }

    async fn get_course(&self, id: &str) -> ApiResult<Course> {
        self.record("get_course", id)?;
        Ok(sample_courses()
            .into_iter()
            .find(|c| c.id == id)
            .unwrap_or_default())
    }

    async fn upload_document(&self, document: &Document) -> ApiResult<UploadResult> {
        self.record("upload_document", &document.file_name)?;
        Ok(UploadResult {
            message: "ok".to_string(),
            course_id: "c1".to_string(),
            course_info: sample_courses()[0].clone(),
        })
    }

    async fn extract_text(&self, document: &Document) -> ApiResult<ExtractedText> {
        self.record("extract_text", &document.file_name)?;
        Ok(ExtractedText {
            text: "CS5187 Computer Vision".to_string(),
            filename: document.file_name.clone(),
        })
    }

    async fn parse_course_text(&self, _text: &str) -> ApiResult<Course> {
        self.record("parse_course_text", "")?;
        Ok(sample_courses()[0].clone())
    }

    async fn generate_advice(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> ApiResult<AdviceResponse> {
        self.record("generate_advice", &format!("{}/{}", student_id, course_id))?;
        Ok(sample_advice())
    }

    async fn analyze_performance(&self, student_id: &str) -> ApiResult<PerformanceAnalysis> {
        self.record("analyze_performance", student_id)?;
        Ok(PerformanceAnalysis {
            average_score: 84.33,
            total_courses: 3,
            performance_trend: Trend::Stable,
            recent_average: Some(84.33),
            recommendations: vec!["Keep going".to_string()],
        })
    }

    async fn health(&self) -> ApiResult<HealthStatus> {
        self.record("health", "")?;
        Ok(HealthStatus {
            status: "healthy".to_string(),
            version: "1.0.0".to_string(),
        })
    }
}
