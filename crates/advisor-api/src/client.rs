//! HTTP client for the learning advisor service.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{ApiResult, RequestError};
use crate::models::*;

/// Every operation the service exposes.
///
/// Failures propagate unchanged: no retries, no caching, and no timeout
/// beyond the transport default.
#[async_trait]
pub trait AdvisorApi: Send + Sync {
    async fn list_students(&self) -> ApiResult<Vec<Student>>;
    async fn get_student(&self, id: &str) -> ApiResult<Student>;
    async fn create_student(&self, fields: &StudentFields) -> ApiResult<CreatedStudent>;
    async fn update_student(&self, id: &str, fields: &StudentFields) -> ApiResult<()>;
    async fn delete_student(&self, id: &str) -> ApiResult<()>;
    async fn add_grade(&self, id: &str, grade: &Grade) -> ApiResult<()>;
    async fn search_students(&self, query: &str) -> ApiResult<Vec<Student>>;

    async fn list_courses(&self) -> ApiResult<Vec<Course>>;
    async fn get_course(&self, id: &str) -> ApiResult<Course>;

    async fn upload_document(&self, document: &Document) -> ApiResult<UploadResult>;
    async fn extract_text(&self, document: &Document) -> ApiResult<ExtractedText>;
    async fn parse_course_text(&self, text: &str) -> ApiResult<Course>;

    async fn generate_advice(&self, student_id: &str, course_id: &str)
        -> ApiResult<AdviceResponse>;
    async fn analyze_performance(&self, student_id: &str) -> ApiResult<PerformanceAnalysis>;

    async fn health(&self) -> ApiResult<HealthStatus>;
}

#[derive(Deserialize)]
struct StudentList {
    #[serde(default)]
    students: Vec<Student>,
}

#[derive(Deserialize)]
struct StudentOne {
    student: Student,
}

#[derive(Deserialize)]
struct CourseList {
    #[serde(default)]
    courses: Vec<Course>,
}

#[derive(Deserialize)]
struct CourseOne {
    course: Course,
}

#[derive(Deserialize)]
struct ParsedCourse {
    course_info: Course,
}

#[derive(Deserialize)]
struct AnalysisEnvelope {
    analysis: PerformanceAnalysis,
}

#[derive(Serialize)]
struct AdviceRequest<'a> {
    student_id: &'a str,
    course_id: &'a str,
}

#[derive(Serialize)]
struct AnalysisRequest<'a> {
    student_id: &'a str,
}

#[derive(Serialize)]
struct ParseRequest<'a> {
    text: &'a str,
}

/// reqwest-backed [`AdvisorApi`].
#[derive(Debug, Clone)]
pub struct AdvisorClient {
    client: Client,
    base_url: String,
}

impl AdvisorClient {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self.send_raw(request).await?;
        serde_json::from_str(&body).map_err(|e| RequestError::Decode(e.to_string()))
    }

    async fn send_raw(&self, request: RequestBuilder) -> ApiResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), path = %url, "request rejected");
            return Err(RequestError::from_body(status.as_u16(), &body));
        }

        debug!(status = status.as_u16(), path = %url, "request completed");
        Ok(body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(self.client.get(self.url(path))).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    async fn upload<T: DeserializeOwned>(&self, path: &str, document: &Document) -> ApiResult<T> {
        if !document.is_pdf() {
            return Err(RequestError::UnsupportedDocument(document.mime.clone()));
        }

        let part = Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone())
            .mime_str(&document.mime)?;
        let form = Form::new().part("file", part);

        self.send(self.client.post(self.url(path)).multipart(form))
            .await
    }
}

fn student_path(id: &str) -> String {
    format!("/api/students/{}", urlencoding::encode(id))
}

#[async_trait]
impl AdvisorApi for AdvisorClient {
    async fn list_students(&self) -> ApiResult<Vec<Student>> {
        let list: StudentList = self.get("/api/students/").await?;
        Ok(list.students)
    }

    async fn get_student(&self, id: &str) -> ApiResult<Student> {
        let one: StudentOne = self.get(&student_path(id)).await?;
        Ok(one.student)
    }

    async fn create_student(&self, fields: &StudentFields) -> ApiResult<CreatedStudent> {
        self.post("/api/students/", fields).await
    }

    async fn update_student(&self, id: &str, fields: &StudentFields) -> ApiResult<()> {
        let request = self.client.put(self.url(&student_path(id))).json(fields);
        self.send_raw(request).await.map(|_| ())
    }

    async fn delete_student(&self, id: &str) -> ApiResult<()> {
        let request = self.client.delete(self.url(&student_path(id)));
        self.send_raw(request).await.map(|_| ())
    }

    async fn add_grade(&self, id: &str, grade: &Grade) -> ApiResult<()> {
        let path = format!("{}/grades", student_path(id));
        let request = self.client.post(self.url(&path)).json(grade);
        self.send_raw(request).await.map(|_| ())
    }

    async fn search_students(&self, query: &str) -> ApiResult<Vec<Student>> {
        let request = self
            .client
            .get(self.url("/api/students/search"))
            .query(&[("q", query)]);
        let list: StudentList = self.send(request).await?;
        Ok(list.students)
    }

    async fn list_courses(&self) -> ApiResult<Vec<Course>> {
        let list: CourseList = self.get("/api/rag/courses").await?;
        Ok(list.courses)
    }

    async fn get_course(&self, id: &str) -> ApiResult<Course> {
        let one: CourseOne = self
            .get(&format!("/api/rag/courses/{}", urlencoding::encode(id)))
            .await?;
        Ok(one.course)
    }

    async fn upload_document(&self, document: &Document) -> ApiResult<UploadResult> {
        self.upload("/api/pdf/upload", document).await
    }

    async fn extract_text(&self, document: &Document) -> ApiResult<ExtractedText> {
        self.upload("/api/pdf/extract-text", document).await
    }

    async fn parse_course_text(&self, text: &str) -> ApiResult<Course> {
        let parsed: ParsedCourse = self
            .post("/api/pdf/parse-course", &ParseRequest { text })
            .await?;
        Ok(parsed.course_info)
    }

    async fn generate_advice(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> ApiResult<AdviceResponse> {
        self.post(
            "/api/rag/advice",
            &AdviceRequest {
                student_id,
                course_id,
            },
        )
        .await
    }

    async fn analyze_performance(&self, student_id: &str) -> ApiResult<PerformanceAnalysis> {
        let envelope: AnalysisEnvelope = self
            .post("/api/rag/analyze-performance", &AnalysisRequest { student_id })
            .await?;
        Ok(envelope.analysis)
    }

    async fn health(&self) -> ApiResult<HealthStatus> {
        self.get("/health").await
    }
}
