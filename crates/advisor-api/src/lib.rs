//! # advisor-api
//!
//! Typed client for the learning advisor REST service.
//!
//! The service owns every record. This crate only describes the request and
//! response shapes and performs the calls:
//!
//! - [`AdvisorApi`] - one async method per server operation
//! - [`AdvisorClient`] - the reqwest implementation
//! - [`RequestError`] - failure carrying the HTTP status and the server's
//!   `error` message when one was sent

mod client;
mod document;
mod error;
pub mod models;

pub use client::{AdvisorApi, AdvisorClient};
pub use document::{mime_for, Document, PDF_MIME};
pub use error::{ApiResult, RequestError};
pub use models::{
    AdviceResponse, AdviceResult, Course, CreatedStudent, ExtractedText, Grade, HealthStatus,
    PerformanceAnalysis, PerformanceLevel, Resource, Semester, Student, StudentFields, StudyWeek,
    Trend, UploadResult,
};
