//! Wire types for the learning advisor service.
//!
//! Records are server-owned; the client only holds disposable snapshots.

use serde::{Deserialize, Deserializer, Serialize};

/// A registered student with embedded grade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub name: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub student_id: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub major: String,
    /// Academic-year label, may be empty.
    #[serde(default, deserialize_with = "loose_text")]
    pub grade: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub email: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub phone: String,
    #[serde(default)]
    pub grades: Vec<Grade>,
}

impl Student {
    /// Mean score over all recorded grades, rounded to two decimals.
    pub fn average_score(&self) -> f64 {
        average_score(&self.grades)
    }

    /// Label used wherever a student is offered for selection.
    pub fn option_label(&self) -> String {
        format!("{} ({}) - {}", self.name, self.student_id, self.major)
    }

    /// Editable fields of this record, for pre-filling an edit form.
    pub fn fields(&self) -> StudentFields {
        StudentFields {
            name: self.name.clone(),
            student_id: self.student_id.clone(),
            major: self.major.clone(),
            grade: self.grade.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Body for creating or updating a student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFields {
    pub name: String,
    pub student_id: String,
    pub major: String,
    pub grade: String,
    pub email: String,
    pub phone: String,
}

/// Response to a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedStudent {
    #[serde(default)]
    pub message: String,
    /// Identity of the new record.
    pub student_id: String,
}

/// One course result. Identified only by its position in the student's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    #[serde(default, deserialize_with = "loose_text")]
    pub course: String,
    /// The service stores scores as sent, so numeric text is accepted too.
    #[serde(default, deserialize_with = "loose_score")]
    pub score: f64,
    #[serde(default, deserialize_with = "loose_text")]
    pub semester: String,
    /// Four-digit year. The service echoes back whatever it was sent, so both
    /// strings and numbers are accepted.
    #[serde(default, deserialize_with = "loose_text")]
    pub year: String,
}

/// Teaching terms offered by the grade form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semester {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Semester {
    pub const ALL: [Semester; 4] = [
        Semester::Spring,
        Semester::Summer,
        Semester::Autumn,
        Semester::Winter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Semester::Spring => "spring",
            Semester::Summer => "summer",
            Semester::Autumn => "autumn",
            Semester::Winter => "winter",
        }
    }
}

/// Academic-year labels offered by the student form.
pub const ACADEMIC_YEARS: &[&str] = &[
    "Year 1",
    "Year 2",
    "Year 3",
    "Year 4",
    "Graduate 1",
    "Graduate 2",
    "Graduate 3",
];

/// A course parsed from an uploaded description document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Empty for course info that has not been stored yet.
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub course_code: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub course_name: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub description: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub assessment: Vec<String>,
}

impl Course {
    pub fn option_label(&self) -> String {
        format!("{} - {}", self.course_code, self.course_name)
    }
}

/// Result of uploading a document for parsing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResult {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub course_id: String,
    pub course_info: Course,
}

/// Raw text pulled out of a document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    #[serde(default)]
    pub filename: String,
}

/// Generated advice for a (student, course) pair.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdviceResponse {
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub course_name: String,
    pub advice_result: AdviceResult,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AdviceResult {
    #[serde(default)]
    pub advice: String,
    #[serde(default)]
    pub study_plan: Option<Vec<StudyWeek>>,
    #[serde(default)]
    pub recommended_resources: Option<Vec<Resource>>,
    #[serde(default, deserialize_with = "loose_text")]
    pub difficulty_assessment: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub estimated_study_time: String,
    /// Between 0 and 1.
    #[serde(default)]
    pub success_probability: f64,
}

impl AdviceResult {
    /// Study plan weeks, or an empty slice when the service sent none.
    pub fn plan(&self) -> &[StudyWeek] {
        self.study_plan.as_deref().unwrap_or_default()
    }

    pub fn resources(&self) -> &[Resource] {
        self.recommended_resources.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudyWeek {
    pub week: u32,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Resource {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default, deserialize_with = "loose_text")]
    pub kind: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub priority: String,
}

/// Grade-history analysis for one student.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PerformanceAnalysis {
    #[serde(default)]
    pub average_score: f64,
    #[serde(default)]
    pub total_courses: u32,
    #[serde(default)]
    pub performance_trend: Trend,
    /// Absent when the student has no grades yet.
    #[serde(default)]
    pub recent_average: Option<f64>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl PerformanceAnalysis {
    pub fn level(&self) -> PerformanceLevel {
        PerformanceLevel::from_average(self.average_score)
    }
}

/// Direction of recent scores relative to the overall average.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    #[default]
    Unknown,
}

impl From<String> for Trend {
    fn from(value: String) -> Self {
        match value.as_str() {
            "improving" => Trend::Improving,
            "declining" => Trend::Declining,
            "stable" => Trend::Stable,
            _ => Trend::Unknown,
        }
    }
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Improving => "Improving",
            Trend::Declining => "Declining",
            Trend::Stable => "Stable",
            Trend::Unknown => "Not enough data",
        }
    }
}

/// Coarse banding of an average score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl PerformanceLevel {
    pub fn from_average(average: f64) -> Self {
        if average >= 90.0 {
            Self::Excellent
        } else if average >= 80.0 {
            Self::Good
        } else if average >= 70.0 {
            Self::Fair
        } else {
            Self::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsImprovement => "Needs improvement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Arithmetic mean of the scores rounded to two decimals; zero when empty.
pub fn average_score(grades: &[Grade]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }
    let sum: f64 = grades.iter().map(|g| g.score).sum();
    round2(sum / grades.len() as f64)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Render a 0–1 probability as a whole percentage, e.g. `0.873` → `"87%"`.
pub fn percent(probability: f64) -> String {
    format!("{}%", (probability * 100.0).round() as i64)
}

/// Render a number without a trailing `.0` for whole values.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Accept a string, a number or null and hold it as text.
fn loose_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Text(s)) => s,
        Some(Loose::Int(n)) => n.to_string(),
        Some(Loose::Float(n)) => format_number(n),
        None => String::new(),
    })
}

/// Accept a number, numeric text or null as a score. Unparseable text counts
/// as zero rather than failing the whole record.
fn loose_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Number(n)) => n,
        Some(Loose::Text(s)) => s.trim().parse().unwrap_or(0.0),
        None => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(score: f64) -> Grade {
        Grade {
            course: "CS5187".to_string(),
            score,
            semester: "spring".to_string(),
            year: "2024".to_string(),
        }
    }

    #[test]
    fn test_average_empty_is_zero() {
        assert_eq!(average_score(&[]), 0.0);
    }

    #[test]
    fn test_average_rounds_to_two_decimals() {
        let grades = vec![grade(85.0), grade(90.0), grade(78.0)];
        assert_eq!(average_score(&grades), 84.33);

        let grades = vec![grade(70.0), grade(71.0), grade(71.0)];
        assert_eq!(average_score(&grades), 70.67);

        assert_eq!(average_score(&[grade(92.5)]), 92.5);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.873), "87%");
        assert_eq!(percent(0.0), "0%");
        assert_eq!(percent(1.0), "100%");
        assert_eq!(percent(0.125), "13%");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(85.0), "85");
        assert_eq!(format_number(85.5), "85.5");
    }

    #[test]
    fn test_student_from_service_json() {
        let json = r#"{
            "_id": "65f0c1",
            "name": "张三",
            "student_id": "2021001",
            "major": "计算机科学",
            "grade": "Year 3",
            "email": "zhangsan@example.com",
            "phone": null,
            "created_at": "2024-03-01T00:00:00",
            "grades": [
                {"course": "CS101", "score": 85, "semester": "spring", "year": 2023},
                {"course": "CS102", "score": 90.5, "semester": "autumn", "year": "2023", "timestamp": "x"}
            ]
        }"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert_eq!(student.id, "65f0c1");
        assert_eq!(student.phone, "");
        assert_eq!(student.grades.len(), 2);
        assert_eq!(student.grades[0].year, "2023");
        assert_eq!(student.grades[1].year, "2023");
        assert_eq!(student.average_score(), 87.75);
        assert_eq!(student.option_label(), "张三 (2021001) - 计算机科学");
    }

    #[test]
    fn test_student_without_optional_fields() {
        let json = r#"{"_id": "1", "name": "李四", "student_id": "2021002"}"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert!(student.grades.is_empty());
        assert_eq!(student.major, "");
        assert_eq!(student.average_score(), 0.0);
    }

    #[test]
    fn test_trend_parsing() {
        let analysis: PerformanceAnalysis = serde_json::from_str(
            r#"{"average_score": 0, "total_courses": 0,
                "performance_trend": "insufficient_data",
                "recommendations": ["需要更多成绩数据进行分析"]}"#,
        )
        .unwrap();
        assert_eq!(analysis.performance_trend, Trend::Unknown);
        assert_eq!(analysis.recent_average, None);

        let analysis: PerformanceAnalysis = serde_json::from_str(
            r#"{"average_score": 88.5, "total_courses": 4,
                "performance_trend": "improving", "recent_average": 94.0,
                "recommendations": []}"#,
        )
        .unwrap();
        assert_eq!(analysis.performance_trend, Trend::Improving);
        assert_eq!(analysis.level(), PerformanceLevel::Good);
    }

    #[test]
    fn test_performance_levels() {
        assert_eq!(PerformanceLevel::from_average(95.0), PerformanceLevel::Excellent);
        assert_eq!(PerformanceLevel::from_average(90.0), PerformanceLevel::Excellent);
        assert_eq!(PerformanceLevel::from_average(79.99), PerformanceLevel::Fair);
        assert_eq!(PerformanceLevel::from_average(12.0), PerformanceLevel::NeedsImprovement);
    }

    #[test]
    fn test_advice_without_optional_sections() {
        let json = r#"{
            "student_name": "张三",
            "course_name": "Machine Learning",
            "advice_result": {
                "advice": "Review linear algebra first.",
                "difficulty_assessment": "medium",
                "estimated_study_time": "8-12 hours per week",
                "success_probability": 0.8
            }
        }"#;
        let advice: AdviceResponse = serde_json::from_str(json).unwrap();
        assert!(advice.advice_result.plan().is_empty());
        assert!(advice.advice_result.resources().is_empty());
        assert_eq!(percent(advice.advice_result.success_probability), "80%");
    }

    #[test]
    fn test_resource_type_field() {
        let json = r#"{"title": "Course textbook", "description": "Chapter 1-3",
                       "type": "book", "priority": "high"}"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.kind, "book");
        assert_eq!(resource.priority, "high");
    }

    #[test]
    fn test_course_info_without_id() {
        let json = r#"{"course_code": "CS5187", "course_name": "Vision",
                       "description": "", "objectives": ["See"], "topics": [],
                       "prerequisites": [], "assessment": []}"#;
        let course: Course = serde_json::from_str(json).unwrap();
        assert_eq!(course.id, "");
        assert_eq!(course.option_label(), "CS5187 - Vision");
    }
}
