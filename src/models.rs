use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_CATEGORIES: [&str; 4] = ["数学", "英語", "プログラミング", "読書"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudyLog {
    pub id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    pub category: String,
    pub duration: u32,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of create and update requests. Duration may come in as total
/// minutes or split into the dialog's hour and minute fields.
#[derive(Debug, Clone, Deserialize)]
pub struct LogInput {
    pub date: String,
    pub category: String,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub hours: Option<u32>,
    #[serde(default)]
    pub minutes: Option<u32>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub logs: Vec<StudyLog>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesBody {
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub minutes: u32,
    pub level: u8,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CategorySlice {
    pub name: String,
    pub minutes: u32,
    pub percent: u32,
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_minutes: u32,
    pub week_minutes: u32,
    pub consecutive_days: u32,
    pub study_days: u32,
    pub week_start: NaiveDate,
    pub total_label: String,
    pub week_label: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub today: NaiveDate,
    pub summary: StatsSummary,
    pub heatmap: Vec<Vec<HeatmapDay>>,
    pub categories: Vec<CategorySlice>,
    pub recent: Vec<StudyLog>,
}
