use crate::auth::{AuthError, CurrentUser};
use crate::errors::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::models::{
    CategoriesBody, CreatedResponse, LogInput, LoginRequest, LoginResponse, LogsResponse, SignupRequest,
    StatsQuery, StatsResponse, StudyLog, SuccessResponse, UserResponse, DEFAULT_CATEGORIES,
};
use crate::state::AppState;
use crate::stats::{build_stats, build_stats_at, sort_newest_first};
use crate::ui::render_index;
use crate::validation::{normalize_categories, validate_log};
use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

pub async fn index() -> Html<String> {
    Html(render_index())
}

pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::bad_request("メールアドレスとパスワードを入力してください"));
    }

    let user = state
        .auth
        .create_user(email, &payload.password, display_name(&payload.name))
        .await
        .map_err(|err| match err {
            AuthError::Rejected(message) => AppError::bad_request(message),
            other => AppError::internal("登録に失敗しました", other),
        })?;

    let defaults: Vec<String> = DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect();
    state.store.set(&categories_key(&user.id), &defaults).await?;

    info!(user_id = %user.id, "user signed up");
    Ok(Json(UserResponse { user }))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let session = state
        .auth
        .sign_in(payload.email.trim(), &payload.password)
        .await
        .map_err(|err| match err {
            AuthError::Rejected(message) => AppError::bad_request(message),
            other => AppError::internal("ログインに失敗しました", other),
        })?;

    Ok(Json(LoginResponse {
        access_token: session.access_token,
        user: session.user,
    }))
}

pub async fn get_user(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse { user })
}

pub async fn list_logs(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<LogsResponse>, AppError> {
    Ok(Json(LogsResponse {
        logs: load_logs(&state, &user.id).await?,
    }))
}

pub async fn create_log(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(payload): AppJson<LogInput>,
) -> Result<Json<CreatedResponse>, AppError> {
    let categories = load_categories(&state, &user.id).await?;
    let valid = validate_log(payload, &categories)?;

    let id = Uuid::new_v4();
    let log = StudyLog {
        id,
        user_id: user.id.clone(),
        date: valid.date,
        category: valid.category,
        duration: valid.duration,
        content: valid.content,
        created_at: Utc::now(),
        updated_at: None,
    };
    state.store.set(&log_key(&user.id, &id), &log).await?;

    info!(user_id = %user.id, log_id = %id, "study log created");
    Ok(Json(CreatedResponse { success: true, id }))
}

pub async fn update_log(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<LogInput>,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = parse_log_id(&id)?;
    let categories = load_categories(&state, &user.id).await?;
    let valid = validate_log(payload, &categories)?;

    let updated = state
        .store
        .update(&log_key(&user.id, &id), |log: StudyLog| StudyLog {
            date: valid.date,
            category: valid.category,
            duration: valid.duration,
            content: valid.content,
            updated_at: Some(Utc::now()),
            ..log
        })
        .await?;

    if updated.is_none() {
        return Err(AppError::not_found("ログが見つかりません"));
    }
    info!(user_id = %user.id, log_id = %id, "study log updated");
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn delete_log(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(Json(SuccessResponse { success: true }));
    };
    if state.store.delete(&log_key(&user.id, &id)).await? {
        info!(user_id = %user.id, log_id = %id, "study log deleted");
    }
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn get_categories(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CategoriesBody>, AppError> {
    Ok(Json(CategoriesBody {
        categories: load_categories(&state, &user.id).await?,
    }))
}

pub async fn put_categories(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(payload): AppJson<CategoriesBody>,
) -> Result<Json<SuccessResponse>, AppError> {
    let categories = normalize_categories(payload.categories)?;
    state.store.set(&categories_key(&user.id), &categories).await?;

    info!(user_id = %user.id, count = categories.len(), "categories replaced");
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn get_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppQuery(query): AppQuery<StatsQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let logs = load_logs(&state, &user.id).await?;
    let stats = match query.today {
        Some(today) => build_stats_at(today, &logs),
        None => build_stats(&logs),
    };
    Ok(Json(stats))
}

async fn load_logs(state: &AppState, user_id: &str) -> Result<Vec<StudyLog>, AppError> {
    let mut logs: Vec<StudyLog> = state.store.get_by_prefix(&format!("log:{user_id}:")).await?;
    sort_newest_first(&mut logs);
    Ok(logs)
}

async fn load_categories(state: &AppState, user_id: &str) -> Result<Vec<String>, AppError> {
    Ok(state.store.get::<Vec<String>>(&categories_key(user_id)).await?.unwrap_or_default())
}

fn display_name(raw: &str) -> Option<&str> {
    Some(raw.trim()).filter(|name| !name.is_empty())
}

fn parse_log_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found("ログが見つかりません"))
}

fn log_key(user_id: &str, log_id: &Uuid) -> String {
    format!("log:{user_id}:{log_id}")
}

fn categories_key(user_id: &str) -> String {
    format!("categories:{user_id}")
}
