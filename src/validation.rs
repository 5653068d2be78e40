use crate::errors::AppError;
use crate::models::LogInput;
use chrono::NaiveDate;

#[derive(Debug, PartialEq)]
pub struct ValidLog {
    pub date: NaiveDate,
    pub category: String,
    pub duration: u32,
    pub content: String,
}

/// Checks a log body against the owner's current category set.
pub fn validate_log(input: LogInput, categories: &[String]) -> Result<ValidLog, AppError> {
    let date = NaiveDate::parse_from_str(input.date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("日付は YYYY-MM-DD 形式で指定してください"))?;

    let category = input.category.trim().to_string();
    if category.is_empty() {
        return Err(AppError::bad_request("カテゴリを選択してください"));
    }
    if !categories.iter().any(|c| *c == category) {
        return Err(AppError::bad_request(format!("カテゴリ「{category}」は登録されていません")));
    }

    let duration = match input.duration {
        Some(total) => total,
        None => input
            .hours
            .unwrap_or(0)
            .checked_mul(60)
            .and_then(|m| m.checked_add(input.minutes.unwrap_or(0)))
            .ok_or_else(|| AppError::bad_request("学習時間が大きすぎます"))?,
    };

    Ok(ValidLog {
        date,
        category,
        duration,
        content: input.content,
    })
}

/// Trims entries and rejects blanks and duplicates, keeping order.
pub fn normalize_categories(raw: Vec<String>) -> Result<Vec<String>, AppError> {
    let mut categories: Vec<String> = Vec::with_capacity(raw.len());
    for entry in raw {
        let name = entry.trim();
        if name.is_empty() {
            return Err(AppError::bad_request("空のカテゴリは登録できません"));
        }
        if categories.iter().any(|c| c == name) {
            return Err(AppError::bad_request(format!("カテゴリ「{name}」が重複しています")));
        }
        categories.push(name.to_string());
    }
    Ok(categories)
}
