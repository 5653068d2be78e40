use crate::models::{CategorySlice, HeatmapDay, StatsResponse, StatsSummary, StudyLog};
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const HEATMAP_DAYS: i64 = 365;
pub const RECENT_LIMIT: usize = 10;

const PALETTE: [&str; 8] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
];

pub fn build_stats(logs: &[StudyLog]) -> StatsResponse {
    build_stats_at(Local::now().date_naive(), logs)
}

pub fn build_stats_at(today: NaiveDate, logs: &[StudyLog]) -> StatsResponse {
    let total = total_minutes(logs);
    let week = weekly_minutes(logs, today);

    StatsResponse {
        today,
        summary: StatsSummary {
            total_minutes: total,
            week_minutes: week,
            consecutive_days: consecutive_days(logs, today),
            study_days: study_days(logs),
            week_start: week_start(today),
            total_label: format_duration(total),
            week_label: format_duration(week),
        },
        heatmap: heatmap(logs, today),
        categories: category_breakdown(logs),
        recent: recent_logs(logs, RECENT_LIMIT),
    }
}

/// Renders minutes as `H時間M分`, dropping whichever part is zero.
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{m}分"),
        (h, 0) => format!("{h}時間"),
        (h, m) => format!("{h}時間{m}分"),
    }
}

pub fn total_minutes(logs: &[StudyLog]) -> u32 {
    logs.iter().fold(0u32, |acc, log| acc.saturating_add(log.duration))
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn weekly_minutes(logs: &[StudyLog], today: NaiveDate) -> u32 {
    let start = week_start(today);
    logs.iter()
        .filter(|log| log.date >= start)
        .fold(0u32, |acc, log| acc.saturating_add(log.duration))
}

/// Days in a row, ending today, with at least one log.
pub fn consecutive_days(logs: &[StudyLog], today: NaiveDate) -> u32 {
    let dates: BTreeSet<NaiveDate> = logs.iter().map(|log| log.date).collect();

    let mut streak = 0;
    let mut check = today;
    while dates.contains(&check) {
        streak += 1;
        check -= Duration::days(1);
    }
    streak
}

pub fn study_days(logs: &[StudyLog]) -> u32 {
    logs.iter().map(|log| log.date).collect::<BTreeSet<_>>().len() as u32
}

pub fn heat_level(minutes: u32) -> u8 {
    match minutes {
        0 => 0,
        1..60 => 1,
        60..120 => 2,
        120..180 => 3,
        _ => 4,
    }
}

/// Trailing year ending today, chunked into columns of seven days.
pub fn heatmap(logs: &[StudyLog], today: NaiveDate) -> Vec<Vec<HeatmapDay>> {
    let mut per_day: HashMap<NaiveDate, u32> = HashMap::new();
    for log in logs {
        let entry = per_day.entry(log.date).or_default();
        *entry = entry.saturating_add(log.duration);
    }

    let days: Vec<HeatmapDay> = (0..HEATMAP_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let minutes = per_day.get(&date).copied().unwrap_or(0);
            HeatmapDay {
                date,
                minutes,
                level: heat_level(minutes),
            }
        })
        .collect();

    days.chunks(7).map(<[HeatmapDay]>::to_vec).collect()
}

pub fn category_breakdown(logs: &[StudyLog]) -> Vec<CategorySlice> {
    let mut sums: BTreeMap<&str, u32> = BTreeMap::new();
    for log in logs {
        let entry = sums.entry(log.category.as_str()).or_default();
        *entry = entry.saturating_add(log.duration);
    }

    let total: u64 = sums.values().map(|&m| u64::from(m)).sum();
    let mut entries: Vec<(&str, u32)> = sums.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    entries
        .into_iter()
        .enumerate()
        .map(|(index, (name, minutes))| CategorySlice {
            name: name.to_string(),
            minutes,
            percent: if total == 0 {
                0
            } else {
                ((u64::from(minutes) * 100 + total / 2) / total) as u32
            },
            color: PALETTE[index % PALETTE.len()],
        })
        .collect()
}

pub fn recent_logs(logs: &[StudyLog], limit: usize) -> Vec<StudyLog> {
    let mut sorted = logs.to_vec();
    sort_newest_first(&mut sorted);
    sorted.truncate(limit);
    sorted
}

pub fn sort_newest_first(logs: &mut [StudyLog]) {
    logs.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn log(date: NaiveDate, category: &str, duration: u32) -> StudyLog {
        StudyLog {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            date,
            category: category.to_string(),
            duration,
            content: String::new(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn format_duration_drops_zero_parts() {
        assert_eq!(format_duration(0), "0分");
        assert_eq!(format_duration(45), "45分");
        assert_eq!(format_duration(90), "1時間30分");
        assert_eq!(format_duration(120), "2時間");
    }

    #[test]
    fn streak_is_zero_without_logs() {
        assert_eq!(consecutive_days(&[], day(2026, 1, 7)), 0);
    }

    #[test]
    fn streak_counts_trailing_days_and_stops_at_gap() {
        let today = day(2026, 1, 7);
        let logs = vec![
            log(today, "数学", 30),
            log(today, "英語", 10),
            log(day(2026, 1, 6), "数学", 30),
            log(day(2026, 1, 5), "数学", 30),
            log(day(2026, 1, 3), "数学", 30),
        ];
        assert_eq!(consecutive_days(&logs, today), 3);
    }

    #[test]
    fn streak_is_zero_when_today_missing() {
        let today = day(2026, 1, 7);
        let logs = vec![log(day(2026, 1, 6), "数学", 30)];
        assert_eq!(consecutive_days(&logs, today), 0);
    }

    #[test]
    fn weekly_total_starts_on_monday() {
        // 2026-01-07 is a Wednesday.
        let today = day(2026, 1, 7);
        assert_eq!(week_start(today), day(2026, 1, 5));
        let logs = vec![
            log(day(2026, 1, 4), "数学", 100),
            log(day(2026, 1, 5), "数学", 20),
            log(day(2026, 1, 7), "英語", 15),
        ];
        assert_eq!(weekly_minutes(&logs, today), 35);
    }

    #[test]
    fn week_start_of_sunday_is_previous_monday() {
        assert_eq!(week_start(day(2026, 1, 11)), day(2026, 1, 5));
        assert_eq!(week_start(day(2026, 1, 5)), day(2026, 1, 5));
    }

    #[test]
    fn heat_level_thresholds() {
        assert_eq!(heat_level(0), 0);
        assert_eq!(heat_level(1), 1);
        assert_eq!(heat_level(59), 1);
        assert_eq!(heat_level(60), 2);
        assert_eq!(heat_level(119), 2);
        assert_eq!(heat_level(120), 3);
        assert_eq!(heat_level(179), 3);
        assert_eq!(heat_level(180), 4);
        assert_eq!(heat_level(600), 4);
    }

    #[test]
    fn heatmap_covers_trailing_year() {
        let today = day(2026, 1, 7);
        let logs = vec![log(today, "数学", 50), log(today, "英語", 20)];
        let weeks = heatmap(&logs, today);

        assert_eq!(weeks.len(), 53);
        let days: Vec<&HeatmapDay> = weeks.iter().flatten().collect();
        assert_eq!(days.len(), 365);
        assert_eq!(days[0].date, today - Duration::days(364));
        let last = days.last().unwrap();
        assert_eq!(last.date, today);
        assert_eq!(last.minutes, 70);
        assert_eq!(last.level, 2);
    }

    #[test]
    fn category_breakdown_is_order_independent() {
        let a = vec![
            log(day(2026, 1, 1), "数学", 30),
            log(day(2026, 1, 2), "英語", 60),
            log(day(2026, 1, 3), "数学", 30),
        ];
        let mut b = a.clone();
        b.reverse();

        let first = category_breakdown(&a);
        assert_eq!(first, category_breakdown(&b));
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].minutes, 60);
        assert_eq!(first[1].minutes, 60);
        assert_eq!(first.iter().map(|s| s.percent).sum::<u32>(), 100);
    }

    #[test]
    fn category_breakdown_of_empty_is_empty() {
        assert!(category_breakdown(&[]).is_empty());
    }

    #[test]
    fn recent_logs_are_newest_first_and_limited() {
        let logs: Vec<StudyLog> = (1..=12).map(|d| log(day(2026, 1, d), "数学", 10)).collect();
        let recent = recent_logs(&logs, RECENT_LIMIT);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].date, day(2026, 1, 12));
        assert_eq!(recent[9].date, day(2026, 1, 3));
    }

    #[test]
    fn build_stats_summarises_everything() {
        let today = day(2026, 1, 7);
        let logs = vec![
            log(today, "数学", 90),
            log(day(2026, 1, 6), "英語", 30),
            log(day(2025, 12, 1), "読書", 60),
        ];
        let stats = build_stats_at(today, &logs);
        assert_eq!(stats.summary.total_minutes, 180);
        assert_eq!(stats.summary.total_label, "3時間");
        assert_eq!(stats.summary.week_minutes, 120);
        assert_eq!(stats.summary.week_label, "2時間");
        assert_eq!(stats.summary.consecutive_days, 2);
        assert_eq!(stats.summary.study_days, 3);
        assert_eq!(stats.categories.len(), 3);
        assert_eq!(stats.recent.len(), 3);
    }
}
