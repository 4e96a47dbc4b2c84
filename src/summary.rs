use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::HashMap;

use crate::clock::trailing_window;
use crate::habit::{CompletionLog, Habit, LogStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
    pub percent: u32,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitDayEntry {
    pub habit_id: String,
    pub title: String,
    pub emoji: Option<String>,
    /// `pending` when nothing was logged
    pub status: LogStatus,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekDay {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub habits: Vec<HabitDayEntry>,
    pub completed: u32,
    pub points: u32,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub days: Vec<WeekDay>,
    pub completed: u32,
    pub total: u32,
    pub points: u32,
    pub average_percent: u32,
}

type LogIndex<'a> = HashMap<(&'a str, NaiveDate), &'a CompletionLog>;

fn index_logs(logs: &[CompletionLog]) -> LogIndex<'_> {
    logs.iter()
        .map(|log| ((log.habit_id.as_str(), log.date), log))
        .collect()
}

fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (f64::from(part) / f64::from(whole) * 100.0).round() as u32
}

fn active(habits: &[Habit]) -> impl Iterator<Item = &Habit> {
    habits.iter().filter(|habit| habit.is_active())
}

fn summarize_day(date: NaiveDate, habits: &[Habit], index: &LogIndex<'_>) -> DaySummary {
    let mut total = 0;
    let mut completed = 0;
    let mut points = 0;

    for habit in active(habits) {
        total += 1;
        if let Some(log) = index.get(&(habit.id.as_str(), date)) {
            points += log.points;
            if log.status == LogStatus::Success {
                completed += 1;
            }
        }
    }

    DaySummary {
        date,
        total,
        completed,
        pending: total - completed,
        percent: percent(completed, total),
        points,
    }
}

/// Completed versus scheduled habits for one day; only logs of active `habits` count
pub fn daily_summary(date: NaiveDate, habits: &[Habit], logs: &[CompletionLog]) -> DaySummary {
    summarize_day(date, habits, &index_logs(logs))
}

/// One summary per day for the `days` days ending at `end`, oldest first
pub fn trailing_days_summary(
    end: NaiveDate,
    days: u32,
    habits: &[Habit],
    logs: &[CompletionLog],
) -> Vec<DaySummary> {
    let index = index_logs(logs);
    let mut summaries: Vec<DaySummary> = trailing_window(end, days)
        .map(|date| summarize_day(date, habits, &index))
        .collect();
    summaries.reverse();
    summaries
}

/// Monday of the week containing `day`
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Per-habit outcomes for the seven days starting at `week_start`
pub fn weekly_summary(
    week_start: NaiveDate,
    habits: &[Habit],
    logs: &[CompletionLog],
) -> WeeklySummary {
    let index = index_logs(logs);
    let habit_count = active(habits).count() as u32;

    let days: Vec<WeekDay> = (0..7)
        .map(|offset| {
            let date = week_start + Duration::days(offset);
            let entries: Vec<HabitDayEntry> = active(habits)
                .map(|habit| {
                    let log = index.get(&(habit.id.as_str(), date));
                    HabitDayEntry {
                        habit_id: habit.id.clone(),
                        title: habit.title.clone(),
                        emoji: habit.emoji.clone(),
                        status: log.map(|log| log.status).unwrap_or(LogStatus::Pending),
                        points: log.map(|log| log.points).unwrap_or_default(),
                    }
                })
                .collect();

            let completed = entries
                .iter()
                .filter(|entry| entry.status == LogStatus::Success)
                .count() as u32;
            let points = entries.iter().map(|entry| entry.points).sum();

            WeekDay {
                date,
                weekday: date.weekday(),
                habits: entries,
                completed,
                points,
                percent: percent(completed, habit_count),
            }
        })
        .collect();

    let completed = days.iter().map(|day| day.completed).sum();
    let points = days.iter().map(|day| day.points).sum();
    let total = habit_count * 7;

    WeeklySummary {
        week_start,
        days,
        completed,
        total,
        points,
        average_percent: percent(completed, total),
    }
}
