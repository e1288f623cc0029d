use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;

pub const OPENING_MINUTE: u32 = 9 * 60;
pub const CLOSING_MINUTE: u32 = 17 * 60;
pub const SLOT_MINUTES: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid date {0}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid time {0}, expected HH:MM")]
    InvalidTime(String),

    #[error("{0} is not a bookable slot")]
    OffGrid(String),
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDate(raw.to_string()))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, ScheduleError> {
    let raw_trimmed = raw.trim();
    NaiveTime::parse_from_str(raw_trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw_trimmed, "%H:%M:%S"))
        .map_err(|_| ScheduleError::InvalidTime(raw.to_string()))
}

pub fn parse_moment(date: &str, time: &str) -> Result<NaiveDateTime, ScheduleError> {
    Ok(parse_date(date)?.and_time(parse_time(time)?))
}

/// Half-hour consultation slots between opening and closing time.
pub fn slot_grid() -> Vec<NaiveTime> {
    (OPENING_MINUTE..CLOSING_MINUTE)
        .step_by(SLOT_MINUTES as usize)
        .filter_map(|minute| NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0))
        .collect()
}

pub fn is_on_grid(time: NaiveTime) -> bool {
    let minute = time.hour() * 60 + time.minute();
    time.second() == 0
        && (OPENING_MINUTE..CLOSING_MINUTE).contains(&minute)
        && (minute - OPENING_MINUTE) % SLOT_MINUTES == 0
}

pub fn free_slots(date: NaiveDate, taken: &[NaiveDateTime]) -> Vec<NaiveTime> {
    slot_grid()
        .into_iter()
        .filter(|slot| !taken.contains(&date.and_time(*slot)))
        .collect()
}

pub fn format_slot(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
