// src/form.rs
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
const DEFAULT_START_TIME: &str = "09:00";
const DEFAULT_END_TIME: &str = "18:00";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required fields are empty")]
    Incomplete,
    #[error("'{0}' is not a valid date or time")]
    InvalidDateTime(String),
    #[error("end {end} is not after start {start}")]
    EndNotAfterStart {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// The window during which the auto-reply is active. Start is always
/// strictly before end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeavePeriod {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl LeavePeriod {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::EndNotAfterStart { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

/// Raw user input, as typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub delegate_id: Option<u32>,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
}

/// A form whose fields are all present and parse, with a valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidForm {
    pub delegate_id: u32,
    pub period: LeavePeriod,
}

impl FormState {
    /// Start today, end a week later, office hours.
    pub fn with_defaults(today: NaiveDate) -> Self {
        let next_week = today + Duration::days(7);
        Self {
            delegate_id: None,
            start_date: today.format(DATE_FORMAT).to_string(),
            start_time: DEFAULT_START_TIME.to_string(),
            end_date: next_week.format(DATE_FORMAT).to_string(),
            end_time: DEFAULT_END_TIME.to_string(),
        }
    }

    /// Updates the start date, pulling the end date forward if it would
    /// otherwise fall before the new start.
    pub fn set_start_date(&mut self, value: String) {
        self.start_date = value;
        if let (Ok(start), Ok(end)) = (parse_date(&self.start_date), parse_date(&self.end_date)) {
            if end < start {
                debug!("End date {} moved up to start date {}", end, start);
                self.end_date = self.start_date.trim().to_string();
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.delegate_id.is_some()
            && [&self.start_date, &self.start_time, &self.end_date, &self.end_time]
                .iter()
                .all(|field| !field.trim().is_empty())
    }

    /// Both instants, without checking their order.
    pub fn instants(&self) -> Result<(NaiveDateTime, NaiveDateTime), ValidationError> {
        if !self.is_complete() {
            return Err(ValidationError::Incomplete);
        }
        let start = combine(&self.start_date, &self.start_time)?;
        let end = combine(&self.end_date, &self.end_time)?;
        Ok((start, end))
    }

    pub fn validate(&self) -> Result<ValidForm, ValidationError> {
        let (start, end) = self.instants()?;
        let delegate_id = self.delegate_id.ok_or(ValidationError::Incomplete)?;
        Ok(ValidForm {
            delegate_id,
            period: LeavePeriod::new(start, end)?,
        })
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDateTime(value.trim().to_string()))
}

fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| ValidationError::InvalidDateTime(value.trim().to_string()))
}

fn combine(date: &str, time: &str) -> Result<NaiveDateTime, ValidationError> {
    Ok(parse_date(date)?.and_time(parse_time(time)?))
}
