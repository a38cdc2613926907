//! Working-day arithmetic and holiday/weekend policy (component A).

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holiday {
    pub name: String,
    pub date: NaiveDate,
    /// Recurring holidays match on (month, day) every year the schedule spans.
    pub recurring: bool,
}

impl Holiday {
    pub fn once(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
            recurring: false,
        }
    }

    pub fn recurring(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
            recurring: true,
        }
    }

    fn covers(&self, date: NaiveDate) -> bool {
        if self.recurring {
            self.date.month() == date.month() && self.date.day() == date.day()
        } else {
            self.date == date
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExceptionType {
    /// A working day that would normally be non-working (e.g. a Saturday shift).
    Working,
    /// A non-working day that would normally be working.
    NonWorking,
    /// Working for occupancy purposes, but consumes only half a working day of duration.
    HalfDay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarException {
    pub date: NaiveDate,
    pub exception_type: ExceptionType,
}

/// Working-day arithmetic, holiday/weekend policy, and the project origin date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub current_date: NaiveDate,
    pub working_days: Vec<Weekday>,
    pub holidays: Vec<Holiday>,
    pub exceptions: Vec<CalendarException>,
}

impl Calendar {
    pub fn new(current_date: NaiveDate) -> Self {
        Self {
            current_date,
            working_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            holidays: Vec::new(),
            exceptions: Vec::new(),
        }
    }

    pub fn with_holidays(mut self, holidays: Vec<Holiday>) -> Self {
        self.holidays = holidays;
        self
    }

    pub fn with_working_days(mut self, working_days: Vec<Weekday>) -> Self {
        self.working_days = working_days;
        self
    }

    pub fn with_exceptions(mut self, exceptions: Vec<CalendarException>) -> Self {
        self.exceptions = exceptions;
        self
    }

    fn exception_on(&self, date: NaiveDate) -> Option<ExceptionType> {
        self.exceptions
            .iter()
            .find(|e| e.date == date)
            .map(|e| e.exception_type)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.iter().any(|h| h.covers(date))
    }

    /// Working mask AND NOT holiday, with per-date exceptions taking priority.
    pub fn is_work_day(&self, date: NaiveDate) -> bool {
        match self.exception_on(date) {
            Some(ExceptionType::Working) | Some(ExceptionType::HalfDay) => true,
            Some(ExceptionType::NonWorking) => false,
            None => self.working_days.contains(&date.weekday()) && !self.is_holiday(date),
        }
    }

    /// Fraction of a full working day this date contributes toward duration
    /// consumption: 0 for non-working days, 0.5 for half-day exceptions, 1 otherwise.
    pub fn day_fraction(&self, date: NaiveDate) -> f64 {
        if !self.is_work_day(date) {
            return 0.0;
        }
        if matches!(self.exception_on(date), Some(ExceptionType::HalfDay)) {
            0.5
        } else {
            1.0
        }
    }

    /// Raw calendar-day arithmetic, ignoring the working-day mask entirely.
    pub fn add_calendar_days(&self, date: NaiveDate, n: i64) -> NaiveDate {
        date + chrono::Duration::days(n)
    }

    /// Advances `date` by `n` working days (backward if `n < 0`), skipping
    /// non-working days. Half-day exceptions count as a fractional day.
    /// `n = 0` returns `date` unchanged.
    pub fn add_workdays(&self, date: NaiveDate, n: f64) -> NaiveDate {
        if n == 0.0 {
            return date;
        }
        let forward = n > 0.0;
        let mut remaining = n.abs();
        let mut current = date;
        // Generous bound: even a daily half-day cadence converges well inside this.
        let max_iterations = (remaining * 4.0) as i64 + 3650;
        let mut iterations = 0i64;

        while remaining > 1e-9 && iterations < max_iterations {
            current = if forward {
                current.succ_opt().unwrap_or(current)
            } else {
                current.pred_opt().unwrap_or(current)
            };
            remaining -= self.day_fraction(current);
            iterations += 1;
        }
        current
    }

    pub fn next_work_day(&self, date: NaiveDate) -> NaiveDate {
        let mut next = date;
        for _ in 0..3650 {
            next = next.succ_opt().unwrap_or(next);
            if self.is_work_day(next) {
                return next;
            }
        }
        date
    }

    /// Number of working days in the half-open interval `[start, end)`,
    /// honoring half-day exceptions.
    pub fn working_days_between(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        let mut current = start;
        let mut total = 0.0;
        while current < end {
            total += self.day_fraction(current);
            current = current.succ_opt().unwrap_or(current);
            if current == start {
                break; // overflow guard
            }
        }
        total
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
    }
}
