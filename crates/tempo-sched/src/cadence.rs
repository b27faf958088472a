//! Calendar arithmetic for each period.
//!
//! A [`Cadence`] pairs a [`Period`] with its validated fire time, so an
//! hourly schedule can never carry an `HH:MM` time and a weekly schedule
//! always has a weekday.

use crate::period::Period;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};
use tempo_core::{Result, TempoError};
use tracing::warn;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Daily { hour: u32, minute: u32 },
    Weekly { weekday: Weekday, hour: u32, minute: u32 },
    /// First day of every month.
    Monthly { hour: u32, minute: u32 },
    /// `minute` past every hour.
    Hourly { minute: u32 },
    /// `second` past every minute.
    Minutely { second: u32 },
}

impl Cadence {
    /// Validate the fire time for `period`.
    ///
    /// Daily, weekly and monthly schedules take `HH:MM`; hourly and minutely
    /// schedules take a bare offset `0..=59`. `weekday` (0 = Monday) is
    /// required for weekly schedules and ignored otherwise.
    pub fn parse(period: Period, at: &str, weekday: Option<u32>) -> Result<Self> {
        match period {
            Period::Daily => {
                let (hour, minute) = parse_clock(at)?;
                Ok(Self::Daily { hour, minute })
            }
            Period::Weekly => {
                let (hour, minute) = parse_clock(at)?;
                let weekday = match weekday {
                    None => return Err(TempoError::MissingWeekday),
                    Some(day) => *WEEKDAYS
                        .get(day as usize)
                        .ok_or(TempoError::InvalidWeekday(day))?,
                };
                Ok(Self::Weekly {
                    weekday,
                    hour,
                    minute,
                })
            }
            Period::Monthly => {
                let (hour, minute) = parse_clock(at)?;
                Ok(Self::Monthly { hour, minute })
            }
            Period::Hourly => Ok(Self::Hourly {
                minute: parse_offset(at)?,
            }),
            Period::Minutely => Ok(Self::Minutely {
                second: parse_offset(at)?,
            }),
        }
    }

    pub fn period(&self) -> Period {
        match self {
            Self::Daily { .. } => Period::Daily,
            Self::Weekly { .. } => Period::Weekly,
            Self::Monthly { .. } => Period::Monthly,
            Self::Hourly { .. } => Period::Hourly,
            Self::Minutely { .. } => Period::Minutely,
        }
    }

    /// First fire time strictly after `now`.
    ///
    /// Past the end of the calendar the result saturates at
    /// `NaiveDateTime::MAX`, which never fires.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.try_next_after(now).unwrap_or_else(|| {
            warn!(cadence = ?self, now = %now, "Calendar arithmetic failed, falling back to daily");
            now.checked_add_signed(Duration::days(1))
                .unwrap_or(NaiveDateTime::MAX)
        })
    }

    /// Fire time following `fired`, one nominal period later.
    ///
    /// Daily, weekly, hourly and minutely schedules advance by a fixed
    /// amount. Monthly schedules advance to the first of the following
    /// month.
    pub fn advance(&self, fired: NaiveDateTime) -> NaiveDateTime {
        let next = match self {
            Self::Daily { .. } => fired.checked_add_signed(Duration::days(1)),
            Self::Weekly { .. } => fired.checked_add_signed(Duration::days(7)),
            Self::Monthly { hour, minute } => monthly(fired, *hour, *minute)
                .or_else(|| fired.checked_add_signed(Duration::days(30))),
            Self::Hourly { .. } => fired.checked_add_signed(Duration::hours(1)),
            Self::Minutely { .. } => fired.checked_add_signed(Duration::minutes(1)),
        };
        next.unwrap_or_else(|| {
            warn!(
                cadence = ?self,
                fired = %fired,
                "Next fire time is past the end of the calendar"
            );
            NaiveDateTime::MAX
        })
    }

    fn try_next_after(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match *self {
            Self::Daily { hour, minute } => daily(now, hour, minute),
            Self::Weekly {
                weekday,
                hour,
                minute,
            } => {
                let days_ahead = (weekday.num_days_from_monday() + 7
                    - now.weekday().num_days_from_monday())
                    % 7;
                let candidate = now
                    .date()
                    .checked_add_signed(Duration::days(i64::from(days_ahead)))?
                    .and_hms_opt(hour, minute, 0)?;
                roll(candidate, now, Duration::days(7))
            }
            Self::Monthly { hour, minute } => {
                monthly(now, hour, minute).or_else(|| daily(now, hour, minute))
            }
            Self::Hourly { minute } => {
                let candidate = now.date().and_hms_opt(now.hour(), minute, 0)?;
                roll(candidate, now, Duration::hours(1))
            }
            Self::Minutely { second } => {
                let candidate = now.date().and_hms_opt(now.hour(), now.minute(), second)?;
                roll(candidate, now, Duration::minutes(1))
            }
        }
    }
}

/// `candidate` if it is still ahead of `now`, otherwise one `step` later.
fn roll(candidate: NaiveDateTime, now: NaiveDateTime, step: Duration) -> Option<NaiveDateTime> {
    if candidate > now {
        Some(candidate)
    } else {
        candidate.checked_add_signed(step)
    }
}

fn daily(now: NaiveDateTime, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    let today = now.date().and_hms_opt(hour, minute, 0)?;
    roll(today, now, Duration::days(1))
}

fn monthly(now: NaiveDateTime, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    let this_month =
        NaiveDate::from_ymd_opt(now.year(), now.month(), 1)?.and_hms_opt(hour, minute, 0)?;
    if this_month > now {
        return Some(this_month);
    }
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(hour, minute, 0)
}

fn parse_clock(at: &str) -> Result<(u32, u32)> {
    let invalid = || TempoError::InvalidTimeFormat(format!("'{at}' (expected HH:MM)"));
    let (hour, minute) = at.trim().split_once(':').ok_or_else(invalid)?;
    let hour = parse_field(hour, 23).ok_or_else(invalid)?;
    let minute = parse_field(minute, 59).ok_or_else(invalid)?;
    Ok((hour, minute))
}

fn parse_offset(at: &str) -> Result<u32> {
    parse_field(at.trim(), 59)
        .ok_or_else(|| TempoError::InvalidTimeFormat(format!("'{at}' (expected an offset 0-59)")))
}

/// One or two ASCII digits, at most `max`.
fn parse_field(field: &str, max: u32) -> Option<u32> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok().filter(|value| *value <= max)
}
