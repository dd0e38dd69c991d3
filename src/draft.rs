// Mutable booking form state: the selected stay dates and the contact fields
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("Check-in {check_in} is before today ({today})")]
    CheckInInPast { check_in: NaiveDate, today: NaiveDate },

    #[error("Check-out {check_out} is before check-in {check_in}")]
    CheckOutBeforeCheckIn {
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    },
}

// Check-in/check-out pair as picked in the date range picker. Either end stays
// empty until the user picks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a range the way the date picker allows it: check-in may not be
    /// earlier than `today`, and check-out may not precede check-in.
    pub fn select(
        check_in: Option<DateTime<Utc>>,
        check_out: Option<DateTime<Utc>>,
        today: NaiveDate,
    ) -> Result<Self, DateRangeError> {
        if let Some(start) = check_in {
            if start.date_naive() < today {
                return Err(DateRangeError::CheckInInPast {
                    check_in: start.date_naive(),
                    today,
                });
            }
        }

        if let (Some(start), Some(end)) = (check_in, check_out) {
            if start > end {
                return Err(DateRangeError::CheckOutBeforeCheckIn {
                    check_in: start,
                    check_out: end,
                });
            }
        }

        Ok(Self {
            check_in,
            check_out,
        })
    }

    // Midnight-to-midnight range, as produced by a day picker
    pub fn from_days(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            check_in: Some(start_of_day(check_in)),
            check_out: Some(start_of_day(check_out)),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.check_in.is_some() && self.check_out.is_some()
    }

    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.check_in?, self.check_out?))
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }
}

pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

// Raw form fields. Guest count is kept as typed; the price calculator and the
// submission client parse it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookingDraft {
    pub full_name: String,
    pub phone: String,
    pub guests: String,
    pub dates: DateRange,
}

impl BookingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.full_name.is_empty()
            && self.phone.is_empty()
            && self.guests.is_empty()
            && self.dates == DateRange::empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
