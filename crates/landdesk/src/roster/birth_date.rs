use chrono::{Datelike, Local, NaiveDate};

/// Outcome of normalizing free-form birth date input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirthDateInput {
    /// Eight digits were present and named a real calendar date.
    Normalized(NaiveDate),
    /// Anything other than eight digits: the user is still typing, or the
    /// caller supplied an already-canonical value. The original text is kept
    /// untouched.
    Pending(String),
}

impl BirthDateInput {
    /// The value to show back in the field: canonical `YYYY-MM-DD` once a
    /// full date is recognized, the raw text otherwise.
    pub fn field_value(&self) -> String {
        match self {
            BirthDateInput::Normalized(date) => from_calendar(*date),
            BirthDateInput::Pending(raw) => raw.clone(),
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            BirthDateInput::Normalized(date) => Some(*date),
            BirthDateInput::Pending(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BirthDateError {
    #[error("올바른 날짜 형식이 아닙니다")]
    NotACalendarDate,
    #[error("년도는 1900년부터 {max}년 사이여야 합니다")]
    YearOutOfRange { year: i32, max: i32 },
    #[error("월은 01부터 12 사이여야 합니다")]
    MonthOutOfRange { month: u32 },
    #[error("일은 01부터 {max} 사이여야 합니다")]
    DayOutOfRange { day: u32, max: u32 },
}

/// Normalize `YYYYMMDD`-style input to a calendar date.
///
/// Separators are ignored, so `19910801`, `1991-08-01`, and `1991.08.01` all
/// normalize. Range checks run in order (year, month, day against the actual
/// month length), so an impossible day like Feb 30 reports the day range, not
/// a generic parse failure.
pub fn normalize_birth_date(input: &str) -> Result<BirthDateInput, BirthDateError> {
    normalize_birth_date_at(input, Local::now().date_naive())
}

/// Deterministic variant of [`normalize_birth_date`] for a fixed "today",
/// which bounds the accepted year range.
pub fn normalize_birth_date_at(
    input: &str,
    today: NaiveDate,
) -> Result<BirthDateInput, BirthDateError> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 8 {
        return Ok(BirthDateInput::Pending(input.to_string()));
    }

    let year: i32 = digits[..4].parse().map_err(|_| BirthDateError::NotACalendarDate)?;
    let month: u32 = digits[4..6].parse().map_err(|_| BirthDateError::NotACalendarDate)?;
    let day: u32 = digits[6..8].parse().map_err(|_| BirthDateError::NotACalendarDate)?;

    let max_year = today.year();
    if year < 1900 || year > max_year {
        return Err(BirthDateError::YearOutOfRange {
            year,
            max: max_year,
        });
    }

    if !(1..=12).contains(&month) {
        return Err(BirthDateError::MonthOutOfRange { month });
    }

    let max_day = days_in_month(year, month).ok_or(BirthDateError::MonthOutOfRange { month })?;
    if day < 1 || day > max_day {
        return Err(BirthDateError::DayOutOfRange { day, max: max_day });
    }

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(BirthDateError::DayOutOfRange { day, max: max_day })?;
    Ok(BirthDateInput::Normalized(date))
}

/// Canonical form for a concrete calendar selection (the picker path). No
/// digit parsing; a selected date is always representable.
pub fn from_calendar(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}
