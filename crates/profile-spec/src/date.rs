use time::error::Parse;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::debug;

/// Display and input format of profile dates (`dd/mm/yyyy`).
pub const PROFILE_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]/[month]/[year]");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateIssue {
    /// Not shaped like `dd/mm/yyyy`.
    Format,
    /// Well formed, but not a calendar day (for example `31/02/2024`).
    Calendar,
}

pub fn parse_profile_date(text: &str) -> Result<Date, DateIssue> {
    let text = text.trim();
    // `[year]` also accepts signed and short years; keep the input strictly 2/2/4 digits.
    let shaped = text.len() == 10
        && text
            .char_indices()
            .all(|(idx, ch)| if idx == 2 || idx == 5 { ch == '/' } else { ch.is_ascii_digit() });
    if !shaped {
        return Err(DateIssue::Format);
    }
    Date::parse(text, PROFILE_DATE_FORMAT).map_err(|err| match err {
        Parse::TryFromParsed(_) => DateIssue::Calendar,
        _ => DateIssue::Format,
    })
}

pub fn format_profile_date(date: Date) -> String {
    format!(
        "{:02}/{:02}/{:04}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

/// The calendar date at the local offset, or the UTC date when the offset
/// cannot be determined (the `time` crate refuses it in multi-threaded processes
/// on some platforms).
pub fn today_local() -> Date {
    match OffsetDateTime::now_local() {
        Ok(now) => now.date(),
        Err(err) => {
            debug!(error = %err, "local offset unavailable, using UTC date");
            OffsetDateTime::now_utc().date()
        }
    }
}
