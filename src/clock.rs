use once_cell::sync::Lazy;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::state::{DateFormat, Day, TimeFormat};

const TIME_12H: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:none]:[minute]:[second] [period]");
const TIME_24H: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
const DATE_MONTH: &[FormatItem<'static>] =
    format_description!("[weekday], [month repr:long] [day padding:none], [year]");
const DATE_MM_DD: &[FormatItem<'static>] = format_description!("[month]/[day]/[year]");
const DATE_DD_MM: &[FormatItem<'static>] = format_description!("[day]/[month]/[year]");

/// Resolved once; the lookup can fail after other threads have started.
static LOCAL_OFFSET: Lazy<UtcOffset> = Lazy::new(|| {
    UtcOffset::current_local_offset().unwrap_or_else(|err| {
        tracing::warn!(?err, "local UTC offset unavailable, using UTC");
        UtcOffset::UTC
    })
});

/// Forces the local offset lookup. Call before spawning threads.
pub fn init_local_offset() -> UtcOffset {
    *LOCAL_OFFSET
}

pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(*LOCAL_OFFSET)
}

pub fn today_local() -> Day {
    Day::new(now_local().date())
}

pub fn format_time(now: OffsetDateTime, format: TimeFormat) -> String {
    let description = match format {
        TimeFormat::TwelveHour => TIME_12H,
        TimeFormat::TwentyFourHour => TIME_24H,
    };
    now.format(description).unwrap_or_default()
}

pub fn format_date(now: OffsetDateTime, format: DateFormat) -> String {
    let description = match format {
        DateFormat::Month => DATE_MONTH,
        DateFormat::MonthDay => DATE_MM_DD,
        DateFormat::DayMonth => DATE_DD_MM,
    };
    now.format(description).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn time_formats() {
        let afternoon = datetime!(2024-01-02 15:07:09 UTC);
        assert_eq!(format_time(afternoon, TimeFormat::TwelveHour), "3:07:09 PM");
        assert_eq!(format_time(afternoon, TimeFormat::TwentyFourHour), "15:07:09");

        let just_after_midnight = datetime!(2024-01-02 00:05:00 UTC);
        assert_eq!(
            format_time(just_after_midnight, TimeFormat::TwelveHour),
            "12:05:00 AM"
        );
        assert_eq!(
            format_time(just_after_midnight, TimeFormat::TwentyFourHour),
            "00:05:00"
        );
    }

    #[test]
    fn date_formats() {
        let now = datetime!(2024-01-02 09:00:00 UTC);
        assert_eq!(format_date(now, DateFormat::Month), "Tuesday, January 2, 2024");
        assert_eq!(format_date(now, DateFormat::MonthDay), "01/02/2024");
        assert_eq!(format_date(now, DateFormat::DayMonth), "02/01/2024");
    }
}
