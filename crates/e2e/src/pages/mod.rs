//! Page objects
//!
//! One struct per screen of the booking app. A page object knows its
//! locators and the copy it expects in each locale; action methods perform
//! the interaction and return the page the app moves to. Where the app can
//! go to different screens from one form, each destination has its own
//! method.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use ftts_common::Locale;

/// Declares a page struct and its [`crate::graph::Page`] impl
macro_rules! page {
    ($(#[$meta:meta])* $name:ident, $id:ident, $path:expr, $heading:expr, $en:expr, $cy:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            locale: ftts_common::Locale,
        }

        impl crate::graph::Page for $name {
            const ID: crate::graph::PageId = crate::graph::PageId::$id;
            const PATH: &'static str = $path;
            const HEADING: &'static str = $heading;

            fn at(locale: ftts_common::Locale) -> Self {
                Self { locale }
            }

            fn locale(&self) -> ftts_common::Locale {
                self.locale
            }

            fn heading(locale: ftts_common::Locale) -> &'static str {
                locale.pick($en, $cy)
            }
        }
    };
}

pub mod booking;
pub mod manage;
pub mod support;

pub use booking::*;
pub use manage::*;
pub use support::*;

pub const CONTINUE: &str = "#continue-button";
pub const ERROR_SUMMARY: &str = ".govuk-error-summary";
pub const ERROR_SUMMARY_TITLE: &str = ".govuk-error-summary__title";
pub const BACK_LINK: &str = ".govuk-back-link";

pub fn error_summary_title(locale: Locale) -> &'static str {
    locale.pick("There is a problem", "Mae problem wedi codi")
}

/// Radio button or checkbox by input name and value
pub fn option(name: &str, value: &str) -> String {
    format!("input[name='{}'][value='{}']", name, value)
}

pub fn yes_no(answer: bool, locale: Locale) -> &'static str {
    match answer {
        true => locale.pick("Yes", "Ie"),
        false => locale.pick("No", "Na"),
    }
}

const WELSH_DAYS: [&str; 7] = [
    "Dydd Llun",
    "Dydd Mawrth",
    "Dydd Mercher",
    "Dydd Iau",
    "Dydd Gwener",
    "Dydd Sadwrn",
    "Dydd Sul",
];

const WELSH_MONTHS: [&str; 12] = [
    "Ionawr", "Chwefror", "Mawrth", "Ebrill", "Mai", "Mehefin", "Gorffennaf", "Awst", "Medi",
    "Hydref", "Tachwedd", "Rhagfyr",
];

/// Long date as the app renders it, e.g. `Monday 2 November 2026`
pub fn format_date(date: NaiveDate, locale: Locale) -> String {
    if locale.is_welsh() {
        let day = WELSH_DAYS[date.weekday().num_days_from_monday() as usize];
        let month = WELSH_MONTHS[date.month0() as usize];
        format!("{} {} {} {}", day, date.day(), month, date.year())
    } else {
        date.format("%A %-d %B %Y").to_string()
    }
}

/// Slot time as the app renders it, e.g. `9:00am` or `2:30pm`
pub fn format_time(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    format!("{}:{:02}{}", hour, time.minute(), if pm { "pm" } else { "am" })
}

/// `data-date` attribute value on the calendar
pub fn calendar_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `data-time` attribute value on the time slots
pub fn slot_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Locale::Gb, "Monday 2 November 2026" ; "english")]
    #[test_case(Locale::Ni, "Monday 2 November 2026" ; "northern ireland")]
    #[test_case(Locale::Cy, "Dydd Llun 2 Tachwedd 2026" ; "welsh")]
    fn test_format_date(locale: Locale, expected: &str) {
        let date = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
        assert_eq!(format_date(date, locale), expected);
    }

    #[test_case(9, 0, "9:00am")]
    #[test_case(12, 15, "12:15pm")]
    #[test_case(14, 30, "2:30pm")]
    fn test_format_time(hour: u32, minute: u32, expected: &str) {
        let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();
        assert_eq!(format_time(time), expected);
    }

    #[test]
    fn test_option_selector() {
        assert_eq!(option("testType", "car"), "input[name='testType'][value='car']");
    }

    #[test]
    fn test_yes_no() {
        assert_eq!(yes_no(true, Locale::Cy), "Ie");
        assert_eq!(yes_no(false, Locale::Gb), "No");
    }
}
