//! Date normalization for extracted license fields.
//!
//! Providers hand back dates as free text in whatever layout the card or
//! the model used. Each accepted layout is a row in `DATE_PATTERNS`; rows
//! are tried in order and the first that yields a date wins. A day past the
//! end of its month (`02/30/2024`) is pulled back to the month's last day.

use chrono::{Datelike, Months, NaiveDate};

use crate::models::FieldValue;

/// Component order of a date layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateOrder {
    Ymd,
    Mdy,
    Dmy,
}

/// One accepted layout: component order, separator and year width.
/// Month and day are always exactly two digits.
struct DatePattern {
    order: DateOrder,
    separator: char,
    year_digits: usize,
}

const fn date_pattern(order: DateOrder, separator: char, year_digits: usize) -> DatePattern {
    DatePattern {
        order,
        separator,
        year_digits,
    }
}

/// Accepted layouts, in priority order.
const DATE_PATTERNS: [DatePattern; 7] = [
    date_pattern(DateOrder::Ymd, '-', 4), // yyyy-MM-dd
    date_pattern(DateOrder::Mdy, '/', 4), // MM/dd/yyyy
    date_pattern(DateOrder::Mdy, '-', 4), // MM-dd-yyyy
    date_pattern(DateOrder::Mdy, '/', 2), // MM/dd/yy
    date_pattern(DateOrder::Mdy, '-', 2), // MM-dd-yy
    date_pattern(DateOrder::Dmy, '/', 4), // dd/MM/yyyy
    date_pattern(DateOrder::Dmy, '-', 4), // dd-MM-yyyy
];

/// Two-digit years land in 2000..=2099.
const TWO_DIGIT_YEAR_BASE: i32 = 2000;

impl DatePattern {
    fn parse(&self, input: &str) -> Option<NaiveDate> {
        let parts: Vec<&str> = input.split(self.separator).collect();
        if parts.len() != 3 {
            return None;
        }

        let (year, month, day) = match self.order {
            DateOrder::Ymd => (parts[0], parts[1], parts[2]),
            DateOrder::Mdy => (parts[2], parts[0], parts[1]),
            DateOrder::Dmy => (parts[2], parts[1], parts[0]),
        };

        let year = parse_fixed_width(year, self.year_digits)? as i32;
        let year = if self.year_digits == 2 {
            TWO_DIGIT_YEAR_BASE + year
        } else {
            year
        };
        let month = parse_fixed_width(month, 2)?;
        let day = parse_fixed_width(day, 2)?;
        if !(1..=31).contains(&day) {
            return None;
        }

        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        first.with_day(day.min(days_in_month(first)?))
    }
}

fn days_in_month(first: NaiveDate) -> Option<u32> {
    Some(first.checked_add_months(Months::new(1))?.pred_opt()?.day())
}

/// Parse an all-ASCII-digit component of exactly `width` characters.
fn parse_fixed_width(component: &str, width: usize) -> Option<u32> {
    if component.len() != width || !component.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    component.parse().ok()
}

/// Parse a free-form date string. Blank or unrecognized input yields `None`.
pub fn parse_date_str(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_PATTERNS.iter().find_map(|p| p.parse(trimmed))
}

/// Normalize an extracted value to a date. Typed dates pass through.
pub fn parse_date(value: &FieldValue) -> Option<NaiveDate> {
    match value {
        FieldValue::Date(d) => Some(*d),
        FieldValue::Text(s) => parse_date_str(s),
    }
}
