//! Grouped amount rendering and Russian date formatting

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Month names in the genitive case, as used after a day-of-month numeral
const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// Genitive month name for a 1-based month number
pub fn month_name_genitive(month: u32) -> &'static str {
    let idx = (month.saturating_sub(1)) as usize;
    MONTHS_GENITIVE.get(idx).copied().unwrap_or("")
}

/// Compact business-document date: "05.01.2026"
pub fn format_date_compact(date: NaiveDate) -> String {
    format!(
        "{:02}.{:02}.{}",
        date.day(),
        date.month(),
        date.year()
    )
}

/// Long invoice date: "5 января 2026 г."
pub fn format_date_long(date: NaiveDate) -> String {
    format!(
        "{} {} {} г.",
        date.day(),
        month_name_genitive(date.month()),
        date.year()
    )
}

/// Render an amount as "20 000,00": space-grouped thousands, comma decimal
/// mark, exactly two fraction digits
pub fn format_amount(amount: Decimal) -> String {
    let minor = (amount * Decimal::from(100)).round().to_u64().unwrap_or(0);
    format!("{},{:02}", group_thousands(minor / 100), minor % 100)
}

/// Render the whole-ruble part of an amount as "20 000"
pub fn format_amount_whole(amount: Decimal) -> String {
    group_thousands(amount.trunc().to_u64().unwrap_or(0))
}

/// Group an integer into thousands with a space separator
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ' ');
        }
        result.insert(0, c);
    }

    result
}
