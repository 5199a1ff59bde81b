//! Russian Text - Russian business document text formatting
//!
//! This crate provides:
//! - Russian numerals in words (один, два, три...)
//! - Currency amounts in words with ruble/kopeck declension
//! - Thousands-grouped amount rendering ("20 000,00")
//! - Russian date formatting (compact and long month-name styles)
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use ru_text::{amount_in_words, format_amount};
//!
//! let price = Decimal::new(2000000, 2); // 20000.00
//! assert_eq!(amount_in_words(price), "двадцать тысяч рублей");
//! assert_eq!(format_amount(price), "20 000,00");
//! ```

mod formatter;
mod numerals;

pub use formatter::{
    format_amount, format_amount_whole, format_date_compact, format_date_long,
    month_name_genitive,
};
pub use numerals::{
    amount_in_words, amount_in_words_with_kopecks, kopeck_word, number_to_words, ruble_word,
};

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_number_to_words() {
        assert_eq!(number_to_words(0), "ноль");
        assert_eq!(number_to_words(1), "один");
        assert_eq!(number_to_words(21), "двадцать один");
        assert_eq!(number_to_words(1000), "одна тысяча");
    }

    #[test]
    fn test_amount_in_words() {
        assert_eq!(
            amount_in_words(Decimal::new(2000000, 2)),
            "двадцать тысяч рублей"
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(123456, 2)), "1 234,56");
    }
}
