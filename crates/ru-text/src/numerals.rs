//! Russian numerals in words and currency declension

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Units 0-9, masculine (рубль, миллион)
const UNITS_MASCULINE: [&str; 10] = [
    "",
    "один",
    "два",
    "три",
    "четыре",
    "пять",
    "шесть",
    "семь",
    "восемь",
    "девять",
];

/// Units 0-9, feminine (тысяча, копейка)
const UNITS_FEMININE: [&str; 10] = [
    "",
    "одна",
    "две",
    "три",
    "четыре",
    "пять",
    "шесть",
    "семь",
    "восемь",
    "девять",
];

/// 10-19
const TEENS: [&str; 10] = [
    "десять",
    "одиннадцать",
    "двенадцать",
    "тринадцать",
    "четырнадцать",
    "пятнадцать",
    "шестнадцать",
    "семнадцать",
    "восемнадцать",
    "девятнадцать",
];

/// 20, 30, ... 90
const TENS: [&str; 10] = [
    "",
    "",
    "двадцать",
    "тридцать",
    "сорок",
    "пятьдесят",
    "шестьдесят",
    "семьдесят",
    "восемьдесят",
    "девяносто",
];

/// 100, 200, ... 900
const HUNDREDS: [&str; 10] = [
    "",
    "сто",
    "двести",
    "триста",
    "четыреста",
    "пятьсот",
    "шестьсот",
    "семьсот",
    "восемьсот",
    "девятьсот",
];

#[derive(Clone, Copy)]
enum Gender {
    Masculine,
    Feminine,
}

/// Thousand-group scale words: (one, few, many, gender of the counted
/// unit). Six entries cover the full u64 range.
const SCALES: [(&str, &str, &str, Gender); 6] = [
    ("тысяча", "тысячи", "тысяч", Gender::Feminine),
    ("миллион", "миллиона", "миллионов", Gender::Masculine),
    ("миллиард", "миллиарда", "миллиардов", Gender::Masculine),
    ("триллион", "триллиона", "триллионов", Gender::Masculine),
    ("квадриллион", "квадриллиона", "квадриллионов", Gender::Masculine),
    ("квинтиллион", "квинтиллиона", "квинтиллионов", Gender::Masculine),
];

/// Select the declension index for a cardinal: 0 = one, 1 = few (2-4), 2 = many
fn plural_index(n: u64) -> usize {
    let tail = n % 100;
    if (11..=14).contains(&tail) {
        return 2;
    }
    match n % 10 {
        1 => 0,
        2..=4 => 1,
        _ => 2,
    }
}

/// Declined ruble word for a cardinal (1 рубль, 2 рубля, 5 рублей)
pub fn ruble_word(n: u64) -> &'static str {
    ["рубль", "рубля", "рублей"][plural_index(n)]
}

/// Declined kopeck word for a cardinal (1 копейка, 2 копейки, 5 копеек)
pub fn kopeck_word(n: u64) -> &'static str {
    ["копейка", "копейки", "копеек"][plural_index(n)]
}

/// Spell a 1-999 group, honoring the gender of the counted unit
fn push_triple(out: &mut Vec<&'static str>, n: u16, gender: Gender) {
    let units = match gender {
        Gender::Masculine => UNITS_MASCULINE,
        Gender::Feminine => UNITS_FEMININE,
    };

    let hundreds = (n / 100) as usize;
    let tail = n % 100;

    if hundreds > 0 {
        out.push(HUNDREDS[hundreds]);
    }
    if (10..20).contains(&tail) {
        out.push(TEENS[(tail - 10) as usize]);
    } else {
        let tens = (tail / 10) as usize;
        let unit = (tail % 10) as usize;
        if tens > 0 {
            out.push(TENS[tens]);
        }
        if unit > 0 {
            out.push(units[unit]);
        }
    }
}

/// Spell an integer in Russian words (masculine agreement)
///
/// # Examples
/// ```
/// use ru_text::number_to_words;
/// assert_eq!(number_to_words(0), "ноль");
/// assert_eq!(number_to_words(21), "двадцать один");
/// assert_eq!(number_to_words(2000), "две тысячи");
/// ```
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "ноль".to_string();
    }

    // Split into 1000-groups, lowest first
    let mut groups = Vec::new();
    let mut rest = n;
    while rest > 0 {
        groups.push((rest % 1000) as u16);
        rest /= 1000;
    }

    let mut words: Vec<&'static str> = Vec::new();
    for (idx, &group) in groups.iter().enumerate().rev() {
        if group == 0 {
            continue;
        }
        if idx == 0 {
            push_triple(&mut words, group, Gender::Masculine);
        } else {
            let (one, few, many, gender) = SCALES[idx - 1];
            push_triple(&mut words, group, gender);
            words.push([one, few, many][plural_index(group as u64)]);
        }
    }

    words.join(" ")
}

/// Whole rubles of an amount, fractional part truncated
fn ruble_part(amount: Decimal) -> u64 {
    amount.trunc().to_u64().unwrap_or(0)
}

/// Kopeck remainder of an amount as 0-99
fn kopeck_part(amount: Decimal) -> u64 {
    let minor = (amount * Decimal::from(100)).round().to_u64().unwrap_or(0);
    minor % 100
}

/// Amount in words at whole-ruble granularity: "двадцать тысяч рублей"
///
/// The fractional part is ignored; the ruble word is declined against the
/// integer amount. Used for contract documents.
pub fn amount_in_words(amount: Decimal) -> String {
    let rubles = ruble_part(amount);
    format!("{} {}", number_to_words(rubles), ruble_word(rubles))
}

/// Invoice amount in words: "Двадцать тысяч рублей 00 копеек"
///
/// Capitalized, with the kopeck remainder as a two-digit numeral. This is a
/// distinct rendering contract from [`amount_in_words`] and stays separate.
pub fn amount_in_words_with_kopecks(amount: Decimal) -> String {
    let rubles = ruble_part(amount);
    let kopecks = kopeck_part(amount);
    let words = capitalize_first(&number_to_words(rubles));
    format!(
        "{} {} {:02} {}",
        words,
        ruble_word(rubles),
        kopecks,
        kopeck_word(kopecks)
    )
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
