//! Field validation rules and live phone-number formatting.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::form::FormData;

/// Validation messages keyed by field name, in field-name order.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+7 \(\d{3}\) \d{3} \d{4}$").expect("phone pattern is valid")
});

/// Maximum number of subscriber digits after the `+7` country code.
pub const PHONE_DIGITS: usize = 10;

/// A pattern constraint on a field value.
#[derive(Debug, Clone, Copy)]
pub struct Pattern {
    pub matches: fn(&str) -> bool,
    pub message: &'static str,
}

pub const PHONE_PATTERN: Pattern = Pattern {
    matches: is_phone_complete,
    message: "Телефон должен быть в формате +7 (999) 999 9999",
};

#[derive(Debug, Clone, Copy, Default)]
pub struct FieldRules {
    /// Message shown when the field is left empty.
    pub required: Option<&'static str>,
    pub pattern: Option<Pattern>,
}

impl FieldRules {
    pub const fn required(message: &'static str) -> Self {
        Self {
            required: Some(message),
            pattern: None,
        }
    }
}

/// Checks one value against its rules and returns the first failing message.
pub fn validate_field(rules: &FieldRules, value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        // An empty optional field is not subject to its pattern.
        return rules.required;
    }
    match rules.pattern {
        Some(pattern) if !(pattern.matches)(value) => Some(pattern.message),
        _ => None,
    }
}

/// Validates every field of a form.
pub fn validate<F: FormData>(form: &F) -> FieldErrors {
    F::fields()
        .iter()
        .filter_map(|spec| {
            validate_field(&spec.rules, &form.value(spec.name)).map(|message| (spec.name, message))
        })
        .collect()
}

/// Extracts the subscriber digits from a phone input.
///
/// A leading `+7`, or an eleventh leading `7`/`8` digit, is the country code
/// and is dropped. At most [`PHONE_DIGITS`] digits are kept.
pub fn subscriber_digits(text: &str) -> String {
    let mut digits: String = text.chars().filter(char::is_ascii_digit).collect();
    let has_country_code = text.trim_start().starts_with("+7")
        || (digits.len() > PHONE_DIGITS && (digits.starts_with('7') || digits.starts_with('8')));
    if has_country_code && !digits.is_empty() {
        digits.remove(0);
    }
    digits.truncate(PHONE_DIGITS);
    digits
}

/// Renders subscriber digits as `+7 (DDD) DDD DDDD`, truncated to the digits present.
pub fn format_phone_digits(digits: &str) -> String {
    if digits.is_empty() {
        return String::new();
    }
    let digits: Vec<char> = digits.chars().take(PHONE_DIGITS).collect();
    let code: String = digits.iter().take(3).collect();
    let mut formatted = format!("+7 ({code}");
    if digits.len() >= 3 {
        formatted.push(')');
    }
    if digits.len() > 3 {
        let exchange: String = digits[3..digits.len().min(6)].iter().collect();
        formatted.push(' ');
        formatted.push_str(&exchange);
    }
    if digits.len() > 6 {
        let line: String = digits[6..].iter().collect();
        formatted.push(' ');
        formatted.push_str(&line);
    }
    formatted
}

/// Normalises any phone input into the display format.
///
/// # Examples
///
/// ```
/// use loan_wizard::domain::format_phone;
///
/// assert_eq!(format_phone("9991234567"), "+7 (999) 123 4567");
/// assert_eq!(format_phone("99912"), "+7 (999) 12");
/// assert_eq!(format_phone("+7 (999) 123 4567"), "+7 (999) 123 4567");
/// ```
pub fn format_phone(text: &str) -> String {
    format_phone_digits(&subscriber_digits(text))
}

pub fn is_phone_complete(text: &str) -> bool {
    PHONE_RE.is_match(text)
}

/// Applies a raw edit to the phone field.
///
/// Returns the formatted value to store, or `None` when the edit would type
/// past an already complete number.
pub fn accept_phone_input(candidate: &str) -> Option<String> {
    let formatted = format_phone(candidate);
    if !is_phone_complete(&formatted) || candidate.chars().count() <= formatted.chars().count() {
        Some(formatted)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AddressWorkData, Gender, PersonalData};

    #[test]
    fn test_format_phone_prefixes() {
        let digits = "9991234567";
        let expected = [
            "+7 (9",
            "+7 (99",
            "+7 (999)",
            "+7 (999) 1",
            "+7 (999) 12",
            "+7 (999) 123",
            "+7 (999) 123 4",
            "+7 (999) 123 45",
            "+7 (999) 123 456",
            "+7 (999) 123 4567",
        ];
        assert_eq!(format_phone(""), "");
        for (len, want) in (1..=digits.len()).zip(expected) {
            assert_eq!(format_phone(&digits[..len]), want, "prefix of length {len}");
        }
    }

    #[test]
    fn test_format_phone_is_idempotent() {
        for raw in ["9", "999", "9991", "999123", "9991234", "9991234567"] {
            let once = format_phone(raw);
            assert_eq!(format_phone(&once), once);
        }
    }

    #[test]
    fn test_format_phone_strips_noise_and_country_code() {
        assert_eq!(format_phone("(999)-123-45-67"), "+7 (999) 123 4567");
        assert_eq!(format_phone("89991234567"), "+7 (999) 123 4567");
        assert_eq!(format_phone("79991234567"), "+7 (999) 123 4567");
        assert_eq!(format_phone("+7 (999) 123 45678"), "+7 (999) 123 4567");
        assert_eq!(format_phone("abc"), "");
    }

    #[test]
    fn test_is_phone_complete() {
        assert!(is_phone_complete("+7 (999) 123 4567"));
        assert!(!is_phone_complete("+7 (999) 123 456"));
        assert!(!is_phone_complete("8 (999) 123 4567"));
    }

    #[test]
    fn test_accept_phone_input_blocks_overtyping() {
        assert_eq!(accept_phone_input("+7 (999) 123 456").as_deref(), Some("+7 (999) 123 456"));
        assert_eq!(accept_phone_input("+7 (999) 123 4567").as_deref(), Some("+7 (999) 123 4567"));
        assert_eq!(accept_phone_input("+7 (999) 123 45678"), None);
        // Pasting a full number in another notation is fine.
        assert_eq!(accept_phone_input("89991234567").as_deref(), Some("+7 (999) 123 4567"));
    }

    #[test]
    fn test_phone_pattern_matches_only_full_numbers() {
        assert!((PHONE_PATTERN.matches)("+7 (999) 123 4567"));
        assert!(!(PHONE_PATTERN.matches)("+7 (999) 123 456"));
        assert!(!(PHONE_PATTERN.matches)("8 (999) 123 4567"));
        assert!(!(PHONE_PATTERN.matches)("+7 (999) 123 45678"));
    }

    #[test]
    fn test_validate_field_rules() {
        let rules = FieldRules {
            required: Some("Телефон обязателен"),
            pattern: Some(PHONE_PATTERN),
        };
        assert_eq!(validate_field(&rules, ""), Some("Телефон обязателен"));
        assert_eq!(validate_field(&rules, "  "), Some("Телефон обязателен"));
        assert_eq!(validate_field(&rules, "+7 (999)"), Some(PHONE_PATTERN.message));
        assert_eq!(validate_field(&rules, "+7 (999) 123 4567"), None);
        assert_eq!(validate_field(&FieldRules::default(), ""), None);
    }

    #[test]
    fn test_validate_personal_data() {
        let errors = validate(&PersonalData::default());
        assert_eq!(errors.len(), 4);
        assert_eq!(errors["firstName"], "Имя обязательно");
        assert_eq!(errors["gender"], "Пол обязателен");

        let valid = PersonalData {
            phone: "+7 (999) 123 4567".to_string(),
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
            gender: Some(Gender::Male),
        };
        assert!(validate(&valid).is_empty());

        let missing_last = PersonalData {
            last_name: String::new(),
            ..valid
        };
        let errors = validate(&missing_last);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["lastName"], "Фамилия обязательна");
    }

    #[test]
    fn test_validate_address_work() {
        let errors = validate(&AddressWorkData {
            workplace: "laptops".to_string(),
            address: String::new(),
        });
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["address"], "Адрес обязателен");
    }
}
