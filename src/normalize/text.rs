use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::types::Value;

/// Decompose (NFKD) and drop combining marks: "Región" -> "Region"
pub fn strip_diacritics(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Fold cell text to plain lowercase ASCII with hyphens turned into spaces.
///
/// Characters without an ASCII decomposition are dropped.
pub fn normalize_str(s: &str) -> String {
    let ascii: String = s.nfkd().filter(char::is_ascii).collect();
    ascii.to_lowercase().trim().replace('-', " ")
}

/// Normalize a text value; numbers and dates pass through unchanged
pub fn normalize_text(value: Value) -> Value {
    match value {
        Value::Text(s) => Value::Text(normalize_str(&s)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_strip_diacritics() {
        assert_eq!(strip_diacritics("Biobío"), "Biobio");
        assert_eq!(strip_diacritics("Ñuble"), "Nuble");
    }

    #[test]
    fn test_normalize_text_hyphenated_name() {
        assert_eq!(
            normalize_text(Value::text("MARÍA-JOSÉ ")),
            Value::text("maria jose")
        );
    }

    #[test]
    fn test_normalize_text_drops_non_ascii() {
        assert_eq!(normalize_str("¿Pareja?"), "pareja?");
        assert_eq!(normalize_str("O’Higgins"), "ohiggins");
    }

    #[test]
    fn test_normalize_text_passes_non_text() {
        assert_eq!(normalize_text(Value::Number(42.0)), Value::Number(42.0));
        let d = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(normalize_text(Value::Date(d)), Value::Date(d));
    }
}
