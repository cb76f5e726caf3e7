//! Field validators for the intake form.
//!
//! Each validator trims its input, checks it against [`ValidationRules`],
//! and returns the normalized value or a [`CoreError::Validation`] whose
//! message is the user-facing Azerbaijani error text for that step.

use crate::application::IdKind;
use crate::error::CoreError;
use crate::texts;

/// Phone acceptance rule: a configured country calling code followed by an
/// exact count of national digits. No spaces, dashes, or local formats.
#[derive(Debug, Clone)]
pub struct PhoneRule {
    pub calling_code: String,
    pub national_digits: usize,
}

impl Default for PhoneRule {
    fn default() -> Self {
        Self {
            calling_code: "+994".to_string(),
            national_digits: 9,
        }
    }
}

/// Bounds for every validated field, overridable from configuration.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    /// Minimum whitespace-separated words in the full name (surname + name).
    pub min_name_words: usize,
    pub min_body_chars: usize,
    pub max_body_chars: usize,
    pub fin_chars: usize,
    pub pin_min_chars: usize,
    pub pin_max_chars: usize,
    pub phone: PhoneRule,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_name_words: 2,
            min_body_chars: 10,
            max_body_chars: 1000,
            fin_chars: 7,
            pin_min_chars: 5,
            pin_max_chars: 6,
            phone: PhoneRule::default(),
        }
    }
}

/// Full name: at least `min_name_words` words. Returns the trimmed name.
pub fn fullname(rules: &ValidationRules, input: &str) -> Result<String, CoreError> {
    let name = input.trim();
    if name.split_whitespace().count() < rules.min_name_words {
        return Err(CoreError::Validation(texts::FULLNAME_ERROR.to_string()));
    }
    Ok(name.to_string())
}

/// Phone: the configured calling code followed by exactly
/// `national_digits` ASCII digits. Returns the trimmed number.
pub fn phone(rules: &ValidationRules, input: &str) -> Result<String, CoreError> {
    let number = input.trim();
    let rule = &rules.phone;
    let valid = match number.strip_prefix(rule.calling_code.as_str()) {
        Some(rest) => {
            rest.len() == rule.national_digits && rest.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    };
    if !valid {
        return Err(CoreError::Validation(texts::PHONE_ERROR.to_string()));
    }
    Ok(number.to_string())
}

/// Identity code, checked against the chosen document kind:
/// FIN is exactly `fin_chars` characters, PIN is `pin_min_chars` to
/// `pin_max_chars`. ASCII letters and digits only. Returns the code
/// uppercased.
pub fn id_code(rules: &ValidationRules, kind: IdKind, input: &str) -> Result<String, CoreError> {
    let code = input.trim().to_ascii_uppercase();
    let len = code.chars().count();
    let (len_ok, error) = match kind {
        IdKind::Fin => (len == rules.fin_chars, texts::FIN_ERROR),
        IdKind::Pin => (
            len >= rules.pin_min_chars && len <= rules.pin_max_chars,
            texts::PIN_ERROR,
        ),
    };
    if !len_ok || !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(CoreError::Validation(error.to_string()));
    }
    Ok(code)
}

/// Body text: `min_body_chars` to `max_body_chars` characters after
/// trimming. Returns the trimmed body.
pub fn body(rules: &ValidationRules, input: &str) -> Result<String, CoreError> {
    let text = input.trim();
    let len = text.chars().count();
    if len < rules.min_body_chars || len > rules.max_body_chars {
        return Err(CoreError::Validation(texts::BODY_ERROR.to_string()));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn rules() -> ValidationRules {
        ValidationRules::default()
    }

    #[test]
    fn fullname_needs_two_words() {
        assert_eq!(
            fullname(&rules(), "  Əliyev Anar  ").unwrap(),
            "Əliyev Anar"
        );
        assert_eq!(
            fullname(&rules(), "Əliyev Anar Orxan oğlu").unwrap(),
            "Əliyev Anar Orxan oğlu"
        );
        assert_matches!(fullname(&rules(), "Anar"), Err(CoreError::Validation(_)));
        assert_matches!(fullname(&rules(), "   "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn phone_accepts_local_calling_code() {
        assert_eq!(phone(&rules(), "+994501234567").unwrap(), "+994501234567");
        assert_eq!(phone(&rules(), " +994501234567 ").unwrap(), "+994501234567");
    }

    #[test]
    fn phone_rejects_missing_prefix() {
        assert_matches!(phone(&rules(), "0501234567"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn phone_rejects_foreign_prefix() {
        assert_matches!(
            phone(&rules(), "+1501234567"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn phone_rejects_wrong_digit_count_and_garbage() {
        assert_matches!(
            phone(&rules(), "+99450123456"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            phone(&rules(), "+9945012345678"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            phone(&rules(), "+99450123456a"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn fin_is_exactly_seven_alphanumerics() {
        assert_eq!(id_code(&rules(), IdKind::Fin, "1abc23x").unwrap(), "1ABC23X");
        assert_matches!(
            id_code(&rules(), IdKind::Fin, "abc123"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            id_code(&rules(), IdKind::Fin, "abcd1234"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            id_code(&rules(), IdKind::Fin, "abc 123"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn pin_is_five_or_six_alphanumerics() {
        assert_eq!(id_code(&rules(), IdKind::Pin, "ab123").unwrap(), "AB123");
        assert_eq!(id_code(&rules(), IdKind::Pin, "ab1234").unwrap(), "AB1234");
        assert_matches!(
            id_code(&rules(), IdKind::Pin, "ab12"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            id_code(&rules(), IdKind::Pin, "ab12345"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn body_length_bounds_count_characters() {
        assert_matches!(body(&rules(), "qısa"), Err(CoreError::Validation(_)));
        let ok = "ə".repeat(10);
        assert_eq!(body(&rules(), &ok).unwrap(), ok);
        let max = "m".repeat(1000);
        assert_eq!(body(&rules(), &max).unwrap(), max);
        let over = "m".repeat(1001);
        assert_matches!(body(&rules(), &over), Err(CoreError::Validation(_)));
    }
}
