use serde::Deserialize;

/// Country-code assumptions for numbers submitted without a usable prefix.
///
/// The original heuristics hard-coded UK/US guesses; here they are injected
/// configuration so a deployment can change the assumption without a code
/// change. The defaults reproduce the documented behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct PhoneDefaults {
    /// Applied when a trunk-zero number is longer than ten digits.
    #[serde(default = "default_trunk_long")]
    pub trunk_long_code: String,
    /// Applied to shorter trunk-zero numbers.
    #[serde(default = "default_trunk_short")]
    pub trunk_short_code: String,
    /// Applied when no other rule matches.
    #[serde(default = "default_fallback")]
    pub fallback_code: String,
}

fn default_trunk_long() -> String { "44".to_string() }
fn default_trunk_short() -> String { "1".to_string() }
fn default_fallback() -> String { "1".to_string() }

impl Default for PhoneDefaults {
    fn default() -> Self {
        Self {
            trunk_long_code: default_trunk_long(),
            trunk_short_code: default_trunk_short(),
            fallback_code: default_fallback(),
        }
    }
}

/// Normalize a client-submitted phone number to E.164.
///
/// Total: every input yields some `+`-prefixed output. Idempotent on
/// well-formed E.164 input, except the `+144…` double-country-code typo,
/// which is a known upstream data bug and is corrected to `+44…`.
pub fn normalize_phone(raw: &str, defaults: &PhoneDefaults) -> String {
    let trimmed = raw.trim();
    let has_plus = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if has_plus {
        // Upstream typo: "+144…" carries a doubled country code for UK numbers.
        if let Some(rest) = digits.strip_prefix("144") {
            tracing::debug!(input = raw, "correcting doubled UK country code");
            return format!("+44{}", rest);
        }
        return format!("+{}", digits);
    }

    if let Some(rest) = digits.strip_prefix("00") {
        return format!("+{}", rest);
    }

    if let Some(rest) = digits.strip_prefix('0') {
        if digits.len() > 10 {
            return format!("+{}{}", defaults.trunk_long_code, rest);
        }
        return format!("+{}{}", defaults.trunk_short_code, rest);
    }

    if digits.starts_with("44") {
        return format!("+{}", digits);
    }

    format!("+{}{}", defaults.fallback_code, digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(raw: &str) -> String {
        normalize_phone(raw, &PhoneDefaults::default())
    }

    #[test]
    fn test_plus_prefixed_passthrough() {
        assert_eq!(norm("+15551234567"), "+15551234567");
        assert_eq!(norm("+33 1 23 45 67 89"), "+33123456789");
    }

    #[test]
    fn test_uk_double_prefix_typo() {
        assert_eq!(norm("+1447911123456"), "+447911123456");
    }

    #[test]
    fn test_international_dialing_prefix() {
        assert_eq!(norm("00447911123456"), "+447911123456");
    }

    #[test]
    fn test_trunk_zero_long_assumes_uk() {
        assert_eq!(norm("07911123456"), "+447911123456");
    }

    #[test]
    fn test_trunk_zero_short_assumes_nanp() {
        assert_eq!(norm("0555123456"), "+1555123456");
    }

    #[test]
    fn test_bare_uk_country_code() {
        assert_eq!(norm("447911123456"), "+447911123456");
    }

    #[test]
    fn test_fallback_country() {
        assert_eq!(norm("5551234567"), "+15551234567");
    }

    #[test]
    fn test_total_and_idempotent() {
        let inputs = ["", "abc", "(555) 123-4567", "07911 123 456", "+447911123456"];
        for input in inputs {
            let once = norm(input);
            assert!(once.starts_with('+'), "not +-prefixed: {:?} -> {:?}", input, once);
            // Re-normalizing a normalized number must be a no-op.
            assert_eq!(norm(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_injected_defaults() {
        let defaults = PhoneDefaults {
            trunk_long_code: "49".to_string(),
            trunk_short_code: "49".to_string(),
            fallback_code: "49".to_string(),
        };
        assert_eq!(normalize_phone("01711234567890", &defaults), "+491711234567890");
        assert_eq!(normalize_phone("1711234", &defaults), "+491711234");
    }
}
