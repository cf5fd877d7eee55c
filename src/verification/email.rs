use once_cell::sync::Lazy;
use regex::Regex;

/// Institutional domain every submitted address must belong to
pub const INSTITUTION_DOMAIN: &str = "uclan.ac.uk";

/// Address shown in the join instructions
pub const EXAMPLE_ADDRESS: &str = "example@uclan.ac.uk";

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^[a-zA-Z0-9._%+-]+@{}$",
        regex::escape(INSTITUTION_DOMAIN)
    ))
    .expect("email pattern is valid")
});

/// Whether `candidate` is an address on the institutional domain.
/// The domain is matched case-sensitively.
pub fn is_institution_email(candidate: &str) -> bool {
    EMAIL_PATTERN.is_match(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_institution_addresses() {
        assert!(is_institution_email("a.b-c%d+e@uclan.ac.uk"));
        assert!(is_institution_email("jdoe_01@uclan.ac.uk"));
        assert!(is_institution_email(EXAMPLE_ADDRESS));
    }

    #[test]
    fn test_rejects_other_addresses() {
        assert!(!is_institution_email("user@UCLAN.AC.UK"));
        assert!(!is_institution_email("user@other.ac.uk"));
        assert!(!is_institution_email("not-an-email"));
        assert!(!is_institution_email("@uclan.ac.uk"));
        assert!(!is_institution_email("user@uclan.ac.uk.evil.com"));
        assert!(!is_institution_email("user name@uclan.ac.uk"));
        assert!(!is_institution_email("user@uclanXac.uk"));
    }
}
