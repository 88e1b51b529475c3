use once_cell::sync::Lazy;
use regex::Regex;

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());
static IBAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^PL\d{26}$").unwrap());

#[inline(always)]
pub fn is_valid_currency(code: &str) -> bool {
    CURRENCY_RE.is_match(code)
}

/// Shape and mod-97 check for the Polish IBANs this system issues.
#[inline(always)]
pub fn is_valid_iban(iban: &str) -> bool {
    IBAN_RE.is_match(iban) && crate::utils::iban::mod97(iban) == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_codes() {
        assert!(is_valid_currency("PLN"));
        assert!(is_valid_currency("USD"));
        assert!(!is_valid_currency("usd"));
        assert!(!is_valid_currency("EURO"));
        assert!(!is_valid_currency(""));
    }

    #[test]
    fn test_iban_shape() {
        assert!(!is_valid_iban("PL123"));
        assert!(!is_valid_iban("DE02252632410000000012345678"));
        assert!(is_valid_iban(&crate::utils::iban::generate_iban("000000001")));
    }
}
