use rand::Rng;

pub const COUNTRY_CODE: &str = "PL";

/// Issuing bank/branch code embedded in every account number we generate.
pub const BANK_CODE: &str = "25263241";

/// Nine random decimal digits, zero padded. The core number is what makes a
/// wallet's account number unique; callers must re-roll on collision.
pub fn generate_core_number() -> String {
    let mut rng = rand::rng();
    let n: u32 = rng.random_range(1..=999_999_999);
    format!("{n:09}")
}

/// Builds a valid IBAN (ISO 13616 check digits) from a core account number.
pub fn generate_iban(core: &str) -> String {
    let bban = format!("{BANK_CODE}{core:0>16}");
    let check = 98 - mod97(&format!("{bban}{COUNTRY_CODE}00"));
    format!("{COUNTRY_CODE}{check:02}{bban}")
}

/// ISO 7064 mod-97 remainder of an IBAN in display order. A valid IBAN
/// yields 1. Non-alphanumeric input yields 0, which never validates.
pub fn mod97(iban: &str) -> u32 {
    if iban.len() < 5 || !iban.is_ascii() {
        return 0;
    }
    let rearranged = iban[4..].chars().chain(iban[..4].chars());

    let mut rem: u32 = 0;
    for ch in rearranged {
        if let Some(d) = ch.to_digit(10) {
            rem = (rem * 10 + d) % 97;
        } else if ch.is_ascii_uppercase() {
            rem = (rem * 100 + (ch as u32 - 'A' as u32 + 10)) % 97;
        } else {
            return 0;
        }
    }
    rem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(generate_iban("000000001"), "PL17252632410000000000000001");
        assert_eq!(generate_iban("018315965"), "PL15252632410000000018315965");
        assert_eq!(generate_iban("090957373"), "PL77252632410000000090957373");
    }

    #[test]
    fn test_generated_ibans_check_out() {
        for _ in 0..32 {
            let iban = generate_iban(&generate_core_number());
            assert_eq!(iban.len(), 28);
            assert_eq!(mod97(&iban), 1);
        }
    }
}
