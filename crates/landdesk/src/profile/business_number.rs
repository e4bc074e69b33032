use serde::{Deserialize, Serialize};

/// Weights applied to digits 0..=8 of a business registration number.
const CHECKSUM_WEIGHTS: [u32; 9] = [1, 3, 7, 1, 3, 7, 1, 3, 5];

/// Re-hyphenate free-form input as `XXX-XX-XXXXX`, keeping at most ten digits.
///
/// Partial input stays partial (`123`, `123-4`), and a hyphen is only ever
/// inserted once there is a digit to follow it. Formatting an already
/// formatted value returns it unchanged.
pub fn format_business_number(raw: &str) -> String {
    let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.truncate(10);

    match digits.len() {
        0..=3 => digits,
        4..=5 => format!("{}-{}", &digits[..3], &digits[3..]),
        _ => format!("{}-{}-{}", &digits[..3], &digits[3..5], &digits[5..]),
    }
}

/// Checksum validation for a business registration number.
///
/// Requires exactly ten digits once separators are stripped. The weighted sum
/// over digits 0..=8 is augmented with `digit[8] * 5 / 10`; the check digit is
/// `(10 - sum % 10) % 10` and must equal digit 9.
pub fn validate_business_number(value: &str) -> bool {
    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 10 {
        return false;
    }

    let mut sum: u32 = digits[..9]
        .iter()
        .zip(CHECKSUM_WEIGHTS)
        .map(|(digit, weight)| digit * weight)
        .sum();
    sum += digits[8] * 5 / 10;

    let check = (10 - sum % 10) % 10;
    check == digits[9]
}

/// A checksum-validated business registration number in display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessNumber(String);

impl BusinessNumber {
    pub fn parse(raw: &str) -> Result<Self, BusinessNumberError> {
        let formatted = format_business_number(raw);
        if validate_business_number(&formatted) {
            Ok(Self(formatted))
        } else {
            Err(BusinessNumberError::Invalid)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BusinessNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BusinessNumberError {
    #[error("유효하지 않은 사업자등록번호입니다")]
    Invalid,
}
