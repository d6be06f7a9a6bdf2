//! Client-side mobile number guard.

/// Inline error shown when the guard rejects a number.
pub const INVALID_PHONE_MESSAGE: &str = "Please enter a valid 10-digit mobile number.";

/// Number of digits in a mobile number without country code.
pub const MOBILE_DIGITS: usize = 10;

/// Accept `input` iff stripping every non-digit character leaves exactly
/// ten digits.
///
/// Separators and a leading `+` are tolerated, but a country code counts
/// towards the total, so `+91-9876543210` (twelve digits) is rejected.
#[must_use]
pub fn is_valid_mobile(input: &str) -> bool {
    input.chars().filter(char::is_ascii_digit).count() == MOBILE_DIGITS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ten_plain_digits() {
        assert!(is_valid_mobile("9876543210"));
    }

    #[test]
    fn ignores_separators() {
        assert!(is_valid_mobile("98765 43210"));
        assert!(is_valid_mobile("(987) 654-3210"));
    }

    #[test]
    fn rejects_too_few_digits() {
        assert!(!is_valid_mobile("987654321"));
        assert!(!is_valid_mobile("12345"));
        assert!(!is_valid_mobile(""));
    }

    #[test]
    fn country_code_counts_towards_length() {
        assert!(!is_valid_mobile("+91-9876543210"));
        assert!(!is_valid_mobile("919876543210"));
    }

    #[test]
    fn non_ascii_digits_are_stripped() {
        // Devanagari digits are not ASCII digits.
        assert!(!is_valid_mobile("९८७६५४३२१०"));
    }
}
