//! ISBN handling. Books are keyed by ISBN-13 throughout; ISBN-10 input is
//! widened by prepending the Bookland EAN prefix.

/// The first 3 digits of an ISBN-13 are always the same
pub const EAN13_PREFIX: &str = "978";

const ISBN13_LEN: usize = 13;
const ISBN10_LEN: usize = 10;

/// Normalize user input to an ISBN-13 string.
///
/// A 13-digit code passes through unchanged. A 10-digit code gets the
/// `978` prefix - unless it already starts with `978`, in which case it
/// reads like a truncated ISBN-13 and is rejected. Everything else
/// (wrong length, non-digits) is rejected.
pub fn normalize(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if !trimmed.chars().all(|c| c.is_ascii_digit()) || trimmed.is_empty() {
        return None;
    }

    match trimmed.len() {
        ISBN13_LEN => Some(trimmed.to_string()),
        ISBN10_LEN if !trimmed.starts_with(EAN13_PREFIX) => {
            Some(format!("{}{}", EAN13_PREFIX, trimmed))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isbn10_gets_prefixed() {
        assert_eq!(normalize("0141439513"), Some("9780141439513".to_string()));
        assert_eq!(normalize("0141439513").unwrap().len(), 13);
    }

    #[test]
    fn test_isbn13_passes_through() {
        assert_eq!(normalize("9780141439518"), Some("9780141439518".to_string()));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(
            normalize("  9780141439518 "),
            Some("9780141439518".to_string())
        );
    }

    #[test]
    fn test_truncated_isbn13_rejected() {
        // 10 digits already starting with the prefix: not a real ISBN-10
        assert_eq!(normalize("9780141439"), None);
    }

    #[test]
    fn test_wrong_lengths_rejected() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("12345"), None);
        assert_eq!(normalize("97801414395181"), None);
    }

    #[test]
    fn test_non_digits_rejected() {
        assert_eq!(normalize("97801414395x8"), None);
        assert_eq!(normalize("pride&prejud."), None);
    }
}
