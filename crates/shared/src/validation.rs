//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of a single keyword.
pub const MAX_KEYWORD_LENGTH: usize = 100;

/// Maximum length of the space-joined keyword list as stored.
pub const MAX_KEYWORDS_JOINED_LENGTH: usize = 2000;

/// Validates that a string contains at least one non-whitespace character.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates a keyword list: no blank entries, no embedded separators, bounded length.
///
/// Keywords are persisted joined by a single space, so a keyword containing
/// whitespace would split into several on read.
pub fn validate_keywords(keywords: &[String]) -> Result<(), ValidationError> {
    for keyword in keywords {
        if keyword.trim().is_empty() {
            let mut err = ValidationError::new("keyword_blank");
            err.message = Some("Keywords must not be blank".into());
            return Err(err);
        }
        if keyword.chars().any(char::is_whitespace) {
            let mut err = ValidationError::new("keyword_whitespace");
            err.message = Some("Keywords must not contain whitespace".into());
            return Err(err);
        }
        if keyword.chars().count() > MAX_KEYWORD_LENGTH {
            let mut err = ValidationError::new("keyword_length");
            err.message = Some("Keywords must be at most 100 characters".into());
            return Err(err);
        }
    }

    let joined = keywords.iter().map(|k| k.chars().count()).sum::<usize>()
        + keywords.len().saturating_sub(1);
    if joined > MAX_KEYWORDS_JOINED_LENGTH {
        let mut err = ValidationError::new("keywords_length");
        err.message = Some("Keywords must be at most 2000 characters in total".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Beach cleanup").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \t").is_err());
    }

    #[test]
    fn test_validate_not_blank_error_message() {
        let err = validate_not_blank(" ").unwrap_err();
        assert_eq!(err.message.unwrap().to_string(), "Value must not be blank");
    }

    #[test]
    fn test_validate_keywords() {
        let ok = vec!["climate".to_string(), "coding".to_string()];
        assert!(validate_keywords(&ok).is_ok());
        assert!(validate_keywords(&[]).is_ok());
    }

    #[test]
    fn test_validate_keywords_rejects_blank() {
        let bad = vec!["climate".to_string(), " ".to_string()];
        let err = validate_keywords(&bad).unwrap_err();
        assert_eq!(err.code, "keyword_blank");
    }

    #[test]
    fn test_validate_keywords_rejects_whitespace() {
        let bad = vec!["two words".to_string()];
        let err = validate_keywords(&bad).unwrap_err();
        assert_eq!(err.code, "keyword_whitespace");
    }

    #[test]
    fn test_validate_keywords_rejects_long() {
        let bad = vec!["a".repeat(MAX_KEYWORD_LENGTH + 1)];
        assert!(validate_keywords(&bad).is_err());
    }

    #[test]
    fn test_validate_keywords_rejects_long_joined_list() {
        let keywords: Vec<String> = (0..30).map(|i| format!("{:0>99}", i)).collect();
        let err = validate_keywords(&keywords).unwrap_err();
        assert_eq!(err.code, "keywords_length");
    }

    #[test]
    fn test_validate_keywords_joined_limit_is_inclusive() {
        // 20 keywords of 99 characters plus 19 separators is 1999.
        let mut keywords: Vec<String> = (0..20).map(|_| "k".repeat(99)).collect();
        assert!(validate_keywords(&keywords).is_ok());

        keywords[0].push('k');
        assert!(validate_keywords(&keywords).is_ok());

        keywords[1].push('k');
        assert!(validate_keywords(&keywords).is_err());
    }
}
