//! Newsletter email validation.
//!
//! # Usage
//!
//! ```bash
//! roastery email validate someone@example.com
//! ```

use roastery_core::{Email, EmailError};

/// Validate `address` with the same rules as the newsletter form.
///
/// # Errors
///
/// Returns the first rule the address breaks.
pub fn validate(address: &str) -> Result<Email, EmailError> {
    let email = Email::parse(address.trim())?;
    tracing::info!(
        local = email.local_part(),
        domain = email.domain(),
        "Valid email: {email}"
    );
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(validate(" a@b.co ").is_ok());
        assert_eq!(validate("a@b"), Err(EmailError::MissingTopLevelDomain));
        assert_eq!(validate("ab.co"), Err(EmailError::MissingAtSymbol));
    }
}
