//! Form rules for the login and signup screens.
//!
//! Validation happens before a session operation is attempted, so the
//! session manager only ever sees well-formed input from the forms.

/// Minimum accepted secret length.
pub const MIN_SECRET_LENGTH: usize = 6;

/// Maximum length for name input.
pub const MAX_NAME_LENGTH: usize = 64;

/// Maximum length for email input.
/// Email addresses are capped at 254 characters by RFC 5321.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for secret input.
/// 128 chars accommodates password managers and passphrases.
pub const MAX_SECRET_LENGTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Secret,
    ConfirmSecret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Loose structural email check: one `@`, a non-empty local part and a
/// dotted domain with no empty labels.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| !label.is_empty())
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    if email.is_empty() {
        errors.push(FieldError::new(Field::Email, "Email is required"));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new(Field::Email, "Invalid email"));
    }
}

fn check_secret(secret: &str, errors: &mut Vec<FieldError>) {
    if secret.is_empty() {
        errors.push(FieldError::new(Field::Secret, "Password is required"));
    } else if secret.chars().count() < MIN_SECRET_LENGTH {
        errors.push(FieldError::new(
            Field::Secret,
            "Password must be at least 6 characters",
        ));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_login(email: &str, secret: &str) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    check_email(email, &mut errors);
    check_secret(secret, &mut errors);
    finish(errors)
}

pub fn validate_signup(
    name: &str,
    email: &str,
    secret: &str,
    confirm: &str,
) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(FieldError::new(Field::Name, "Name is required"));
    }
    check_email(email, &mut errors);
    check_secret(secret, &mut errors);
    if confirm.is_empty() {
        errors.push(FieldError::new(Field::ConfirmSecret, "Confirm password is required"));
    } else if confirm != secret {
        errors.push(FieldError::new(Field::ConfirmSecret, "Passwords must match"));
    }
    finish(errors)
}

/// First error reported for `field`, if any.
pub fn error_for(errors: &[FieldError], field: Field) -> Option<&'static str> {
    errors.iter().find(|e| e.field == field).map(|e| e.message)
}

fn is_valid_input_char(c: char) -> bool {
    // Allow printable characters, reject control chars
    !c.is_control()
}

/// Check if a character may be appended to a field of length `current_len`.
pub fn can_add_field_char(current_len: usize, max_len: usize, c: char) -> bool {
    current_len < max_len && is_valid_input_char(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("test@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("test"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("test@example"));
        assert!(!is_valid_email("test@example."));
        assert!(!is_valid_email("test@@example.com"));
        assert!(!is_valid_email("te st@example.com"));
    }

    #[test]
    fn test_validate_login_ok() {
        assert_eq!(validate_login("test@example.com", "password"), Ok(()));
    }

    #[test]
    fn test_validate_login_reports_each_field() {
        let errors = validate_login("", "abc").unwrap_err();
        assert_eq!(error_for(&errors, Field::Email), Some("Email is required"));
        assert_eq!(
            error_for(&errors, Field::Secret),
            Some("Password must be at least 6 characters")
        );

        let errors = validate_login("nope", "").unwrap_err();
        assert_eq!(error_for(&errors, Field::Email), Some("Invalid email"));
        assert_eq!(error_for(&errors, Field::Secret), Some("Password is required"));
    }

    #[test]
    fn test_validate_signup() {
        assert_eq!(
            validate_signup("Test User", "test@example.com", "password", "password"),
            Ok(())
        );

        let errors = validate_signup("  ", "test@example.com", "password", "passw0rd").unwrap_err();
        assert_eq!(error_for(&errors, Field::Name), Some("Name is required"));
        assert_eq!(error_for(&errors, Field::ConfirmSecret), Some("Passwords must match"));
        assert_eq!(error_for(&errors, Field::Email), None);

        let errors = validate_signup("A", "test@example.com", "password", "").unwrap_err();
        assert_eq!(
            error_for(&errors, Field::ConfirmSecret),
            Some("Confirm password is required")
        );
    }

    #[test]
    fn test_can_add_field_char() {
        assert!(can_add_field_char(0, MAX_SECRET_LENGTH, 'a'));
        assert!(can_add_field_char(127, MAX_SECRET_LENGTH, '!'));
        assert!(!can_add_field_char(128, MAX_SECRET_LENGTH, 'a'));
        assert!(!can_add_field_char(0, MAX_NAME_LENGTH, '\x00'));
        assert!(!can_add_field_char(0, MAX_EMAIL_LENGTH, '\n'));
        assert!(!can_add_field_char(0, MAX_EMAIL_LENGTH, '\t'));
    }
}
