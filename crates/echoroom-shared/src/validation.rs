//! Registration form validation.
//!
//! Expected validation failures are data, not errors: each check appends to
//! a list of issues and the caller reads `report.ok` — nothing here returns
//! `Err` or panics.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_USERNAME_LEN, MIN_PASSWORD_LEN, MIN_USERNAME_LEN};
use crate::user::GenderIdentity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssue {
    UsernameTooShort,
    UsernameTooLong,
    UsernameInvalidChars,
    EmailInvalid,
    PasswordTooShort,
    PasswordMissingUppercase,
    PasswordMissingLowercase,
    PasswordMissingDigit,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::UsernameTooShort => "username is too short",
            Self::UsernameTooLong => "username is too long",
            Self::UsernameInvalidChars => {
                "username may only contain lowercase letters, digits and underscores"
            }
            Self::EmailInvalid => "email address is not valid",
            Self::PasswordTooShort => "password is too short",
            Self::PasswordMissingUppercase => "password needs an uppercase letter",
            Self::PasswordMissingLowercase => "password needs a lowercase letter",
            Self::PasswordMissingDigit => "password needs a digit",
        };
        f.write_str(msg)
    }
}

/// Outcome of validating a form: a success flag plus the collected issues.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationReport {
    pub ok: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self {
            ok: issues.is_empty(),
            issues,
        }
    }
}

/// What the registration screen submits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub gender: GenderIdentity,
    pub orientation: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> ValidationReport {
        let mut issues = Vec::new();
        issues.extend(validate_username(&self.username));
        issues.extend(validate_email(&self.email));
        issues.extend(validate_password(&self.password));
        ValidationReport::from_issues(issues)
    }
}

pub fn validate_username(username: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if username.chars().count() < MIN_USERNAME_LEN {
        issues.push(ValidationIssue::UsernameTooShort);
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        issues.push(ValidationIssue::UsernameTooLong);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        issues.push(ValidationIssue::UsernameInvalidChars);
    }

    issues
}

pub fn validate_email(email: &str) -> Vec<ValidationIssue> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if valid {
        Vec::new()
    } else {
        vec![ValidationIssue::EmailInvalid]
    }
}

pub fn validate_password(password: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LEN {
        issues.push(ValidationIssue::PasswordTooShort);
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        issues.push(ValidationIssue::PasswordMissingUppercase);
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        issues.push(ValidationIssue::PasswordMissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        issues.push(ValidationIssue::PasswordMissingDigit);
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_form() {
        let form = RegistrationForm {
            username: "ada_l0velace".into(),
            email: "ada@example.com".into(),
            password: "Difference1".into(),
            gender: GenderIdentity::Female,
            orientation: "bisexual".into(),
        };
        let report = form.validate();
        assert!(report.ok, "unexpected issues: {:?}", report.issues);
    }

    #[test]
    fn collects_all_issues_at_once() {
        let form = RegistrationForm {
            username: "A!".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            gender: GenderIdentity::Male,
            orientation: "heterosexual".into(),
        };
        let report = form.validate();
        assert!(!report.ok);
        assert!(report.issues.contains(&ValidationIssue::UsernameTooShort));
        assert!(report.issues.contains(&ValidationIssue::UsernameInvalidChars));
        assert!(report.issues.contains(&ValidationIssue::EmailInvalid));
        assert!(report.issues.contains(&ValidationIssue::PasswordTooShort));
        assert!(report.issues.contains(&ValidationIssue::PasswordMissingDigit));
    }

    #[test]
    fn email_needs_dotted_domain() {
        assert!(validate_email("a@b.c").is_empty());
        assert!(!validate_email("a@b").is_empty());
        assert!(!validate_email("a@.b").is_empty());
        assert!(!validate_email("@b.c").is_empty());
    }

    #[test]
    fn password_checks_each_class() {
        assert!(validate_password("Abcdefg1").is_empty());
        assert!(validate_password("abcdefg1").contains(&ValidationIssue::PasswordMissingUppercase));
        assert!(validate_password("ABCDEFG1").contains(&ValidationIssue::PasswordMissingLowercase));
        assert!(validate_password("Abcdefgh").contains(&ValidationIssue::PasswordMissingDigit));
    }
}
