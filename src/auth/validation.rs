use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    auth::{
        dto::{LoginRequest, SignupRequest},
        services::normalize_email,
    },
    error::{AppError, FieldError},
};

pub const NAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new("email", "Please provide a valid email"));
    }
}

/// Trims the name, normalizes the email and collects every field problem.
pub fn validate_signup(req: &mut SignupRequest) -> Result<(), AppError> {
    req.name = req.name.trim().to_string();
    req.email = normalize_email(&req.email);

    let mut errors = Vec::new();
    if req.name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if req.name.chars().count() > NAME_MAX_LEN {
        errors.push(FieldError::new(
            "name",
            format!("Name must be at most {} characters", NAME_MAX_LEN),
        ));
    }
    check_email(&req.email, &mut errors);
    if req.password.chars().count() < PASSWORD_MIN_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {} characters", PASSWORD_MIN_LEN),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub fn validate_login(req: &mut LoginRequest) -> Result<(), AppError> {
    req.email = normalize_email(&req.email);

    let mut errors = Vec::new();
    check_email(&req.email, &mut errors);
    if req.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(err: AppError) -> Vec<&'static str> {
        match err {
            AppError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("ada@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("ada@x"));
        assert!(!is_valid_email("a da@x.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn signup_normalizes_input() {
        let mut req = SignupRequest {
            name: "  Ada ".into(),
            email: " Ada@X.com ".into(),
            password: "secret123".into(),
        };
        validate_signup(&mut req).unwrap();
        assert_eq!(req.name, "Ada");
        assert_eq!(req.email, "ada@x.com");
    }

    #[test]
    fn signup_reports_every_bad_field() {
        let mut req = SignupRequest {
            name: "   ".into(),
            email: "nope".into(),
            password: "short".into(),
        };
        assert_eq!(
            fields(validate_signup(&mut req).unwrap_err()),
            vec!["name", "email", "password"]
        );
    }

    #[test]
    fn signup_rejects_long_name() {
        let mut req = SignupRequest {
            name: "x".repeat(NAME_MAX_LEN + 1),
            email: "ada@x.com".into(),
            password: "secret123".into(),
        };
        assert_eq!(fields(validate_signup(&mut req).unwrap_err()), vec!["name"]);
    }

    #[test]
    fn login_requires_email_and_password() {
        let mut req = LoginRequest::default();
        assert_eq!(
            fields(validate_login(&mut req).unwrap_err()),
            vec!["email", "password"]
        );

        let mut req = LoginRequest {
            email: "ADA@x.com".into(),
            password: "x".into(),
        };
        validate_login(&mut req).unwrap();
        assert_eq!(req.email, "ada@x.com");
    }
}
