use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::auth::repo::User;
use crate::error::FieldError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for user registration. Fields default to empty so that
/// missing keys reach validation instead of failing JSON extraction.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if !is_valid_email(&self.email) {
            errors.push(FieldError {
                msg: "Please enter a valid email",
                param: "email",
            });
        }
        if self.password.is_empty() {
            errors.push(FieldError {
                msg: "Password is required",
                param: "password",
            });
        } else if self.password.chars().count() < 8 {
            errors.push(FieldError {
                msg: "Password must be at least 8 characters long",
                param: "password",
            });
        }
        if self.name.trim().is_empty() {
            errors.push(FieldError {
                msg: "Name is required",
                param: "name",
            });
        } else if self.name.trim().chars().count() < 2 {
            errors.push(FieldError {
                msg: "Name must be at least 2 characters long",
                param: "name",
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if !is_valid_email(&self.email) {
            errors.push(FieldError {
                msg: "Please enter a valid email",
                param: "email",
            });
        }
        if self.password.is_empty() {
            errors.push(FieldError {
                msg: "Password is required",
                param: "password",
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Request body for token refresh.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Response returned after register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Response returned after refresh: tokens only, no user object.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str, name: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
            name: name.into(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(register("a@b.com", "Secret123!", "A B").validate().is_ok());
    }

    #[test]
    fn email_must_match_the_pattern() {
        for bad in ["", "not-an-email", "a@b", "a b@c.com", "a@b .com"] {
            let errors = register(bad, "Secret123!", "A B").validate().unwrap_err();
            assert_eq!(
                errors,
                vec![FieldError {
                    msg: "Please enter a valid email",
                    param: "email",
                }],
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn password_rules_report_their_messages() {
        let errors = register("a@b.com", "", "A B").validate().unwrap_err();
        assert_eq!(errors[0].msg, "Password is required");
        assert_eq!(errors[0].param, "password");

        let errors = register("a@b.com", "short", "A B").validate().unwrap_err();
        assert_eq!(errors[0].msg, "Password must be at least 8 characters long");
        assert_eq!(errors[0].param, "password");
    }

    #[test]
    fn name_rules_report_their_messages() {
        let errors = register("a@b.com", "Secret123!", "   ").validate().unwrap_err();
        assert_eq!(errors[0].msg, "Name is required");
        assert_eq!(errors[0].param, "name");

        let errors = register("a@b.com", "Secret123!", " A ").validate().unwrap_err();
        assert_eq!(errors[0].msg, "Name must be at least 2 characters long");
        assert_eq!(errors[0].param, "name");
    }

    #[test]
    fn all_failing_rules_are_listed_together() {
        let errors = register("nope", "", "").validate().unwrap_err();
        let params: Vec<&str> = errors.iter().map(|e| e.param).collect();
        assert_eq!(params, vec!["email", "password", "name"]);
    }

    #[test]
    fn login_requires_valid_email_and_password() {
        let ok = LoginRequest {
            email: "a@b.com".into(),
            password: "whatever".into(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginRequest {
            email: "nope".into(),
            password: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].param, "email");
        assert_eq!(errors[1].msg, "Password is required");
    }
}
