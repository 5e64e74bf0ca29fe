// SPDX-License-Identifier: AGPL-3.0
// ResourceMap Core - Client-side form validation
//
// Everything here runs before any request is sent.

use crate::types::{AppError, ChangePasswordRequest, RegisterRequest, Role};
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum password length accepted by the registration and password forms
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Check an address against the `local@domain.tld` shape
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Trim a required field, failing if nothing is left
pub fn require(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Parse a quantity the way the listing forms do: leading digits, at least 1.
///
/// Anything unparseable (empty, negative, zero, non-numeric) becomes 1, and so
/// does a value too large for `u32`.
pub fn parse_quantity(raw: &str) -> u32 {
    let digits: String = raw
        .trim()
        .trim_start_matches('+')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    match digits.parse::<u32>() {
        Ok(quantity) if quantity > 0 => quantity,
        _ => 1,
    }
}

fn check_new_password(password: &str, confirmation: &str) -> Result<(), AppError> {
    if password != confirmation {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Registration form as typed by the user
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
    pub organization_id: Option<i64>,
}

impl RegisterForm {
    /// Validate and normalize into the request sent to `/Auth/register`
    pub fn validate(&self) -> Result<RegisterRequest, AppError> {
        let name = require("Name", &self.name)?;
        let email = require("Email", &self.email)?;
        require("Password", &self.password)?;

        check_new_password(&self.password, &self.confirm_password)?;

        if !is_valid_email(&email) {
            return Err(AppError::Validation(format!(
                "Invalid email address: {}",
                email
            )));
        }

        let phone = self.phone.trim();

        Ok(RegisterRequest {
            email: email.to_lowercase(),
            name,
            password: self.password.clone(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            role: self.role,
            organization_id: self.organization_id,
        })
    }
}

/// Change-password form with confirmation
#[derive(Debug, Clone, Default)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ChangePasswordForm {
    pub fn validate(&self) -> Result<ChangePasswordRequest, AppError> {
        if self.current_password.is_empty()
            || self.new_password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(AppError::Validation("All fields are required".to_string()));
        }
        check_new_password(&self.new_password, &self.confirm_password)?;

        Ok(ChangePasswordRequest {
            current_password: self.current_password.clone(),
            new_password: self.new_password.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_form() -> RegisterForm {
        RegisterForm {
            name: "  Maria Santos ".to_string(),
            email: " Maria@Example.ORG ".to_string(),
            phone: "   ".to_string(),
            password: "segredo".to_string(),
            confirm_password: "segredo".to_string(),
            role: Role::Donor,
            organization_id: None,
        }
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("joao.silva@ong.org.br"));
        assert!(!is_valid_email("joao@localhost"));
        assert!(!is_valid_email("joao silva@ong.org"));
        assert!(!is_valid_email("@ong.org"));
        assert!(!is_valid_email("joao@@ong.org"));
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("50"), 50);
        assert_eq!(parse_quantity(" 12 caixas"), 12);
        assert_eq!(parse_quantity("abc"), 1);
        assert_eq!(parse_quantity(""), 1);
        assert_eq!(parse_quantity("0"), 1);
        assert_eq!(parse_quantity("-5"), 1);
        assert_eq!(parse_quantity("99999999999"), 1);
    }

    #[test]
    fn test_require_trims() {
        assert_eq!(require("Title", "  Cestas ").unwrap(), "Cestas");
        assert!(matches!(require("Title", " \t"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_register_form_normalizes() {
        let request = register_form().validate().unwrap();
        assert_eq!(request.name, "Maria Santos");
        assert_eq!(request.email, "maria@example.org");
        assert_eq!(request.phone, None);
        assert_eq!(request.password, "segredo");
    }

    #[test]
    fn test_register_form_rejects_short_password() {
        let form = RegisterForm {
            password: "12345".to_string(),
            confirm_password: "12345".to_string(),
            ..register_form()
        };
        assert!(matches!(form.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_register_form_rejects_mismatched_confirmation() {
        let form = RegisterForm {
            confirm_password: "outra-senha".to_string(),
            ..register_form()
        };
        assert!(matches!(form.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_register_form_rejects_bad_email() {
        let form = RegisterForm {
            email: "maria.example.org".to_string(),
            ..register_form()
        };
        assert!(matches!(form.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_change_password_form() {
        let form = ChangePasswordForm {
            current_password: "antiga".to_string(),
            new_password: "novasenha".to_string(),
            confirm_password: "novasenha".to_string(),
        };
        let request = form.validate().unwrap();
        assert_eq!(request.new_password, "novasenha");

        let short = ChangePasswordForm {
            new_password: "abc".to_string(),
            confirm_password: "abc".to_string(),
            ..form.clone()
        };
        assert!(short.validate().is_err());

        let missing = ChangePasswordForm {
            current_password: String::new(),
            ..form
        };
        assert!(missing.validate().is_err());
    }
}
