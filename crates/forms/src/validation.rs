//! Advisory field validation.
//!
//! Validation only decides how a field is styled. It never blocks a value
//! from being written upstream.

use std::sync::OnceLock;

use lodestar_core::EngagementFormConfig;
use regex::Regex;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Styling state of a form group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validated {
    /// Valid, or not yet judged
    Default,
    /// Invalid; show helper text
    Error,
}

impl Validated {
    /// Map a predicate result.
    pub fn from_valid(valid: bool) -> Self {
        if valid {
            Validated::Default
        } else {
            Validated::Error
        }
    }

    /// Whether the field is styled as an error.
    pub fn is_error(self) -> bool {
        self == Validated::Error
    }
}

/// Field predicates supplied to user rows.
pub trait UserValidator {
    /// Whether `email` looks like an email address.
    fn validate_email(&self, email: &str) -> bool;

    /// Whether a name field is acceptable.
    fn validate_string(&self, value: &str) -> bool;

    /// Whether `role` is a selectable role.
    fn validate_role(&self, role: &str) -> bool;
}

/// Validator backed by the form configuration's role list.
#[derive(Debug, Clone, Default)]
pub struct DefaultUserValidator {
    roles: Vec<String>,
}

impl DefaultUserValidator {
    /// Accept the given role values.
    pub fn new(roles: Vec<String>) -> Self {
        Self { roles }
    }

    /// Accept the selectable roles of `config`.
    pub fn from_form_config(config: &EngagementFormConfig) -> Self {
        Self::new(config.selectable_roles())
    }
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

impl UserValidator for DefaultUserValidator {
    fn validate_email(&self, email: &str) -> bool {
        let email = email.trim();
        match email_regex() {
            Some(re) => re.is_match(email),
            None => email.contains('@'),
        }
    }

    fn validate_string(&self, value: &str) -> bool {
        !value.trim().is_empty()
    }

    fn validate_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
