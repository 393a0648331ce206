//! Backend-provided form configuration.

use serde::{Deserialize, Serialize};

/// Options that drive engagement form widgets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementFormConfig {
    /// User section options
    pub user_options: UserOptions,
}

/// User section options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserOptions {
    /// Selectable user roles
    pub user_roles: UserRoles,
}

/// Selectable user roles.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRoles {
    /// Role options in display order
    pub options: Vec<FormOption>,
}

/// A single select option.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOption {
    /// Display label
    pub label: String,

    /// Submitted value
    pub value: String,

    /// Shown but not selectable
    pub disabled: bool,
}

impl FormOption {
    /// Create an enabled option.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            disabled: false,
        }
    }
}

impl EngagementFormConfig {
    /// Role options, empty when the backend sent none.
    pub fn role_options(&self) -> &[FormOption] {
        &self.user_options.user_roles.options
    }

    /// Values of roles that may be selected.
    pub fn selectable_roles(&self) -> Vec<String> {
        self.role_options()
            .iter()
            .filter(|o| !o.disabled)
            .map(|o| o.value.clone())
            .collect()
    }
}
