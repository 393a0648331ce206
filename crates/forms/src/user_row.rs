//! One editable user on an engagement.

use lodestar_context::{AppFeatures, FeatureSource};
use lodestar_core::{EngagementFormConfig, EngagementUser};
use tracing::debug;

use crate::deleted_users::DeletedUsers;
use crate::validation::{UserValidator, Validated};

/// Editable fields of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    /// Email address, also the user's key
    Email,
    /// Given name
    FirstName,
    /// Family name
    LastName,
    /// Role value from the form config
    Role,
}

impl UserField {
    /// Fields in display order.
    pub const ALL: [UserField; 4] = [
        UserField::Email,
        UserField::FirstName,
        UserField::LastName,
        UserField::Role,
    ];

    /// Accessible label.
    pub fn label(self) -> &'static str {
        match self {
            UserField::Email => "Email Address",
            UserField::FirstName => "First Name",
            UserField::LastName => "Last Name",
            UserField::Role => "User Role",
        }
    }

    /// Shown under an invalid field.
    pub fn helper_text(self) -> &'static str {
        match self {
            UserField::Email => "Enter valid email address",
            UserField::FirstName => "Enter valid first name",
            UserField::LastName => "Enter valid last name",
            UserField::Role => "Select valid role",
        }
    }

    fn get(self, user: &EngagementUser) -> &str {
        match self {
            UserField::Email => &user.email,
            UserField::FirstName => &user.first_name,
            UserField::LastName => &user.last_name,
            UserField::Role => &user.role,
        }
    }

    fn with(self, user: &EngagementUser, value: &str) -> EngagementUser {
        let mut next = user.clone();
        match self {
            UserField::Email => next.email = value.to_string(),
            UserField::FirstName => next.first_name = value.to_string(),
            UserField::LastName => next.last_name = value.to_string(),
            UserField::Role => next.role = value.to_string(),
        }
        next
    }
}

/// What a single field widget shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    /// Which field
    pub field: UserField,
    /// Current value
    pub value: String,
    /// Validation styling
    pub validated: Validated,
    /// Helper text, present only when invalid
    pub helper_text: Option<&'static str>,
    /// Input disabled
    pub disabled: bool,
    /// Rendered with a line through
    pub struck_through: bool,
}

/// Row-level action affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    /// Mark the user deleted
    Remove,
    /// Unmark a deleted user
    Undo,
}

/// An entry of the role select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleOption {
    /// Display label
    pub label: String,
    /// Submitted value; `None` for the placeholder
    pub value: Option<String>,
    /// Not selectable
    pub disabled: bool,
}

/// Role select entries: a disabled placeholder, then the configured roles.
pub fn role_options(config: Option<&EngagementFormConfig>) -> Vec<RoleOption> {
    let placeholder = RoleOption {
        label: "Select a role".to_string(),
        value: None,
        disabled: true,
    };

    std::iter::once(placeholder)
        .chain(config.into_iter().flat_map(|c| c.role_options()).map(|o| RoleOption {
            label: o.label.clone(),
            value: Some(o.value.clone()),
            disabled: o.disabled,
        }))
        .collect()
}

/// View model of the user at `index` in `users`.
pub struct UserRow<'a> {
    users: &'a [EngagementUser],
    index: usize,
    deleted: &'a DeletedUsers,
    validator: &'a dyn UserValidator,
    features: &'a dyn FeatureSource,
}

impl<'a> UserRow<'a> {
    /// Create a row, or `None` if `index` is out of range.
    pub fn new(
        users: &'a [EngagementUser],
        index: usize,
        deleted: &'a DeletedUsers,
        validator: &'a dyn UserValidator,
        features: &'a dyn FeatureSource,
    ) -> Option<Self> {
        (index < users.len()).then_some(Self {
            users,
            index,
            deleted,
            validator,
            features,
        })
    }

    /// The user shown by this row.
    pub fn user(&self) -> &'a EngagementUser {
        &self.users[self.index]
    }

    /// Whether the user is marked deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted.contains(&self.user().email)
    }

    /// Whether the writer feature is present.
    pub fn can_write(&self) -> bool {
        self.features.has_feature(AppFeatures::WRITER)
    }

    /// Whether inputs are disabled.
    pub fn is_disabled(&self) -> bool {
        !self.can_write() || self.is_deleted()
    }

    /// View of one field.
    pub fn field(&self, field: UserField) -> FieldView {
        let value = field.get(self.user());
        let valid = match field {
            UserField::Email => self.validator.validate_email(value),
            UserField::FirstName | UserField::LastName => self.validator.validate_string(value),
            UserField::Role => self.validator.validate_role(value),
        };
        let validated = Validated::from_valid(valid);

        FieldView {
            field,
            value: value.to_string(),
            validated,
            helper_text: validated.is_error().then(|| field.helper_text()),
            disabled: self.is_disabled(),
            struck_through: self.is_deleted(),
        }
    }

    /// Views of all fields in display order.
    pub fn fields(&self) -> Vec<FieldView> {
        UserField::ALL.iter().map(|&f| self.field(f)).collect()
    }

    /// Action offered, if the user may write.
    pub fn action(&self) -> Option<RowAction> {
        if !self.can_write() {
            return None;
        }
        Some(if self.is_deleted() {
            RowAction::Undo
        } else {
            RowAction::Remove
        })
    }

    /// The user list with this row's `field` set to `value`.
    ///
    /// Invalid values are emitted too. Returns `None` when the row is
    /// disabled, since a disabled input cannot change.
    pub fn set_field(&self, field: UserField, value: &str) -> Option<Vec<EngagementUser>> {
        if self.is_disabled() {
            return None;
        }

        let updated = field.with(self.user(), value);
        Some(
            self.users
                .iter()
                .enumerate()
                .map(|(i, u)| if i == self.index { updated.clone() } else { u.clone() })
                .collect(),
        )
    }

    /// The deleted set after this row's action.
    pub fn toggle_deleted(&self) -> Option<DeletedUsers> {
        self.action()?;
        let mut next = self.deleted.clone();
        debug!("Toggling deleted mark for {}", self.user().email);
        next.toggle(&self.user().email);
        Some(next)
    }
}
