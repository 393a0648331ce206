//! Form view models for engagement editing.
//!
//! Field validation, the user row, deleted-user tracking and the sort
//! select. Nothing here renders; each type answers what a widget shows
//! and what it emits on change.

#![warn(missing_docs)]

pub mod validation;
pub mod deleted_users;
pub mod user_row;
pub mod sort_select;

pub use validation::{DefaultUserValidator, UserValidator, Validated};
pub use deleted_users::DeletedUsers;
pub use user_row::{role_options, FieldView, RoleOption, RowAction, UserField, UserRow};
pub use sort_select::{current_selection, select, sort_display_value, sort_select_options, SortSelectOption};
