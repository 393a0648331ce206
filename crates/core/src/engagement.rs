//! Engagement model - a tracked customer project.

use serde::{Deserialize, Deserializer, Serialize};
use crate::id::EngagementId;
use crate::Time;

/// A customer engagement with its users and cluster configuration.
///
/// Missing or `null` fields in backend payloads fall back to their
/// defaults and unknown fields are ignored, so older and newer API
/// revisions decode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Engagement {
    /// Unique identifier
    pub id: EngagementId,

    /// Customer organisation
    #[serde(deserialize_with = "null_as_default")]
    pub customer_name: String,

    /// Project name, unique per customer
    #[serde(deserialize_with = "null_as_default")]
    pub project_name: String,

    /// Free-form description
    pub description: Option<String>,

    /// Where the engagement takes place
    pub location: Option<String>,

    /// First day of the engagement
    pub start_date: Option<Time>,

    /// Last day of the engagement
    pub end_date: Option<Time>,

    /// When the engagement environment is torn down
    pub archive_date: Option<Time>,

    // === Point of contact ===

    /// Engagement lead name
    pub engagement_lead_name: Option<String>,

    /// Engagement lead email
    pub engagement_lead_email: Option<String>,

    /// Technical lead name
    pub technical_lead_name: Option<String>,

    /// Technical lead email
    pub technical_lead_email: Option<String>,

    /// Customer contact name
    pub customer_contact_name: Option<String>,

    /// Customer contact email
    pub customer_contact_email: Option<String>,

    // === Cluster ===

    /// Hosting provider
    pub ocp_cloud_provider_name: Option<String>,

    /// Hosting region
    pub ocp_cloud_provider_region: Option<String>,

    /// OpenShift version
    pub ocp_version: Option<String>,

    /// Cluster subdomain
    pub ocp_sub_domain: Option<String>,

    /// Persistent storage size
    pub ocp_persistent_storage_size: Option<String>,

    /// Cluster size
    pub ocp_cluster_size: Option<String>,

    /// Launch record, set once the engagement is launched
    pub launch: Option<Launch>,

    /// Users with access to the engagement
    #[serde(deserialize_with = "null_as_default")]
    pub engagement_users: Vec<EngagementUser>,
}

impl Engagement {
    /// Create an empty client-side draft.
    pub fn draft(customer_name: impl Into<String>, project_name: impl Into<String>) -> Self {
        Self {
            id: EngagementId::new(),
            customer_name: customer_name.into(),
            project_name: project_name.into(),
            ..Default::default()
        }
    }

    /// Whether the engagement has been launched.
    pub fn is_launched(&self) -> bool {
        self.launch.is_some()
    }

    /// Find a user by email.
    pub fn user(&self, email: &str) -> Option<&EngagementUser> {
        self.engagement_users.iter().find(|u| u.email == email)
    }
}

/// Launch record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Launch {
    /// Who launched the engagement
    pub launched_by: String,

    /// When it was launched
    pub launched_date_time: Option<Time>,
}

/// A user on an engagement. The email is the key within a user list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementUser {
    /// Email address
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,

    /// First name
    #[serde(deserialize_with = "null_as_default")]
    pub first_name: String,

    /// Last name
    #[serde(deserialize_with = "null_as_default")]
    pub last_name: String,

    /// Role value, one of the configured role options
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
}

impl EngagementUser {
    /// Create a new user.
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role: role.into(),
        }
    }
}

/// Decode `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
