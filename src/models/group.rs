use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validators::validate_not_anyone;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub org_id: Uuid,
    /// Unique within the organization (exact match)
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A group as returned by the API, with its organization key and member count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetails {
    pub id: i64,
    pub organization_key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub members_count: i64,
}

impl GroupDetails {
    pub fn new(group: Group, organization_key: String, members_count: i64) -> Self {
        Self {
            id: group.id,
            organization_key,
            name: group.name,
            description: group.description,
            members_count,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroup {
    /// Owning organization; the default organization when absent
    #[serde(default, rename = "organizationKey")]
    pub organization_key: Option<String>,
    #[validate(
        length(
            min = 1,
            max = 255,
            message = "Group name must not be empty or longer than 255 characters"
        ),
        custom(function = "validate_not_anyone")
    )]
    pub name: String,
    #[validate(length(max = 200, message = "Description cannot be longer than 200 characters"))]
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update: absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateGroup {
    pub id: i64,
    #[validate(
        length(
            min = 1,
            max = 255,
            message = "Group name must not be empty or longer than 255 characters"
        ),
        custom(function = "validate_not_anyone")
    )]
    #[serde(default)]
    pub name: Option<String>,
    #[validate(length(max = 200, message = "Description cannot be longer than 200 characters"))]
    #[serde(default)]
    pub description: Option<String>,
}

/// Request parameters identifying a group, either by id or by
/// organization key and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GroupRefParams {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, rename = "organizationKey")]
    pub organization_key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl GroupRefParams {
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_name(organization_key: Option<&str>, name: &str) -> Self {
        Self {
            id: None,
            organization_key: organization_key.map(str::to_string),
            name: Some(name.to_string()),
        }
    }
}

/// Parameters of the add/remove member actions.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupMemberParams {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, rename = "organizationKey")]
    pub organization_key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub login: String,
}

impl GroupMemberParams {
    pub fn group(&self) -> GroupRefParams {
        GroupRefParams {
            id: self.id,
            organization_key: self.organization_key.clone(),
            name: self.name.clone(),
        }
    }
}

/// Unambiguous reference to a persisted group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    Id(i64),
    Name { org_id: Uuid, name: String },
}
