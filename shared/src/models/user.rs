//! User, role and permission models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account on the platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    /// Zone a field operator is assigned to
    pub zone_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fixed roles of the platform
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Analytics,
    FieldStaff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Analytics => "analytics",
            Role::FieldStaff => "field_staff",
        }
    }

    /// Permission strings ("resource:action") granted to this role
    pub fn permission_strings(&self) -> Vec<String> {
        default_permissions(*self)
            .into_iter()
            .flat_map(|p| {
                let resource = p.resource;
                p.actions
                    .into_iter()
                    .map(move |a| format!("{}:{}", resource.as_str(), a.as_str()))
            })
            .collect()
    }

    /// Whether the role only sees lots of its assigned zone
    pub fn is_zone_scoped(&self) -> bool {
        matches!(self, Role::FieldStaff)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "analytics" => Ok(Role::Analytics),
            "field_staff" => Ok(Role::FieldStaff),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A permission granting actions on a resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permission {
    pub resource: Resource,
    pub actions: Vec<Action>,
}

/// Resources that can be accessed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    User,
    Zone,
    Species,
    PlantLot,
    HealthLog,
    Report,
    Image,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::User,
        Resource::Zone,
        Resource::Species,
        Resource::PlantLot,
        Resource::HealthLog,
        Resource::Report,
        Resource::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::User => "user",
            Resource::Zone => "zone",
            Resource::Species => "species",
            Resource::PlantLot => "plant_lot",
            Resource::HealthLog => "health_log",
            Resource::Report => "report",
            Resource::Image => "image",
        }
    }
}

/// Actions that can be performed on resources
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Export,
    Migrate,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Export => "export",
            Action::Migrate => "migrate",
        }
    }
}

/// Permissions of each built-in role
pub fn default_permissions(role: Role) -> Vec<Permission> {
    use Action::*;

    match role {
        Role::Admin => Resource::ALL
            .into_iter()
            .map(|resource| Permission {
                resource,
                actions: match resource {
                    Resource::Report => vec![View, Export],
                    Resource::Image => vec![View, Migrate],
                    _ => vec![View, Create, Edit, Delete],
                },
            })
            .collect(),
        Role::Manager => vec![
            Permission {
                resource: Resource::Zone,
                actions: vec![View, Create, Edit],
            },
            Permission {
                resource: Resource::Species,
                actions: vec![View, Create, Edit],
            },
            Permission {
                resource: Resource::PlantLot,
                actions: vec![View, Create, Edit],
            },
            Permission {
                resource: Resource::HealthLog,
                actions: vec![View, Create, Edit],
            },
            Permission {
                resource: Resource::Report,
                actions: vec![View, Export],
            },
        ],
        Role::Analytics => vec![
            Permission {
                resource: Resource::Zone,
                actions: vec![View],
            },
            Permission {
                resource: Resource::Species,
                actions: vec![View],
            },
            Permission {
                resource: Resource::PlantLot,
                actions: vec![View],
            },
            Permission {
                resource: Resource::HealthLog,
                actions: vec![View],
            },
            Permission {
                resource: Resource::Report,
                actions: vec![View, Export],
            },
        ],
        Role::FieldStaff => vec![
            Permission {
                resource: Resource::PlantLot,
                actions: vec![View],
            },
            Permission {
                resource: Resource::HealthLog,
                actions: vec![View, Create],
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_can_migrate_images() {
        let perms = Role::Admin.permission_strings();
        assert!(perms.contains(&"image:migrate".to_string()));
        assert!(perms.contains(&"user:delete".to_string()));
    }

    #[test]
    fn test_reports_visible_to_manager_and_analytics_only() {
        let report_view = "report:view".to_string();
        assert!(Role::Manager.permission_strings().contains(&report_view));
        assert!(Role::Analytics.permission_strings().contains(&report_view));
        assert!(!Role::FieldStaff.permission_strings().contains(&report_view));
    }

    #[test]
    fn test_field_staff_cannot_edit_lots() {
        let perms = Role::FieldStaff.permission_strings();
        assert!(perms.contains(&"health_log:create".to_string()));
        assert!(!perms.contains(&"plant_lot:edit".to_string()));
        assert!(Role::FieldStaff.is_zone_scoped());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("field_staff".parse::<Role>(), Ok(Role::FieldStaff));
        assert!("owner".parse::<Role>().is_err());
    }
}
