//! Authentication and authorization tests
//!
//! - Role permission enforcement for every resource and action
//! - Credential validation applied before accounts are created

use proptest::prelude::*;
use shared::{default_permissions, validate_email, validate_password, Action, Resource, Role};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Admin),
        Just(Role::Manager),
        Just(Role::Analytics),
        Just(Role::FieldStaff),
    ]
}

fn resource_strategy() -> impl Strategy<Value = Resource> {
    prop::sample::select(Resource::ALL.to_vec())
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::View),
        Just(Action::Create),
        Just(Action::Edit),
        Just(Action::Delete),
        Just(Action::Export),
        Just(Action::Migrate),
    ]
}

/// Generate valid email addresses
fn email_strategy() -> impl Strategy<Value = String> {
    "[a-z]{5,10}@[a-z]{3,8}\\.(com|org|net|co\\.th)"
}

/// Generate valid passwords (8+ chars)
fn password_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!@#$%]{8,20}"
}

fn has(role: Role, resource: Resource, action: Action) -> bool {
    role.permission_strings()
        .contains(&format!("{}:{}", resource.as_str(), action.as_str()))
}

#[test]
fn test_admin_has_every_crud_permission() {
    for resource in [
        Resource::User,
        Resource::Zone,
        Resource::Species,
        Resource::PlantLot,
        Resource::HealthLog,
    ] {
        for action in [Action::View, Action::Create, Action::Edit, Action::Delete] {
            assert!(has(Role::Admin, resource, action), "{}:{}", resource.as_str(), action.as_str());
        }
    }
    assert!(has(Role::Admin, Resource::Image, Action::Migrate));
    assert!(has(Role::Admin, Resource::Report, Action::Export));
}

#[test]
fn test_manager_cannot_delete_or_manage_users() {
    assert!(has(Role::Manager, Resource::PlantLot, Action::Edit));
    assert!(has(Role::Manager, Resource::Report, Action::Export));
    assert!(!has(Role::Manager, Resource::PlantLot, Action::Delete));
    assert!(!has(Role::Manager, Resource::User, Action::View));
    assert!(!has(Role::Manager, Resource::Image, Action::Migrate));
}

#[test]
fn test_analytics_is_read_only() {
    assert!(has(Role::Analytics, Resource::HealthLog, Action::View));
    assert!(has(Role::Analytics, Resource::Report, Action::View));
    assert!(!has(Role::Analytics, Resource::HealthLog, Action::Create));
    assert!(!has(Role::Analytics, Resource::Zone, Action::Edit));
}

#[test]
fn test_field_staff_records_health_only() {
    assert!(has(Role::FieldStaff, Resource::PlantLot, Action::View));
    assert!(has(Role::FieldStaff, Resource::HealthLog, Action::Create));
    assert!(!has(Role::FieldStaff, Resource::PlantLot, Action::Create));
    assert!(!has(Role::FieldStaff, Resource::Report, Action::View));
    assert!(Role::FieldStaff.is_zone_scoped());
    assert!(!Role::Manager.is_zone_scoped());
}

#[test]
fn test_role_names_parse_back() {
    for role in [Role::Admin, Role::Manager, Role::Analytics, Role::FieldStaff] {
        assert_eq!(role.as_str().parse::<Role>(), Ok(role));
    }
    assert!("owner".parse::<Role>().is_err());
}

proptest! {
    #[test]
    fn prop_permission_strings_match_table(
        role in role_strategy(),
        resource in resource_strategy(),
        action in action_strategy(),
    ) {
        let granted = default_permissions(role)
            .iter()
            .any(|p| p.resource == resource && p.actions.contains(&action));
        prop_assert_eq!(has(role, resource, action), granted);
    }

    #[test]
    fn prop_only_admin_manages_users(role in role_strategy(), action in action_strategy()) {
        if role != Role::Admin {
            prop_assert!(!has(role, Resource::User, action));
        }
    }

    #[test]
    fn prop_valid_credentials_accepted(email in email_strategy(), password in password_strategy()) {
        prop_assert!(validate_email(&email).is_ok());
        prop_assert!(validate_password(&password).is_ok());
    }

    #[test]
    fn prop_short_passwords_rejected(password in "[a-z0-9]{0,7}") {
        prop_assert!(validate_password(&password).is_err());
    }
}
