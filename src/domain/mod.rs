//! Domain types for the organization admin core.
//! Defines the entities cached per organization and the errors raised over them.

pub mod entity;
pub mod error;
pub mod group;
pub mod repo;
pub mod status;
pub mod team;

pub use entity::*;
pub use error::*;
pub use group::*;
pub use repo::*;
pub use status::*;
pub use team::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_team_permission_display_parse() {
        assert_eq!(TeamPermission::Maintain.to_string(), "maintain");
        assert_eq!(TeamPermission::from_str("ADMIN").unwrap(), TeamPermission::Admin);
        assert_eq!(TeamPermission::from_str("read").unwrap(), TeamPermission::Pull);
        assert!(TeamPermission::from_str("triage").is_err());
    }

    #[test]
    fn test_entity_kind_serializes_like_fetch_errors() {
        assert_eq!(serde_json::to_string(&EntityKind::Repo).unwrap(), "\"repos\"");
        assert_eq!(EntityKind::from_str("teams").unwrap(), EntityKind::Team);
    }

    #[test]
    fn test_validation_errors_are_flagged() {
        assert!(GroupError::DuplicateName("x".into()).is_validation());
        assert!(!GroupError::Conflict { org: "acme".into() }.is_validation());
        assert!(BulkError::NoTargets.is_validation());
        assert!(
            !BulkError::Busy {
                org: "acme".into(),
                kind: EntityKind::Repo
            }
            .is_validation()
        );
    }
}
