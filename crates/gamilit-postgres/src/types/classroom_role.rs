use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Role a teacher holds within a classroom they administer.
///
/// Corresponds to the `CLASSROOM_ROLE` PostgreSQL enum. Both variants count as
/// ownership for request authorization.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::ClassroomRole"]
pub enum ClassroomRole {
    /// Created the classroom or had it assigned by an administrator.
    #[db_rename = "owner"]
    #[serde(rename = "owner")]
    #[strum(serialize = "owner")]
    #[default]
    Owner,

    /// Invited by an owner to co-administer the classroom.
    #[db_rename = "co_owner"]
    #[serde(rename = "co_owner")]
    #[strum(serialize = "co_owner")]
    CoOwner,
}

impl ClassroomRole {
    /// Returns whether this role may grant or revoke other teachers.
    #[inline]
    pub fn can_manage_teachers(self) -> bool {
        matches!(self, ClassroomRole::Owner)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn string_forms_match_database_labels() {
        assert_eq!(ClassroomRole::Owner.to_string(), "owner");
        assert_eq!(ClassroomRole::CoOwner.to_string(), "co_owner");
        assert_eq!(ClassroomRole::from_str("co_owner").ok(), Some(ClassroomRole::CoOwner));
    }

    #[test]
    fn only_owners_manage_teachers() {
        assert!(ClassroomRole::Owner.can_manage_teachers());
        assert!(!ClassroomRole::CoOwner.can_manage_teachers());
    }
}
