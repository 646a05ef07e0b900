//! Teacher to classroom ownership facts.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::teacher_classrooms;
use crate::types::ClassroomRole;

/// Association between a teacher and a classroom they administer.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = teacher_classrooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeacherClassroom {
    /// Teacher's account.
    pub teacher_id: Uuid,
    /// Administered classroom.
    pub classroom_id: Uuid,
    /// Role within the classroom.
    pub member_role: ClassroomRole,
    /// Account that granted the association.
    pub granted_by: Uuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// `None` while the association is active.
    pub revoked_at: Option<Timestamp>,
}

impl TeacherClassroom {
    /// Returns whether the association has not been revoked.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }

    /// Returns when the association was revoked, if it was.
    pub fn revoked_at(&self) -> Option<jiff::Timestamp> {
        self.revoked_at.map(Into::into)
    }
}

/// Data for granting a teacher access to a classroom.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = teacher_classrooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewTeacherClassroom {
    pub teacher_id: Uuid,
    pub classroom_id: Uuid,
    pub member_role: ClassroomRole,
    pub granted_by: Uuid,
}

impl NewTeacherClassroom {
    /// Creates an association with an explicit role.
    pub fn new(teacher_id: Uuid, classroom_id: Uuid, role: ClassroomRole, granted_by: Uuid) -> Self {
        Self {
            teacher_id,
            classroom_id,
            member_role: role,
            granted_by,
        }
    }

    /// Creates a self-granted owner association.
    pub fn new_owner(teacher_id: Uuid, classroom_id: Uuid) -> Self {
        Self::new(teacher_id, classroom_id, ClassroomRole::Owner, teacher_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_owner_is_self_granted() {
        let teacher_id = Uuid::new_v4();
        let classroom_id = Uuid::new_v4();
        let grant = NewTeacherClassroom::new_owner(teacher_id, classroom_id);

        assert_eq!(grant.granted_by, teacher_id);
        assert_eq!(grant.member_role, ClassroomRole::Owner);
    }

    #[test]
    fn revocation_marks_inactive() {
        let now = Timestamp::from(jiff::Timestamp::now());
        let mut fact = TeacherClassroom {
            teacher_id: Uuid::new_v4(),
            classroom_id: Uuid::new_v4(),
            member_role: ClassroomRole::CoOwner,
            granted_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            revoked_at: None,
        };
        assert!(fact.is_active());

        fact.revoked_at = Some(now);
        assert!(!fact.is_active());
        assert!(fact.revoked_at().is_some());
    }
}
