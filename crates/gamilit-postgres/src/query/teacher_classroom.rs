//! Teacher classroom repository for ownership lookups and grants.

use std::future::Future;

use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::model::{NewTeacherClassroom, TeacherClassroom};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for teacher to classroom ownership facts.
pub trait TeacherClassroomRepository {
    /// Finds the active association for a `(teacher, classroom)` pair.
    ///
    /// Primary-key point lookup without row locks. Revoked associations are
    /// treated as absent.
    fn find_active_teacher_classroom(
        &mut self,
        teacher_id: Uuid,
        classroom_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<TeacherClassroom>>> + Send;

    /// Grants a teacher access to a classroom.
    ///
    /// Re-granting a revoked association reactivates it with the new role.
    fn grant_teacher_classroom(
        &mut self,
        grant: NewTeacherClassroom,
    ) -> impl Future<Output = PgResult<TeacherClassroom>> + Send;

    /// Revokes an active association.
    ///
    /// Returns `false` when there was nothing active to revoke.
    fn revoke_teacher_classroom(
        &mut self,
        teacher_id: Uuid,
        classroom_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;

    /// Lists the active associations of a teacher, oldest first.
    fn list_teacher_classrooms(
        &mut self,
        teacher_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<TeacherClassroom>>> + Send;
}

impl TeacherClassroomRepository for PgConnection {
    async fn find_active_teacher_classroom(
        &mut self,
        teacher_id: Uuid,
        classroom_id: Uuid,
    ) -> PgResult<Option<TeacherClassroom>> {
        use schema::teacher_classrooms::dsl;

        let fact = dsl::teacher_classrooms
            .find((teacher_id, classroom_id))
            .filter(dsl::revoked_at.is_null())
            .select(TeacherClassroom::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        tracing::trace!(
            target: TRACING_TARGET_QUERY,
            teacher_id = %teacher_id,
            classroom_id = %classroom_id,
            found = fact.is_some(),
            "ownership lookup"
        );

        Ok(fact)
    }

    async fn grant_teacher_classroom(
        &mut self,
        grant: NewTeacherClassroom,
    ) -> PgResult<TeacherClassroom> {
        use schema::teacher_classrooms::dsl;

        let now = Timestamp::from(jiff::Timestamp::now());
        let fact = diesel::insert_into(dsl::teacher_classrooms)
            .values(&grant)
            .on_conflict((dsl::teacher_id, dsl::classroom_id))
            .do_update()
            .set((
                dsl::member_role.eq(excluded(dsl::member_role)),
                dsl::granted_by.eq(excluded(dsl::granted_by)),
                dsl::updated_at.eq(now),
                dsl::revoked_at.eq(None::<Timestamp>),
            ))
            .returning(TeacherClassroom::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::info!(
            target: TRACING_TARGET_QUERY,
            teacher_id = %fact.teacher_id,
            classroom_id = %fact.classroom_id,
            role = %fact.member_role,
            "classroom access granted"
        );

        Ok(fact)
    }

    async fn revoke_teacher_classroom(
        &mut self,
        teacher_id: Uuid,
        classroom_id: Uuid,
    ) -> PgResult<bool> {
        use schema::teacher_classrooms::dsl;

        let now = Timestamp::from(jiff::Timestamp::now());
        let affected = diesel::update(dsl::teacher_classrooms.find((teacher_id, classroom_id)))
            .filter(dsl::revoked_at.is_null())
            .set((dsl::revoked_at.eq(Some(now)), dsl::updated_at.eq(now)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        if affected > 0 {
            tracing::info!(
                target: TRACING_TARGET_QUERY,
                teacher_id = %teacher_id,
                classroom_id = %classroom_id,
                "classroom access revoked"
            );
        }

        Ok(affected > 0)
    }

    async fn list_teacher_classrooms(
        &mut self,
        teacher_id: Uuid,
    ) -> PgResult<Vec<TeacherClassroom>> {
        use schema::teacher_classrooms::dsl;

        let facts = dsl::teacher_classrooms
            .filter(dsl::teacher_id.eq(teacher_id))
            .filter(dsl::revoked_at.is_null())
            .select(TeacherClassroom::as_select())
            .order(dsl::created_at.asc())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(facts)
    }
}
