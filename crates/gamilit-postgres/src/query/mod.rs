//! Repository traits implemented for [`PgConnection`].
//!
//! [`PgConnection`]: crate::PgConnection

pub mod teacher_classroom;

pub use teacher_classroom::TeacherClassroomRepository;
