//! Diesel models for querying and inserting rows.

mod teacher_classroom;

pub use teacher_classroom::{NewTeacherClassroom, TeacherClassroom};
