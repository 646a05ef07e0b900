//! Enumerations mirrored from PostgreSQL types.

mod classroom_role;

pub use classroom_role::ClassroomRole;
