//! Request-scoped values read by guards and handlers.

mod identity;
mod path_params;
mod permission_set;

pub use identity::Identity;
pub use path_params::PathParams;
pub use permission_set::PermissionSet;
