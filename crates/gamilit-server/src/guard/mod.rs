//! Declarative route requirements and the guards that enforce them.
//!
//! Requirements are attached to controllers and handlers in a
//! [`RequirementRegistry`] at start-up. Each guarded route resolves its
//! declarations once into a [`GuardChain`], which is evaluated per request:
//!
//! 1. [`role`]: the caller's role is one of the allowed roles.
//! 2. [`permission`]: every required permission is granted.
//! 3. [`tenant`]: the caller belongs to a tenant, when declared.
//! 4. [`ownership`]: the caller owns the resource in the path, when declared.
//!
//! Routes without declarations allow every request.

mod chain;
mod denial;
#[cfg(test)]
pub(crate) mod mock;
pub mod ownership;
pub mod permission;
mod registry;
mod requirements;
pub mod role;
pub mod tenant;

pub use crate::guard::chain::{GuardChain, GuardOutcome, GuardStep};
pub use crate::guard::denial::GuardDenial;
pub use crate::guard::ownership::OwnershipStore;
pub use crate::guard::registry::{HandlerId, RequirementRegistry, RequirementTarget, SharedRegistry};
pub use crate::guard::requirements::{OwnershipRequirement, RouteRequirements};
