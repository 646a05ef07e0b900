//! Route requirements declared per controller and per handler.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::RouteRequirements;

/// Identifies a route handler within its controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId {
    controller: &'static str,
    handler: &'static str,
}

impl HandlerId {
    pub const fn new(controller: &'static str, handler: &'static str) -> Self {
        Self {
            controller,
            handler,
        }
    }

    #[inline]
    pub const fn controller(&self) -> &'static str {
        self.controller
    }

    #[inline]
    pub const fn handler(&self) -> &'static str {
        self.handler
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.controller, self.handler)
    }
}

/// Where a declaration is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequirementTarget {
    /// Applies to every handler of the controller unless overridden.
    Controller(&'static str),
    /// Applies to a single handler.
    Handler(HandlerId),
}

/// Requirement declarations, populated at start-up and read on dispatch.
///
/// Share it as [`SharedRegistry`] once every route is registered.
#[derive(Debug, Clone, Default)]
pub struct RequirementRegistry {
    controllers: HashMap<&'static str, RouteRequirements>,
    handlers: HashMap<HandlerId, RouteRequirements>,
}

/// Read-only registry shared across requests.
pub type SharedRegistry = Arc<RequirementRegistry>;

impl RequirementRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares requirements on a controller or a handler.
    ///
    /// Declaring twice on the same target merges the declarations.
    pub fn attach(&mut self, requirement: RouteRequirements, target: RequirementTarget) -> &mut Self {
        let declared = match target {
            RequirementTarget::Controller(controller) => {
                self.controllers.entry(controller).or_default()
            }
            RequirementTarget::Handler(handler) => self.handlers.entry(handler).or_default(),
        };

        declared.merge(requirement);
        self
    }

    /// Returns the effective requirements of `handler`.
    ///
    /// Each kind resolves independently to the handler declaration, then the
    /// controller declaration, then no restriction.
    pub fn read(&self, handler: HandlerId) -> RouteRequirements {
        RouteRequirements::resolve(
            self.handlers.get(&handler),
            self.controllers.get(handler.controller()),
        )
    }

    /// Freezes the registry for sharing across requests.
    #[inline]
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: HandlerId = HandlerId::new("classrooms", "list");
    const BLOCK: HandlerId = HandlerId::new("classrooms", "block_student");
    const HEALTH: HandlerId = HandlerId::new("health", "check");

    fn registry() -> RequirementRegistry {
        let mut registry = RequirementRegistry::new();
        registry
            .attach(
                RouteRequirements::new().with_roles(["teacher", "admin"]),
                RequirementTarget::Controller("classrooms"),
            )
            .attach(
                RouteRequirements::new().with_permissions(["classroom:manage"]),
                RequirementTarget::Handler(BLOCK),
            )
            .attach(
                RouteRequirements::new().with_ownership("classroomId"),
                RequirementTarget::Handler(BLOCK),
            );
        registry
    }

    #[test]
    fn undeclared_handlers_are_unrestricted() {
        assert!(registry().read(HEALTH).is_unrestricted());
    }

    #[test]
    fn controller_declaration_applies_to_handlers() {
        let requirements = registry().read(LIST);
        assert_eq!(requirements.roles(), ["teacher", "admin"]);
        assert!(requirements.permissions().is_empty());
        assert!(requirements.ownership().is_none());
    }

    #[test]
    fn handler_declarations_stack_over_controller() {
        let requirements = registry().read(BLOCK);
        assert_eq!(requirements.roles(), ["teacher", "admin"]);
        assert_eq!(requirements.permissions(), ["classroom:manage"]);
        assert_eq!(
            requirements.ownership().map(|o| o.param()),
            Some("classroomId")
        );
    }

    #[test]
    fn handler_roles_override_controller_roles() {
        let mut registry = registry();
        registry.attach(
            RouteRequirements::new().with_roles(["admin"]),
            RequirementTarget::Handler(LIST),
        );

        assert_eq!(registry.read(LIST).roles(), ["admin"]);
    }

    #[test]
    fn handler_id_display() {
        assert_eq!(BLOCK.to_string(), "classrooms::block_student");
    }
}
