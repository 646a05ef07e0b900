use std::borrow::Cow;

/// Access requirements declared for a route.
///
/// Empty role or permission lists mean "no restriction". Lists keep their
/// declaration order and never contain duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "requirements do nothing unless attached to a registry"]
pub struct RouteRequirements {
    roles: Vec<String>,
    permissions: Vec<String>,
    public: bool,
    requires_tenant: bool,
    ownership: Option<OwnershipRequirement>,
}

/// The path parameter holding the resource the caller must own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnershipRequirement {
    param: Cow<'static, str>,
}

impl OwnershipRequirement {
    pub fn new(param: impl Into<Cow<'static, str>>) -> Self {
        Self {
            param: param.into(),
        }
    }

    /// Name of the path parameter, such as `classroomId`.
    #[inline]
    pub fn param(&self) -> &str {
        &self.param
    }
}

impl RouteRequirements {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bypasses every guard, including ownership.
    pub fn public() -> Self {
        Self {
            public: true,
            ..Self::default()
        }
    }

    /// Adds allowed roles. The caller needs any one of them.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.roles, roles);
        self
    }

    /// Adds required permissions. The caller needs all of them.
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.permissions, permissions);
        self
    }

    /// Requires the caller to belong to a tenant.
    pub fn with_tenant(mut self) -> Self {
        self.requires_tenant = true;
        self
    }

    /// Requires an active ownership fact for the resource named by `param`.
    pub fn with_ownership(mut self, param: impl Into<Cow<'static, str>>) -> Self {
        self.ownership = Some(OwnershipRequirement::new(param));
        self
    }

    #[inline]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    #[inline]
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.public
    }

    #[inline]
    pub fn requires_tenant(&self) -> bool {
        self.requires_tenant
    }

    #[inline]
    pub fn ownership(&self) -> Option<&OwnershipRequirement> {
        self.ownership.as_ref()
    }

    /// Returns whether nothing at all is declared.
    pub fn is_unrestricted(&self) -> bool {
        self.public
            || (self.roles.is_empty()
                && self.permissions.is_empty()
                && !self.requires_tenant
                && self.ownership.is_none())
    }

    /// Folds a later declaration on the same target into this one.
    ///
    /// Lists are unioned, flags are or-ed and a later ownership requirement
    /// replaces an earlier one.
    pub(crate) fn merge(&mut self, other: RouteRequirements) {
        extend_unique(&mut self.roles, other.roles);
        extend_unique(&mut self.permissions, other.permissions);
        self.public |= other.public;
        self.requires_tenant |= other.requires_tenant;
        if other.ownership.is_some() {
            self.ownership = other.ownership;
        }
    }

    /// Resolves each requirement kind independently: the handler level wins
    /// when it declares the kind, otherwise the controller level applies.
    pub(crate) fn resolve(handler: Option<&Self>, controller: Option<&Self>) -> Self {
        fn nearest(handler: Option<&[String]>, controller: Option<&[String]>) -> Vec<String> {
            handler
                .filter(|list| !list.is_empty())
                .or(controller)
                .map(<[String]>::to_vec)
                .unwrap_or_default()
        }

        Self {
            roles: nearest(handler.map(Self::roles), controller.map(Self::roles)),
            permissions: nearest(
                handler.map(Self::permissions),
                controller.map(Self::permissions),
            ),
            public: handler.is_some_and(Self::is_public)
                || controller.is_some_and(Self::is_public),
            requires_tenant: handler.is_some_and(Self::requires_tenant)
                || controller.is_some_and(Self::requires_tenant),
            ownership: handler
                .and_then(Self::ownership)
                .or_else(|| controller.and_then(Self::ownership))
                .cloned(),
        }
    }
}

fn extend_unique<I, S>(target: &mut Vec<String>, items: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for item in items {
        let item = item.into();
        if !target.contains(&item) {
            target.push(item);
        }
    }
}
