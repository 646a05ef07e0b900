use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Permissions granted to a caller, as `resource:action` strings.
///
/// Tokens carry permissions in one of three shapes, all accepted here:
///
/// ```json
/// ["content:read", "content:write"]
/// {"content:read": true, "content:write": false}
/// {"content": ["read", "write"]}
/// ```
///
/// Boolean entries set to `false` are not granted. The map shapes may be mixed
/// within one object. Serialization always produces the list shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPermissions", into = "Vec<String>")]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `permission` is granted.
    #[inline]
    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    /// Returns the first entry of `required` that is not granted.
    pub fn first_missing<'a, I>(&self, required: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        required.into_iter().find(|p| !self.contains(p))
    }

    /// Grants a permission.
    pub fn insert(&mut self, permission: impl Into<String>) -> bool {
        self.0.insert(permission.into())
    }

    /// Revokes a permission.
    pub fn remove(&mut self, permission: &str) -> bool {
        self.0.remove(permission)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<PermissionSet> for Vec<String> {
    fn from(value: PermissionSet) -> Self {
        value.0.into_iter().collect()
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for permission in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(permission)?;
            first = false;
        }
        Ok(())
    }
}

/// Wire shapes accepted for the `permissions` claim.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPermissions {
    List(Vec<String>),
    Map(BTreeMap<String, RawGrant>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGrant {
    Flag(bool),
    Actions(Vec<String>),
}

impl From<RawPermissions> for PermissionSet {
    fn from(raw: RawPermissions) -> Self {
        match raw {
            RawPermissions::List(list) => list.into_iter().collect(),
            RawPermissions::Map(map) => {
                let mut set = PermissionSet::new();
                for (key, grant) in map {
                    match grant {
                        RawGrant::Flag(true) => {
                            set.insert(key);
                        }
                        RawGrant::Flag(false) => {}
                        RawGrant::Actions(actions) => {
                            for action in actions {
                                set.insert(format!("{key}:{action}"));
                            }
                        }
                    }
                }
                set
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_shape() -> anyhow::Result<()> {
        let set: PermissionSet = serde_json::from_str(r#"["content:read", "content:read"]"#)?;
        assert_eq!(set.len(), 1);
        assert!(set.contains("content:read"));
        Ok(())
    }

    #[test]
    fn flag_map_shape_skips_false() -> anyhow::Result<()> {
        let set: PermissionSet =
            serde_json::from_str(r#"{"content:read": true, "content:write": false}"#)?;
        assert!(set.contains("content:read"));
        assert!(!set.contains("content:write"));
        Ok(())
    }

    #[test]
    fn action_map_shape() -> anyhow::Result<()> {
        let set: PermissionSet =
            serde_json::from_str(r#"{"content": ["read", "write"], "classroom:manage": true}"#)?;
        assert!(set.contains("content:read"));
        assert!(set.contains("content:write"));
        assert!(set.contains("classroom:manage"));
        assert_eq!(set.len(), 3);
        Ok(())
    }

    #[test]
    fn serializes_as_sorted_list() -> anyhow::Result<()> {
        let set: PermissionSet = ["content:write", "content:read"].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&set)?,
            r#"["content:read","content:write"]"#
        );
        Ok(())
    }

    #[test]
    fn first_missing_reports_in_required_order() {
        let set: PermissionSet = ["content:read"].into_iter().collect();
        assert_eq!(set.first_missing(["content:read"]), None);
        assert_eq!(
            set.first_missing(["content:read", "content:write", "content:delete"]),
            Some("content:write")
        );
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(serde_json::from_str::<PermissionSet>(r#""content:read""#).is_err());
        assert!(serde_json::from_str::<PermissionSet>(r#"{"content": 1}"#).is_err());
    }
}
