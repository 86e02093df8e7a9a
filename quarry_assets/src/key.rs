use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Opaque name of a loadable resource, or of a label selecting a set of them
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetKey(Arc<str>);

impl AssetKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for AssetKey {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

impl Display for AssetKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of an owning object, taken from the address of its `Arc`
/// allocation
///
/// Only meaningful while the owner is alive; groups keyed by an owner are
/// expected to be released when the owner is torn down.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct OwnerKey(usize);

/// Scoping key under which loaded handles are registered for bulk release
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GroupKey {
    /// Implicit group used when a load is not explicitly scoped
    #[default]
    Default,
    Named(Arc<str>),
    Owner(OwnerKey),
}

impl GroupKey {
    pub fn named(name: impl AsRef<str>) -> Self {
        GroupKey::Named(Arc::from(name.as_ref()))
    }

    /// Key a group by the identity of an `Arc`-held owner
    pub fn owner<T: ?Sized>(owner: &Arc<T>) -> Self {
        GroupKey::Owner(OwnerKey(Arc::as_ptr(owner) as *const () as usize))
    }
}

impl From<&str> for GroupKey {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl Display for GroupKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Default => write!(f, "default"),
            GroupKey::Named(name) => write!(f, "{}", name),
            GroupKey::Owner(owner) => write!(f, "owner@{:#x}", owner.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_key_round_trip() {
        let key = AssetKey::from("tree_01");
        assert_eq!(key.as_str(), "tree_01");
        assert_eq!(key, AssetKey::from(String::from("tree_01")));
        assert_eq!(key.to_string(), "tree_01");
    }

    #[test]
    fn test_default_group_is_structural() {
        assert_eq!(GroupKey::default(), GroupKey::Default);
        // the implicit group is not a magic string
        assert_ne!(GroupKey::default(), GroupKey::named("default"));
    }

    #[test]
    fn test_named_group_equality() {
        assert_eq!(GroupKey::named("level1"), GroupKey::from("level1"));
        assert_ne!(GroupKey::named("level1"), GroupKey::named("level2"));
    }

    #[test]
    fn test_owner_identity() {
        let scene_a: Arc<str> = Arc::from("scene");
        let scene_b: Arc<str> = Arc::from("scene");

        // equal contents, distinct allocations
        assert_ne!(GroupKey::owner(&scene_a), GroupKey::owner(&scene_b));
        assert_eq!(GroupKey::owner(&scene_a), GroupKey::owner(&scene_a.clone()));
    }
}
