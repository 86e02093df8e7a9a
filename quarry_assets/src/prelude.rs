pub use super::cache::{CacheConfig, HandleCache, ReleasePolicy, UnknownGroupPolicy};
pub use super::error::{CacheError, LoadFailure};
pub use super::handle::{HandleStatus, LoadCompleter, LoadHandle, ResourceValue};
pub use super::key::{AssetKey, GroupKey, OwnerKey};
pub use super::loader::{Placement, ResourceLoader};
