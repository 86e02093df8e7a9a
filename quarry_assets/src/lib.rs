mod cache;
mod error;
mod handle;
mod key;
mod loader;
pub mod prelude;

pub use cache::{CacheConfig, HandleCache, ReleasePolicy, UnknownGroupPolicy};
pub use error::{CacheError, LoadFailure};
pub use handle::{HandleStatus, LoadCompleter, LoadHandle, ResourceValue};
pub use key::{AssetKey, GroupKey, OwnerKey};
pub use loader::{Placement, ResourceLoader};
