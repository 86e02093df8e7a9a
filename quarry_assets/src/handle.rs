use crate::error::{CacheError, LoadFailure};
use crate::key::AssetKey;
use std::any::Any;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// Type-erased payload of a settled load
pub type ResourceValue = Arc<dyn Any + Send + Sync>;

pub(crate) type Settlement = Result<ResourceValue, LoadFailure>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HandleStatus {
    /// Load issued, not yet settled
    Pending,
    /// Settled with a value
    Succeeded,
    /// Settled with a failure
    Failed,
}

/// One load operation and its eventual settled value
///
/// Handles are cheap to clone; clones observe the same settlement and share
/// one validity flag.
#[derive(Clone)]
pub struct LoadHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    key: AssetKey,
    settled: watch::Receiver<Option<Settlement>>,
    valid: AtomicBool,
}

impl Debug for LoadHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadHandle")
            .field("key", &self.inner.key)
            .field("status", &self.status())
            .field("valid", &self.is_valid())
            .finish()
    }
}

impl LoadHandle {
    /// Create a pending handle along with the completer that settles it
    pub fn new(key: AssetKey) -> (Self, LoadCompleter) {
        let (send, recv) = watch::channel(None);
        let handle = Self {
            inner: Arc::new(HandleInner {
                key,
                settled: recv,
                valid: AtomicBool::new(true),
            }),
        };
        (handle, LoadCompleter { send })
    }

    pub fn key(&self) -> &AssetKey {
        &self.inner.key
    }

    pub fn status(&self) -> HandleStatus {
        match &*self.inner.settled.borrow() {
            None => HandleStatus::Pending,
            Some(Ok(_)) => HandleStatus::Succeeded,
            Some(Err(_)) => HandleStatus::Failed,
        }
    }

    /// A handle stops being valid once its underlying resource is released
    pub fn is_valid(&self) -> bool {
        self.inner.valid.load(Ordering::Acquire)
    }

    /// Whether two handles track the same load operation
    pub fn ptr_eq(a: &LoadHandle, b: &LoadHandle) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub(crate) fn invalidate(&self) {
        self.inner.valid.store(false, Ordering::Release);
    }

    /// Wait until the load settles, in either direction
    pub(crate) async fn settled(&self) -> Settlement {
        let mut settled = self.inner.settled.clone();
        match settled.wait_for(|settlement| settlement.is_some()).await {
            Ok(settlement) => (*settlement).clone().unwrap(),
            // completer dropped without settling, report as a failed load
            Err(_) => Err(LoadFailure::new(anyhow::anyhow!(
                "load for '{}' was abandoned before settling",
                self.inner.key
            ))),
        }
    }

    pub(crate) fn try_value(&self) -> Result<ResourceValue, CacheError> {
        if !self.is_valid() {
            return Err(CacheError::Released(self.inner.key.clone()));
        }
        match &*self.inner.settled.borrow() {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(failure)) => Err(CacheError::LoadFailed {
                key: self.inner.key.clone(),
                failure: failure.clone(),
            }),
            None => Err(CacheError::Unsettled(self.inner.key.clone())),
        }
    }

    /// Read the settled value at a concrete type
    pub fn value<T: Any + Send + Sync>(&self) -> Result<Arc<T>, CacheError> {
        downcast_value(&self.inner.key, self.try_value()?)
    }
}

/// Sender half of a handle's settlement, handed to loader implementations
pub struct LoadCompleter {
    send: watch::Sender<Option<Settlement>>,
}

impl LoadCompleter {
    pub fn succeed<T: Any + Send + Sync>(self, value: T) {
        self.succeed_erased(Arc::new(value));
    }

    pub fn succeed_erased(self, value: ResourceValue) {
        let _ = self.send.send(Some(Ok(value)));
    }

    pub fn fail(self, error: anyhow::Error) {
        let _ = self.send.send(Some(Err(LoadFailure::new(error))));
    }
}

pub(crate) fn downcast_value<T: Any + Send + Sync>(
    key: &AssetKey,
    value: ResourceValue,
) -> Result<Arc<T>, CacheError> {
    value.downcast::<T>().map_err(|_| CacheError::TypeMismatch {
        key: key.clone(),
        requested: std::any::type_name::<T>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct Texture(&'static str);

    #[test]
    fn test_status_transitions() {
        let (handle, completer) = LoadHandle::new(AssetKey::from("tree_01"));
        assert_eq!(handle.status(), HandleStatus::Pending);
        assert!(matches!(
            handle.value::<Texture>(),
            Err(CacheError::Unsettled(..))
        ));

        completer.succeed(Texture("tree_01"));
        assert_eq!(handle.status(), HandleStatus::Succeeded);
        assert_eq!(*handle.value::<Texture>().unwrap(), Texture("tree_01"));
    }

    #[test]
    fn test_failed_settlement() {
        let (handle, completer) = LoadHandle::new(AssetKey::from("missing_asset"));
        completer.fail(anyhow::anyhow!("bundle not found"));
        assert_eq!(handle.status(), HandleStatus::Failed);
        assert!(matches!(
            handle.value::<Texture>(),
            Err(CacheError::LoadFailed { .. })
        ));
    }

    #[test]
    fn test_value_type_check() {
        let (handle, completer) = LoadHandle::new(AssetKey::from("tree_01"));
        completer.succeed(Texture("tree_01"));
        assert!(matches!(
            handle.value::<String>(),
            Err(CacheError::TypeMismatch { .. })
        ));
        // a mismatching read does not disturb the stored value
        assert!(handle.value::<Texture>().is_ok());
    }

    #[test]
    fn test_invalidate_is_shared_between_clones() {
        let (handle, completer) = LoadHandle::new(AssetKey::from("tree_01"));
        completer.succeed(Texture("tree_01"));
        let clone = handle.clone();
        assert!(LoadHandle::ptr_eq(&handle, &clone));

        handle.invalidate();
        assert!(!clone.is_valid());
        assert!(matches!(
            clone.value::<Texture>(),
            Err(CacheError::Released(..))
        ));
    }

    #[tokio::test]
    async fn test_settled_after_the_fact() {
        let (handle, completer) = LoadHandle::new(AssetKey::from("tree_01"));
        completer.succeed(Texture("tree_01"));
        // settling before anyone waits must still be observed
        let value = handle.settled().await.unwrap();
        assert_eq!(*value.downcast::<Texture>().unwrap(), Texture("tree_01"));
    }

    #[tokio::test]
    async fn test_settled_when_completer_dropped() {
        let (handle, completer) = LoadHandle::new(AssetKey::from("tree_01"));
        drop(completer);
        assert!(handle.settled().await.is_err());
    }
}
