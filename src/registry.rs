//! Per-test mock registry.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::debug;

/// Type-erased `Arc<OnceLock<Arc<M>>>` for some mock type `M`.
type Slot = Arc<dyn Any + Send + Sync>;

/// Lazily created mock instances, at most one per mock type.
///
/// Ordering constraints declared from separate combinator call sites must land on the same
/// mock to be enforced jointly, so every resolution of a type yields the same instance.
#[derive(Debug, Default)]
pub struct Registry {
    mocks: Mutex<HashMap<TypeId, Slot>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached instance of `M`, creating it with `factory` on first use.
    ///
    /// The factory runs outside the registry lock, so it may resolve other mock types from
    /// the same registry. Resolving `M` itself from its own factory never returns.
    pub fn resolve<M, F>(&self, factory: F) -> Arc<M>
    where
        M: Send + Sync + 'static,
        F: FnOnce() -> M,
    {
        let slot = self.slot::<M>();
        let mock = slot.get_or_init(|| {
            let mock = Arc::new(factory());
            debug!(mock = type_name::<M>(), "created mock instance");
            mock
        });
        Arc::clone(mock)
    }

    fn slot<M: Send + Sync + 'static>(&self) -> Arc<OnceLock<Arc<M>>> {
        let mut mocks = self.mocks.lock().unwrap_or_else(PoisonError::into_inner);
        let key = TypeId::of::<M>();
        if let Some(slot) = mocks
            .get(&key)
            .cloned()
            .and_then(|slot| slot.downcast::<OnceLock<Arc<M>>>().ok())
        {
            return slot;
        }
        let slot = Arc::new(OnceLock::new());
        mocks.insert(key, Arc::clone(&slot) as Slot);
        slot
    }

    /// Number of resolved mock types.
    pub fn len(&self) -> usize {
        self.mocks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no instance was created yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
