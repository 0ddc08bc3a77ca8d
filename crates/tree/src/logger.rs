//! Logger values stored in the tree.

use core::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use plume_core::LoggerPath;

/// What the tree needs from a logger: a replaceable configuration reference.
///
/// The tree never looks inside the event factory. It only hands the same
/// `Arc` to every logger of a subtree, so identity is preserved.
pub trait TreeLogger {
    type EventFactory: ?Sized + Send + Sync;

    fn set_event_factory(&self, factory: Arc<Self::EventFactory>);
}

/// Default logger value: a name plus the event factory it currently uses.
pub struct Logger<F: ?Sized> {
    path: LoggerPath,
    name: String,
    event_factory: RwLock<Arc<F>>,
}

impl<F: ?Sized> Logger<F> {
    pub fn new(path: LoggerPath, event_factory: Arc<F>) -> Self {
        Self {
            name: path.to_string(),
            path,
            event_factory: RwLock::new(event_factory),
        }
    }

    pub fn root(event_factory: Arc<F>) -> Self {
        Self::new(LoggerPath::root(), event_factory)
    }

    /// Dotted name; empty for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &LoggerPath {
        &self.path
    }

    pub fn event_factory(&self) -> Arc<F> {
        let current = self
            .event_factory
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// A logger at `path` that starts out with this logger's event factory.
    ///
    /// Usable directly as the creation factory of a [`crate::TreeCache`].
    pub fn derive(&self, path: &LoggerPath) -> Self {
        Self::new(path.clone(), self.event_factory())
    }
}

impl<F> TreeLogger for Logger<F>
where
    F: ?Sized + Send + Sync,
{
    type EventFactory = F;

    fn set_event_factory(&self, factory: Arc<F>) {
        *self
            .event_factory
            .write()
            .unwrap_or_else(PoisonError::into_inner) = factory;
    }
}

impl<F: ?Sized> fmt::Debug for Logger<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("name", &self.name).finish()
    }
}
