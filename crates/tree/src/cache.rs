//! Arena-backed logger tree.
//!
//! Nodes live in a single `Vec` and refer to their children by index. Nodes
//! are never removed, so indices stay valid for the life of the cache. One
//! `RwLock` guards the arena: lookups share it, while insertion and
//! configuration propagation hold it exclusively.

use core::convert::Infallible;
use core::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use plume_core::{CoreResult, LoggerPath};

use crate::logger::{Logger, TreeLogger};

type NodeId = usize;

const ROOT: NodeId = 0;

struct Node<L> {
    path: LoggerPath,
    logger: Arc<L>,
    children: Vec<NodeId>,
}

impl<L> Node<L> {
    fn new(path: LoggerPath, logger: Arc<L>) -> Self {
        Self {
            path,
            logger,
            children: Vec::new(),
        }
    }
}

/// Hierarchical cache of loggers.
///
/// Siblings are kept in a plain list and scanned linearly: logger hierarchies
/// are shallow with small fan-out, and callers keep the loggers they resolve.
/// Sibling segments are unique, which creation enforces by re-resolving under
/// the write lock before inserting.
pub struct TreeCache<L> {
    nodes: RwLock<Vec<Node<L>>>,
}

impl<F> TreeCache<Logger<F>>
where
    F: ?Sized + Send + Sync,
{
    /// Cache whose root logger uses `factory`.
    pub fn with_root_factory(factory: Arc<F>) -> Self {
        Self::new(Logger::root(factory))
    }
}

impl<L: TreeLogger> TreeCache<L> {
    pub fn new(root: L) -> Self {
        Self {
            nodes: RwLock::new(vec![Node::new(LoggerPath::root(), Arc::new(root))]),
        }
    }

    pub fn root(&self) -> Arc<L> {
        Arc::clone(&self.read()[ROOT].logger)
    }

    /// Logger at exactly `path`. The empty path always resolves to the root.
    pub fn find(&self, path: &LoggerPath) -> Option<Arc<L>> {
        let nodes = self.read();
        search(&nodes, path).map(|id| Arc::clone(&nodes[id].logger))
    }

    /// Logger at `path`, creating every missing prefix on the way.
    ///
    /// Each new logger is produced by `factory(parent, prefix)`, where
    /// `parent` is the logger one level up. Creation is all-or-nothing: the
    /// missing loggers are built first and only inserted once every factory
    /// call has succeeded. On error the tree is left untouched.
    ///
    /// The factory runs while the tree is locked and must not call back into
    /// this cache.
    pub fn create_recursively<C, E>(&self, path: &LoggerPath, mut factory: C) -> Result<Arc<L>, E>
    where
        C: FnMut(&L, &LoggerPath) -> Result<L, E>,
    {
        if let Some(found) = self.find(path) {
            return Ok(found);
        }

        let mut nodes = self.write();

        // Another caller may have inserted part or all of the path since the
        // optimistic lookup above.
        let (mut cursor, depth) = deepest(&nodes, path);

        let mut pending: Vec<(LoggerPath, Arc<L>)> = Vec::with_capacity(path.len() - depth);
        for len in depth + 1..=path.len() {
            let prefix = path.prefix(len);
            let parent: &L = match pending.last() {
                Some((_, logger)) => logger,
                None => &nodes[cursor].logger,
            };
            let logger = factory(parent, &prefix)?;
            pending.push((prefix, Arc::new(logger)));
        }

        let created = pending.len();
        for (prefix, logger) in pending {
            let id = nodes.len();
            nodes.push(Node::new(prefix, logger));
            nodes[cursor].children.push(id);
            cursor = id;
        }

        if created > 0 {
            tracing::debug!(path = %path, created, "created loggers");
        }

        Ok(Arc::clone(&nodes[cursor].logger))
    }

    /// [`TreeCache::create_recursively`] for factories that cannot fail.
    pub fn get_or_create<C>(&self, path: &LoggerPath, mut factory: C) -> Arc<L>
    where
        C: FnMut(&L, &LoggerPath) -> L,
    {
        let created = self.create_recursively(path, |parent, prefix| {
            Ok::<_, Infallible>(factory(parent, prefix))
        });
        match created {
            Ok(logger) => logger,
            Err(never) => match never {},
        }
    }

    /// Resolve a dotted logger name such as `com.acme.billing`.
    pub fn logger_at<C>(&self, name: &str, factory: C) -> CoreResult<Arc<L>>
    where
        C: FnMut(&L, &LoggerPath) -> L,
    {
        let path = LoggerPath::parse(name)?;
        Ok(self.get_or_create(&path, factory))
    }

    /// Point the logger at `path` and all of its descendants to `factory`.
    ///
    /// Every logger in the subtree is overwritten, whatever it held before.
    /// An unknown path is a no-op. Returns the number of loggers updated.
    pub fn update_logger_event_factory(
        &self,
        path: &LoggerPath,
        factory: Arc<L::EventFactory>,
    ) -> usize {
        let nodes = self.write();

        let Some(base) = search(&nodes, path) else {
            tracing::trace!(path = %path, "no logger to update");
            return 0;
        };

        // Pre-order: a node before its children, children in insertion order.
        let mut stack = vec![base];
        let mut updated = 0;
        while let Some(id) = stack.pop() {
            let node = &nodes[id];
            node.logger.set_event_factory(Arc::clone(&factory));
            updated += 1;
            stack.extend(node.children.iter().rev().copied());
        }

        tracing::debug!(path = %path, updated, "propagated event factory");
        updated
    }

    /// Number of loggers in the tree, root included.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Always false: the root exists from construction on.
    pub fn is_empty(&self) -> bool {
        false
    }

    // The arena is only mutated after every fallible step has finished, so
    // a poisoned lock still guards a consistent tree.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Node<L>>> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Node<L>>> {
        self.nodes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<L> fmt::Debug for TreeCache<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.nodes.read().map(|nodes| nodes.len()).unwrap_or_default();
        f.debug_struct("TreeCache").field("len", &len).finish()
    }
}

/// Child of `parent` whose path has `path[index]` at `index`.
///
/// Siblings are unique per segment, so the first hit is the only one.
fn child_at<L>(
    nodes: &[Node<L>],
    parent: NodeId,
    path: &LoggerPath,
    index: usize,
) -> Option<NodeId> {
    let segment = path.segment(index)?;
    nodes[parent]
        .children
        .iter()
        .copied()
        .find(|&child| nodes[child].path.segment(index) == Some(segment))
}

/// Deepest existing node along `path`, with the number of segments matched.
fn deepest<L>(nodes: &[Node<L>], path: &LoggerPath) -> (NodeId, usize) {
    let mut cursor = ROOT;
    let mut depth = 0;
    while let Some(child) = child_at(nodes, cursor, path, depth) {
        cursor = child;
        depth += 1;
    }
    (cursor, depth)
}

fn search<L>(nodes: &[Node<L>], path: &LoggerPath) -> Option<NodeId> {
    let (id, depth) = deepest(nodes, path);
    (depth == path.len()).then_some(id)
}
