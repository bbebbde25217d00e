//! Execution instances and scope boundaries

use crate::cache::{CacheSlot, CacheStats, ExecutionCache};
use crate::error::{EvalError, EvalResult};
use crate::scope::DataScope;
use reportcloud_expr::{CacheKey, ExprId, ExprTree, TreeId};
use reportcloud_types::Value;
use std::fmt;
use std::sync::Arc;

/// One run of a report definition against a data source.
///
/// Owns every piece of mutable state a run needs. Instances never share
/// their cache, so several runs over the same tree cannot observe each
/// other's results.
pub struct ExecutionInstance {
    data: Arc<dyn DataScope>,
    cache: ExecutionCache,
    /// Tree whose cache keys the cache holds, set by the first aggregate
    tree: Option<TreeId>,
}

impl ExecutionInstance {
    /// Start a run over `data`.
    ///
    /// An instance serves one expression tree: cache keys of different trees
    /// overlap, so evaluating an aggregate of a second tree is an error
    /// until [`reset`](Self::reset) is called.
    pub fn new(data: Arc<dyn DataScope>) -> Self {
        Self {
            data,
            cache: ExecutionCache::new(),
            tree: None,
        }
    }

    /// Tree this instance caches aggregates for, if it has cached any
    pub fn tree(&self) -> Option<TreeId> {
        self.tree
    }

    pub(crate) fn bind_tree(&mut self, tree: TreeId) -> EvalResult<()> {
        match self.tree {
            Some(bound) if bound != tree => Err(EvalError::internal(format!(
                "execution instance belongs to {} and cannot evaluate aggregates of {}",
                bound, tree
            ))),
            Some(_) => Ok(()),
            None => {
                self.tree = Some(tree);
                Ok(())
            }
        }
    }

    pub fn data(&self) -> &dyn DataScope {
        self.data.as_ref()
    }

    pub fn cache(&self) -> &ExecutionCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ExecutionCache {
        &mut self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop the cached result of one aggregate occurrence
    pub fn invalidate(&mut self, key: CacheKey) -> Option<Value> {
        let removed = self.cache.remove(&CacheSlot::Aggregate(key));
        if removed.is_some() {
            log::debug!("invalidated aggregate {}", key);
        }
        removed
    }

    /// Drop everything cached so far, ready for an unrelated pass
    pub fn reset(&mut self) {
        self.cache.clear();
        self.tree = None;
    }

    /// Runtime state stored by a definition element
    pub fn work_state(&self, owner: &str, name: &str) -> Option<&Value> {
        self.cache.peek(&CacheSlot::named(owner, name))
    }

    pub fn set_work_state(&mut self, owner: &str, name: &str, value: Value) {
        self.cache.insert(CacheSlot::named(owner, name), value);
    }

    /// Leave the current instance of `boundary`, dropping every result
    /// valid only inside it
    pub fn cross(&mut self, boundary: &ScopeBoundary) {
        let mut dropped = 0;
        for key in &boundary.keys {
            if self.cache.remove(&CacheSlot::Aggregate(*key)).is_some() {
                dropped += 1;
            }
        }
        log::debug!("crossed {} boundary, {} cached aggregates dropped", boundary.name, dropped);
    }
}

impl fmt::Debug for ExecutionInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionInstance")
            .field("cache", &self.cache)
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}

/// Aggregates whose results are only valid within one instance of a scope.
///
/// Scope management crosses the boundary whenever it moves from one
/// instance of the scope to the next (one group to the following group).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeBoundary {
    name: String,
    keys: Vec<CacheKey>,
}

impl ScopeBoundary {
    pub fn new(name: impl Into<String>, keys: Vec<CacheKey>) -> Self {
        Self { name: name.into(), keys }
    }

    /// Boundary covering every aggregate reachable from `roots`
    pub fn for_roots(name: impl Into<String>, tree: &ExprTree, roots: &[ExprId]) -> Self {
        let mut keys = Vec::new();
        for root in roots {
            for key in tree.keys_within(*root) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        Self::new(name, keys)
    }

    /// Boundary covering every aggregate of the tree
    pub fn whole(name: impl Into<String>, tree: &ExprTree) -> Self {
        Self::new(name, tree.cache_keys().collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &[CacheKey] {
        &self.keys
    }
}
