//! Frozen expression arena

use crate::dump;
use crate::ids::{CacheKey, ExprId, TreeId};
use crate::node::Node;
use indexmap::IndexMap;
use reportcloud_types::ResultKind;

/// Immutable expression arena of one report definition.
///
/// Holds no per-run state and is `Send + Sync`; wrap it in an `Arc` to
/// evaluate it from several report runs at once.
#[derive(Debug, Clone)]
pub struct ExprTree {
    id: TreeId,
    nodes: Vec<Node>,
    /// Every aggregate occurrence by its cache key, in construction order
    aggregates: IndexMap<CacheKey, ExprId>,
}

impl ExprTree {
    pub(crate) fn new(nodes: Vec<Node>) -> Self {
        let mut aggregates = IndexMap::new();
        for (index, node) in nodes.iter().enumerate() {
            if let Node::Aggregate { key, .. } = node {
                // A rewritten aggregate reuses its key; the newest node wins
                aggregates.insert(*key, ExprId::new(index as u32));
            }
        }
        Self {
            id: TreeId::next(),
            nodes,
            aggregates,
        }
    }

    /// Identity shared by this tree and its clones
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// Get a node by id
    ///
    /// # Panics
    /// Panics if `id` does not belong to this tree.
    #[track_caller]
    pub fn node(&self, id: ExprId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Get a node by id, if it belongs to this tree
    pub fn get(&self, id: ExprId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[track_caller]
    pub fn kind(&self, id: ExprId) -> ResultKind {
        self.node(id).kind()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Cache keys of every aggregate in the definition
    pub fn cache_keys(&self) -> impl Iterator<Item = CacheKey> + '_ {
        self.aggregates.keys().copied()
    }

    /// Aggregate node holding `key`
    pub fn aggregate(&self, key: CacheKey) -> Option<ExprId> {
        self.aggregates.get(&key).copied()
    }

    /// Cache keys of the aggregates reachable from `root`, in pre-order
    pub fn keys_within(&self, root: ExprId) -> Vec<CacheKey> {
        let mut keys = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            match node {
                Node::Literal { .. } | Node::Field { .. } => {}
                Node::Unary { operand, .. } => stack.push(*operand),
                Node::Binary { lhs, rhs, .. } => {
                    stack.push(*rhs);
                    stack.push(*lhs);
                }
                Node::Aggregate { inner, key, .. } => {
                    keys.push(*key);
                    stack.push(*inner);
                }
            }
        }
        keys
    }

    /// Render `id` as an S-expression
    pub fn dump(&self, id: ExprId) -> String {
        dump::render(&self.nodes, id)
    }
}
