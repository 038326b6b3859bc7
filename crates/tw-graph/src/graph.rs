//! The frozen tree and its queries.

use std::collections::HashMap;
use std::hash::Hash;

/// One declared state.  Obtained from [`StateGraph`] queries; never built
/// directly.
#[derive(Debug)]
pub struct Node<S, V> {
    pub(crate) index:    usize,
    pub(crate) state:    S,
    pub(crate) value:    V,
    pub(crate) parent:   Option<usize>,
    pub(crate) children: Vec<usize>,
}

impl<S, V> Node<S, V> {
    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Outcome of [`StateGraph::find_path`].
///
/// `Found(vec![])` (same start and end) and `NoPath` are different answers.
#[derive(Debug)]
pub enum StatePath<'g, S, V> {
    /// Nodes from the ancestor down to the target, both included.
    Found(Vec<&'g Node<S, V>>),
    NoPath,
}

impl<'g, S, V> StatePath<'g, S, V> {
    pub fn is_found(&self) -> bool {
        matches!(self, StatePath::Found(_))
    }

    /// The path's nodes, or `None` for [`StatePath::NoPath`].
    pub fn nodes(&self) -> Option<&[&'g Node<S, V>]> {
        match self {
            StatePath::Found(nodes) => Some(nodes),
            StatePath::NoPath => None,
        }
    }

    /// The states along the path, cloned.
    pub fn states(&self) -> Option<Vec<S>>
    where
        S: Clone,
    {
        self.nodes().map(|nodes| nodes.iter().map(|n| n.state.clone()).collect())
    }
}

/// An immutable rooted tree of states.  Built by
/// [`StateGraphBuilder`][crate::StateGraphBuilder].
#[derive(Debug)]
pub struct StateGraph<S, V> {
    nodes: Vec<Node<S, V>>,
    root:  usize,
    /// Builder's declaration index.  Every node is reachable from the root
    /// (checked at build time), so a lookup here finds exactly what a walk
    /// from the root would.
    index: HashMap<S, usize>,
}

impl<S, V> StateGraph<S, V>
where
    S: Eq + Hash,
{
    pub(crate) fn from_parts(nodes: Vec<Node<S, V>>, root: usize, index: HashMap<S, usize>) -> Self {
        Self { nodes, root, index }
    }

    pub fn root(&self) -> &Node<S, V> {
        &self.nodes[self.root]
    }

    /// The node declared for `state`, if any.
    pub fn get(&self, state: &S) -> Option<&Node<S, V>> {
        self.index.get(state).map(|&i| &self.nodes[i])
    }

    pub fn parent(&self, node: &Node<S, V>) -> Option<&Node<S, V>> {
        node.parent.map(|p| &self.nodes[p])
    }

    /// Children of `node` in declaration order.
    pub fn children<'g>(&'g self, node: &'g Node<S, V>) -> impl Iterator<Item = &'g Node<S, V>> + 'g {
        node.children.iter().map(move |&c| &self.nodes[c])
    }

    /// Walk parent links from `to` up to `from` (the root when `None`).
    ///
    /// Returns the nodes from `from` down to `to`, an empty path when both
    /// are the same state, and [`StatePath::NoPath`] when `from` is not an
    /// ancestor of `to` or either state is undeclared.
    pub fn find_path(&self, to: &S, from: Option<&S>) -> StatePath<'_, S, V> {
        let Some(target) = self.get(to) else {
            return StatePath::NoPath;
        };
        let start = match from {
            Some(state) => match self.get(state) {
                Some(node) => node,
                None => return StatePath::NoPath,
            },
            None => self.root(),
        };
        if start.index == target.index {
            return StatePath::Found(Vec::new());
        }

        let mut path = vec![target];
        let mut cursor = target;
        while let Some(up) = self.parent(cursor) {
            path.push(up);
            if up.index == start.index {
                path.reverse();
                return StatePath::Found(path);
            }
            cursor = up;
        }
        StatePath::NoPath
    }

    /// Distance from the root; the root itself is at depth 0.
    pub fn depth(&self, state: &S) -> Option<usize> {
        let mut node = self.get(state)?;
        let mut depth = 0;
        while let Some(up) = self.parent(node) {
            node = up;
            depth += 1;
        }
        Some(depth)
    }

    /// `true` if `ancestor` lies strictly above `state`.
    pub fn is_ancestor(&self, ancestor: &S, state: &S) -> bool {
        matches!(self.find_path(state, Some(ancestor)), StatePath::Found(ref p) if !p.is_empty())
    }

    /// Nodes in depth-first pre-order starting at the root.
    pub fn iter(&self) -> impl Iterator<Item = &Node<S, V>> + '_ {
        let mut stack = vec![self.root];
        std::iter::from_fn(move || {
            let i = stack.pop()?;
            stack.extend(self.nodes[i].children.iter().rev().copied());
            Some(&self.nodes[i])
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
