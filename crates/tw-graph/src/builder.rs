//! Fluent builder for [`StateGraph`].

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::graph::Node;
use crate::{GraphError, GraphResult, StateGraph};

struct Decl<S, V> {
    state:    S,
    value:    V,
    children: Vec<S>,
}

/// Collects state declarations; [`build`][Self::build] links and validates
/// them.
///
/// # Example
///
/// ```rust
/// use tw_graph::StateGraphBuilder;
///
/// let mut b = StateGraphBuilder::new();
/// b.add("idle", 0, ["busy"])?
///  .add("busy", 1, [])?;
/// let graph = b.build(None)?;
/// assert_eq!(graph.root().state(), &"idle");
/// # Ok::<(), tw_graph::GraphError>(())
/// ```
pub struct StateGraphBuilder<S, V> {
    decls: Vec<Decl<S, V>>,
    index: HashMap<S, usize>,
}

impl<S, V> Default for StateGraphBuilder<S, V> {
    fn default() -> Self {
        Self { decls: Vec::new(), index: HashMap::new() }
    }
}

impl<S, V> StateGraphBuilder<S, V>
where
    S: Clone + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `state` carrying `value`, with `children` listed in order.
    ///
    /// Children may be declared before or after their parent.  A child that
    /// is never declared is ignored at build time.
    pub fn add<I>(&mut self, state: S, value: V, children: I) -> GraphResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
    {
        if self.index.contains_key(&state) {
            return Err(GraphError::DuplicateState { state: format!("{state:?}") });
        }
        self.index.insert(state.clone(), self.decls.len());
        self.decls.push(Decl { state, value, children: children.into_iter().collect() });
        Ok(self)
    }

    /// Number of declared states.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Link every declared child to its parent and freeze the tree.
    ///
    /// Without `root`, the first declared state is the root.
    pub fn build(self, root: Option<S>) -> GraphResult<StateGraph<S, V>> {
        if self.decls.is_empty() {
            return Err(GraphError::Empty);
        }
        let n = self.decls.len();

        // ── Parent links ──────────────────────────────────────────────────
        let mut parent: Vec<Option<usize>> = vec![None; n];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (p, decl) in self.decls.iter().enumerate() {
            for child in &decl.children {
                let Some(&c) = self.index.get(child) else {
                    continue;
                };
                match parent[c] {
                    Some(existing) if existing == p => {}
                    Some(existing) => {
                        return Err(GraphError::MultipleParents {
                            state:  format!("{child:?}"),
                            first:  format!("{:?}", self.decls[existing].state),
                            second: format!("{:?}", decl.state),
                        });
                    }
                    None => {
                        parent[c] = Some(p);
                        children[p].push(c);
                    }
                }
            }
        }

        // ── Root ──────────────────────────────────────────────────────────
        let root = match root {
            None => 0,
            Some(state) => *self
                .index
                .get(&state)
                .ok_or_else(|| GraphError::UnknownRoot { state: format!("{state:?}") })?,
        };
        if let Some(p) = parent[root] {
            return Err(GraphError::RootHasParent {
                state:  format!("{:?}", self.decls[root].state),
                parent: format!("{:?}", self.decls[p].state),
            });
        }

        // ── Reachability ──────────────────────────────────────────────────
        //
        // With one parent per node and a parentless root, a node unreachable
        // from the root is either in a separate tree or on a cycle.
        let mut seen = vec![false; n];
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            seen[i] = true;
            stack.extend(children[i].iter().copied());
        }
        if let Some(lost) = seen.iter().position(|s| !s) {
            return Err(GraphError::Unreachable {
                state: format!("{:?}", self.decls[lost].state),
                root:  format!("{:?}", self.decls[root].state),
            });
        }

        let nodes = self
            .decls
            .into_iter()
            .zip(parent.into_iter().zip(children))
            .enumerate()
            .map(|(index, (decl, (parent, children)))| Node {
                index,
                state: decl.state,
                value: decl.value,
                parent,
                children,
            })
            .collect();

        Ok(StateGraph::from_parts(nodes, root, self.index))
    }
}
