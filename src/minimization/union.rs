use itertools::Itertools;
use tracing::trace;

use crate::prelude::*;

#[derive(Debug, Clone)]
struct Node {
    parent: StateId,
    is_final: bool,
    is_initial: bool,
}

/// An equivalence class of states as it is produced by [`StateDisjointSetUnion::classes`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EquivalenceClass {
    representative: StateId,
    members: Vec<StateId>,
    is_final: bool,
    is_initial: bool,
    name: String,
}

impl EquivalenceClass {
    /// The representative of the class in the union-find structure.
    pub fn representative(&self) -> StateId {
        self.representative
    }

    /// The indices of all states in the class, in ascending order.
    pub fn members(&self) -> &[StateId] {
        &self.members
    }

    /// Returns true if the state with index `id` belongs to the class.
    pub fn contains(&self, id: StateId) -> bool {
        self.members.binary_search(&id).is_ok()
    }

    /// Returns the number of states in the class.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Classes are never empty, this is only here for completeness.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns true if some member is final.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Returns true if some member is initial.
    pub fn is_initial(&self) -> bool {
        self.is_initial
    }

    /// The names of all members in braces, for example `{q1, q2}`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A union-find structure over the states of a [`Completion`]. Each node stores its parent and whether it is
/// final or initial. The flags are only meaningful at the representative of a class, where they hold the logical
/// or of the flags of all states that were merged into the class.
#[derive(Debug, Clone)]
pub struct StateDisjointSetUnion {
    nodes: Vec<Node>,
    names: Vec<String>,
}

impl StateDisjointSetUnion {
    /// Creates a singleton class for every state of `completion`.
    pub fn new<A: AutomatonSource>(completion: &Completion<A>) -> Self {
        let (nodes, names) = completion
            .state_ids()
            .map(|id| {
                (
                    Node {
                        parent: id,
                        is_final: completion.is_final_id(id),
                        is_initial: completion.is_initial_id(id),
                    },
                    completion.state(id).show(),
                )
            })
            .unzip();
        Self { nodes, names }
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Finds the representative of the class containing `id`. Every state on the way is attached directly
    /// to the representative afterwards.
    pub fn representative(&mut self, id: StateId) -> StateId {
        let mut root = id;
        while self.nodes[root].parent != root {
            root = self.nodes[root].parent;
        }

        let mut current = id;
        while current != root {
            let next = self.nodes[current].parent;
            self.nodes[current].parent = root;
            current = next;
        }
        root
    }

    /// Merges the classes of `a` and `b`. Returns `false` if they were in the same class already.
    pub fn join(&mut self, a: StateId, b: StateId) -> bool {
        let left = self.representative(a);
        let right = self.representative(b);
        if left == right {
            return false;
        }
        trace!("joining {} into {}", self.names[right], self.names[left]);

        self.nodes[right].parent = left;
        self.nodes[left].is_final |= self.nodes[right].is_final;
        self.nodes[left].is_initial |= self.nodes[right].is_initial;
        true
    }

    /// Returns true if `a` and `b` lie in the same class.
    pub fn same_class(&mut self, a: StateId, b: StateId) -> bool {
        self.representative(a) == self.representative(b)
    }

    /// Returns true if the class of `id` contains a final state.
    pub fn is_final(&mut self, id: StateId) -> bool {
        let rep = self.representative(id);
        self.nodes[rep].is_final
    }

    /// Returns true if the class of `id` contains the initial state.
    pub fn is_initial(&mut self, id: StateId) -> bool {
        let rep = self.representative(id);
        self.nodes[rep].is_initial
    }

    /// Returns the number of classes.
    pub fn class_count(&self) -> usize {
        (0..self.size())
            .filter(|&id| self.nodes[id].parent == id)
            .count()
    }

    /// Groups all states by their representative. The classes are ordered by their smallest member, so the class
    /// of the initial state comes first, and the members of each class are sorted.
    pub fn classes(&mut self) -> Vec<EquivalenceClass> {
        let representatives = (0..self.size())
            .map(|id| self.representative(id))
            .collect_vec();

        let mut classes: Vec<EquivalenceClass> = vec![];
        let mut position: Map<StateId, usize> = Map::default();
        for (id, rep) in representatives.into_iter().enumerate() {
            let idx = *position.entry(rep).or_insert_with(|| {
                classes.push(EquivalenceClass {
                    representative: rep,
                    members: vec![],
                    is_final: self.nodes[rep].is_final,
                    is_initial: self.nodes[rep].is_initial,
                    name: String::new(),
                });
                classes.len() - 1
            });
            classes[idx].members.push(id);
        }

        for class in classes.iter_mut() {
            class.name = format!(
                "{{{}}}",
                class.members.iter().map(|&id| &self.names[id]).join(", ")
            );
        }
        classes
    }
}
