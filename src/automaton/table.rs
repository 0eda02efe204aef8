use std::collections::BTreeSet;

use itertools::Itertools;

use crate::prelude::*;

/// An in-memory deterministic finite automaton which stores its transitions in a map. The transition
/// function may be partial. Instances are usually obtained through a [`DfaBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDfa<Q: State, S: Symbol = char> {
    alphabet: Alphabet<S>,
    initial: Q,
    states: BTreeSet<Q>,
    finals: Set<Q>,
    transitions: Map<(Q, S), Q>,
}

impl<Q: State, S: Symbol> TableDfa<Q, S> {
    /// Returns a [`DfaBuilder`] for assembling a new automaton.
    pub fn builder() -> DfaBuilder<Q, S> {
        DfaBuilder::default()
    }

    pub(crate) fn from_parts(
        alphabet: Alphabet<S>,
        initial: Q,
        states: BTreeSet<Q>,
        finals: Set<Q>,
        transitions: Map<(Q, S), Q>,
    ) -> Self {
        Self {
            alphabet,
            initial,
            states,
            finals,
            transitions,
        }
    }

    /// Returns the number of states, including the ones that are not reachable.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Iterates over all states in ascending order.
    pub fn states(&self) -> impl Iterator<Item = &Q> + '_ {
        self.states.iter()
    }

    /// Iterates over all final states in ascending order.
    pub fn final_states(&self) -> impl Iterator<Item = &Q> + '_ {
        self.states.iter().filter(|q| self.finals.contains(*q))
    }

    /// Iterates over all transitions as triples `(source, symbol, target)`, sorted by source and symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (&Q, S, &Q)> + '_ {
        self.transitions
            .iter()
            .map(|((q, a), p)| (q, *a, p))
            .sorted()
    }

    /// Returns true if every state has a transition on every symbol.
    pub fn is_complete(&self) -> bool {
        self.transitions.len() == self.states.len() * self.alphabet.len()
    }
}

impl<Q: State, S: Symbol> AutomatonSource for TableDfa<Q, S> {
    type State = Q;
    type Symbol = S;

    fn initial_state(&self) -> Q {
        self.initial.clone()
    }

    fn is_final(&self, state: &Q) -> bool {
        self.finals.contains(state)
    }

    fn alphabet(&self) -> &Alphabet<S> {
        &self.alphabet
    }

    fn next(&self, state: &Q, symbol: S) -> Option<Q> {
        self.transitions.get(&(state.clone(), symbol)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn table_dfa_accessors() {
        let dfa = crate::tests::partial_dfa();
        assert_eq!(dfa.size(), 4);
        assert!(!dfa.is_complete());
        assert_eq!(dfa.final_states().collect::<Vec<_>>(), vec![&"f"]);
        assert_eq!(dfa.transitions().count(), 5);
        assert_eq!(dfa.transitions().next(), Some((&"a", 'b', &"f")));
        assert_eq!(dfa.next(&"dead", 'b'), None);
        assert_eq!(dfa.initial_state(), "s");

        assert!(crate::tests::wiki_dfa().is_complete());
    }
}
