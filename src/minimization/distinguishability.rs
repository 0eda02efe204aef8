use bit_set::BitSet;
use tracing::{debug, trace};

use crate::prelude::*;

/// Records why a pair of states was marked as distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reason {
    /// Exactly one of the two states is final, so the empty word separates them.
    Acceptance,
    /// The successors on the symbol at position `symbol` form the pair with index `pair`, which was marked before.
    Successor { symbol: usize, pair: usize },
}

/// The triangular table of the table-filling algorithm. It stores one entry for every unordered pair of
/// distinct states of a [`Completion`], and an entry is marked if and only if the two states are
/// distinguishable, meaning there is a finite word which leads one of them into a final state and the other
/// one into a non-final state.
///
/// Pairs are identified by the [`StateId`]s of their states. Internally, the pair `{p, q}` is stored at the
/// position for `(max(p, q), min(p, q))`, so there are no self-pairs and no duplicates.
///
/// Filling proceeds as follows: a pair is marked right away if exactly one of its states is final. Otherwise
/// the successors on each symbol are inspected. If they coincide, the symbol tells us nothing. If they form a
/// pair that is already marked, the current pair is marked as well and no further symbols are considered.
/// Otherwise the current pair is registered as a dependent of the successor pair. Marking a pair marks all of
/// its dependents transitively, this is done with an explicit worklist so that the depth of the propagation
/// does not depend on the size of the automaton.
#[derive(Debug, Clone)]
pub struct DistinguishabilityTable<S: Symbol> {
    size: usize,
    alphabet: Alphabet<S>,
    marked: BitSet,
    reasons: Vec<Option<Reason>>,
    dependents: Vec<Vec<(usize, usize)>>,
}

/// Position of the pair `(higher, lower)` in the triangular table, requires `higher > lower`.
fn pair_index(higher: StateId, lower: StateId) -> usize {
    debug_assert!(higher > lower);
    higher * (higher - 1) / 2 + lower
}

impl<S: Symbol> DistinguishabilityTable<S> {
    /// Fills the table for all pairs of states of the given `completion`.
    pub fn build<A>(completion: &Completion<A>) -> Self
    where
        A: AutomatonSource<Symbol = S>,
    {
        let size = completion.size();
        let pairs = size * size.saturating_sub(1) / 2;
        let alphabet = completion.alphabet().clone();
        let mut table = Self {
            size,
            marked: BitSet::with_capacity(pairs),
            reasons: vec![None; pairs],
            dependents: vec![vec![]; pairs],
            alphabet,
        };

        for higher in completion.state_ids() {
            for lower in 0..higher {
                let pair = pair_index(higher, lower);
                if table.marked.contains(pair) {
                    continue;
                }

                if completion.is_final_id(higher) != completion.is_final_id(lower) {
                    table.mark(pair, Reason::Acceptance);
                    continue;
                }

                for symbol in 0..table.alphabet.len() {
                    let p = completion.successor(higher, symbol);
                    let q = completion.successor(lower, symbol);
                    if p == q {
                        continue;
                    }

                    let successor_pair = pair_index(p.max(q), p.min(q));
                    if table.marked.contains(successor_pair) {
                        table.mark(
                            pair,
                            Reason::Successor {
                                symbol,
                                pair: successor_pair,
                            },
                        );
                        break;
                    }
                    table.dependents[successor_pair].push((pair, symbol));
                }
            }
        }

        debug!(
            "filled table for {size} states, {} of {pairs} pairs are distinguishable",
            table.marked.len()
        );
        table
    }

    /// Marks `pair` and, transitively, all pairs depending on it that are not yet marked.
    fn mark(&mut self, pair: usize, reason: Reason) {
        if !self.marked.insert(pair) {
            return;
        }
        self.reasons[pair] = Some(reason);

        let mut worklist = vec![pair];
        while let Some(current) = worklist.pop() {
            // a marked pair never gains new dependents, so its list can be released
            for (dependent, symbol) in std::mem::take(&mut self.dependents[current]) {
                if self.marked.insert(dependent) {
                    trace!("marking pair {dependent} through pair {current}");
                    self.reasons[dependent] = Some(Reason::Successor {
                        symbol,
                        pair: current,
                    });
                    worklist.push(dependent);
                }
            }
        }
    }

    fn index_of(&self, a: StateId, b: StateId) -> Option<usize> {
        assert!(
            a < self.size && b < self.size,
            "state index out of bounds, there are only {} states",
            self.size
        );
        match a.cmp(&b) {
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(pair_index(a, b)),
            std::cmp::Ordering::Less => Some(pair_index(b, a)),
        }
    }

    /// Returns the number of states the table was built for.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of entries, which is the number of unordered pairs of distinct states.
    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    /// Returns true if there are no pairs, i.e. if there is at most one state.
    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Returns the number of marked pairs.
    pub fn marked_count(&self) -> usize {
        self.marked.len()
    }

    /// Returns true if the states with indices `a` and `b` are distinguishable. The order of the arguments
    /// does not matter and a state is never distinguishable from itself.
    pub fn is_marked(&self, a: StateId, b: StateId) -> bool {
        self.index_of(a, b)
            .map(|pair| self.marked.contains(pair))
            .unwrap_or(false)
    }

    /// Alias of [`Self::is_marked`].
    pub fn are_distinguishable(&self, a: StateId, b: StateId) -> bool {
        self.is_marked(a, b)
    }

    /// Returns true if the states with indices `a` and `b` accept the same words.
    pub fn are_equivalent(&self, a: StateId, b: StateId) -> bool {
        !self.is_marked(a, b)
    }

    /// Iterates over all pairs `(higher, lower)` together with a flag indicating whether they are marked.
    pub fn pairs(&self) -> impl Iterator<Item = (StateId, StateId, bool)> + '_ {
        (0..self.size).flat_map(move |higher| {
            (0..higher)
                .map(move |lower| (higher, lower, self.marked.contains(pair_index(higher, lower))))
        })
    }

    /// Iterates over all pairs `(higher, lower)` which are not marked, meaning their states are equivalent.
    pub fn unmarked_pairs(&self) -> impl Iterator<Item = (StateId, StateId)> + '_ {
        self.pairs()
            .filter_map(|(higher, lower, marked)| (!marked).then_some((higher, lower)))
    }

    /// Returns a word on which exactly one of the states with indices `a` and `b` reaches a final state, or
    /// `None` if the two states are equivalent.
    pub fn witness(&self, a: StateId, b: StateId) -> Option<Vec<S>> {
        let mut pair = self.index_of(a, b)?;
        let mut word = vec![];
        loop {
            match self.reasons[pair]? {
                Reason::Acceptance => return Some(word),
                Reason::Successor { symbol, pair: next } => {
                    word.push(self.alphabet[symbol]);
                    pair = next;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::prelude::*;

    #[test_log::test]
    fn redundant_states_are_not_marked() {
        let completion = complete(crate::tests::redundant_dfa());
        let table = DistinguishabilityTable::build(&completion);
        assert_eq!(table.len(), 6);

        let q1 = completion.id_of(&"q1".into()).unwrap();
        let q2 = completion.id_of(&"q2".into()).unwrap();
        assert!(!table.is_marked(q1, q2));
        assert!(!table.is_marked(q2, q1));
        assert!(!table.are_distinguishable(q1, q2));
        assert!(table.are_distinguishable(0, q1));
        assert_eq!(table.unmarked_pairs().collect_vec(), vec![(q2.max(q1), q1.min(q2))]);
        assert_eq!(table.marked_count(), 5);
        assert_eq!(table.witness(q1, q2), None);
        assert!(table.are_equivalent(q1, q1));
    }

    #[test_log::test]
    fn wiki_table() {
        let completion = complete(crate::tests::wiki_dfa());
        let table = DistinguishabilityTable::build(&completion);
        let equivalent = table.unmarked_pairs().collect_vec();
        assert_eq!(equivalent, vec![(1, 0), (3, 2), (4, 2), (4, 3)]);
        assert!(table.is_marked(0, 5));
        assert!(table.is_marked(5, 0));
        assert!(!table.is_marked(2, 2));
    }

    #[test]
    fn witnesses_separate_states() {
        let completion = complete(crate::tests::wiki_dfa());
        let table = DistinguishabilityTable::build(&completion);
        for (higher, lower, marked) in table.pairs().collect_vec() {
            match table.witness(higher, lower) {
                Some(word) => {
                    assert!(marked);
                    assert_ne!(
                        completion.accepts_from(higher, word.iter().copied()),
                        completion.accepts_from(lower, word.iter().copied()),
                        "{} does not separate {higher} and {lower}",
                        word.show()
                    );
                }
                None => assert!(!marked),
            }
        }
        assert_eq!(table.witness(0, 2), Some(vec![]));
    }

    #[test]
    fn error_state_is_distinguished() {
        let completion = complete(crate::tests::partial_dfa());
        let table = DistinguishabilityTable::build(&completion);
        let error = completion.error_state_id().unwrap();
        // `s` needs `ab` and `a` needs `b` to reach the final state, all states differ
        assert_eq!(table.marked_count(), table.len());
        assert_eq!(table.witness(0, error), Some(vec!['a', 'b']));
        assert_eq!(table.witness(1, error), Some(vec!['b']));
    }

    #[test]
    fn deep_propagation() {
        // a chain q0 -> q1 -> ... -> qn where only the last state is final, every state is distinguishable
        // only through a long word and marking travels backwards through the dependents
        let n = 200u32;
        let dfa = DfaBuilder::default()
            .with_transitions((0..n).map(|i| (i, 'a', i + 1)))
            .with_transition(n, 'a', n)
            .with_final_states([n])
            .into_dfa(0)
            .unwrap();
        let completion = complete(&dfa);
        let table = DistinguishabilityTable::build(&completion);
        assert_eq!(table.marked_count(), table.len());
        assert_eq!(table.witness(0, 1).map(|w| w.len()), Some(n as usize - 1));
    }

    #[test]
    fn single_state() {
        let dfa = DfaBuilder::<u8, char>::default().into_dfa(0).unwrap();
        let table = DistinguishabilityTable::build(&complete(dfa));
        assert!(table.is_empty());
        assert_eq!(table.pairs().count(), 0);
    }
}
