use std::collections::VecDeque;

use bit_set::BitSet;
use tracing::{debug, trace};

use crate::{math::Bijection, prelude::*};

/// Dense index of a state in a [`Completion`]. Indices are handed out in the order in which the breadth-first
/// search discovers the states, so the initial state always has index `0` and the error state (if it exists)
/// has the largest index.
pub type StateId = usize;

/// A state of a [`Completion`]. This is either a state of the underlying source or the synthetic error state,
/// which is a rejecting sink that absorbs all transitions that are undefined in the source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompletedState<Q> {
    /// A state of the wrapped automaton.
    State(Q),
    /// The synthetic rejecting sink.
    Error,
}

impl<Q> CompletedState<Q> {
    /// Returns true if `self` is the error state.
    pub fn is_error(&self) -> bool {
        matches!(self, CompletedState::Error)
    }

    /// Returns the wrapped state of the source, or `None` for the error state.
    pub fn as_state(&self) -> Option<&Q> {
        match self {
            CompletedState::State(q) => Some(q),
            CompletedState::Error => None,
        }
    }
}

impl<Q> From<Q> for CompletedState<Q> {
    fn from(value: Q) -> Self {
        CompletedState::State(value)
    }
}

impl<Q: Show> Show for CompletedState<Q> {
    fn show(&self) -> String {
        match self {
            CompletedState::State(q) => q.show(),
            CompletedState::Error => "q_error".to_string(),
        }
    }
}

/// Wraps an [`AutomatonSource`] and turns it into a complete automaton over precisely the states that are
/// reachable from the initial state.
///
/// Upon construction, the states are explored in breadth-first order starting from the initial state. Whenever
/// the source has no transition for some reachable state and symbol, the automaton is incomplete and a single
/// [`CompletedState::Error`] is added after the search. All undefined transitions lead into it and it loops on every
/// symbol. If the source is complete, no error state exists at all.
///
/// The successors of all states are computed once during the search and stored in a dense table, which is what
/// [`Completion::successor`] reads. The methods that work on [`CompletedState`]s instead query the source directly.
#[derive(Debug, Clone)]
pub struct Completion<A: AutomatonSource> {
    source: A,
    ids: Bijection<StateId, CompletedState<A::State>>,
    successors: Vec<StateId>,
    finals: BitSet,
    error: Option<StateId>,
}

/// Wraps `source` into a [`Completion`], see there for details.
pub fn complete<A: AutomatonSource>(source: A) -> Completion<A> {
    Completion::new(source)
}

impl<A: AutomatonSource> Completion<A> {
    /// Explores the states of `source` that are reachable from its initial state and adds the error state if
    /// some transition is undefined.
    pub fn new(source: A) -> Self {
        let symbols = source.alphabet().symbols().collect::<Vec<_>>();
        let initial = CompletedState::State(source.initial_state());

        let mut ids = Bijection::new();
        ids.insert(0, initial);
        let mut queue = VecDeque::from([0]);
        // undefined transitions are written as `None` and patched once we know whether the error state exists
        let mut targets: Vec<Option<StateId>> = vec![];
        let mut incomplete = false;

        while let Some(id) = queue.pop_front() {
            let Some(CompletedState::State(q)) = ids.get_by_left(&id).cloned() else {
                unreachable!("only states of the source are enqueued");
            };
            trace!("exploring state {} with index {id}", q.show());

            for &symbol in &symbols {
                match source.next(&q, symbol) {
                    Some(p) => {
                        let p = CompletedState::State(p);
                        let target = match ids.get_by_right(&p) {
                            Some(existing) => *existing,
                            None => {
                                let fresh = ids.len();
                                trace!("discovered state {} with index {fresh}", p.show());
                                ids.insert(fresh, p);
                                queue.push_back(fresh);
                                fresh
                            }
                        };
                        targets.push(Some(target));
                    }
                    None => {
                        trace!(
                            "state {} has no transition on {}",
                            q.show(),
                            symbol.show()
                        );
                        incomplete = true;
                        targets.push(None);
                    }
                }
            }
        }

        let error = incomplete.then(|| {
            let error = ids.len();
            ids.insert(error, CompletedState::Error);
            error
        });
        let mut successors: Vec<StateId> = targets
            .into_iter()
            .map(|target| target.or(error).expect("error state exists if a target is missing"))
            .collect();
        if let Some(error) = error {
            successors.extend(std::iter::repeat(error).take(symbols.len()));
        }

        let mut finals = BitSet::with_capacity(ids.len());
        for (id, state) in ids.iter() {
            if let CompletedState::State(q) = state {
                if source.is_final(q) {
                    finals.insert(*id);
                }
            }
        }

        debug!(
            "completed automaton has {} reachable states, error state {}",
            ids.len(),
            if error.is_some() { "added" } else { "not needed" }
        );

        Self {
            source,
            ids,
            successors,
            finals,
            error,
        }
    }

    /// Gives a reference to the wrapped source.
    pub fn source(&self) -> &A {
        &self.source
    }

    /// Returns the number of states, which are the reachable states of the source plus the error state if it
    /// is needed.
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    /// Iterates over all states in the order of their [`StateId`].
    pub fn states(&self) -> impl Iterator<Item = &CompletedState<A::State>> + '_ {
        self.ids.iter().map(|(_, state)| state)
    }

    /// Iterates over all [`StateId`]s.
    pub fn state_ids(&self) -> std::ops::Range<StateId> {
        0..self.size()
    }

    /// Returns the state with the given index.
    ///
    /// # Panics
    /// If `id` is not smaller than [`Completion::size`].
    pub fn state(&self, id: StateId) -> &CompletedState<A::State> {
        self.ids
            .get_by_left(&id)
            .unwrap_or_else(|| panic!("state index {id} is out of bounds"))
    }

    /// Returns the index of `state`, or `None` if it is not reachable.
    pub fn id_of(&self, state: &CompletedState<A::State>) -> Option<StateId> {
        self.ids.get_by_right(state).copied()
    }

    /// Returns true if the source is incomplete and the error state was added.
    pub fn has_error_state(&self) -> bool {
        self.error.is_some()
    }

    /// Returns the index of the error state, if it exists.
    pub fn error_state_id(&self) -> Option<StateId> {
        self.error
    }

    /// Gives a reference to the alphabet of the source.
    pub fn alphabet(&self) -> &Alphabet<A::Symbol> {
        self.source.alphabet()
    }

    /// Returns the initial state of the source.
    pub fn initial_state(&self) -> A::State {
        self.source.initial_state()
    }

    /// Returns the successor of `state` on `symbol`. This is the successor in the source if it is defined and
    /// the error state otherwise. The error state is its own successor on every symbol.
    pub fn next(
        &self,
        state: &CompletedState<A::State>,
        symbol: A::Symbol,
    ) -> CompletedState<A::State> {
        match state {
            CompletedState::State(q) => self
                .source
                .next(q, symbol)
                .map(CompletedState::State)
                .unwrap_or(CompletedState::Error),
            CompletedState::Error => CompletedState::Error,
        }
    }

    /// Returns true if `state` is final in the source. The error state is never final.
    pub fn is_final(&self, state: &CompletedState<A::State>) -> bool {
        match state {
            CompletedState::State(q) => self.source.is_final(q),
            CompletedState::Error => false,
        }
    }

    /// Returns true if `state` is the initial state of the source. The error state is never initial.
    pub fn is_initial(&self, state: &CompletedState<A::State>) -> bool {
        match state {
            CompletedState::State(q) => self.source.is_initial(q),
            CompletedState::Error => false,
        }
    }

    /// Returns the index of the successor of the state with index `id` on the symbol at position
    /// `symbol_position` in the alphabet.
    ///
    /// # Panics
    /// If `id` is not smaller than [`Completion::size`] or `symbol_position` is not smaller than the size of
    /// the alphabet.
    pub fn successor(&self, id: StateId, symbol_position: usize) -> StateId {
        let width = self.alphabet().len();
        assert!(
            symbol_position < width,
            "symbol position {symbol_position} is out of bounds"
        );
        self.successors[id * width + symbol_position]
    }

    /// Returns true if the state with index `id` is final.
    pub fn is_final_id(&self, id: StateId) -> bool {
        self.finals.contains(id)
    }

    /// Returns true if the state with index `id` is the initial state, which always has index `0`.
    pub fn is_initial_id(&self, id: StateId) -> bool {
        id == 0
    }

    /// Runs `word` from the state with index `origin` and returns the index of the reached state. Returns `None`
    /// only if the word contains a symbol outside of the alphabet.
    pub fn reached_from<W>(&self, origin: StateId, word: W) -> Option<StateId>
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        word.into_iter().try_fold(origin, |id, symbol| {
            self.alphabet()
                .position(symbol)
                .map(|pos| self.successor(id, pos))
        })
    }

    /// Runs `word` from the initial state, see [`Self::reached_from`].
    pub fn run<W>(&self, word: W) -> Option<StateId>
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        self.reached_from(0, word)
    }

    /// Returns true if running `word` from the state with index `origin` leads to a final state.
    pub fn accepts_from<W>(&self, origin: StateId, word: W) -> bool
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        self.reached_from(origin, word)
            .map(|id| self.is_final_id(id))
            .unwrap_or(false)
    }

    /// Returns true if running `word` from the initial state leads to a final state.
    pub fn accepts<W>(&self, word: W) -> bool
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        self.accepts_from(0, word)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    #[should_panic]
    fn successor_of_unknown_index() {
        let completion = complete(crate::tests::wiki_dfa());
        completion.successor(6, 0);
    }

    #[test]
    #[should_panic(expected = "symbol position 2 is out of bounds")]
    fn successor_on_unknown_position() {
        let completion = complete(crate::tests::wiki_dfa());
        completion.successor(0, 2);
    }

    #[test_log::test]
    fn complete_source_gets_no_error_state() {
        let completion = complete(crate::tests::wiki_dfa());
        assert_eq!(completion.size(), 6);
        assert!(!completion.has_error_state());
        assert!(completion.states().all(|q| !q.is_error()));
        assert_eq!(
            completion.states().cloned().collect::<Vec<_>>(),
            [0, 1, 2, 3, 4, 5].map(CompletedState::State).to_vec()
        );
    }

    #[test_log::test]
    fn missing_transitions_lead_to_error_state() {
        let completion = complete(crate::tests::partial_dfa());
        // "dead" is not reachable, the error state is added last
        assert_eq!(completion.size(), 4);
        assert_eq!(completion.error_state_id(), Some(3));
        assert_eq!(completion.state(3), &CompletedState::Error);
        assert_eq!(completion.id_of(&CompletedState::State("dead")), None);

        let error = CompletedState::Error;
        for symbol in completion.alphabet().symbols() {
            assert_eq!(completion.next(&error, symbol), CompletedState::Error);
            assert_eq!(completion.successor(3, completion.alphabet().position(symbol).unwrap()), 3);
        }
        assert!(!completion.is_final(&error));
        assert!(!completion.is_initial(&error));
        assert!(!completion.is_final_id(3));
    }

    #[test]
    fn error_state_reachable_from_gap() {
        let dfa = DfaBuilder::default()
            .with_transitions([("p", 'a', "q"), ("q", 'a', "q"), ("q", 'b', "p")])
            .with_final_states(["q"])
            .into_dfa("p")
            .unwrap();
        let completion = Completion::new(&dfa);
        assert_eq!(completion.next(&"p".into(), 'b'), CompletedState::Error);
        assert_eq!(completion.next(&"p".into(), 'a'), CompletedState::State("q"));
        assert_eq!(completion.reached_from(0, "b".chars()), completion.error_state_id());
        assert_eq!(completion.run("ab".chars()), Some(0));
        assert!(completion.accepts("aba".chars()));
        assert!(!completion.accepts("bba".chars()));
        assert_eq!(completion.reached_from(0, "c".chars()), None);
    }

    #[test]
    fn total_transition_function() {
        let completion = complete(crate::tests::partial_dfa());
        for id in completion.state_ids() {
            for pos in 0..completion.alphabet().len() {
                let target = completion.successor(id, pos);
                assert!(target < completion.size());
                assert_eq!(
                    completion.state(target),
                    &completion.next(completion.state(id), completion.alphabet()[pos])
                );
            }
        }
        assert!(completion.is_initial_id(0));
        assert!(completion.is_initial(&"s".into()));
    }

    #[test]
    fn empty_alphabet() {
        let dfa = DfaBuilder::<&str, char>::default()
            .with_final_states(["only"])
            .into_dfa("only")
            .unwrap();
        let completion = complete(dfa);
        assert_eq!(completion.size(), 1);
        assert!(!completion.has_error_state());
        assert!(completion.accepts([]));
    }
}
