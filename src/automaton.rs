use std::{fmt::Debug, hash::Hash};

use crate::prelude::*;

mod builder;
pub use builder::{BuildError, DfaBuilder};

mod table;
pub use table::TableDfa;

/// A state is an opaque identifier of a state in some automaton. The only requirements are that states can
/// be compared for equality, are totally ordered and can be printed. Strings, string slices and integers
/// all qualify.
pub trait State: Clone + Eq + Ord + Hash + Debug + Show {}

impl<T: Clone + Eq + Ord + Hash + Debug + Show> State for T {}

/// The interface through which a deterministic automaton is fed into the minimization. An implementor
/// provides a designated initial state, a test for final states, the alphabet and a transition function.
///
/// The transition function may be partial, i.e. [`AutomatonSource::next`] may return `None` for some
/// combination of state and symbol. Such a missing transition is treated as leading into a rejecting
/// sink, see [`crate::minimization::Completion`]. Implementors must however be deterministic: for a
/// given state and symbol, there is at most one successor.
pub trait AutomatonSource {
    /// The type of states.
    type State: State;
    /// The type of symbols that label transitions.
    type Symbol: Symbol;

    /// Returns the designated initial state.
    fn initial_state(&self) -> Self::State;

    /// Returns true if and only if `state` is final (or accepting).
    fn is_final(&self, state: &Self::State) -> bool;

    /// Gives a reference to the alphabet.
    fn alphabet(&self) -> &Alphabet<Self::Symbol>;

    /// Returns the successor of `state` on `symbol`, or `None` if the transition is not defined.
    fn next(&self, state: &Self::State, symbol: Self::Symbol) -> Option<Self::State>;

    /// Returns true if `state` is the initial state.
    fn is_initial(&self, state: &Self::State) -> bool {
        self.initial_state() == *state
    }

    /// Runs `word` from `origin` and returns the state that is reached. If some transition along the way
    /// is undefined, `None` is returned.
    fn reached_from<W>(&self, origin: Self::State, word: W) -> Option<Self::State>
    where
        W: IntoIterator<Item = Self::Symbol>,
    {
        word.into_iter()
            .try_fold(origin, |state, symbol| self.next(&state, symbol))
    }

    /// Returns true if and only if running `word` from the initial state ends in a final state. Words on
    /// which the run gets stuck are rejected.
    fn accepts<W>(&self, word: W) -> bool
    where
        W: IntoIterator<Item = Self::Symbol>,
    {
        self.reached_from(self.initial_state(), word)
            .map(|q| self.is_final(&q))
            .unwrap_or(false)
    }
}

impl<A: AutomatonSource> AutomatonSource for &A {
    type State = A::State;
    type Symbol = A::Symbol;

    fn initial_state(&self) -> Self::State {
        A::initial_state(self)
    }

    fn is_final(&self, state: &Self::State) -> bool {
        A::is_final(self, state)
    }

    fn alphabet(&self) -> &Alphabet<Self::Symbol> {
        A::alphabet(self)
    }

    fn next(&self, state: &Self::State, symbol: Self::Symbol) -> Option<Self::State> {
        A::next(self, state, symbol)
    }

    fn is_initial(&self, state: &Self::State) -> bool {
        A::is_initial(self, state)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn runs_on_partial_source() {
        let dfa = crate::tests::partial_dfa();
        assert!(dfa.accepts("ab".chars()));
        assert!(dfa.accepts("abba".chars()));
        assert!(!dfa.accepts("aab".chars()));
        assert!(!dfa.accepts("ba".chars()));
        assert!(!dfa.accepts("".chars()));
        assert_eq!(dfa.reached_from("s", "aba".chars()), Some("f"));
        assert_eq!((&dfa).reached_from("dead", "aa".chars()), Some("a"));
        assert_eq!(dfa.reached_from("dead", "ab".chars()), None);
        assert!((&dfa).is_initial(&"s"));
    }
}
