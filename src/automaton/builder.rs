use std::collections::BTreeSet;

use thiserror::Error;
use tracing::trace;

use crate::prelude::*;

/// Errors that can occur when a [`TableDfa`] is assembled with a [`DfaBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError<Q: State, S: Symbol> {
    /// The state has two different successors on the same symbol, so the automaton is not deterministic.
    #[error("automaton is not deterministic, state {} has successors {} and {} on symbol {}", .state.show(), .first.show(), .second.show(), .symbol.show())]
    Nondeterministic {
        /// The state with more than one successor.
        state: Q,
        /// The symbol on which the successors differ.
        symbol: S,
        /// The successor that was given first.
        first: Q,
        /// The conflicting successor.
        second: Q,
    },
    /// A transition uses a symbol that is not part of the fixed alphabet.
    #[error("symbol {} is not part of the alphabet {}", .symbol.show(), .alphabet.show())]
    UnknownSymbol {
        /// The offending symbol.
        symbol: S,
        /// The alphabet that was fixed through [`DfaBuilder::with_alphabet`].
        alphabet: Alphabet<S>,
    },
}

/// Helper struct for the construction of a [`TableDfa`]. It collects transitions, final states and
/// alphabet symbols and checks that the result is deterministic once [`DfaBuilder::into_dfa`] is called.
///
/// # Example
///
/// We want to create a DFA with two states `"even"` and `"odd"` over the alphabet `['a', 'b']`, which accepts
/// all words with an even number of `a`s. The transitions on `b` are left out, so the automaton is incomplete
/// and rejects every word containing a `b`.
/// ```
/// use automata_minimize::prelude::*;
///
/// let dfa = DfaBuilder::default()
///     .with_alphabet_symbols(['b'])
///     .with_transitions([("even", 'a', "odd"), ("odd", 'a', "even")])
///     .with_final_states(["even"])
///     .into_dfa("even")
///     .unwrap();
/// assert!(dfa.accepts("aa".chars()));
/// assert!(!dfa.accepts("ab".chars()));
/// ```
#[derive(Debug, Clone)]
pub struct DfaBuilder<Q: State, S: Symbol = char> {
    symbols: Alphabet<S>,
    closed: bool,
    states: BTreeSet<Q>,
    transitions: Vec<(Q, S, Q)>,
    finals: Set<Q>,
}

impl<Q: State, S: Symbol> Default for DfaBuilder<Q, S> {
    fn default() -> Self {
        Self {
            symbols: Alphabet::default(),
            closed: false,
            states: BTreeSet::new(),
            transitions: vec![],
            finals: Set::default(),
        }
    }
}

impl<Q: State, S: Symbol> DfaBuilder<Q, S> {
    /// Fixes the alphabet. Afterwards, a transition on any symbol outside of `alphabet` makes
    /// [`DfaBuilder::into_dfa`] fail with [`BuildError::UnknownSymbol`].
    pub fn with_alphabet(mut self, alphabet: Alphabet<S>) -> Self {
        self.symbols = alphabet;
        self.closed = true;
        self
    }

    /// By default, the only alphabet symbols in the automaton that is built are the ones that
    /// appear on at least one transition. This method can be used to force additional symbols to appear,
    /// on which the automaton then has no transitions at all.
    pub fn with_alphabet_symbols<I: IntoIterator<Item = S>>(mut self, symbols: I) -> Self {
        for symbol in symbols {
            self.symbols.insert(symbol);
        }
        self
    }

    /// Adds states that need not occur on any transition.
    pub fn with_states<I: IntoIterator<Item = Q>>(mut self, states: I) -> Self {
        self.states.extend(states);
        self
    }

    /// Marks the given states as final. States that do not occur anywhere else are added as well.
    pub fn with_final_states<I: IntoIterator<Item = Q>>(mut self, states: I) -> Self {
        for q in states {
            self.states.insert(q.clone());
            self.finals.insert(q);
        }
        self
    }

    /// Adds a single transition from `source` to `target` on `symbol`.
    pub fn with_transition(mut self, source: Q, symbol: S, target: Q) -> Self {
        self.transitions.push((source, symbol, target));
        self
    }

    /// Adds a list of transitions given as triples `(source, symbol, target)`. The transitions can be
    /// passed in as anything that is iterable, an easy way is to pass in an array of tuples.
    pub fn with_transitions<I: IntoIterator<Item = (Q, S, Q)>>(mut self, iter: I) -> Self {
        self.transitions.extend(iter);
        self
    }

    /// Consumes `self` and creates a [`TableDfa`] with the given `initial` state. Fails if two transitions
    /// leave the same state on the same symbol towards different targets, or if the alphabet was fixed and
    /// a transition uses an unknown symbol.
    pub fn into_dfa(self, initial: Q) -> Result<TableDfa<Q, S>, BuildError<Q, S>> {
        let Self {
            mut symbols,
            closed,
            mut states,
            transitions,
            finals,
        } = self;

        let mut table: Map<(Q, S), Q> = Map::default();
        for (source, symbol, target) in transitions {
            if closed && !symbols.contains(symbol) {
                return Err(BuildError::UnknownSymbol {
                    symbol,
                    alphabet: symbols,
                });
            }
            symbols.insert(symbol);
            states.insert(source.clone());
            states.insert(target.clone());

            match table.get(&(source.clone(), symbol)) {
                Some(existing) if *existing != target => {
                    return Err(BuildError::Nondeterministic {
                        state: source,
                        symbol,
                        first: existing.clone(),
                        second: target,
                    });
                }
                Some(_) => trace!(
                    "ignoring duplicate transition {} --{}--> {}",
                    source.show(),
                    symbol.show(),
                    target.show()
                ),
                None => {
                    table.insert((source, symbol), target);
                }
            }
        }
        states.insert(initial.clone());

        Ok(TableDfa::from_parts(symbols, initial, states, finals, table))
    }
}
