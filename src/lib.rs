//! Library for minimizing deterministic finite automata (DFA).
//!
//! The input is anything implementing [`AutomatonSource`], which gives access to a designated initial state, a test for
//! final states, an [`Alphabet`] and a (possibly partial) transition function. Minimization then runs in three stages:
//! 1. The source is wrapped in a [`minimization::Completion`], which collects the states that are reachable from the
//!    initial state through a breadth-first search and adds a single error state absorbing all transitions that are not
//!    defined in the source. The error state only exists if there actually is an undefined transition.
//! 2. A [`minimization::DistinguishabilityTable`] is filled for all unordered pairs of states. A pair is marked if the
//!    two states can be told apart by some finite word, i.e. one of them accepts the word and the other rejects it.
//! 3. All pairs that remain unmarked are merged in a [`minimization::StateDisjointSetUnion`], whose classes form the
//!    states of the minimal automaton.
//!
//! The function [`minimize`] runs all of these steps and returns a [`MinimizedDfa`], which can be queried for its
//! equivalence classes and transitions, or be turned into a table that is rendered with `tabled`.
//!
//! With the `jflap` feature, automata can also be read from files written by the JFLAP editor, and the `cli`
//! feature builds the `minimize-jflap` binary, which prints the minimized table of such a file.
//!
//! ```
//! use automata_minimize::prelude::*;
//!
//! let dfa = DfaBuilder::default()
//!     .with_transitions([
//!         ("q0", '0', "q1"),
//!         ("q0", '1', "q2"),
//!         ("q1", '0', "q1"),
//!         ("q1", '1', "q3"),
//!         ("q2", '0', "q2"),
//!         ("q2", '1', "q3"),
//!         ("q3", '0', "q3"),
//!         ("q3", '1', "q3"),
//!     ])
//!     .with_final_states(["q3"])
//!     .into_dfa("q0")
//!     .unwrap();
//!
//! // q1 and q2 both wait for a `1`, so they are merged
//! let minimized = minimize(&dfa);
//! assert_eq!(minimized.size(), 3);
//! assert_eq!(minimized.label(minimized.initial_class()), "->{q0}");
//! ```
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use automata_minimize::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::{Alphabet, Symbol},
        automaton::{AutomatonSource, BuildError, DfaBuilder, State, TableDfa},
        math::{Map, Partition, Set},
        minimization::{
            complete, minimize, ClassId, CompletedState, Completion, DistinguishabilityTable,
            EquivalenceClass, MinimizedDfa, StateDisjointSetUnion, StateId, TableRow,
        },
        Show,
    };
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;

/// Module that contains definitions for dealing with alphabets.
pub mod alphabet;
pub use alphabet::Alphabet;

/// Defines the interface through which automata are fed into the minimization, together with an in-memory
/// implementation of it.
pub mod automaton;
pub use automaton::AutomatonSource;

/// Contains the minimization pipeline: completion, table filling and the union of equivalent states.
pub mod minimization;
pub use minimization::{minimize, MinimizedDfa};

/// Reads deterministic automata from files written by the JFLAP editor.
#[cfg(feature = "jflap")]
pub mod jflap;

/// Implements the generation of random automata.
#[cfg(feature = "random")]
pub mod random;

use itertools::Itertools;

/// Helper trait which can be used to display states, symbols and collections thereof.
pub trait Show {
    /// Returns a human readable representation of `self`. For a state this should be its name, for example
    /// `q0`, for a symbol it is the symbol itself.
    fn show(&self) -> String;

    /// Show a collection of the thing, for a collection of states this should be `{q0, q1, q2}`.
    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        format!("{{{}}}", iter.into_iter().map(|x| x.show()).join(", "))
    }
}

macro_rules! impl_show_via_to_string {
    ($($ty:ty),*) => {
        $(
            impl Show for $ty {
                fn show(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_show_via_to_string!(
    char, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, String, str
);

impl Show for bool {
    fn show(&self) -> String {
        match self {
            true => "+",
            false => "-",
        }
        .to_string()
    }
}

impl<S: Show + ?Sized> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}

impl<S: Show, T: Show> Show for (S, T) {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}

impl<S: Show> Show for [S] {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}
