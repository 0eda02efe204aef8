use std::fmt::Display;

use itertools::Itertools;
use tracing::{debug, info};

use crate::prelude::*;

mod completion;
pub use completion::{complete, CompletedState, Completion, StateId};

mod distinguishability;
pub use distinguishability::DistinguishabilityTable;

mod union;
pub use union::{EquivalenceClass, StateDisjointSetUnion};

/// Index of an equivalence class in a [`MinimizedDfa`]. The class containing the initial state always has
/// index `0`.
pub type ClassId = usize;

/// One row of the transition table of a [`MinimizedDfa`], as returned by [`MinimizedDfa::rows`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow<S: Symbol> {
    /// The label of the class, see [`MinimizedDfa::label`].
    pub label: String,
    /// For every symbol of the alphabet (in order), the name of the class that is reached, which is its label
    /// without the markers for initial and final classes.
    pub transitions: Vec<(S, String)>,
}

/// The minimal automaton that is equivalent to some [`AutomatonSource`]. Its states are the equivalence classes
/// of indistinguishable states of the completed source, and the transitions between the classes are obtained by
/// following the transitions of an arbitrary member, which does not matter as all members are equivalent.
///
/// The intermediate results, the [`Completion`] and the [`DistinguishabilityTable`], are kept around so they
/// can be inspected.
#[derive(Debug, Clone)]
pub struct MinimizedDfa<A: AutomatonSource> {
    completion: Completion<A>,
    table: DistinguishabilityTable<A::Symbol>,
    classes: Vec<EquivalenceClass>,
    class_of: Vec<ClassId>,
    transitions: Vec<ClassId>,
}

/// Computes the minimal DFA that accepts the same language as `source`.
///
/// First, `source` is restricted to its reachable states and completed with an error state if necessary,
/// then the [`DistinguishabilityTable`] is filled and finally all pairs of states that are not distinguishable
/// are merged in a [`StateDisjointSetUnion`].
pub fn minimize<A: AutomatonSource>(source: A) -> MinimizedDfa<A> {
    let completion = Completion::new(source);
    let table = DistinguishabilityTable::build(&completion);

    let mut union = StateDisjointSetUnion::new(&completion);
    let mut joins = 0;
    for (higher, lower) in table.unmarked_pairs() {
        if union.join(higher, lower) {
            joins += 1;
        }
    }
    debug!("performed {joins} joins for {} unmarked pairs", table.len() - table.marked_count());

    let classes = union.classes();
    let mut class_of = vec![0; completion.size()];
    for (class, ec) in classes.iter().enumerate() {
        for &member in ec.members() {
            class_of[member] = class;
        }
    }

    let width = completion.alphabet().len();
    let mut transitions = Vec::with_capacity(classes.len() * width);
    for ec in &classes {
        for symbol in 0..width {
            let target = union.representative(completion.successor(ec.representative(), symbol));
            transitions.push(class_of[target]);
        }
    }

    info!(
        "minimized automaton with {} reachable states into {} classes",
        completion.size(),
        classes.len()
    );

    MinimizedDfa {
        completion,
        table,
        classes,
        class_of,
        transitions,
    }
}

impl<A: AutomatonSource> MinimizedDfa<A> {
    /// Returns the number of equivalence classes, i.e. the number of states of the minimal automaton.
    pub fn size(&self) -> usize {
        self.classes.len()
    }

    /// Same as [`Self::size`].
    pub fn class_count(&self) -> usize {
        self.size()
    }

    /// Gives a reference to the completed source.
    pub fn completion(&self) -> &Completion<A> {
        &self.completion
    }

    /// Gives a reference to the filled distinguishability table.
    pub fn table(&self) -> &DistinguishabilityTable<A::Symbol> {
        &self.table
    }

    /// Gives a reference to the alphabet.
    pub fn alphabet(&self) -> &Alphabet<A::Symbol> {
        self.completion.alphabet()
    }

    /// Returns all equivalence classes, indexed by [`ClassId`].
    pub fn classes(&self) -> &[EquivalenceClass] {
        &self.classes
    }

    /// Returns the class with the given index.
    pub fn class(&self, class: ClassId) -> &EquivalenceClass {
        &self.classes[class]
    }

    /// Returns the class that contains the initial state.
    pub fn initial_class(&self) -> ClassId {
        self.class_of[0]
    }

    /// Returns the class containing `state`, or `None` if the state is not reachable.
    pub fn class_of(&self, state: &CompletedState<A::State>) -> Option<ClassId> {
        self.completion
            .id_of(state)
            .map(|id| self.class_of_id(id))
    }

    /// Returns the class containing the state with the given index.
    ///
    /// # Panics
    /// If `id` is not smaller than the size of the [`Completion`].
    pub fn class_of_id(&self, id: StateId) -> ClassId {
        self.class_of[id]
    }

    /// Returns true if the given class consists of final states.
    pub fn is_final(&self, class: ClassId) -> bool {
        self.classes[class].is_final()
    }

    /// Returns the class that is reached from `class` on `symbol`, or `None` if `symbol` does not belong to the
    /// alphabet.
    ///
    /// # Panics
    /// If `class` is not smaller than [`MinimizedDfa::size`].
    pub fn successor(&self, class: ClassId, symbol: A::Symbol) -> Option<ClassId> {
        assert!(class < self.size(), "class {class} is out of bounds");
        let position = self.alphabet().position(symbol)?;
        Some(self.transitions[class * self.alphabet().len() + position])
    }

    /// Runs `word` from the initial class and returns true if a final class is reached. Words containing
    /// symbols outside of the alphabet are rejected.
    pub fn accepts<W>(&self, word: W) -> bool
    where
        W: IntoIterator<Item = A::Symbol>,
    {
        word.into_iter()
            .try_fold(self.initial_class(), |class, symbol| {
                self.successor(class, symbol)
            })
            .map(|class| self.is_final(class))
            .unwrap_or(false)
    }

    /// Returns the equivalence classes as a partition of the reachable states (including the error state if
    /// it exists).
    pub fn partition(&self) -> Partition<CompletedState<A::State>> {
        Partition::new(self.classes.iter().map(|ec| {
            ec.members()
                .iter()
                .map(|&id| self.completion.state(id).clone())
                .collect_vec()
        }))
    }

    /// Returns the label of a class, which consists of its member names in braces, prefixed by `->` if the
    /// class is initial and by `#` if it is final. For example `->#{q0, q2}`.
    pub fn label(&self, class: ClassId) -> String {
        let ec = &self.classes[class];
        format!(
            "{}{}{}",
            if ec.is_initial() { "->" } else { "" },
            if ec.is_final() { "#" } else { "" },
            ec.name()
        )
    }

    /// Returns the rows of the transition table, one per class in the order of their [`ClassId`].
    pub fn rows(&self) -> Vec<TableRow<A::Symbol>> {
        (0..self.size())
            .map(|class| TableRow {
                label: self.label(class),
                transitions: self
                    .alphabet()
                    .symbols()
                    .map(|symbol| {
                        let target = self
                            .successor(class, symbol)
                            .expect("symbol is taken from the alphabet");
                        (symbol, self.classes[target].name().to_string())
                    })
                    .collect(),
            })
            .collect()
    }

    /// Returns a string representation of the transition table. The first column holds the label of each
    /// class and there is one further column per symbol, holding the name of the class that is reached.
    pub fn transition_table(&self) -> String {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("Name".to_string()).chain(self.alphabet().symbols().map(|s| s.show())),
        );
        for row in self.rows() {
            builder.push_record(
                std::iter::once(row.label).chain(row.transitions.into_iter().map(|(_, target)| target)),
            );
        }
        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }

    /// Collects the minimal automaton into a [`TableDfa`] whose states are the [`ClassId`]s. The result is
    /// complete.
    pub fn to_table_dfa(&self) -> TableDfa<ClassId, A::Symbol> {
        let width = self.alphabet().len();
        DfaBuilder::default()
            .with_alphabet(self.alphabet().clone())
            .with_states(0..self.size())
            .with_transitions((0..self.size()).flat_map(|class| {
                self.alphabet()
                    .symbols()
                    .enumerate()
                    .map(move |(position, symbol)| {
                        (class, symbol, self.transitions[class * width + position])
                    })
            }))
            .with_final_states((0..self.size()).filter(|&class| self.is_final(class)))
            .into_dfa(self.initial_class())
            .expect("the minimized automaton is deterministic")
    }
}

impl<A: AutomatonSource> Display for MinimizedDfa<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.transition_table())
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test_log::test]
    fn minimize_redundant() {
        let dfa = crate::tests::redundant_dfa();
        let min = minimize(&dfa);
        assert_eq!(min.size(), 3);
        assert_eq!(
            min.partition(),
            Partition::new([vec!["q0"], vec!["q1", "q2"], vec!["q3"]].map(|class| {
                class.into_iter().map(CompletedState::State).collect::<Vec<_>>()
            }))
        );
        assert_eq!(min.label(0), "->{q0}");
        assert_eq!(min.label(1), "{q1, q2}");
        assert_eq!(min.label(2), "#{q3}");
        assert_eq!(min.class_of(&"q2".into()), Some(1));
        assert_eq!(min.successor(0, '0'), Some(1));
        assert_eq!(min.successor(0, '1'), Some(1));
        assert_eq!(min.successor(1, '1'), Some(2));
        assert_eq!(min.successor(1, '2'), None);
        assert!(min.accepts("0001".chars()));
        assert!(!min.accepts("000".chars()));
    }

    #[test]
    #[should_panic(expected = "class 3 is out of bounds")]
    fn successor_of_unknown_class() {
        let min = minimize(crate::tests::redundant_dfa());
        min.successor(3, '0');
    }

    #[test]
    #[should_panic]
    fn class_of_unknown_index() {
        let min = minimize(crate::tests::redundant_dfa());
        min.class_of_id(min.completion().size());
    }

    #[test_log::test]
    fn minimize_wiki() {
        let min = minimize(crate::tests::wiki_dfa());
        assert_eq!(min.size(), 3);
        let rows = min.rows();
        assert_eq!(
            rows,
            vec![
                TableRow {
                    label: "->{0, 1}".to_string(),
                    transitions: vec![('a', "{0, 1}".to_string()), ('b', "{2, 3, 4}".to_string())]
                },
                TableRow {
                    label: "#{2, 3, 4}".to_string(),
                    transitions: vec![('a', "{2, 3, 4}".to_string()), ('b', "{5}".to_string())]
                },
                TableRow {
                    label: "{5}".to_string(),
                    transitions: vec![('a', "{5}".to_string()), ('b', "{5}".to_string())]
                },
            ]
        );
    }

    #[test]
    fn error_state_in_table() {
        let min = minimize(crate::tests::partial_dfa());
        assert_eq!(min.size(), 4);
        assert_eq!(min.label(3), "{q_error}");
        assert_eq!(min.class_of(&CompletedState::Error), Some(3));
        assert_eq!(min.class_of(&"dead".into()), None);

        let table = min.transition_table();
        assert!(table.contains("Name"));
        assert!(table.contains("->{s}"));
        assert!(table.contains("#{f}"));
        assert!(table.contains("{q_error}"));
        assert_eq!(table, min.to_string());
    }

    #[test]
    fn minimizing_twice_changes_nothing() {
        let min = minimize(crate::tests::wiki_dfa());
        let dfa = min.to_table_dfa();
        assert!(dfa.is_complete());
        assert_eq!(dfa.size(), 3);

        let again = minimize(&dfa);
        assert_eq!(again.size(), 3);
        assert!(!again.completion().has_error_state());
        for class in 0..3 {
            for symbol in ['a', 'b'] {
                assert_eq!(again.successor(class, symbol), min.successor(class, symbol));
            }
        }
    }

    #[test]
    fn initial_and_final_merged() {
        // every state is final and the automaton is complete, so everything collapses
        let dfa = DfaBuilder::default()
            .with_transitions([(0u8, 'x', 1), (1, 'x', 2), (2, 'x', 0)])
            .with_final_states([0, 1, 2])
            .into_dfa(0)
            .unwrap();
        let min = minimize(dfa);
        assert_eq!(min.size(), 1);
        assert_eq!(min.label(0), "->#{0, 1, 2}");
        assert!(min.accepts("xxxxx".chars()));
    }

    #[test]
    fn empty_alphabet_single_class() {
        let dfa = DfaBuilder::<&str, char>::default()
            .with_states(["unreachable"])
            .into_dfa("only")
            .unwrap();
        let min = minimize(dfa);
        assert_eq!(min.size(), 1);
        assert!(min.rows()[0].transitions.is_empty());
        assert_eq!(min.label(0), "->{only}");
        assert!(!min.accepts([]));
    }
}
