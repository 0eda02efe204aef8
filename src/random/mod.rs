use tracing::debug;

use crate::prelude::*;

/// Generates a random, possibly incomplete DFA with `size` states over an alphabet of `symbols` letters,
/// drawing from the global `fastrand` generator. See [`generate_random_dfa_with`] for details.
pub fn generate_random_dfa(symbols: usize, size: u32, density: f64) -> TableDfa<u32, char> {
    generate_random_dfa_with(&mut fastrand::Rng::new(), symbols, size, density)
}

/// Generates a random, possibly incomplete DFA using the given random number generator. The states are
/// `0..size` and `0` is initial. The algorithm is as follows:
/// 1. For each state and each of the first `symbols` letters 'a', 'b', ..., with probability `density` a
///    transition to a uniformly drawn target is added, otherwise the transition is left undefined.
/// 2. Each state is final with probability one half.
///
/// Depending on the drawn transitions, some states may not be reachable from the initial state.
pub fn generate_random_dfa_with(
    rng: &mut fastrand::Rng,
    symbols: usize,
    size: u32,
    density: f64,
) -> TableDfa<u32, char> {
    assert!(size > 0, "an automaton needs at least one state");
    let alphabet = Alphabet::of_size(symbols);

    let mut transitions = vec![];
    for q in 0..size {
        for symbol in alphabet.symbols() {
            if rng.f64() < density {
                transitions.push((q, symbol, rng.u32(..size)));
            }
        }
    }
    let finals = (0..size).filter(|_| rng.bool()).collect::<Vec<_>>();
    debug!(
        "generated random automaton with {size} states, {} transitions and {} final states",
        transitions.len(),
        finals.len()
    );

    DfaBuilder::default()
        .with_alphabet(alphabet)
        .with_states(0..size)
        .with_transitions(transitions)
        .with_final_states(finals)
        .into_dfa(0)
        .expect("each state gets at most one transition per symbol")
}

/// Returns all words over `alphabet` whose length is at most `max_length`, ordered by length.
pub fn words_up_to<S: Symbol>(alphabet: &Alphabet<S>, max_length: usize) -> Vec<Vec<S>> {
    let mut words = vec![vec![]];
    let mut frontier = 0;
    for _ in 0..max_length {
        let end = words.len();
        for i in frontier..end {
            for symbol in alphabet.symbols() {
                let mut word = words[i].clone();
                word.push(symbol);
                words.push(word);
            }
        }
        frontier = end;
    }
    words
}
