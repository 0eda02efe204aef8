use std::{fmt::Debug, hash::Hash};

use itertools::Itertools;

use crate::Show;

/// A symbol is a single, atomic letter of an [`Alphabet`]. Symbols label the transitions of an automaton
/// and words are sequences of symbols. Anything that is cheap to copy, totally ordered and printable can be
/// used, most notably `char`.
pub trait Symbol: Copy + Eq + Ord + Hash + Debug + Show {}

impl<T: Copy + Eq + Ord + Hash + Debug + Show> Symbol for T {}

/// Represents a finite alphabet, which is just a collection of distinct [`Symbol`]s. The symbols are kept
/// in ascending order, which determines the order of the columns when a transition table is printed and
/// the position that is used to index a symbol.
///
/// # Example
/// ```
/// use automata_minimize::prelude::*;
///
/// let alphabet = Alphabet::from_iter(['b', 'a', 'b']);
/// assert_eq!(alphabet.len(), 2);
/// assert_eq!(alphabet.position('b'), Some(1));
/// assert_eq!(alphabet[0], 'a');
/// ```
#[derive(Clone, Hash, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub struct Alphabet<S: Symbol = char>(Vec<S>);

impl<S: Symbol> Default for Alphabet<S> {
    fn default() -> Self {
        Self(vec![])
    }
}

impl<S: Symbol> Alphabet<S> {
    /// Returns the number of symbols in the alphabet.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the alphabet has no symbols.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the symbols in ascending order.
    pub fn symbols(&self) -> impl Iterator<Item = S> + '_ {
        self.0.iter().copied()
    }

    /// Gives the position of `symbol` in the alphabet, or `None` if it is not part of it.
    pub fn position(&self, symbol: S) -> Option<usize> {
        self.0.binary_search(&symbol).ok()
    }

    /// Returns true if and only if `symbol` is part of the alphabet.
    pub fn contains(&self, symbol: S) -> bool {
        self.position(symbol).is_some()
    }

    /// Returns the symbol at `position`, if it exists.
    pub fn get(&self, position: usize) -> Option<S> {
        self.0.get(position).copied()
    }

    /// Adds `symbol`, keeping the symbols sorted. Returns `false` if it was already present.
    pub fn insert(&mut self, symbol: S) -> bool {
        match self.0.binary_search(&symbol) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, symbol);
                true
            }
        }
    }
}

impl<S: Symbol> std::ops::Index<usize> for Alphabet<S> {
    type Output = S;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<S: Symbol> FromIterator<S> for Alphabet<S> {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().unique().sorted().collect())
    }
}

impl<S: Symbol> From<Vec<S>> for Alphabet<S> {
    fn from(value: Vec<S>) -> Self {
        Self::from_iter(value)
    }
}

impl Alphabet<char> {
    /// Creates a new alphabet of the given size. The symbols are just the first `size` letters
    /// of the latin alphabet, i.e. 'a' to 'z'.
    pub fn of_size(size: usize) -> Self {
        assert!(size <= 26, "Alphabet is too large");
        Self((0..size).map(|i| (b'a' + i as u8) as char).collect())
    }
}

impl<S: Symbol> Show for Alphabet<S> {
    fn show(&self) -> String {
        S::show_collection(self.0.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_and_deduplicated() {
        let mut alphabet: Alphabet<char> = "cabac".chars().collect();
        assert_eq!(alphabet.symbols().collect::<String>(), "abc");
        assert!(!alphabet.insert('b'));
        assert!(alphabet.insert('_'));
        assert_eq!(alphabet.position('_'), Some(0));
        assert_eq!(alphabet.show(), "{_, a, b, c}");
    }

    #[test]
    fn of_size() {
        let alphabet = Alphabet::of_size(3);
        assert_eq!(alphabet.len(), 3);
        assert!(alphabet.contains('c'));
        assert!(!alphabet.contains('d'));
        assert!(Alphabet::<u8>::default().is_empty());
    }
}
