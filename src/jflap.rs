use std::{fmt::Display, fs, io, path::Path, str::FromStr};

use bimap::Overwritten;
use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{math::Bijection, prelude::*};

/// The two layouts of JFLAP files that can be read. Files written by JFLAP 7 use the layout of version 6,
/// where states carry their id and name as attributes. The layout of version 8 wraps everything in nested
/// `structure` elements distinguished by their `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JflapVersion {
    /// Layout written by JFLAP 6 and 7.
    V6,
    /// Layout written by JFLAP 8.
    V8,
}

impl JflapVersion {
    /// Guesses the layout from the root element. Only version 8 files have a `type` attribute on it.
    pub fn detect(document: &Document<'_>) -> Self {
        match document.root_element().attribute("type") {
            Some(_) => JflapVersion::V8,
            None => JflapVersion::V6,
        }
    }
}

impl TryFrom<u32> for JflapVersion {
    type Error = JflapError;

    fn try_from(version: u32) -> Result<Self, Self::Error> {
        match version {
            6 => Ok(JflapVersion::V6),
            8 => Ok(JflapVersion::V8),
            other => Err(JflapError::UnsupportedVersion(other)),
        }
    }
}

impl FromStr for JflapVersion {
    type Err = JflapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u32>() {
            Ok(version) => version.try_into(),
            Err(_) => Err(JflapError::UnrecognizedVersion(s.to_string())),
        }
    }
}

impl Display for JflapVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JflapVersion::V6 => write!(f, "6"),
            JflapVersion::V8 => write!(f, "8"),
        }
    }
}

/// Everything that can go wrong when reading a JFLAP file.
#[derive(Debug, Error)]
pub enum JflapError {
    /// The file could not be read.
    #[error("could not read file: {0}")]
    Io(#[from] io::Error),
    /// The file is not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    /// A version other than 6 or 8 was requested.
    #[error("JFLAP version {0} is not supported, expected 6 or 8")]
    UnsupportedVersion(u32),
    /// The requested version is not a number.
    #[error("{0:?} is not a JFLAP version")]
    UnrecognizedVersion(String),
    /// A mandatory element or attribute is missing.
    #[error("missing {what} in {context}")]
    Missing {
        /// The element or attribute that was expected.
        what: &'static str,
        /// The element in which it was expected.
        context: &'static str,
    },
    /// A transition reads the empty word, which only nondeterministic automata may do.
    #[error("transition from state {from} reads the empty word, the automaton is not deterministic")]
    EmptySymbol {
        /// Name of the state the transition leaves.
        from: String,
    },
    /// A symbol consists of more than one character.
    #[error("symbol {0:?} does not consist of a single character")]
    InvalidSymbol(String),
    /// A transition or marker refers to a state id that was never declared.
    #[error("state id {0} is not declared")]
    UnknownState(String),
    /// The same state id is declared twice.
    #[error("state id {0} is declared more than once")]
    DuplicateId(String),
    /// Two different states carry the same name.
    #[error("states {first} and {second} are both named {name}")]
    DuplicateName {
        /// The shared name.
        name: String,
        /// Id of the state that was declared first.
        first: String,
        /// Id of the state that was declared second.
        second: String,
    },
    /// No state is marked initial.
    #[error("no state is marked initial")]
    NoInitialState,
    /// The transitions do not form a deterministic automaton.
    #[error(transparent)]
    Build(#[from] BuildError<String, char>),
}

/// A deterministic automaton read from a JFLAP file. States are identified by the names given to them in the
/// editor, the ids JFLAP uses internally are resolved while reading.
///
/// ```
/// use automata_minimize::{jflap::JflapDfa, prelude::*};
///
/// let dfa = JflapDfa::parse(r#"
///     <structure>
///         <type>fa</type>
///         <automaton>
///             <state id="0" name="even"><initial/><final/></state>
///             <state id="1" name="odd"/>
///             <transition><from>0</from><to>1</to><read>a</read></transition>
///             <transition><from>1</from><to>0</to><read>a</read></transition>
///         </automaton>
///     </structure>"#).unwrap();
/// assert!(dfa.accepts("aa".chars()));
/// assert_eq!(minimize(&dfa).size(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JflapDfa {
    version: JflapVersion,
    dfa: TableDfa<String, char>,
}

impl JflapDfa {
    /// Reads the file at `path`, detecting its version from the content.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, JflapError> {
        let text = fs::read_to_string(path.as_ref())?;
        debug!("read {} bytes from {}", text.len(), path.as_ref().display());
        Self::parse(&text)
    }

    /// Reads the file at `path`, which must use the layout of `version`.
    pub fn from_file_with_version<P: AsRef<Path>>(
        path: P,
        version: JflapVersion,
    ) -> Result<Self, JflapError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::parse_with_version(&text, version)
    }

    /// Parses the content of a JFLAP file, detecting its version.
    pub fn parse(text: &str) -> Result<Self, JflapError> {
        let document = Document::parse(text)?;
        let version = JflapVersion::detect(&document);
        Self::read(&document, version)
    }

    /// Parses the content of a JFLAP file that uses the layout of `version`.
    pub fn parse_with_version(text: &str, version: JflapVersion) -> Result<Self, JflapError> {
        let document = Document::parse(text)?;
        Self::read(&document, version)
    }

    fn read(document: &Document<'_>, version: JflapVersion) -> Result<Self, JflapError> {
        let root = document.root_element();
        let raw = match version {
            JflapVersion::V6 => read_v6(root)?,
            JflapVersion::V8 => read_v8(root)?,
        };
        let dfa = raw.into_dfa()?;
        debug!(
            "parsed JFLAP {version} automaton with {} states and {} transitions",
            dfa.size(),
            dfa.transitions().count()
        );
        Ok(Self { version, dfa })
    }

    /// The layout the automaton was read from.
    pub fn version(&self) -> JflapVersion {
        self.version
    }

    /// Number of declared states.
    pub fn size(&self) -> usize {
        self.dfa.size()
    }

    /// Gives a reference to the underlying automaton.
    pub fn dfa(&self) -> &TableDfa<String, char> {
        &self.dfa
    }

    /// Consumes `self` and returns the underlying automaton.
    pub fn into_dfa(self) -> TableDfa<String, char> {
        self.dfa
    }
}

impl AutomatonSource for JflapDfa {
    type State = String;
    type Symbol = char;

    fn initial_state(&self) -> String {
        self.dfa.initial_state()
    }

    fn is_final(&self, state: &String) -> bool {
        self.dfa.is_final(state)
    }

    fn alphabet(&self) -> &Alphabet<char> {
        self.dfa.alphabet()
    }

    fn next(&self, state: &String, symbol: char) -> Option<String> {
        self.dfa.next(state, symbol)
    }
}

/// The content of a file before ids are resolved to names.
#[derive(Debug, Default)]
struct RawAutomaton<'a> {
    names: Bijection<&'a str, &'a str>,
    initial: Option<&'a str>,
    finals: Vec<&'a str>,
    transitions: Vec<(&'a str, Option<&'a str>, &'a str)>,
    symbols: Vec<&'a str>,
}

impl<'a> RawAutomaton<'a> {
    fn declare(&mut self, id: &'a str, name: &'a str) -> Result<(), JflapError> {
        trace!("declaring state {name} with id {id}");
        match self.names.insert(id, name) {
            Overwritten::Neither => Ok(()),
            Overwritten::Left(..) | Overwritten::Pair(..) | Overwritten::Both(..) => {
                Err(JflapError::DuplicateId(id.to_string()))
            }
            Overwritten::Right(first, _) => Err(JflapError::DuplicateName {
                name: name.to_string(),
                first: first.to_string(),
                second: id.to_string(),
            }),
        }
    }

    fn name(&self, id: &str) -> Result<String, JflapError> {
        self.names
            .get_by_left(id)
            .map(|name| name.to_string())
            .ok_or_else(|| JflapError::UnknownState(id.to_string()))
    }

    fn into_dfa(self) -> Result<TableDfa<String, char>, JflapError> {
        let initial = self.name(self.initial.ok_or(JflapError::NoInitialState)?)?;

        let mut transitions = Vec::with_capacity(self.transitions.len());
        for &(from, read, to) in &self.transitions {
            let from = self.name(from)?;
            let symbol = match read {
                Some(text) if !text.is_empty() => single_char(text)?,
                _ => return Err(JflapError::EmptySymbol { from }),
            };
            transitions.push((from, symbol, self.name(to)?));
        }
        let finals = self
            .finals
            .iter()
            .map(|id| self.name(id))
            .collect::<Result<Vec<_>, _>>()?;
        let symbols = self
            .symbols
            .iter()
            .map(|text| single_char(text))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DfaBuilder::default()
            .with_alphabet_symbols(symbols)
            .with_states(self.names.iter().map(|(_, name)| name.to_string()))
            .with_transitions(transitions)
            .with_final_states(finals)
            .into_dfa(initial)?)
    }
}

fn single_char(text: &str) -> Result<char, JflapError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok(symbol),
        _ => Err(JflapError::InvalidSymbol(text.to_string())),
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| n.has_tag_name(tag))
}

/// Trimmed text of the child element `tag`, which must exist and be non-empty.
fn child_text<'a>(
    node: Node<'a, '_>,
    tag: &'static str,
    context: &'static str,
) -> Result<&'a str, JflapError> {
    child(node, tag)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(JflapError::Missing { what: tag, context })
}

fn attribute<'a>(
    node: Node<'a, '_>,
    name: &'static str,
    context: &'static str,
) -> Result<&'a str, JflapError> {
    node.attribute(name)
        .map(str::trim)
        .ok_or(JflapError::Missing {
            what: name,
            context,
        })
}

fn read_v6<'a>(root: Node<'a, '_>) -> Result<RawAutomaton<'a>, JflapError> {
    let mut raw = RawAutomaton::default();
    for state in root.descendants().filter(|n| n.has_tag_name("state")) {
        let id = attribute(state, "id", "state")?;
        raw.declare(id, attribute(state, "name", "state")?)?;
        if child(state, "initial").is_some() {
            raw.initial = Some(id);
        }
        if child(state, "final").is_some() {
            raw.finals.push(id);
        }
    }
    for transition in root.descendants().filter(|n| n.has_tag_name("transition")) {
        raw.transitions.push((
            child_text(transition, "from", "transition")?,
            child(transition, "read").and_then(|n| n.text()),
            child_text(transition, "to", "transition")?,
        ));
    }
    Ok(raw)
}

fn read_v8<'a, 'input: 'a>(root: Node<'a, 'input>) -> Result<RawAutomaton<'a>, JflapError> {
    let structures = |kind: &'static str| {
        root.descendants()
            .filter(move |n| n.has_tag_name("structure") && n.attribute("type") == Some(kind))
    };
    let state_id = |state: Node<'a, 'input>| child_text(state, "id", "state");

    let mut raw = RawAutomaton::default();
    let state_set = structures("state_set").next().ok_or(JflapError::Missing {
        what: "state_set structure",
        context: "automaton",
    })?;
    for state in children(state_set, "state") {
        raw.declare(state_id(state)?, child_text(state, "name", "state")?)?;
    }

    for finals in structures("final_states") {
        for state in children(finals, "state") {
            raw.finals.push(state_id(state)?);
        }
    }
    if let Some(start) = structures("start_state").next() {
        let state = child(start, "state").ok_or(JflapError::Missing {
            what: "state",
            context: "start_state structure",
        })?;
        raw.initial = Some(state_id(state)?);
    }
    for set in structures("transition_set") {
        for transition in children(set, "fsa_trans") {
            let endpoint = |tag: &'static str| {
                child(transition, tag)
                    .ok_or(JflapError::Missing {
                        what: tag,
                        context: "fsa_trans",
                    })
                    .and_then(state_id)
            };
            raw.transitions.push((
                endpoint("from")?,
                child(transition, "input").and_then(|n| n.text()),
                endpoint("to")?,
            ));
        }
    }
    for alphabet in structures("input_alph") {
        for symbol in children(alphabet, "symbol") {
            if let Some(text) = symbol.text() {
                raw.symbols.push(text);
            }
        }
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v6(body: &str) -> String {
        format!("<structure><type>fa</type><automaton>{body}</automaton></structure>")
    }

    #[test]
    fn versions() {
        assert_eq!(JflapVersion::try_from(6).unwrap(), JflapVersion::V6);
        assert_eq!("8".parse::<JflapVersion>().unwrap(), JflapVersion::V8);
        assert!(matches!(
            JflapVersion::try_from(7),
            Err(JflapError::UnsupportedVersion(7))
        ));
        assert!(matches!(
            "seven".parse::<JflapVersion>(),
            Err(JflapError::UnrecognizedVersion(_))
        ));
        assert_eq!(
            JflapError::UnsupportedVersion(7).to_string(),
            "JFLAP version 7 is not supported, expected 6 or 8"
        );
    }

    #[test]
    fn empty_read_is_rejected() {
        let text = v6(r#"<state id="0" name="p"><initial/></state>
            <transition><from>0</from><to>0</to><read/></transition>"#);
        let err = JflapDfa::parse(&text).unwrap_err();
        assert!(matches!(&err, JflapError::EmptySymbol { from } if from == "p"));
        assert_eq!(
            err.to_string(),
            "transition from state p reads the empty word, the automaton is not deterministic"
        );
    }

    #[test]
    fn malformed_files() {
        assert!(matches!(
            JflapDfa::parse("<structure><automaton>"),
            Err(JflapError::Xml(_))
        ));
        assert!(matches!(
            JflapDfa::parse(&v6(r#"<state id="0" name="p"/>"#)),
            Err(JflapError::NoInitialState)
        ));
        assert!(matches!(
            JflapDfa::parse(&v6(r#"<state id="0"><initial/></state>"#)),
            Err(JflapError::Missing { what: "name", .. })
        ));
        assert!(matches!(
            JflapDfa::parse(&v6(r#"<state id="0" name="p"><initial/></state>
                <transition><from>0</from><to>3</to><read>a</read></transition>"#)),
            Err(JflapError::UnknownState(id)) if id == "3"
        ));
        assert!(matches!(
            JflapDfa::parse(&v6(r#"<state id="0" name="p"><initial/></state>
                <transition><from>0</from><to>0</to><read>ab</read></transition>"#)),
            Err(JflapError::InvalidSymbol(symbol)) if symbol == "ab"
        ));
        assert!(matches!(
            JflapDfa::parse_with_version(&v6(r#"<state id="0" name="p"/>"#), JflapVersion::V8),
            Err(JflapError::Missing { what: "state_set structure", .. })
        ));
    }

    #[test]
    fn duplicate_states() {
        let err = JflapDfa::parse(&v6(r#"<state id="0" name="p"><initial/></state>
            <state id="1" name="p"/>"#))
        .unwrap_err();
        assert_eq!(err.to_string(), "states 0 and 1 are both named p");
        assert!(matches!(
            JflapDfa::parse(&v6(r#"<state id="0" name="p"><initial/></state>
                <state id="0" name="q"/>"#)),
            Err(JflapError::DuplicateId(id)) if id == "0"
        ));
    }

    #[test]
    fn conflicting_transitions() {
        let text = v6(r#"<state id="0" name="p"><initial/></state><state id="1" name="q"/>
            <transition><from>0</from><to>1</to><read>a</read></transition>
            <transition><from>0</from><to>0</to><read>a</read></transition>"#);
        assert!(matches!(
            JflapDfa::parse(&text),
            Err(JflapError::Build(BuildError::Nondeterministic { .. }))
        ));
    }

    #[test]
    fn isolated_states_are_kept() {
        let dfa = JflapDfa::parse(&v6(r#"<state id="0" name="p"><initial/></state>
            <state id="1" name="lonely"><final/></state>"#))
        .unwrap();
        assert_eq!(dfa.version(), JflapVersion::V6);
        assert_eq!(dfa.size(), 2);
        assert!(dfa.is_final(&"lonely".to_string()));
        assert!(dfa.alphabet().is_empty());
    }
}
