//! The rule graph: choices and the directed "beats" relation.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::RuleError;

/// A set of named choices and the "beats" relation between them.
///
/// Invariants, enforced by every mutating operation:
///
/// - no choice appears in its own beaten-list (no self-loop)
/// - if A beats B, B does not beat A (no contradictory pair)
/// - every choice referenced by a rule exists in the choice set
///   (rules auto-create missing choices)
/// - deleting a choice purges it from every other beaten-list
///
/// Choice order is insertion order, preserved so that listings and
/// serialized output are deterministic. A choice first referenced as a
/// rule endpoint is created at that first reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleGraph {
    /// Choice names in insertion order.
    order: Vec<String>,
    /// Each choice's beaten-list, keyed by choice name.
    /// Kept in sync with `order`: same keys, no more, no fewer.
    beats: HashMap<String, Vec<String>>,
}

impl RuleGraph {
    /// Creates an empty rule graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// The classic preset: Rock beats Scissors beats Paper beats Rock.
    pub fn classic() -> Self {
        let mut graph = Self::new();
        for (beater, beaten) in [
            ("Rock", "Scissors"),
            ("Scissors", "Paper"),
            ("Paper", "Rock"),
        ] {
            graph
                .add_rule(beater, beaten)
                .expect("classic rules are consistent");
        }
        graph
    }

    /// Adds a choice with an empty beaten-list. No-op if already present.
    pub fn add_choice(&mut self, name: &str) {
        if !self.beats.contains_key(name) {
            self.order.push(name.to_string());
            self.beats.insert(name.to_string(), Vec::new());
        }
    }

    /// Removes a choice and every reference to it. No-op if absent.
    ///
    /// After this returns, `name` appears in no beaten-list and not in
    /// [`choices`](Self::choices) — no dangling edges survive.
    pub fn del_choice(&mut self, name: &str) {
        if self.beats.remove(name).is_none() {
            return;
        }
        self.order.retain(|c| c != name);
        for beaten in self.beats.values_mut() {
            beaten.retain(|b| b != name);
        }
    }

    /// Adds the rule "`beater` beats `beaten`".
    ///
    /// Auto-creates both choices. No-op if the edge already exists.
    ///
    /// # Errors
    /// Returns [`RuleError::InvalidRule`] if `beater == beaten` (self-loop)
    /// or if `beaten` already beats `beater` (contradiction). A rejected
    /// rule leaves the graph unchanged — not even the choices are created.
    pub fn add_rule(&mut self, beater: &str, beaten: &str) -> Result<(), RuleError> {
        if beater == beaten {
            return Err(RuleError::InvalidRule(format!(
                "{beater} cannot beat itself"
            )));
        }
        if self.beats(beaten, beater) {
            return Err(RuleError::InvalidRule(format!(
                "{beaten} already beats {beater}"
            )));
        }

        self.add_choice(beater);
        self.add_choice(beaten);

        let list = self.beats.get_mut(beater).expect("just inserted");
        if !list.iter().any(|b| b == beaten) {
            list.push(beaten.to_string());
        }
        Ok(())
    }

    /// Removes the rule "`beater` beats `beaten`". No-op if the edge or
    /// the beater choice is absent.
    pub fn del_rule(&mut self, beater: &str, beaten: &str) {
        if let Some(list) = self.beats.get_mut(beater) {
            list.retain(|b| b != beaten);
        }
    }

    /// The choice names, in insertion order.
    pub fn choices(&self) -> &[String] {
        &self.order
    }

    /// Returns `true` if `name` is a known choice.
    pub fn contains(&self, name: &str) -> bool {
        self.beats.contains_key(name)
    }

    /// Returns `true` if the rule "`beater` beats `beaten`" exists.
    pub fn beats(&self, beater: &str, beaten: &str) -> bool {
        self.beats
            .get(beater)
            .is_some_and(|list| list.iter().any(|b| b == beaten))
    }

    /// The choices that `choice` beats, in the order the rules were added.
    ///
    /// # Errors
    /// Returns [`RuleError::UnknownChoice`] if `choice` is not in the
    /// graph. An unknown choice is a caller bug or a stale reference, and
    /// an explicit error is more useful than an empty list.
    pub fn loses_against(&self, choice: &str) -> Result<&[String], RuleError> {
        self.beats
            .get(choice)
            .map(Vec::as_slice)
            .ok_or_else(|| RuleError::UnknownChoice(choice.to_string()))
    }

    /// Resolves a round of simultaneous choices to a winner index.
    ///
    /// A candidate wins if it beats every other entry in the round; the
    /// first such index (in input order) is returned. `None` means a tie —
    /// expected and common: identical choices can never beat each other,
    /// and intransitive cycles produce three-way draws.
    ///
    /// O(n²) in round size, which is fine: rounds are a handful of players.
    pub fn resolve<S: AsRef<str>>(&self, round: &[S]) -> Option<usize> {
        'candidates: for (i, candidate) in round.iter().enumerate() {
            for (j, other) in round.iter().enumerate() {
                if i != j && !self.beats(candidate.as_ref(), other.as_ref()) {
                    continue 'candidates;
                }
            }
            return Some(i);
        }
        None
    }

    /// The number of choices in the graph.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the graph has no choices.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Wire form
// ---------------------------------------------------------------------------

// The serialized form is a single JSON object mapping each choice name to
// the list of names it beats, e.g.:
//
//   { "Rock": ["Scissors"], "Scissors": ["Paper"], "Paper": ["Rock"] }
//
// This is both the persistence format and what travels inside Create and
// JoinResponse messages. Serialization walks the insertion order;
// deserialization replays each entry through `add_choice`/`add_rule`, so a
// rule set containing a self-loop or contradiction fails to decode instead
// of producing an inconsistent graph.

impl Serialize for RuleGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for name in &self.order {
            let beaten = self.beats.get(name).expect("order and beats in sync");
            map.serialize_entry(name, beaten)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RuleGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GraphVisitor;

        impl<'de> Visitor<'de> for GraphVisitor {
            type Value = RuleGraph;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of choice names to lists of beaten choices")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RuleGraph, A::Error> {
                let mut graph = RuleGraph::new();
                while let Some((name, beaten)) =
                    access.next_entry::<String, Vec<String>>()?
                {
                    graph.add_choice(&name);
                    for target in &beaten {
                        graph
                            .add_rule(&name, target)
                            .map_err(serde::de::Error::custom)?;
                    }
                }
                Ok(graph)
            }
        }

        deserializer.deserialize_map(GraphVisitor)
    }
}

// =========================================================================
// Tests
// =========================================================================
