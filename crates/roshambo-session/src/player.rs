//! Choice sources: where a participant's pick comes from.
//!
//! A participant is a name, a score, and a choice source. The session
//! layer only ever depends on the [`ChoiceSource`] capability, never on a
//! concrete variant:
//!
//! - [`AiSource`] — a uniform random member of the live choice set
//! - [`RemoteSource`] — a slot filled by a network submission
//! - [`ConsoleSource`] — a blocking prompt loop for local play
//!
//! The choice set is passed into `get_choice` on every call rather than
//! captured at construction, because choices can be added and removed
//! between rounds — a source must always draw from the *current* rules.

use std::io::{BufRead, Write};

use rand::seq::IndexedRandom;

/// Errors produced by choice sources.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// `get_choice` on a [`RemoteSource`] with nothing pending. This is a
    /// protocol-sequencing violation (resolving a round before every
    /// submission arrived), surfaced at the point of error instead of as
    /// a downstream null.
    #[error("no choice has been submitted")]
    ChoiceUnset,

    /// `submit` on a [`RemoteSource`] that already holds a choice —
    /// exactly one submission per round per participant.
    #[error("a choice is already pending")]
    AlreadySubmitted,

    /// The live choice set is empty; there is nothing to pick.
    #[error("no choices to pick from")]
    NoChoices,

    /// Prompting or reading input failed.
    #[error("prompt failed: {0}")]
    Io(#[from] std::io::Error),
}

/// The one capability a participant needs: produce a choice.
pub trait ChoiceSource {
    /// Produces a choice from the given live choice set.
    fn get_choice(&mut self, choices: &[String]) -> Result<String, PlayerError>;
}

// ---------------------------------------------------------------------------
// AiSource
// ---------------------------------------------------------------------------

/// Picks uniformly at random from the live choice set. Stateless across
/// calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct AiSource;

impl ChoiceSource for AiSource {
    fn get_choice(&mut self, choices: &[String]) -> Result<String, PlayerError> {
        choices
            .choose(&mut rand::rng())
            .cloned()
            .ok_or(PlayerError::NoChoices)
    }
}

// ---------------------------------------------------------------------------
// RemoteSource
// ---------------------------------------------------------------------------

/// A participant's pending submission for the current round.
///
/// Modeled as an explicit state, not a sentinel value:
/// [`submit`](RemoteSource::submit) transitions `None → Pending` (or fails
/// if already pending), [`take`](RemoteSource::take) transitions
/// `Pending → None` while returning the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PendingChoice {
    /// Nothing submitted this round.
    #[default]
    None,
    /// One choice submitted, awaiting the reveal.
    Pending(String),
}

/// A choice source fed externally, one submission at a time.
///
/// This is what the session layer binds to every network participant: the
/// connection handler calls [`submit`](Self::submit) when a choice message
/// arrives, and the reveal consumes it with [`take`](Self::take).
#[derive(Debug, Default)]
pub struct RemoteSource {
    pending: PendingChoice,
}

impl RemoteSource {
    /// Creates a source with no pending choice.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a choice is waiting to be revealed.
    pub fn has_pending(&self) -> bool {
        matches!(self.pending, PendingChoice::Pending(_))
    }

    /// Stores a submitted choice.
    ///
    /// # Errors
    /// Returns [`PlayerError::AlreadySubmitted`] if a choice is already
    /// pending — the slot holds at most one submission per round.
    pub fn submit(&mut self, choice: String) -> Result<(), PlayerError> {
        match self.pending {
            PendingChoice::Pending(_) => Err(PlayerError::AlreadySubmitted),
            PendingChoice::None => {
                self.pending = PendingChoice::Pending(choice);
                Ok(())
            }
        }
    }

    /// Consumes and returns the pending choice, clearing the slot.
    ///
    /// # Errors
    /// Returns [`PlayerError::ChoiceUnset`] if nothing is pending.
    pub fn take(&mut self) -> Result<String, PlayerError> {
        match std::mem::take(&mut self.pending) {
            PendingChoice::Pending(choice) => Ok(choice),
            PendingChoice::None => Err(PlayerError::ChoiceUnset),
        }
    }
}

impl ChoiceSource for RemoteSource {
    fn get_choice(&mut self, _choices: &[String]) -> Result<String, PlayerError> {
        self.take()
    }
}

// ---------------------------------------------------------------------------
// ConsoleSource
// ---------------------------------------------------------------------------

/// Prompts a local human until they enter a member of the live choice set.
///
/// Generic over the reader and writer so tests can drive it with in-memory
/// buffers instead of a terminal.
#[derive(Debug)]
pub struct ConsoleSource<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ConsoleSource<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> ChoiceSource for ConsoleSource<R, W> {
    fn get_choice(&mut self, choices: &[String]) -> Result<String, PlayerError> {
        loop {
            writeln!(self.writer, "choose one of: {}", choices.join(", "))?;
            self.writer.flush()?;

            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(PlayerError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "input closed before a choice was made",
                )));
            }

            let entered = line.trim();
            if choices.iter().any(|c| c == entered) {
                return Ok(entered.to_string());
            }
            writeln!(self.writer, "{entered} is not a valid choice")?;
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> Vec<String> {
        ["Rock", "Paper", "Scissors"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    // =====================================================================
    // AiSource
    // =====================================================================

    #[test]
    fn test_ai_source_picks_a_member() {
        let choices = classic();
        let mut ai = AiSource;

        for _ in 0..50 {
            let pick = ai.get_choice(&choices).expect("should pick");
            assert!(choices.contains(&pick), "{pick} is not a valid choice");
        }
    }

    #[test]
    fn test_ai_source_empty_set_fails() {
        let mut ai = AiSource;
        let result = ai.get_choice(&[]);
        assert!(matches!(result, Err(PlayerError::NoChoices)));
    }

    #[test]
    fn test_ai_source_single_choice_is_forced() {
        let choices = vec!["Rock".to_string()];
        let mut ai = AiSource;
        assert_eq!(ai.get_choice(&choices).unwrap(), "Rock");
    }

    // =====================================================================
    // RemoteSource
    // =====================================================================

    #[test]
    fn test_remote_source_submit_then_take() {
        let mut source = RemoteSource::new();
        source.submit("Rock".into()).expect("first submit");

        assert!(source.has_pending());
        assert_eq!(source.take().unwrap(), "Rock");
        // The read cleared the slot.
        assert!(!source.has_pending());
    }

    #[test]
    fn test_remote_source_take_without_submit_fails() {
        let mut source = RemoteSource::new();
        let result = source.take();
        assert!(matches!(result, Err(PlayerError::ChoiceUnset)));
    }

    #[test]
    fn test_remote_source_double_submit_fails() {
        let mut source = RemoteSource::new();
        source.submit("Rock".into()).unwrap();

        let result = source.submit("Paper".into());

        assert!(matches!(result, Err(PlayerError::AlreadySubmitted)));
        // The original submission is untouched.
        assert_eq!(source.take().unwrap(), "Rock");
    }

    #[test]
    fn test_remote_source_can_resubmit_after_take() {
        let mut source = RemoteSource::new();
        source.submit("Rock".into()).unwrap();
        source.take().unwrap();

        // A new round: the slot is free again.
        source.submit("Paper".into()).expect("slot cleared by take");
        assert_eq!(source.take().unwrap(), "Paper");
    }

    #[test]
    fn test_remote_source_get_choice_consumes() {
        // The trait method behaves like take(); the choice set is ignored.
        let mut source = RemoteSource::new();
        source.submit("Scissors".into()).unwrap();

        assert_eq!(source.get_choice(&classic()).unwrap(), "Scissors");
        assert!(matches!(
            source.get_choice(&classic()),
            Err(PlayerError::ChoiceUnset)
        ));
    }

    // =====================================================================
    // ConsoleSource
    // =====================================================================

    #[test]
    fn test_console_source_accepts_valid_choice() {
        let input = std::io::Cursor::new("Rock\n");
        let mut out = Vec::new();
        let mut source = ConsoleSource::new(input, &mut out);

        let pick = source.get_choice(&classic()).unwrap();

        assert_eq!(pick, "Rock");
        let prompt = String::from_utf8(out).unwrap();
        assert!(prompt.contains("Rock, Paper, Scissors"));
    }

    #[test]
    fn test_console_source_reprompts_until_valid() {
        // Two bad entries, then a good one.
        let input = std::io::Cursor::new("Lizard\nSpock\nPaper\n");
        let mut out = Vec::new();
        let mut source = ConsoleSource::new(input, &mut out);

        let pick = source.get_choice(&classic()).unwrap();

        assert_eq!(pick, "Paper");
        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains("Lizard is not a valid choice"));
        assert!(transcript.contains("Spock is not a valid choice"));
    }

    #[test]
    fn test_console_source_trims_whitespace() {
        let input = std::io::Cursor::new("  Scissors  \n");
        let mut out = Vec::new();
        let mut source = ConsoleSource::new(input, &mut out);

        assert_eq!(source.get_choice(&classic()).unwrap(), "Scissors");
    }

    #[test]
    fn test_console_source_eof_fails() {
        let input = std::io::Cursor::new("");
        let mut out = Vec::new();
        let mut source = ConsoleSource::new(input, &mut out);

        let result = source.get_choice(&classic());
        assert!(matches!(result, Err(PlayerError::Io(_))));
    }
}
