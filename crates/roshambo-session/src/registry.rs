//! Registry: the process-wide map from game name to live session.
//!
//! This is the only state shared across sessions. The server guards it
//! with a single mutex; everything behind a [`SessionHandle`] is already
//! serialized by that session's actor.

use std::collections::HashMap;

use roshambo_rules::RuleGraph;

use crate::session::spawn_session;
use crate::{ClientSender, GameError, SessionHandle};

/// Default command channel size for session actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Maps game names to running sessions.
///
/// A name is claimed at creation and released when the controller's
/// handler removes it on exit — sessions are never garbage-collected for
/// being empty.
pub struct Registry {
    sessions: HashMap<String, SessionHandle>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Creates a new session and claims its name.
    ///
    /// Spawns the session actor with `controller` as its controller
    /// channel and `rules` as the initial rule graph.
    ///
    /// # Errors
    /// Returns [`GameError::GameExists`] if the name is already claimed;
    /// nothing is spawned in that case.
    pub fn create(
        &mut self,
        name: &str,
        password: Option<String>,
        rules: RuleGraph,
        controller: ClientSender,
    ) -> Result<SessionHandle, GameError> {
        if self.sessions.contains_key(name) {
            return Err(GameError::GameExists(name.to_string()));
        }

        let handle = spawn_session(
            name.to_string(),
            password,
            rules,
            controller,
            DEFAULT_CHANNEL_SIZE,
        );
        self.sessions.insert(name.to_string(), handle.clone());
        tracing::info!(game = %name, "game registered");
        Ok(handle)
    }

    /// Looks up a session by game name.
    ///
    /// # Errors
    /// Returns [`GameError::NotFound`] if no game has this name.
    pub fn get(&self, name: &str) -> Result<SessionHandle, GameError> {
        self.sessions
            .get(name)
            .cloned()
            .ok_or_else(|| GameError::NotFound(name.to_string()))
    }

    /// Releases a game name. Returns the handle if one was registered.
    ///
    /// Called from the controller handler's exit path — controller
    /// disconnect is the sole destruction trigger.
    pub fn remove(&mut self, name: &str) -> Option<SessionHandle> {
        let handle = self.sessions.remove(name);
        if handle.is_some() {
            tracing::info!(game = %name, "game removed");
        }
        handle
    }

    /// The number of registered games.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no games are registered.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// The registered game names, in no particular order.
    pub fn names(&self) -> Vec<String> {
        self.sessions.keys().cloned().collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
