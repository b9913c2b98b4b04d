use super::collector::Session;
use tracing::{debug, warn};

/// Handle for a session pushed on a [`SessionStack`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

/// Strictly nested measurement sessions.
///
/// Only the top session's driver runs. Starting a child first drains the
/// running driver into its own session, so the parent keeps everything it
/// saw before the child began. Stopping the child drains it, optionally
/// folds that delta into the parent, and resumes the parent's driver.
///
/// The stack is an owned value; callers thread it through their run context
/// instead of relying on a global.
#[derive(Debug, Default)]
pub struct SessionStack {
    entries: Vec<(SessionId, Session)>,
    next_id: u64,
}

impl SessionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `session` and start measuring into it
    pub fn start(&mut self, mut session: Session) -> SessionId {
        if let Some((active_id, active)) = self.entries.last_mut() {
            let delta = active.driver_mut().stop();
            debug!(
                session = active_id.0,
                files = delta.len(),
                "suspending active session"
            );
            active.merge(&delta);
        }

        let id = SessionId(self.next_id);
        self.next_id += 1;
        session.driver_mut().start();
        debug!(session = id.0, depth = self.entries.len() + 1, "session started");
        self.entries.push((id, session));
        id
    }

    /// Stop the top session and hand it back.
    ///
    /// Returns `None` and leaves the stack untouched when `id` is not the
    /// active session. With `merge_to_parent == false` the child's hits are
    /// attributed to the child only.
    pub fn stop(&mut self, id: SessionId, merge_to_parent: bool) -> Option<Session> {
        match self.entries.last() {
            Some((top, _)) if *top == id => {}
            _ => {
                warn!(session = id.0, "refusing to stop a session that is not active");
                return None;
            }
        }

        let (_, mut session) = self.entries.pop()?;
        let delta = session.driver_mut().stop();
        session.merge(&delta);

        if let Some((parent_id, parent)) = self.entries.last_mut() {
            if merge_to_parent {
                parent.merge(&delta);
            }
            parent.driver_mut().start();
            debug!(
                session = id.0,
                parent = parent_id.0,
                merged = merge_to_parent,
                "session stopped, parent resumed"
            );
        } else {
            debug!(session = id.0, "last session stopped");
        }

        Some(session)
    }

    /// The session currently measuring
    pub fn active(&self) -> Option<SessionId> {
        self.entries.last().map(|(id, _)| *id)
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, session)| session)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.entries
            .iter_mut()
            .find(|(entry, _)| *entry == id)
            .map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
