//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// A live handle exists exactly when an identity is set.
///
/// The driver never has more than one handle open, and the one it has is the
/// handle the connection manager considers live.
pub struct HandleIffIdentity;

impl Invariant for HandleIffIdentity {
    fn name(&self) -> &'static str {
        "handle_iff_identity"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let violation = |message: String| Violation { invariant: self.name(), message };

            if client.open_handles.len() > 1 {
                return Err(violation(format!(
                    "client {}: {} handles open: {:?}",
                    client.id,
                    client.open_handles.len(),
                    client.open_handles
                )));
            }
            if client.identity.is_some() != client.handle.is_some() {
                return Err(violation(format!(
                    "client {}: identity {:?} with handle {:?}",
                    client.id, client.identity, client.handle
                )));
            }
            if client.open_handles.first() != client.handle.as_ref() {
                return Err(violation(format!(
                    "client {}: driver has {:?} open, live handle is {:?}",
                    client.id, client.open_handles, client.handle
                )));
            }
        }
        Ok(())
    }
}

/// Without an identity the view is empty.
///
/// Nothing from a previous session may linger after teardown.
pub struct EmptyViewWithoutSession;

impl Invariant for EmptyViewWithoutSession {
    fn name(&self) -> &'static str {
        "empty_view_without_session"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in state.clients.iter().filter(|c| c.identity.is_none()) {
            if !client.transcript.is_empty() || !client.roster.is_empty() || !client.typing.is_empty()
            {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: no identity but {} messages, roster {:?}, typing {:?}",
                        client.id,
                        client.transcript.len(),
                        client.roster,
                        client.typing
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Within one handle the transcript only grows at the end.
///
/// Every observation is a prefix of the next observation for the same
/// handle. A new handle starts a fresh transcript.
pub struct TranscriptAppendOnly;

impl Invariant for TranscriptAppendOnly {
    fn name(&self) -> &'static str {
        "transcript_append_only"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            for window in client.transcript_history.windows(2) {
                let (before_handle, before) = &window[0];
                let (after_handle, after) = &window[1];
                if before_handle != after_handle {
                    continue;
                }
                if !after.starts_with(before) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "client {} on {}: transcript of {} messages rewritten to {}",
                            client.id,
                            before_handle,
                            before.len(),
                            after.len()
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Once nothing is in flight, every online client shows the room's roster
/// exactly.
///
/// Checked only when the snapshot carries room state. The typing level is
/// not compared: the room sends it to newcomers only on the next change.
pub struct RosterConvergence;

impl Invariant for RosterConvergence {
    fn name(&self) -> &'static str {
        "roster_convergence"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(room) = &state.room else {
            return Ok(());
        };

        for client in state.clients.iter().filter(|c| c.online) {
            if client.roster != room.users {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: roster {:?}, room has {:?}",
                        client.id, client.roster, room.users
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use murmur_core::{HandleId, Identity, Message};

    use super::*;
    use crate::{ClientSnapshot, RoomSnapshot};

    fn message(text: &str) -> Message {
        Message::new(Identity::reported("bob"), text, "00:00:00")
    }

    #[test]
    fn two_open_handles_violate() {
        let h1 = HandleId::FIRST;
        let client = ClientSnapshot::new(0)
            .with_session("alice", h1.next())
            .with_open_handles([h1, h1.next()]);
        assert!(HandleIffIdentity.check(&SystemSnapshot::single(client)).is_err());
    }

    #[test]
    fn identity_without_handle_violates() {
        let mut client = ClientSnapshot::new(0);
        client.identity = Some("alice".into());
        assert!(HandleIffIdentity.check(&SystemSnapshot::single(client)).is_err());
    }

    #[test]
    fn matching_handle_passes() {
        let client = ClientSnapshot::new(0)
            .with_session("alice", HandleId::FIRST)
            .with_open_handles([HandleId::FIRST]);
        assert!(HandleIffIdentity.check(&SystemSnapshot::single(client)).is_ok());
    }

    #[test]
    fn leftover_roster_without_identity_violates() {
        let client = ClientSnapshot::new(0).with_roster(["alice"]);
        assert!(EmptyViewWithoutSession.check(&SystemSnapshot::single(client)).is_err());
    }

    #[test]
    fn leftover_transcript_or_typing_without_identity_violates() {
        let transcript = ClientSnapshot::new(0).with_transcript([message("a")]);
        assert!(EmptyViewWithoutSession.check(&SystemSnapshot::single(transcript)).is_err());

        let typing = ClientSnapshot::new(1).with_typing(["bob"]);
        assert!(EmptyViewWithoutSession.check(&SystemSnapshot::single(typing)).is_err());

        let joined = ClientSnapshot::new(2)
            .with_session("alice", HandleId::FIRST)
            .with_transcript([message("a")])
            .with_typing(["bob"]);
        assert!(EmptyViewWithoutSession.check(&SystemSnapshot::single(joined)).is_ok());
    }

    #[test]
    fn rewritten_transcript_violates() {
        let h1 = HandleId::FIRST;
        let mut client = ClientSnapshot::new(0);
        client.record_transcript(h1, vec![message("a")]);
        client.record_transcript(h1, vec![message("a"), message("b")]);
        assert!(TranscriptAppendOnly.check(&SystemSnapshot::single(client.clone())).is_ok());

        client.record_transcript(h1, vec![message("x"), message("b")]);
        assert!(TranscriptAppendOnly.check(&SystemSnapshot::single(client)).is_err());
    }

    #[test]
    fn new_handle_may_start_over() {
        let h1 = HandleId::FIRST;
        let mut client = ClientSnapshot::new(0);
        client.record_transcript(h1, vec![message("a")]);
        client.record_transcript(h1.next(), vec![]);
        assert!(TranscriptAppendOnly.check(&SystemSnapshot::single(client)).is_ok());
    }

    #[test]
    fn roster_convergence_only_checks_online_clients() {
        let room = RoomSnapshot { users: vec!["alice".into()] };
        let stale = ClientSnapshot::new(0).with_roster(["alice", "bob"]);
        let snapshot = SystemSnapshot::single(stale.clone()).with_room(room.clone());
        assert!(RosterConvergence.check(&snapshot).is_ok());

        let snapshot = SystemSnapshot::single(stale.online()).with_room(room);
        assert!(RosterConvergence.check(&snapshot).is_err());
    }
}
