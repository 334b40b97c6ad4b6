//! Session state machine.
//!
//! Owns the authoritative in-memory state for one user's session: the
//! conversation roster, the active-conversation pointer, the live message
//! transcript, and the send-protocol flags. All methods here are
//! synchronous and touch nothing outside `self`; the async choreography
//! (store writes, completion calls) lives in [`super::service`].
//!
//! The `generation` counter guards against stale completions: every
//! transition that rebinds `live_messages` bumps it, and a reply carrying
//! a superseded generation is discarded instead of being appended.

use serde::Serialize;

use confab_types::conversation::{Conversation, ConversationId};
use confab_types::error::SessionError;
use confab_types::message::Message;
use confab_types::personality::PersonalityKey;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Identity provider has not resolved yet.
    Unauthenticated,
    /// Identity resolution in progress; the roster must not be fetched yet.
    Loading,
    /// Authenticated, no conversation bound.
    Idle,
    /// Personality chosen and conversation created, nothing sent yet.
    PersonalityChosen,
    /// A conversation is underway.
    Chatting,
}

/// Everything `begin_send` hands to the completion service.
///
/// `outbound` is the live history minus the fixed greeting; `generation`
/// lets the eventual response be checked against intervening resets.
#[derive(Debug, Clone)]
pub struct SendTicket {
    pub generation: u64,
    pub mode: PersonalityKey,
    pub outbound: Vec<Message>,
}

/// Instruction to mirror a completed exchange into the store.
#[derive(Debug, Clone)]
pub struct PersistPlan {
    pub id: ConversationId,
    pub messages: Vec<Message>,
}

/// Result of feeding a completion-service reply back into the state.
#[derive(Debug)]
pub enum SendOutcome {
    /// Reply appended; persist the messages when a plan is present.
    Applied(Option<PersistPlan>),
    /// The reply belonged to a superseded generation and was discarded.
    Stale,
}

/// Authoritative in-memory session state for one user.
#[derive(Debug)]
pub struct SessionState {
    phase: SessionPhase,
    username: Option<String>,
    roster: Vec<Conversation>,
    active_index: Option<usize>,
    live_messages: Vec<Message>,
    pending_mode: Option<PersonalityKey>,
    send_in_flight: bool,
    generation: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            username: None,
            roster: Vec::new(),
            active_index: None,
            live_messages: Vec::new(),
            pending_mode: None,
            send_in_flight: false,
            generation: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn roster(&self) -> &[Conversation] {
        &self.roster
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn live_messages(&self) -> &[Message] {
        &self.live_messages
    }

    pub fn pending_mode(&self) -> Option<PersonalityKey> {
        self.pending_mode
    }

    pub fn send_in_flight(&self) -> bool {
        self.send_in_flight
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Identity resolution has started.
    pub fn begin_auth(&mut self) {
        self.phase = SessionPhase::Loading;
    }

    /// Identity resolved; install the fetched roster.
    pub fn authenticated(&mut self, username: String, roster: Vec<Conversation>) {
        self.username = Some(username);
        self.roster = roster;
        self.phase = SessionPhase::Idle;
    }

    /// Append a freshly persisted conversation and make it active.
    ///
    /// Must only be called after the store create succeeded; a failed
    /// create leaves the session in `Idle` untouched.
    pub fn commit_conversation(&mut self, conversation: Conversation) {
        self.pending_mode = Some(conversation.mode);
        self.live_messages = conversation.messages.clone();
        self.roster.push(conversation);
        self.active_index = Some(self.roster.len() - 1);
        self.phase = SessionPhase::PersonalityChosen;
        self.bump_generation();
    }

    /// Bind an existing roster entry.
    ///
    /// The live transcript is replaced wholesale with the entry's stored
    /// messages, never merged with prior content.
    pub fn select_conversation(&mut self, index: usize) -> Result<(), SessionError> {
        let entry = self
            .roster
            .get(index)
            .ok_or(SessionError::InvalidRosterIndex(index))?;
        self.live_messages = entry.messages.clone();
        self.pending_mode = Some(entry.mode);
        self.active_index = Some(index);
        self.phase = SessionPhase::Chatting;
        self.bump_generation();
        Ok(())
    }

    /// Optimistically append a user message and open a send cycle.
    ///
    /// Exactly one send may be outstanding; a second submit is rejected
    /// without touching the transcript. The greeting (first entry) is
    /// excluded from the outbound history.
    pub fn begin_send(&mut self, text: impl Into<String>) -> Result<SendTicket, SessionError> {
        if self.send_in_flight {
            return Err(SessionError::SendInFlight);
        }
        let mode = self.pending_mode.ok_or(SessionError::NoActiveConversation)?;
        self.live_messages.push(Message::user(text));
        self.send_in_flight = true;
        self.phase = SessionPhase::Chatting;
        Ok(SendTicket {
            generation: self.generation,
            mode,
            outbound: self.live_messages[1..].to_vec(),
        })
    }

    /// Feed the completion-service reply back in.
    ///
    /// Appends the single assistant message, mirrors the transcript into
    /// the active roster entry, and returns the persist plan for it. A
    /// reply for a superseded generation is discarded.
    pub fn complete_send(&mut self, generation: u64, reply: Message) -> SendOutcome {
        if generation != self.generation {
            return SendOutcome::Stale;
        }
        self.live_messages.push(reply);
        self.send_in_flight = false;
        SendOutcome::Applied(self.mirror_active())
    }

    /// Close a failed send cycle.
    ///
    /// The optimistic user message stays visible; no assistant message is
    /// appended and nothing is persisted.
    pub fn fail_send(&mut self, generation: u64) {
        if generation == self.generation {
            self.send_in_flight = false;
        }
    }

    /// "New conversation" intent: unbind everything, keep the roster.
    ///
    /// The previous conversation stays in the roster and in the store.
    pub fn reset(&mut self) {
        self.pending_mode = None;
        self.active_index = None;
        self.live_messages.clear();
        if !matches!(
            self.phase,
            SessionPhase::Unauthenticated | SessionPhase::Loading
        ) {
            self.phase = SessionPhase::Idle;
        }
        self.bump_generation();
    }

    /// Copy the live transcript into the active roster entry so the two
    /// never diverge past a completed send cycle.
    fn mirror_active(&mut self) -> Option<PersistPlan> {
        let index = self.active_index?;
        let entry = &mut self.roster[index];
        entry.messages = self.live_messages.clone();
        Some(PersistPlan {
            id: entry.id.clone(),
            messages: entry.messages.clone(),
        })
    }

    /// Invalidate any in-flight send; its eventual reply will be stale.
    fn bump_generation(&mut self) {
        self.generation += 1;
        self.send_in_flight = false;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
