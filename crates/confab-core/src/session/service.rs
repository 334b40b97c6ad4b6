//! Session service orchestrating the state machine against the store and
//! the completion service.
//!
//! All persistence flows through a single write path: the persist plan
//! returned by a completed send cycle. There is no implicit watcher
//! copying the live transcript back into the roster behind the scenes.

use chrono::Local;
use tokio::sync::Mutex;
use tracing::{info, warn};

use confab_types::conversation::{ConversationId, NewConversation};
use confab_types::error::SessionError;
use confab_types::message::Message;
use confab_types::personality::PersonalityKey;

use crate::completion::CompletionClient;
use crate::conversation::repository::ConversationRepository;
use crate::session::state::{SendOutcome, SessionPhase, SessionState};

/// Serializable view of the session for the presentation layer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub username: Option<String>,
    pub roster: Vec<RosterEntry>,
    pub active_index: Option<usize>,
    pub live_messages: Vec<Message>,
    pub pending_mode: Option<PersonalityKey>,
    pub send_in_flight: bool,
}

/// Roster listing line: enough for the sidebar, not the full transcript.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RosterEntry {
    pub id: ConversationId,
    pub title: String,
    pub mode: PersonalityKey,
    pub message_count: usize,
}

/// Mediates between the UI, the completion service, and the conversation
/// store for one authenticated user.
///
/// Generic over `ConversationRepository` and `CompletionClient` so the
/// core never depends on confab-infra. The state lock is dropped across
/// the completion await; the generation carried by each send ticket makes
/// interleavings with reset or reselection safe.
pub struct SessionService<R, C> {
    repo: R,
    client: C,
    state: Mutex<SessionState>,
}

impl<R: ConversationRepository, C: CompletionClient> SessionService<R, C> {
    pub fn new(repo: R, client: C) -> Self {
        Self {
            repo,
            client,
            state: Mutex::new(SessionState::new()),
        }
    }

    /// Resolve identity and load the roster.
    ///
    /// The roster query runs only with a fully resolved username. A query
    /// failure degrades to an empty roster rather than blocking the page.
    pub async fn open(&self, username: &str) -> SessionSnapshot {
        let mut state = self.state.lock().await;
        state.begin_auth();
        let roster = match self.repo.list_by_owner(username).await {
            Ok(roster) => roster,
            Err(err) => {
                warn!(owner = username, error = %err, "roster query failed, starting empty");
                Vec::new()
            }
        };
        state.authenticated(username.to_string(), roster);
        snapshot_of(&state)
    }

    /// Choose a personality: build the greeting and the titled draft,
    /// persist it, and only then commit the conversation into the session.
    ///
    /// Creation is atomic from the session's point of view: on store
    /// failure the session stays in `Idle` and the error surfaces. The
    /// create is never retried blindly.
    pub async fn start_conversation(
        &self,
        key: PersonalityKey,
    ) -> Result<SessionSnapshot, SessionError> {
        let mut state = self.state.lock().await;
        let owner = state
            .username()
            .ok_or(SessionError::NotAuthenticated)?
            .to_string();

        let draft = NewConversation {
            title: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            mode: key,
            owner,
            messages: vec![key.opening_message()],
        };

        let conversation = self.repo.create(&draft).await?;
        info!(id = %conversation.id, mode = %key, "conversation created");
        state.commit_conversation(conversation);
        Ok(snapshot_of(&state))
    }

    /// Bind an existing roster entry to the live transcript.
    pub async fn select_conversation(&self, index: usize) -> Result<SessionSnapshot, SessionError> {
        let mut state = self.state.lock().await;
        state.select_conversation(index)?;
        Ok(snapshot_of(&state))
    }

    /// Submit a user message and await the assistant reply.
    ///
    /// The optimistic append happens under the lock; the completion call
    /// runs without it. On success the exchange is mirrored into the
    /// roster and persisted in one step; a persist failure is a warning,
    /// never a rollback of what the user already saw.
    pub async fn send_message(&self, text: &str) -> Result<SessionSnapshot, SessionError> {
        let ticket = {
            let mut state = self.state.lock().await;
            state.begin_send(text)?
        };

        let reply = self.client.complete(ticket.mode, &ticket.outbound).await;

        let mut state = self.state.lock().await;
        match reply {
            Ok(reply) => {
                match state.complete_send(ticket.generation, reply) {
                    SendOutcome::Applied(Some(plan)) => {
                        if let Err(err) = self.repo.update_messages(&plan.id, &plan.messages).await
                        {
                            warn!(id = %plan.id, error = %err, "conversation persist failed");
                        }
                    }
                    SendOutcome::Applied(None) => {}
                    SendOutcome::Stale => {
                        info!("discarding completion reply for a superseded send");
                    }
                }
                Ok(snapshot_of(&state))
            }
            Err(err) => {
                state.fail_send(ticket.generation);
                Err(SessionError::Completion(err))
            }
        }
    }

    /// "New conversation": unbind the active conversation, keep the
    /// roster and the store untouched.
    pub async fn new_conversation(&self) -> SessionSnapshot {
        let mut state = self.state.lock().await;
        state.reset();
        snapshot_of(&state)
    }

    /// Current state of the session.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        snapshot_of(&state)
    }
}

fn snapshot_of(state: &SessionState) -> SessionSnapshot {
    SessionSnapshot {
        phase: state.phase(),
        username: state.username().map(String::from),
        roster: state
            .roster()
            .iter()
            .map(|c| RosterEntry {
                id: c.id.clone(),
                title: c.title.clone(),
                mode: c.mode,
                message_count: c.messages.len(),
            })
            .collect(),
        active_index: state.active_index(),
        live_messages: state.live_messages().to_vec(),
        pending_mode: state.pending_mode(),
        send_in_flight: state.send_in_flight(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};

    use confab_types::conversation::Conversation;
    use confab_types::error::{CompletionError, RepositoryError};
    use confab_types::message::MessageRole;

    #[derive(Default)]
    struct MemoryRepo {
        rows: StdMutex<Vec<Conversation>>,
        fail_create: AtomicBool,
        fail_update: AtomicBool,
        fail_list: AtomicBool,
    }

    impl MemoryRepo {
        fn row(&self, index: usize) -> Conversation {
            self.rows.lock().unwrap()[index].clone()
        }

        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    impl ConversationRepository for MemoryRepo {
        async fn create(&self, draft: &NewConversation) -> Result<Conversation, RepositoryError> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(RepositoryError::Connection);
            }
            let conversation = Conversation {
                id: ConversationId::new(),
                title: draft.title.clone(),
                mode: draft.mode,
                owner: draft.owner.clone(),
                messages: draft.messages.clone(),
            };
            self.rows.lock().unwrap().push(conversation.clone());
            Ok(conversation)
        }

        async fn update_messages(
            &self,
            id: &ConversationId,
            messages: &[Message],
        ) -> Result<(), RepositoryError> {
            if self.fail_update.load(Ordering::SeqCst) {
                return Err(RepositoryError::Connection);
            }
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|c| &c.id == id)
                .ok_or(RepositoryError::NotFound)?;
            row.messages = messages.to_vec();
            Ok(())
        }

        async fn list_by_owner(&self, owner: &str) -> Result<Vec<Conversation>, RepositoryError> {
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(RepositoryError::Connection);
            }
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.owner == owner)
                .cloned()
                .collect())
        }

        async fn get(&self, id: &ConversationId) -> Result<Option<Conversation>, RepositoryError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|c| &c.id == id)
                .cloned())
        }
    }

    /// Scripted completion client; optionally gated on a semaphore so
    /// tests can hold a send in flight.
    struct ScriptedClient {
        reply: &'static str,
        fail: bool,
        gate: Option<Arc<tokio::sync::Semaphore>>,
        seen: StdMutex<Vec<(PersonalityKey, Vec<Message>)>>,
    }

    impl ScriptedClient {
        fn replying(reply: &'static str) -> Self {
            Self {
                reply,
                fail: false,
                gate: None,
                seen: StdMutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: "",
                fail: true,
                gate: None,
                seen: StdMutex::new(Vec::new()),
            }
        }

        fn gated(reply: &'static str, gate: Arc<tokio::sync::Semaphore>) -> Self {
            Self {
                reply,
                fail: false,
                gate: Some(gate),
                seen: StdMutex::new(Vec::new()),
            }
        }
    }

    impl CompletionClient for ScriptedClient {
        async fn complete(
            &self,
            mode: PersonalityKey,
            history: &[Message],
        ) -> Result<Message, CompletionError> {
            self.seen.lock().unwrap().push((mode, history.to_vec()));
            if let Some(gate) = &self.gate {
                let permit = gate.acquire().await.expect("gate closed");
                permit.forget();
            }
            if self.fail {
                Err(CompletionError::Service { status: 500 })
            } else {
                Ok(Message::assistant(self.reply))
            }
        }
    }

    type TestService = SessionService<Arc<MemoryRepo>, Arc<ScriptedClient>>;

    impl ConversationRepository for Arc<MemoryRepo> {
        async fn create(&self, draft: &NewConversation) -> Result<Conversation, RepositoryError> {
            self.as_ref().create(draft).await
        }
        async fn update_messages(
            &self,
            id: &ConversationId,
            messages: &[Message],
        ) -> Result<(), RepositoryError> {
            self.as_ref().update_messages(id, messages).await
        }
        async fn list_by_owner(&self, owner: &str) -> Result<Vec<Conversation>, RepositoryError> {
            self.as_ref().list_by_owner(owner).await
        }
        async fn get(&self, id: &ConversationId) -> Result<Option<Conversation>, RepositoryError> {
            self.as_ref().get(id).await
        }
    }

    impl CompletionClient for Arc<ScriptedClient> {
        async fn complete(
            &self,
            mode: PersonalityKey,
            history: &[Message],
        ) -> Result<Message, CompletionError> {
            self.as_ref().complete(mode, history).await
        }
    }

    fn service(repo: Arc<MemoryRepo>, client: Arc<ScriptedClient>) -> TestService {
        SessionService::new(repo, client)
    }

    #[tokio::test]
    async fn test_open_with_no_conversations_yields_empty_roster() {
        let svc = service(
            Arc::new(MemoryRepo::default()),
            Arc::new(ScriptedClient::replying("hey!")),
        );
        let snapshot = svc.open("alice").await;
        assert_eq!(snapshot.phase, SessionPhase::Idle);
        assert!(snapshot.roster.is_empty());
    }

    #[tokio::test]
    async fn test_open_degrades_to_empty_roster_on_query_failure() {
        let repo = Arc::new(MemoryRepo::default());
        repo.fail_list.store(true, Ordering::SeqCst);
        let svc = service(repo, Arc::new(ScriptedClient::replying("hey!")));

        let snapshot = svc.open("alice").await;
        assert_eq!(snapshot.phase, SessionPhase::Idle);
        assert!(snapshot.roster.is_empty());
    }

    #[tokio::test]
    async fn test_start_conversation_persists_then_commits() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(repo.clone(), Arc::new(ScriptedClient::replying("hey!")));
        svc.open("alice").await;

        let snapshot = svc
            .start_conversation(PersonalityKey::Funny)
            .await
            .unwrap();
        assert_eq!(snapshot.phase, SessionPhase::PersonalityChosen);
        assert_eq!(snapshot.roster.len(), 1);
        assert_eq!(snapshot.active_index, Some(0));
        assert_eq!(snapshot.live_messages.len(), 1);
        assert_eq!(
            snapshot.live_messages[0].text(),
            PersonalityKey::Funny.greeting()
        );

        // The store row exists with the greeting
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.row(0).owner, "alice");
        assert_eq!(repo.row(0).messages.len(), 1);
    }

    #[tokio::test]
    async fn test_start_conversation_store_failure_stays_idle() {
        let repo = Arc::new(MemoryRepo::default());
        repo.fail_create.store(true, Ordering::SeqCst);
        let svc = service(repo.clone(), Arc::new(ScriptedClient::replying("hey!")));
        svc.open("alice").await;

        let err = svc
            .start_conversation(PersonalityKey::Funny)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Store(_)));

        let snapshot = svc.snapshot().await;
        assert_eq!(snapshot.phase, SessionPhase::Idle);
        assert!(snapshot.roster.is_empty());
        assert!(snapshot.live_messages.is_empty());
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn test_start_conversation_requires_identity() {
        let svc = service(
            Arc::new(MemoryRepo::default()),
            Arc::new(ScriptedClient::replying("hey!")),
        );
        let err = svc
            .start_conversation(PersonalityKey::Funny)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_send_cycle_appends_two_and_syncs_store() {
        let repo = Arc::new(MemoryRepo::default());
        let client = Arc::new(ScriptedClient::replying("hey!"));
        let svc = service(repo.clone(), client.clone());
        svc.open("alice").await;
        svc.start_conversation(PersonalityKey::Funny).await.unwrap();

        let snapshot = svc.send_message("hi").await.unwrap();

        assert_eq!(snapshot.live_messages.len(), 3);
        assert_eq!(snapshot.live_messages[1].text(), "hi");
        assert_eq!(snapshot.live_messages[2].text(), "hey!");
        assert!(!snapshot.send_in_flight);

        // The store document equals the live transcript
        assert_eq!(repo.row(0).messages, snapshot.live_messages);

        // The greeting never went over the wire
        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, PersonalityKey::Funny);
        assert_eq!(seen[0].1.len(), 1);
        assert_eq!(seen[0].1[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_failed_send_keeps_user_message() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(repo.clone(), Arc::new(ScriptedClient::failing()));
        svc.open("alice").await;
        svc.start_conversation(PersonalityKey::Funny).await.unwrap();

        let err = svc.send_message("hi").await.unwrap_err();
        assert!(matches!(err, SessionError::Completion(_)));

        let snapshot = svc.snapshot().await;
        assert_eq!(snapshot.live_messages.len(), 2);
        assert_eq!(snapshot.live_messages[1].role, MessageRole::User);
        assert!(!snapshot.send_in_flight);

        // The store still holds only the greeting
        assert_eq!(repo.row(0).messages.len(), 1);
    }

    #[tokio::test]
    async fn test_persist_failure_does_not_roll_back_transcript() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(repo.clone(), Arc::new(ScriptedClient::replying("hey!")));
        svc.open("alice").await;
        svc.start_conversation(PersonalityKey::Funny).await.unwrap();

        repo.fail_update.store(true, Ordering::SeqCst);
        let snapshot = svc.send_message("hi").await.unwrap();

        // The exchange stays visible even though the persist failed
        assert_eq!(snapshot.live_messages.len(), 3);
        assert_eq!(repo.row(0).messages.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_submit_is_rejected_until_resolution() {
        let repo = Arc::new(MemoryRepo::default());
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        let client = Arc::new(ScriptedClient::gated("hey!", gate.clone()));
        let svc = Arc::new(service(repo, client));
        svc.open("alice").await;
        svc.start_conversation(PersonalityKey::Funny).await.unwrap();

        let first = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.send_message("first").await })
        };
        // Let the first send reach the gate
        tokio::task::yield_now().await;
        while !svc.snapshot().await.send_in_flight {
            tokio::task::yield_now().await;
        }

        let err = svc.send_message("second").await.unwrap_err();
        assert!(matches!(err, SessionError::SendInFlight));
        assert_eq!(svc.snapshot().await.live_messages.len(), 2);

        gate.add_permits(1);
        let snapshot = first.await.unwrap().unwrap();
        assert_eq!(snapshot.live_messages.len(), 3);

        // Resolved: a new submit goes through
        gate.add_permits(1);
        let snapshot = svc.send_message("third").await.unwrap();
        assert_eq!(snapshot.live_messages.len(), 5);
    }

    #[tokio::test]
    async fn test_reply_arriving_after_reset_is_discarded() {
        let repo = Arc::new(MemoryRepo::default());
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        let client = Arc::new(ScriptedClient::gated("too late", gate.clone()));
        let svc = Arc::new(service(repo.clone(), client));
        svc.open("alice").await;
        svc.start_conversation(PersonalityKey::Funny).await.unwrap();

        let pending = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.send_message("hi").await })
        };
        while !svc.snapshot().await.send_in_flight {
            tokio::task::yield_now().await;
        }

        let snapshot = svc.new_conversation().await;
        assert_eq!(snapshot.phase, SessionPhase::Idle);

        gate.add_permits(1);
        pending.await.unwrap().unwrap();

        let snapshot = svc.snapshot().await;
        assert!(snapshot.live_messages.is_empty());
        assert_eq!(snapshot.active_index, None);
        // The stale exchange was never persisted
        assert_eq!(repo.row(0).messages.len(), 1);
    }

    #[tokio::test]
    async fn test_select_conversation_replaces_transcript() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(repo.clone(), Arc::new(ScriptedClient::replying("hey!")));
        svc.open("alice").await;
        svc.start_conversation(PersonalityKey::Intellectual)
            .await
            .unwrap();
        svc.send_message("tell me something").await.unwrap();
        svc.start_conversation(PersonalityKey::Funny).await.unwrap();

        let snapshot = svc.select_conversation(0).await.unwrap();
        assert_eq!(snapshot.active_index, Some(0));
        assert_eq!(snapshot.live_messages.len(), 3);
        assert_eq!(snapshot.pending_mode, Some(PersonalityKey::Intellectual));
    }

    #[tokio::test]
    async fn test_new_conversation_leaves_store_untouched() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(repo.clone(), Arc::new(ScriptedClient::replying("hey!")));
        svc.open("alice").await;
        svc.start_conversation(PersonalityKey::Funny).await.unwrap();
        svc.send_message("hi").await.unwrap();

        let snapshot = svc.new_conversation().await;
        assert_eq!(snapshot.active_index, None);
        assert!(snapshot.live_messages.is_empty());
        assert_eq!(snapshot.roster.len(), 1);

        assert_eq!(repo.len(), 1);
        assert_eq!(repo.row(0).messages.len(), 3);
    }

    #[tokio::test]
    async fn test_roster_survives_reopen() {
        let repo = Arc::new(MemoryRepo::default());
        let client = Arc::new(ScriptedClient::replying("hey!"));
        let svc = service(repo.clone(), client.clone());
        svc.open("alice").await;
        svc.start_conversation(PersonalityKey::Funny).await.unwrap();
        svc.send_message("hi").await.unwrap();

        // A fresh mount refetches the roster from the store
        let svc2 = service(repo, client);
        let snapshot = svc2.open("alice").await;
        assert_eq!(snapshot.roster.len(), 1);
        assert_eq!(snapshot.roster[0].message_count, 3);
        assert_eq!(snapshot.roster[0].mode, PersonalityKey::Funny);
    }
}
