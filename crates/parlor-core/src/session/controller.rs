//! Session controller: the sole owner and mutator of conversation state.
//!
//! All observable state transitions are synchronous and happen either in a
//! user-action method or in `apply`, driven by updates from the turn task.
//! Every send is tagged with a generation; updates whose generation no longer
//! matches the in-flight turn are discarded, so late events from an abandoned
//! stream can never touch current state.

use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::api::{ApiClient, ApiResult, ChatRequest, ConversationSummary, HistoryTurn, ModelInfo};
use crate::session::list::{DEFAULT_TITLE, promote, title_candidate};
use crate::session::message::Message;
use crate::session::router::{History, Route};
use crate::session::turn::{self, TurnUpdate};

/// Per-send state machine.
#[derive(Debug, Clone)]
enum SendState {
    Idle,
    /// Request issued, no fragment seen yet.
    Sending(TurnContext),
    /// At least one fragment applied.
    Streaming(TurnContext),
}

/// Everything `apply` needs to reconcile a turn against local state.
#[derive(Debug, Clone)]
struct TurnContext {
    generation: u64,
    assistant_id: String,
    conversation_id: String,
    prompt: String,
}

/// What an applied update did, so the driver knows when to follow up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Stale generation or no turn in flight; state untouched.
    Ignored,
    Fragment,
    /// Turn finished; the caller should run the best-effort list refresh.
    Completed,
    Failed,
}

/// How a route change lands in the navigation history.
#[derive(Debug, Clone, Copy)]
enum Nav {
    Push,
    Replace,
}

pub struct SessionController {
    client: ApiClient,
    updates_tx: mpsc::UnboundedSender<TurnUpdate>,
    updates_rx: mpsc::UnboundedReceiver<TurnUpdate>,
    generation: u64,
    send: SendState,
    /// Conversation id of the single in-flight delete, if any.
    deleting: Option<String>,
    /// Preferred model id from config; validated against the catalog.
    preferred_model: Option<String>,
    pub models: Vec<ModelInfo>,
    pub selected_model: String,
    pub conversations: Vec<ConversationSummary>,
    pub active_conversation: Option<String>,
    /// Messages of the active conversation only; replaced wholesale on switch.
    pub messages: Vec<Message>,
    /// Dismissible error banner text.
    pub error: Option<String>,
    pub history: History,
}

impl SessionController {
    pub fn new(client: ApiClient, preferred_model: Option<String>) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            client,
            updates_tx,
            updates_rx,
            generation: 0,
            send: SendState::Idle,
            deleting: None,
            preferred_model,
            models: Vec::new(),
            selected_model: String::new(),
            conversations: Vec::new(),
            active_conversation: None,
            messages: Vec::new(),
            error: None,
            history: History::new(),
        }
    }

    /// Returns true while a send is in flight; further submits are no-ops.
    pub fn is_busy(&self) -> bool {
        !matches!(self.send, SendState::Idle)
    }

    /// Loads the model catalog and conversation list, then resolves the
    /// starting conversation: the one the current route encodes, else the
    /// most recently updated, else a synthesized local fallback.
    pub async fn startup(&mut self) {
        match self.client.models().await {
            Ok(models) => {
                self.selected_model = self
                    .preferred_model
                    .take()
                    .filter(|preferred| models.iter().any(|model| &model.id == preferred))
                    .or_else(|| models.first().map(|model| model.id.clone()))
                    .unwrap_or_default();
                self.models = models;
            }
            Err(e) => self.error = Some(e.to_string()),
        }

        match self.client.conversations().await {
            Ok(summaries) => {
                self.conversations = summaries;

                let from_route = self
                    .history
                    .current()
                    .conversation_id()
                    .map(ToString::to_string);
                if let Some(id) = from_route {
                    self.load_conversation(&id, Nav::Replace).await;
                    return;
                }

                if let Some(id) = self.most_recently_updated() {
                    self.load_conversation(&id, Nav::Replace).await;
                    return;
                }
            }
            Err(err) => {
                tracing::debug!(%err, "conversation list load failed at startup");
            }
        }

        let id = local_conversation_id();
        self.active_conversation = Some(id.clone());
        self.history.replace(Route::Chat(id));
        self.messages.clear();
    }

    /// User-initiated conversation switch; pushes a history entry.
    pub async fn select_conversation(&mut self, id: &str) {
        self.error = None;
        self.load_conversation(id, Nav::Push).await;
    }

    /// Requests a new backend conversation and makes it active.
    /// Failure is surfaced in the error banner.
    pub async fn create_conversation(&mut self) {
        self.error = None;
        if let Err(e) = self.create_conversation_inner().await {
            self.error = Some(e.to_string());
        }
    }

    /// Deletes a conversation. Only one delete may be in flight; requests
    /// made while one is pending are ignored. Deleting the active
    /// conversation immediately creates exactly one replacement.
    pub async fn delete_conversation(&mut self, id: &str) {
        if self.deleting.is_some() {
            return;
        }
        self.error = None;
        self.deleting = Some(id.to_string());

        match self.client.delete_conversation(id).await {
            Ok(()) => {
                self.conversations.retain(|entry| entry.id != id);
                if self.active_conversation.as_deref() == Some(id)
                    && let Err(e) = self.create_conversation_inner().await
                {
                    self.error = Some(e.to_string());
                }
            }
            Err(e) => self.error = Some(e.to_string()),
        }

        self.deleting = None;
    }

    /// Submits a message for the active conversation.
    ///
    /// Returns false (a no-op) for blank input or while a send is in flight;
    /// returning true means the turn started and the caller may clear its
    /// input buffer.
    pub fn submit(&mut self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() || self.is_busy() {
            return false;
        }

        let conversation_id = match &self.active_conversation {
            Some(id) => id.clone(),
            None => {
                let id = local_conversation_id();
                self.active_conversation = Some(id.clone());
                self.history.push(Route::Chat(id.clone()));
                id
            }
        };

        // History covers the turns before this one, oldest first.
        let history: Vec<HistoryTurn> = self
            .messages
            .iter()
            .map(|msg| HistoryTurn {
                role: msg.role,
                content: msg.content.clone(),
            })
            .collect();

        let user = Message::user(trimmed, &self.selected_model, &conversation_id);
        let assistant = Message::assistant_placeholder(&self.selected_model, &conversation_id);
        let assistant_id = assistant.id.clone();
        self.messages.push(user);
        self.messages.push(assistant);

        let list = std::mem::take(&mut self.conversations);
        self.conversations = promote(
            list,
            &conversation_id,
            &title_candidate(trimmed),
            trimmed,
            1,
            Utc::now(),
        );
        self.error = None;

        self.generation += 1;
        let generation = self.generation;
        let request = ChatRequest {
            conversation_id: conversation_id.clone(),
            message: trimmed.to_string(),
            model: self.selected_model.clone(),
            history,
        };
        self.send = SendState::Sending(TurnContext {
            generation,
            assistant_id,
            conversation_id,
            prompt: trimmed.to_string(),
        });

        tokio::spawn(turn::drive_turn(
            self.client.clone(),
            request,
            generation,
            self.updates_tx.clone(),
        ));
        true
    }

    /// Applies one turn update as a synchronous state transition.
    pub fn apply(&mut self, update: TurnUpdate) -> Applied {
        let ctx = match &self.send {
            SendState::Idle => None,
            SendState::Sending(ctx) | SendState::Streaming(ctx) => Some(ctx.clone()),
        };
        let Some(ctx) = ctx.filter(|ctx| ctx.generation == update.generation()) else {
            tracing::debug!(
                generation = update.generation(),
                "discarding update from a stale turn"
            );
            return Applied::Ignored;
        };

        match update {
            TurnUpdate::Fragment { text, .. } => {
                if let Some(msg) = self
                    .messages
                    .iter_mut()
                    .find(|msg| msg.id == ctx.assistant_id)
                {
                    msg.content.push_str(&text);
                }
                self.send = SendState::Streaming(ctx);
                Applied::Fragment
            }
            TurnUpdate::Completed { .. } => {
                // Re-promote so the final preview/timestamp reflects the
                // completed turn; the count was already bumped at send time.
                let list = std::mem::take(&mut self.conversations);
                self.conversations = promote(
                    list,
                    &ctx.conversation_id,
                    &title_candidate(&ctx.prompt),
                    &ctx.prompt,
                    0,
                    Utc::now(),
                );
                self.send = SendState::Idle;
                Applied::Completed
            }
            TurnUpdate::Failed { message, .. } => {
                self.messages.retain(|msg| msg.id != ctx.assistant_id);
                self.error = Some(message);
                self.send = SendState::Idle;
                Applied::Failed
            }
        }
    }

    /// Drains one pending turn update without waiting.
    pub fn try_recv_update(&mut self) -> Option<TurnUpdate> {
        self.updates_rx.try_recv().ok()
    }

    /// Waits for the next turn update. Only resolves while a turn is in
    /// flight or has undrained updates.
    pub async fn recv_update(&mut self) -> Option<TurnUpdate> {
        self.updates_rx.recv().await
    }

    /// Best-effort conversation list refresh; failure is swallowed.
    pub async fn refresh_conversations(&mut self) {
        match self.client.conversations().await {
            Ok(summaries) => self.conversations = summaries,
            Err(err) => {
                tracing::debug!(%err, "conversation list refresh failed");
            }
        }
    }

    /// Moves back in the navigation history and reloads that conversation.
    pub async fn navigate_back(&mut self) {
        if self.history.back() {
            self.resolve_current_route().await;
        }
    }

    /// Moves forward in the navigation history and reloads that conversation.
    pub async fn navigate_forward(&mut self) {
        if self.history.forward() {
            self.resolve_current_route().await;
        }
    }

    /// Selects the next model in the catalog.
    pub fn cycle_model(&mut self) {
        if self.models.is_empty() {
            return;
        }
        let next = self
            .models
            .iter()
            .position(|model| model.id == self.selected_model)
            .map_or(0, |idx| (idx + 1) % self.models.len());
        self.selected_model = self.models[next].id.clone();
    }

    /// Clears the error banner.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    async fn resolve_current_route(&mut self) {
        let id = self
            .history
            .current()
            .conversation_id()
            .map(ToString::to_string);
        if let Some(id) = id {
            self.load_conversation(&id, Nav::Replace).await;
        }
    }

    /// Makes a conversation active and loads its history. A failed load
    /// results in an empty message list rather than blocking navigation.
    async fn load_conversation(&mut self, id: &str, nav: Nav) {
        self.active_conversation = Some(id.to_string());
        let route = Route::Chat(id.to_string());
        if self.history.current() != &route {
            match nav {
                Nav::Push => self.history.push(route),
                Nav::Replace => self.history.replace(route),
            }
        }

        match self.client.conversation_messages(id).await {
            Ok(stored) => {
                self.messages = stored.into_iter().map(Message::from).collect();
            }
            Err(err) => {
                tracing::debug!(%err, conversation = id, "history load failed; starting empty");
                self.messages.clear();
            }
        }
    }

    async fn create_conversation_inner(&mut self) -> ApiResult<String> {
        let created = self.client.create_conversation(DEFAULT_TITLE).await?;
        let id = created.id.clone();
        let summary: ConversationSummary = created.into();

        self.conversations.retain(|entry| entry.id != id);
        self.conversations.insert(0, summary);
        self.messages.clear();
        self.active_conversation = Some(id.clone());
        self.history.push(Route::Chat(id.clone()));
        Ok(id)
    }

    fn most_recently_updated(&self) -> Option<String> {
        self.conversations
            .iter()
            .max_by(|a, b| a.updated_at.cmp(&b.updated_at))
            .map(|entry| entry.id.clone())
    }
}

/// Synthesized conversation id used when no backend conversation exists.
fn local_conversation_id() -> String {
    format!("local-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Role;

    /// Controller whose client points at a dead endpoint; fine for tests
    /// that never apply updates from the real turn task.
    fn controller() -> SessionController {
        SessionController::new(ApiClient::new("http://127.0.0.1:9"), None)
    }

    fn in_flight_context(controller: &SessionController) -> TurnContext {
        match &controller.send {
            SendState::Sending(ctx) | SendState::Streaming(ctx) => ctx.clone(),
            SendState::Idle => panic!("no turn in flight"),
        }
    }

    #[tokio::test]
    async fn test_blank_submit_is_noop() {
        let mut controller = controller();
        assert!(!controller.submit(""));
        assert!(!controller.submit("   \t  "));
        assert!(controller.messages.is_empty());
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_submit_inserts_user_and_placeholder() {
        let mut controller = controller();
        controller.selected_model = "m1".to_string();

        assert!(controller.submit("hello world"));
        assert!(controller.is_busy());
        assert_eq!(controller.messages.len(), 2);
        assert_eq!(controller.messages[0].role, Role::User);
        assert_eq!(controller.messages[0].content, "hello world");
        assert_eq!(controller.messages[1].role, Role::Assistant);
        assert!(controller.messages[1].content.is_empty());

        // Optimistic promotion created a list entry with the title candidate.
        assert_eq!(controller.conversations.len(), 1);
        assert_eq!(controller.conversations[0].title, "hello world");
        assert_eq!(controller.conversations[0].message_count, 1);
    }

    #[tokio::test]
    async fn test_second_submit_while_busy_is_noop() {
        let mut controller = controller();
        assert!(controller.submit("first"));
        assert!(!controller.submit("second"));
        assert_eq!(controller.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_submit_without_conversation_synthesizes_local_fallback() {
        let mut controller = controller();
        assert!(controller.submit("hi"));

        let active = controller.active_conversation.clone().unwrap();
        assert!(active.starts_with("local-"));
        assert_eq!(
            controller.history.current(),
            &Route::Chat(active.clone())
        );
    }

    #[tokio::test]
    async fn test_fragments_concatenate_in_order() {
        let mut controller = controller();
        assert!(controller.submit("question"));
        let ctx = in_flight_context(&controller);

        for text in ["A", "B", "C"] {
            let applied = controller.apply(TurnUpdate::Fragment {
                generation: ctx.generation,
                text: text.to_string(),
            });
            assert_eq!(applied, Applied::Fragment);
        }

        assert_eq!(controller.messages[1].content, "ABC");
        assert!(controller.is_busy());
    }

    #[tokio::test]
    async fn test_completion_clears_busy_and_keeps_content() {
        let mut controller = controller();
        assert!(controller.submit("question"));
        let ctx = in_flight_context(&controller);

        controller.apply(TurnUpdate::Fragment {
            generation: ctx.generation,
            text: "answer".to_string(),
        });
        let applied = controller.apply(TurnUpdate::Completed {
            generation: ctx.generation,
        });

        assert_eq!(applied, Applied::Completed);
        assert!(!controller.is_busy());
        assert_eq!(controller.messages[1].content, "answer");
        // The second promotion leaves the optimistic count alone.
        assert_eq!(controller.conversations[0].message_count, 1);
    }

    #[tokio::test]
    async fn test_failure_rolls_back_placeholder_and_sets_banner() {
        let mut controller = controller();
        assert!(controller.submit("question"));
        let ctx = in_flight_context(&controller);

        controller.apply(TurnUpdate::Fragment {
            generation: ctx.generation,
            text: "partial".to_string(),
        });
        let applied = controller.apply(TurnUpdate::Failed {
            generation: ctx.generation,
            message: "model overloaded".to_string(),
        });

        assert_eq!(applied, Applied::Failed);
        assert!(!controller.is_busy());
        // Placeholder gone, user message stays.
        assert_eq!(controller.messages.len(), 1);
        assert_eq!(controller.messages[0].role, Role::User);
        assert_eq!(controller.error.as_deref(), Some("model overloaded"));
    }

    #[tokio::test]
    async fn test_stale_generation_updates_are_discarded() {
        let mut controller = controller();
        assert!(controller.submit("question"));
        let ctx = in_flight_context(&controller);

        let applied = controller.apply(TurnUpdate::Fragment {
            generation: ctx.generation + 1,
            text: "ghost".to_string(),
        });
        assert_eq!(applied, Applied::Ignored);
        assert!(controller.messages[1].content.is_empty());

        controller.apply(TurnUpdate::Completed {
            generation: ctx.generation,
        });

        // Terminal events from the finished turn are also stale now.
        let applied = controller.apply(TurnUpdate::Failed {
            generation: ctx.generation,
            message: "late".to_string(),
        });
        assert_eq!(applied, Applied::Ignored);
        assert!(controller.error.is_none());
    }

    #[tokio::test]
    async fn test_dismiss_error_clears_banner() {
        let mut controller = controller();
        controller.error = Some("boom".to_string());
        controller.dismiss_error();
        assert!(controller.error.is_none());
    }

    #[tokio::test]
    async fn test_cycle_model_wraps_around() {
        let mut controller = controller();
        controller.models = vec![
            ModelInfo {
                id: "m1".to_string(),
                name: "One".to_string(),
                provider: "openai".to_string(),
                description: String::new(),
            },
            ModelInfo {
                id: "m2".to_string(),
                name: "Two".to_string(),
                provider: "claude".to_string(),
                description: String::new(),
            },
        ];
        controller.selected_model = "m1".to_string();

        controller.cycle_model();
        assert_eq!(controller.selected_model, "m2");
        controller.cycle_model();
        assert_eq!(controller.selected_model, "m1");
    }
}
