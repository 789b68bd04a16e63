//! Dialogue Orchestrator — runs one assistant turn.
//!
//! Flow: build prompt → model client (bounded wait) → parse → next state.
//!
//! Upstream failures never escape `generate`: the caller gets the fallback reply,
//! the exchange is still recorded, and the failure is logged. There are no retries
//! here; the user re-sends if they want another attempt.
//!
//! Callers must not run two turns concurrently against the same state. Dropping
//! the returned future cancels the in-flight model call and yields no new state.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info};

use crate::assistant::conversation::ConversationState;
use crate::assistant::models::ParsedResponse;
use crate::assistant::parser::parse_response;
use crate::assistant::prompt_builder::PromptBuilder;
use crate::assistant::prompts::FALLBACK_REPLY;
use crate::errors::AppError;
use crate::llm_client::{FailureKind, GenerationParams, LlmError, ModelClient};

/// Result of one turn: what to show, and the state to carry into the next turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub response: ParsedResponse,
    pub state: ConversationState,
    /// Set when the reply is the fallback: the upstream call failed or its
    /// completion had nothing to show once parsed.
    pub failure: Option<FailureKind>,
}

pub struct Orchestrator {
    prompt_builder: PromptBuilder,
    client: Arc<dyn ModelClient>,
    params: GenerationParams,
    turn_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        prompt_builder: PromptBuilder,
        client: Arc<dyn ModelClient>,
        params: GenerationParams,
        turn_timeout: Duration,
    ) -> Self {
        Self {
            prompt_builder,
            client,
            params,
            turn_timeout,
        }
    }

    /// Runs one turn. Only fails on an empty utterance.
    pub async fn generate(
        &self,
        utterance: &str,
        state: &ConversationState,
    ) -> Result<TurnOutcome, AppError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(AppError::Validation("utterance cannot be empty".to_string()));
        }

        let turn = state.exchange_count() + 1;
        let messages = self.prompt_builder.build(state.turns(), utterance);

        let completion = tokio::time::timeout(
            self.turn_timeout,
            self.client.complete(&messages, &self.params),
        )
        .await
        .unwrap_or(Err(LlmError::Timeout(self.turn_timeout)))
        .map(|raw| parse_response(&raw))
        .and_then(|response| {
            // A reply made only of dropped blocks would show the user nothing.
            if response.is_blank() {
                Err(LlmError::EmptyContent)
            } else {
                Ok(response)
            }
        });

        match completion {
            Ok(response) => {
                info!(
                    turn,
                    artists = response.artists.len(),
                    bolos = response.bolos.len(),
                    handoff = response.is_handoff(),
                    "Rodrigo turn completed"
                );
                let state = state.record_exchange(utterance, &response.text);
                Ok(TurnOutcome {
                    response,
                    state,
                    failure: None,
                })
            }
            Err(e) => {
                let kind = e.failure_kind();
                error!(turn, failure = ?kind, "Rodrigo turn failed upstream: {e}");
                Ok(TurnOutcome {
                    response: ParsedResponse::text_only(FALLBACK_REPLY),
                    state: state.record_exchange(utterance, FALLBACK_REPLY),
                    failure: Some(kind),
                })
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::{ChatMessage, Role};

    /// Returns the same completion every time and remembers what it was sent.
    pub(crate) struct FixedClient {
        reply: String,
        pub(crate) seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl FixedClient {
        pub(crate) fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelClient for FixedClient {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _params: &GenerationParams,
        ) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            Ok(self.reply.clone())
        }
    }

    pub(crate) struct FailingClient {
        timeout: bool,
    }

    impl FailingClient {
        pub(crate) fn timeout() -> Self {
            Self { timeout: true }
        }

        pub(crate) fn bad_gateway() -> Self {
            Self { timeout: false }
        }
    }

    #[async_trait]
    impl ModelClient for FailingClient {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _params: &GenerationParams,
        ) -> Result<String, LlmError> {
            if self.timeout {
                Err(LlmError::Timeout(Duration::from_secs(30)))
            } else {
                Err(LlmError::Api {
                    status: 502,
                    message: "bad gateway".to_string(),
                })
            }
        }
    }

    struct HangingClient;

    #[async_trait]
    impl ModelClient for HangingClient {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _params: &GenerationParams,
        ) -> Result<String, LlmError> {
            std::future::pending().await
        }
    }

    pub(crate) fn test_params() -> GenerationParams {
        GenerationParams {
            model: "test-model".to_string(),
            temperature: 0.0,
            max_tokens: 256,
        }
    }

    pub(crate) fn orchestrator_with(client: Arc<dyn ModelClient>) -> Orchestrator {
        Orchestrator::new(
            PromptBuilder::new("persona de prueba"),
            client,
            test_params(),
            Duration::from_secs(30),
        )
    }

    const GREETING: &str = "¡Hola! Soy Rodrigo. ¿Quieres crear un evento o buscas artistas o bolos?";

    #[tokio::test]
    async fn test_greeting_turn_has_text_and_no_records() {
        let orchestrator = orchestrator_with(Arc::new(FixedClient::new(GREETING)));
        let outcome = orchestrator
            .generate("Hola", &ConversationState::default())
            .await
            .unwrap();

        assert_eq!(outcome.response.text, GREETING);
        assert!(outcome.response.artists.is_empty());
        assert!(outcome.response.bolos.is_empty());
        assert!(outcome.response.publish_event.is_none());
        assert!(outcome.failure.is_none());
        assert_eq!(outcome.state.turn_count(), 2);
    }

    #[tokio::test]
    async fn test_upstream_timeout_returns_fallback_and_advances_state() {
        let orchestrator = orchestrator_with(Arc::new(FailingClient::timeout()));
        let initial = ConversationState::default().record_exchange("Hola", GREETING);

        let outcome = orchestrator.generate("Busco un DJ", &initial).await.unwrap();

        assert_eq!(outcome.response.text, FALLBACK_REPLY);
        assert!(outcome.response.artists.is_empty());
        assert!(outcome.response.bolos.is_empty());
        assert!(outcome.response.publish_event.is_none());
        assert_eq!(outcome.failure, Some(FailureKind::UpstreamTimeout));
        assert_eq!(outcome.state.turn_count(), initial.turn_count() + 2);
        assert_eq!(outcome.state.turns()[3].text, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_upstream_error_returns_fallback() {
        let orchestrator = orchestrator_with(Arc::new(FailingClient::bad_gateway()));
        let outcome = orchestrator
            .generate("Hola", &ConversationState::default())
            .await
            .unwrap();
        assert_eq!(outcome.response, ParsedResponse::text_only(FALLBACK_REPLY));
        assert_eq!(outcome.failure, Some(FailureKind::UpstreamError));
    }

    #[tokio::test]
    async fn test_reply_with_only_dropped_block_falls_back() {
        let reply = "[ARTISTA]\nEstilo: Jazz\n[/ARTISTA]";
        let orchestrator = orchestrator_with(Arc::new(FixedClient::new(reply)));
        let outcome = orchestrator
            .generate("Busco jazz", &ConversationState::default())
            .await
            .unwrap();

        assert_eq!(outcome.response, ParsedResponse::text_only(FALLBACK_REPLY));
        assert_eq!(outcome.failure, Some(FailureKind::UpstreamError));
        assert_eq!(outcome.state.turn_count(), 2);
        assert_eq!(outcome.state.turns()[1].text, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_records_without_text_are_not_a_fallback() {
        let reply = "[BOLO]\nTítulo: Fiesta mayor\n[/BOLO]";
        let orchestrator = orchestrator_with(Arc::new(FixedClient::new(reply)));
        let outcome = orchestrator
            .generate("Busco bolos", &ConversationState::default())
            .await
            .unwrap();

        assert!(outcome.failure.is_none());
        assert_eq!(outcome.response.text, "");
        assert_eq!(outcome.response.bolos[0].title, "Fiesta mayor");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_client_is_bounded_by_turn_timeout() {
        let orchestrator = orchestrator_with(Arc::new(HangingClient));
        let outcome = orchestrator
            .generate("Hola", &ConversationState::default())
            .await
            .unwrap();
        assert_eq!(outcome.failure, Some(FailureKind::UpstreamTimeout));
        assert_eq!(outcome.state.turn_count(), 2);
    }

    #[tokio::test]
    async fn test_same_input_gives_same_output() {
        let reply = "Te recomiendo: [ARTISTA]Nombre: Luna Beat\nFormato: DJ[/ARTISTA]";
        let orchestrator = orchestrator_with(Arc::new(FixedClient::new(reply)));
        let initial = ConversationState::default().record_exchange("Hola", GREETING);

        let first = orchestrator.generate("Busco DJ", &initial).await.unwrap();
        let second = orchestrator.generate("Busco DJ", &initial).await.unwrap();

        assert_eq!(first.state.turn_count(), initial.turn_count() + 2);
        assert_eq!(second.state.turn_count(), initial.turn_count() + 2);
        assert_eq!(first.state.turns(), second.state.turns());
        assert_eq!(first.response, second.response);
        assert_eq!(first.response.artists[0].name, "Luna Beat");
    }

    #[tokio::test]
    async fn test_assistant_history_stores_text_without_blocks() {
        let reply = "Mira este: [BOLO]Título: Boda en Cádiz[/BOLO] ¿Te cuadra?";
        let orchestrator = orchestrator_with(Arc::new(FixedClient::new(reply)));
        let outcome = orchestrator
            .generate("  Busco bolos  ", &ConversationState::default())
            .await
            .unwrap();

        assert_eq!(outcome.state.turns()[0].text, "Busco bolos");
        assert_eq!(outcome.state.turns()[1].text, "Mira este:  ¿Te cuadra?");
        assert_eq!(outcome.response.bolos.len(), 1);
    }

    #[tokio::test]
    async fn test_prompt_carries_history_and_new_utterance() {
        let client = Arc::new(FixedClient::new("¿Para qué fecha?"));
        let orchestrator = orchestrator_with(client.clone());
        let initial = ConversationState::default().record_exchange("Quiero crear un evento", "¿Dónde?");

        orchestrator.generate("En Valencia", &initial).await.unwrap();

        let seen = client.seen.lock().unwrap();
        let messages = &seen[0];
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], ChatMessage::new(Role::System, "persona de prueba"));
        assert_eq!(messages[1].content, "Quiero crear un evento");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[3], ChatMessage::new(Role::User, "En Valencia"));
    }

    #[tokio::test]
    async fn test_handoff_turn_exposes_event_draft_only() {
        let reply = "¡Perfecto! [ARTISTA]Nombre: X[/ARTISTA]\
                     [PUBLICAR_EVENTO]\nTítulo: Noche de jazz\nTipo: gig\n[/PUBLICAR_EVENTO]";
        let orchestrator = orchestrator_with(Arc::new(FixedClient::new(reply)));
        let outcome = orchestrator
            .generate("Sí, publícalo", &ConversationState::default())
            .await
            .unwrap();

        let draft = outcome.response.publish_event.as_ref().unwrap();
        assert_eq!(draft.title, "Noche de jazz");
        assert!(outcome.response.artists.is_empty());
        assert_eq!(outcome.response.text, "¡Perfecto!");
    }

    #[tokio::test]
    async fn test_empty_utterance_is_rejected_without_calling_model() {
        let client = Arc::new(FixedClient::new("no debería llamarse"));
        let orchestrator = orchestrator_with(client.clone());
        let result = orchestrator.generate("   ", &ConversationState::default()).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(client.seen.lock().unwrap().is_empty());
    }
}
