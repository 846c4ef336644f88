//! Per-event mediation: filter, route, request a reply and post it.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info, warn};

use crate::chatwoot::PostingSink;
use crate::config::StreamLimits;
use crate::error::Result;
use crate::reply::{ReplyProviders, ReplySource, sanitize};
use crate::types::{ReplyDestination, RoutingMode, Visibility};
use crate::webhook::{EventFilter, InboundEvent, ModeClassifier};

use super::executor::TaskExecutor;
use super::outcome::{MediationOutcome, ReplyOutcome};

/// Prefix of private suggestions left for the operator.
pub const COPILOT_PREFIX: &str = "[RAG suggestion – use or edit]\n\n";

/// Posted publicly in bot mode while a single-shot reply is being produced.
pub const AUTO_REPLY_PLACEHOLDER: &str = "Спасибо за обращение. Наш AI ассистент уже работает над ответом, подождите пожалуйста несколько секунд.";

const PREVIEW_CHARS: usize = 80;

fn preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_CHARS {
        let mut short: String = content.chars().take(PREVIEW_CHARS).collect();
        short.push('…');
        short
    } else {
        content.to_string()
    }
}

/// Delivery settings that do not change per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliverySettings {
    pub stream_reply: bool,
    pub stream_limits: StreamLimits,
}

pub struct Mediator {
    filter: EventFilter,
    classifier: ModeClassifier,
    pub(super) sink: Arc<dyn PostingSink>,
    providers: Arc<ReplyProviders>,
    pub(super) settings: DeliverySettings,
}

impl Mediator {
    pub fn new(
        sink: Arc<dyn PostingSink>,
        providers: Arc<ReplyProviders>,
        classifier: ModeClassifier,
        settings: DeliverySettings,
    ) -> Self {
        Self {
            filter: EventFilter::default(),
            classifier,
            sink,
            providers,
            settings,
        }
    }

    /// Posting sink configured and a single-shot reply source registered.
    fn readiness(&self) -> std::result::Result<&Arc<dyn ReplySource>, &'static str> {
        if !self.sink.is_configured() {
            return Err("posting sink not configured");
        }
        self.providers
            .reply_source()
            .ok_or("reply provider not registered")
    }

    /// Whether `event` would reach the reply source.
    pub fn eligible(&self, event: &InboundEvent) -> bool {
        self.filter.check(event).is_ok() && self.readiness().is_ok()
    }

    /// Queues the mediation of `event` on `executor`.
    pub fn dispatch(self: &Arc<Self>, executor: &dyn TaskExecutor, event: InboundEvent) {
        let mediator = Arc::clone(self);
        executor.submit(Box::pin(async move {
            mediator.mediate(event).await;
        }));
    }

    /// Runs one event to completion. Never fails; the outcome says what happened.
    pub async fn mediate(&self, event: InboundEvent) -> MediationOutcome {
        let started = Instant::now();

        let eligible = match self.filter.check(&event) {
            Ok(eligible) => eligible,
            Err(reason) => {
                info!("Skipping webhook event: {reason}");
                return MediationOutcome::Dropped(reason);
            }
        };
        let source = match self.readiness() {
            Ok(source) => Arc::clone(source),
            Err(what) => {
                warn!(
                    "Not answering conversation {}: {what}",
                    eligible.conversation_id
                );
                return MediationOutcome::Misconfigured(what);
            }
        };

        let mode = self
            .classifier
            .classify(event.conversation.as_ref(), event.contact.as_ref());
        info!(
            "Mediating conversation_id={} support_mode={} content_type={} content_preview={:?}",
            eligible.conversation_id,
            mode,
            event.content_kind(),
            preview(&eligible.content)
        );

        let stream_source = match mode {
            RoutingMode::Bot if self.settings.stream_reply => {
                self.providers.stream_source().map(Arc::clone)
            }
            _ => None,
        };

        let outcome = match stream_source {
            Some(stream_source) => {
                self.stream(eligible.conversation_id, stream_source.as_ref(), &eligible.content)
                    .await
            }
            None => {
                self.single_shot(eligible.conversation_id, mode, source.as_ref(), &eligible.content)
                    .await
            }
        };

        info!(
            "Conversation {} finished: {outcome}, posted={} mode={mode} total_sec={:.2}",
            eligible.conversation_id,
            outcome.posted(),
            started.elapsed().as_secs_f64()
        );
        outcome
    }

    async fn single_shot(
        &self,
        conversation_id: i64,
        mode: RoutingMode,
        source: &dyn ReplySource,
        content: &str,
    ) -> MediationOutcome {
        let mut posted = 0;
        if mode == RoutingMode::Bot {
            if self
                .post(conversation_id, AUTO_REPLY_PLACEHOLDER, Visibility::Public)
                .await
            {
                posted += 1;
            } else {
                warn!("Failed to post placeholder to conversation {conversation_id}");
            }
        }

        let reply = match ReplyOutcome::from_result(source.reply(content).await) {
            ReplyOutcome::Reply(reply) => sanitize(&reply),
            ReplyOutcome::Empty => {
                warn!(
                    "Reply provider returned empty for conversation {conversation_id} content_len={}",
                    content.len()
                );
                return MediationOutcome::NoReply { posted };
            }
            ReplyOutcome::Failed(e) => {
                error!("Reply provider failed for conversation {conversation_id}: {e}");
                return MediationOutcome::SourceFailed { posted };
            }
        };
        debug!("Reply for conversation {conversation_id}: {} characters", reply.len());

        let content = match mode {
            RoutingMode::Bot => reply,
            RoutingMode::Human => format!("{COPILOT_PREFIX}{reply}"),
        };
        if self
            .post(conversation_id, &content, Visibility::from(mode))
            .await
        {
            MediationOutcome::Delivered { posted: posted + 1 }
        } else {
            error!("Failed to post {mode} reply to conversation {conversation_id}");
            MediationOutcome::PostFailed { posted }
        }
    }

    pub(super) async fn post(
        &self,
        conversation_id: i64,
        content: &str,
        visibility: Visibility,
    ) -> bool {
        let destination = ReplyDestination::new(conversation_id, content, visibility);
        self.sink.post_message(&destination).await
    }

    /// Sanitized single-shot reply for an operator, without posting anything.
    ///
    /// An unregistered provider yields an empty suggestion.
    pub async fn suggest(&self, message: &str) -> Result<String> {
        let Some(source) = self.providers.reply_source() else {
            warn!("Reply provider not registered; returning empty suggestion");
            return Ok(String::new());
        };
        let reply = source.reply(message.trim()).await?;
        Ok(sanitize(&reply))
    }
}
