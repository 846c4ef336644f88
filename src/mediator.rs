//! Reply mediation between Chatwoot events and the reply source.

mod executor;
mod flow;
mod outcome;
mod streaming;
#[cfg(test)]
pub(crate) mod testing;

pub use executor::{QueuedExecutor, Task, TaskExecutor, TokioExecutor};
pub use flow::{AUTO_REPLY_PLACEHOLDER, COPILOT_PREFIX, DeliverySettings, Mediator};
pub use outcome::{MediationOutcome, ReplyOutcome};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::testing::{ChunkedReply, FixedReply, RecordingSink};
    use super::*;
    use crate::config::StreamLimits;
    use crate::reply::ReplyProviders;
    use crate::types::{ReplyDestination, Visibility};
    use crate::webhook::{InboundEvent, ModeClassifier, SkipReason};

    fn event(content: &str, mode: &str) -> InboundEvent {
        InboundEvent::from_value(json!({
            "event": "message_created",
            "message_type": "incoming",
            "content": content,
            "conversation": { "id": 99, "custom_attributes": { "support_mode": mode } },
        }))
        .unwrap_or_default()
    }

    struct Harness {
        sink: Arc<RecordingSink>,
        reply: Arc<FixedReply>,
        mediator: Arc<Mediator>,
    }

    fn harness(
        sink: RecordingSink,
        reply: FixedReply,
        stream: Option<ChunkedReply>,
        stream_reply: bool,
    ) -> Harness {
        let sink = Arc::new(sink);
        let reply = Arc::new(reply);
        let providers = Arc::new(ReplyProviders::new());
        let _ = providers.register_reply(reply.clone());
        if let Some(stream) = stream {
            let _ = providers.register_stream(Arc::new(stream));
        }
        let settings = DeliverySettings {
            stream_reply,
            stream_limits: StreamLimits {
                min_chars: 20,
                max_chars: 60,
            },
        };
        let mediator = Arc::new(Mediator::new(
            sink.clone(),
            providers,
            ModeClassifier::new("support_mode"),
            settings,
        ));
        Harness {
            sink,
            reply,
            mediator,
        }
    }

    #[tokio::test]
    async fn bot_single_shot_posts_placeholder_then_reply() {
        let h = harness(RecordingSink::new(), FixedReply::new("Echo: Test question"), None, false);
        let outcome = h.mediator.mediate(event("Test question", "bot")).await;

        assert_eq!(outcome, MediationOutcome::Delivered { posted: 2 });
        assert_eq!(
            h.sink.posts(),
            vec![
                ReplyDestination::new(99, AUTO_REPLY_PLACEHOLDER, Visibility::Public),
                ReplyDestination::new(99, "Echo: Test question", Visibility::Public),
            ]
        );
    }

    #[tokio::test]
    async fn human_mode_posts_private_suggestion() {
        let h = harness(RecordingSink::new(), FixedReply::new("Try re-uploading."), None, true);
        let outcome = h.mediator.mediate(event("Upload fails", "human")).await;

        assert_eq!(outcome, MediationOutcome::Delivered { posted: 1 });
        assert_eq!(
            h.sink.posts(),
            vec![ReplyDestination::new(
                99,
                format!("{COPILOT_PREFIX}Try re-uploading."),
                Visibility::Private
            )]
        );
    }

    #[tokio::test]
    async fn missing_mode_is_treated_as_human() {
        let h = harness(RecordingSink::new(), FixedReply::new("Answer"), None, false);
        let event = InboundEvent::from_value(json!({
            "event": "message_created",
            "message_type": "incoming",
            "content": "Question?",
            "conversation": { "id": 99 },
        }))
        .unwrap_or_default();

        h.mediator.mediate(event).await;
        let posts = h.sink.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].visibility, Visibility::Private);
    }

    #[tokio::test]
    async fn single_shot_reply_is_sanitized() {
        let h = harness(
            RecordingSink::new(),
            FixedReply::new("Click Upload.\n\nТаким образом, готово.\n\nИсточники:\n- docs"),
            None,
            false,
        );
        h.mediator.mediate(event("How?", "bot")).await;
        let posts = h.sink.posts();
        assert_eq!(posts[1].content, "Click Upload.\n\nИсточники:\n- docs");
    }

    #[tokio::test]
    async fn contact_info_never_reaches_reply_source() {
        let h = harness(RecordingSink::new(), FixedReply::new("not found"), None, false);
        let outcome = h.mediator.mediate(event("hh@jd.com", "bot")).await;

        assert_eq!(outcome, MediationOutcome::Dropped(SkipReason::ContactInfo));
        assert_eq!(h.reply.calls(), 0);
        assert!(h.sink.posts().is_empty());
        assert!(!h.mediator.eligible(&event("hh@jd.com", "bot")));
    }

    #[tokio::test]
    async fn unconfigured_sink_aborts_before_any_call() {
        let h = harness(RecordingSink::unconfigured(), FixedReply::new("Answer"), None, false);
        let outcome = h.mediator.mediate(event("Question?", "bot")).await;

        assert!(matches!(outcome, MediationOutcome::Misconfigured(_)));
        assert_eq!(h.reply.calls(), 0);
        assert!(h.sink.posts().is_empty());
    }

    #[tokio::test]
    async fn unregistered_provider_is_misconfiguration() {
        let mediator = Mediator::new(
            Arc::new(RecordingSink::new()),
            Arc::new(ReplyProviders::new()),
            ModeClassifier::new("support_mode"),
            DeliverySettings::default(),
        );
        let outcome = mediator.mediate(event("Question?", "bot")).await;
        assert_eq!(
            outcome,
            MediationOutcome::Misconfigured("reply provider not registered")
        );
    }

    #[tokio::test]
    async fn failed_reply_leaves_only_placeholder() {
        let h = harness(RecordingSink::new(), FixedReply::failing(), None, false);
        let outcome = h.mediator.mediate(event("Question?", "bot")).await;

        assert_eq!(outcome, MediationOutcome::SourceFailed { posted: 1 });
        assert_eq!(h.sink.posts().len(), 1);
    }

    #[tokio::test]
    async fn empty_reply_posts_nothing_further() {
        let h = harness(RecordingSink::new(), FixedReply::new("   "), None, false);
        let outcome = h.mediator.mediate(event("Question?", "human")).await;

        assert_eq!(outcome, MediationOutcome::NoReply { posted: 0 });
        assert!(h.sink.posts().is_empty());
    }

    #[tokio::test]
    async fn streaming_posts_blocks_in_order_without_placeholder() {
        let chunks = [
            "First sentence is here. ",
            "Second sentence is here. ",
            "Third one is here. ",
            "End",
        ];
        let h = harness(
            RecordingSink::new(),
            FixedReply::new("unused"),
            Some(ChunkedReply::new(&chunks)),
            true,
        );
        let outcome = h.mediator.mediate(event("Question?", "bot")).await;

        let posts = h.sink.posts();
        assert_eq!(outcome, MediationOutcome::Delivered { posted: posts.len() });
        assert_eq!(h.reply.calls(), 0);
        assert!(posts.len() >= 2);
        assert!(posts.iter().all(|p| p.visibility == Visibility::Public));
        assert!(posts.iter().all(|p| p.content != AUTO_REPLY_PLACEHOLDER));
        let joined: Vec<&str> = posts.iter().flat_map(|p| p.content.split_whitespace()).collect();
        let full = chunks.concat();
        let expected: Vec<&str> = full.split_whitespace().collect();
        assert_eq!(joined, expected);
    }

    #[tokio::test]
    async fn streaming_holds_back_sources_section() {
        let chunks = [
            "Open the dashboard first. ",
            "Then click the upload button.\n\n",
            "Now you can relax.\n\nSources:\n",
            "- https://docs.example.com/upload-guide-with-a-long-path",
        ];
        let h = harness(
            RecordingSink::new(),
            FixedReply::new("unused"),
            Some(ChunkedReply::new(&chunks)),
            true,
        );
        h.mediator.mediate(event("Question?", "bot")).await;

        let posts = h.sink.posts();
        let last = posts.last().map(|p| p.content.as_str()).unwrap_or_default();
        assert!(last.ends_with("Sources:\n- https://docs.example.com/upload-guide-with-a-long-path"));
        assert!(!last.contains("Now you can relax"));
        assert!(posts.iter().filter(|p| p.content.contains("Sources:")).count() == 1);
    }

    #[tokio::test]
    async fn streaming_stops_after_rejected_post() {
        let chunks = [
            "Block number one is here. ",
            "Block number two is here. ",
            "Block number three is here. ",
        ];
        let h = harness(
            RecordingSink::accepting(1),
            FixedReply::new("unused"),
            Some(ChunkedReply::new(&chunks)),
            true,
        );
        let outcome = h.mediator.mediate(event("Question?", "bot")).await;

        assert_eq!(outcome, MediationOutcome::PostFailed { posted: 1 });
        assert_eq!(h.sink.posts().len(), 1);
    }

    #[tokio::test]
    async fn stream_failure_keeps_posted_prefix() {
        let chunks = ["A full first block of text. ", "Second block text here. ", "never"];
        let h = harness(
            RecordingSink::new(),
            FixedReply::new("unused"),
            Some(ChunkedReply::failing_after(&chunks, 2)),
            true,
        );
        let outcome = h.mediator.mediate(event("Question?", "bot")).await;

        let posted = h.sink.posts().len();
        assert!(posted >= 1);
        assert_eq!(outcome, MediationOutcome::SourceFailed { posted });
        assert!(h.sink.posts().iter().all(|p| !p.content.contains("never")));
    }

    #[tokio::test]
    async fn stream_failure_flushes_buffered_text() {
        let h = harness(
            RecordingSink::new(),
            FixedReply::new("unused"),
            Some(ChunkedReply::failing_after(&["Short tail text"], 1)),
            true,
        );
        let outcome = h.mediator.mediate(event("Question?", "bot")).await;

        assert_eq!(outcome, MediationOutcome::SourceFailed { posted: 1 });
        assert_eq!(
            h.sink.posts(),
            vec![ReplyDestination::new(99, "Short tail text", Visibility::Public)]
        );
    }

    #[tokio::test]
    async fn bot_without_stream_source_falls_back_to_single_shot() {
        let h = harness(RecordingSink::new(), FixedReply::new("single"), None, true);
        let outcome = h.mediator.mediate(event("Question?", "bot")).await;

        assert_eq!(outcome, MediationOutcome::Delivered { posted: 2 });
        assert_eq!(
            h.sink.posts(),
            vec![
                ReplyDestination::new(99, AUTO_REPLY_PLACEHOLDER, Visibility::Public),
                ReplyDestination::new(99, "single", Visibility::Public),
            ]
        );
    }

    #[tokio::test]
    async fn human_mode_never_streams() {
        let h = harness(
            RecordingSink::new(),
            FixedReply::new("Suggested answer"),
            Some(ChunkedReply::new(&["Streamed text that must not be posted. "])),
            true,
        );
        let outcome = h.mediator.mediate(event("Question?", "human")).await;

        assert_eq!(outcome, MediationOutcome::Delivered { posted: 1 });
        assert_eq!(h.reply.calls(), 1);
        assert_eq!(
            h.sink.posts(),
            vec![ReplyDestination::new(
                99,
                format!("{COPILOT_PREFIX}Suggested answer"),
                Visibility::Private
            )]
        );
    }

    #[tokio::test]
    async fn streaming_disabled_uses_single_shot() {
        let h = harness(
            RecordingSink::new(),
            FixedReply::new("Single answer"),
            Some(ChunkedReply::new(&["streamed answer"])),
            false,
        );
        h.mediator.mediate(event("Question?", "bot")).await;
        assert_eq!(h.reply.calls(), 1);
        assert_eq!(h.sink.posts().len(), 2);
    }

    #[tokio::test]
    async fn dispatch_runs_on_executor() {
        let h = harness(RecordingSink::new(), FixedReply::new("Answer"), None, false);
        let executor = QueuedExecutor::new();
        h.mediator.dispatch(&executor, event("Question?", "bot"));

        assert!(h.sink.posts().is_empty());
        executor.run_pending().await;
        assert_eq!(h.sink.posts().len(), 2);
    }

    #[tokio::test]
    async fn suggestion_is_sanitized_and_not_posted() -> crate::error::Result<()> {
        let h = harness(
            RecordingSink::new(),
            FixedReply::new("Answer.\n\nYou can also ask.\n\nSources: faq"),
            None,
            false,
        );
        assert_eq!(h.mediator.suggest("question").await?, "Answer.\n\nSources: faq");
        assert!(h.sink.posts().is_empty());
        Ok(())
    }
}
