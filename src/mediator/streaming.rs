//! Bot-mode delivery of a streamed reply as a sequence of chat messages.

use futures::StreamExt;
use log::{debug, error};

use crate::reply::{StreamBuffer, StreamReplySource};
use crate::types::Visibility;

use super::flow::Mediator;
use super::outcome::MediationOutcome;

impl Mediator {
    /// Posts blocks as soon as they are cut from the stream; no placeholder is sent.
    ///
    /// The first rejected post abandons the rest of the reply. When the source
    /// fails mid-stream, text already received is still posted.
    pub(super) async fn stream(
        &self,
        conversation_id: i64,
        source: &dyn StreamReplySource,
        content: &str,
    ) -> MediationOutcome {
        let mut deltas = match source.stream_reply(content).await {
            Ok(deltas) => deltas,
            Err(e) => {
                error!("Stream reply provider failed for conversation {conversation_id}: {e}");
                return MediationOutcome::SourceFailed { posted: 0 };
            }
        };

        let mut buffer = StreamBuffer::new(self.settings.stream_limits);
        let mut posted = 0;

        while let Some(delta) = deltas.next().await {
            let delta = match delta {
                Ok(delta) => delta,
                Err(e) => {
                    error!(
                        "Stream reply provider failed for conversation {conversation_id} after {posted} blocks: {e}"
                    );
                    if let Some(partial) = buffer.finish() {
                        if self.post(conversation_id, &partial, Visibility::Public).await {
                            posted += 1;
                        } else {
                            error!(
                                "Failed to post partial stream block to conversation {conversation_id}"
                            );
                        }
                    }
                    return MediationOutcome::SourceFailed { posted };
                }
            };

            for block in buffer.push(&delta) {
                if !self.post(conversation_id, &block, Visibility::Public).await {
                    error!(
                        "Failed to post stream block {} to conversation {conversation_id}",
                        posted + 1
                    );
                    return MediationOutcome::PostFailed { posted };
                }
                posted += 1;
                debug!("Posted stream block {posted} to conversation {conversation_id}");
            }
        }

        if let Some(last) = buffer.finish() {
            if !self.post(conversation_id, &last, Visibility::Public).await {
                error!(
                    "Failed to post final stream block to conversation {conversation_id}"
                );
                return MediationOutcome::PostFailed { posted };
            }
            posted += 1;
        }

        if posted == 0 {
            MediationOutcome::NoReply { posted }
        } else {
            MediationOutcome::Delivered { posted }
        }
    }
}
