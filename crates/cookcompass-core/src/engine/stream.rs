//! Pull-based fragment stream over a push-based generation call
//!
//! The generation runs on its own task and pushes fragments into an unbounded
//! channel. Whatever happens to the call, the task finishes by sending
//! [`BridgeItem::End`], so the consumer always terminates.

use crate::error::{CookCompassError, Result};
use crate::llm::{ChatMessage, GenerationMode, LLMClient};
use futures::stream::{self, BoxStream};
use futures::{FutureExt, Stream, StreamExt};
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

enum BridgeItem {
    Fragment(String),
    /// Outcome of the generation call, always the last item sent
    End(Result<()>),
}

struct Bridge {
    rx: mpsc::UnboundedReceiver<BridgeItem>,
    worker: JoinHandle<()>,
}

/// Streamed assistant reply
///
/// Yields fragments in emission order. A failed generation ends the stream
/// with a single `Err` item. Dropping the stream early does not cancel the
/// generation; the worker runs to completion and its sends are discarded.
pub struct ResponseStream {
    inner: BoxStream<'static, Result<String>>,
}

impl ResponseStream {
    /// A stream that yields nothing
    pub fn empty() -> Self {
        Self {
            inner: stream::empty().boxed(),
        }
    }

    /// Start one streamed generation on a background task
    pub fn spawn(llm: Arc<dyn LLMClient>, messages: Vec<ChatMessage>, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let worker = tokio::spawn(async move {
            let sink_tx = tx.clone();
            let mode = GenerationMode::stream(move |fragment| {
                if !fragment.is_empty() {
                    // Receiver gone means the consumer stopped listening
                    let _ = sink_tx.send(BridgeItem::Fragment(fragment));
                }
            });

            let generation = tokio::time::timeout(timeout, llm.chat_completion(messages, mode));
            let outcome = match AssertUnwindSafe(generation).catch_unwind().await {
                Ok(Ok(Ok(_))) => Ok(()),
                Ok(Ok(Err(e))) => Err(e),
                Ok(Err(_elapsed)) => Err(CookCompassError::Timeout(timeout.as_secs())),
                Err(_panic) => Err(CookCompassError::Generation(
                    "generation worker panicked".to_string(),
                )),
            };

            if let Err(ref e) = outcome {
                tracing::warn!("Generation failed: {}", e);
            }
            let _ = tx.send(BridgeItem::End(outcome));
        });

        let inner = stream::unfold(Some(Bridge { rx, worker }), |state| async move {
            let mut bridge = state?;
            match bridge.rx.recv().await {
                Some(BridgeItem::Fragment(fragment)) => Some((Ok(fragment), Some(bridge))),
                Some(BridgeItem::End(outcome)) => {
                    let joined = bridge.worker.await;
                    match (outcome, joined) {
                        (_, Err(join_err)) => Some((Err(join_error(join_err)), None)),
                        (Err(e), Ok(())) => Some((Err(e), None)),
                        (Ok(()), Ok(())) => None,
                    }
                }
                // Channel closed without a sentinel: the worker died
                None => match bridge.worker.await {
                    Err(join_err) => Some((Err(join_error(join_err)), None)),
                    Ok(()) => None,
                },
            }
        })
        .boxed();

        Self { inner }
    }

    /// Concatenate every fragment, failing on the first error
    pub async fn collect_text(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(fragment) = self.inner.next().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }
}

fn join_error(err: tokio::task::JoinError) -> CookCompassError {
    CookCompassError::Generation(format!("generation worker failed: {}", err))
}

impl Stream for ResponseStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct ScriptedLLM {
        fragments: Vec<&'static str>,
        fail: bool,
        panic: bool,
        delay: Option<Duration>,
    }

    impl ScriptedLLM {
        fn new(fragments: Vec<&'static str>) -> Self {
            Self {
                fragments,
                fail: false,
                panic: false,
                delay: None,
            }
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedLLM {
        async fn chat_completion(
            &self,
            _messages: Vec<ChatMessage>,
            mode: GenerationMode,
        ) -> Result<String> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let GenerationMode::Stream(mut sink) = mode else {
                return Ok(self.fragments.concat());
            };
            for fragment in &self.fragments {
                sink(fragment.to_string());
            }
            if self.panic {
                panic!("scripted panic");
            }
            if self.fail {
                return Err(CookCompassError::Llm("connection reset".to_string()));
            }
            Ok(self.fragments.concat())
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn spawn(llm: ScriptedLLM) -> ResponseStream {
        ResponseStream::spawn(Arc::new(llm), vec![ChatMessage::user("hi")], Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_fragments_arrive_in_order() {
        let items: Vec<Result<String>> = spawn(ScriptedLLM::new(vec!["Hel", "lo", "", " there"]))
            .collect()
            .await;
        let fragments: Vec<String> = items.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(fragments, vec!["Hel", "lo", " there"]);
    }

    #[tokio::test]
    async fn test_error_is_last_item() {
        let mut llm = ScriptedLLM::new(vec!["partial"]);
        llm.fail = true;
        let items: Vec<Result<String>> = spawn(llm).collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "partial");
        assert!(matches!(items[1], Err(CookCompassError::Llm(_))));
    }

    #[tokio::test]
    async fn test_panicking_worker_still_terminates() {
        let mut llm = ScriptedLLM::new(vec!["a"]);
        llm.panic = true;
        let items: Vec<Result<String>> = spawn(llm).collect().await;

        assert!(matches!(
            items.last(),
            Some(Err(CookCompassError::Generation(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_timeout() {
        let mut llm = ScriptedLLM::new(vec!["late"]);
        llm.delay = Some(Duration::from_secs(60));
        let stream =
            ResponseStream::spawn(Arc::new(llm), vec![ChatMessage::user("hi")], Duration::from_secs(2));

        let err = stream.collect_text().await.unwrap_err();
        assert!(matches!(err, CookCompassError::Timeout(2)));
    }

    #[tokio::test]
    async fn test_collect_matches_complete_reply() {
        let llm = Arc::new(ScriptedLLM::new(vec!["Try ", "the ", "risotto."]));
        let complete = llm
            .chat_completion(vec![ChatMessage::user("hi")], GenerationMode::Complete)
            .await
            .unwrap();
        let streamed = ResponseStream::spawn(llm, vec![ChatMessage::user("hi")], Duration::from_secs(5))
            .collect_text()
            .await
            .unwrap();
        assert_eq!(streamed, complete);
    }

    #[tokio::test]
    async fn test_empty_stream() {
        assert_eq!(ResponseStream::empty().collect_text().await.unwrap(), "");
    }
}
