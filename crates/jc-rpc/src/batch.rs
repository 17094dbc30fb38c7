//! Batching client.
//!
//! Calls issued within one scheduling turn are queued and sent as a single
//! `Batch` envelope. The first queued call spawns a flush task that yields
//! once to the runtime before draining the queue, so every call made in the
//! same turn joins the batch (on a current-thread runtime; see
//! [`BatchClient`]). A call made after the queue was drained starts
//! the next batch. [`BatchClient::flush`] dispatches the pending batch
//! immediately.
//!
//! Responses are fanned out in queue order: the n-th output of the batch
//! answers the n-th queued call.

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jc_codec::CallCodecs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::client::{complete, from_domain, prepare, to_domain, Sender};
use crate::envelope::{BatchOutput, Calling, CallingOutput};
use crate::error::{CallError, FormatError, SendError};
use crate::format::{decode_envelope, encode_envelope, Format, JsonFormat};

type Reply = oneshot::Sender<Result<CallingOutput, CallError>>;

struct Pending {
    request: Calling,
    reply: Reply,
}

#[derive(Default)]
struct Queue {
    pending: Vec<Pending>,
    /// A flush task has been spawned and has not drained the queue yet.
    scheduled: bool,
}

struct Shared<S> {
    sender: S,
    format: Arc<dyn Format>,
    queue: Mutex<Queue>,
}

/// Client that coalesces concurrent calls into batches.
///
/// Cloning is cheap; clones share one queue. Automatic flushing needs a
/// Tokio runtime; without one, calls wait for an explicit
/// [`flush`](Self::flush).
///
/// The one-turn window is only guaranteed on a current-thread runtime. On
/// a multi-thread runtime another worker may run the flush task between
/// two calls of the same turn, which then land in separate batches. Every
/// call is still answered; only the grouping differs.
pub struct BatchClient<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for BatchClient<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: Sender + 'static> BatchClient<S> {
    pub fn new(sender: S) -> Self {
        Self::with_format(sender, JsonFormat)
    }

    pub fn with_format(sender: S, format: impl Format + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                sender,
                format: Arc::new(format),
                queue: Mutex::new(Queue::default()),
            }),
        }
    }

    /// Queue a call with domain values and wait for its slice of the batch
    /// response.
    pub async fn call(&self, call: &CallCodecs, input: Option<Value>) -> Result<Option<Value>, CallError> {
        let request = prepare(&*self.shared.format, call, input)?;
        let (reply, response) = oneshot::channel();
        self.enqueue(Pending { request, reply });
        let output = response
            .await
            .map_err(|_| SendError::new("batch was dropped before dispatch"))??;
        complete(&*self.shared.format, call, output)
    }

    pub async fn call_typed<I, O>(&self, call: &CallCodecs, input: &I) -> Result<O, CallError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let output = self.call(call, to_domain(input)?).await?;
        from_domain(output)
    }

    /// Number of queued calls not yet dispatched.
    pub fn pending(&self) -> usize {
        self.shared.lock().pending.len()
    }

    /// Dispatch the queued calls now.
    pub async fn flush(&self) {
        self.shared.flush().await;
    }

    fn enqueue(&self, pending: Pending) {
        let mut queue = self.shared.lock();
        queue.pending.push(pending);
        if queue.scheduled {
            return;
        }
        match Handle::try_current() {
            Ok(handle) => {
                queue.scheduled = true;
                let shared = Arc::clone(&self.shared);
                handle.spawn(async move {
                    tokio::task::yield_now().await;
                    shared.flush().await;
                });
            }
            Err(_) => debug!("no async runtime, batch waits for an explicit flush"),
        }
    }
}

impl<S: Sender> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn flush(&self) {
        let batch = {
            let mut queue = self.lock();
            queue.scheduled = false;
            mem::take(&mut queue.pending)
        };
        if batch.is_empty() {
            return;
        }

        let (requests, replies): (Vec<Calling>, Vec<Reply>) =
            batch.into_iter().map(|p| (p.request, p.reply)).unzip();
        debug!(size = requests.len(), "flushing batch");

        match self.round_trip(requests).await {
            Ok(outputs) if outputs.len() == replies.len() => {
                for (reply, output) in replies.into_iter().zip(outputs) {
                    // The caller may have given up waiting.
                    let _ = reply.send(Ok(output));
                }
            }
            Ok(outputs) => {
                let err = CallError::Serialization(FormatError(format!(
                    "batch of {} calls answered with {} outputs",
                    replies.len(),
                    outputs.len()
                )));
                fail_all(replies, &err);
            }
            Err(err) => fail_all(replies, &err),
        }
    }

    async fn round_trip(&self, callings: Vec<Calling>) -> Result<Vec<CallingOutput>, CallError> {
        let text = encode_envelope(&*self.format, &Calling::Batch { callings })?;
        let response = self.sender.send(text).await?;
        let batch: BatchOutput = decode_envelope(&*self.format, &response)?;
        Ok(batch.outputs)
    }
}

fn fail_all(replies: Vec<Reply>, err: &CallError) {
    warn!(error = %err, calls = replies.len(), "batch failed");
    for reply in replies {
        let _ = reply.send(Err(err.clone()));
    }
}
