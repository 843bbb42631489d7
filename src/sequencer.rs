//! Staggered show/hide cascades.
//!
//! Every controller owns one queue drained by one worker task, so two cascades never
//! interleave: a `hide` issued while a `show` is running starts after the `show` finished.
//! Within a cascade, each step starts a fade and then dwells for a fixed time before the
//! next balloon is touched.

use crate::events::Fade;
use crate::host::{Host, NodeId};
use async_channel::{Receiver, Sender};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("controller was disabled after {completed} step(s)")]
    Disabled { completed: usize },
    #[error("sequence interrupted: {0}")]
    Interrupted(String),
}

pub type Outcome = Result<(), SequenceError>;

/// Checked before every step; a cascade stops as soon as it returns `false`.
pub type Liveness = Arc<dyn Fn() -> bool + Send + Sync>;

struct Chain {
    nodes: Vec<NodeId>,
    fade: Fade,
    live: Liveness,
    reply: Sender<Outcome>,
}

#[derive(Clone)]
struct Timing {
    host: Arc<dyn Host>,
    dwell: Duration,
    fade: Duration,
}

impl Timing {
    async fn run(&self, chain: &Chain) -> Outcome {
        log::debug!(
            "Fade {} cascade over {} balloon(s)",
            chain.fade,
            chain.nodes.len()
        );

        for (completed, node) in chain.nodes.iter().enumerate() {
            if !(chain.live)() {
                log::warn!(
                    "Fade {} cascade stopped after {} step(s): controller disabled",
                    chain.fade,
                    completed
                );
                return Err(SequenceError::Disabled { completed });
            }
            self.host.fade(*node, chain.fade, self.fade);
            tokio::time::sleep(self.dwell).await;
        }

        log::debug!("Fade {} cascade finished", chain.fade);
        Ok(())
    }
}

async fn drain(timing: Timing, queue: Receiver<Chain>) {
    while let Ok(chain) = queue.recv().await {
        let outcome = timing.run(&chain).await;
        let _ = chain.reply.send(outcome).await;
    }
}

pub struct Sequencer {
    queue: Sender<Chain>,
    timing: Timing,
    runtime: Handle,
}

impl Sequencer {
    /// Starts the worker on `runtime`. It stops once the sequencer is dropped.
    pub fn new(runtime: Handle, host: Arc<dyn Host>, dwell: Duration, fade: Duration) -> Self {
        let (queue, rx) = async_channel::unbounded();
        let timing = Timing { host, dwell, fade };
        runtime.spawn(drain(timing.clone(), rx));

        Self {
            queue,
            timing,
            runtime,
        }
    }

    /// Queues a cascade over `nodes`, in order.
    pub fn cascade(&self, nodes: Vec<NodeId>, fade: Fade, live: Liveness) -> Sequence {
        let (reply, outcome) = async_channel::bounded(1);
        let chain = Chain {
            nodes,
            fade,
            live,
            reply,
        };

        if self.queue.try_send(chain).is_err() {
            return self.settled(Err(SequenceError::Interrupted(
                "cascade queue closed".to_string(),
            )));
        }

        let handle = self.runtime.spawn(async move {
            outcome.recv().await.unwrap_or_else(|_| {
                Err(SequenceError::Interrupted(
                    "cascade dropped before finishing".to_string(),
                ))
            })
        });

        Sequence {
            handle,
            runtime: self.runtime.clone(),
        }
    }

    /// An already finished sequence.
    pub fn settled(&self, outcome: Outcome) -> Sequence {
        Sequence {
            handle: self.runtime.spawn(async move { outcome }),
            runtime: self.runtime.clone(),
        }
    }

    /// Fades every node at once, bypassing the queue.
    pub fn fire(&self, nodes: &[NodeId], fade: Fade) {
        for node in nodes {
            self.timing.host.fade(*node, fade, self.timing.fade);
        }
    }
}

/// Handle to a running cascade. Await it for the outcome, or attach continuations.
pub struct Sequence {
    handle: JoinHandle<Outcome>,
    runtime: Handle,
}

impl Sequence {
    /// Runs `f` once the cascade went through every balloon.
    pub fn done<F>(self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.then(move |outcome| {
            if outcome.is_ok() {
                f();
            }
        })
    }

    pub fn fail<F>(self, f: F) -> Self
    where
        F: FnOnce(&SequenceError) + Send + 'static,
    {
        self.then(move |outcome| {
            if let Err(e) = outcome {
                f(e);
            }
        })
    }

    pub fn always<F>(self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.then(move |_| f())
    }

    fn then<F>(self, f: F) -> Self
    where
        F: FnOnce(&Outcome) + Send + 'static,
    {
        let runtime = self.runtime.clone();
        let handle = runtime.spawn(async move {
            let outcome = self.await;
            f(&outcome);
            outcome
        });
        Self { handle, runtime }
    }
}

impl Future for Sequence {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| {
            joined.unwrap_or_else(|e| Err(SequenceError::Interrupted(e.to_string())))
        })
    }
}
