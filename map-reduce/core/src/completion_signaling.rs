// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use tokio::sync::mpsc::{self, Sender};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{StreamExt, StreamMap};

/// Result of one task: its output, or the reason the worker could not produce it
#[derive(Debug)]
pub struct Completion<O> {
    pub task_id: usize,
    pub result: Result<O, String>,
}

/// Handle a worker uses to report a finished task
pub struct CompletionSender<O> {
    tx: Sender<Completion<O>>,
}

impl<O> Clone for CompletionSender<O> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<O: Send> CompletionSender<O> {
    /// Returns false if the orchestrator side is gone
    pub async fn send(&self, completion: Completion<O>) -> bool {
        self.tx.send(completion).await.is_ok()
    }
}

/// Channel-based completion signaling using tokio mpsc and StreamMap,
/// one stream per worker so a completion identifies the worker that is free again
pub struct CompletionSignaling<O> {
    completion_txs: Vec<Sender<Completion<O>>>,
    completion_streams: StreamMap<usize, ReceiverStream<Completion<O>>>,
}

impl<O: Send + 'static> CompletionSignaling<O> {
    pub fn setup(num_workers: usize) -> Self {
        let mut completion_txs = Vec::with_capacity(num_workers);
        let mut completion_streams = StreamMap::new();

        for worker_id in 0..num_workers {
            let (tx, rx) = mpsc::channel::<Completion<O>>(1);
            completion_txs.push(tx);
            completion_streams.insert(worker_id, ReceiverStream::new(rx));
        }

        Self {
            completion_txs,
            completion_streams,
        }
    }

    pub fn sender(&self, worker_id: usize) -> CompletionSender<O> {
        CompletionSender {
            tx: self.completion_txs[worker_id].clone(),
        }
    }

    /// Wait for the next completion from any worker.
    /// Returns `(worker_id, completion)`, or None once every worker stream is closed.
    pub async fn wait_next(&mut self) -> Option<(usize, Completion<O>)> {
        self.completion_streams.next().await
    }
}
