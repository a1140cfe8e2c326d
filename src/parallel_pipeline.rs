// THEORY:
// `ClassifierPool` fans independent classification requests out across a fixed
// set of tokio worker tasks. Each request is one canvas and one answer; requests
// are never fused into a batched network pass.
//
// A dispatcher task receives every request and hands them to the workers
// round-robin. Every worker owns a `DigitClassifier` clone, and all clones share
// the same `Arc<NetworkWeights>`, so there is no lock anywhere on the hot path.
// Replies travel back on a per-request oneshot channel.

use crate::core_modules::error::PreconditionError;
use crate::core_modules::network::NetworkWeights;
use crate::core_modules::raw_image::OwnedImage;
use crate::pipeline::{Classification, ClassifierConfig, DigitClassifier};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Failed to send task to worker pool")]
    Closed,
    #[error("Worker dropped the request without replying")]
    NoReply,
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

pub struct ClassifyTask {
    pub image: OwnedImage,
    pub result_sender: oneshot::Sender<Result<Classification, PreconditionError>>,
}

pub struct ClassifierPool {
    task_sender: mpsc::UnboundedSender<ClassifyTask>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl ClassifierPool {
    /// Spawns the dispatcher and worker tasks. Must be called from within a
    /// tokio runtime.
    pub fn new(config: &ClassifierConfig, weights: Arc<NetworkWeights>) -> Self {
        let worker_count = config.workers.unwrap_or_else(num_cpus::get).max(1);
        let classifier = DigitClassifier::new(config, weights);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<ClassifyTask>();

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<ClassifyTask>())
            .unzip();

        // Spawn dispatcher
        tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                let _ = worker_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % worker_senders.len();
            }
        });

        // Spawn workers
        let mut workers = Vec::with_capacity(worker_count);
        for (worker_id, mut worker_receiver) in worker_receivers.into_iter().enumerate() {
            let classifier = classifier.clone();
            workers.push(tokio::spawn(async move {
                while let Some(task) = worker_receiver.recv().await {
                    debug!(worker_id, "classifying canvas");
                    let result = task
                        .image
                        .as_buffer()
                        .and_then(|buffer| classifier.classify(&buffer));
                    let _ = task.result_sender.send(result);
                }
            }));
        }

        info!(workers = worker_count, softmax = ?config.softmax, "classifier pool started");
        Self {
            task_sender,
            workers,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub async fn classify(&self, image: OwnedImage) -> Result<Classification, PoolError> {
        let (result_sender, result_receiver) = oneshot::channel();
        self.task_sender
            .send(ClassifyTask {
                image,
                result_sender,
            })
            .map_err(|_| PoolError::Closed)?;

        let result = result_receiver.await.map_err(|_| PoolError::NoReply)?;
        Ok(result?)
    }

    /// Classifies every image concurrently. Results are in input order.
    pub async fn classify_all(
        &self,
        images: Vec<OwnedImage>,
    ) -> Vec<Result<Classification, PoolError>> {
        join_all(images.into_iter().map(|image| self.classify(image))).await
    }
}

impl Drop for ClassifierPool {
    fn drop(&mut self) {
        // Best effort shutdown on drop
        for worker in &self.workers {
            worker.abort();
        }
    }
}
