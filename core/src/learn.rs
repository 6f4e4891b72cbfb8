//! Background learn/unlearn dispatch.
//!
//! Dictionary writes never run on the keystroke path. Requests carry their own
//! copy of the word and go through a bounded channel to a single detached
//! worker thread that holds the dictionary handle. Submitting never blocks:
//! when the queue is full the request is dropped and logged. There is no
//! cancellation; a queued request runs to completion or fails on its own.
//! Every finished request bumps a `DictionaryGeneration`, which readers of
//! dictionary-dependent results use to notice that their copies are stale.
//!
//! `InMemoryDictionary` is a thread-safe map suitable for tests and demos.

use crate::error::DictError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};

/// The dictionary collaborator. Must be callable from the worker thread.
pub trait Dictionary: Send + Sync {
    fn learn(&self, word: &str, weight: i32) -> Result<(), DictError>;
    fn unlearn(&self, word: &str) -> Result<(), DictError>;
}

/// A single dictionary update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LearnRequest {
    Learn { word: String, weight: i32 },
    Unlearn { word: String },
}

impl LearnRequest {
    pub fn learn<T: Into<String>>(word: T) -> Self {
        LearnRequest::Learn {
            word: word.into(),
            weight: 0,
        }
    }

    pub fn unlearn<T: Into<String>>(word: T) -> Self {
        LearnRequest::Unlearn { word: word.into() }
    }

    pub fn word(&self) -> &str {
        match self {
            LearnRequest::Learn { word, .. } | LearnRequest::Unlearn { word } => word,
        }
    }
}

/// Count of requests the learn worker has finished, failed ones included.
#[derive(Debug, Clone, Default)]
pub struct DictionaryGeneration(Arc<AtomicU64>);

impl DictionaryGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn bump(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}

/// Fire-and-forget queue in front of a dictionary.
pub struct LearnQueue {
    tx: SyncSender<LearnRequest>,
    capacity: usize,
    generation: DictionaryGeneration,
    worker: JoinHandle<()>,
}

impl LearnQueue {
    /// Spawn the worker and return the queue handle. The worker exits once
    /// this handle is dropped and every queued request has run.
    pub fn spawn(dictionary: Arc<dyn Dictionary>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::sync_channel(capacity);
        let generation = DictionaryGeneration::new();
        let applied = generation.clone();
        let worker = thread::spawn(move || run_worker(dictionary, rx, applied));
        Self {
            tx,
            capacity,
            generation,
            worker,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Handle that advances each time the worker finishes a request.
    pub fn generation(&self) -> DictionaryGeneration {
        self.generation.clone()
    }

    /// Queue a request without blocking. Returns false if it was dropped.
    pub fn submit(&self, request: LearnRequest) -> bool {
        match self.tx.try_send(request) {
            Ok(()) => true,
            Err(TrySendError::Full(request)) => {
                tracing::warn!(
                    capacity = self.capacity,
                    kind = request_kind(&request),
                    "learn queue full, dropping request"
                );
                false
            }
            Err(TrySendError::Disconnected(request)) => {
                tracing::warn!(kind = request_kind(&request), "learn worker gone, dropping request");
                false
            }
        }
    }

    /// Close the queue and wait until every queued request has run.
    /// Dropping the queue instead leaves the worker to finish on its own.
    pub fn shutdown(self) {
        let LearnQueue { tx, worker, .. } = self;
        drop(tx);
        if worker.join().is_err() {
            tracing::warn!("learn worker panicked");
        }
    }
}

fn request_kind(request: &LearnRequest) -> &'static str {
    match request {
        LearnRequest::Learn { .. } => "learn",
        LearnRequest::Unlearn { .. } => "unlearn",
    }
}

fn run_worker(dictionary: Arc<dyn Dictionary>, rx: Receiver<LearnRequest>, applied: DictionaryGeneration) {
    tracing::debug!("learn worker started");
    for request in rx {
        let result = match &request {
            LearnRequest::Learn { word, weight } => dictionary.learn(word, *weight),
            LearnRequest::Unlearn { word } => dictionary.unlearn(word),
        };
        match result {
            Ok(()) => tracing::trace!(kind = request_kind(&request), "dictionary updated"),
            Err(e) => tracing::warn!(error = %e, "dictionary update failed"),
        }
        applied.bump();
    }
    tracing::debug!("learn worker stopped");
}

/// A thread-safe in-memory dictionary.
///
/// Learning adds `1 + weight` (weights below zero count as zero) to a word's
/// count; unlearning removes the word and fails if it was never learned.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDictionary {
    inner: Arc<RwLock<HashMap<String, u64>>>,
}

impl InMemoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learned count for a word.
    pub fn frequency(&self, word: &str) -> u64 {
        match self.inner.read() {
            Ok(map) => map.get(word).copied().unwrap_or(0),
            Err(_) => 0,
        }
    }

    /// Export a snapshot of the current data.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        match self.inner.read() {
            Ok(map) => map.clone(),
            Err(_) => HashMap::new(),
        }
    }
}

impl Dictionary for InMemoryDictionary {
    fn learn(&self, word: &str, weight: i32) -> Result<(), DictError> {
        if word.is_empty() {
            return Err(DictError::Learn {
                word: String::new(),
                reason: "empty word".to_string(),
            });
        }
        let mut map = self.inner.write().map_err(|_| DictError::Unavailable)?;
        let delta = 1 + weight.max(0) as u64;
        let entry = map.entry(word.to_string()).or_insert(0);
        *entry = entry.saturating_add(delta);
        Ok(())
    }

    fn unlearn(&self, word: &str) -> Result<(), DictError> {
        let mut map = self.inner.write().map_err(|_| DictError::Unavailable)?;
        match map.remove(word) {
            Some(_) => Ok(()),
            None => Err(DictError::Unlearn {
                word: word.to_string(),
                reason: "word not learned".to_string(),
            }),
        }
    }
}
