//! Channel-based store writer for the clipboard poller
//!
//! The poller hands captures to a `RecorderHandle` and never touches the
//! store directly; a dedicated worker thread drains the channel and calls
//! `record()`. A failed record is logged and the loop keeps going, so a
//! transient storage error can never kill the capture pipeline.

use crate::store::MagpieStore;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

enum Command {
    Record(String),
    Shutdown,
}

/// Cheap, cloneable submission side of the recorder channel.
#[derive(Clone)]
pub struct RecorderHandle {
    sender: mpsc::Sender<Command>,
}

impl RecorderHandle {
    /// Queue a capture for recording. Returns false if the recorder has
    /// already shut down.
    pub fn submit(&self, content: String) -> bool {
        self.sender.send(Command::Record(content)).is_ok()
    }
}

/// Owns the worker thread; dropping it drains nothing further and joins.
pub struct Recorder {
    sender: mpsc::Sender<Command>,
    worker: Option<JoinHandle<()>>,
}

impl Recorder {
    /// Spawn the writer thread for a store.
    pub fn spawn(store: Arc<MagpieStore>) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Command>();

        let worker = thread::Builder::new()
            .name("magpie-recorder".into())
            .spawn(move || {
                while let Ok(command) = receiver.recv() {
                    match command {
                        Command::Record(content) => match store.record(&content) {
                            Ok(outcome) => {
                                tracing::debug!(?outcome, "recorder stored capture");
                            }
                            Err(err) => {
                                tracing::warn!(error = %err, "recording failed, poller continues");
                            }
                        },
                        Command::Shutdown => break,
                    }
                }
                tracing::debug!("recorder thread shutting down");
            })?;

        Ok(Self {
            sender,
            worker: Some(worker),
        })
    }

    pub fn handle(&self) -> RecorderHandle {
        RecorderHandle {
            sender: self.sender.clone(),
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
