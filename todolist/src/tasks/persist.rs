//! File persistence for the task list.
//!
//! The whole list is one JSON document, rewritten from scratch on every
//! change. Writes happen on a background task fed by an unbounded channel,
//! so callers never wait on the disk; [`TaskWriter::flush`] is the only
//! way to wait for queued writes to land.
//!
//! Failures never propagate out of the writer. They are logged and the
//! in-memory list stays authoritative until the next successful write.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use todolist_proto::codec::{self, CodecError, Layout};
use todolist_proto::task::Task;

/// Errors raised while reading or writing the task file.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The task file exists but could not be read.
    #[error("failed to read task file {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The task file could not be written or replaced.
    #[error("failed to write task file {path}: {source}")]
    Write {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The document could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The blocking worker running the I/O did not complete.
    #[error("background file task failed: {0}")]
    Background(String),
}

/// Reads and decodes the task file.
///
/// Returns `Ok(None)` when the file does not exist yet.
///
/// # Errors
///
/// Returns [`PersistError::Read`] for I/O failures other than a missing
/// file, or [`PersistError::Codec`] if the contents are not a valid task
/// document.
pub fn read_tasks(path: &Path) -> Result<Option<Vec<Task>>, PersistError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Ok(Some(codec::decode(&bytes)?))
}

/// Encodes `tasks` and replaces the task file with the result.
///
/// The document is written to a sibling temporary file and renamed over
/// `path`, so readers only ever see a complete document. Missing parent
/// directories are created.
///
/// # Errors
///
/// Returns [`PersistError::Codec`] if encoding fails, or
/// [`PersistError::Write`] if any filesystem step fails.
pub fn write_tasks(path: &Path, tasks: &[Task], layout: Layout) -> Result<(), PersistError> {
    let bytes = codec::encode(tasks, layout)?;
    let write_err = |source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let temp = temp_path(path);
    let file = fs::File::create(&temp).map_err(write_err)?;
    if let Err(source) = fill_and_rename(file, &bytes, &temp, path) {
        if let Err(e) = fs::remove_file(&temp) {
            tracing::debug!(path = %temp.display(), error = %e, "could not remove temp file");
        }
        return Err(write_err(source));
    }
    Ok(())
}

fn fill_and_rename(mut file: fs::File, bytes: &[u8], temp: &Path, path: &Path) -> io::Result<()> {
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp, path)
}

/// Reads the task file on the blocking thread pool.
///
/// # Errors
///
/// Same as [`read_tasks`], plus [`PersistError::Background`] if the
/// blocking task panicked or was cancelled.
pub async fn read_tasks_in_background(path: PathBuf) -> Result<Option<Vec<Task>>, PersistError> {
    tokio::task::spawn_blocking(move || read_tasks(&path))
        .await
        .map_err(|e| PersistError::Background(e.to_string()))?
}

/// `tasks_data.json` -> `tasks_data.json.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("tasks"), OsString::from);
    name.push(".tmp");
    path.with_file_name(name)
}

enum WriterCommand {
    Write(Arc<[Task]>),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background task that writes snapshots to disk.
///
/// Snapshots are written in the order they were queued. When several are
/// waiting, only the newest is written, since each one replaces the whole
/// file anyway. The task exits once every handle is dropped and the queue
/// is drained.
#[derive(Debug, Clone)]
pub struct TaskWriter {
    tx: mpsc::UnboundedSender<WriterCommand>,
}

impl std::fmt::Debug for WriterCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Write(tasks) => f.debug_tuple("Write").field(&tasks.len()).finish(),
            Self::Flush(_) => f.write_str("Flush"),
        }
    }
}

impl TaskWriter {
    /// Spawns the writer task on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(path: PathBuf, layout: Layout) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(rx, path, layout));
        Self { tx }
    }

    /// Queues a snapshot for writing. Never blocks.
    pub fn enqueue(&self, snapshot: Arc<[Task]>) {
        if self.tx.send(WriterCommand::Write(snapshot)).is_err() {
            tracing::warn!("task writer has stopped; change not saved");
        }
    }

    /// Waits until every snapshot queued before this call has been
    /// handled (written, or failed and logged).
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(WriterCommand::Flush(ack_tx)).is_err() {
            return;
        }
        // A dropped ack means the writer is gone; nothing left to wait for.
        let _ = ack_rx.await;
    }
}

async fn run_writer(mut rx: mpsc::UnboundedReceiver<WriterCommand>, path: PathBuf, layout: Layout) {
    while let Some(command) = rx.recv().await {
        let mut snapshot = match command {
            WriterCommand::Write(snapshot) => snapshot,
            WriterCommand::Flush(ack) => {
                let _ = ack.send(());
                continue;
            }
        };

        let mut acks = Vec::new();
        while let Ok(next) = rx.try_recv() {
            match next {
                WriterCommand::Write(newer) => snapshot = newer,
                WriterCommand::Flush(ack) => acks.push(ack),
            }
        }

        write_snapshot(&path, layout, snapshot).await;

        for ack in acks {
            let _ = ack.send(());
        }
    }
    tracing::debug!(path = %path.display(), "task writer stopped");
}

async fn write_snapshot(path: &Path, layout: Layout, snapshot: Arc<[Task]>) {
    let count = snapshot.len();
    let target = path.to_path_buf();
    let result =
        tokio::task::spawn_blocking(move || write_tasks(&target, &snapshot, layout)).await;

    match result {
        Ok(Ok(())) => tracing::debug!(path = %path.display(), count, "tasks saved"),
        Ok(Err(e)) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "failed to save tasks; in-memory list is unchanged"
        ),
        Err(e) => tracing::error!(error = %e, "task save worker failed"),
    }
}
