// Serial background worker - the one place catalog mutations happen
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::{catalog::Catalog, isbn, models::Notice};

const COMMAND_QUEUE_DEPTH: usize = 32;

/// A queued catalog mutation. Raw ISBN input is normalized here, so every
/// submission path gets the same 10-to-13-digit widening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch { isbn: String },
    Confirm { isbn: String },
    Delete { isbn: String },
    Sweep,
}

/// Handle to a running worker: commands in, notices out.
///
/// Fire-and-forget - sending never waits for the operation, and a queued
/// command cannot be cancelled. Dropping the command sender shuts the
/// worker down once the queue drains, which also closes the notice stream.
pub struct CatalogHandle {
    pub commands: mpsc::Sender<Command>,
    pub notices: mpsc::UnboundedReceiver<Notice>,
}

/// Spawn the worker task. The catalog moves into the task, so all
/// mutations are serialized on one queue - at most one fetch, confirm,
/// delete or sweep runs at a time.
pub fn spawn(mut catalog: Catalog) -> CatalogHandle {
    let (command_tx, mut command_rx) = mpsc::channel::<Command>(COMMAND_QUEUE_DEPTH);
    let (notice_tx, notice_rx) = mpsc::unbounded_channel::<Notice>();

    tokio::spawn(async move {
        while let Some(command) = command_rx.recv().await {
            match run(&mut catalog, command).await {
                Ok(Some(notice)) => {
                    // Receiver gone means nobody is listening anymore; the
                    // remaining commands still run to completion.
                    let _ = notice_tx.send(notice);
                }
                Ok(None) => {}
                Err(e) => {
                    // Store-level failure. Shutting down closes the notice
                    // stream, so a waiting shell sees the end of stream
                    // instead of hanging on a notice that will never come.
                    error!(error = %e, "catalog operation failed, stopping worker");
                    break;
                }
            }
        }
        debug!("catalog worker stopped");
    });

    CatalogHandle {
        commands: command_tx,
        notices: notice_rx,
    }
}

async fn run(catalog: &mut Catalog, command: Command) -> crate::Result<Option<Notice>> {
    match command {
        Command::Fetch { isbn } => match isbn::normalize(&isbn) {
            Some(isbn) => catalog.fetch(&isbn).await.map(Some),
            None => {
                // Matches the original service: an un-normalizable fetch is
                // dropped silently; the shell validates user-forced input.
                debug!(input = %isbn, "ignoring fetch for invalid ISBN");
                Ok(None)
            }
        },
        Command::Confirm { isbn } => match isbn::normalize(&isbn) {
            Some(isbn) => catalog.confirm(&isbn),
            None => Ok(None),
        },
        Command::Delete { isbn } => match isbn::normalize(&isbn) {
            Some(isbn) => catalog.delete(&isbn),
            None => Ok(None),
        },
        Command::Sweep => catalog.sweep().map(Some),
    }
}
