//! Output side of the viewer: console printing and an optional append-only
//! log file.

use std::io;
use std::path::Path;

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::client::ViewerUpdate;
use crate::client::formatter::format_chat_line;

/// Append-only chat log. The handle is opened once per run and closed on
/// drop, whichever way the run ends.
pub struct FileSink {
    file: File,
}

impl FileSink {
    /// Open `path` for appending, creating it if needed. Existing content
    /// is never truncated.
    pub async fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path).await?;
        Ok(Self { file })
    }

    /// Append one line plus newline and flush, so a crash loses at most the
    /// line being written.
    pub async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.file.write_all(line.as_bytes()).await?;
        self.file.write_all(b"\n").await?;
        self.file.flush().await
    }
}

/// Consume updates until the channel closes: chat events are printed (and
/// appended to the file when one is configured), status strings are logged.
pub async fn consume_updates(
    mut updates: mpsc::UnboundedReceiver<ViewerUpdate>,
    mut log_file: Option<FileSink>,
) {
    while let Some(update) = updates.recv().await {
        match update {
            ViewerUpdate::Chat(event) => {
                let line = format_chat_line(&event);
                println!("{line}");
                if let Some(sink) = log_file.as_mut()
                    && let Err(e) = sink.write_line(&line).await
                {
                    tracing::warn!("failed to append to chat log: {e}");
                }
            }
            ViewerUpdate::Status(message) => {
                tracing::info!("{message}");
            }
        }
    }
    // log_file drops here, closing the handle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_sink_appends_without_truncating() {
        // given: a log file that already has a line
        let path = std::env::temp_dir().join(format!("chat-sink-test-{}.txt", std::process::id()));
        tokio::fs::write(&path, "old line\n").await.unwrap();

        // when: a sink opens the same path and writes another line
        {
            let mut sink = FileSink::open(&path).await.unwrap();
            sink.write_line("new line").await.unwrap();
        }

        // then: both lines are present, in order
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "old line\nnew line\n");

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
