//! Line-oriented async console.
//!
//! Input arrives as whole lines on a channel so the session loop can wait
//! on input and on the relay at the same time. `Console::stdio` feeds the
//! channel from stdin; tests feed it directly.

use crate::error::{IoError, Result};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// Prompt printed before reading input.
pub const PROMPT: &str = "> ";

/// Lines buffered between the stdin reader and the console.
const STDIN_BUFFER: usize = 16;

/// Interactive console over an input line channel and an output writer.
pub struct Console<W> {
    input: mpsc::Receiver<String>,
    output: W,
}

impl Console<tokio::io::Stdout> {
    /// Console over the process's stdin and stdout.
    ///
    /// Spawns a task that forwards stdin lines; must be called inside a
    /// tokio runtime.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(spawn_stdin_reader(), tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin> Console<W> {
    /// Creates a console from an input channel and an output writer.
    pub const fn new(input: mpsc::Receiver<String>, output: W) -> Self {
        Self { input, output }
    }

    /// Waits for the next input line, without its line terminator.
    ///
    /// Returns `None` once input is exhausted. Cancel safe.
    pub async fn next_line(&mut self) -> Option<String> {
        self.input
            .recv()
            .await
            .map(|line| line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Prints the prompt and waits for a line.
    ///
    /// # Errors
    ///
    /// Returns `IoError::ConsoleClosed` if input is exhausted.
    pub async fn prompt(&mut self) -> Result<String> {
        self.print(PROMPT).await?;
        self.next_line()
            .await
            .ok_or_else(|| IoError::ConsoleClosed.into())
    }

    /// Writes text and flushes it.
    pub async fn print(&mut self, text: &str) -> Result<()> {
        self.output
            .write_all(text.as_bytes())
            .await
            .map_err(|e| IoError::WriteFailed(e.to_string()))?;
        self.output
            .flush()
            .await
            .map_err(|e| IoError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    /// Writes a line of text.
    pub async fn println(&mut self, text: &str) -> Result<()> {
        self.print(text).await?;
        self.print("\n").await
    }

    /// Returns the output writer, consuming the console.
    pub fn into_output(self) -> W {
        self.output
    }
}

/// Forwards stdin lines into a channel until EOF or a read error.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(STDIN_BUFFER);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "stdin read failed");
                    break;
                }
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_next_line_strips_terminator() {
        let (tx, rx) = mpsc::channel(4);
        let mut console = Console::new(rx, Vec::new());
        tx.send("hello\r\n".to_string()).await.unwrap();
        tx.send("q".to_string()).await.unwrap();
        drop(tx);

        assert_eq!(console.next_line().await.as_deref(), Some("hello"));
        assert_eq!(console.next_line().await.as_deref(), Some("q"));
        assert_eq!(console.next_line().await, None);
    }

    #[tokio::test]
    async fn test_prompt_prints_and_reads() {
        let (tx, rx) = mpsc::channel(1);
        let mut console = Console::new(rx, Vec::new());
        tx.send("a".to_string()).await.unwrap();

        assert_eq!(console.prompt().await.unwrap(), "a");
        drop(tx);
        assert!(console.prompt().await.is_err());

        let output = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(output, "> > ");
    }

    #[tokio::test]
    async fn test_println() {
        let (_tx, rx) = mpsc::channel(1);
        let mut console = Console::new(rx, Vec::new());
        console.println("one").await.unwrap();
        console.print("two").await.unwrap();
        assert_eq!(console.into_output(), b"one\ntwo");
    }
}
