//! Interactive start page prompt
//!
//! The operator gets a few seconds to type a page number; anything else
//! (no answer, blank line, garbage, zero) starts from page 1.
//!
//! Stdin is read by one long-lived thread for the whole process. Each prompt
//! waits on the channel it feeds, so a late answer never swallows the
//! answer to the next store's prompt.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

/// Page used when the operator does not answer
pub const DEFAULT_START_PAGE: u32 = 1;

/// Parses an operator answer into a start page
///
/// # Examples
///
/// ```
/// use singles_scout::prompt::parse_start_page;
///
/// assert_eq!(parse_start_page(" 12\n"), Some(12));
/// assert_eq!(parse_start_page(""), None);
/// assert_eq!(parse_start_page("0"), None);
/// ```
pub fn parse_start_page(answer: &str) -> Option<u32> {
    answer.trim().parse::<u32>().ok().filter(|page| *page >= 1)
}

/// Start page prompt fed by a stream of input lines
pub struct StartPagePrompt {
    lines: mpsc::Receiver<String>,
    timeout: Duration,
}

impl StartPagePrompt {
    /// Starts the stdin reader thread
    ///
    /// The thread ends on EOF, on a read error, or once the prompt is dropped.
    pub fn from_stdin(timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel(8);

        thread::spawn(move || {
            let stdin = io::stdin();
            loop {
                let mut line = String::new();
                match stdin.lock().read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!("Stopped reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        Self::from_lines(rx, timeout)
    }

    pub fn from_lines(lines: mpsc::Receiver<String>, timeout: Duration) -> Self {
        Self { lines, timeout }
    }

    /// Asks for a start page, waiting at most the configured timeout
    ///
    /// Lines typed before the question was shown are discarded.
    pub async fn ask(&mut self) -> u32 {
        while let Ok(stale) = self.lines.try_recv() {
            tracing::debug!("Discarding late answer '{}'", stale.trim());
        }

        print!(
            "Start page? [{}] ({}s to answer): ",
            DEFAULT_START_PAGE,
            self.timeout.as_secs()
        );
        let _ = io::stdout().flush();

        match tokio::time::timeout(self.timeout, self.lines.recv()).await {
            Ok(Some(answer)) => match parse_start_page(&answer) {
                Some(page) => page,
                None => {
                    if !answer.trim().is_empty() {
                        tracing::warn!("Ignoring invalid start page '{}'", answer.trim());
                    }
                    DEFAULT_START_PAGE
                }
            },
            Ok(None) => {
                println!();
                tracing::debug!("Stdin closed, starting from page {}", DEFAULT_START_PAGE);
                DEFAULT_START_PAGE
            }
            Err(_) => {
                println!();
                tracing::info!("No answer, starting from page {}", DEFAULT_START_PAGE);
                DEFAULT_START_PAGE
            }
        }
    }
}
