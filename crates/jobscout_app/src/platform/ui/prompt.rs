use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};

pub const STOP_QUESTION: &str =
    "Stop the scraper? This immediately halts the current scraping session. [y/N]";
pub const CLEAR_HISTORY_QUESTION: &str =
    "Delete all of your scraping history? This cannot be undone. [y/N]";

/// Line reader over stdin for yes/no answers.
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(stdin()).lines(),
        }
    }

    /// Cancel safe. `None` once stdin is closed.
    pub async fn answer(&mut self) -> Option<bool> {
        match self.lines.next_line().await {
            Ok(Some(line)) => Some(is_affirmative(&line)),
            Ok(None) | Err(_) => None,
        }
    }

    pub async fn confirm(&mut self, question: &str) -> bool {
        println!("{question}");
        self.answer().await.unwrap_or(false)
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
