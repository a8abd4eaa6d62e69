use async_trait::async_trait;
use gamescout_common::Result;
use gamescout_web::GameSearch;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const RULE_WIDTH: usize = 60;
const TITLE: &str = "   CONSOLE GAME POPULARITY SEARCH";
pub const PROMPT: &str = "Enter a game console name (or 'quit' to exit): ";
const EMPTY_REMINDER: &str = "Please enter a valid console name.";
const FAREWELL: &str = "Thank you for using the Console Game Search!";

/// Anything that can turn a console name into printable search results.
#[async_trait]
pub trait ConsoleSearch: Send + Sync {
    async fn search_text(&self, console: &str) -> String;
}

#[async_trait]
impl ConsoleSearch for GameSearch {
    async fn search_text(&self, console: &str) -> String {
        GameSearch::search_text(self, console).await
    }
}

/// One line of user input, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Quit,
    Empty,
    Search(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") {
            Command::Quit
        } else if trimmed.is_empty() {
            Command::Empty
        } else {
            Command::Search(trimmed)
        }
    }
}

/// Prompt, search, print; until `quit` or end of input.
pub async fn run_session<R, W, S>(mut input: R, output: &mut W, searcher: &S) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: ConsoleSearch + ?Sized,
{
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    emit(output, &format!("{heavy}\n{TITLE}\n{heavy}\n\n")).await?;
    tracing::info!(target: "session", "session.start");

    let mut searches = 0usize;
    let mut raw = Vec::new();
    loop {
        emit(output, PROMPT).await?;

        raw.clear();
        if input.read_until(b'\n', &mut raw).await? == 0 {
            tracing::info!(target: "session", searches, "session.eof");
            emit(output, &format!("\n{FAREWELL}\n")).await?;
            break;
        }
        // Terminals can hand us bytes that are not UTF-8; keep the session alive.
        let line = String::from_utf8_lossy(&raw);

        match Command::parse(&line) {
            Command::Quit => {
                tracing::info!(target: "session", searches, "session.quit");
                emit(output, &format!("\n{FAREWELL}\n")).await?;
                break;
            }
            Command::Empty => {
                emit(output, &format!("{EMPTY_REMINDER}\n\n")).await?;
            }
            Command::Search(console) => {
                emit(
                    output,
                    &format!("\nSearching for the most popular game on {console}...\n{light}\n"),
                )
                .await?;
                let results = searcher.search_text(console).await;
                searches += 1;
                emit(output, &format!("{results}\n{light}\n\n")).await?;
            }
        }
    }
    Ok(())
}

async fn emit<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}
