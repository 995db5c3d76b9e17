//! Interactive `watch` command: stdin lines stand in for search-box edits.

use std::sync::Arc;

use pricescout_core::AppConfig;
use pricescout_dispatch::DispatchConfig;
use pricescout_scraper::ProductSearch;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::output::TerminalPresenter;

/// What one line of input means.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum WatchInput {
    /// New text of the search box.
    Edit(String),
    /// Search for the current text now.
    Submit,
    Quit,
}

pub(crate) fn parse_line(line: &str) -> WatchInput {
    match line.trim_end_matches(['\r', '\n']) {
        "!" => WatchInput::Submit,
        ":q" => WatchInput::Quit,
        text => WatchInput::Edit(text.to_owned()),
    }
}

/// Runs the dispatcher against stdin until `:q` or end of input.
///
/// `:q` abandons any pending search. End of input runs the pending search,
/// if any, and waits for its result before returning.
///
/// # Errors
///
/// Returns an error if the search client cannot be built, stdin cannot be
/// read, or the dispatcher task panics.
pub(crate) async fn run_watch(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let search = Arc::new(ProductSearch::from_config(config)?);
    let presenter = TerminalPresenter::new(std::io::stdout(), json);
    let (handle, task) =
        pricescout_dispatch::spawn(search, presenter, DispatchConfig::from_app_config(config));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut current = String::new();
    let mut quit = false;
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            WatchInput::Edit(text) => {
                current.clone_from(&text);
                handle.query_changed(text).await?;
            }
            WatchInput::Submit => handle.submit(current.clone()).await?,
            WatchInput::Quit => {
                quit = true;
                break;
            }
        }
    }

    if quit {
        handle.close().await?;
    } else {
        handle.finish().await?;
    }
    task.await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_edits() {
        assert_eq!(parse_line("4k tv"), WatchInput::Edit("4k tv".to_owned()));
        assert_eq!(parse_line(""), WatchInput::Edit(String::new()));
        assert_eq!(parse_line(" ! "), WatchInput::Edit(" ! ".to_owned()));
    }

    #[test]
    fn bang_submits_and_colon_q_quits() {
        assert_eq!(parse_line("!"), WatchInput::Submit);
        assert_eq!(parse_line("!\r"), WatchInput::Submit);
        assert_eq!(parse_line(":q"), WatchInput::Quit);
    }
}
