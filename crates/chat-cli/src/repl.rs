//! Line-oriented chat loop

use std::io::Write;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use chat_core::{
    chart::{self, ChartClient, ChartPanel, ChartRequest, Timeframe},
    detector::AssetId,
    ConversationManager, SubmitOutcome, SUGGESTIONS,
};

use crate::render;

const HELP: &str = "\
Commands:
  /chart [asset] [1D|1W|1M|3M|1Y]
                           Show a chart (defaults to the last discussed asset)
  /history                 Reprint the conversation
  /clear                   Delete the chat history
  /help                    Show this message
  /quit                    Exit";

/// One parsed input line
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Message(String),
    Chart {
        asset: Option<AssetId>,
        timeframe: Option<Timeframe>,
    },
    History,
    Clear,
    Help,
    Quit,
    /// Empty line or a command we could not parse
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Message(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        match parts.next().unwrap_or_default() {
            "quit" | "exit" => Self::Quit,
            "help" => Self::Help,
            "clear" => Self::Clear,
            "history" => Self::History,
            "chart" => Self::parse_chart(parts),
            other => Self::Invalid(format!("Unknown command: /{other}")),
        }
    }

    /// `/chart` arguments in any order; timeframes start with a digit
    fn parse_chart<'a>(args: impl Iterator<Item = &'a str>) -> Self {
        let mut asset = None;
        let mut timeframe = None;
        for arg in args {
            let parsed = if arg.starts_with(|c: char| c.is_ascii_digit()) {
                arg.parse::<Timeframe>().map(|tf| timeframe = Some(tf))
            } else {
                arg.parse::<AssetId>().map(|id| asset = Some(id))
            };
            if let Err(e) = parsed {
                return Self::Invalid(e.user_message());
            }
        }
        Self::Chart { asset, timeframe }
    }
}

/// Accepts "y" or "yes", anything else declines
pub fn confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

struct Session<'a> {
    manager: &'a ConversationManager,
    chart: &'a dyn ChartClient,
    panel: ChartPanel,
}

impl Session<'_> {
    async fn show_chart(&mut self, asset: AssetId, timeframe: Option<Timeframe>) {
        let mut requests: Vec<ChartRequest> = Vec::new();
        requests.extend(self.panel.set_asset(Some(asset)));
        if let Some(tf) = timeframe {
            requests.extend(self.panel.set_timeframe(tf));
        }
        if requests.is_empty() {
            requests.extend(self.panel.refresh());
        }

        // Only the last request still matches the panel
        for request in requests {
            let result = chart::fetch(self.chart, request).await;
            self.panel.apply(request, result);
        }
        println!("{}\n", render::chart(&self.panel));
    }

    async fn send(&mut self, text: &str) {
        println!("Thinking...");
        match self.manager.submit_user_message(text).await {
            SubmitOutcome::Ignored => {}
            SubmitOutcome::Busy => println!("Still waiting on the previous reply."),
            SubmitOutcome::Answered | SubmitOutcome::Failed => {
                let transcript = self.manager.transcript();
                let Some(reply) = transcript.last() else {
                    return;
                };
                println!("{}\n", render::turn(reply, Utc::now()));
                if let Some(asset) = reply.chart_asset() {
                    self.show_chart(asset, None).await;
                }
            }
        }
    }

    fn history(&self) {
        let now = Utc::now();
        for turn in self.manager.transcript().turns() {
            println!("{}\n", render::turn(turn, now));
        }
    }
}

fn prompt(manager: &ConversationManager) -> std::io::Result<()> {
    let mut out = std::io::stdout();
    write!(out, "{}> ", render::badge(manager.current_asset()))?;
    out.flush()
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<Option<String>> {
    Ok(lines.next_line().await?)
}

/// Run the chat loop until `/quit` or end of input
pub async fn run(manager: &ConversationManager, chart: &dyn ChartClient) -> anyhow::Result<()> {
    let mut session = Session { manager, chart, panel: ChartPanel::new() };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    session.history();
    println!("Try: {}", SUGGESTIONS.join(" · "));
    println!("Type /help for commands.\n");

    loop {
        prompt(manager)?;
        let Some(line) = read_line(&mut lines).await? else {
            break;
        };

        match Command::parse(&line) {
            Command::Message(text) if text.is_empty() => {}
            Command::Message(text) => session.send(&text).await,
            Command::Chart { asset, timeframe } => {
                match asset.or_else(|| manager.transcript().latest_chart_asset()) {
                    Some(asset) => session.show_chart(asset, timeframe).await,
                    None => println!("{}\n", render::chart(&ChartPanel::new())),
                }
            }
            Command::History => session.history(),
            Command::Clear => {
                print!("Are you sure you want to clear all chat history? [y/N] ");
                std::io::stdout().flush()?;
                let answer = read_line(&mut lines).await?.unwrap_or_default();
                if confirmed(&answer) {
                    manager.clear();
                    session.panel = ChartPanel::new();
                    session.history();
                }
            }
            Command::Help => println!("{HELP}\n"),
            Command::Quit => break,
            Command::Invalid(message) => println!("{message}\n"),
        }
    }

    tracing::debug!(turns = manager.transcript().len(), "Chat loop finished");
    Ok(())
}
