//! One assistant session: per-turn routing and the conversation transcript

use crate::dispatcher::{CommandDispatcher, Reply, is_verb};
use crate::llm::TextCompleter;
use crate::reviewer::ResponseReviewer;
use crate::router::{Tool, select_tool};
use crate::search::{SearchProvider, SearchResult, format_results};
use crate::weather::WeatherProvider;
use tracing::{info, warn};

/// Exchanges included as context when composing search answers
const CONTEXT_EXCHANGES: usize = 5;

/// One user line and the reply that was printed for it
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub user: String,
    pub assistant: String,
}

/// Append-only record of the session, kept in memory only
#[derive(Debug, Default)]
pub struct Transcript {
    exchanges: Vec<Exchange>,
}

impl Transcript {
    pub fn push(&mut self, user: &str, assistant: &str) {
        self.exchanges.push(Exchange {
            user: user.to_string(),
            assistant: assistant.to_string(),
        });
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// The last `count` exchanges, oldest first
    pub fn recent(&self, count: usize) -> &[Exchange] {
        let start = self.exchanges.len().saturating_sub(count);
        &self.exchanges[start..]
    }
}

/// What a single input line produced
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Blank line, nothing to do
    Empty,
    /// The user asked to leave
    Exit,
    Reply(String),
}

/// Routes each line to the dispatcher, the weather handler or web search
pub struct Assistant<P, S, C> {
    dispatcher: CommandDispatcher<P>,
    search: S,
    completer: C,
    transcript: Transcript,
}

impl<P, S, C> Assistant<P, S, C>
where
    P: WeatherProvider,
    S: SearchProvider,
    C: TextCompleter,
{
    pub fn new(dispatcher: CommandDispatcher<P>, search: S, completer: C) -> Self {
        Self {
            dispatcher,
            search,
            completer,
            transcript: Transcript::default(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn dispatcher(&self) -> &CommandDispatcher<P> {
        &self.dispatcher
    }

    pub fn handle_line(&mut self, line: &str) -> TurnOutcome {
        let line = line.trim();
        let Some(first) = line.split_whitespace().next() else {
            return TurnOutcome::Empty;
        };

        if matches!(first.to_lowercase().as_str(), "exit" | "quit") {
            return TurnOutcome::Exit;
        }

        let reply = if is_verb(line) {
            self.finish(self.dispatcher.dispatch(line), line)
        } else {
            let tool = select_tool(line);
            info!("Selected tool {}", tool);
            match tool {
                Tool::Weather => self.finish(self.dispatcher.answer(line), line),
                Tool::Search => self.search_answer(line),
            }
        };

        self.transcript.push(line, &reply);
        TurnOutcome::Reply(reply)
    }

    fn finish(&self, reply: Reply, query: &str) -> String {
        match reply {
            Reply::Draft(draft) => ResponseReviewer::new(&self.completer).review(&draft, query),
            Reply::Final(text) => text,
        }
    }

    fn search_answer(&self, query: &str) -> String {
        let results = match self.search.search(query) {
            Ok(results) => results,
            Err(e) => {
                warn!("Search failed: {}", e);
                return format!("An error occurred while processing your query: {e}");
            }
        };

        if results.is_empty() {
            return format_results(&results);
        }

        let prompt = search_prompt(query, &results, self.transcript.recent(CONTEXT_EXCHANGES));
        match self.completer.complete(&prompt) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => format_results(&results),
            Err(e) => {
                warn!("Could not summarise search results: {}", e);
                format_results(&results)
            }
        }
    }
}

fn search_prompt(query: &str, results: &[SearchResult], history: &[Exchange]) -> String {
    let mut prompt = String::from("You are a helpful assistant. Answer the user's question using the search results below.\n");

    if !history.is_empty() {
        prompt.push_str("\nConversation so far:\n");
        for exchange in history {
            prompt.push_str(&format!(
                "User: {}\nAssistant: {}\n",
                exchange.user, exchange.assistant
            ));
        }
    }

    prompt.push_str(&format!("\nQuestion: {query}\n\nSearch results:\n"));
    for (index, result) in results.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", index + 1, result));
    }
    prompt.push_str("\nAnswer concisely and mention the sources you used.");
    prompt
}
