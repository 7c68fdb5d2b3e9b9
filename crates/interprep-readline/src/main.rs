use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use tracing::{info, warn};

use interprep_application::{MessageHandler, Reply, Repositories};
use interprep_core::session::InMemorySessionStore;
use interprep_infrastructure::memory::{
    InMemoryAssessmentRepository, InMemoryInterviewRepository, InMemoryPlanRepository,
    InMemoryReviewRepository, InMemoryUserRepository,
};
use interprep_infrastructure::sqlite::{
    SqliteAssessmentRepository, SqliteInterviewRepository, SqlitePlanRepository,
    SqliteReviewRepository, SqliteUserRepository, connect, init_schema,
};
use interprep_interaction::{GenerationAgent, GigaChatApiAgent, ScriptedAgent};

/// Abandoned sessions reset to idle after this much inactivity.
const SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// User identifier for the single-user REPL session.
const REPL_USER: &str = "repl-user";

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: [
                "/assess",
                "/plan",
                "/interview",
                "/review",
                "/progress",
                "/begin",
                "/cancel",
                "/help",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Picks the generation backend: the GigaChat API when credentials are
/// present, otherwise the scripted offline agent.
fn build_agent() -> Arc<dyn GenerationAgent> {
    match GigaChatApiAgent::try_from_env() {
        Ok(agent) => {
            info!("using GigaChat generation backend");
            Arc::new(agent)
        }
        Err(err) => {
            warn!(error = %err, "GigaChat credentials unavailable, using scripted responses");
            println!(
                "{}",
                "No GIGACHAT_CLIENT_SECRET set; running with canned responses.".yellow()
            );
            Arc::new(ScriptedAgent::new())
        }
    }
}

/// Picks the persistence backend: SQLite when `INTERPREP_DB_URL` is
/// set, otherwise in-memory stores that vanish on exit.
async fn build_repositories() -> Result<Repositories> {
    match std::env::var("INTERPREP_DB_URL") {
        Ok(url) => {
            info!(url, "using SQLite persistence");
            let pool = connect(&url).await?;
            init_schema(&pool).await?;
            Ok(Repositories {
                users: Arc::new(SqliteUserRepository::new(pool.clone())),
                assessments: Arc::new(SqliteAssessmentRepository::new(pool.clone())),
                plans: Arc::new(SqlitePlanRepository::new(pool.clone())),
                interviews: Arc::new(SqliteInterviewRepository::new(pool.clone())),
                reviews: Arc::new(SqliteReviewRepository::new(pool)),
            })
        }
        Err(_) => {
            warn!("INTERPREP_DB_URL not set, history will not survive restarts");
            Ok(Repositories {
                users: Arc::new(InMemoryUserRepository::new()),
                assessments: Arc::new(InMemoryAssessmentRepository::new()),
                plans: Arc::new(InMemoryPlanRepository::new()),
                interviews: Arc::new(InMemoryInterviewRepository::new()),
                reviews: Arc::new(InMemoryReviewRepository::new()),
            })
        }
    }
}

fn print_reply(reply: &Reply) {
    for line in reply.text.lines() {
        println!("{}", line.bright_blue());
    }
    if !reply.quick_replies.is_empty() {
        let hints: Vec<String> = reply
            .quick_replies
            .iter()
            .map(|option| format!("[{option}]"))
            .collect();
        println!("{}", hints.join(" ").bright_black());
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let agent = build_agent();
    let repositories = build_repositories().await?;
    let sessions = Arc::new(InMemorySessionStore::with_ttl(SESSION_TTL));
    let handler = MessageHandler::new(agent, sessions, repositories);

    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== InterPrep REPL ===".bright_magenta().bold());
    println!(
        "{}",
        "Type '/help' for commands, or just say what you want. 'quit' to exit.".bright_black()
    );
    println!();

    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                let reply = handler.handle_message(REPL_USER, trimmed).await;
                print_reply(&reply);
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
