use std::borrow::Cow::{self, Borrowed, Owned};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use helpline_application::{
    AuthService, ConnectivityMonitor, MessageSynchronizer, ScheduleConfig, SyncScheduler,
};
use helpline_core::backend::ChatBackend;
use helpline_core::config::ClientConfig;
use helpline_core::credential::{CredentialStore, InMemoryCredentialStore};
use helpline_core::event::event_channel;
use helpline_core::identity::Session;
use helpline_core::transcript::EventProjector;
use helpline_infrastructure::config_service::validate;
use helpline_infrastructure::{ConfigService, FileCredentialStore, HelplinePaths};
use helpline_interaction::HttpChatBackend;

mod commands;
mod renderer;

use commands::{Command, SLASH_COMMANDS, help_text, hint_for};
use renderer::{LineSink, PromptSink, StdoutSink, TerminalRenderer};

#[derive(Parser, Debug)]
#[command(name = "helpline", version, about = "Terminal client for the customer support chat")]
struct Args {
    /// Backend root URL (overrides config and HELPLINE_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Email the conversation is tied to
    #[arg(long)]
    email: Option<String>,

    /// Path to an alternative config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep the login token in memory only
    #[arg(long)]
    ephemeral: bool,
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: SLASH_COMMANDS.iter().map(|(name, _)| name.to_string()).collect(),
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

        if line.starts_with('/') && !line.contains(' ') {
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

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        // Only hint at the end of the line.
        if pos < line.len() {
            return None;
        }
        hint_for(line)
    }
}

impl Validator for CliHelper {}

/// Sends tracing output to `logs/helpline.log` so it never interleaves with the transcript.
fn init_logging(paths: &HelplinePaths) -> Result<()> {
    fs::create_dir_all(paths.log_dir())
        .with_context(|| format!("Failed to create {}", paths.log_dir().display()))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths.log_file())
        .with_context(|| format!("Failed to open {}", paths.log_file().display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("helpline=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

fn load_config(args: &Args, paths: &HelplinePaths) -> Result<ClientConfig> {
    let path = args.config.clone().unwrap_or_else(|| paths.config_file());
    resolve_config(args, path, |key| env::var(key).ok())
}

/// File, then environment, then flags; validated once all layers are applied.
fn resolve_config<F>(args: &Args, path: PathBuf, lookup: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ConfigService::with_path(path.clone())
        .load_layers(lookup)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.trim().trim_end_matches('/').to_string();
    }
    if let Some(email) = &args.email {
        config.customer_email = Some(email.trim().to_string());
    }
    validate(&config)
        .with_context(|| format!("Invalid configuration (file {})", path.display()))?;
    Ok(config)
}

/// The main entry point for the Helpline REPL.
///
/// Wires the synchronization engine to a terminal renderer:
/// 1. Loads config and picks the credential store
/// 2. Starts the poll and health tickers
/// 3. Projects engine events onto the terminal from a background task
/// 4. Dispatches REPL input without blocking on sends
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // ===== Configuration =====
    let paths = HelplinePaths::new(None).map_err(|e| anyhow!("{}", e))?;
    if let Err(e) = init_logging(&paths) {
        eprintln!("{}", format!("Logging disabled: {:#}", e).yellow());
    }
    let config = load_config(&args, &paths)?;

    let credentials: Arc<dyn CredentialStore> = if args.ephemeral {
        Arc::new(InMemoryCredentialStore::new())
    } else {
        Arc::new(FileCredentialStore::with_path(paths.credential_file()))
    };
    let backend: Arc<dyn ChatBackend> = Arc::new(
        HttpChatBackend::new(config.base_url.clone()).with_timeout(config.request_timeout()),
    );

    // ===== REPL Setup =====
    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    let sink: Box<dyn LineSink> = match rl.create_external_printer() {
        Ok(printer) => Box::new(PromptSink::new(printer)),
        Err(e) => {
            tracing::debug!("[Repl] External printer unavailable: {}", e);
            Box::new(StdoutSink)
        }
    };

    // ===== Engine =====
    let (events_tx, events_rx) = event_channel();
    let projector = tokio::spawn(EventProjector::new(TerminalRenderer::new(sink)).run(events_rx));

    let session = Session::new();
    tracing::info!(
        "[Repl] Session {} against {}",
        session.id(),
        config.base_url
    );

    let synchronizer = Arc::new(MessageSynchronizer::new(
        backend.clone(),
        credentials.clone(),
        session,
        events_tx.clone(),
    ));
    let monitor = Arc::new(ConnectivityMonitor::new(backend.clone(), events_tx));
    let auth = AuthService::new(backend, credentials);

    let (recipient_tx, recipient_rx) =
        watch::channel(config.customer_email.clone().unwrap_or_default());

    let scheduler = SyncScheduler::start(
        synchronizer.clone(),
        monitor.clone(),
        recipient_rx,
        ScheduleConfig {
            poll_interval: config.poll_interval(),
            health_interval: config.health_interval(),
        },
    );

    println!("{}", "=== Helpline ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a message to chat with support, '/help' for commands, or 'quit' to exit."
            .bright_black()
    );
    if recipient_tx.borrow().is_empty() {
        println!(
            "{}",
            "No email set yet. Use '/email <address>' before chatting.".yellow()
        );
    }
    println!();

    // ===== Main REPL Loop =====
    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let command = Command::parse(&line);
                if !matches!(command, Command::Empty | Command::Login { .. }) {
                    let _ = rl.add_history_entry(line.trim());
                }

                match command {
                    Command::Empty => continue,
                    Command::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Command::Send(text) => {
                        let recipient = recipient_tx.borrow().clone();
                        if recipient.is_empty() {
                            println!(
                                "{}",
                                "Set your email first with '/email <address>'.".yellow()
                            );
                            continue;
                        }
                        let synchronizer = Arc::clone(&synchronizer);
                        tokio::spawn(async move {
                            synchronizer.send(&text, &recipient).await;
                        });
                    }
                    Command::Email(None) => {
                        let current = recipient_tx.borrow().clone();
                        if current.is_empty() {
                            println!("{}", "No email set.".bright_black());
                        } else {
                            println!("{}", format!("Email: {}", current).bright_black());
                        }
                    }
                    Command::Email(Some(address)) => {
                        recipient_tx.send_replace(address.clone());
                        println!("{}", format!("Email set to {}", address).green());
                    }
                    Command::Login { email, password } => match auth.login(&email, &password).await {
                        Ok(()) => {
                            recipient_tx.send_replace(email.clone());
                            println!("{}", format!("Logged in as {}", email).green());
                        }
                        Err(e) => println!("{}", format!("Login failed: {}", e).red()),
                    },
                    Command::Logout => {
                        auth.logout().await;
                        println!("{}", "Logged out.".green());
                    }
                    Command::Status => {
                        let recipient = recipient_tx.borrow().clone();
                        println!("{}", format!("Session:      {}", synchronizer.session()).bright_black());
                        println!(
                            "{}",
                            format!(
                                "Email:        {}",
                                if recipient.is_empty() { "(not set)" } else { recipient.as_str() }
                            )
                            .bright_black()
                        );
                        println!(
                            "{}",
                            format!("Backend:      {} ({})", config.base_url, monitor.state().label())
                                .bright_black()
                        );
                        println!(
                            "{}",
                            format!("Logged in:    {}", auth.is_logged_in().await).bright_black()
                        );
                    }
                    Command::Help => println!("{}", help_text().bright_black()),
                    Command::Invalid(reason) => println!("{}", reason.yellow()),
                }
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

    // Stop ticking, then release the engine's senders so the projector drains.
    scheduler.shutdown().await;
    drop(synchronizer);
    drop(monitor);
    if tokio::time::timeout(Duration::from_secs(2), projector)
        .await
        .is_err()
    {
        tracing::debug!("[Repl] Requests still in flight at exit");
    }

    Ok(())
}
