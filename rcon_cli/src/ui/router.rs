use std::future::Future;
use std::pin::Pin;

use log::{debug, warn};
use rcon_core::core::Prompter;
use rcon_core::storage::{
    parse_port, CacheError, CacheLoad, RemoveOutcome, StorageError, DEFAULT_PORT,
};
use rcon_core::{Console, RconError, SessionError};

use super::completion::{prefixed, split_at_cursor, CompletionContext, SOURCEMOD};
use super::output;

/// Suggestions for the token being typed, given the tokens before it.
pub type Completer = fn(&CompletionContext, &[&str], &str) -> Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Connect,
    Disconnect,
    Favorite,
    Update,
    Search,
    Help,
    SystemHelp,
    Exit,
}

/// One entry of the built-in command registry.
pub struct Builtin {
    /// Primary name first, then aliases.
    pub names: &'static [&'static str],
    pub action: Action,
    pub usage: &'static str,
    pub summary: &'static str,
    pub completer: Option<Completer>,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        self.names[0]
    }
}

pub static BUILTINS: &[Builtin] = &[
    Builtin {
        names: &["connect", "c"],
        action: Action::Connect,
        usage: "connect {server|favorite} [password] [port]",
        summary: "connect to an rcon server",
        completer: Some(complete_connect),
    },
    Builtin {
        names: &["disconnect", "d"],
        action: Action::Disconnect,
        usage: "disconnect",
        summary: "disconnect from a server",
        completer: None,
    },
    Builtin {
        names: &["favorite", "f"],
        action: Action::Favorite,
        usage: "favorite {list|add|delete <alias>}",
        summary: "manage saved servers",
        completer: Some(complete_favorite),
    },
    Builtin {
        names: &["update"],
        action: Action::Update,
        usage: "update",
        summary: "update the local autocomplete cache",
        completer: None,
    },
    Builtin {
        names: &["search"],
        action: Action::Search,
        usage: "search <pattern>",
        summary: "search cached server commands with a glob such as sv_*",
        completer: None,
    },
    Builtin {
        names: &["help", "?"],
        action: Action::Help,
        usage: "help [topic]",
        summary: "displays help; while connected the server's help is shown instead",
        completer: Some(complete_topic),
    },
    Builtin {
        names: &["systemhelp"],
        action: Action::SystemHelp,
        usage: "systemhelp [topic]",
        summary: "console help, even when connected",
        completer: Some(complete_topic),
    },
    Builtin {
        names: &["exit", "q"],
        action: Action::Exit,
        usage: "exit",
        summary: "terminates the application",
        completer: None,
    },
];

const TUTORIAL: &str = "\
Welcome to the console, a command line RCON tool.

To connect type:
> connect tf.example.com
You will then be prompted for your password, enter it.

Now you can just enter commands at the terminal.
Save servers with 'favorite add' and connect to them by alias.";

/// Every name a built-in answers to, sorted, for first-token completion.
pub fn builtin_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = BUILTINS
        .iter()
        .flat_map(|b| b.names.iter().copied())
        .filter(|name| name.chars().all(|c| c.is_ascii_alphanumeric()))
        .collect();
    names.sort_unstable();
    names
}

fn complete_connect(ctx: &CompletionContext, preceding: &[&str], partial: &str) -> Vec<String> {
    match preceding.len() {
        1 => prefixed(ctx.favorites.iter().map(String::as_str), partial),
        _ => Vec::new(),
    }
}

fn complete_favorite(ctx: &CompletionContext, preceding: &[&str], partial: &str) -> Vec<String> {
    match preceding {
        [_] => prefixed(["list", "add", "delete"], partial),
        [_, "delete"] => prefixed(ctx.favorites.iter().map(String::as_str), partial),
        _ => Vec::new(),
    }
}

fn complete_topic(_ctx: &CompletionContext, preceding: &[&str], partial: &str) -> Vec<String> {
    match preceding.len() {
        1 => prefixed(builtin_names().into_iter().chain(["tutorial"]), partial),
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Resolves when the operator asks to abandon the remote call in flight.
pub type Interrupt = fn() -> Pin<Box<dyn Future<Output = ()>>>;

/// The production [`Interrupt`]: Ctrl-C. If the signal handler cannot be
/// installed, calls are simply never interrupted.
pub fn ctrl_c() -> Pin<Box<dyn Future<Output = ()>>> {
    Box::pin(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl-C cannot interrupt remote calls: {e}");
            std::future::pending::<()>().await;
        }
    })
}

/// Where a typed line goes.
pub enum Route<'a> {
    Empty,
    Builtin {
        builtin: &'static Builtin,
        /// Arguments with surrounding quotes removed.
        args: Vec<&'a str>,
        /// Everything after the command word, as typed.
        rest: &'a str,
    },
    /// Anything that is not a built-in, sent to the server as typed.
    Passthrough(&'a str),
}

/// Maps lines to built-ins or remote passthrough, and completes them.
#[derive(Clone, Copy)]
pub struct CommandRouter {
    builtins: &'static [Builtin],
    interrupt: Interrupt,
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRouter {
    pub fn new() -> Self {
        Self {
            builtins: BUILTINS,
            interrupt: ctrl_c,
        }
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn lookup(&self, token: &str) -> Option<&'static Builtin> {
        self.builtins.iter().find(|b| b.names.contains(&token))
    }

    pub fn resolve<'a>(&self, line: &'a str) -> Route<'a> {
        let trimmed = line.trim();
        let mut tokens = trimmed.split_whitespace();
        let Some(first) = tokens.next() else {
            return Route::Empty;
        };
        match self.lookup(first) {
            Some(builtin) => Route::Builtin {
                builtin,
                args: tokens.map(unquote).collect(),
                rest: trimmed[first.len()..].trim_start(),
            },
            None => Route::Passthrough(trimmed),
        }
    }

    /// Runs one line to completion.
    pub async fn execute(
        &self,
        console: &mut Console,
        prompter: &mut dyn Prompter,
        line: &str,
    ) -> Flow {
        match self.resolve(line) {
            Route::Empty => Flow::Continue,
            Route::Passthrough(text) => {
                passthrough(console, text, self.interrupt).await;
                Flow::Continue
            }
            Route::Builtin {
                builtin,
                args,
                rest,
            } => {
                debug!("built-in '{}' with {:?}", builtin.name(), args);
                match builtin.action {
                    Action::Connect => connect(console, prompter, &args, self.interrupt).await,
                    Action::Disconnect => disconnect(console),
                    Action::Favorite => favorite(console, prompter, &args),
                    Action::Update => update(console, self.interrupt).await,
                    Action::Search => search(console, &args),
                    Action::Help if console.is_connected() => {
                        let text = format!("help {rest}");
                        passthrough(console, text.trim_end(), self.interrupt).await;
                    }
                    Action::Help | Action::SystemHelp => self.help(args.first().copied()),
                    Action::Exit => return Flow::Exit,
                }
                Flow::Continue
            }
        }
    }

    /// Returns the byte offset to replace from and the candidates.
    pub fn complete(&self, ctx: &CompletionContext, line: &str, pos: usize) -> (usize, Vec<String>) {
        let cursor = split_at_cursor(line, pos);
        let candidates = match cursor.preceding.first() {
            None => {
                let mut names = prefixed(builtin_names(), cursor.partial);
                names.extend(prefixed(ctx.remote.iter().map(String::as_str), cursor.partial));
                names
            }
            Some(first) => match self.lookup(first) {
                Some(builtin) => builtin
                    .completer
                    .map(|complete| complete(ctx, &cursor.preceding, cursor.partial))
                    .unwrap_or_default(),
                None if ctx.connected && *first == SOURCEMOD.root => {
                    SOURCEMOD.suggest(&cursor.preceding, cursor.partial)
                }
                None => Vec::new(),
            },
        };
        (cursor.start, candidates)
    }

    fn help(&self, topic: Option<&str>) {
        match topic {
            None => {
                output::heading("Documented commands (type help <topic>):");
                for builtin in self.builtins {
                    output::plain(&format!("  {:<12} {}", builtin.name(), builtin.summary));
                }
                output::plain("Anything else is sent to the connected server.");
            }
            Some("tutorial") => output::plain(TUTORIAL),
            Some(topic) => match self.lookup(topic) {
                Some(builtin) => {
                    output::plain(&format!("syntax: {} -- {}", builtin.usage, builtin.summary));
                    if builtin.name() != topic {
                        output::plain(&format!("Note: Alias for '{}'", builtin.name()));
                    }
                    if builtin.action == Action::Help {
                        output::plain("Use 'systemhelp' for this help while connected.");
                    }
                }
                None => output::error(&format!("*** No help on {topic}")),
            },
        }
    }
}

fn unquote(token: &str) -> &str {
    token.trim_matches(|c: char| c == '"' || c == '\'')
}

/// Runs `future` unless `interrupt` fires first. The session only changes
/// once a call completes, so dropping the future leaves it consistent.
async fn interruptible<F: Future>(future: F, interrupt: Interrupt) -> Option<F::Output> {
    tokio::select! {
        output = future => Some(output),
        _ = interrupt() => None,
    }
}

/// What the operator is left with after an interrupt.
fn interrupted_notice(console: &Console) -> String {
    match console.session().endpoint() {
        Some(endpoint) => format!("Interrupted; connected to {endpoint}."),
        None => "Interrupted; not connected.".to_string(),
    }
}

async fn passthrough(console: &mut Console, text: &str, interrupt: Interrupt) {
    if !console.is_connected() {
        output::warning("*** Use \"connect\" to connect to a server first!");
        return;
    }
    match interruptible(console.dispatch(text), interrupt).await {
        Some(Ok(response)) => output::remote(&response),
        Some(Err(e @ SessionError::Invalidated { .. })) => output::error(&format!("== {e} ==")),
        Some(Err(SessionError::Transient(e @ RconError::CommandTooLong { .. }))) => {
            output::warning(&format!("Not sent: {e}."))
        }
        Some(Err(e)) => output::error(&format!(
            "Something went wrong when issuing your command: {e}"
        )),
        None => output::warning(&interrupted_notice(console)),
    }
}

async fn connect(
    console: &mut Console,
    prompter: &mut dyn Prompter,
    args: &[&str],
    interrupt: Interrupt,
) {
    let Some(identifier) = args.first().copied() else {
        output::error("syntax: connect {server|favorite} [password] [port]");
        return;
    };
    let password = args.get(1).map(|p| p.to_string());
    let port = args.get(2).map(|text| {
        parse_port(text).unwrap_or_else(|e| {
            output::warning(&format!("{e}. Defaulting to {DEFAULT_PORT}."));
            DEFAULT_PORT
        })
    });

    output::plain(&format!("Connecting to {identifier}..."));
    match interruptible(console.connect(identifier, password, port, prompter), interrupt).await {
        Some(Ok(report)) => {
            output::success(&format!("== Connected to {}! ==", report.endpoint));
            report_cache(&report.endpoint.address, &report.cache);
        }
        Some(Err(SessionError::Input(e))) => output::warning(&format!("Connect cancelled: {e}")),
        Some(Err(e)) => output::error(&format!("ERROR: {e}")),
        None => output::warning(&interrupted_notice(console)),
    }
}

fn report_cache(host: &str, cache: &Result<CacheLoad, CacheError>) {
    match cache {
        Ok(CacheLoad::Loaded(n)) => output::plain(&format!("Loaded {n} cached commands for {host}.")),
        Ok(CacheLoad::Built(n)) => output::plain(&format!(
            "Cache file not found... cached {n} commands for {host}."
        )),
        Ok(CacheLoad::Regenerated { names, cause }) => output::warning(&format!(
            "Error reading autocomplete cache ({cause}). Regenerated {names} commands."
        )),
        Err(e) => output::error(&format!("Could not build the autocomplete cache: {e}")),
    }
}

fn disconnect(console: &mut Console) {
    match console.disconnect() {
        Some(endpoint) => output::plain(&format!("Disconnected from {}.", endpoint.address)),
        None => output::plain("Not connected."),
    }
}

fn favorite(console: &mut Console, prompter: &mut dyn Prompter, args: &[&str]) {
    match args {
        ["list", ..] => output::favorites(&console.favorites().list()),
        ["add", ..] => match console.favorites_mut().add(prompter) {
            Ok(Some(alias)) => output::success(&format!("Saved {alias} to your favorites.")),
            Ok(None) => output::plain("Aborted; favorites unchanged."),
            Err(StorageError::Input(e)) => output::warning(&format!("Cancelled: {e}")),
            Err(e) => output::error(&format!("ERROR: {e}")),
        },
        ["delete", alias, ..] => match console.favorites_mut().delete(alias) {
            Ok(RemoveOutcome::Removed) => {
                output::success(&format!("Removed {alias} from your favorites."))
            }
            Ok(RemoveOutcome::NotFound) => {
                output::error(&format!("ERROR: {alias} was not in your favorites."))
            }
            Err(e) => output::error(&format!("ERROR: {e}")),
        },
        ["delete"] => output::error("syntax: favorite delete <alias>"),
        _ => output::error("Invalid favorite command. Type 'help favorite' for usage."),
    }
}

async fn update(console: &mut Console, interrupt: Interrupt) {
    let Some(host) = console.session().host().map(str::to_string) else {
        output::warning("Can't update without being connected to a server...");
        output::plain("Type 'help connect' for help connecting to one.");
        return;
    };
    output::plain(&format!("Caching autocomplete for {host}..."));
    match interruptible(console.update(), interrupt).await {
        Some(Ok(n)) => output::success(&format!("Done! {n} commands cached.")),
        Some(Err(e)) => output::error(&format!("ERROR: {e}")),
        None => output::warning("Interrupted; the previous cache is kept."),
    }
}

fn search(console: &Console, args: &[&str]) {
    let Some(pattern) = args.first() else {
        output::error("syntax: search <pattern>");
        return;
    };
    match console.search(pattern) {
        Ok(matches) if matches.is_empty() => {
            output::warning(&format!("No cached commands match {pattern}."))
        }
        Ok(matches) => {
            output::plain(&format!("Found {} matches:", matches.len()));
            output::plain(&matches.join("\n"));
        }
        Err(e) => output::error(&format!("Invalid pattern {pattern}: {e}")),
    }
}
