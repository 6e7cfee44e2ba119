use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{ArgAction, Parser};
use log::{info, warn};
use rcon_core::core::AppContext;
use rcon_core::storage::LoadStatus;
use rcon_core::{Console, SourceRconConnector};
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, Editor};

use super::editor::ConsoleHelper;
use super::output;
use super::prompt::TerminalPrompter;
use super::router::{CommandRouter, Flow};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "rcon-console", version, about = "Interactive Source RCON console")]
pub struct Args {
    /// Server address or favorite alias to connect to on startup
    pub target: Option<String>,
    /// Directory holding settings.json and the autocomplete caches
    #[arg(long, env = "RCON_CONSOLE_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,
    /// Seconds to wait for a server reply; 0 waits forever
    #[arg(long, default_value_t = 0)]
    pub timeout: u64,
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }

    fn context(&self) -> anyhow::Result<AppContext> {
        match &self.config_dir {
            Some(dir) => Ok(AppContext::with_config_dir(dir)),
            None => Ok(AppContext::from_project_dirs()?),
        }
    }
}

pub async fn run_cli(args: Args) -> anyhow::Result<()> {
    let context = args.context()?;
    let (mut console, status) = Console::open(context, Box::new(SourceRconConnector), args.timeout())
        .context("could not prepare the config directory")?;
    report_favorites(&console, status);

    let router = CommandRouter::new();
    let config = Config::builder()
        .completion_type(CompletionType::List)
        .auto_add_history(false)
        .build();
    let mut editor: Editor<ConsoleHelper, DefaultHistory> = Editor::with_config(config)?;
    editor.set_helper(Some(ConsoleHelper::new(router)));
    editor.set_max_history_size(500)?;

    let mut prompter = TerminalPrompter;
    output::intro();
    if let Some(target) = &args.target {
        router
            .execute(&mut console, &mut prompter, &format!("connect {target}"))
            .await;
    }

    loop {
        if let Some(helper) = editor.helper_mut() {
            helper.refresh(&console);
        }
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        if !line.trim().is_empty() {
            let _ = editor.add_history_entry(line.as_str());
        }
        if router.execute(&mut console, &mut prompter, &line).await == Flow::Exit {
            break;
        }
    }
    info!("Exiting...");
    Ok(())
}

fn report_favorites(console: &Console, status: LoadStatus) {
    match status {
        LoadStatus::Loaded(n) => info!("Loaded {n} favorites"),
        LoadStatus::Missing => info!("No favorites yet at {:?}", console.favorites().path()),
        LoadStatus::Regenerate(e) => {
            warn!("{e}");
            output::warning("Error reading your favorites; a fresh file will be written on the next save.");
        }
    }
}
