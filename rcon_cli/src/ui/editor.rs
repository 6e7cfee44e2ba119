use rustyline::completion::Completer;
use rustyline::{Context, Helper, Highlighter, Hinter, Validator};

use rcon_core::Console;

use super::completion::CompletionContext;
use super::router::CommandRouter;

/// Line-editor helper: tab completion comes from the router, fed with a
/// snapshot taken before each prompt.
#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct ConsoleHelper {
    router: CommandRouter,
    context: CompletionContext,
}

impl ConsoleHelper {
    pub fn new(router: CommandRouter) -> Self {
        Self {
            router,
            context: CompletionContext::default(),
        }
    }

    pub fn refresh(&mut self, console: &Console) {
        self.context = CompletionContext::capture(console);
    }
}

impl Completer for ConsoleHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok(self.router.complete(&self.context, line, pos))
    }
}
