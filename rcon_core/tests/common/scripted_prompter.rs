//! Plays back canned answers instead of reading the terminal.

use std::{collections::VecDeque, io};

use rcon_core::core::Prompter;

#[derive(Default)]
pub struct ScriptedPrompter {
    lines: VecDeque<String>,
    passwords: VecDeque<String>,
    /// Every prompt shown, in order.
    pub prompts: Vec<String>,
    pub notices: Vec<String>,
    pub password_prompts: usize,
}

impl ScriptedPrompter {
    pub fn new(lines: &[&str], passwords: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            passwords: passwords.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    /// A prompter that fails the test if anything is asked.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn exhausted(&self) -> bool {
        self.lines.is_empty() && self.passwords.is_empty()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.lines
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script ran out of lines"))
    }

    fn read_password(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.password_prompts += 1;
        self.passwords.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "script ran out of passwords")
        })
    }

    fn notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}
