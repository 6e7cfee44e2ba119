use std::io::{self, stdin, stdout, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use rcon_core::core::Prompter;

use super::output;

/// Enable raw mode via crossterm.
/// This disables line-buffering and echo on all supported platforms.
fn set_raw_mode() -> io::Result<RawMode> {
    enable_raw_mode()?;
    Ok(RawMode)
}

/// Restores normal terminal mode when dropped, including on early return.
struct RawMode;

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Prompts on the controlling terminal. Passwords are echoed as `*`.
/// Ctrl-C yields `Interrupted`, Ctrl-D on an empty line `UnexpectedEof`.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn read(&mut self, prompt: &str, mask: Option<char>) -> io::Result<String> {
        let mut out = stdout();
        write!(out, "{prompt}")?;
        out.flush()?;

        if !stdin().is_terminal() {
            return read_piped_line();
        }

        let raw = set_raw_mode()?;
        let mut buf = String::new();
        let result = loop {
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            else {
                continue;
            };
            if kind == KeyEventKind::Release {
                continue;
            }
            let ctrl = modifiers.contains(KeyModifiers::CONTROL);
            match code {
                KeyCode::Enter => break Ok(buf),
                KeyCode::Char('c') if ctrl => break Err(io::ErrorKind::Interrupted.into()),
                KeyCode::Char('d') if ctrl && buf.is_empty() => {
                    break Err(io::ErrorKind::UnexpectedEof.into())
                }
                KeyCode::Backspace => {
                    if buf.pop().is_some() {
                        write!(out, "\x08 \x08")?;
                    }
                }
                KeyCode::Char(c) if !ctrl => {
                    buf.push(c);
                    write!(out, "{}", mask.unwrap_or(c))?;
                }
                _ => {}
            }
            out.flush()?;
        };
        drop(raw);
        writeln!(out)?;
        result
    }
}

fn read_piped_line() -> io::Result<String> {
    let mut line = String::new();
    if stdin().lock().read_line(&mut line)? == 0 {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.read(prompt, None)
    }

    fn read_password(&mut self, prompt: &str) -> io::Result<String> {
        self.read(prompt, Some('*'))
    }

    fn notice(&mut self, message: &str) {
        output::warning(message);
    }
}
