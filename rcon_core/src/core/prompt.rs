use std::io;

/// Interactive input used by `favorite add` and password acquisition.
///
/// The terminal implementation lives in the CLI; tests drive the flows with
/// a scripted one.
pub trait Prompter {
    /// Reads one line of visible input, without the trailing newline.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Reads one line of masked input.
    fn read_password(&mut self, prompt: &str) -> io::Result<String>;

    /// Shows a non-fatal warning in the middle of an interactive flow.
    fn notice(&mut self, message: &str);
}
