pub mod console;
pub mod context;
pub mod prompt;
pub mod session;

pub use console::{ConnectReport, Console};
pub use context::AppContext;
pub use prompt::Prompter;
pub use session::{ConsoleSession, SessionError, SessionState};
