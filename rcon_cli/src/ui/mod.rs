pub mod cli;
pub mod completion;
pub mod editor;
pub mod output;
pub mod prompt;
pub mod router;
