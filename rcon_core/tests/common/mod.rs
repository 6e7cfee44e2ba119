#![allow(dead_code)]

pub mod fake_client;
pub mod scripted_prompter;

/// Logs appear only when you run with `-- --nocapture` or when a test fails.
pub fn init_test_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
