use env_logger::Env;

/// Initialize logging using env_logger.
/// `RUST_LOG` wins when set, e.g. `RUST_LOG=rcon_core=debug rcon-console`;
/// otherwise each `-v` raises the level from `error` to `info` to `debug`.
pub fn init_logging(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}
