//! Logger setup for the binary. Library crates only use the `log` facade.

use std::io::Write;

use log::LevelFilter;

/// Level used when neither `--log-level` nor `RUST_LOG` parses.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

/// Resolves the level from the flag, then `RUST_LOG`, then [`DEFAULT_LEVEL`].
pub fn resolve_level(flag: Option<&str>, env: Option<&str>) -> LevelFilter {
    flag.and_then(|l| l.parse().ok())
        .or_else(|| env.and_then(|v| v.parse().ok()))
        .unwrap_or(DEFAULT_LEVEL)
}

/// Installs `env_logger` on stderr. Safe to call once per process.
pub fn init_logging(level: Option<&str>) {
    let env = std::env::var("RUST_LOG").ok();
    let level = resolve_level(level, env.as_deref());
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .try_init();
    log::debug!("logger initialized (level: {level})");
}
