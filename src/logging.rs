use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use log4rs::{
    append::rolling_file::{
        policy::compound::{
            roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy,
        },
        RollingFileAppender,
    },
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};

const LOG_SIZE_LIMIT: u64 = 5 * 1024 * 1024; // 5 MB

const LOG_FILE_COUNT: u32 = 3;

/// Send all logging to a rolling file next to the database. The terminal
/// belongs to the UI, so there is no console appender.
pub fn init_logger(log_path: &Path, level: LevelFilter) -> Result<()> {
    let archive_pattern = format!("{}.{{}}.gz", log_path.display());

    let trigger = SizeTrigger::new(LOG_SIZE_LIMIT);
    let roller = FixedWindowRoller::builder()
        .build(&archive_pattern, LOG_FILE_COUNT)
        .map_err(|err| anyhow!("invalid log archive pattern: {err}"))?;
    let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));

    let logfile = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}{n}",
        )))
        .build(log_path, Box::new(policy))
        .context("failed to open log file")?;

    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(Root::builder().appender("logfile").build(level))
        .context("invalid logging configuration")?;

    log4rs::init_config(config).context("failed to initialize logger")?;
    Ok(())
}
