use log::LevelFilter;
use simplelog::{ConfigBuilder, SimpleLogger};

/// Console logger for the command line tools, the web server logs through logfire
pub fn setup_simple_logger() -> anyhow::Result<()> {
    let logger_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("wa_lead_tracker")
        .add_filter_allow_str("scripts")
        .build();

    Ok(SimpleLogger::init(LevelFilter::Info, logger_config)?)
}
