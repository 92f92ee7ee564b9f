use super::ApplicationEnv;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Driver crates are chatty below warn
const QUIET_DEPENDENCIES: [&str; 2] = ["amqprs=warn", "mongodb=warn"];

pub fn setup_tracing(env: &ApplicationEnv) -> anyhow::Result<()> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(env_filter(LevelFilter::DEBUG)?);

    // file keeps targets so rabbitmq_client events can be told apart from consumers
    let file_appender = tracing_appender::rolling::hourly(&env.log_directory, &env.log_filename);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(env_filter(LevelFilter::INFO)?);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(())
}

fn env_filter(default_level: LevelFilter) -> anyhow::Result<EnvFilter> {
    let mut filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env()?;
    for directive in QUIET_DEPENDENCIES {
        filter = filter.add_directive(directive.parse()?);
    }

    Ok(filter)
}
