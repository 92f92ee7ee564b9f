mod application;
mod domain;
mod dto;
mod error;
mod repository;
mod service;

use application::ApplicationEnv;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(debug_assertions)]
    {
        // Ignore error because .env file is not required
        // as long as env variables are set
        let _ = dotenvy::dotenv();
    }

    let env = ApplicationEnv::parse()?;

    application::setup_tracing(&env)?;
    application::setup_metrics(&env)?;

    let state = application::create_state(&env).await?;

    tracing::info!("ticket lifecycle started");

    tokio::select! {
        _ = application::shutdown_signal() => {},
        _ = state.rabbitmq_connection.failed() => {},
        _ = state.consumer_cancelled() => {},
    }

    application::close(state).await;

    tracing::info!("ticket lifecycle stopped");

    Ok(())
}
