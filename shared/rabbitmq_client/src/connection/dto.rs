use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RabbitmqConnectionConfig {
    /// Delay between attempts to open the connection
    pub retry_interval: Duration,

    /// Number of attempts to open the connection before giving up
    pub max_open_attempts: u32,
}
