use std::net::{IpAddr, SocketAddr};

use clap::Args;

use crate::store::DEFAULT_HISTORY_LIMIT;

/// Settings for `finrisk serve`; every flag can also come from the environment.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "FINRISK_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,
    #[arg(long, env = "FINRISK_PORT", default_value_t = 8080)]
    pub port: u16,
    #[arg(
        long,
        env = "FINRISK_HISTORY_LIMIT",
        default_value_t = DEFAULT_HISTORY_LIMIT,
        help = "Maximum number of assessments returned by the history endpoint"
    )]
    pub history_limit: usize,
    #[arg(
        long,
        env = "FINRISK_LOG_JSON",
        default_value_t = false,
        help = "Emit logs as JSON lines instead of human-readable text"
    )]
    pub log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub history_limit: usize,
}

impl ServeArgs {
    pub fn server_config(&self) -> Result<ServerConfig, String> {
        if self.history_limit == 0 {
            return Err("--history-limit must be > 0".to_string());
        }
        Ok(ServerConfig {
            addr: SocketAddr::new(self.host, self.port),
            history_limit: self.history_limit,
        })
    }
}
