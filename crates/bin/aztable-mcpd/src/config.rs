use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use aztable_mcp::server::McpHttpServerConfig;
use aztable_store::schema::DEVELOPMENT_CONNECTION_STRING;
use clap::{Parser, ValueEnum, builder::BoolishValueParser};

const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_SSE_KEEP_ALIVE_SECS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    Stdio,
    Http,
}

#[derive(Parser, Debug)]
#[command(name = "aztable-mcpd", version, about = "Azure Table Storage MCP daemon.")]
struct CliArgs {
    #[arg(
        long,
        env = "AZURE_STORAGE_CONNECTION_STRING",
        hide_env_values = true
    )]
    connection_string: Option<String>,

    #[arg(long, env = "AZTABLE_TRANSPORT", value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    #[arg(long, env = "AZTABLE_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    http_addr: SocketAddr,

    #[arg(
        long = "stateful",
        env = "AZTABLE_MCP_STATEFUL",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    stateful_mode: bool,

    #[arg(
        long,
        env = "AZTABLE_SSE_KEEP_ALIVE_SECS",
        default_value_t = DEFAULT_SSE_KEEP_ALIVE_SECS
    )]
    sse_keep_alive_secs: u64,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone)]
pub struct AzTableConfig {
    connection_string: String,
    pub transport: Transport,
    pub http_addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
}

impl fmt::Debug for AzTableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzTableConfig")
            .field("connection_string", &"<redacted>")
            .field("transport", &self.transport)
            .field("http_addr", &self.http_addr)
            .field("stateful_mode", &self.stateful_mode)
            .field("sse_keep_alive", &self.sse_keep_alive)
            .finish()
    }
}

impl AzTableConfig {
    pub fn from_args() -> Self {
        Self::from(CliArgs::parse())
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// True when no connection string was supplied and the emulator is targeted.
    pub fn uses_development_storage(&self) -> bool {
        self.connection_string == DEVELOPMENT_CONNECTION_STRING
    }

    pub const fn http_config(&self) -> McpHttpServerConfig {
        McpHttpServerConfig::new(self.http_addr)
            .with_stateful_mode(self.stateful_mode)
            .with_sse_keep_alive(self.sse_keep_alive)
    }
}

impl From<CliArgs> for AzTableConfig {
    fn from(args: CliArgs) -> Self {
        let connection_string = args
            .connection_string
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEVELOPMENT_CONNECTION_STRING.to_string());

        let sse_keep_alive = if args.sse_keep_alive_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(args.sse_keep_alive_secs))
        };

        Self {
            connection_string,
            transport: args.transport,
            http_addr: args.http_addr,
            stateful_mode: args.stateful_mode,
            sse_keep_alive,
        }
    }
}
