//! Command line and environment configuration for the server.

use std::net::SocketAddr;

use clap::Parser;

use crate::store::DEFAULT_DATABASE_NAME;

/// The REST API and web server for GoFinTech.
///
/// Every option can also be set with the environment variable named in its
/// help text. Command line arguments take precedence.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// The store to connect to, e.g. "mongodb://localhost:27017" or
    /// "sqlite://fintech.db".
    #[arg(long, env = "MONGO_URI")]
    pub store_uri: String,

    /// The name of the database that holds the transactions collection.
    #[arg(long, env = "MONGO_DB_NAME", default_value = DEFAULT_DATABASE_NAME)]
    pub database_name: String,

    /// The port to serve the app from.
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// File path to write debug logs to.
    #[arg(long, default_value = "debug.log")]
    pub log_path: String,
}

impl Config {
    /// The address to listen on: every interface at the configured port.
    pub fn socket_address(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
