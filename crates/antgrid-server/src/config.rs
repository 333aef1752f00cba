use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use antgrid_controller::controller::DeviceController;
use antgrid_controller::dispatcher::Dispatcher;
use antgrid_controller::endpoint::{StaticResolver, TableResolver};

use clap::Parser;

use tracing::{info, warn};

use crate::store::{MemoryStore, StoreError};

// Default server port.
const DEFAULT_PORT: u16 = 8125;

// Default timeout for a device round trip, in milliseconds.
const DEFAULT_DEVICE_TIMEOUT_MS: u64 = 5000;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The device address table cannot be read.
    #[error("failed to read the device table {}: {source}", path.display())]
    DeviceTable {
        /// Device table path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The device controller cannot be configured.
    #[error(transparent)]
    Controller(#[from] antgrid_controller::error::Error),
    /// The record store cannot be loaded.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Server configuration.
///
/// Every option can be overridden through its environment variable.
#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Listening address.
    #[arg(long, env = "ANTGRID_ADDRESS", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub address: IpAddr,

    /// Listening port.
    #[arg(short, long, env = "ANTGRID_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Base address of the device light controllers, for example
    /// `http://192.168.1.238:5100/led/`.
    #[arg(long, env = "ANTGRID_DEVICE_URL")]
    pub device_url: Option<String>,

    /// JSON file mapping device identifiers to their own base address, with
    /// one `ants` and one `spokes` object.
    ///
    /// Devices missing from the table use `--device-url`, if given.
    #[arg(long, env = "ANTGRID_DEVICE_TABLE")]
    pub device_table: Option<PathBuf>,

    /// Timeout of a device round trip, in milliseconds. Must be positive.
    #[arg(
        long,
        env = "ANTGRID_DEVICE_TIMEOUT_MS",
        default_value_t = DEFAULT_DEVICE_TIMEOUT_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub device_timeout_ms: u64,

    /// JSON file with the `ants` and `spokes` records to serve.
    #[arg(long, env = "ANTGRID_RECORDS")]
    pub records: Option<PathBuf>,

    /// Log filter directive, for example `info` or `antgrid_controller=debug`.
    #[arg(long, env = "ANTGRID_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Returns the listening socket address.
    #[must_use]
    pub const fn socket_address(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    /// Returns the timeout of a device round trip.
    #[must_use]
    pub const fn device_timeout(&self) -> Duration {
        Duration::from_millis(self.device_timeout_ms)
    }

    /// Builds the [`DeviceController`] described by the configuration.
    ///
    /// A missing device address is not an error: commands fail with an
    /// unresolved endpoint until an address is configured.
    ///
    /// # Errors
    ///
    /// An error is returned when the device address or the device table are
    /// invalid, or when the device table cannot be read.
    pub async fn controller(&self) -> Result<DeviceController, ConfigError> {
        let dispatcher = Dispatcher::with_timeout(self.device_timeout())?;
        let static_resolver = StaticResolver::from_address(self.device_url.as_deref())?;

        let Some(path) = &self.device_table else {
            if self.device_url.is_none() {
                warn!("No device address configured: device commands will fail");
            }
            return Ok(DeviceController::new(static_resolver, dispatcher));
        };

        let document = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::DeviceTable {
                path: path.clone(),
                source,
            })?;

        let mut table = TableResolver::from_json(&document)?;
        info!("Loaded {} device addresses from {}", table.len(), path.display());

        if self.device_url.is_some() {
            table = table.fallback(static_resolver);
        }

        Ok(DeviceController::new(table, dispatcher))
    }

    /// Builds the record store described by the configuration.
    ///
    /// # Errors
    ///
    /// An error is returned when the records file cannot be loaded.
    pub async fn store(&self) -> Result<MemoryStore, ConfigError> {
        match &self.records {
            Some(path) => Ok(MemoryStore::load(path).await?),
            None => {
                warn!("No records file configured: serving an empty store");
                Ok(MemoryStore::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::time::Duration;

    use clap::Parser;

    use super::{Config, ConfigError};

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("antgrid-server").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn explicit_options() {
        let config = parse(&[
            "--address",
            "127.0.0.1",
            "--port",
            "9000",
            "--device-url",
            "http://192.168.1.238:5100/led/",
            "--device-timeout-ms",
            "250",
            "--log-level",
            "debug",
        ]);

        assert_eq!(
            config.socket_address(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 9000)
        );
        assert_eq!(
            config.device_url.as_deref(),
            Some("http://192.168.1.238:5100/led/")
        );
        assert_eq!(config.device_timeout(), Duration::from_millis(250));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn invalid_port() {
        assert!(Config::try_parse_from(["antgrid-server", "--port", "port"]).is_err());
    }

    #[test]
    fn zero_device_timeout() {
        assert!(
            Config::try_parse_from(["antgrid-server", "--device-timeout-ms", "0"]).is_err()
        );
        assert_eq!(
            parse(&["--device-timeout-ms", "1"]).device_timeout(),
            Duration::from_millis(1)
        );
    }

    #[tokio::test]
    async fn invalid_device_url() {
        let config = parse(&["--device-url", "192.168.1.238"]);

        assert!(matches!(
            config.controller().await,
            Err(ConfigError::Controller(_))
        ));
    }

    #[tokio::test]
    async fn missing_device_table() {
        let config = parse(&["--device-table", "/nonexistent/devices.json"]);

        assert!(matches!(
            config.controller().await,
            Err(ConfigError::DeviceTable { .. })
        ));
    }
}
