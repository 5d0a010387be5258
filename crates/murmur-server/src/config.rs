use std::fmt;
use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result, bail};

use murmur_bus::{DEFAULT_CAPACITY, MAX_CAPACITY};

pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Identity every request is made as.
    pub viewer_id: String,
    pub bus_capacity: usize,
    pub prune_on_delete: bool,
    pub replay_seed_on_subscribe: bool,
    /// Supplied by the environment but not used by anything yet.
    pub database_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = match lookup("MURMUR_HOST") {
            Some(v) => v.parse().with_context(|| format!("invalid MURMUR_HOST: {v}"))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let port = match lookup("MURMUR_PORT") {
            Some(v) => v.parse().with_context(|| format!("invalid MURMUR_PORT: {v}"))?,
            None => 8000,
        };

        let viewer_id = lookup("MURMUR_VIEWER_ID").unwrap_or_else(|| "1".into());

        let bus_capacity = match lookup("MURMUR_BUS_CAPACITY") {
            Some(v) => v
                .parse()
                .with_context(|| format!("invalid MURMUR_BUS_CAPACITY: {v}"))?,
            None => DEFAULT_CAPACITY,
        };
        if !(1..=MAX_CAPACITY).contains(&bus_capacity) {
            bail!("MURMUR_BUS_CAPACITY must be between 1 and {MAX_CAPACITY}");
        }

        let prune_on_delete = flag(&lookup, "MURMUR_PRUNE_ON_DELETE", false)?;
        let replay_seed_on_subscribe = flag(&lookup, "MURMUR_REPLAY_SEED_ON_SUBSCRIBE", true)?;

        Ok(Self {
            host,
            port,
            viewer_id,
            bus_capacity,
            prune_on_delete,
            replay_seed_on_subscribe,
            database_password: lookup("MURMUR_DATABASE_PASSWORD"),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// Keeps the password out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("viewer_id", &self.viewer_id)
            .field("bus_capacity", &self.bus_capacity)
            .field("prune_on_delete", &self.prune_on_delete)
            .field("replay_seed_on_subscribe", &self.replay_seed_on_subscribe)
            .field(
                "database_password",
                &self.database_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool> {
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("invalid {key}: {value}"),
    }
}
