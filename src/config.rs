use clap::Parser;

use crate::replication::Role;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 6379;

#[derive(Parser, Clone, Debug, PartialEq)]
#[command(version, about)]
pub struct Config {
    /// The address to listen on
    #[arg(long, default_value = HOST)]
    pub host: String,

    /// The port to listen on
    #[arg(short, long, default_value_t = PORT)]
    pub port: u16,

    /// Run as a replica of the given master, e.g. "localhost 6379"
    #[arg(long, value_name = "MASTER")]
    pub replicaof: Option<String>,
}

impl Config {
    pub fn role(&self) -> Role {
        match self.replicaof {
            Some(_) => Role::Slave,
            None => Role::Master,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            replicaof: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::parse_from(["respite"]);

        assert_eq!(config, Config::default());
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.role(), Role::Master);
    }

    #[test]
    fn replica() {
        let config = Config::parse_from(["respite", "--port", "6380", "--replicaof", "localhost 6379"]);

        assert_eq!(config.port, 6380);
        assert_eq!(config.replicaof.as_deref(), Some("localhost 6379"));
        assert_eq!(config.role(), Role::Slave);
    }
}
