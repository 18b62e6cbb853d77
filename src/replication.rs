use bytes::Bytes;
use itertools::Itertools;
use strum_macros::{Display, EnumString};

/// Fixed replication id reported by a master.
pub const REPLICATION_ID: &str = "8371b4fb1155b71f4a04d3e1bc3e18c4a990aeeb";

/// The role a server reports. It is a static label: no replication protocol is run for either.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    Master,
    Slave,
}

/// Replication state shared read-only by every connection.
#[derive(Clone, Debug, PartialEq)]
pub struct Replication {
    pub role: Role,
    pub replication_id: String,
    pub offset: u64,
}

impl Replication {
    pub fn new(role: Role) -> Replication {
        Replication {
            role,
            replication_id: REPLICATION_ID.to_string(),
            offset: 0,
        }
    }

    /// The `# Replication` section of `INFO`, one `field:value` pair per line.
    pub fn info(&self) -> Bytes {
        let mut fields = vec![("role", self.role.to_string())];

        if self.role == Role::Master {
            fields.push(("master_replid", self.replication_id.clone()));
            fields.push(("master_repl_offset", self.offset.to_string()));
        }

        let report = fields
            .iter()
            .map(|(field, value)| format!("{}:{}", field, value))
            .join("\r\n");

        Bytes::from(report)
    }
}

impl Default for Replication {
    fn default() -> Self {
        Self::new(Role::default())
    }
}
