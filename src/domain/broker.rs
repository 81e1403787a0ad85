//! Market participants

use serde::{Deserialize, Serialize};

use super::PowerType;

pub type CustomerId = i64;

/// Agent that issues tariffs. Brokers are identified by username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Broker {
    pub username: String,
}

impl Broker {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl std::fmt::Display for Broker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.username)
    }
}

/// A customer model that commits some of its population to tariffs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub id: CustomerId,
    pub name: String,
    pub power_type: PowerType,
    /// Number of individual customers this model represents
    pub population: u32,
}

impl CustomerInfo {
    pub fn new(id: CustomerId, name: impl Into<String>, power_type: PowerType, population: u32) -> Self {
        Self {
            id,
            name: name.into(),
            power_type,
            population,
        }
    }
}
