//! Broker ↔ market messages
//!
//! Inbound traffic is a closed set of [`TariffMessage`] variants. Anything
//! else a broker sends arrives as [`BrokerMessage::Other`] and is answered
//! with [`TariffStatusCode::IllegalOperation`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tariff::{HourlyCharge, RateId, TariffId, TariffSpecification};
use super::Broker;

pub type MessageId = i64;

/// Anything a broker can send to the market
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum BrokerMessage {
    Tariff(TariffMessage),
    Other(UnrecognizedMessage),
}

/// A broker message outside the tariff command set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnrecognizedMessage {
    pub kind: String,
    #[serde(default)]
    pub broker: Option<Broker>,
    #[serde(default)]
    pub id: Option<MessageId>,
}

/// Tariff commands accepted from brokers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", content = "body")]
pub enum TariffMessage {
    Publish(TariffSpecification),
    Expire(TariffExpire),
    Revoke(TariffRevoke),
    VariableRateUpdate(VariableRateUpdate),
}

impl TariffMessage {
    pub fn broker(&self) -> &Broker {
        match self {
            Self::Publish(spec) => &spec.broker,
            Self::Expire(m) => &m.broker,
            Self::Revoke(m) => &m.broker,
            Self::VariableRateUpdate(m) => &m.broker,
        }
    }

    /// Message id. A publication is identified by its specification id.
    pub fn id(&self) -> MessageId {
        match self {
            Self::Publish(spec) => spec.id,
            Self::Expire(m) => m.id,
            Self::Revoke(m) => m.id,
            Self::VariableRateUpdate(m) => m.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Publish(_) => "publish",
            Self::Expire(_) => "expire",
            Self::Revoke(_) => "revoke",
            Self::VariableRateUpdate(_) => "variable_rate_update",
        }
    }
}

impl From<TariffMessage> for BrokerMessage {
    fn from(message: TariffMessage) -> Self {
        Self::Tariff(message)
    }
}

/// Common view of the commands that act on an existing tariff
pub trait TariffUpdate {
    fn id(&self) -> MessageId;
    fn broker(&self) -> &Broker;
    fn tariff_id(&self) -> TariffId;
}

macro_rules! impl_tariff_update {
    ($($ty:ty),*) => {
        $(impl TariffUpdate for $ty {
            fn id(&self) -> MessageId {
                self.id
            }

            fn broker(&self) -> &Broker {
                &self.broker
            }

            fn tariff_id(&self) -> TariffId {
                self.tariff_id
            }
        })*
    };
}

impl_tariff_update!(TariffExpire, TariffRevoke, VariableRateUpdate);

/// Moves a tariff's expiration. `None` makes it open-ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffExpire {
    pub id: MessageId,
    pub broker: Broker,
    pub tariff_id: TariffId,
    #[serde(default)]
    pub new_expiration: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffRevoke {
    pub id: MessageId,
    pub broker: Broker,
    pub tariff_id: TariffId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableRateUpdate {
    pub id: MessageId,
    pub broker: Broker,
    pub tariff_id: TariffId,
    pub rate_id: RateId,
    pub hourly_charge: HourlyCharge,
}

/// Outcome of a broker command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TariffStatusCode {
    Success,
    NoSuchTariff,
    InvalidUpdate,
    IllegalOperation,
}

impl std::fmt::Display for TariffStatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::NoSuchTariff => write!(f, "noSuchTariff"),
            Self::InvalidUpdate => write!(f, "invalidUpdate"),
            Self::IllegalOperation => write!(f, "illegalOperation"),
        }
    }
}

/// Reply sent to a broker for every command it issues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffStatus {
    pub broker: Broker,
    pub tariff_id: TariffId,
    pub update_id: MessageId,
    pub status: TariffStatusCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TariffStatus {
    pub fn new(broker: Broker, tariff_id: TariffId, update_id: MessageId, status: TariffStatusCode) -> Self {
        Self {
            broker,
            tariff_id,
            update_id,
            status,
            message: None,
        }
    }

    /// Status answering `update`, addressed to its broker
    pub fn for_update(update: &impl TariffUpdate, status: TariffStatusCode) -> Self {
        Self::new(update.broker().clone(), update.tariff_id(), update.id(), status)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == TariffStatusCode::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_is_identified_by_spec_id() {
        let spec = TariffSpecification::new(12, Broker::new("b"), Default::default());
        let msg = TariffMessage::Publish(spec);
        assert_eq!(msg.id(), 12);
        assert_eq!(msg.kind(), "publish");
        assert_eq!(msg.broker().username, "b");
    }

    #[test]
    fn status_for_update_copies_addressing() {
        let revoke = TariffRevoke {
            id: 5,
            broker: Broker::new("b"),
            tariff_id: 9,
        };
        let status = TariffStatus::for_update(&revoke, TariffStatusCode::NoSuchTariff)
            .with_message("gone");
        assert_eq!(status.tariff_id, 9);
        assert_eq!(status.update_id, 5);
        assert!(!status.is_success());
        assert_eq!(status.message.as_deref(), Some("gone"));
    }

    #[test]
    fn broker_message_json_shape() {
        let json = r#"{
            "type": "Tariff",
            "data": {
                "command": "Revoke",
                "body": { "id": 1, "broker": { "username": "b" }, "tariff_id": 3 }
            }
        }"#;
        let msg: BrokerMessage = serde_json::from_str(json).unwrap();
        match msg {
            BrokerMessage::Tariff(TariffMessage::Revoke(r)) => assert_eq!(r.tariff_id, 3),
            other => panic!("unexpected {:?}", other),
        }
    }
}
