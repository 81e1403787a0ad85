pub mod broker;
pub mod error;
pub mod messages;
pub mod power_type;
pub mod subscription;
pub mod tariff;
pub mod transaction;

// Re-export commonly used types
pub use broker::{Broker, CustomerId, CustomerInfo};
pub use error::{DomainError, DomainResult};
pub use messages::{
    BrokerMessage, MessageId, TariffExpire, TariffMessage, TariffRevoke, TariffStatus,
    TariffStatusCode, TariffUpdate, UnrecognizedMessage, VariableRateUpdate,
};
pub use power_type::PowerType;
pub use subscription::{TariffSubscription, TariffSubscriptionRepository};
pub use tariff::{
    HourlyCharge, Rate, RateId, RateUpdateError, Tariff, TariffId, TariffRepository,
    TariffSpecification, TariffState,
};
pub use transaction::{TariffTransaction, TariffTransactionType};
