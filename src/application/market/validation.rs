//! Update validation and fee accounting

use rust_decimal::Decimal;
use tracing::{debug, error};

use super::context::MarketContext;
use crate::domain::{
    DomainResult, Tariff, TariffStatus, TariffStatusCode, TariffTransaction,
    TariffTransactionType, TariffUpdate,
};

/// Either the tariff an update refers to, or the reply that ends the command
pub type ValidationResult = Result<Tariff, TariffStatus>;

/// Look up the tariff targeted by `update`.
///
/// An unknown id yields a `noSuchTariff` status addressed to the requesting
/// broker; the caller returns it without doing anything else.
pub async fn validate_update<U>(ctx: &MarketContext, update: &U) -> DomainResult<ValidationResult>
where
    U: TariffUpdate + Sync,
{
    match ctx.tariffs.find_tariff_by_id(update.tariff_id()).await? {
        Some(tariff) => Ok(Ok(tariff)),
        None => {
            error!(
                tariff_id = update.tariff_id(),
                broker = %update.broker(),
                "update - no such tariff"
            );
            Ok(Err(TariffStatus::for_update(update, TariffStatusCode::NoSuchTariff)))
        }
    }
}

/// Record a fee against the tariff's broker in the ledger
pub async fn charge_fee(
    ctx: &MarketContext,
    kind: TariffTransactionType,
    tariff: &Tariff,
    charge: Decimal,
) -> TariffTransaction {
    let transaction = ctx.accounting.add_tariff_transaction(kind, tariff, charge).await;
    debug!(
        tariff_id = tariff.id(),
        broker = %tariff.broker(),
        %kind,
        %charge,
        "Tariff fee recorded"
    );
    transaction
}
