//! Message dispatcher: routes broker commands to their lifecycle handler.
//!
//! Each command is handled to completion and answered before the next one
//! is accepted. Every accepted command produces exactly one reply.

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::context::SharedMarketContext;
use super::lifecycle::TariffLifecycle;
use crate::application::ports::BrokerMessageListener;
use crate::domain::{BrokerMessage, TariffMessage, TariffStatus, TariffStatusCode, UnrecognizedMessage};

/// Record command dispatch latency and outcome.
fn record_command(kind: &'static str, status: TariffStatusCode, start: std::time::Instant) {
    let duration = start.elapsed().as_secs_f64();
    metrics::histogram!("tariff_market_command_latency_seconds", "kind" => kind).record(duration);
    metrics::counter!(
        "tariff_market_commands_total",
        "kind" => kind,
        "status" => status.to_string()
    )
    .increment(1);
}

pub struct MessageDispatcher {
    ctx: SharedMarketContext,
    lifecycle: TariffLifecycle,
}

impl MessageDispatcher {
    pub fn new(ctx: SharedMarketContext) -> Self {
        Self {
            lifecycle: TariffLifecycle::new(ctx.clone()),
            ctx,
        }
    }

    /// Process one inbound broker message and send the reply.
    ///
    /// Returns the reply that was sent. `None` means the message carried no
    /// broker identity, so there was nobody to answer.
    pub async fn receive_message(&self, message: Option<BrokerMessage>) -> Option<TariffStatus> {
        let status = match message {
            Some(BrokerMessage::Tariff(command)) => self.dispatch(command).await,
            Some(BrokerMessage::Other(other)) => Self::illegal_operation(other)?,
            None => {
                warn!("Dropping empty broker message");
                return None;
            }
        };

        self.ctx
            .broker_proxy
            .send_message(&status.broker, status.clone())
            .await;
        Some(status)
    }

    async fn dispatch(&self, command: TariffMessage) -> TariffStatus {
        let start = std::time::Instant::now();
        let kind = command.kind();
        let broker = command.broker().clone();
        let message_id = command.id();
        info!(kind, %broker, message_id, "Dispatching tariff command");

        let result = {
            let _guard = self.ctx.begin_mutation().await;
            match command {
                TariffMessage::Publish(spec) => self.lifecycle.publish(spec).await,
                TariffMessage::Expire(update) => self.lifecycle.expire(update).await,
                TariffMessage::Revoke(update) => self.lifecycle.revoke(update).await,
                TariffMessage::VariableRateUpdate(update) => {
                    self.lifecycle.update_variable_rate(update).await
                }
            }
        };

        let status = result.unwrap_or_else(|e| {
            error!(kind, %broker, message_id, error = %e, "Tariff command failed");
            TariffStatus::new(broker, 0, message_id, TariffStatusCode::IllegalOperation)
                .with_message(e.to_string())
        });
        record_command(kind, status.status, start);
        status
    }

    fn illegal_operation(message: UnrecognizedMessage) -> Option<TariffStatus> {
        let Some(broker) = message.broker else {
            warn!(kind = message.kind.as_str(), "Unrecognized message from unknown broker");
            return None;
        };
        warn!(kind = message.kind.as_str(), %broker, "Unrecognized tariff message");
        metrics::counter!("tariff_market_commands_total", "kind" => "unrecognized", "status" => "illegalOperation")
            .increment(1);
        Some(
            TariffStatus::new(
                broker,
                0,
                message.id.unwrap_or_default(),
                TariffStatusCode::IllegalOperation,
            )
            .with_message(format!("unsupported message type {}", message.kind)),
        )
    }
}

#[async_trait]
impl BrokerMessageListener for MessageDispatcher {
    async fn handle_broker_message(&self, message: BrokerMessage) {
        self.receive_message(Some(message)).await;
    }
}
