//! Order assembly and submission
//!
//! Turns cart lines into the vendor order payload. Each cart line becomes a
//! main line followed by one line per distinct add-on, all numbered from a
//! single running sequence:
//!
//! ```text
//! cart: 2 × X-Burger (10.00) + Bacon (1.50)
//!
//! seq 1  100  qty 2  10.00  20.00
//! seq 2  200  qty 2   1.50   3.00  adicional "1"
//!                    total 23.00
//! ```

use crate::cart::CartLine;
use crate::error::SubmitError;
use crate::http::action::SUBMIT_ORDER;
use crate::http::{EnvelopeTransport, RpcRequest};
use serde_json::Value;
use shared::Decimal;
use shared::models::{AddOnOption, TableLabel};
use shared::order::money::{accumulate, line_total, round_money};
use shared::order::{
    DEFAULT_DELIVERY_TYPE, DEFAULT_PAYMENT_METHOD, LineKind, OrderCustomer, OrderHeader,
    OrderLine, OrderRequest,
};
use shared::util::value_to_string;
use std::sync::Arc;

const ORDER_ID_KEYS: &[&str] = &["codigo_pedido", "pedido", "codigo", "id"];

/// Header fields the caller may override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderOptions {
    pub delivery_type: String,
    pub payment_method: String,
    pub notes: String,
}

impl Default for OrderOptions {
    fn default() -> Self {
        Self {
            delivery_type: DEFAULT_DELIVERY_TYPE.to_string(),
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            notes: String::new(),
        }
    }
}

impl OrderOptions {
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Accepted order
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedOrder {
    /// Backend order number, when the response carries one
    pub order_id: Option<String>,
    pub total: Decimal,
    /// Raw `sucesso` payload
    pub response: Value,
}

/// Build the order payload for `lines` delivered to `table`
pub fn build_order(
    table: &TableLabel,
    lines: &[CartLine],
    options: &OrderOptions,
) -> Result<OrderRequest, SubmitError> {
    if lines.is_empty() {
        return Err(SubmitError::EmptyCart);
    }

    let mut items = Vec::new();
    let mut total = Decimal::ZERO;
    let mut sequence = 0u32;

    let mut push = |code: &str, description: &str, quantity: u32, unit_price: Decimal, kind: LineKind| {
        sequence += 1;
        let unit_price = round_money(unit_price);
        let amount = line_total(unit_price, quantity);
        total = accumulate(total, amount);
        items.push(OrderLine {
            sequence,
            product_code: code.to_string(),
            description: description.to_string(),
            quantity,
            unit_price,
            line_total: amount,
            kind,
        });
    };

    for line in lines {
        push(
            &line.product.code,
            &line.product.name,
            line.quantity,
            line.product.price(),
            LineKind::Main,
        );
        for (option, count) in group_add_ons(&line.add_ons) {
            push(
                &option.code,
                &option.name,
                count * line.quantity,
                option.unit_price,
                LineKind::AddOn,
            );
        }
    }

    let label = table.delivery_label();
    Ok(OrderRequest {
        customer: OrderCustomer {
            name: table.customer_name(),
            ..Default::default()
        },
        order: OrderHeader {
            delivery_type: options.delivery_type.clone(),
            payment_method: options.payment_method.clone(),
            delivery_address: label.clone(),
            notification: label,
            notes: options.notes.clone(),
            subtotal: total,
            total,
            lines: items,
        },
    })
}

/// Distinct add-ons with their occurrence count, in first-seen order
fn group_add_ons(add_ons: &[AddOnOption]) -> Vec<(&AddOnOption, u32)> {
    let mut grouped: Vec<(&AddOnOption, u32)> = Vec::new();
    for option in add_ons {
        match grouped.iter_mut().find(|(seen, _)| seen.code == option.code) {
            Some((_, count)) => *count += 1,
            None => grouped.push((option, 1)),
        }
    }
    grouped
}

/// Order id from a submission payload: a scalar, or the first id-like key
/// of an object (or of the first element of a list)
fn extract_order_id(payload: &Value) -> Option<String> {
    let record = match payload {
        Value::Array(items) => items.first()?,
        other => other,
    };
    match record {
        Value::Object(obj) => ORDER_ID_KEYS
            .iter()
            .filter_map(|key| obj.get(*key))
            .filter_map(value_to_string)
            .find(|id| !id.is_empty()),
        scalar => value_to_string(scalar).filter(|id| !id.is_empty()),
    }
}

#[derive(Clone)]
pub struct OrderAssembler {
    transport: Arc<dyn EnvelopeTransport>,
}

impl OrderAssembler {
    pub fn new(transport: Arc<dyn EnvelopeTransport>) -> Self {
        Self { transport }
    }

    /// Build and submit in one round trip. Nothing is sent for an empty
    /// cart; a backend `erro` comes back as [`SubmitError::Rejected`].
    pub async fn build_and_submit(
        &self,
        table: &TableLabel,
        lines: &[CartLine],
        options: &OrderOptions,
    ) -> Result<SubmittedOrder, SubmitError> {
        let order = build_order(table, lines, options)?;
        self.submit(&order).await
    }

    pub async fn submit(&self, order: &OrderRequest) -> Result<SubmittedOrder, SubmitError> {
        let total = order.order.total;
        let body = serde_json::to_value(order)?;

        tracing::info!(
            table = %order.order.delivery_address,
            lines = order.order.lines.len(),
            total = %total,
            "Submitting order"
        );

        let response = self
            .transport
            .call_success(RpcRequest::new(SUBMIT_ORDER, body))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Order submission failed");
                SubmitError::from(e)
            })?;

        let order_id = extract_order_id(&response);
        tracing::info!(order_id = ?order_id, total = %total, "Order accepted");

        Ok(SubmittedOrder {
            order_id,
            total,
            response,
        })
    }
}
