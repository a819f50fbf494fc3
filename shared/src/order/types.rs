//! Vendor order payload
//!
//! ```json
//! {
//!   "cliente": { "nome": "Mesa 12", "telefone": "", "email": "" },
//!   "pedido": {
//!     "tipo_entrega": "2",
//!     "forma_pagamento": "1",
//!     "endereco_entrega": "MESA 12",
//!     "notificacao": "MESA 12",
//!     "observacao": "",
//!     "subtotal": 23.0,
//!     "total": 23.0,
//!     "itens": [
//!       { "sequencia": 1, "codigo_produto": "100", "quantidade": 2, "valor_unitario": 10.0, "valor_total": 20.0 },
//!       { "sequencia": 2, "codigo_produto": "200", "quantidade": 2, "valor_unitario": 1.5, "valor_total": 3.0, "adicional": "1" }
//!     ]
//!   }
//! }
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Default delivery type code (table service)
pub const DEFAULT_DELIVERY_TYPE: &str = "2";
/// Default payment method code
pub const DEFAULT_PAYMENT_METHOD: &str = "1";

/// Complete submission body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(rename = "cliente")]
    pub customer: OrderCustomer,
    #[serde(rename = "pedido")]
    pub order: OrderHeader,
}

/// Placeholder customer record; the table stands in for the customer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCustomer {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// Order header with its line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderHeader {
    #[serde(rename = "tipo_entrega")]
    pub delivery_type: String,
    #[serde(rename = "forma_pagamento")]
    pub payment_method: String,
    /// Delivery target (the table label)
    #[serde(rename = "endereco_entrega")]
    pub delivery_address: String,
    /// Free-text notification (the table label)
    #[serde(rename = "notificacao")]
    pub notification: String,
    #[serde(rename = "observacao", default)]
    pub notes: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(rename = "itens")]
    pub lines: Vec<OrderLine>,
}

/// One order line; add-ons are separate lines following their main line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Running sequence shared by main and add-on lines, from 1
    #[serde(rename = "sequencia")]
    pub sequence: u32,
    #[serde(rename = "codigo_produto")]
    pub product_code: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "valor_unitario", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(rename = "valor_total", with = "rust_decimal::serde::float")]
    pub line_total: Decimal,
    #[serde(rename = "adicional", default, skip_serializing_if = "LineKind::is_main")]
    pub kind: LineKind,
}

/// Main product line or add-on line (`adicional: "1"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineKind {
    #[default]
    Main,
    AddOn,
}

impl LineKind {
    pub fn is_main(&self) -> bool {
        matches!(self, Self::Main)
    }

    /// Wire flag: empty for main lines, `"1"` for add-ons
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Main => "",
            Self::AddOn => "1",
        }
    }
}

impl Serialize for LineKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.flag())
    }
}

impl<'de> Deserialize<'de> for LineKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        let flag = raw.as_ref().and_then(crate::util::value_to_string);
        Ok(match flag.as_deref() {
            Some("1") => Self::AddOn,
            _ => Self::Main,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line(sequence: u32, kind: LineKind) -> OrderLine {
        OrderLine {
            sequence,
            product_code: "100".into(),
            description: String::new(),
            quantity: 2,
            unit_price: Decimal::new(1000, 2),
            line_total: Decimal::new(2000, 2),
            kind,
        }
    }

    #[test]
    fn test_main_line_omits_flag() {
        let value = serde_json::to_value(line(1, LineKind::Main)).unwrap();
        assert!(value.get("adicional").is_none());
        assert_eq!(value["valor_unitario"], json!(10.0));
        assert_eq!(value["valor_total"], json!(20.0));
    }

    #[test]
    fn test_addon_line_flag() {
        let value = serde_json::to_value(line(2, LineKind::AddOn)).unwrap();
        assert_eq!(value["adicional"], json!("1"));
        let back: OrderLine = serde_json::from_value(value).unwrap();
        assert_eq!(back.kind, LineKind::AddOn);
    }
}
