//! Product Model

use crate::util::{
    lenient_bool_default_true, lenient_decimal_opt, lenient_string, lenient_string_opt,
    value_to_string,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Product type (`tipo`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProductKind {
    #[default]
    Product,
    Pizza,
    /// Any other vendor type code, kept verbatim
    Other(String),
}

impl ProductKind {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "" | "PRODUCT" | "PRODUTO" => Self::Product,
            "PIZZA" => Self::Pizza,
            _ => Self::Other(code.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Product => "PRODUCT",
            Self::Pizza => "PIZZA",
            Self::Other(code) => code,
        }
    }
}

impl Serialize for ProductKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProductKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(value_to_string)
            .map(|code| Self::from_code(&code))
            .unwrap_or_default())
    }
}

/// Resolved product image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductImage {
    /// Remote image URL
    Url(String),
    /// Inline base64 payload (without a `data:` prefix)
    Inline(String),
}

/// Product entity (catalog snapshot, never mutated by the client)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable product code
    #[serde(rename = "codigo", deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(rename = "codigo_categoria", default, deserialize_with = "lenient_string")]
    pub category_id: String,
    #[serde(rename = "tipo", default)]
    pub kind: ProductKind,
    #[serde(rename = "nome", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "descricao", default, deserialize_with = "lenient_string")]
    pub description: String,
    /// Unit price; `None` prices as zero
    #[serde(
        rename = "preco",
        default,
        deserialize_with = "lenient_decimal_opt",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub unit_price: Option<Decimal>,
    #[serde(
        rename = "estoque",
        default,
        deserialize_with = "lenient_decimal_opt",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub stock_quantity: Option<Decimal>,
    #[serde(
        rename = "ativo",
        default = "default_active",
        deserialize_with = "lenient_bool_default_true"
    )]
    pub active: bool,
    #[serde(rename = "categoria", default, deserialize_with = "lenient_string")]
    pub category_name: String,

    // === Image sources (first non-empty wins) ===
    #[serde(
        rename = "imagem",
        default,
        deserialize_with = "lenient_string_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,
    #[serde(
        rename = "url_imagem",
        default,
        deserialize_with = "lenient_string_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<String>,
    #[serde(
        rename = "foto",
        default,
        deserialize_with = "lenient_string_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo: Option<String>,
    #[serde(
        rename = "imagem_base64",
        default,
        deserialize_with = "lenient_string_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_base64: Option<String>,

    /// Embedded add-on block, in whatever shape the deployment sends it
    #[serde(rename = "adicionais", default, skip_serializing_if = "Option::is_none")]
    pub add_ons: Option<Value>,
}

fn default_active() -> bool {
    true
}

impl Product {
    /// Minimal product, mostly for tests and manual entry
    pub fn new(code: impl Into<String>, name: impl Into<String>, unit_price: Option<Decimal>) -> Self {
        Self {
            code: code.into(),
            category_id: String::new(),
            kind: ProductKind::Product,
            name: name.into(),
            description: String::new(),
            unit_price,
            stock_quantity: None,
            active: true,
            category_name: String::new(),
            image: None,
            image_url: None,
            photo: None,
            image_base64: None,
            add_ons: None,
        }
    }

    /// Unit price with `None` treated as zero
    pub fn price(&self) -> Decimal {
        self.unit_price.unwrap_or(Decimal::ZERO)
    }

    /// Pick the image source from the several field names deployments use.
    ///
    /// `http(s)://` and `data:` values are URLs; anything else is taken as
    /// inline base64.
    pub fn image_source(&self) -> Option<ProductImage> {
        let raw = [&self.image_url, &self.image, &self.photo, &self.image_base64]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())?;

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:") {
            Some(ProductImage::Url(raw.to_string()))
        } else {
            Some(ProductImage::Inline(raw.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_vendor_product() {
        let product: Product = serde_json::from_value(json!({
            "codigo": 100,
            "codigo_categoria": "7",
            "tipo": "PIZZA",
            "nome": "Calabresa",
            "preco": 39.9,
            "estoque": null,
            "ativo": "S",
            "categoria": "Pizzas",
            "foto": "https://cdn.example.com/100.png"
        }))
        .unwrap();

        assert_eq!(product.code, "100");
        assert_eq!(product.kind, ProductKind::Pizza);
        assert_eq!(product.unit_price, Some(Decimal::new(399, 1)));
        assert_eq!(product.stock_quantity, None);
        assert!(product.active);
        assert_eq!(
            product.image_source(),
            Some(ProductImage::Url("https://cdn.example.com/100.png".into()))
        );
    }

    #[test]
    fn test_null_price_is_zero() {
        let product: Product =
            serde_json::from_value(json!({"codigo": "A1", "preco": null})).unwrap();
        assert_eq!(product.unit_price, None);
        assert_eq!(product.price(), Decimal::ZERO);
        assert_eq!(product.kind, ProductKind::Product);
    }

    #[test]
    fn test_unknown_kind_kept() {
        let product: Product =
            serde_json::from_value(json!({"codigo": "1", "tipo": "COMBO"})).unwrap();
        assert_eq!(product.kind, ProductKind::Other("COMBO".into()));
        assert_eq!(product.kind.as_str(), "COMBO");
    }

    #[test]
    fn test_image_url_preferred_over_inline() {
        let product: Product = serde_json::from_value(json!({
            "codigo": "1",
            "imagem_base64": "iVBORw0KGgo=",
            "url_imagem": " "
        }))
        .unwrap();
        assert_eq!(
            product.image_source(),
            Some(ProductImage::Inline("iVBORw0KGgo=".into()))
        );
    }
}
