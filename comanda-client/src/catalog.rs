//! Product catalog, product images and the call-waiter request

use crate::error::ClientResult;
use crate::http::action::{CALL_WAITER_CANDIDATES, LIST_PRODUCTS};
use crate::http::{Action, EnvelopeTransport, RpcRequest};
use crate::probe::Prober;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dashmap::DashMap;
use serde_json::{Value, json};
use shared::models::{Product, ProductImage, TableLabel};
use std::sync::Arc;

/// Keys a product list may be nested under
const LIST_KEYS: &[&str] = &["produtos", "itens", "sucesso", "success"];

#[derive(Clone)]
pub struct Catalog {
    transport: Arc<dyn EnvelopeTransport>,
    prober: Prober,
    waiter_action: Option<Action>,
}

impl Catalog {
    pub fn new(transport: Arc<dyn EnvelopeTransport>) -> Self {
        Self {
            prober: Prober::new(transport.clone()),
            transport,
            waiter_action: None,
        }
    }

    /// Try `action` before the built-in call-waiter candidates
    pub fn with_waiter_action(mut self, action: Option<Action>) -> Self {
        self.waiter_action = action;
        self
    }

    /// Full product list. Records that do not parse are skipped.
    pub async fn products(&self) -> ClientResult<Vec<Product>> {
        let payload = self
            .transport
            .call_success(RpcRequest::new(LIST_PRODUCTS, json!({})))
            .await?;
        let products = parse_products(&payload);
        tracing::info!(count = products.len(), "Loaded products");
        Ok(products)
    }

    pub async fn active_products(&self) -> ClientResult<Vec<Product>> {
        Ok(self.products().await?.into_iter().filter(|p| p.active).collect())
    }

    /// Ask for a waiter at `table`. The action name differs between
    /// deployments, so candidates are probed in turn.
    pub async fn call_waiter(&self, table: &TableLabel) -> ClientResult<Value> {
        let mesa = match table {
            TableLabel::Table(number) => number.clone(),
            TableLabel::Counter => table.delivery_label(),
        };
        self.prober
            .probe(
                self.waiter_action.as_ref(),
                &CALL_WAITER_CANDIDATES,
                &json!({ "mesa": mesa }),
            )
            .await
    }
}

fn parse_products(payload: &Value) -> Vec<Product> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(obj) => match LIST_KEYS.iter().find_map(|key| obj.get(*key)) {
            Some(inner) => return parse_products(inner),
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<Product>(item.clone()) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::warn!(error = %e, record = %item, "Skipping unreadable product");
                None
            }
        })
        .collect()
}

/// Display-ready image URLs per product code
///
/// Remote URLs pass through; inline base64 becomes a `data:` URI with the
/// MIME type sniffed from the payload.
#[derive(Debug, Default, Clone)]
pub struct ImageResolver {
    cache: Arc<DashMap<String, String>>,
}

impl ImageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, product: &Product) -> Option<String> {
        if let Some(cached) = self.cache.get(&product.code) {
            return Some(cached.value().clone());
        }

        let url = match product.image_source()? {
            ProductImage::Url(url) => url,
            ProductImage::Inline(payload) => {
                let payload: String = payload.split_whitespace().collect();
                format!("data:{};base64,{}", sniff_mime(&payload), payload)
            }
        };
        self.cache.insert(product.code.clone(), url.clone());
        Some(url)
    }

    pub fn invalidate(&self, code: &str) {
        self.cache.remove(code);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// MIME type from the magic bytes at the start of a base64 payload
fn sniff_mime(payload: &str) -> &'static str {
    // 16 base64 chars = 12 bytes, enough for every signature below
    let prefix: String = payload.chars().take(16).collect();
    if !prefix.is_ascii() {
        return "image/jpeg";
    }
    let usable = prefix.len() - prefix.len() % 4;
    let bytes = STANDARD.decode(&prefix[..usable]).unwrap_or_default();

    match bytes.as_slice() {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::testing::ScriptedTransport;

    #[tokio::test]
    async fn test_products_skip_bad_records() {
        let transport = Arc::new(ScriptedTransport::new().ok(
            LIST_PRODUCTS,
            json!([
                {"codigo": 1, "nome": "Coxinha", "preco": "6,50"},
                {"nome": "sem codigo"},
                {"codigo": "2", "nome": "Pastel", "ativo": "N"}
            ]),
        ));
        let catalog = Catalog::new(transport);

        let products = catalog.products().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].code, "1");

        let active = catalog.active_products().await;
        // second call has no scripted response left
        assert!(active.is_err());
    }

    #[tokio::test]
    async fn test_active_products() {
        let transport = Arc::new(ScriptedTransport::new().ok(
            LIST_PRODUCTS,
            json!({"produtos": [
                {"codigo": 1, "ativo": true},
                {"codigo": 2, "ativo": 0}
            ]}),
        ));
        let catalog = Catalog::new(transport);

        let active = catalog.active_products().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].code, "1");
    }

    #[tokio::test]
    async fn test_call_waiter_probes_candidates() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .err(CALL_WAITER_CANDIDATES[0].clone(), "Função inexistente")
                .ok(CALL_WAITER_CANDIDATES[1].clone(), json!({"ok": true})),
        );
        let catalog = Catalog::new(transport.clone());

        let payload = catalog.call_waiter(&TableLabel::Table("7".into())).await.unwrap();
        assert_eq!(payload, json!({"ok": true}));
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(transport.requests()[1].body, json!({"mesa": "7"}));
    }

    #[tokio::test]
    async fn test_call_waiter_preferred_action() {
        let custom = Action::new("mesa", "chamar");
        let transport = Arc::new(ScriptedTransport::new().ok(custom.clone(), Value::Null));
        let catalog = Catalog::new(transport.clone()).with_waiter_action(Some(custom.clone()));

        catalog.call_waiter(&TableLabel::Counter).await.unwrap();
        assert_eq!(transport.called_actions(), vec![custom]);
        assert_eq!(transport.requests()[0].body, json!({"mesa": "BALCÃO"}));
    }

    #[tokio::test]
    async fn test_call_waiter_exhausted() {
        let catalog = Catalog::new(Arc::new(ScriptedTransport::new()));
        let err = catalog.call_waiter(&TableLabel::Counter).await.unwrap_err();
        assert!(matches!(err, ClientError::ProbeExhausted { attempts: 3 }));
    }

    #[test]
    fn test_image_url_passthrough_and_cache() {
        let resolver = ImageResolver::new();
        let mut product = Product::new("1", "Coxinha", None);
        product.image_url = Some("https://cdn.example.com/1.jpg".into());

        assert_eq!(resolver.resolve(&product).as_deref(), Some("https://cdn.example.com/1.jpg"));
        assert_eq!(resolver.len(), 1);

        // cached by code
        product.image_url = Some("https://cdn.example.com/other.jpg".into());
        assert_eq!(resolver.resolve(&product).as_deref(), Some("https://cdn.example.com/1.jpg"));

        resolver.invalidate("1");
        assert_eq!(resolver.resolve(&product).as_deref(), Some("https://cdn.example.com/other.jpg"));
    }

    #[test]
    fn test_inline_image_becomes_data_uri() {
        let resolver = ImageResolver::new();
        let mut product = Product::new("2", "Pastel", None);
        product.image_base64 = Some("iVBORw0KGgoAAAANSUhEUgAA".into());
        assert_eq!(
            resolver.resolve(&product).as_deref(),
            Some("data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAA")
        );

        let mut jpeg = Product::new("3", "Pizza", None);
        jpeg.photo = Some("/9j/4AAQSkZJRgABAQ".into());
        assert!(resolver.resolve(&jpeg).unwrap().starts_with("data:image/jpeg;base64,"));

        assert_eq!(resolver.resolve(&Product::new("4", "Sem foto", None)), None);
    }
}
