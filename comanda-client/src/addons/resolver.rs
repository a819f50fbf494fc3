//! Add-on lookup for a product
//!
//! Order of sources, first non-empty wins:
//! 1. the product's embedded `adicionais` block
//! 2. `grupo_adicional/consultar_por_produto`
//! 3. `adicional/consultar`
//! 4. `produto/consultar` with `incluir_adicionais`, reading the block of
//!    the matching product
//!
//! Failures at any step fall through to the next; nothing found is an empty
//! list, not an error.

use super::normalize;
use crate::http::action::{ADDON_GROUPS_BY_PRODUCT, ADDON_LOOKUP, PRODUCT_LOOKUP};
use crate::http::{Action, EnvelopeTransport, RpcRequest};
use serde_json::{Value, json};
use shared::models::{AddOnGroup, Product};
use shared::util::value_to_string;
use std::sync::Arc;

#[derive(Clone)]
pub struct AddOnResolver {
    transport: Arc<dyn EnvelopeTransport>,
}

impl AddOnResolver {
    pub fn new(transport: Arc<dyn EnvelopeTransport>) -> Self {
        Self { transport }
    }

    pub async fn resolve(&self, product: &Product) -> Vec<AddOnGroup> {
        if let Some(embedded) = &product.add_ons {
            let groups = normalize(embedded);
            if !groups.is_empty() {
                tracing::debug!(product = %product.code, groups = groups.len(), "Using embedded add-ons");
                return groups;
            }
        }

        let body = json!({ "codigo_produto": product.code });
        for action in [ADDON_GROUPS_BY_PRODUCT, ADDON_LOOKUP] {
            if let Some(payload) = self.fetch(&action, body.clone()).await {
                let groups = normalize(&payload);
                if !groups.is_empty() {
                    tracing::debug!(product = %product.code, %action, groups = groups.len(), "Resolved add-ons");
                    return groups;
                }
            }
        }

        let lookup = json!({ "codigo_produto": product.code, "incluir_adicionais": true });
        if let Some(payload) = self.fetch(&PRODUCT_LOOKUP, lookup).await
            && let Some(block) = extract_product_addons(&payload, &product.code)
        {
            let groups = normalize(block);
            if !groups.is_empty() {
                tracing::debug!(product = %product.code, groups = groups.len(), "Resolved add-ons from product lookup");
                return groups;
            }
        }

        tracing::debug!(product = %product.code, "No add-ons found");
        Vec::new()
    }

    async fn fetch(&self, action: &Action, body: Value) -> Option<Value> {
        match self.transport.call_success(RpcRequest::new(action.clone(), body)).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!(%action, error = %e, "Add-on lookup failed");
                None
            }
        }
    }
}

/// The `adicionais` block of product `code` inside a product lookup
/// response (single object or list).
fn extract_product_addons<'a>(payload: &'a Value, code: &str) -> Option<&'a Value> {
    let matches = |record: &&'a Value| {
        record
            .get("codigo")
            .and_then(value_to_string)
            .is_some_and(|c| c == code)
    };
    match payload {
        Value::Array(items) => items.iter().find(matches)?.get("adicionais"),
        Value::Object(_) if matches(&payload) => payload.get("adicionais"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use shared::Decimal;

    fn sauces() -> Value {
        json!([{"nome": "Sauces", "adicional_qtde_min": 1, "adicionais": [{"codigo": 1, "nome": "Ketchup"}]}])
    }

    fn product() -> Product {
        Product::new("100", "X-Burger", Some(Decimal::TEN))
    }

    #[tokio::test]
    async fn test_embedded_block_skips_backend() {
        let transport = Arc::new(ScriptedTransport::new());
        let resolver = AddOnResolver::new(transport.clone());
        let mut product = product();
        product.add_ons = Some(sauces());

        let groups = resolver.resolve(&product).await;
        assert_eq!(groups.len(), 1);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_first_action_wins() {
        let transport = Arc::new(ScriptedTransport::new().ok(ADDON_GROUPS_BY_PRODUCT, sauces()));
        let resolver = AddOnResolver::new(transport.clone());

        let groups = resolver.resolve(&product()).await;
        assert_eq!(groups[0].display_name, "Sauces");
        assert_eq!(transport.called_actions(), vec![ADDON_GROUPS_BY_PRODUCT]);
        assert_eq!(transport.requests()[0].body, json!({"codigo_produto": "100"}));
    }

    #[tokio::test]
    async fn test_falls_through_to_product_lookup() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .err(ADDON_GROUPS_BY_PRODUCT, "Função inexistente")
                .ok(ADDON_LOOKUP, json!([]))
                .ok(
                    PRODUCT_LOOKUP,
                    json!([
                        {"codigo": 99, "adicionais": [{"nome": "Wrong"}]},
                        {"codigo": 100, "adicionais": {"sucesso": sauces()}}
                    ]),
                ),
        );
        let resolver = AddOnResolver::new(transport.clone());

        let groups = resolver.resolve(&product()).await;
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].display_name, "Sauces");
        assert_eq!(
            transport.called_actions(),
            vec![ADDON_GROUPS_BY_PRODUCT, ADDON_LOOKUP, PRODUCT_LOOKUP]
        );
        assert_eq!(transport.requests()[2].body["incluir_adicionais"], true);
    }

    #[tokio::test]
    async fn test_nothing_found_is_empty() {
        // unscripted actions fail at the transport level
        let transport = Arc::new(ScriptedTransport::new().ok(PRODUCT_LOOKUP, json!({"codigo": "100"})));
        let resolver = AddOnResolver::new(transport);

        assert!(resolver.resolve(&product()).await.is_empty());
    }
}
