//! Header-routed actions
//!
//! Every call goes to the same endpoint; the backend dispatches on the
//! `modulo` and `funcao` headers.

use std::borrow::Cow;
use std::fmt;

/// Header carrying the business module
pub const MODULE_HEADER: &str = "modulo";
/// Header carrying the action name
pub const FUNCTION_HEADER: &str = "funcao";
/// Tenant header and query parameter
pub const TENANT_KEY: &str = "empresa";
/// User header
pub const USER_HEADER: &str = "usuario";
/// Access token header
pub const TOKEN_HEADER: &str = "token";

/// Reserved function name; never receives tenant headers
pub const AUTHENTICATE_FUNCTION: &str = "autenticar_dispositivo";

/// A `(module, function)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Action {
    pub module: Cow<'static, str>,
    pub function: Cow<'static, str>,
}

impl Action {
    pub const fn new(module: &'static str, function: &'static str) -> Self {
        Self {
            module: Cow::Borrowed(module),
            function: Cow::Borrowed(function),
        }
    }

    pub fn owned(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: Cow::Owned(module.into()),
            function: Cow::Owned(function.into()),
        }
    }

    /// Parse `"module/function"`
    pub fn parse(raw: &str) -> Option<Self> {
        let (module, function) = raw.split_once('/')?;
        let (module, function) = (module.trim(), function.trim());
        if module.is_empty() || function.is_empty() {
            return None;
        }
        Some(Self::owned(module, function))
    }

    pub fn is_authentication(&self) -> bool {
        self.function == AUTHENTICATE_FUNCTION
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module, self.function)
    }
}

// ========== Known actions ==========

pub const AUTHENTICATE_DEVICE: Action = Action::new("dispositivo", AUTHENTICATE_FUNCTION);
pub const SUBMIT_ORDER: Action = Action::new("pedido", "gravar");
pub const LIST_PRODUCTS: Action = Action::new("produto", "listar");
pub const PRODUCT_LOOKUP: Action = Action::new("produto", "consultar");
pub const ADDON_GROUPS_BY_PRODUCT: Action = Action::new("grupo_adicional", "consultar_por_produto");
pub const ADDON_LOOKUP: Action = Action::new("adicional", "consultar");

/// Call-waiter names seen across deployments, in probe order
pub const CALL_WAITER_CANDIDATES: [Action; 3] = [
    Action::new("mesa", "chamar_garcom"),
    Action::new("garcom", "chamar"),
    Action::new("atendimento", "chamar_garcom"),
];
