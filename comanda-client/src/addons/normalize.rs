//! Add-on payload classification

use serde_json::{Map, Value};
use shared::models::{AddOnGroup, AddOnOption};
use shared::util::{value_to_bool, value_to_decimal, value_to_string, value_to_u32};
use shared::Decimal;

const GROUP_NAME_KEYS: &[&str] = &["nome", "name", "display_name"];
const GROUP_MIN_KEYS: &[&str] = &["adicional_qtde_min", "min", "qtde_min", "min_required"];
const GROUP_MAX_KEYS: &[&str] = &["adicional_qtde_max", "max", "qtde_max", "max_allowed"];
const GROUP_MANDATORY_KEYS: &[&str] = &["obrigatorio", "mandatory"];
const GROUP_OPTIONS_KEYS: &[&str] = &["adicionais", "opcoes", "itens", "options"];

const OPTION_CODE_KEYS: &[&str] = &["codigo", "code", "id"];
const OPTION_NAME_KEYS: &[&str] = &["nome", "name"];
const OPTION_DESCRIPTION_KEYS: &[&str] = &["descricao", "description"];
const OPTION_PRICE_KEYS: &[&str] = &["preco", "valor", "price", "unit_price"];

const WRAPPER_KEYS: &[&str] = &["sucesso", "success"];

/// Shapes an add-on payload can take
#[derive(Debug, Clone, PartialEq)]
pub enum AddOnPayload {
    /// Array already in canonical shape
    Typed(Vec<AddOnGroup>),
    /// Array of vendor group records
    Raw(Vec<Value>),
    /// Envelope-like object holding another payload
    Wrapped(Box<AddOnPayload>),
    /// Null, empty or unrecognised
    Empty,
}

impl AddOnPayload {
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Array(items) if items.is_empty() => Self::Empty,
            Value::Array(items) => {
                match serde_json::from_value::<Vec<AddOnGroup>>(value.clone()) {
                    Ok(groups) => Self::Typed(groups),
                    Err(_) => Self::Raw(items.clone()),
                }
            }
            Value::Object(obj) => WRAPPER_KEYS
                .iter()
                .find_map(|key| obj.get(*key))
                .map(|inner| Self::Wrapped(Box::new(Self::classify(inner))))
                .unwrap_or(Self::Empty),
            _ => Self::Empty,
        }
    }

    pub fn into_groups(self) -> Vec<AddOnGroup> {
        match self {
            Self::Typed(groups) => groups,
            Self::Raw(records) => records.iter().filter_map(parse_group).collect(),
            Self::Wrapped(inner) => inner.into_groups(),
            Self::Empty => Vec::new(),
        }
    }
}

/// Canonical add-on groups from any supported payload shape.
///
/// Never fails: unreadable records are dropped, anything unrecognised is an
/// empty list.
pub fn normalize(payload: &Value) -> Vec<AddOnGroup> {
    AddOnPayload::classify(payload).into_groups()
}

fn parse_group(record: &Value) -> Option<AddOnGroup> {
    let Some(obj) = record.as_object() else {
        tracing::warn!(record = %record, "Dropping add-on group: not an object");
        return None;
    };

    let Some(name) = first(obj, GROUP_NAME_KEYS).and_then(value_to_string).filter(|n| !n.is_empty())
    else {
        tracing::warn!(record = %record, "Dropping add-on group without a name");
        return None;
    };

    let min = first(obj, GROUP_MIN_KEYS).and_then(value_to_u32).unwrap_or(0);
    let max = first(obj, GROUP_MAX_KEYS).and_then(value_to_u32);
    let explicit_mandatory = first(obj, GROUP_MANDATORY_KEYS)
        .and_then(value_to_bool)
        .unwrap_or(false);

    let options = match first(obj, GROUP_OPTIONS_KEYS) {
        Some(Value::Array(items)) => items.iter().filter_map(parse_option).collect(),
        _ => Vec::new(),
    };

    Some(AddOnGroup::new(name, options, min, max, explicit_mandatory))
}

fn parse_option(record: &Value) -> Option<AddOnOption> {
    let obj = record.as_object()?;
    let Some(code) = first(obj, OPTION_CODE_KEYS).and_then(value_to_string).filter(|c| !c.is_empty())
    else {
        tracing::warn!(record = %record, "Dropping add-on option without a code");
        return None;
    };

    let name = first(obj, OPTION_NAME_KEYS)
        .and_then(value_to_string)
        .unwrap_or_else(|| code.clone());
    let description = first(obj, OPTION_DESCRIPTION_KEYS)
        .and_then(value_to_string)
        .unwrap_or_default();
    let unit_price = first(obj, OPTION_PRICE_KEYS)
        .and_then(value_to_decimal)
        .unwrap_or(Decimal::ZERO);

    Some(AddOnOption {
        code,
        name,
        description,
        unit_price,
    })
}

/// First present, non-null value among `keys`
fn first<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|key| obj.get(*key)).find(|v| !v.is_null())
}
