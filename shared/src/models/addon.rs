//! Add-on (adicional) models
//!
//! Canonical shape produced by the add-on normalizer. Vendor records use
//! other field names; see `comanda_client::addons`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One selectable add-on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOnOption {
    /// Unique within its group
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Extra charge per unit (may be zero)
    #[serde(with = "rust_decimal::serde::float", default)]
    pub unit_price: Decimal,
}

impl AddOnOption {
    pub fn new(code: impl Into<String>, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: String::new(),
            unit_price,
        }
    }
}

/// Group of add-ons offered for a product
///
/// Deserializing goes through [`AddOnGroup::new`], so `mandatory` and
/// `max_allowed` are always derived the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AddOnGroupRecord")]
pub struct AddOnGroup {
    pub display_name: String,
    #[serde(default)]
    pub options: Vec<AddOnOption>,
    /// 0 = optional
    #[serde(default)]
    pub min_required: u32,
    /// `None` = unlimited
    #[serde(default)]
    pub max_allowed: Option<u32>,
    #[serde(default)]
    pub mandatory: bool,
}

/// Wire form of [`AddOnGroup`] before the flags are derived
#[derive(Deserialize)]
struct AddOnGroupRecord {
    display_name: String,
    #[serde(default)]
    options: Vec<AddOnOption>,
    #[serde(default)]
    min_required: u32,
    #[serde(default)]
    max_allowed: Option<u32>,
    #[serde(default)]
    mandatory: bool,
}

impl From<AddOnGroupRecord> for AddOnGroup {
    fn from(record: AddOnGroupRecord) -> Self {
        Self::new(
            record.display_name,
            record.options,
            record.min_required,
            record.max_allowed,
            record.mandatory,
        )
    }
}

impl AddOnGroup {
    /// Build a group; `mandatory` follows `min_required > 0` unless explicitly set.
    pub fn new(
        display_name: impl Into<String>,
        options: Vec<AddOnOption>,
        min_required: u32,
        max_allowed: Option<u32>,
        explicit_mandatory: bool,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            options,
            min_required,
            max_allowed: max_allowed.filter(|max| *max > 0),
            mandatory: min_required > 0 || explicit_mandatory,
        }
    }

    /// Minimum selections a cart line needs from this group
    pub fn required_selections(&self) -> u32 {
        if self.mandatory {
            self.min_required.max(1)
        } else {
            0
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.options.iter().any(|o| o.code == code)
    }

    pub fn find_option(&self, code: &str) -> Option<&AddOnOption> {
        self.options.iter().find(|o| o.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_makes_group_mandatory() {
        let group = AddOnGroup::new("Sauces", vec![], 2, Some(0), false);
        assert!(group.mandatory);
        assert_eq!(group.required_selections(), 2);
        assert_eq!(group.max_allowed, None);
    }

    #[test]
    fn test_explicit_flag_without_min() {
        let group = AddOnGroup::new("Bread", vec![], 0, Some(1), true);
        assert!(group.mandatory);
        assert_eq!(group.required_selections(), 1);
        assert_eq!(group.max_allowed, Some(1));
    }

    #[test]
    fn test_deserialize_derives_flags() {
        let group: AddOnGroup = serde_json::from_value(serde_json::json!({
            "display_name": "Sauces",
            "min_required": 2,
            "max_allowed": 0,
            "mandatory": false
        }))
        .unwrap();
        assert!(group.mandatory);
        assert_eq!(group.max_allowed, None);
        assert_eq!(group.required_selections(), 2);
    }

    #[test]
    fn test_optional_group() {
        let opt = AddOnOption::new("200", "Bacon", Decimal::new(150, 2));
        let group = AddOnGroup::new("Extras", vec![opt], 0, None, false);
        assert!(!group.mandatory);
        assert_eq!(group.required_selections(), 0);
        assert!(group.contains("200"));
        assert_eq!(group.find_option("200").map(|o| o.name.as_str()), Some("Bacon"));
    }
}
