//! Managed resources.
//!
//! Each resource is a record type (what the backend returns), a form type
//! (what is sent on create/update) and a static [`Resource`] descriptor. The
//! collection controller and the HTTP backend are generic over [`Entity`], so
//! adding a resource is a declaration, not a new screen.

pub mod catalog;
pub mod sales;
pub mod settings;
pub mod user;

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{EntityId, ReferenceSource, Resource};
use crate::error::Result;
use crate::validation::Validate;

pub use catalog::{
    Category, CategoryForm, Package, PackageForm, Product, ProductForm, Training, TrainingForm,
    add_products_to_package, add_trainings_to_package, package_products, package_trainings,
};
pub use sales::{
    Commission, CommissionForm, Sale, SaleForm, SaleStatus, TransactionType, WalletTransaction,
    WalletTransactionForm,
};
pub use settings::{
    CommissionConfiguration, CommissionConfigurationForm, Configuration, ConfigurationForm,
    MlmSetting, MlmSettingForm, TreeSetting, TreeSettingForm, UnilevelConfiguration,
    UnilevelConfigurationForm,
};
pub use user::{User, UserForm};

/// A record of one managed collection.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Editable payload for create and update
    type Form: EntityForm;

    const RESOURCE: Resource;

    /// Table headers, matching [`Entity::row`]
    const COLUMNS: &'static [&'static str];

    /// Foreign-key option lists the form needs
    const REFERENCES: &'static [ReferenceSource] = &[];

    fn id(&self) -> EntityId;

    /// Pre-populated form for editing this record.
    fn to_form(&self) -> Self::Form;

    /// Display cells, one per column.
    fn row(&self) -> Vec<String>;
}

/// The payload side of an [`Entity`]. `Default` is the empty add form.
pub trait EntityForm:
    Clone + Debug + Default + Serialize + DeserializeOwned + Validate + Send + Sync + 'static
{
    /// JSON body sent to the backend.
    fn payload(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A reference to another record, which the backend sends either as a bare
/// id, as a nested object, or (for some serializers) as a display string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related {
    Id(EntityId),
    Record {
        id: EntityId,
        #[serde(flatten)]
        fields: serde_json::Map<String, Value>,
    },
    Label(String),
}

impl Related {
    pub fn id(&self) -> Option<EntityId> {
        match self {
            Related::Id(id) | Related::Record { id, .. } => Some(*id),
            Related::Label(_) => None,
        }
    }

    /// Text at a nested field path, e.g. `["product", "name"]`.
    pub fn text(&self, path: &[&str]) -> Option<String> {
        let Related::Record { fields, .. } = self else {
            return None;
        };
        let (first, rest) = path.split_first()?;
        let mut value = fields.get(*first)?;
        for key in rest {
            value = value.get(*key)?;
        }
        match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// First available label from `paths`, falling back to `#id`.
    pub fn label(&self, paths: &[&[&str]]) -> String {
        if let Related::Label(label) = self {
            return label.clone();
        }
        paths
            .iter()
            .find_map(|path| self.text(path))
            .or_else(|| self.id().map(|id| format!("#{id}")))
            .unwrap_or_default()
    }
}

/// Selector for the managed collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Users,
    Categories,
    Products,
    Trainings,
    Packages,
    Sales,
    Commissions,
    WalletTransactions,
    CommissionConfigurations,
    UnilevelConfigurations,
    TreeSettings,
    MlmSettings,
    Configurations,
}

enum_display_fromstr!(ResourceKind, "resource", {
    Users => "users",
    Categories => "categories",
    Products => "products",
    Trainings => "trainings",
    Packages => "packages",
    Sales => "sales",
    Commissions => "commissions",
    WalletTransactions => "wallet-transactions",
    CommissionConfigurations => "commission-configurations",
    UnilevelConfigurations => "unilevel-configurations",
    TreeSettings => "tree-settings",
    MlmSettings => "mlm-settings",
    Configurations => "configurations",
});

impl ResourceKind {
    pub const ALL: [ResourceKind; 13] = [
        ResourceKind::Users,
        ResourceKind::Categories,
        ResourceKind::Products,
        ResourceKind::Trainings,
        ResourceKind::Packages,
        ResourceKind::Sales,
        ResourceKind::Commissions,
        ResourceKind::WalletTransactions,
        ResourceKind::CommissionConfigurations,
        ResourceKind::UnilevelConfigurations,
        ResourceKind::TreeSettings,
        ResourceKind::MlmSettings,
        ResourceKind::Configurations,
    ];

    pub fn resource(self) -> Resource {
        with_entity!(self, E => E::RESOURCE)
    }

    pub fn references(self) -> &'static [ReferenceSource] {
        with_entity!(self, E => E::REFERENCES)
    }
}

/// Cell text for optional values.
pub(crate) fn cell<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Money and quantities with two decimals.
pub(crate) fn amount(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_related_shapes() {
        let id: Related = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(id.id(), Some(7));
        assert_eq!(id.label(&[&["name"]]), "#7");

        let record: Related =
            serde_json::from_value(json!({"id": 3, "product": {"name": "Soap"}})).unwrap();
        assert_eq!(record.id(), Some(3));
        assert_eq!(record.label(&[&["name"], &["product", "name"]]), "Soap");

        let label: Related = serde_json::from_value(json!("Electronics")).unwrap();
        assert_eq!(label.id(), None);
        assert_eq!(label.label(&[]), "Electronics");
    }

    #[test]
    fn test_resource_keys_match_kinds() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.resource().key, kind.to_string());
            assert_eq!(kind.to_string().parse::<ResourceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_resource() {
        assert!("widgets".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_amount_format() {
        assert_eq!(amount(12.5), "12.50");
        assert_eq!(cell::<u32>(&None), "");
        assert_eq!(cell(&Some(4)), "4");
    }
}
