//! Compensation plan and platform settings.
//!
//! Most of these records are the form fields plus an id and timestamps, so
//! the record embeds its form with `#[serde(flatten)]`.

use serde::{Deserialize, Serialize};

use super::catalog::CATEGORY_OPTIONS;
use super::{Entity, EntityForm, Related, amount, cell};
use crate::api::{EntityId, Endpoints, ReferenceSource, Resource};
use crate::validation::{FieldErrors, Validate};

// ----------------------------------------------------------------------
// Commission configuration
// ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionConfiguration {
    pub id: EntityId,
    #[serde(flatten)]
    pub bonuses: CommissionConfigurationForm,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Bonus amounts paid out per commission type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionConfigurationForm {
    pub direct_bonus: f64,
    pub indirect_bonus: f64,
    pub rank_achievement: f64,
    pub unilevel_bonus: f64,
    #[serde(rename = "loyality_bonus")]
    pub loyalty_bonus: f64,
    pub fast_track_bonus: f64,
    pub display_bonus: f64,
    pub incentive_bonus: f64,
    pub profit_share_bonus: f64,
}

impl Validate for CommissionConfigurationForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for (field, value, message) in [
            ("direct_bonus", self.direct_bonus, "Direct bonus must be >= 0"),
            ("indirect_bonus", self.indirect_bonus, "Indirect bonus must be >= 0"),
            ("rank_achievement", self.rank_achievement, "Rank achievement must be >= 0"),
            ("unilevel_bonus", self.unilevel_bonus, "Unilevel bonus must be >= 0"),
            ("loyality_bonus", self.loyalty_bonus, "Loyalty bonus must be >= 0"),
            ("fast_track_bonus", self.fast_track_bonus, "Fast track bonus must be >= 0"),
            ("display_bonus", self.display_bonus, "Display bonus must be >= 0"),
            ("incentive_bonus", self.incentive_bonus, "Incentive bonus must be >= 0"),
            ("profit_share_bonus", self.profit_share_bonus, "Profit share bonus must be >= 0"),
        ] {
            errors.at_least(field, value, 0.0, message);
        }
        errors.into_result()
    }
}

impl EntityForm for CommissionConfigurationForm {}

impl Entity for CommissionConfiguration {
    type Form = CommissionConfigurationForm;

    const RESOURCE: Resource = Resource {
        key: "commission-configurations",
        singular: "commission configuration",
        plural: "commission configurations",
        endpoints: Endpoints::new(
            "get_commission_configurations",
            "post_commission_configuration",
            "update_commission_configuration",
            "delete_commission_configuration",
        ),
    };

    const COLUMNS: &'static [&'static str] = &[
        "ID",
        "Direct",
        "Indirect",
        "Rank",
        "Unilevel",
        "Loyalty",
        "Fast Track",
        "Display",
        "Incentive",
        "Profit Share",
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_form(&self) -> CommissionConfigurationForm {
        self.bonuses.clone()
    }

    fn row(&self) -> Vec<String> {
        let b = &self.bonuses;
        let mut row = vec![self.id.to_string()];
        row.extend(
            [
                b.direct_bonus,
                b.indirect_bonus,
                b.rank_achievement,
                b.unilevel_bonus,
                b.loyalty_bonus,
                b.fast_track_bonus,
                b.display_bonus,
                b.incentive_bonus,
                b.profit_share_bonus,
            ]
            .into_iter()
            .map(amount),
        );
        row
    }
}

// ----------------------------------------------------------------------
// Unilevel configuration
// ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnilevelConfiguration {
    pub id: EntityId,
    pub level: u32,
    pub category: Related,
    #[serde(default)]
    pub category_name: Option<String>,
    pub percentage: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Percentage paid at one depth of the sponsor tree for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnilevelConfigurationForm {
    pub level: u32,
    pub category: EntityId,
    pub percentage: f64,
}

impl Validate for UnilevelConfigurationForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.level >= 1, "level", "Level must be at least 1");
        errors.check(self.category >= 1, "category", "Category is required");
        errors.percentage("percentage", self.percentage);
        errors.into_result()
    }
}

impl EntityForm for UnilevelConfigurationForm {}

impl Entity for UnilevelConfiguration {
    type Form = UnilevelConfigurationForm;

    const RESOURCE: Resource = Resource {
        key: "unilevel-configurations",
        singular: "unilevel configuration",
        plural: "unilevel configurations",
        endpoints: Endpoints::new(
            "get_unilevel_configurations",
            "post_unilevel_configuration",
            "update_unilevel_configuration",
            "delete_unilevel_configuration",
        ),
    };

    const COLUMNS: &'static [&'static str] = &["ID", "Level", "Category", "Percentage"];

    const REFERENCES: &'static [ReferenceSource] = &[CATEGORY_OPTIONS];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_form(&self) -> UnilevelConfigurationForm {
        UnilevelConfigurationForm {
            level: self.level,
            category: self.category.id().unwrap_or_default(),
            percentage: self.percentage,
        }
    }

    fn row(&self) -> Vec<String> {
        let category = self
            .category_name
            .clone()
            .unwrap_or_else(|| self.category.label(&[&["name"]]));
        vec![
            self.id.to_string(),
            self.level.to_string(),
            category,
            format!("{}%", self.percentage),
        ]
    }
}

// ----------------------------------------------------------------------
// Tree setting
// ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSetting {
    pub id: EntityId,
    #[serde(flatten)]
    pub values: TreeSettingForm,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettingForm {
    /// Width limit of the placement tree
    pub max_children: u32,
}

impl Validate for TreeSettingForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.max_children >= 1, "max_children", "Must be at least 1");
        errors.into_result()
    }
}

impl EntityForm for TreeSettingForm {}

impl Entity for TreeSetting {
    type Form = TreeSettingForm;

    const RESOURCE: Resource = Resource {
        key: "tree-settings",
        singular: "tree setting",
        plural: "tree settings",
        endpoints: Endpoints::new(
            "get_tree_settings",
            "post_tree_setting",
            "update_tree_setting",
            "delete_tree_setting",
        ),
    };

    const COLUMNS: &'static [&'static str] = &["ID", "Max Children", "Updated"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_form(&self) -> TreeSettingForm {
        self.values.clone()
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.values.max_children.to_string(),
            cell(&self.updated_at),
        ]
    }
}

// ----------------------------------------------------------------------
// MLM setting
// ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlmSetting {
    pub id: EntityId,
    #[serde(flatten)]
    pub values: MlmSettingForm,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlmSettingForm {
    pub max_level: u32,
    pub min_withdrawal_amount: f64,
    /// Days between payouts; `null` when payouts are manual
    pub payout_frequency: Option<u32>,
}

impl Validate for MlmSettingForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.max_level >= 1, "max_level", "Must be at least 1");
        errors.at_least(
            "min_withdrawal_amount",
            self.min_withdrawal_amount,
            0.01,
            "Must be at least 0.01",
        );
        if let Some(frequency) = self.payout_frequency {
            errors.check(frequency >= 1, "payout_frequency", "Must be at least 1");
        }
        errors.into_result()
    }
}

impl EntityForm for MlmSettingForm {}

impl Entity for MlmSetting {
    type Form = MlmSettingForm;

    const RESOURCE: Resource = Resource {
        key: "mlm-settings",
        singular: "MLM setting",
        plural: "MLM settings",
        endpoints: Endpoints::new(
            "get_mlm_settings",
            "post_mlm_setting",
            "update_mlm_setting",
            "delete_mlm_setting",
        ),
    };

    const COLUMNS: &'static [&'static str] =
        &["ID", "Max Level", "Min Withdrawal", "Payout Frequency"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_form(&self) -> MlmSettingForm {
        self.values.clone()
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.values.max_level.to_string(),
            amount(self.values.min_withdrawal_amount),
            cell(&self.values.payout_frequency),
        ]
    }
}

// ----------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub id: EntityId,
    #[serde(flatten)]
    pub values: ConfigurationForm,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Revenue split and investment amounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationForm {
    pub investment_amount: f64,
    pub housing_or_car_investment: f64,
    pub sacco: f64,
    pub company_revenue_product_percentage: f64,
    pub company_revenue_product: f64,
    #[serde(rename = "product_disrtribution_reward_percentage")]
    pub product_distribution_reward_percentage: f64,
    pub product_distribution_reward: f64,
    pub company_revenue_training_percentage: f64,
    pub company_revenue_training: f64,
    pub training_distribution_reward_percentage: f64,
    pub training_distribution_reward: f64,
    pub service_charge: f64,
}

impl Validate for ConfigurationForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.percentage(
            "company_revenue_product_percentage",
            self.company_revenue_product_percentage,
        );
        errors.percentage(
            "company_revenue_training_percentage",
            self.company_revenue_training_percentage,
        );
        for (field, value) in [
            ("investment_amount", self.investment_amount),
            ("housing_or_car_investment", self.housing_or_car_investment),
            ("sacco", self.sacco),
            ("company_revenue_product", self.company_revenue_product),
            (
                "product_disrtribution_reward_percentage",
                self.product_distribution_reward_percentage,
            ),
            ("product_distribution_reward", self.product_distribution_reward),
            ("company_revenue_training", self.company_revenue_training),
            (
                "training_distribution_reward_percentage",
                self.training_distribution_reward_percentage,
            ),
            ("training_distribution_reward", self.training_distribution_reward),
            ("service_charge", self.service_charge),
        ] {
            errors.at_least(field, value, 0.0, "Required");
        }
        errors.into_result()
    }
}

impl EntityForm for ConfigurationForm {}

impl Entity for Configuration {
    type Form = ConfigurationForm;

    const RESOURCE: Resource = Resource {
        key: "configurations",
        singular: "configuration",
        plural: "configurations",
        endpoints: Endpoints::new(
            "get_configurations",
            "post_configuration",
            "update_configuration",
            "delete_configuration",
        ),
    };

    const COLUMNS: &'static [&'static str] = &[
        "ID",
        "Investment",
        "Housing/Car",
        "SACCO",
        "Product Rev %",
        "Training Rev %",
        "Service Charge",
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_form(&self) -> ConfigurationForm {
        self.values.clone()
    }

    fn row(&self) -> Vec<String> {
        let v = &self.values;
        vec![
            self.id.to_string(),
            amount(v.investment_amount),
            amount(v.housing_or_car_investment),
            amount(v.sacco),
            format!("{}%", v.company_revenue_product_percentage),
            format!("{}%", v.company_revenue_training_percentage),
            amount(v.service_charge),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_commission_configuration_wire_names() {
        let record: CommissionConfiguration = serde_json::from_value(json!({
            "id": 1,
            "direct_bonus": 10, "indirect_bonus": 5, "rank_achievement": 0,
            "unilevel_bonus": 2, "loyality_bonus": 1.5, "fast_track_bonus": 0,
            "display_bonus": 0, "incentive_bonus": 0, "profit_share_bonus": 3,
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(record.bonuses.loyalty_bonus, 1.5);
        assert_eq!(record.row()[5], "1.50");

        let payload = record.to_form().payload().unwrap();
        assert_eq!(payload["loyality_bonus"], json!(1.5));
        assert!(payload.get("id").is_none());
    }

    #[test]
    fn test_negative_bonus_rejected() {
        let form = CommissionConfigurationForm {
            loyalty_bonus: -1.0,
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("loyality_bonus"), Some("Loyalty bonus must be >= 0"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_unilevel_validation() {
        let form = UnilevelConfigurationForm {
            level: 0,
            category: 2,
            percentage: 120.0,
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("level"), Some("Level must be at least 1"));
        assert_eq!(errors.get("percentage"), Some("Percentage cannot exceed 100"));
        assert!(errors.get("category").is_none());
    }

    #[test]
    fn test_mlm_setting_optional_frequency() {
        let form = MlmSettingForm {
            max_level: 5,
            min_withdrawal_amount: 10.0,
            payout_frequency: None,
        };
        assert!(form.validate().is_ok());
        assert!(form.payload().unwrap()["payout_frequency"].is_null());

        let form = MlmSettingForm {
            payout_frequency: Some(0),
            ..form
        };
        assert_eq!(
            form.validate().unwrap_err().get("payout_frequency"),
            Some("Must be at least 1")
        );
    }

    #[test]
    fn test_configuration_percentages_and_typo_field() {
        let form = ConfigurationForm {
            company_revenue_product_percentage: 101.0,
            product_distribution_reward_percentage: 4.0,
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get("company_revenue_product_percentage"),
            Some("Percentage cannot exceed 100")
        );
        assert_eq!(errors.len(), 1);

        let payload = form.payload().unwrap();
        assert_eq!(payload["product_disrtribution_reward_percentage"], json!(4.0));
    }

    #[test]
    fn test_tree_setting() {
        assert!(TreeSettingForm { max_children: 0 }.validate().is_err());
        let record: TreeSetting =
            serde_json::from_value(json!({"id": 2, "max_children": 3})).unwrap();
        assert_eq!(record.row(), vec!["2", "3", ""]);
    }
}
