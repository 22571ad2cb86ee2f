//! Sales, the commissions they generate, and wallet movements.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::{PACKAGE_OPTIONS, PRODUCT_OPTIONS};
use super::{Entity, EntityForm, Related, amount, cell};
use crate::api::{EntityId, Endpoints, ReferenceSource, Resource};
use crate::error;
use crate::validation::{FieldErrors, Validate};

const USER_LABELS: &[&str] = &["username", "email"];

const SALE_OPTIONS: ReferenceSource = ReferenceSource {
    field: "sale",
    label: "sales",
    endpoint: "get_sales",
    label_fields: &["product.name", "buyer.username"],
};

const MIN_AMOUNT: f64 = 0.01;
const MIN_AMOUNT_MSG: &str = "Must be at least 0.01";

fn date_part(value: &str) -> &str {
    value.split('T').next().unwrap_or(value)
}

// ----------------------------------------------------------------------
// Sale
// ----------------------------------------------------------------------

/// Whether commissions have been booked for a sale. The misspelling is
/// the backend's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaleStatus {
    #[serde(rename = "commision recorded")]
    CommissionRecorded,
    #[default]
    #[serde(rename = "not recorded")]
    NotRecorded,
}

enum_display_fromstr!(SaleStatus, "sale status", {
    CommissionRecorded => "commision recorded",
    NotRecorded => "not recorded",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: EntityId,
    pub product: Related,
    pub package: Related,
    pub seller: Related,
    pub buyer: Related,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub sub_total: f64,
    #[serde(default)]
    pub payment_date: String,
    #[serde(default)]
    pub status: SaleStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleForm {
    pub product: EntityId,
    pub package: EntityId,
    pub seller: EntityId,
    pub buyer: EntityId,
    pub quantity: f64,
    pub price: f64,
    /// `YYYY-MM-DD`
    pub payment_date: String,
    pub status: SaleStatus,
}

impl Default for SaleForm {
    /// Empty sale dated today.
    fn default() -> Self {
        Self {
            product: 0,
            package: 0,
            seller: 0,
            buyer: 0,
            quantity: 0.0,
            price: 0.0,
            payment_date: jiff::Zoned::now().date().to_string(),
            status: SaleStatus::default(),
        }
    }
}

impl SaleForm {
    /// Line total, always derived from quantity and price.
    pub fn sub_total(&self) -> f64 {
        self.quantity * self.price
    }
}

impl Validate for SaleForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.product >= 1, "product", "Product is required");
        errors.check(self.package >= 1, "package", "Package is required");
        errors.check(self.seller >= 1, "seller", "Seller is required");
        errors.check(self.buyer >= 1, "buyer", "Buyer is required");
        errors.at_least("quantity", self.quantity, MIN_AMOUNT, MIN_AMOUNT_MSG);
        errors.at_least("price", self.price, MIN_AMOUNT, MIN_AMOUNT_MSG);
        errors.at_least("sub_total", self.sub_total(), MIN_AMOUNT, MIN_AMOUNT_MSG);
        if self.payment_date.trim().is_empty() {
            errors.add("payment_date", "Payment date is required");
        } else {
            errors.iso_date(
                "payment_date",
                &self.payment_date,
                "Payment date must be YYYY-MM-DD",
            );
        }
        errors.into_result()
    }
}

impl EntityForm for SaleForm {
    fn payload(&self) -> error::Result<Value> {
        let mut payload = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut payload {
            map.insert("sub_total".to_string(), Value::from(self.sub_total()));
        }
        Ok(payload)
    }
}

impl Entity for Sale {
    type Form = SaleForm;

    const RESOURCE: Resource = Resource {
        key: "sales",
        singular: "sale",
        plural: "sales",
        endpoints: Endpoints::new("get_sales", "post_sale", "update_sale", "delete_sale"),
    };

    const COLUMNS: &'static [&'static str] = &[
        "ID",
        "Product",
        "Package",
        "Seller",
        "Buyer",
        "Quantity",
        "Price",
        "Sub Total",
        "Payment Date",
        "Status",
    ];

    const REFERENCES: &'static [ReferenceSource] = &[
        PRODUCT_OPTIONS,
        PACKAGE_OPTIONS,
        ReferenceSource {
            field: "users",
            label: "users",
            endpoint: "get_users",
            label_fields: USER_LABELS,
        },
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_form(&self) -> SaleForm {
        SaleForm {
            product: self.product.id().unwrap_or_default(),
            package: self.package.id().unwrap_or_default(),
            seller: self.seller.id().unwrap_or_default(),
            buyer: self.buyer.id().unwrap_or_default(),
            quantity: self.quantity,
            price: self.price,
            payment_date: date_part(&self.payment_date).to_string(),
            status: self.status,
        }
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.product.label(&[&["name"]]),
            self.package.label(&[&["name"]]),
            self.seller.label(&[&["username"], &["email"]]),
            self.buyer.label(&[&["username"], &["email"]]),
            self.quantity.to_string(),
            amount(self.price),
            amount(self.sub_total),
            date_part(&self.payment_date).to_string(),
            self.status.to_string(),
        ]
    }
}

// ----------------------------------------------------------------------
// Commission
// ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commission {
    pub id: EntityId,
    pub sale: Related,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionForm {
    pub sale: EntityId,
    pub amount: f64,
}

impl Validate for CommissionForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.sale >= 1, "sale", "Sale is required");
        errors.at_least("amount", self.amount, MIN_AMOUNT, MIN_AMOUNT_MSG);
        errors.into_result()
    }
}

impl EntityForm for CommissionForm {}

impl Entity for Commission {
    type Form = CommissionForm;

    const RESOURCE: Resource = Resource {
        key: "commissions",
        singular: "commission",
        plural: "commissions",
        endpoints: Endpoints::new(
            "get_commissions",
            "post_commission",
            "update_commission",
            "delete_commission",
        ),
    };

    const COLUMNS: &'static [&'static str] = &["ID", "Sale", "Amount", "Created", "Updated"];

    const REFERENCES: &'static [ReferenceSource] = &[SALE_OPTIONS];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_form(&self) -> CommissionForm {
        CommissionForm {
            sale: self.sale.id().unwrap_or_default(),
            amount: self.amount,
        }
    }

    fn row(&self) -> Vec<String> {
        let product = self.sale.label(&[&["product", "name"]]);
        let sale = match self.sale.text(&["buyer", "username"]) {
            Some(buyer) => format!("{product} - {buyer}"),
            None => product,
        };
        vec![
            self.id.to_string(),
            sale,
            amount(self.amount),
            cell(&self.created_at),
            cell(&self.updated_at),
        ]
    }
}

// ----------------------------------------------------------------------
// Wallet transaction
// ----------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Credit,
    Debit,
}

enum_display_fromstr!(TransactionType, "transaction type", {
    Credit => "credit",
    Debit => "debit",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: EntityId,
    pub user: Related,
    #[serde(default)]
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Commission that produced this movement, if any
    #[serde(default)]
    pub reference: Option<Related>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletTransactionForm {
    pub user: EntityId,
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Sent as `null` when unset
    pub reference: Option<EntityId>,
}

impl Validate for WalletTransactionForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.user >= 1, "user", "User is required");
        errors.at_least("amount", self.amount, MIN_AMOUNT, MIN_AMOUNT_MSG);
        errors.into_result()
    }
}

impl EntityForm for WalletTransactionForm {}

impl Entity for WalletTransaction {
    type Form = WalletTransactionForm;

    const RESOURCE: Resource = Resource {
        key: "wallet-transactions",
        singular: "wallet transaction",
        plural: "wallet transactions",
        endpoints: Endpoints::new(
            "get_wallet_transactions",
            "post_wallet_transaction",
            "update_wallet_transaction",
            "delete_wallet_transaction",
        ),
    };

    const COLUMNS: &'static [&'static str] =
        &["ID", "User", "Amount", "Type", "Reference", "Created"];

    const REFERENCES: &'static [ReferenceSource] = &[
        ReferenceSource {
            field: "user",
            label: "users",
            endpoint: "get_users",
            label_fields: USER_LABELS,
        },
        ReferenceSource {
            field: "reference",
            label: "commissions",
            endpoint: "get_commissions",
            label_fields: &["sale.product.name"],
        },
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_form(&self) -> WalletTransactionForm {
        WalletTransactionForm {
            user: self.user.id().unwrap_or_default(),
            amount: self.amount,
            transaction_type: self.transaction_type,
            reference: self.reference.as_ref().and_then(Related::id),
        }
    }

    fn row(&self) -> Vec<String> {
        let reference = self
            .reference
            .as_ref()
            .map(|r| match (r.id(), r.text(&["sale", "product", "name"])) {
                (Some(id), Some(product)) => format!("Commission #{id} ({product})"),
                (Some(id), None) => format!("Commission #{id}"),
                _ => r.label(&[]),
            })
            .unwrap_or_default();
        vec![
            self.id.to_string(),
            self.user.label(&[&["username"], &["email"]]),
            amount(self.amount),
            self.transaction_type.to_string(),
            reference,
            cell(&self.created_at),
        ]
    }
}
