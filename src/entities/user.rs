use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Entity, EntityForm, amount, cell};
use crate::api::{EntityId, Endpoints, Resource, UpdateMethod};
use crate::validation::{FieldErrors, Validate};

/// A platform account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub wallet_balance: f64,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub date_joined: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserForm {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_balance: Option<f64>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub password: String,
}

// Keep the password out of logs and error output.
impl fmt::Debug for UserForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserForm")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("middle_name", &self.middle_name)
            .field("last_name", &self.last_name)
            .field("phone_number", &self.phone_number)
            .field("address", &self.address)
            .field("wallet_balance", &self.wallet_balance)
            .field("is_staff", &self.is_staff)
            .field("is_superuser", &self.is_superuser)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Validate for UserForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.email("email", &self.email);
        errors.check(
            self.password.chars().count() >= 6,
            "password",
            "Password must be at least 6 characters",
        );
        if let Some(balance) = self.wallet_balance {
            errors.at_least("wallet_balance", balance, 0.0, "Wallet balance must be >= 0");
        }
        errors.into_result()
    }
}

impl EntityForm for UserForm {}

impl Entity for User {
    type Form = UserForm;

    const RESOURCE: Resource = Resource {
        key: "users",
        singular: "user",
        plural: "users",
        endpoints: Endpoints::new("get_users", "sign_up", "update_user", "delete_user")
            .with_update_method(UpdateMethod::Patch),
    };

    const COLUMNS: &'static [&'static str] = &[
        "ID", "Email", "Name", "Phone", "Wallet", "Level", "Staff", "Superuser", "Joined",
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_form(&self) -> UserForm {
        UserForm {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            middle_name: self.middle_name.clone(),
            last_name: self.last_name.clone(),
            phone_number: self.phone_number.clone(),
            address: self.address.clone(),
            wallet_balance: Some(self.wallet_balance),
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            password: String::new(),
        }
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.email.clone(),
            self.full_name(),
            cell(&self.phone_number),
            amount(self.wallet_balance),
            cell(&self.level),
            yes_no(self.is_staff),
            yes_no(self.is_superuser),
            self.date_joined
                .as_deref()
                .map(|d| d.split('T').next().unwrap_or(d).to_string())
                .unwrap_or_default(),
        ]
    }
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}
