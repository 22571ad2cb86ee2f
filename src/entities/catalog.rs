//! Product catalog: categories, products, trainings and packages.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use super::{Entity, EntityForm, Related, amount, cell};
use crate::api::envelope::list_records;
use crate::api::{ApiClient, EntityId, Endpoints, ReferenceSource, Resource};
use crate::error::{self, ConsoleError};
use crate::validation::{FieldErrors, Validate};

pub(crate) const CATEGORY_OPTIONS: ReferenceSource = ReferenceSource {
    field: "category",
    label: "categories",
    endpoint: "get_categories",
    label_fields: &["name"],
};

pub(crate) const PRODUCT_OPTIONS: ReferenceSource = ReferenceSource {
    field: "product",
    label: "products",
    endpoint: "get_products",
    label_fields: &["name"],
};

pub(crate) const PACKAGE_OPTIONS: ReferenceSource = ReferenceSource {
    field: "package",
    label: "packages",
    endpoint: "get_packages",
    label_fields: &["name"],
};

const TRAINING_OPTIONS: ReferenceSource = ReferenceSource {
    field: "trainings",
    label: "trainings",
    endpoint: "get_trainings",
    label_fields: &["name"],
};

// ----------------------------------------------------------------------
// Category
// ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryForm {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for CategoryForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.min_chars("name", &self.name, 2, "Name is required");
        errors.into_result()
    }
}

impl EntityForm for CategoryForm {}

impl Entity for Category {
    type Form = CategoryForm;

    const RESOURCE: Resource = Resource {
        key: "categories",
        singular: "category",
        plural: "categories",
        endpoints: Endpoints::new(
            "get_categories",
            "post_category",
            "update_category",
            "delete_category",
        ),
    };

    const COLUMNS: &'static [&'static str] = &["ID", "Name", "Description"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_form(&self) -> CategoryForm {
        CategoryForm {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), cell(&self.description)]
    }
}

// ----------------------------------------------------------------------
// Product
// ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    /// Category id, nested record or name depending on the serializer
    #[serde(default)]
    pub category: Option<Related>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub is_service: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub category: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub quantity: f64,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    pub is_service: bool,
}

impl Validate for ProductForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.min_chars("name", &self.name, 2, "Name is required");
        errors.check(self.category >= 1, "category", "Category is required");
        errors.at_least("quantity", self.quantity, 0.0, "Quantity must be >= 0");
        errors.at_least("price", self.price, 0.0, "Price must be >= 0");
        if let Some(cost) = self.cost {
            errors.check(cost.is_finite(), "cost", "Cost must be a number");
        }
        errors.into_result()
    }
}

impl EntityForm for ProductForm {}

impl Entity for Product {
    type Form = ProductForm;

    const RESOURCE: Resource = Resource {
        key: "products",
        singular: "product",
        plural: "products",
        endpoints: Endpoints::new(
            "get_products",
            "post_product",
            "update_product",
            "delete_product",
        ),
    };

    const COLUMNS: &'static [&'static str] = &[
        "ID", "Name", "Category", "Quantity", "Price", "Cost", "Service",
    ];

    const REFERENCES: &'static [ReferenceSource] = &[CATEGORY_OPTIONS];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_form(&self) -> ProductForm {
        ProductForm {
            name: self.name.clone(),
            category: self.category.as_ref().and_then(Related::id).unwrap_or_default(),
            description: self.description.clone(),
            quantity: self.quantity,
            price: self.price,
            cost: self.cost,
            is_service: self.is_service,
        }
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.category
                .as_ref()
                .map(|c| c.label(&[&["name"]]))
                .unwrap_or_default(),
            self.quantity.to_string(),
            amount(self.price),
            self.cost.map(amount).unwrap_or_default(),
            if self.is_service { "yes" } else { "no" }.to_string(),
        ]
    }
}

// ----------------------------------------------------------------------
// Training
// ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Training {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingForm {
    pub name: String,
}

impl Validate for TrainingForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.min_chars("name", &self.name, 2, "Name is required");
        errors.into_result()
    }
}

impl EntityForm for TrainingForm {}

impl Entity for Training {
    type Form = TrainingForm;

    const RESOURCE: Resource = Resource {
        key: "trainings",
        singular: "training",
        plural: "trainings",
        endpoints: Endpoints::new(
            "get_trainings",
            "post_training",
            "update_training",
            "delete_training",
        ),
    };

    const COLUMNS: &'static [&'static str] = &["ID", "Name", "Created"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_form(&self) -> TrainingForm {
        TrainingForm {
            name: self.name.clone(),
        }
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), cell(&self.created_at)]
    }
}

// ----------------------------------------------------------------------
// Package
// ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub package_type: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub products: Option<Vec<Related>>,
    #[serde(default)]
    pub trainings: Option<Vec<Related>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageForm {
    pub name: String,
    pub package_type: String,
    pub price: f64,
    pub cost: f64,
}

impl Validate for PackageForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.min_chars("name", &self.name, 2, "Name is required");
        errors.min_chars("package_type", &self.package_type, 1, "Package type is required");
        errors.at_least("price", self.price, 0.0, "Price must be >= 0");
        errors.at_least("cost", self.cost, 0.0, "Cost must be >= 0");
        errors.into_result()
    }
}

impl EntityForm for PackageForm {}

impl Entity for Package {
    type Form = PackageForm;

    const RESOURCE: Resource = Resource {
        key: "packages",
        singular: "package",
        plural: "packages",
        endpoints: Endpoints::new(
            "get_packages",
            "post_package",
            "update_package",
            "delete_package",
        ),
    };

    const COLUMNS: &'static [&'static str] = &["ID", "Name", "Type", "Price", "Cost"];

    const REFERENCES: &'static [ReferenceSource] = &[
        ReferenceSource {
            field: "products",
            ..PRODUCT_OPTIONS
        },
        TRAINING_OPTIONS,
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_form(&self) -> PackageForm {
        PackageForm {
            name: self.name.clone(),
            package_type: self.package_type.clone(),
            price: self.price,
            cost: self.cost,
        }
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.package_type.clone(),
            amount(self.price),
            amount(self.cost),
        ]
    }
}

// ----------------------------------------------------------------------
// Package contents
// ----------------------------------------------------------------------

/// Ids of the products linked to a package.
pub async fn package_products(client: &ApiClient, package_id: EntityId) -> error::Result<Vec<EntityId>> {
    linked_ids(client, "get_product_packages", "product", package_id).await
}

/// Ids of the trainings linked to a package.
pub async fn package_trainings(client: &ApiClient, package_id: EntityId) -> error::Result<Vec<EntityId>> {
    linked_ids(client, "get_training_packages", "training", package_id).await
}

/// Link products to a package. Returns the server's confirmation text.
pub async fn add_products_to_package(
    client: &ApiClient,
    product_ids: &[EntityId],
    package_id: EntityId,
) -> error::Result<String> {
    require_ids(product_ids, "products")?;
    let body = json!({ "product_ids": product_ids, "package_id": package_id });
    post_links(client, "add-products-to-package", &body)
        .await
        .map(|message| message.unwrap_or_else(|| "Products added to package successfully".to_string()))
}

/// Link trainings to a package. Returns the server's confirmation text.
pub async fn add_trainings_to_package(
    client: &ApiClient,
    training_ids: &[EntityId],
    package_id: EntityId,
) -> error::Result<String> {
    require_ids(training_ids, "trainings")?;
    let body = json!({ "training_ids": training_ids, "package_id": package_id });
    post_links(client, "add-trainings-to-package", &body)
        .await
        .map(|message| message.unwrap_or_else(|| "Trainings added to package successfully".to_string()))
}

async fn linked_ids(
    client: &ApiClient,
    endpoint: &str,
    field: &str,
    package_id: EntityId,
) -> error::Result<Vec<EntityId>> {
    let mut url = client.url(endpoint, None)?;
    url.query_pairs_mut()
        .append_pair("package__id", &package_id.to_string());

    let response = client.get(url).await?;
    Ok(extract_linked_ids(list_records(response.body)?, field))
}

fn extract_linked_ids(records: Vec<Value>, field: &str) -> Vec<EntityId> {
    records
        .into_iter()
        .filter_map(|mut record| {
            let value = record.get_mut(field)?.take();
            serde_json::from_value::<Related>(value).ok()?.id()
        })
        .collect()
}

fn require_ids(ids: &[EntityId], what: &str) -> error::Result<()> {
    if ids.is_empty() {
        let mut errors = FieldErrors::new();
        errors.add("ids", format!("Select at least one of the {what}"));
        return Err(ConsoleError::Validation(errors));
    }
    Ok(())
}

/// POST a link request. Only 201 counts as success; the body's `message`
/// is the confirmation and `detail` the failure reason.
async fn post_links(client: &ApiClient, endpoint: &str, body: &Value) -> error::Result<Option<String>> {
    let url = client.url(endpoint, None)?;
    let response = client.post(url, body).await?;
    debug!(endpoint, status = response.status.as_u16(), "package links posted");

    if response.status != StatusCode::CREATED {
        return Err(ConsoleError::api(
            response.status.as_u16(),
            response
                .body
                .get("detail")
                .and_then(Value::as_str)
                .map(str::to_string),
        ));
    }
    Ok(response
        .body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string))
}
