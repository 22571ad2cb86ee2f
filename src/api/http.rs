//! REST implementation of [`CollectionBackend`].

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use super::client::ApiClient;
use super::envelope::{normalize_list, reference_options};
use super::{CollectionBackend, CollectionPage, EntityId, ListRequest, ReferenceOption, ReferenceSource};
use crate::entities::{Entity, EntityForm};
use crate::error::Result;

/// Collection of `E` served by the admin backend.
pub struct HttpCollection<E> {
    client: Arc<ApiClient>,
    _marker: PhantomData<fn() -> E>,
}

impl<E> HttpCollection<E> {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }
}

impl<E> Clone for HttpCollection<E> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.client))
    }
}

impl<E: Entity> CollectionBackend<E> for HttpCollection<E> {
    async fn list(&self, request: &ListRequest) -> Result<CollectionPage<E>> {
        let endpoints = E::RESOURCE.endpoints;
        let mut url = self.client.url(endpoints.list, None)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(size) = request.page_size.get() {
                query.append_pair("page", &request.page.to_string());
                query.append_pair("page_size", &size.to_string());
            }
            query.append_pair("search", &request.search);
        }

        debug!(
            resource = E::RESOURCE.key,
            page = request.page,
            search = %request.search,
            "listing"
        );
        let response = self.client.get(url).await?;
        normalize_list(response.body, request.page_size)
    }

    async fn create(&self, form: &E::Form) -> Result<()> {
        let url = self.client.url(E::RESOURCE.endpoints.create, None)?;
        let payload = form.payload()?;
        self.client.post(url, &payload).await?;
        Ok(())
    }

    async fn update(&self, id: EntityId, form: &E::Form) -> Result<()> {
        let endpoints = E::RESOURCE.endpoints;
        let url = self.client.url(endpoints.update, Some(id))?;
        let payload = form.payload()?;
        self.client
            .send(endpoints.update_method.as_reqwest(), url, Some(&payload))
            .await?;
        Ok(())
    }

    async fn delete(&self, id: EntityId) -> Result<()> {
        let url = self.client.url(E::RESOURCE.endpoints.delete, Some(id))?;
        self.client.delete(url).await?;
        Ok(())
    }

    async fn reference_options(&self, source: &ReferenceSource) -> Result<Vec<ReferenceOption>> {
        let url = self.client.url(source.endpoint, None)?;
        let response = self.client.get(url).await?;
        reference_options(response.body, source.label_fields)
    }
}
