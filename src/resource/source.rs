//! # Source Resource
//!
//! Lifecycle of an `imgixyz_source`.
//!
//! - **Create** posts the plan, or adopts a same-named source when
//!   `upsert_by_name` is set (see [`super::upsert`]).
//! - **Read** and **Import** fetch by id.
//! - **Update** follows the enabled-state transition table (see
//!   [`super::transition`]) and re-reads the source afterwards so computed
//!   fields come from the server.
//! - **Delete** disables the source; imgix has no real deletion.
//!
//! A placeholder secret is never sent upstream.

use super::error::ResourceError;
use super::model::{without_placeholder, SourceModel};
use super::transition::{Step, Transition};
use super::{plan, upsert, Applied, Resource};
use crate::client::{ImgixClient, Source};
use async_trait::async_trait;
use tracing::{debug, info, info_span, Instrument};

/// The `imgixyz_source` resource
#[derive(Debug, Clone, Default)]
pub struct SourceResource {
    client: Option<ImgixClient>,
    upsert_by_name: bool,
}

impl SourceResource {
    #[must_use]
    pub fn new(client: ImgixClient, upsert_by_name: bool) -> Self {
        Self {
            client: Some(client),
            upsert_by_name,
        }
    }

    /// A resource whose provider configuration failed; every operation errors
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Adjust a proposed plan against the prior state
    #[must_use]
    pub fn modify_plan(&self, prior: Option<&SourceModel>, proposed: SourceModel) -> SourceModel {
        plan::modify_plan(prior, proposed)
    }

    fn client(&self) -> Result<&ImgixClient, ResourceError> {
        self.client.as_ref().ok_or(ResourceError::Unconfigured)
    }

    async fn fetch(&self, id: &str, local: &SourceModel) -> Result<SourceModel, ResourceError> {
        let remote = self
            .client()?
            .get_source_by_id(id)
            .await
            .map_err(ResourceError::Fetch)?;
        Ok(SourceModel::from_source(&remote, local))
    }
}

#[async_trait]
impl Resource for SourceResource {
    type Model = SourceModel;

    async fn create(&self, plan: SourceModel) -> Result<Applied<SourceModel>, ResourceError> {
        let client = self.client()?;
        let span = info_span!("imgix.resource.create", source.name = %plan.name);
        async move {
            let desired = without_placeholder(plan.to_source());
            let (remote, warning) =
                upsert::create_or_adopt(client, self.upsert_by_name, desired).await?;
            Ok(Applied::new(SourceModel::from_source(&remote, &plan)).with_warning(warning))
        }
        .instrument(span)
        .await
    }

    async fn read(&self, state: SourceModel) -> Result<Applied<SourceModel>, ResourceError> {
        self.fetch(state.id(), &state).await.map(Applied::new)
    }

    async fn update(
        &self,
        prior: SourceModel,
        plan: SourceModel,
    ) -> Result<Applied<SourceModel>, ResourceError> {
        let client = self.client()?;
        let transition = Transition::plan(prior.enabled, plan.enabled)?;

        let mut desired = without_placeholder(plan.to_source());
        // The id is fixed at creation, whatever the plan carries
        desired.id = prior.id().to_string();

        let span = info_span!("imgix.resource.update", source.id = %desired.id);
        async move {
            debug!(?transition, "Planned enabled-state transition");
            for step in transition.steps() {
                match step {
                    Step::Enable => {
                        info!("Enabling source {} before updating attributes", desired.id);
                        client
                            .update_source(&Source::enabled_only(desired.id.as_str(), true))
                            .await
                            .map_err(ResourceError::Enable)?;
                    }
                    Step::UpdateAttributes => {
                        client
                            .update_source(&desired)
                            .await
                            .map_err(ResourceError::Update)?;
                    }
                }
            }

            // The update response lags behind on computed fields
            self.fetch(&desired.id, &plan).await.map(Applied::new)
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, state: SourceModel) -> Result<(), ResourceError> {
        self.client()?
            .delete_source_by_id(state.id())
            .await
            .map_err(ResourceError::Delete)
    }

    async fn import(&self, id: &str) -> Result<Applied<SourceModel>, ResourceError> {
        info!("Importing imgix source {}", id);
        self.fetch(id, &SourceModel::default()).await.map(Applied::new)
    }
}
