//! # Source Data Source
//!
//! Read-only lookup of an existing source by id.

use super::error::ResourceError;
use super::model::SourceModel;
use super::Applied;
use crate::client::ImgixClient;

/// The `imgixyz_source` data source
#[derive(Debug, Clone, Default)]
pub struct SourceDataSource {
    client: Option<ImgixClient>,
}

impl SourceDataSource {
    #[must_use]
    pub fn new(client: ImgixClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Fetch the source named by `config.id`
    ///
    /// The configured deployment block only informs the secret key of the
    /// result; everything else comes from the server.
    ///
    /// # Errors
    /// [`ResourceError::Unconfigured`] without a client, [`ResourceError::Fetch`]
    /// when the id is missing or the lookup fails
    pub async fn read(&self, config: SourceModel) -> Result<Applied<SourceModel>, ResourceError> {
        let client = self.client.as_ref().ok_or(ResourceError::Unconfigured)?;
        let remote = client
            .get_source_by_id(config.id())
            .await
            .map_err(ResourceError::Fetch)?;
        Ok(Applied::new(SourceModel::from_source(&remote, &config)))
    }
}
