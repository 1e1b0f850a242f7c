use crate::error::Result;
use crate::repository::{GitHubReleaseClient, ReleaseSource};
use std::sync::Arc;

pub struct ReleaseSourceFactory;

impl ReleaseSourceFactory {
    pub fn create_github(token: Option<String>) -> Result<Arc<dyn ReleaseSource>> {
        let client = GitHubReleaseClient::new(token)?;
        Ok(Arc::new(client))
    }
}
