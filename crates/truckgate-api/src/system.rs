// Backend health endpoint.

use tracing::debug;

use crate::client::GateClient;
use crate::error::Error;
use crate::models::HealthResponse;

impl GateClient {
    /// Component status report.
    ///
    /// `GET /api/health`
    pub async fn health(&self) -> Result<HealthResponse, Error> {
        let url = self.api_url("health")?;
        debug!("fetching backend health");
        self.get(url).await
    }
}
