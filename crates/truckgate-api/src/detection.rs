// Detection endpoints
//
// Continuous detection runs inside the backend; the client can only
// toggle it and read the most recent result. The backend clears its
// stored result on read, so every successful `latest_detection` call
// hands out a given result at most once.

use tracing::debug;

use crate::client::GateClient;
use crate::error::Error;
use crate::models::{Ack, LatestDetectionResponse};

impl GateClient {
    /// `POST /api/detection/start`
    pub async fn start_detection(&self) -> Result<Ack, Error> {
        let url = self.api_url("detection/start")?;
        debug!("starting detection");
        self.post_ack(url).await
    }

    /// `POST /api/detection/stop`
    pub async fn stop_detection(&self) -> Result<Ack, Error> {
        let url = self.api_url("detection/stop")?;
        debug!("stopping detection");
        self.post_ack(url).await
    }

    /// `GET /api/detection/latest`
    pub async fn latest_detection(&self) -> Result<LatestDetectionResponse, Error> {
        let url = self.api_url("detection/latest")?;
        self.get(url).await
    }
}
