// Plate whitelist endpoints
//
// Thin CRUD over the backend's `plates` resource. Normalization and format
// validation are the caller's job; the backend only checks length.

use tracing::debug;

use crate::client::GateClient;
use crate::error::Error;
use crate::models::{Ack, CheckPlateResponse, PlateNumberRequest, PlatesResponse, RecordId};

impl GateClient {
    /// `GET /api/plates`
    pub async fn list_plates(&self) -> Result<PlatesResponse, Error> {
        let url = self.api_url("plates")?;
        debug!("listing plates");
        self.get(url).await
    }

    /// `POST /api/plates` with `{"plate_number": "..."}`
    pub async fn add_plate(&self, plate_number: &str) -> Result<Ack, Error> {
        let url = self.api_url("plates")?;
        debug!(plate_number, "adding plate");
        let ack: Ack = self
            .post(url, &PlateNumberRequest { plate_number })
            .await?;
        crate::client::require_success(ack)
    }

    /// `DELETE /api/plates/{id}`
    pub async fn delete_plate(&self, id: &RecordId) -> Result<Ack, Error> {
        let url = self.api_url(&format!("plates/{id}"))?;
        debug!(%id, "deleting plate");
        self.delete_ack(url).await
    }

    /// `POST /api/check-plate` with `{"plate_number": "..."}`
    pub async fn check_plate(&self, plate_number: &str) -> Result<CheckPlateResponse, Error> {
        let url = self.api_url("check-plate")?;
        debug!(plate_number, "checking plate");
        self.post(url, &PlateNumberRequest { plate_number }).await
    }
}
