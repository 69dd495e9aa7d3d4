// ── Plate whitelist registry ──
//
// Validated CRUD over the backend's whitelist. Input is normalized and
// format-checked before any backend call.

use std::sync::Arc;

use tracing::info;

use crate::backend::GateBackend;
use crate::error::CoreError;
use crate::model::{PlateCheck, PlateId, PlateNumber, PlateRecord};

pub struct PlateRegistry<B> {
    backend: Arc<B>,
}

impl<B: GateBackend> PlateRegistry<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// All whitelisted plates, newest first. `search` keeps plates whose
    /// number contains the (normalized) query.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<PlateRecord>, CoreError> {
        let mut plates = self.backend.list_plates().await?;
        if let Some(query) = search.map(crate::model::plate::normalize) {
            if !query.is_empty() {
                plates.retain(|p| p.plate_number.to_uppercase().contains(&query));
            }
        }
        // `None` sorts before `Some`, so records without a date end up last.
        plates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plates)
    }

    /// Whitelist `raw` after normalizing it. Returns the stored record
    /// when the backend lists it back.
    pub async fn add(&self, raw: &str) -> Result<Option<PlateRecord>, CoreError> {
        let plate = PlateNumber::parse(raw)?;
        self.backend.add_plate(&plate).await?;
        info!(plate = %plate, "plate whitelisted");

        let stored = self
            .backend
            .list_plates()
            .await?
            .into_iter()
            .find(|p| p.plate_number.eq_ignore_ascii_case(plate.as_str()));
        Ok(stored)
    }

    pub async fn remove(&self, id: &PlateId) -> Result<(), CoreError> {
        self.backend.delete_plate(id).await?;
        info!(%id, "plate removed from whitelist");
        Ok(())
    }

    /// Ask the backend whether `raw` would be granted access.
    pub async fn check(&self, raw: &str) -> Result<PlateCheck, CoreError> {
        let plate = PlateNumber::parse(raw)?;
        self.backend.check_plate(&plate).await
    }

    /// Find a record by its plate number (normalized comparison).
    pub async fn find(&self, raw: &str) -> Result<Option<PlateRecord>, CoreError> {
        let plate = PlateNumber::parse(raw)?;
        Ok(self
            .backend
            .list_plates()
            .await?
            .into_iter()
            .find(|p| crate::model::plate::normalize(&p.plate_number) == plate.as_str()))
    }
}
