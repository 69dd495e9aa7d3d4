// ── Gate backend seam ──
//
// Everything the coordinator needs from the outside world, as one trait.
// `HttpBackend` speaks to the real REST service through `GateClient`;
// tests substitute a scripted double. Each method maps transport errors
// into the session-level `CoreError` the caller reasons about.

use std::future::Future;

use tracing::debug;

use truckgate_api::models::{LatestDetectionResponse, RecordId};
use truckgate_api::transport::{TlsMode, TransportConfig};
use truckgate_api::GateClient;

use crate::config::{BackendConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{
    BackendHealth, CameraInventory, PlateCheck, PlateId, PlateNumber, PlateRecord, StreamHandle,
};

/// Operations the gate backend exposes.
///
/// `fetch_latest` returns the raw wire envelope: normalization (and the
/// protocol checks that go with it) belongs to the poller, so doubles can
/// feed it malformed payloads.
pub trait GateBackend: Send + Sync + 'static {
    fn list_cameras(&self) -> impl Future<Output = Result<CameraInventory, CoreError>> + Send;

    fn start_camera(
        &self,
        camera_id: u32,
    ) -> impl Future<Output = Result<StreamHandle, CoreError>> + Send;

    fn stop_camera(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn start_detection(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn stop_detection(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn fetch_latest(
        &self,
    ) -> impl Future<Output = Result<LatestDetectionResponse, CoreError>> + Send;

    fn list_plates(&self) -> impl Future<Output = Result<Vec<PlateRecord>, CoreError>> + Send;

    fn add_plate(&self, plate: &PlateNumber)
    -> impl Future<Output = Result<(), CoreError>> + Send;

    fn delete_plate(&self, id: &PlateId) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn check_plate(
        &self,
        plate: &PlateNumber,
    ) -> impl Future<Output = Result<PlateCheck, CoreError>> + Send;

    fn health(&self) -> impl Future<Output = Result<BackendHealth, CoreError>> + Send;
}

// ── HttpBackend ──────────────────────────────────────────────────

/// [`GateBackend`] over the REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: GateClient,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, CoreError> {
        let client = GateClient::new(config.url.clone(), &build_transport(config))?;
        Ok(Self { client })
    }

    /// Wrap an already-built client.
    pub fn from_client(client: GateClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GateClient {
        &self.client
    }
}

impl GateBackend for HttpBackend {
    async fn list_cameras(&self) -> Result<CameraInventory, CoreError> {
        let resp = self.client.list_cameras().await?;
        Ok(resp.into())
    }

    async fn start_camera(&self, camera_id: u32) -> Result<StreamHandle, CoreError> {
        match self.client.start_camera(camera_id).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => return Err(CoreError::CameraNotFound { camera_id }),
            Err(e) if e.is_conflict() => return Err(CoreError::AlreadyActive { camera_id }),
            Err(e) => return Err(operation_failure("start the camera", e)),
        }
        let url = self.client.stream_url()?;
        Ok(StreamHandle::from(url))
    }

    async fn stop_camera(&self) -> Result<(), CoreError> {
        self.client
            .stop_camera()
            .await
            .map(drop)
            .map_err(|e| operation_failure("stop the camera", e))
    }

    async fn start_detection(&self) -> Result<(), CoreError> {
        self.client
            .start_detection()
            .await
            .map(drop)
            .map_err(|e| CoreError::DetectionStartFailed { message: e.message() })
    }

    async fn stop_detection(&self) -> Result<(), CoreError> {
        self.client
            .stop_detection()
            .await
            .map(drop)
            .map_err(|e| operation_failure("stop detection", e))
    }

    async fn fetch_latest(&self) -> Result<LatestDetectionResponse, CoreError> {
        Ok(self.client.latest_detection().await?)
    }

    async fn list_plates(&self) -> Result<Vec<PlateRecord>, CoreError> {
        let resp = self.client.list_plates().await?;
        Ok(resp.plates.into_iter().map(PlateRecord::from).collect())
    }

    async fn add_plate(&self, plate: &PlateNumber) -> Result<(), CoreError> {
        match self.client.add_plate(plate.as_str()).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_conflict() => Err(CoreError::DuplicatePlate {
                plate: plate.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_plate(&self, id: &PlateId) -> Result<(), CoreError> {
        // Integer keys and UUIDs render to the same path segment.
        let record = RecordId::Str(id.as_str().to_owned());
        match self.client.delete_plate(&record).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Err(CoreError::PlateNotFound { id: id.to_string() }),
            Err(e) => Err(operation_failure("delete the plate", e)),
        }
    }

    async fn check_plate(&self, plate: &PlateNumber) -> Result<PlateCheck, CoreError> {
        let resp = self.client.check_plate(plate.as_str()).await?;
        Ok(resp.into())
    }

    async fn health(&self) -> Result<BackendHealth, CoreError> {
        let resp = self.client.health().await?;
        Ok(resp.into())
    }
}

/// Unreachable backends stay transient; anything the backend actually
/// answered becomes a `ServiceFailure` for `operation`.
fn operation_failure(operation: &'static str, err: truckgate_api::Error) -> CoreError {
    if err.is_transient() && err.status().is_none() {
        debug!(operation, error = %err, "backend unreachable");
        return CoreError::from(err);
    }
    CoreError::ServiceFailure {
        operation,
        message: err.message(),
    }
}

fn build_transport(config: &BackendConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        api_key: config.api_key.clone(),
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
