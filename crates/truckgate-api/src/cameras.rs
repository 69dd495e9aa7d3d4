// Camera endpoints
//
// Enumeration, start/stop of the single capture device, and the MJPEG
// stream location. The stream itself is never fetched here.

use tracing::debug;
use url::Url;

use crate::client::GateClient;
use crate::error::Error;
use crate::models::{Ack, CameraListResponse, StartCameraRequest, StartCameraResponse};

impl GateClient {
    /// List capture devices and the backend's notion of the active one.
    ///
    /// `GET /api/camera/list`
    pub async fn list_cameras(&self) -> Result<CameraListResponse, Error> {
        let url = self.api_url("camera/list")?;
        debug!("listing cameras");
        self.get(url).await
    }

    /// Open a capture device.
    ///
    /// `POST /api/camera/start` with `{"camera_id": N}`. A `success: false`
    /// body is surfaced as [`Error::Rejected`].
    pub async fn start_camera(&self, camera_id: u32) -> Result<StartCameraResponse, Error> {
        let url = self.api_url("camera/start")?;
        debug!(camera_id, "starting camera");
        let resp: StartCameraResponse = self.post(url, &StartCameraRequest { camera_id }).await?;
        if resp.success {
            Ok(resp)
        } else {
            Err(Error::Rejected {
                message: resp
                    .message
                    .unwrap_or_else(|| format!("camera {camera_id} could not be started")),
            })
        }
    }

    /// Release the capture device.
    ///
    /// `POST /api/camera/stop`
    pub async fn stop_camera(&self) -> Result<Ack, Error> {
        let url = self.api_url("camera/stop")?;
        debug!("stopping camera");
        self.post_ack(url).await
    }

    /// Location of the live MJPEG stream for the active camera.
    pub fn stream_url(&self) -> Result<Url, Error> {
        self.api_url("camera/stream")
    }
}
