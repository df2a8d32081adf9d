//! Camera capture handle with exclusive stream ownership.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution as StreamResolution,
};
use nokhwa::Camera;

use super::device::{list_devices, select_device};
use super::source::FrameSource;
use super::still::{self, CapturedImage};
use super::types::{CameraError, CameraFacing, CameraInfo, CameraSettings};

/// Camera capture handle.
///
/// Wraps a nokhwa Camera and maps the wizard's facing preference onto
/// the detected physical devices. At most one stream is open at a time;
/// acquiring releases any previous stream before opening the new one.
pub struct CameraCapture {
    /// Devices detected at startup
    detected: Vec<CameraInfo>,
    /// Currently bound stream, if any
    active: Option<ActiveStream>,
    /// Capture settings
    settings: CameraSettings,
}

struct ActiveStream {
    camera: Camera,
    facing: CameraFacing,
}

impl std::fmt::Debug for CameraCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCapture")
            .field("settings", &self.settings)
            .field("detected", &self.detected.len())
            .field("facing", &self.facing())
            .finish_non_exhaustive()
    }
}

impl CameraCapture {
    /// Enumerate devices and create an idle capture handle.
    ///
    /// No stream is opened until [`FrameSource::acquire`] is called, so
    /// this succeeds on a machine with zero cameras; the failure
    /// surfaces at acquire time instead.
    pub fn new(settings: CameraSettings) -> Result<Self, CameraError> {
        let detected = list_devices()?;
        log::debug!("detected {} camera device(s)", detected.len());

        Ok(Self {
            detected,
            active: None,
            settings,
        })
    }

    /// The devices detected at startup.
    pub fn devices(&self) -> &[CameraInfo] {
        &self.detected
    }

    /// The capture settings.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Device index to use for a facing, honoring config overrides.
    fn device_for(&self, facing: CameraFacing) -> Result<u32, CameraError> {
        let override_index = match facing {
            CameraFacing::Front => self.settings.front_device,
            CameraFacing::Back => self.settings.back_device,
        };
        match override_index {
            Some(index) => Ok(index),
            None => select_device(&self.detected, facing),
        }
    }

    /// Open a stream on a specific device with the preferred format.
    fn open_stream(&self, index: u32, requested: RequestedFormat) -> Result<Camera, CameraError> {
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;
        Ok(camera)
    }

    /// Preferred format: closest match to the configured resolution/fps.
    fn preferred_format(&self) -> RequestedFormat {
        let resolution = StreamResolution::new(
            self.settings.resolution.width,
            self.settings.resolution.height,
        );
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            resolution,
            FrameFormat::MJPEG,
            self.settings.fps,
        )))
    }
}

impl FrameSource for CameraCapture {
    fn acquire(&mut self, facing: CameraFacing) -> Result<(), CameraError> {
        // Exclusive ownership: the previous stream is fully released
        // before a new one is requested.
        self.release();

        let preferred_index = self.device_for(facing)?;

        match self.open_stream(preferred_index, self.preferred_format()) {
            Ok(camera) => {
                log::info!("camera stream open on device {} ({})", preferred_index, facing);
                self.active = Some(ActiveStream { camera, facing });
                return Ok(());
            }
            Err(e) => {
                log::warn!(
                    "constrained camera request failed on device {}: {}",
                    preferred_index,
                    e
                );
            }
        }

        // Unconstrained retry: any detected device, any format.
        let indices: Vec<u32> = self.detected.iter().map(|d| d.index).collect();
        let mut last_error = CameraError::NoDevices;
        for index in indices {
            // Let the camera pick whatever format works
            let requested =
                RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
            match self.open_stream(index, requested) {
                Ok(camera) => {
                    log::info!("camera stream open on fallback device {} ({})", index, facing);
                    self.active = Some(ActiveStream { camera, facing });
                    return Ok(());
                }
                Err(e) => {
                    log::warn!("fallback camera request failed on device {}: {}", index, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    fn release(&mut self) {
        if let Some(mut active) = self.active.take() {
            if let Err(e) = active.camera.stop_stream() {
                log::warn!("failed to stop camera stream: {}", e);
            }
            log::debug!("camera stream released");
        }
    }

    fn flip(&mut self) -> Result<CameraFacing, CameraError> {
        let facing = self.facing().ok_or(CameraError::NotActive)?.toggled();
        self.acquire(facing)?;
        Ok(facing)
    }

    fn capture_still(&mut self) -> Result<CapturedImage, CameraError> {
        let active = self.active.as_mut().ok_or(CameraError::NotActive)?;

        let buffer = active
            .camera
            .frame()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
        let mut frame = still::frame_from_buffer(&buffer)
            .ok_or_else(|| CameraError::CaptureFailed("could not decode frame".to_string()))?;

        if active.facing.mirrors() {
            still::mirror_horizontal(&mut frame);
        }

        let image = still::encode_jpeg(&frame, self.settings.jpeg_quality)?;

        // No live feed is needed once a still is taken.
        self.release();
        Ok(image)
    }

    fn facing(&self) -> Option<CameraFacing> {
        self.active.as_ref().map(|a| a.facing)
    }

    fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn has_multiple_cameras(&self) -> bool {
        self.detected.len() > 1
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_succeeds_without_hardware() {
        // Enumeration alone must not fail on camera-less machines.
        let capture = CameraCapture::new(CameraSettings::default());
        assert!(capture.is_ok());
        let capture = capture.unwrap();
        assert!(!capture.is_active());
        assert!(capture.facing().is_none());
    }

    #[test]
    fn test_capture_still_without_stream_is_not_active() {
        let mut capture = CameraCapture::new(CameraSettings::default()).unwrap();
        let result = capture.capture_still();
        assert!(matches!(result, Err(CameraError::NotActive)));
    }

    #[test]
    fn test_flip_without_stream_is_not_active() {
        let mut capture = CameraCapture::new(CameraSettings::default()).unwrap();
        let result = capture.flip();
        assert!(matches!(result, Err(CameraError::NotActive)));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut capture = CameraCapture::new(CameraSettings::default()).unwrap();
        capture.release();
        capture.release();
        assert!(!capture.is_active());
    }
}
