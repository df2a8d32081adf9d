//! Camera types and data structures.

use std::fmt;
use std::time::Instant;

/// Which physical camera direction is preferred for a capture.
///
/// The wizard uses the back camera for the ID document and the front
/// camera for the selfie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraFacing {
    /// User-facing ("selfie") camera.
    Front,
    /// Environment-facing camera, used for the ID document.
    Back,
}

impl CameraFacing {
    /// The opposite facing direction.
    pub fn toggled(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }

    /// Front-facing frames are mirrored so the still matches what the
    /// user saw in the preview.
    pub fn mirrors(self) -> bool {
        matches!(self, CameraFacing::Front)
    }
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraFacing::Front => write!(f, "front"),
            CameraFacing::Back => write!(f, "back"),
        }
    }
}

/// Information about an available camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Device index for selection
    pub index: u32,
    /// Human-readable device name
    pub name: String,
    /// Device description
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// Camera resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Low resolution (320x240)
    pub const LOW: Resolution = Resolution {
        width: 320,
        height: 240,
    };

    /// Medium resolution (640x480)
    pub const MEDIUM: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// High resolution (1280x720) - target for document legibility
    pub const HIGH: Resolution = Resolution {
        width: 1280,
        height: 720,
    };

    /// Parse a `WIDTHxHEIGHT` string, e.g. `1280x720`.
    pub fn parse(s: &str) -> Option<Resolution> {
        let (w, h) = s.split_once('x')?;
        Some(Resolution {
            width: w.trim().parse().ok()?,
            height: h.trim().parse().ok()?,
        })
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::HIGH
    }
}

/// A captured camera frame in raw RGB form (3 bytes per pixel).
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data in RGB format
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl Frame {
    /// Bytes per pixel (RGB).
    pub const BYTES_PER_PIXEL: usize = 3;
}

/// Settings for camera capture.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Preferred capture resolution (actual may vary)
    pub resolution: Resolution,
    /// Target FPS for the stream
    pub fps: u32,
    /// JPEG quality for encoded stills (1-100)
    pub jpeg_quality: u8,
    /// Override device index for the front camera
    pub front_device: Option<u32>,
    /// Override device index for the back camera
    pub back_device: Option<u32>,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            fps: 30,
            jpeg_quality: 85,
            front_device: None,
            back_device: None,
        }
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("No cameras found")]
    NoDevices,

    #[error("Failed to query cameras: {0}")]
    QueryFailed(String),

    #[error("Failed to open camera: {0}")]
    OpenFailed(String),

    #[error("Failed to start camera stream: {0}")]
    StreamFailed(String),

    #[error("Failed to capture frame: {0}")]
    CaptureFailed(String),

    #[error("Failed to encode still image: {0}")]
    EncodeFailed(String),

    #[error("No active camera stream")]
    NotActive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_toggled() {
        assert_eq!(CameraFacing::Front.toggled(), CameraFacing::Back);
        assert_eq!(CameraFacing::Back.toggled(), CameraFacing::Front);
    }

    #[test]
    fn test_facing_mirrors_front_only() {
        assert!(CameraFacing::Front.mirrors());
        assert!(!CameraFacing::Back.mirrors());
    }

    #[test]
    fn test_facing_display() {
        assert_eq!(CameraFacing::Front.to_string(), "front");
        assert_eq!(CameraFacing::Back.to_string(), "back");
    }

    #[test]
    fn test_camera_info_display() {
        let info = CameraInfo {
            index: 0,
            name: "Test Camera".to_string(),
            description: "Built-in".to_string(),
        };
        assert_eq!(format!("{}", info), "[0] Test Camera (Built-in)");
    }

    #[test]
    fn test_resolution_parse() {
        assert_eq!(
            Resolution::parse("1280x720"),
            Some(Resolution {
                width: 1280,
                height: 720
            })
        );
        assert_eq!(Resolution::parse("640 x 480"), Some(Resolution::MEDIUM));
        assert_eq!(Resolution::parse("garbage"), None);
        assert_eq!(Resolution::parse("1280"), None);
    }

    #[test]
    fn test_resolution_default_is_high() {
        assert_eq!(Resolution::default(), Resolution::HIGH);
    }

    #[test]
    fn test_camera_settings_default() {
        let settings = CameraSettings::default();
        assert_eq!(settings.resolution, Resolution::HIGH);
        assert_eq!(settings.fps, 30);
        assert_eq!(settings.jpeg_quality, 85);
        assert!(settings.front_device.is_none());
        assert!(settings.back_device.is_none());
    }

    #[test]
    fn test_camera_error_display() {
        assert_eq!(format!("{}", CameraError::NoDevices), "No cameras found");
        assert_eq!(
            format!("{}", CameraError::QueryFailed("test".to_string())),
            "Failed to query cameras: test"
        );
        assert_eq!(
            format!("{}", CameraError::NotActive),
            "No active camera stream"
        );
    }
}
