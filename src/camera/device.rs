//! Camera device enumeration and facing classification.
//!
//! Desktop camera backends have no notion of a "facing mode", so the
//! preferred facing is mapped onto a physical device by classifying
//! device names, with an index-order fallback when names are
//! uninformative.

use nokhwa::query;
use nokhwa::utils::ApiBackend;

use super::types::{CameraError, CameraFacing, CameraInfo};

/// Device-name keywords that indicate a user-facing camera.
const FRONT_KEYWORDS: &[&str] = &["front", "user", "selfie", "facetime", "integrated"];

/// Device-name keywords that indicate an environment-facing camera.
const BACK_KEYWORDS: &[&str] = &["back", "rear", "environment", "world"];

/// List all available camera devices on the system.
///
/// Returns a vector of `CameraInfo` structs, or an error if querying fails.
/// If no cameras are found, returns an empty vector (not an error).
pub fn list_devices() -> Result<Vec<CameraInfo>, CameraError> {
    let devices = query(ApiBackend::Auto).map_err(|e| CameraError::QueryFailed(e.to_string()))?;

    Ok(devices
        .into_iter()
        .map(|d| CameraInfo {
            index: d.index().as_index().unwrap_or(0),
            name: d.human_name(),
            description: d.description().to_string(),
        })
        .collect())
}

/// Guess the facing direction of a device from its name.
///
/// Returns `None` when the name carries no facing hint.
pub fn classify_facing(name: &str) -> Option<CameraFacing> {
    let lower = name.to_lowercase();
    if FRONT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(CameraFacing::Front);
    }
    if BACK_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(CameraFacing::Back);
    }
    None
}

/// Pick the device index to use for a preferred facing direction.
///
/// A device whose name classifies as the requested facing wins. Otherwise
/// the first device stands in for the front camera and the last for the
/// back, so a single-camera machine uses the same device for both roles.
pub fn select_device(devices: &[CameraInfo], facing: CameraFacing) -> Result<u32, CameraError> {
    if devices.is_empty() {
        return Err(CameraError::NoDevices);
    }

    if let Some(matched) = devices
        .iter()
        .find(|d| classify_facing(&d.name) == Some(facing))
    {
        return Ok(matched.index);
    }

    let fallback = match facing {
        CameraFacing::Front => devices.first(),
        CameraFacing::Back => devices.last(),
    };
    // Non-empty checked above
    Ok(fallback.map(|d| d.index).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(index: u32, name: &str) -> CameraInfo {
        CameraInfo {
            index,
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_list_devices_does_not_error() {
        // Should not error even if no cameras are present
        // (returns empty list instead)
        let result = list_devices();
        assert!(result.is_ok());
    }

    #[test]
    fn test_classify_facing_front_keywords() {
        assert_eq!(
            classify_facing("FaceTime HD Camera"),
            Some(CameraFacing::Front)
        );
        assert_eq!(
            classify_facing("Integrated Webcam"),
            Some(CameraFacing::Front)
        );
        assert_eq!(classify_facing("Front Camera"), Some(CameraFacing::Front));
    }

    #[test]
    fn test_classify_facing_back_keywords() {
        assert_eq!(classify_facing("Rear Camera"), Some(CameraFacing::Back));
        assert_eq!(
            classify_facing("USB back camera"),
            Some(CameraFacing::Back)
        );
    }

    #[test]
    fn test_classify_facing_unknown() {
        assert_eq!(classify_facing("Logitech C920"), None);
    }

    #[test]
    fn test_select_device_prefers_classified_match() {
        let devices = vec![device(0, "Logitech C920"), device(1, "Front Camera")];
        assert_eq!(select_device(&devices, CameraFacing::Front).unwrap(), 1);
    }

    #[test]
    fn test_select_device_fallback_by_index_order() {
        let devices = vec![device(0, "Camera A"), device(1, "Camera B")];
        assert_eq!(select_device(&devices, CameraFacing::Front).unwrap(), 0);
        assert_eq!(select_device(&devices, CameraFacing::Back).unwrap(), 1);
    }

    #[test]
    fn test_select_device_single_camera_serves_both_roles() {
        let devices = vec![device(0, "Camera A")];
        assert_eq!(select_device(&devices, CameraFacing::Front).unwrap(), 0);
        assert_eq!(select_device(&devices, CameraFacing::Back).unwrap(), 0);
    }

    #[test]
    fn test_select_device_empty_is_no_devices() {
        let result = select_device(&[], CameraFacing::Back);
        assert!(matches!(result, Err(CameraError::NoDevices)));
    }
}
