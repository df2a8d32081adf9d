//! Camera capture module for webcam access and still-image capture.
//!
//! This module provides a high-level API for the capture side of the
//! verification wizard:
//! - Device enumeration via [`list_devices`]
//! - Exclusive stream ownership via [`CameraCapture`]
//! - Frame-to-JPEG conversion via [`still`]
//!
//! The workflow drives the camera through the [`FrameSource`] trait so it
//! can be tested without hardware.

mod capture;
mod device;
mod source;
pub mod still;
mod types;

pub use capture::CameraCapture;
pub use device::{classify_facing, list_devices, select_device};
pub use source::FrameSource;
pub use still::CapturedImage;
pub use types::{CameraError, CameraFacing, CameraInfo, CameraSettings, Frame, Resolution};
