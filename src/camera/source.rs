//! Frame source trait - the seam between the workflow and the hardware.

use super::still::CapturedImage;
use super::types::{CameraError, CameraFacing};

/// A source of live video frames that can be frozen into stills.
///
/// [`CameraCapture`](super::CameraCapture) implements this against real
/// hardware; tests substitute a scripted source. Implementations own at
/// most one active stream at a time: acquiring while a stream is live
/// must release the old stream first.
pub trait FrameSource {
    /// Open a stream preferring the given facing direction.
    ///
    /// Any previously active stream is stopped first. On failure no
    /// stream is left active.
    fn acquire(&mut self, facing: CameraFacing) -> Result<(), CameraError>;

    /// Stop the active stream. Safe to call when nothing is active.
    fn release(&mut self);

    /// Toggle the preferred facing direction and re-acquire.
    ///
    /// Returns the facing now active.
    fn flip(&mut self) -> Result<CameraFacing, CameraError>;

    /// Freeze the current frame into an encoded still.
    ///
    /// Front-facing frames are mirrored horizontally before encoding.
    /// Capturing releases the stream: no live feed is needed once a
    /// still is taken.
    fn capture_still(&mut self) -> Result<CapturedImage, CameraError>;

    /// The facing of the active stream, if one is open.
    fn facing(&self) -> Option<CameraFacing>;

    /// Whether a stream is currently open.
    fn is_active(&self) -> bool;

    /// Whether more than one physical camera was detected at startup.
    ///
    /// The wizard only offers the flip control when this is true.
    fn has_multiple_cameras(&self) -> bool;
}
