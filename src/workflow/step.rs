//! Workflow step enumeration.

use std::fmt;

use crate::camera::CameraFacing;

/// The single active step of the verification wizard.
///
/// Transitions only happen through
/// [`VerificationWorkflow`](super::VerificationWorkflow) methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    /// Initial screen, nothing captured yet.
    Welcome,
    /// Live back-camera feed, waiting for the ID shutter.
    CaptureId,
    /// Frozen ID still shown for confirm/retake.
    ReviewId,
    /// Live front-camera feed, waiting for the selfie shutter.
    CaptureSelfie,
    /// Frozen selfie still shown for confirm/retake.
    ReviewSelfie,
    /// Verification call in flight.
    Processing,
    /// Terminal screen: outcome or error. Only a full restart leaves it.
    Result,
}

impl WorkflowStep {
    /// The camera facing a capture step needs, `None` for non-capture steps.
    pub fn required_facing(self) -> Option<CameraFacing> {
        match self {
            WorkflowStep::CaptureId => Some(CameraFacing::Back),
            WorkflowStep::CaptureSelfie => Some(CameraFacing::Front),
            _ => None,
        }
    }

    /// Whether this step has a live camera feed.
    pub fn is_capture(self) -> bool {
        self.required_facing().is_some()
    }

    /// Whether cancel is available from this step.
    ///
    /// Everything except the in-flight call and the terminal screen can
    /// be cancelled back to the welcome screen.
    pub fn can_cancel(self) -> bool {
        !matches!(self, WorkflowStep::Processing | WorkflowStep::Result)
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowStep::Welcome => "welcome",
            WorkflowStep::CaptureId => "capture_id",
            WorkflowStep::ReviewId => "review_id",
            WorkflowStep::CaptureSelfie => "capture_selfie",
            WorkflowStep::ReviewSelfie => "review_selfie",
            WorkflowStep::Processing => "processing",
            WorkflowStep::Result => "result",
        };
        write!(f, "{}", name)
    }
}
