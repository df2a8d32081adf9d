//! The verification workflow state machine.

use async_trait::async_trait;

use crate::camera::{CameraFacing, CapturedImage, FrameSource};
use crate::gemini::{VerificationOutcome, VerifyError};

use super::step::WorkflowStep;

/// Fixed user-facing message for camera-access failures.
pub const CAMERA_ERROR_MESSAGE: &str =
    "Unable to access the camera. Check permissions and try again.";

/// Fixed user-facing message for verification-call failures.
///
/// Call details are logged, never shown; the user always reaches the
/// result screen.
pub const VERIFICATION_ERROR_MESSAGE: &str =
    "Verification could not be completed. Please start over and try again.";

/// The external collaborator that judges the two stills.
///
/// Implemented by [`GeminiClient`](crate::gemini::GeminiClient); tests
/// substitute a stub.
#[async_trait]
pub trait Verifier {
    /// Judge whether the selfie matches the ID document.
    async fn verify(
        &self,
        document: &CapturedImage,
        selfie: &CapturedImage,
    ) -> Result<VerificationOutcome, VerifyError>;
}

/// Errors for triggers that are not available in the current step.
///
/// The wizard front end only offers valid actions, so these surface
/// misuse of the library API rather than user mistakes.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("action '{action}' is not available in step '{step}'")]
    InvalidAction {
        action: &'static str,
        step: WorkflowStep,
    },

    #[error("flip is unavailable with a single camera")]
    FlipUnavailable,
}

/// The capture/review/processing/result wizard.
///
/// Owns the step sequence, the two captured images, and the terminal
/// outcome. One method per user trigger; each either performs the
/// transition (recording camera/verification failures in the error
/// state) or rejects the trigger as invalid for the current step.
pub struct VerificationWorkflow<S, V> {
    step: WorkflowStep,
    camera: S,
    verifier: V,
    id_image: Option<CapturedImage>,
    selfie_image: Option<CapturedImage>,
    outcome: Option<VerificationOutcome>,
    error: Option<String>,
}

impl<S: FrameSource, V: Verifier> VerificationWorkflow<S, V> {
    /// Create a workflow on the welcome step.
    pub fn new(camera: S, verifier: V) -> Self {
        Self {
            step: WorkflowStep::Welcome,
            camera,
            verifier,
            id_image: None,
            selfie_image: None,
            outcome: None,
            error: None,
        }
    }

    /// The currently active step.
    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    /// The captured ID document still, if any.
    pub fn id_image(&self) -> Option<&CapturedImage> {
        self.id_image.as_ref()
    }

    /// The captured selfie still, if any.
    pub fn selfie_image(&self) -> Option<&CapturedImage> {
        self.selfie_image.as_ref()
    }

    /// The verification outcome, present only after a successful run.
    pub fn outcome(&self) -> Option<&VerificationOutcome> {
        self.outcome.as_ref()
    }

    /// The current user-facing error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the flip control should be offered.
    pub fn can_flip(&self) -> bool {
        self.step.is_capture() && self.camera.has_multiple_cameras()
    }

    /// Access the underlying frame source.
    pub fn camera(&self) -> &S {
        &self.camera
    }

    /// Access the verifier.
    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// welcome → capture_id: begin the wizard and activate the back camera.
    pub fn start(&mut self) -> Result<(), WorkflowError> {
        if self.step != WorkflowStep::Welcome {
            return Err(self.invalid("start"));
        }
        self.enter_capture(WorkflowStep::CaptureId);
        Ok(())
    }

    /// Shutter press on a capture step: freeze the frame and move to review.
    ///
    /// Capturing releases the camera; a capture failure keeps the
    /// workflow on the capture step with the fixed camera message set.
    pub fn press_shutter(&mut self) -> Result<(), WorkflowError> {
        let review = match self.step {
            WorkflowStep::CaptureId => WorkflowStep::ReviewId,
            WorkflowStep::CaptureSelfie => WorkflowStep::ReviewSelfie,
            _ => return Err(self.invalid("shutter")),
        };

        match self.camera.capture_still() {
            Ok(image) => {
                match self.step {
                    WorkflowStep::CaptureId => self.id_image = Some(image),
                    _ => self.selfie_image = Some(image),
                }
                self.error = None;
                self.step = review;
            }
            Err(e) => {
                log::warn!("still capture failed in {}: {}", self.step, e);
                self.error = Some(CAMERA_ERROR_MESSAGE.to_string());
            }
        }
        Ok(())
    }

    /// Retake from a review step: discard only the image under review
    /// and re-activate the matching camera.
    pub fn retake(&mut self) -> Result<(), WorkflowError> {
        let capture = match self.step {
            WorkflowStep::ReviewId => {
                self.id_image = None;
                WorkflowStep::CaptureId
            }
            WorkflowStep::ReviewSelfie => {
                self.selfie_image = None;
                WorkflowStep::CaptureSelfie
            }
            _ => return Err(self.invalid("retake")),
        };
        self.enter_capture(capture);
        Ok(())
    }

    /// Confirm a review step.
    ///
    /// From review_id this activates the front camera for the selfie.
    /// From review_selfie this invokes the verification call exactly
    /// once and always lands on the result step: the outcome on
    /// success, the fixed generic message on failure.
    pub async fn confirm(&mut self) -> Result<(), WorkflowError> {
        match self.step {
            WorkflowStep::ReviewId => {
                // Review steps are only entered after a successful capture.
                debug_assert!(self.id_image.is_some(), "review_id without an ID image");
                self.enter_capture(WorkflowStep::CaptureSelfie);
                Ok(())
            }
            WorkflowStep::ReviewSelfie => {
                debug_assert!(self.id_image.is_some(), "review_selfie without an ID image");
                debug_assert!(
                    self.selfie_image.is_some(),
                    "review_selfie without a selfie image"
                );

                self.step = WorkflowStep::Processing;
                let (document, selfie) = match (&self.id_image, &self.selfie_image) {
                    (Some(d), Some(s)) => (d, s),
                    // Unreachable per the invariant above; degrade to an
                    // error result rather than panic in release builds.
                    _ => {
                        self.error = Some(VERIFICATION_ERROR_MESSAGE.to_string());
                        self.step = WorkflowStep::Result;
                        return Ok(());
                    }
                };

                match self.verifier.verify(document, selfie).await {
                    Ok(outcome) => {
                        log::info!(
                            "verification complete: match={} confidence={:.2}",
                            outcome.is_match,
                            outcome.confidence
                        );
                        self.outcome = Some(outcome);
                    }
                    Err(e) => {
                        log::error!("verification call failed: {}", e);
                        self.error = Some(VERIFICATION_ERROR_MESSAGE.to_string());
                    }
                }
                self.step = WorkflowStep::Result;
                Ok(())
            }
            _ => Err(self.invalid("confirm")),
        }
    }

    /// Flip the camera facing on a capture step.
    ///
    /// Only meaningful when more than one physical camera exists.
    pub fn flip(&mut self) -> Result<(), WorkflowError> {
        if !self.step.is_capture() {
            return Err(self.invalid("flip"));
        }
        if !self.camera.has_multiple_cameras() {
            return Err(WorkflowError::FlipUnavailable);
        }
        match self.camera.flip() {
            Ok(facing) => {
                log::info!("camera flipped to {}", facing);
                self.error = None;
            }
            Err(e) => {
                log::warn!("camera flip failed: {}", e);
                self.error = Some(CAMERA_ERROR_MESSAGE.to_string());
            }
        }
        Ok(())
    }

    /// Cancel back to the welcome screen, discarding everything.
    ///
    /// Available from every step except processing and result.
    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        if !self.step.can_cancel() {
            return Err(self.invalid("cancel"));
        }
        self.reset();
        Ok(())
    }

    /// Restart from the result screen, discarding everything.
    pub fn restart(&mut self) -> Result<(), WorkflowError> {
        if self.step != WorkflowStep::Result {
            return Err(self.invalid("restart"));
        }
        self.reset();
        Ok(())
    }

    /// Enter a capture step and activate its camera.
    ///
    /// An acquisition failure is non-fatal: the step is entered with no
    /// active stream and the fixed camera message recorded, keeping
    /// cancel reachable.
    fn enter_capture(&mut self, step: WorkflowStep) {
        self.step = step;
        // Capture steps always name a facing.
        let facing = step.required_facing().unwrap_or(CameraFacing::Back);
        match self.camera.acquire(facing) {
            Ok(()) => {
                self.error = None;
            }
            Err(e) => {
                log::warn!("camera acquisition failed for {}: {}", step, e);
                self.error = Some(CAMERA_ERROR_MESSAGE.to_string());
            }
        }
    }

    /// Discard all captured state and return to welcome.
    fn reset(&mut self) {
        self.camera.release();
        self.id_image = None;
        self.selfie_image = None;
        self.outcome = None;
        self.error = None;
        self.step = WorkflowStep::Welcome;
    }

    fn invalid(&self, action: &'static str) -> WorkflowError {
        WorkflowError::InvalidAction {
            action,
            step: self.step,
        }
    }
}
