//! Capture workflow state machine.
//!
//! Owns the welcome → capture → review → processing → result step
//! sequence and the two captured images. The workflow drives the camera
//! through [`FrameSource`](crate::camera::FrameSource) and hands the two
//! stills to a [`Verifier`] exactly once per run.

mod machine;
mod step;

pub use machine::{
    VerificationWorkflow, Verifier, WorkflowError, CAMERA_ERROR_MESSAGE, VERIFICATION_ERROR_MESSAGE,
};
pub use step::WorkflowStep;
