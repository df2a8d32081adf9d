//! Gemini identity-verification integration module.
//!
//! The wizard delegates all matching intelligence to Google's Gemini
//! multimodal API: one request carrying the ID document and the selfie,
//! one structured JSON judgment back. No retry, no streaming.

mod client;
mod prompt;

pub use client::{
    GeminiClient, VerificationOutcome, VerifyError, DEFAULT_MODEL, GEMINI_API_BASE_URL,
    GEMINI_API_KEY_ENV,
};
pub use prompt::{response_schema, VERIFICATION_PROMPT};
