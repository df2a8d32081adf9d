//! Fixed instruction prompt and response schema for the verification call.

use serde_json::{json, Value};

/// The instruction sent with every verification request.
///
/// The wording stays fixed: the wizard never lets the user steer the
/// model, only the two images vary.
pub const VERIFICATION_PROMPT: &str = "You are an identity verification system. \
You are given two images: first a government-issued photo ID document, then a live selfie. \
Determine whether the person in the selfie is the same person pictured on the ID document, \
and whether the ID document appears authentic (not a screen photo, printout, or obvious forgery). \
Respond with your match determination, a confidence score between 0 and 1, \
and a short reasoning statement.";

/// JSON schema constraining the model's response shape.
///
/// Gemini's structured output accepts an OpenAPI-style subset; the
/// response is always `{ isMatch, confidence, reasoning }`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "isMatch": { "type": "BOOLEAN" },
            "confidence": { "type": "NUMBER" },
            "reasoning": { "type": "STRING" }
        },
        "required": ["isMatch", "confidence", "reasoning"]
    })
}
