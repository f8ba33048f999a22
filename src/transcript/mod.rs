//! Decision transcripts
//!
//! A transcript is the finalized, immutable record of one evaluation run:
//! the spec, the engine's result, and the hashes of other transcripts whose
//! conclusions it assumed. Transcripts are identified by the content hash of
//! their canonical serialization and exchanged as envelopes.

mod envelope;
mod errors;
mod model;

pub use envelope::{
    envelope_files_in_dir, load_envelope_from_file, load_envelopes_from_dir, Provenance,
    TranscriptEnvelope, ENVELOPE_EXTENSION,
};
pub use errors::{TranscriptError, TranscriptErrorCode, TranscriptResult};
pub use model::{
    Assumption, BranchNode, DecisionGraph, DecisionResult, DecisionSpec, DecisionTranscript,
    Explanation, FlipCondition, FragileAssumption, LensEvaluation, Transition, PIPELINE_STEPS,
};
