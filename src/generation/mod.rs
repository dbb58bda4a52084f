pub mod controller;

pub use controller::{
    Attempt, DisplayState, GENERATION_FAILED_MESSAGE, GenerationController, GenerationOutcome,
    GenerationPhase,
};
