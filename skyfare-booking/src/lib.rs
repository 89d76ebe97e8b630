pub mod outcome;
pub mod pricing;
pub mod request;
pub mod testing;
pub mod verify;
pub mod workflow;

pub use outcome::{ConfirmationFailure, ConfirmationOutcome, FailureStatus};
pub use request::ConfirmationRequest;
pub use workflow::ConfirmationWorkflow;
