pub mod action;
pub mod email;
pub mod flow;
pub mod gateway;
pub mod pending;

pub use flow::{
    create_shared_verification_service, SharedVerificationService, SubmissionOutcome, Submitter,
    VerificationService,
};
pub use gateway::SerenityGateway;
pub use pending::{create_shared_pending_store, PendingReview, PendingStore};
