//! Tenant-scoped submissions: policy, the decision engine, and intake.

pub mod domain;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    GuildPolicy, PointsRecord, PolicyUpdate, Submission, SubmissionId, SubmissionQuery,
    SubmissionReceipt, SubmissionStatus, TenantId, MAX_LIST_LIMIT, SYSTEM_ACTOR,
};
pub use policy::{check_age, check_owner, decide, Decision, PreconditionFailure};
pub use repository::{GuildPolicyRepository, SubmissionRepository};
pub use router::submission_router;
pub use service::{SubmissionError, SubmissionService};
