//! One-time registration codes and handle verification.

pub mod code;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use code::{CodeGenerator, RandomCodeGenerator, CODE_PREFIX};
pub use domain::{Account, AccountId, IssuedCode, PendingId, PendingRegistration, VerifiedHandle};
pub use repository::AccountRepository;
pub use router::registration_router;
pub use service::{RegistrationError, RegistrationService, VerificationFailure};
