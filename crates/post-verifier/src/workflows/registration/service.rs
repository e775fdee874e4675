use std::sync::Arc;

use tracing::{info, warn};

use super::code::{text_contains_code, CodeGenerator, RandomCodeGenerator, MAX_CODE_ATTEMPTS};
use super::domain::{AccountId, IssuedCode, PendingRegistration, VerifiedHandle};
use super::repository::AccountRepository;
use crate::clock::{Clock, SystemClock};
use crate::error::ErrorKind;
use crate::workflows::content::{ContentError, ContentSource};
use crate::workflows::repository::{Constraint, RepositoryError};

/// Which verification check a fetched post failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    HandleMismatch { found: String, expected: String },
    PostPredatesCode,
    CodeNotFound { code: String },
}

impl std::fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationFailure::HandleMismatch { found, expected } => write!(
                f,
                "post author handle is {found}, expected {expected}"
            ),
            VerificationFailure::PostPredatesCode => {
                write!(f, "the post must be created after your code was issued")
            }
            VerificationFailure::CodeNotFound { code } => {
                write!(f, "your code {code} was not found in the post")
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("handle must not be blank")]
    BlankHandle,
    #[error("already registered as {handle}")]
    AlreadyRegistered { handle: String },
    #[error("an active registration code already exists")]
    ActiveCodeExists { issued: IssuedCode },
    #[error("no active registration code found; register first")]
    NoActiveCode,
    #[error("verification failed: {0}")]
    VerificationFailed(VerificationFailure),
    #[error("could not fetch the post: {0}")]
    Content(#[from] ContentError),
    #[error("could not allocate a unique registration code")]
    CodeSpaceExhausted,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl RegistrationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistrationError::BlankHandle | RegistrationError::VerificationFailed(_) => {
                ErrorKind::Validation
            }
            RegistrationError::AlreadyRegistered { .. }
            | RegistrationError::ActiveCodeExists { .. }
            | RegistrationError::CodeSpaceExhausted => ErrorKind::Conflict,
            RegistrationError::NoActiveCode => ErrorKind::NotFound,
            RegistrationError::Content(err) => err.kind(),
            RegistrationError::Repository(err) => err.kind(),
        }
    }
}

/// Issues verification codes and proves handle ownership against fetched posts.
pub struct RegistrationService<R> {
    accounts: Arc<R>,
    content: Arc<dyn ContentSource>,
    codes: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
}

impl<R> RegistrationService<R>
where
    R: AccountRepository + 'static,
{
    pub fn new(accounts: Arc<R>, content: Arc<dyn ContentSource>) -> Self {
        Self::with_parts(
            accounts,
            content,
            Arc::new(RandomCodeGenerator),
            Arc::new(SystemClock),
        )
    }

    pub fn with_parts(
        accounts: Arc<R>,
        content: Arc<dyn ContentSource>,
        codes: Arc<dyn CodeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            content,
            codes,
            clock,
        }
    }

    /// Issues a code for `handle`, or reports the still-active one unchanged.
    pub fn register(
        &self,
        account_id: &AccountId,
        handle: &str,
    ) -> Result<IssuedCode, RegistrationError> {
        let handle = handle.trim();
        if handle.is_empty() {
            return Err(RegistrationError::BlankHandle);
        }

        let account = self.accounts.ensure_account(account_id)?;
        if let Some(registered) = account.registered_handle {
            return Err(RegistrationError::AlreadyRegistered { handle: registered });
        }

        let now = self.clock.now();
        if let Some(existing) = self.accounts.active_pending(account_id, now)? {
            return Err(RegistrationError::ActiveCodeExists {
                issued: IssuedCode::from(&existing),
            });
        }

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let pending = PendingRegistration::issue(
                account_id.clone(),
                handle.to_string(),
                self.codes.generate(),
                now,
            );
            match self.accounts.insert_pending(pending.clone()) {
                Ok(()) => {
                    info!(account = %account_id, handle, attempt, "registration code issued");
                    return Ok(IssuedCode::from(&pending));
                }
                Err(RepositoryError::Conflict(Constraint::RegistrationCode)) => {
                    warn!(account = %account_id, attempt, "registration code collision");
                }
                Err(RepositoryError::Conflict(Constraint::ActiveRegistration)) => {
                    // Lost a race with a concurrent registration for the same account.
                    return match self.accounts.active_pending(account_id, now)? {
                        Some(existing) => Err(RegistrationError::ActiveCodeExists {
                            issued: IssuedCode::from(&existing),
                        }),
                        None => Err(RepositoryError::Conflict(Constraint::ActiveRegistration).into()),
                    };
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(RegistrationError::CodeSpaceExhausted)
    }

    /// Fetches the referenced post and binds the handle when every check passes.
    pub async fn verify(
        &self,
        account_id: &AccountId,
        reference: &str,
    ) -> Result<VerifiedHandle, RegistrationError> {
        let account = self
            .accounts
            .account(account_id)?
            .ok_or(RegistrationError::NoActiveCode)?;
        if let Some(handle) = account.registered_handle {
            return Err(RegistrationError::AlreadyRegistered { handle });
        }

        let pending = self
            .accounts
            .active_pending(account_id, self.clock.now())?
            .ok_or(RegistrationError::NoActiveCode)?;

        let post = self.content.fetch(reference).await?;

        if post.owner_handle != pending.requested_handle {
            return Err(RegistrationError::VerificationFailed(
                VerificationFailure::HandleMismatch {
                    found: post.owner_handle,
                    expected: pending.requested_handle,
                },
            ));
        }
        if post.post_time_ms <= pending.issued_at.timestamp_millis() {
            return Err(RegistrationError::VerificationFailed(
                VerificationFailure::PostPredatesCode,
            ));
        }
        if !text_contains_code(&post.text_content, &pending.code) {
            return Err(RegistrationError::VerificationFailed(
                VerificationFailure::CodeNotFound { code: pending.code },
            ));
        }

        let registered_at = self.clock.now();
        let account = self
            .accounts
            .complete_registration(
                account_id,
                &pending.id,
                &pending.requested_handle,
                registered_at,
            )
            .map_err(|err| match err {
                // The code expired or was consumed while the post was being fetched.
                RepositoryError::NotFound => RegistrationError::NoActiveCode,
                other => other.into(),
            })?;
        info!(account = %account_id, handle = %pending.requested_handle, "handle verified");

        Ok(VerifiedHandle {
            handle: account
                .registered_handle
                .unwrap_or(pending.requested_handle),
            registered_at,
        })
    }

    /// Administrative reset allowing the account to register again.
    pub fn reset(&self, account_id: &AccountId) -> Result<(), RegistrationError> {
        self.accounts.reset_registration(account_id, self.clock.now())?;
        info!(account = %account_id, "registration reset");
        Ok(())
    }
}
