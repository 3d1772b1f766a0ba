use tracing::{error, warn};

use crate::auth::{password::verify_password, repo::CredentialStore, repo_types::UserRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    UserNotFound,
    InvalidPassword,
    ServerError,
}

impl FailureReason {
    /// Reason code for logs; never sent to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::UserNotFound => "user-not-found",
            FailureReason::InvalidPassword => "invalid-password",
            FailureReason::ServerError => "server-error",
        }
    }
}

#[derive(Debug)]
pub enum LoginOutcome {
    Success(UserRecord),
    Failure(FailureReason),
}

/// Looks up `email` (trimmed, exact match) and checks `password` against the stored hash.
/// Store and hash faults are logged and reported as `ServerError`.
pub async fn login(store: &dyn CredentialStore, email: &str, password: &str) -> LoginOutcome {
    let email = email.trim();

    let mut rows = match store.find_by_email(email).await {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, "credential lookup failed");
            return LoginOutcome::Failure(FailureReason::ServerError);
        }
    };

    if rows.is_empty() {
        return LoginOutcome::Failure(FailureReason::UserNotFound);
    }
    if rows.len() > 1 {
        warn!(email = %email, matches = rows.len(), "email is not unique in login table; using first row");
    }
    let user = rows.swap_remove(0);

    let hash = match std::str::from_utf8(&user.password) {
        Ok(h) => h.to_owned(),
        Err(e) => {
            error!(error = %e, "stored password hash is not utf-8");
            return LoginOutcome::Failure(FailureReason::ServerError);
        }
    };

    // bcrypt/argon2 are deliberately slow; keep them off the async workers
    let plain = password.to_owned();
    let verified = tokio::task::spawn_blocking(move || verify_password(&plain, &hash)).await;

    match verified {
        Ok(Ok(true)) => LoginOutcome::Success(user),
        Ok(Ok(false)) => LoginOutcome::Failure(FailureReason::InvalidPassword),
        Ok(Err(e)) => {
            error!(error = %e, "password verification failed");
            LoginOutcome::Failure(FailureReason::ServerError)
        }
        Err(e) => {
            error!(error = %e, "password verification task failed");
            LoginOutcome::Failure(FailureReason::ServerError)
        }
    }
}
