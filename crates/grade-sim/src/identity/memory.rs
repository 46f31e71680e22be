use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, info};

use super::{AuthError, AuthenticatedUser, Credentials, IdentityProvider};
use crate::simulations::UserId;

/// Consecutive wrong passwords tolerated before sign-in is refused.
const MAX_FAILED_ATTEMPTS: u32 = 5;

#[derive(Debug)]
struct Account {
    user: AuthenticatedUser,
    password: String,
    failed_attempts: u32,
    disabled: bool,
}

/// Local identity provider for development and tests. Accounts live in process memory only.
#[derive(Clone)]
pub struct InMemoryIdentityProvider {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
    current: Arc<watch::Sender<Option<AuthenticatedUser>>>,
    sequence: Arc<AtomicU64>,
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            accounts: Arc::default(),
            current: Arc::new(current),
            sequence: Arc::default(),
        }
    }
}

impl InMemoryIdentityProvider {
    fn accounts(&self) -> Result<MutexGuard<'_, HashMap<String, Account>>, AuthError> {
        self.accounts
            .lock()
            .map_err(|_| AuthError::Other("identity store lock poisoned".to_string()))
    }

    fn next_uid(&self) -> UserId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        UserId(format!("user-{id:06}"))
    }

    /// Blocks further sign-ins for the account, as an administrator would.
    pub fn disable(&self, email: &str) -> Result<(), AuthError> {
        let mut accounts = self.accounts()?;
        let account = accounts
            .get_mut(&email.trim().to_ascii_lowercase())
            .ok_or(AuthError::UserNotFound)?;
        account.disabled = true;
        Ok(())
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    fn sign_up(
        &self,
        credentials: &Credentials,
        display_name: Option<&str>,
    ) -> Result<AuthenticatedUser, AuthError> {
        credentials.validate()?;
        let email = credentials.normalized_email();

        let user = {
            let mut accounts = self.accounts()?;
            if accounts.contains_key(&email) {
                return Err(AuthError::EmailAlreadyInUse);
            }

            let user = AuthenticatedUser {
                uid: self.next_uid(),
                email: email.clone(),
                display_name: display_name
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string),
            };
            accounts.insert(
                email,
                Account {
                    user: user.clone(),
                    password: credentials.password.clone(),
                    failed_attempts: 0,
                    disabled: false,
                },
            );
            user
        };

        info!(uid = %user.uid, "account created");
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    fn sign_in(&self, credentials: &Credentials) -> Result<AuthenticatedUser, AuthError> {
        credentials.validate()?;
        let email = credentials.normalized_email();

        let user = {
            let mut accounts = self.accounts()?;
            let account = accounts.get_mut(&email).ok_or(AuthError::UserNotFound)?;
            if account.disabled {
                return Err(AuthError::UserDisabled);
            }
            if account.failed_attempts >= MAX_FAILED_ATTEMPTS {
                return Err(AuthError::TooManyRequests);
            }
            if account.password != credentials.password {
                account.failed_attempts += 1;
                debug!(
                    uid = %account.user.uid,
                    attempts = account.failed_attempts,
                    "wrong password"
                );
                return Err(AuthError::WrongPassword);
            }
            account.failed_attempts = 0;
            account.user.clone()
        };

        info!(uid = %user.uid, "signed in");
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(user) = self.current.send_replace(None) {
            info!(uid = %user.uid, "signed out");
        }
        Ok(())
    }

    fn current_user(&self) -> Option<AuthenticatedUser> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthenticatedUser>> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered() -> (InMemoryIdentityProvider, AuthenticatedUser) {
        let provider = InMemoryIdentityProvider::default();
        let user = provider
            .sign_up(&Credentials::new("Ana@Uni.edu", "Secret12"), Some("Ana"))
            .expect("sign up succeeds");
        (provider, user)
    }

    #[test]
    fn sign_up_signs_the_user_in() {
        let (provider, user) = registered();
        assert_eq!(user.email, "ana@uni.edu");
        assert_eq!(user.uid, UserId("user-000001".to_string()));
        assert_eq!(provider.current_user(), Some(user));
    }

    #[test]
    fn duplicate_sign_up_is_rejected() {
        let (provider, _) = registered();
        let result = provider.sign_up(&Credentials::new("ana@uni.edu", "Other123"), None);
        assert_eq!(result, Err(AuthError::EmailAlreadyInUse));
    }

    #[test]
    fn sign_in_checks_password_and_trims_email() {
        let (provider, user) = registered();
        provider.sign_out().expect("sign out");
        assert!(!provider.is_authenticated());

        assert_eq!(
            provider.sign_in(&Credentials::new("ana@uni.edu", "wrong-pass")),
            Err(AuthError::WrongPassword)
        );
        let signed_in = provider
            .sign_in(&Credentials::new("  ana@uni.edu ", "Secret12"))
            .expect("sign in succeeds");
        assert_eq!(signed_in, user);
    }

    #[test]
    fn repeated_failures_lock_the_account() {
        let (provider, _) = registered();
        for _ in 0..MAX_FAILED_ATTEMPTS {
            let _ = provider.sign_in(&Credentials::new("ana@uni.edu", "wrong-pass"));
        }
        assert_eq!(
            provider.sign_in(&Credentials::new("ana@uni.edu", "Secret12")),
            Err(AuthError::TooManyRequests)
        );
    }

    #[test]
    fn unknown_and_disabled_accounts_are_refused() {
        let (provider, _) = registered();
        assert_eq!(
            provider.sign_in(&Credentials::new("luis@uni.edu", "Secret12")),
            Err(AuthError::UserNotFound)
        );

        provider.disable("ana@uni.edu").expect("account exists");
        assert_eq!(
            provider.sign_in(&Credentials::new("ana@uni.edu", "Secret12")),
            Err(AuthError::UserDisabled)
        );
    }

    #[test]
    fn subscribers_observe_sign_out() {
        let (provider, user) = registered();
        let receiver = provider.subscribe();
        assert_eq!(*receiver.borrow(), Some(user));

        provider.sign_out().expect("sign out");
        assert_eq!(*receiver.borrow(), None);
    }
}
