use std::sync::Arc;

use planner_auth::{Identity, PasswordHasher, Role, SessionManager};
use tracing::{info, warn};

use crate::domain::error::{DomainError, Issues};
use crate::domain::fields::{AccountFields, char_len, non_blank};
use crate::domain::models::{NewUserAccount, UserAccount};
use crate::domain::repo::UserRepository;

/// An account together with a freshly issued session token.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub account: UserAccount,
    pub token: String,
}

/// Login, first-run registration and account creation
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    sessions: Arc<SessionManager>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            users,
            hasher,
            sessions,
        }
    }

    /// Whether at least one account exists.
    pub async fn is_initialized(&self) -> Result<bool, DomainError> {
        Ok(self.users.count().await? > 0)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SignedIn, DomainError> {
        let email = normalize_email(email);
        let password = password.trim();
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::MissingCredentials);
        }

        let Some(account) = self.users.find_by_email(&email).await? else {
            warn!("login failed: unknown account");
            return Err(DomainError::InvalidCredentials);
        };
        if !self.verify(password, &account.password_hash).await? {
            warn!(user_id = %account.id, "login failed: wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.issue(&account)?;
        info!(user_id = %account.id, role = %account.role, "signed in");
        Ok(SignedIn { account, token })
    }

    /// Create the first account as MASTER and sign it in.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<SignedIn, DomainError> {
        let new = self.new_account(email, password, name, Role::Master).await?;
        let Some(account) = self.users.insert_first(new).await? else {
            warn!("registration refused: accounts already exist");
            return Err(DomainError::AlreadyInitialized);
        };
        let token = self.issue(&account)?;
        info!(user_id = %account.id, "initial master account registered");
        Ok(SignedIn { account, token })
    }

    /// Add another account regardless of existing ones.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
        role: Role,
    ) -> Result<UserAccount, DomainError> {
        let new = self.new_account(email, password, name, role).await?;
        let account = self.users.insert(new).await?;
        info!(user_id = %account.id, role = %account.role, "account created");
        Ok(account)
    }

    async fn new_account(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
        role: Role,
    ) -> Result<NewUserAccount, DomainError> {
        let email = normalize_email(email);
        // Login trims too; both sides must hash the same text.
        let password = password.trim();
        let mut issues = Issues::new();
        if email.is_empty() {
            issues.push(AccountFields::EMAIL, "is required");
        } else if !email.contains('@') || char_len(&email) > AccountFields::EMAIL_MAX_CHARS {
            issues.push(AccountFields::EMAIL, "must be a valid email address");
        }
        let len = char_len(password);
        if !(AccountFields::PASSWORD_MIN_CHARS..=AccountFields::PASSWORD_MAX_CHARS).contains(&len) {
            issues.push(
                AccountFields::PASSWORD,
                format!(
                    "must be between {} and {} characters",
                    AccountFields::PASSWORD_MIN_CHARS,
                    AccountFields::PASSWORD_MAX_CHARS
                ),
            );
        }
        issues.finish()?;

        Ok(NewUserAccount {
            email,
            name: non_blank(name),
            role,
            password_hash: self.hash(password).await?,
        })
    }

    // PBKDF2 is CPU bound; keep it off the async workers.
    async fn hash(&self, password: &str) -> Result<String, DomainError> {
        let hasher = self.hasher;
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(e.to_string()))
    }

    async fn verify(&self, password: &str, stored: &str) -> Result<bool, DomainError> {
        let hasher = self.hasher;
        let (password, stored) = (password.to_owned(), stored.to_owned());
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| DomainError::internal(e.to_string()))
    }

    fn issue(&self, account: &UserAccount) -> Result<String, DomainError> {
        self.sessions
            .issue(&Identity {
                user_id: account.id,
                email: account.email.clone(),
                role: account.role,
            })
            .map_err(|e| DomainError::internal(e.to_string()))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
