use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IsolationLevel, NotSet,
    QueryFilter, Set, TransactionTrait,
};
use tracing::{info, warn};

use super::activity::{Activity, ActivityLog};
use super::authority::{find_live_reset, supersede_reset_tokens, TokenAuthority};
use super::password::PasswordHasher;
use super::token::{generate_token, Token};
use super::{AccountId, Principal};
use crate::entity::account::{self, AccountStatus, Entity as AccountEntity};
use crate::error::{Error, Result};
use crate::util::now_db;

/// Outcome of a successful registration.
///
/// The activation token is meant to be mailed to the user; the account stays
/// pending until it comes back through [`AccountService::activate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub account_id: AccountId,
    pub activation_token: Token,
}

/// A freshly issued login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account_id: AccountId,
    pub token: Token,
}

/// Registration, login and password reset on top of the [`TokenAuthority`].
///
/// Every failure a client could learn something from (unknown email, wrong
/// password, pending account, stale token) is reported as [`Error::NotFound`].
#[derive(Debug, Clone)]
pub struct AccountService {
    conn: DatabaseConnection,
    authority: TokenAuthority,
    hasher: PasswordHasher,
    activity: ActivityLog,
}

impl AccountService {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            authority: TokenAuthority::new(conn.clone()),
            activity: ActivityLog::new(conn.clone()),
            hasher: PasswordHasher::default(),
            conn,
        }
    }

    pub fn with_password_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn authority(&self) -> &TokenAuthority {
        &self.authority
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Creates a pending account and its activation token.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        entropy: &[&str],
    ) -> Result<Registration> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::Validation("email must not be empty".into()));
        }
        if password.is_empty() {
            return Err(Error::Validation("password must not be empty".into()));
        }
        if self.email_exists(email).await?.is_some() {
            return Err(Error::Validation("email already registered".into()));
        }

        let password_hash = self.hasher.hash(password)?;
        let mut inputs = entropy.to_vec();
        inputs.push(email);
        let activation_token = generate_token(&inputs);

        let model = account::ActiveModel {
            id: NotSet,
            email: Set(email.to_owned()),
            password_hash: Set(password_hash),
            status: Set(AccountStatus::Pending),
            activation_token: Set(Some(activation_token.as_str().to_owned())),
            login_token: Set(None),
            created_at: Set(now_db()),
        }
        .insert(&self.conn)
        .await
        // lost a race with a concurrent registration of the same email
        .map_err(|e| Error::from_unique_violation(e, "email already registered"))?;

        self.activity
            .record(model.id, Activity::AccountCreated)
            .await?;

        info!(account_id = model.id, "account registered");
        Ok(Registration {
            account_id: model.id,
            activation_token,
        })
    }

    pub async fn email_exists(&self, email: &str) -> Result<Option<AccountId>> {
        let account = AccountEntity::find()
            .filter(account::Column::Email.eq(email.trim()))
            .one(&self.conn)
            .await?;

        Ok(account.map(|model| model.id))
    }

    pub async fn is_activation_pending(&self, token: &str) -> Result<bool> {
        self.authority.is_activation_pending(token).await
    }

    pub async fn activate(&self, token: &str) -> Result<AccountId> {
        let account_id = self.authority.activate(token).await?;
        info!(account_id, "account activated");
        Ok(account_id)
    }

    /// Checks the credentials of an active account and starts a new session,
    /// ending any previous one.
    pub async fn login(&self, email: &str, password: &str, entropy: &[&str]) -> Result<Session> {
        let account = AccountEntity::find()
            .filter(account::Column::Email.eq(email.trim()))
            .filter(account::Column::Status.eq(AccountStatus::Active))
            .one(&self.conn)
            .await?;

        let Some(account) = account else {
            warn!("login rejected");
            return Err(Error::NotFound);
        };

        if !self.hasher.verify(&account.password_hash, password)? {
            warn!(account_id = account.id, "login rejected");
            return Err(Error::NotFound);
        }

        let token = self.authority.issue_login_token(account.id, entropy).await?;
        self.activity.record(account.id, Activity::LoggedIn).await?;

        info!(account_id = account.id, "logged in");
        Ok(Session {
            account_id: account.id,
            token,
        })
    }

    pub async fn authenticate(&self, header: &str) -> Result<Principal> {
        self.authority.authenticate(header).await
    }

    pub async fn logout(&self, principal: &Principal) -> Result<()> {
        self.authority.logout(principal.account_id).await?;
        self.activity
            .record(principal.account_id, Activity::LoggedOut)
            .await?;

        info!(account_id = principal.account_id, "logged out");
        Ok(())
    }

    /// Issues a reset token when the email belongs to an account.
    ///
    /// `None` for unknown emails. Callers should answer the client the same
    /// way in both cases.
    pub async fn request_password_reset(
        &self,
        email: &str,
        entropy: &[&str],
    ) -> Result<Option<Token>> {
        let Some(account_id) = self.email_exists(email).await? else {
            return Ok(None);
        };

        let mut inputs = entropy.to_vec();
        inputs.push(email);
        let token = self.authority.issue_reset_token(account_id, &inputs).await?;

        info!(account_id, "password reset requested");
        Ok(Some(token))
    }

    /// Sets a new password through a live reset token and retires the token.
    ///
    /// The token check, the password update and the supersede run in one
    /// serializable transaction, so a token can complete at most one reset.
    pub async fn complete_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<AccountId> {
        if new_password.is_empty() {
            return Err(Error::Validation("password must not be empty".into()));
        }

        // cheap rejection before paying for the hash
        self.authority.resolve_reset_token(token).await?;
        let password_hash = self.hasher.hash(new_password)?;

        let txn = self
            .conn
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;

        let account_id = find_live_reset(&txn, token).await?;

        let updated = AccountEntity::update_many()
            .col_expr(account::Column::PasswordHash, Expr::value(password_hash))
            .filter(account::Column::Id.eq(account_id))
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            return Err(Error::NotFound);
        }

        supersede_reset_tokens(&txn, account_id).await?;
        txn.commit().await?;

        self.activity
            .record(account_id, Activity::PasswordChanged)
            .await?;

        info!(account_id, "password changed");
        Ok(account_id)
    }
}
