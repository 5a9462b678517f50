use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IsolationLevel, NotSet,
    QueryFilter, Set, TransactionTrait,
};
use tracing::{debug, warn};

use super::token::{extract_bearer, generate_token, Token};
use super::{AccountId, Principal};
use crate::entity::account::{self, AccountStatus, Entity as AccountEntity};
use crate::entity::password_reset::{self, Entity as PasswordResetEntity};
use crate::entity::RecordState;
use crate::error::{Error, Result};
use crate::util::now_db;

/// Issues, binds and resolves the opaque tokens used by the login,
/// activation and password reset flows.
///
/// The authority keeps no state of its own beyond the database handle, so it
/// is cheap to clone into every request handler.
///
/// # Token lifecycles
///
/// - **Login**: one per account. Issuing a new one overwrites the old one,
///   logout clears it. No expiry.
/// - **Activation**: set at registration, cleared when consumed. Unknown and
///   already-consumed tokens fail the same way.
/// - **Password reset**: one `Active` row per account. Issuing a newer token
///   or completing the reset moves rows to `Superseded`, which is terminal.
#[derive(Debug, Clone)]
pub struct TokenAuthority {
    conn: DatabaseConnection,
}

impl TokenAuthority {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Generates a login token and makes it the account's only session.
    pub async fn issue_login_token(&self, account_id: AccountId, entropy: &[&str]) -> Result<Token> {
        let token = generate_token(entropy);
        self.bind_login_token(account_id, &token).await?;
        Ok(token)
    }

    /// Stores `token` as the account's login token, discarding the previous one.
    ///
    /// A token already bound to another account is rejected with
    /// [`Error::Validation`].
    pub async fn bind_login_token(&self, account_id: AccountId, token: &Token) -> Result<()> {
        let result = AccountEntity::update_many()
            .col_expr(account::Column::LoginToken, Expr::value(token.as_str()))
            .filter(account::Column::Id.eq(account_id))
            .exec(&self.conn)
            .await
            .map_err(|e| Error::from_unique_violation(e, "login token already in use"))?;

        if result.rows_affected == 0 {
            return Err(Error::NotFound);
        }

        debug!(account_id, "login token bound");
        Ok(())
    }

    /// Looks up the account currently bound to this exact login token.
    ///
    /// `None` covers tokens that were never issued, were overwritten by a
    /// later login, or were cleared by logout.
    pub async fn resolve_login_token(&self, token: &str) -> Result<Option<AccountId>> {
        if token.is_empty() {
            return Ok(None);
        }

        let account = AccountEntity::find()
            .filter(account::Column::LoginToken.eq(token))
            .one(&self.conn)
            .await?;

        Ok(account.map(|model| model.id))
    }

    /// Resolves an `Authorization` header value into the acting principal.
    pub async fn authenticate(&self, header: &str) -> Result<Principal> {
        match self.resolve_login_token(extract_bearer(header)).await? {
            Some(account_id) => Ok(Principal { account_id }),
            None => {
                warn!("rejected bearer token");
                Err(Error::NotFound)
            }
        }
    }

    /// Clears the account's login token.
    pub async fn logout(&self, account_id: AccountId) -> Result<()> {
        AccountEntity::update_many()
            .col_expr(account::Column::LoginToken, Expr::value(Option::<String>::None))
            .filter(account::Column::Id.eq(account_id))
            .exec(&self.conn)
            .await?;

        debug!(account_id, "login token cleared");
        Ok(())
    }

    /// Whether `token` would activate a pending account right now.
    pub async fn is_activation_pending(&self, token: &str) -> Result<bool> {
        Ok(self.find_pending(token).await?.is_some())
    }

    /// Consumes an activation token: clears it and marks the account active.
    ///
    /// The token is single-use. A second call, an unknown token and an
    /// account that is already active all fail with [`Error::NotFound`].
    pub async fn activate(&self, token: &str) -> Result<AccountId> {
        let Some(pending) = self.find_pending(token).await? else {
            warn!("rejected activation token");
            return Err(Error::NotFound);
        };

        // The filter repeats the lookup so a concurrent activation of the same
        // token updates nothing here instead of activating twice.
        let result = AccountEntity::update_many()
            .col_expr(
                account::Column::ActivationToken,
                Expr::value(Option::<String>::None),
            )
            .col_expr(account::Column::Status, Expr::value(AccountStatus::Active))
            .filter(account::Column::Id.eq(pending.id))
            .filter(account::Column::ActivationToken.eq(token))
            .filter(account::Column::Status.eq(AccountStatus::Pending))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::NotFound);
        }

        debug!(account_id = pending.id, "account activated");
        Ok(pending.id)
    }

    /// Generates a reset token for the account, superseding any live one.
    pub async fn issue_reset_token(&self, account_id: AccountId, entropy: &[&str]) -> Result<Token> {
        let token = generate_token(entropy);
        self.bind_reset_token(account_id, &token).await?;
        Ok(token)
    }

    /// Supersedes the account's live reset tokens and stores `token` as the new
    /// live one.
    ///
    /// Both steps run in one serializable transaction, so concurrent requests
    /// for the same account cannot leave two live rows behind. A token string
    /// that was ever stored before is rejected with [`Error::Validation`] and
    /// leaves the account's live token untouched.
    pub async fn bind_reset_token(&self, account_id: AccountId, token: &Token) -> Result<()> {
        if AccountEntity::find_by_id(account_id)
            .one(&self.conn)
            .await?
            .is_none()
        {
            return Err(Error::NotFound);
        }

        let txn = self
            .conn
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;

        let superseded = supersede_reset_tokens(&txn, account_id).await?;

        password_reset::ActiveModel {
            id: NotSet,
            account_id: Set(account_id),
            token: Set(token.as_str().to_owned()),
            state: Set(RecordState::Active),
            created_at: Set(now_db()),
        }
        .insert(&txn)
        .await
        .map_err(|e| Error::from_unique_violation(e, "reset token already in use"))?;

        txn.commit().await?;

        debug!(account_id, superseded, "reset token issued");
        Ok(())
    }

    /// Resolves a live reset token to its account.
    ///
    /// Superseded and unknown tokens are indistinguishable: both are
    /// [`Error::NotFound`].
    pub async fn resolve_reset_token(&self, token: &str) -> Result<AccountId> {
        find_live_reset(&self.conn, token).await
    }

    async fn find_pending(&self, token: &str) -> Result<Option<account::Model>> {
        if token.is_empty() {
            return Ok(None);
        }

        Ok(AccountEntity::find()
            .filter(account::Column::ActivationToken.eq(token))
            .filter(account::Column::Status.eq(AccountStatus::Pending))
            .one(&self.conn)
            .await?)
    }
}

/// Marks every live reset token of the account as superseded and returns how
/// many rows changed.
pub(crate) async fn supersede_reset_tokens<C>(db: &C, account_id: AccountId) -> Result<u64>
where
    C: sea_orm::ConnectionTrait,
{
    let result = PasswordResetEntity::update_many()
        .col_expr(
            password_reset::Column::State,
            Expr::value(RecordState::Superseded),
        )
        .filter(password_reset::Column::AccountId.eq(account_id))
        .filter(password_reset::Column::State.eq(RecordState::Active))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

pub(crate) async fn find_live_reset<C>(db: &C, token: &str) -> Result<AccountId>
where
    C: sea_orm::ConnectionTrait,
{
    if token.is_empty() {
        return Err(Error::NotFound);
    }

    let row = PasswordResetEntity::find()
        .filter(password_reset::Column::Token.eq(token))
        .filter(password_reset::Column::State.eq(RecordState::Active))
        .one(db)
        .await?;

    match row {
        Some(row) => Ok(row.account_id),
        None => {
            warn!("rejected reset token");
            Err(Error::NotFound)
        }
    }
}
