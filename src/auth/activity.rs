use std::fmt;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

use super::AccountId;
use crate::entity::activity_log::{self, Entity as ActivityLogEntity};
use crate::entity::RecordState;
use crate::error::Result;
use crate::util::now_db;

/// Account events worth keeping a trail of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    AccountCreated,
    LoggedIn,
    LoggedOut,
    PasswordChanged,
    BookListed,
    ReviewCreated,
    ReviewDeleted,
}

impl Activity {
    pub fn as_str(self) -> &'static str {
        match self {
            Activity::AccountCreated => "account_created",
            Activity::LoggedIn => "logged_in",
            Activity::LoggedOut => "logged_out",
            Activity::PasswordChanged => "password_changed",
            Activity::BookListed => "book_listed",
            Activity::ReviewCreated => "review_created",
            Activity::ReviewDeleted => "review_deleted",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-account activity trail.
///
/// Each `(account, activity)` pair has one live row holding the latest
/// occurrence; earlier rows are superseded, not deleted. Writes are not best
/// effort: a failure is returned to the caller like any other store error.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    conn: DatabaseConnection,
}

impl ActivityLog {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn record(&self, account_id: AccountId, activity: Activity) -> Result<()> {
        let txn = self.conn.begin().await?;

        ActivityLogEntity::update_many()
            .col_expr(
                activity_log::Column::State,
                Expr::value(RecordState::Superseded),
            )
            .filter(activity_log::Column::AccountId.eq(account_id))
            .filter(activity_log::Column::Activity.eq(activity.as_str()))
            .filter(activity_log::Column::State.eq(RecordState::Active))
            .exec(&txn)
            .await?;

        activity_log::ActiveModel {
            id: NotSet,
            account_id: Set(account_id),
            activity: Set(activity.as_str().to_owned()),
            state: Set(RecordState::Active),
            created_at: Set(now_db()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        debug!(account_id, %activity, "activity recorded");
        Ok(())
    }

    /// The live entry for this activity, if the account ever performed it.
    pub async fn latest(
        &self,
        account_id: AccountId,
        activity: Activity,
    ) -> Result<Option<activity_log::Model>> {
        Ok(ActivityLogEntity::find()
            .filter(activity_log::Column::AccountId.eq(account_id))
            .filter(activity_log::Column::Activity.eq(activity.as_str()))
            .filter(activity_log::Column::State.eq(RecordState::Active))
            .one(&self.conn)
            .await?)
    }

    /// Every entry for this activity, oldest first, superseded ones included.
    pub async fn history(
        &self,
        account_id: AccountId,
        activity: Activity,
    ) -> Result<Vec<activity_log::Model>> {
        Ok(ActivityLogEntity::find()
            .filter(activity_log::Column::AccountId.eq(account_id))
            .filter(activity_log::Column::Activity.eq(activity.as_str()))
            .order_by_asc(activity_log::Column::Id)
            .all(&self.conn)
            .await?)
    }
}
