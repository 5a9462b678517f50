use sea_orm::entity::prelude::*;

/// Lifecycle of a soft-superseded row.
///
/// Password reset tokens and activity log entries are never deleted. The
/// live row for an account is the single `Active` one; every earlier row is
/// `Superseded`, which is terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum RecordState {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "superseded")]
    Superseded,
}
