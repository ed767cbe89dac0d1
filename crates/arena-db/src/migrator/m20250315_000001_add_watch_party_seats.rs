//! Adds the seats_taken counter to watch_parties
//!
//! Seat reservation increments this column with a conditional update so two
//! concurrent joins can never both take the last seat.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(WatchParty::Table)
                    .add_column(
                        ColumnDef::new(WatchParty::SeatsTaken)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // Backfill from the attendance ledger for parties created before the counter existed
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                UPDATE watch_parties
                SET seats_taken = (
                    SELECT COUNT(*) FROM watch_party_attendees
                    WHERE watch_party_attendees.watch_party_id = watch_parties.id
                )
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(WatchParty::Table)
                    .drop_column(WatchParty::SeatsTaken)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum WatchParty {
    #[sea_orm(iden = "watch_parties")]
    Table,
    SeatsTaken,
}
