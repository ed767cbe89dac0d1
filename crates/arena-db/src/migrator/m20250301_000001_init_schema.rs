//! Initial schema: users, teams, labs, tournaments and watch parties

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. users (mirror of identity provider principals)
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(string_len(User::Id, 255).primary_key())
                    .col(string_len(User::FirstName, 255).not_null())
                    .col(string_len(User::LastName, 255).not_null())
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(User::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. teams
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Team::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Team::Name)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Team::CreatorId).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Team::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Team::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_creator_id")
                            .from(Team::Table, Team::CreatorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_teams_creator_id")
                    .table(Team::Table)
                    .col(Team::CreatorId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. team_members ledger, one row per (user, team)
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(TeamMember::Table)
                    .if_not_exists()
                    .col(string_len(TeamMember::UserId, 255).not_null())
                    .col(integer(TeamMember::TeamId).not_null())
                    .col(
                        timestamp_with_time_zone(TeamMember::JoinedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(TeamMember::UserId)
                            .col(TeamMember::TeamId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_team_id")
                            .from(TeamMember::Table, TeamMember::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_user_id")
                            .from(TeamMember::Table, TeamMember::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_members_team_id")
                    .table(TeamMember::Table)
                    .col(TeamMember::TeamId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. computer_labs (reference data)
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(ComputerLab::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComputerLab::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComputerLab::Name)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ComputerLab::ComputerCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ComputerLab::Description).text().null())
                    .col(
                        ColumnDef::new(ComputerLab::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. lab_bookings, at most one per (lab, day)
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(LabBooking::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LabBooking::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LabBooking::LabId).integer().not_null())
                    .col(ColumnDef::new(LabBooking::TeamId).integer().not_null())
                    .col(ColumnDef::new(LabBooking::BookingDate).date().not_null())
                    .col(
                        ColumnDef::new(LabBooking::BookedByUserId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabBooking::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lab_bookings_lab_id")
                            .from(LabBooking::Table, LabBooking::LabId)
                            .to(ComputerLab::Table, ComputerLab::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lab_bookings_team_id")
                            .from(LabBooking::Table, LabBooking::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lab_bookings_booked_by_user_id")
                            .from(LabBooking::Table, LabBooking::BookedByUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lab_bookings_slot")
                    .table(LabBooking::Table)
                    .col(LabBooking::LabId)
                    .col(LabBooking::BookingDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lab_bookings_booked_by_user_id")
                    .table(LabBooking::Table)
                    .col(LabBooking::BookedByUserId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 6. tournaments (only the name is unique)
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Tournament::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tournament::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Tournament::Name)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Tournament::Date).date().not_null())
                    .col(
                        ColumnDef::new(Tournament::GameTitle)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tournament::Genre).string_len(255).null())
                    .col(ColumnDef::new(Tournament::PrizeFund).string_len(255).null())
                    .col(
                        ColumnDef::new(Tournament::CreatorId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tournament::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Tournament::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tournaments_creator_id")
                            .from(Tournament::Table, Tournament::CreatorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 7. watch_parties
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(WatchParty::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WatchParty::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WatchParty::TournamentId).integer().not_null())
                    .col(
                        ColumnDef::new(WatchParty::CreatorId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WatchParty::PartyDateTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WatchParty::Location).string_len(255).not_null())
                    .col(ColumnDef::new(WatchParty::MaxAttendees).integer().not_null())
                    .col(
                        ColumnDef::new(WatchParty::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(WatchParty::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watch_parties_tournament_id")
                            .from(WatchParty::Table, WatchParty::TournamentId)
                            .to(Tournament::Table, Tournament::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watch_parties_creator_id")
                            .from(WatchParty::Table, WatchParty::CreatorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_watch_parties_tournament_id")
                    .table(WatchParty::Table)
                    .col(WatchParty::TournamentId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 8. watch_party_attendees ledger, one row per (user, party)
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(WatchPartyAttendee::Table)
                    .if_not_exists()
                    .col(string_len(WatchPartyAttendee::UserId, 255).not_null())
                    .col(integer(WatchPartyAttendee::WatchPartyId).not_null())
                    .col(
                        timestamp_with_time_zone(WatchPartyAttendee::JoinedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(WatchPartyAttendee::UserId)
                            .col(WatchPartyAttendee::WatchPartyId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watch_party_attendees_watch_party_id")
                            .from(WatchPartyAttendee::Table, WatchPartyAttendee::WatchPartyId)
                            .to(WatchParty::Table, WatchParty::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watch_party_attendees_user_id")
                            .from(WatchPartyAttendee::Table, WatchPartyAttendee::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_watch_party_attendees_watch_party_id")
                    .table(WatchPartyAttendee::Table)
                    .col(WatchPartyAttendee::WatchPartyId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children first so foreign keys never dangle
        manager
            .drop_table(Table::drop().table(WatchPartyAttendee::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WatchParty::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tournament::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LabBooking::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ComputerLab::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeamMember::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Team::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    FirstName,
    LastName,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Team {
    #[sea_orm(iden = "teams")]
    Table,
    Id,
    Name,
    CreatorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeamMember {
    #[sea_orm(iden = "team_members")]
    Table,
    UserId,
    TeamId,
    JoinedAt,
}

#[derive(DeriveIden)]
enum ComputerLab {
    #[sea_orm(iden = "computer_labs")]
    Table,
    Id,
    Name,
    ComputerCount,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LabBooking {
    #[sea_orm(iden = "lab_bookings")]
    Table,
    Id,
    LabId,
    TeamId,
    BookingDate,
    BookedByUserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tournament {
    #[sea_orm(iden = "tournaments")]
    Table,
    Id,
    Name,
    Date,
    GameTitle,
    Genre,
    PrizeFund,
    CreatorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WatchParty {
    #[sea_orm(iden = "watch_parties")]
    Table,
    Id,
    TournamentId,
    CreatorId,
    PartyDateTime,
    Location,
    MaxAttendees,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WatchPartyAttendee {
    #[sea_orm(iden = "watch_party_attendees")]
    Table,
    UserId,
    WatchPartyId,
    JoinedAt,
}
