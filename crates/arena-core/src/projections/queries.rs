use std::collections::{HashMap, HashSet};

use arena_db::entities::{
    computer_lab, lab_booking, team, team_member, tournament, user, watch_party,
    watch_party_attendee,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use tracing::debug;

use super::filter::{apply, LabField, SearchFilter, TeamField, TournamentField, WatchPartyField};
use super::views::{
    BookingView, LabView, TeamView, TournamentOption, TournamentView, WatchPartyView,
};
use crate::error::ReadError;
use crate::identity::{Identity, Principal};
use crate::ledger::Ledger;
use crate::slots::booked_labs_on;
use crate::workflow::ArenaService;

/// Group-by count keyed on an integer column
async fn counts_by<C, E>(
    conn: &C,
    key: E::Column,
    counted: E::Column,
) -> Result<HashMap<i32, u64>, DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let rows: Vec<(i32, i64)> = E::find()
        .select_only()
        .column(key)
        .column_as(Expr::col(counted).count(), "total")
        .group_by(key)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, total)| (id, total.max(0) as u64))
        .collect())
}

impl ArenaService {
    // ---------------------------------------------------------------- teams

    pub async fn my_teams(&self, identity: &Identity) -> Result<Vec<TeamView>, ReadError> {
        let principal = identity.resolve()?;
        let joined: HashMap<i32, DateTime<Utc>> = Ledger::teams(&self.db)
            .list_for_principal(&principal.id)
            .await?
            .into_iter()
            .collect();

        let ids: HashSet<i32> = joined.keys().copied().collect();
        let views = self.team_views(principal, &ids, &joined).await?;
        debug!("{} teams for {}", views.len(), principal.id);
        Ok(views)
    }

    pub async fn available_teams(
        &self,
        identity: &Identity,
        filter: Option<&SearchFilter<TeamField>>,
    ) -> Result<Vec<TeamView>, ReadError> {
        let principal = identity.resolve()?;
        let ids: HashSet<i32> = Ledger::teams(&self.db)
            .list_excluding_principal(&principal.id)
            .await?
            .into_iter()
            .collect();

        let views = self.team_views(principal, &ids, &HashMap::new()).await?;
        Ok(apply(views, filter))
    }

    async fn team_views(
        &self,
        principal: &Principal,
        ids: &HashSet<i32>,
        joined: &HashMap<i32, DateTime<Utc>>,
    ) -> Result<Vec<TeamView>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let teams = team::Entity::find()
            .filter(team::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(team::Column::Name)
            .all(&self.db)
            .await?;
        let members = counts_by::<_, team_member::Entity>(
            &self.db,
            team_member::Column::TeamId,
            team_member::Column::UserId,
        )
        .await?;

        Ok(teams
            .into_iter()
            .map(|t| TeamView {
                is_creator: t.creator_id == principal.id,
                member_count: members.get(&t.id).copied().unwrap_or(0),
                joined_at: joined.get(&t.id).copied(),
                id: t.id,
                name: t.name,
                creator_id: t.creator_id,
                created_at: t.created_at,
            })
            .collect())
    }

    // ------------------------------------------------------- labs & bookings

    pub async fn list_labs(&self, identity: &Identity) -> Result<Vec<LabView>, ReadError> {
        identity.resolve()?;
        let labs = computer_lab::Entity::find()
            .order_by_asc(computer_lab::Column::Name)
            .all(&self.db)
            .await?;
        Ok(labs.into_iter().map(LabView::from).collect())
    }

    /// Labs with no booking on `date`
    pub async fn available_labs(
        &self,
        identity: &Identity,
        date: NaiveDate,
        filter: Option<&SearchFilter<LabField>>,
    ) -> Result<Vec<LabView>, ReadError> {
        identity.resolve()?;
        let booked: HashSet<i32> = booked_labs_on(&self.db, date).await?.into_iter().collect();

        let labs: Vec<LabView> = computer_lab::Entity::find()
            .order_by_asc(computer_lab::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .filter(|lab| !booked.contains(&lab.id))
            .map(LabView::from)
            .collect();

        Ok(apply(labs, filter))
    }

    /// The principal's bookings dated on or after `from`, soonest first
    pub async fn my_bookings(
        &self,
        identity: &Identity,
        from: NaiveDate,
    ) -> Result<Vec<BookingView>, ReadError> {
        let principal = identity.resolve()?;

        let bookings = lab_booking::Entity::find()
            .filter(lab_booking::Column::BookedByUserId.eq(principal.id.as_str()))
            .filter(lab_booking::Column::BookingDate.gte(from))
            .order_by_asc(lab_booking::Column::BookingDate)
            .order_by_asc(lab_booking::Column::Id)
            .all(&self.db)
            .await?;

        if bookings.is_empty() {
            return Ok(Vec::new());
        }

        let lab_ids: HashSet<i32> = bookings.iter().map(|b| b.lab_id).collect();
        let team_ids: HashSet<i32> = bookings.iter().map(|b| b.team_id).collect();

        let labs: HashMap<i32, String> = computer_lab::Entity::find()
            .filter(computer_lab::Column::Id.is_in(lab_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|l| (l.id, l.name))
            .collect();
        let teams: HashMap<i32, String> = team::Entity::find()
            .filter(team::Column::Id.is_in(team_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();
        let booker = user::Entity::find_by_id(principal.id.clone())
            .one(&self.db)
            .await?
            .map(|u| format!("{} {}", u.first_name, u.last_name).trim().to_string())
            .unwrap_or_else(|| principal.display_name());

        Ok(bookings
            .into_iter()
            .map(|b| BookingView {
                lab_name: labs.get(&b.lab_id).cloned().unwrap_or_default(),
                team_name: teams.get(&b.team_id).cloned().unwrap_or_default(),
                booked_by_name: booker.clone(),
                id: b.id,
                lab_id: b.lab_id,
                team_id: b.team_id,
                booking_date: b.booking_date,
                booked_by_user_id: b.booked_by_user_id,
                created_at: b.created_at,
            })
            .collect())
    }

    // ----------------------------------------------------------- tournaments

    /// Tournaments the principal holds a watch-party seat for
    pub async fn my_tournaments(
        &self,
        identity: &Identity,
    ) -> Result<Vec<TournamentView>, ReadError> {
        let principal = identity.resolve()?;
        let registered = self.registrations(principal).await?;
        let views = self
            .tournament_views(principal, &registered, |id| registered.contains_key(&id))
            .await?;
        Ok(views)
    }

    pub async fn available_tournaments(
        &self,
        identity: &Identity,
        filter: Option<&SearchFilter<TournamentField>>,
    ) -> Result<Vec<TournamentView>, ReadError> {
        let principal = identity.resolve()?;
        let registered = self.registrations(principal).await?;
        let views = self
            .tournament_views(principal, &HashMap::new(), |id| {
                !registered.contains_key(&id)
            })
            .await?;
        Ok(apply(views, filter))
    }

    /// Id/name pairs of every tournament, soonest first
    pub async fn tournament_options(
        &self,
        identity: &Identity,
    ) -> Result<Vec<TournamentOption>, ReadError> {
        identity.resolve()?;
        let options: Vec<(i32, String)> = tournament::Entity::find()
            .select_only()
            .column(tournament::Column::Id)
            .column(tournament::Column::Name)
            .order_by_asc(tournament::Column::Date)
            .order_by_asc(tournament::Column::Name)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(options
            .into_iter()
            .map(|(id, name)| TournamentOption { id, name })
            .collect())
    }

    /// Tournament id -> earliest seat taken by the principal
    async fn registrations(
        &self,
        principal: &Principal,
    ) -> Result<HashMap<i32, DateTime<Utc>>, DbErr> {
        let rows: Vec<(i32, DateTime<Utc>)> = watch_party_attendee::Entity::find()
            .select_only()
            .column(watch_party::Column::TournamentId)
            .column(watch_party_attendee::Column::JoinedAt)
            .join(
                sea_orm::JoinType::InnerJoin,
                watch_party_attendee::Relation::WatchParty.def(),
            )
            .filter(watch_party_attendee::Column::UserId.eq(principal.id.as_str()))
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut registered: HashMap<i32, DateTime<Utc>> = HashMap::new();
        for (tournament_id, joined_at) in rows {
            registered
                .entry(tournament_id)
                .and_modify(|at| *at = (*at).min(joined_at))
                .or_insert(joined_at);
        }
        Ok(registered)
    }

    async fn tournament_views(
        &self,
        principal: &Principal,
        registered: &HashMap<i32, DateTime<Utc>>,
        keep: impl Fn(i32) -> bool,
    ) -> Result<Vec<TournamentView>, DbErr> {
        let tournaments = tournament::Entity::find()
            .order_by_asc(tournament::Column::Date)
            .order_by_asc(tournament::Column::Name)
            .all(&self.db)
            .await?;
        let parties = counts_by::<_, watch_party::Entity>(
            &self.db,
            watch_party::Column::TournamentId,
            watch_party::Column::Id,
        )
        .await?;
        let organized: HashSet<i32> = watch_party::Entity::find()
            .select_only()
            .column(watch_party::Column::TournamentId)
            .filter(watch_party::Column::CreatorId.eq(principal.id.as_str()))
            .into_tuple::<i32>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();

        Ok(tournaments
            .into_iter()
            .filter(|t| keep(t.id))
            .map(|t| TournamentView {
                is_creator: t.creator_id == principal.id,
                can_manage: t.creator_id == principal.id || organized.contains(&t.id),
                watch_party_count: parties.get(&t.id).copied().unwrap_or(0),
                registered_at: registered.get(&t.id).copied(),
                id: t.id,
                name: t.name,
                date: t.date,
                game_title: t.game_title,
                genre: t.genre,
                prize_fund: t.prize_fund,
                creator_id: t.creator_id,
            })
            .collect())
    }

    // --------------------------------------------------------- watch parties

    pub async fn my_watch_parties(
        &self,
        identity: &Identity,
    ) -> Result<Vec<WatchPartyView>, ReadError> {
        let principal = identity.resolve()?;
        let joined: HashMap<i32, DateTime<Utc>> = Ledger::watch_parties(&self.db)
            .list_for_principal(&principal.id)
            .await?
            .into_iter()
            .collect();

        let ids: HashSet<i32> = joined.keys().copied().collect();
        Ok(self.watch_party_views(principal, &ids, &joined).await?)
    }

    pub async fn available_watch_parties(
        &self,
        identity: &Identity,
        filter: Option<&SearchFilter<WatchPartyField>>,
    ) -> Result<Vec<WatchPartyView>, ReadError> {
        let principal = identity.resolve()?;
        let ids: HashSet<i32> = Ledger::watch_parties(&self.db)
            .list_excluding_principal(&principal.id)
            .await?
            .into_iter()
            .collect();

        let views = self
            .watch_party_views(principal, &ids, &HashMap::new())
            .await?;
        Ok(apply(views, filter))
    }

    /// Seats currently held at a watch party
    pub async fn attendee_count(
        &self,
        identity: &Identity,
        party_id: i32,
    ) -> Result<u64, ReadError> {
        identity.resolve()?;
        Ok(Ledger::watch_parties(&self.db).occupancy(party_id).await?)
    }

    async fn watch_party_views(
        &self,
        principal: &Principal,
        ids: &HashSet<i32>,
        joined: &HashMap<i32, DateTime<Utc>>,
    ) -> Result<Vec<WatchPartyView>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let parties = watch_party::Entity::find()
            .filter(watch_party::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(watch_party::Column::PartyDateTime)
            .order_by_asc(watch_party::Column::Id)
            .all(&self.db)
            .await?;

        let tournament_ids: HashSet<i32> = parties.iter().map(|p| p.tournament_id).collect();
        let names: HashMap<i32, String> = tournament::Entity::find()
            .filter(tournament::Column::Id.is_in(tournament_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();
        let attendees = counts_by::<_, watch_party_attendee::Entity>(
            &self.db,
            watch_party_attendee::Column::WatchPartyId,
            watch_party_attendee::Column::UserId,
        )
        .await?;

        Ok(parties
            .into_iter()
            .map(|p| WatchPartyView {
                tournament_name: names.get(&p.tournament_id).cloned().unwrap_or_default(),
                is_creator: p.creator_id == principal.id,
                attendee_count: attendees.get(&p.id).copied().unwrap_or(0),
                joined_at: joined.get(&p.id).copied(),
                id: p.id,
                tournament_id: p.tournament_id,
                creator_id: p.creator_id,
                party_date_time: p.party_date_time,
                location: p.location,
                max_attendees: p.max_attendees,
            })
            .collect())
    }
}
