// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the rsvp specific database structs and queries
use super::schema::rsvps;
use database::{DatabaseError, Db, DbConnection, Result};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::upsert::excluded;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Attendance answer of a participant
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
pub enum RsvpStatus {
    Yes,
    No,
    Maybe,
}

impl RsvpStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Maybe => "Maybe",
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown rsvp status {0:?}")]
pub struct UnknownRsvpStatus(pub String);

impl FromStr for RsvpStatus {
    type Err = UnknownRsvpStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Yes" => Ok(Self::Yes),
            "No" => Ok(Self::No),
            "Maybe" => Ok(Self::Maybe),
            _ => Err(UnknownRsvpStatus(s.to_owned())),
        }
    }
}

impl ToSql<Text, Pg> for RsvpStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;

        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for RsvpStatus {
    fn from_sql(value: PgValue<'_>) -> deserialize::Result<Self> {
        let status = std::str::from_utf8(value.as_bytes())?;

        Ok(status.parse()?)
    }
}

/// Diesel rsvp struct
///
/// Represents a single row of the `rsvps` table
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable)]
#[diesel(table_name = rsvps)]
pub struct Rsvp {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: RsvpStatus,
}

impl Rsvp {
    #[tracing::instrument(err, skip_all)]
    pub fn get(conn: &mut DbConnection, id: &str) -> Result<Option<Rsvp>> {
        let rsvp = rsvps::table.find(id).get_result(conn).optional()?;

        Ok(rsvp)
    }

    #[tracing::instrument(err, skip_all)]
    pub fn get_all(conn: &mut DbConnection) -> Result<Vec<Rsvp>> {
        let query = rsvps::table.order_by(rsvps::id.asc());
        let rsvps = query.load(conn)?;

        Ok(rsvps)
    }

    #[tracing::instrument(err, skip_all)]
    pub fn get_all_with_status(conn: &mut DbConnection, status: RsvpStatus) -> Result<Vec<Rsvp>> {
        let query = rsvps::table
            .filter(rsvps::status.eq(status))
            .order_by(rsvps::id.asc());
        let rsvps = query.load(conn)?;

        Ok(rsvps)
    }

    #[tracing::instrument(err, skip_all)]
    pub fn count(conn: &mut DbConnection) -> Result<i64> {
        let count = rsvps::table.count().get_result(conn)?;

        Ok(count)
    }

    #[tracing::instrument(err, skip_all)]
    pub fn count_with_status(conn: &mut DbConnection, status: RsvpStatus) -> Result<i64> {
        let count = rsvps::table
            .filter(rsvps::status.eq(status))
            .count()
            .get_result(conn)?;

        Ok(count)
    }

    /// Deletes the rsvp with the given id
    ///
    /// Returns false if no such rsvp existed
    #[tracing::instrument(err, skip_all)]
    pub fn delete_by_id(conn: &mut DbConnection, id: &str) -> Result<bool> {
        let query = diesel::delete(rsvps::table.find(id));
        let deleted = query.execute(conn)?;

        Ok(deleted > 0)
    }
}

/// Diesel insertable rsvp struct
///
/// Inserting an id which already exists replaces name, email and status of the existing row.
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = rsvps)]
pub struct NewRsvp {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: RsvpStatus,
}

impl NewRsvp {
    #[tracing::instrument(err, skip_all, fields(id = %self.id))]
    pub fn upsert(self, conn: &mut DbConnection) -> Result<Rsvp> {
        let query = self
            .insert_into(rsvps::table)
            .on_conflict(rsvps::id)
            .do_update()
            .set((
                rsvps::name.eq(excluded(rsvps::name)),
                rsvps::email.eq(excluded(rsvps::email)),
                rsvps::status.eq(excluded(rsvps::status)),
            ));

        let rsvp = query.get_result(conn)?;

        Ok(rsvp)
    }

    /// Upserts all given rsvps inside a single transaction
    ///
    /// Either every rsvp is written or none.
    #[tracing::instrument(err, skip_all, fields(len = rsvps.len()))]
    pub fn upsert_all(conn: &mut DbConnection, rsvps: Vec<NewRsvp>) -> Result<Vec<Rsvp>> {
        conn.transaction::<_, DatabaseError, _>(|conn| {
            rsvps.into_iter().map(|rsvp| rsvp.upsert(conn)).collect()
        })
    }
}

/// Keyed storage of rsvp records
///
/// Implemented by the postgres backed [`Db`]. Implementations must keep at most one record per id.
pub trait RsvpStore: Send + Sync {
    /// Returns the rsvp with the given id
    fn get(&self, id: &str) -> Result<Option<Rsvp>>;

    /// Inserts the rsvp or replaces all fields of an existing one with the same id
    fn put(&self, rsvp: NewRsvp) -> Result<Rsvp>;

    /// Like [`RsvpStore::put`] for every given rsvp, but atomically
    fn put_all(&self, rsvps: Vec<NewRsvp>) -> Result<Vec<Rsvp>>;

    /// Removes the rsvp and returns whether it existed
    fn delete(&self, id: &str) -> Result<bool>;

    fn list_all(&self) -> Result<Vec<Rsvp>>;

    fn filter_by_status(&self, status: RsvpStatus) -> Result<Vec<Rsvp>>;

    fn count_all(&self) -> Result<i64>;

    fn count_by_status(&self, status: RsvpStatus) -> Result<i64>;
}

impl RsvpStore for Db {
    fn get(&self, id: &str) -> Result<Option<Rsvp>> {
        let mut conn = self.get_conn()?;

        Rsvp::get(&mut conn, id)
    }

    fn put(&self, rsvp: NewRsvp) -> Result<Rsvp> {
        let mut conn = self.get_conn()?;

        rsvp.upsert(&mut conn)
    }

    fn put_all(&self, rsvps: Vec<NewRsvp>) -> Result<Vec<Rsvp>> {
        let mut conn = self.get_conn()?;

        NewRsvp::upsert_all(&mut conn, rsvps)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut conn = self.get_conn()?;

        Rsvp::delete_by_id(&mut conn, id)
    }

    fn list_all(&self) -> Result<Vec<Rsvp>> {
        let mut conn = self.get_conn()?;

        Rsvp::get_all(&mut conn)
    }

    fn filter_by_status(&self, status: RsvpStatus) -> Result<Vec<Rsvp>> {
        let mut conn = self.get_conn()?;

        Rsvp::get_all_with_status(&mut conn, status)
    }

    fn count_all(&self) -> Result<i64> {
        let mut conn = self.get_conn()?;

        Rsvp::count(&mut conn)
    }

    fn count_by_status(&self, status: RsvpStatus) -> Result<i64> {
        let mut conn = self.get_conn()?;

        Rsvp::count_with_status(&mut conn, status)
    }
}
