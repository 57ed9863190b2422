//! [`Dataset`] implementation over the `PostgreSQL` results database.
//!
//! Each session owns one pooled connection and returns it to the pool when
//! dropped. Scans push equality filters down as nullable parameters
//! (`$1::INT IS NULL OR col = $1`); ordering and aggregation stay in the
//! engine.
//!
//! A failed scan is logged with its [`sqlx::Error`] and reported as
//! [`DatasetError::Unavailable`].

use async_trait::async_trait;
use pitwall_stats::dataset::{RaceFilter, ResultFilter, StandingsFilter, TimingFilter};
use pitwall_stats::{Dataset, DatasetError, DatasetSession};
use pitwall_types::{
    Circuit, CircuitId, Constructor, ConstructorId, Driver, DriverId, EntityId, EntityKind,
    LapTime, PitStop, Race, RaceId, RaceResult, StandingsEntry, Status,
};
use sqlx::Postgres;
use sqlx::pool::PoolConnection;

use crate::postgres::PostgresPool;
use crate::rows::{
    CircuitRow, ConstructorRow, DriverRow, LapTimeRow, PitStopRow, RaceRow, ResultRow,
    StandingRow, StatusRow,
};

const DRIVER_STANDINGS_SQL: &str = r#"
    SELECT s."raceId" AS race_id, s."driverId" AS entity_id, s.points, s.position, s.wins
      FROM driver_standings s
      JOIN races r ON r."raceId" = s."raceId"
     WHERE ($1::INT IS NULL OR r.year = $1)
       AND ($2::INT IS NULL OR s."raceId" = $2)
       AND ($3::INT IS NULL OR s."driverId" = $3)"#;

const CONSTRUCTOR_STANDINGS_SQL: &str = r#"
    SELECT s."raceId" AS race_id, s."constructorId" AS entity_id, s.points, s.position, s.wins
      FROM constructor_standings s
      JOIN races r ON r."raceId" = s."raceId"
     WHERE ($1::INT IS NULL OR r.year = $1)
       AND ($2::INT IS NULL OR s."raceId" = $2)
       AND ($3::INT IS NULL OR s."constructorId" = $3)"#;

/// Build an error mapper that logs the failed scan.
fn scan_failed(scan: &'static str) -> impl FnOnce(sqlx::Error) -> DatasetError {
    move |err| {
        tracing::error!(scan, error = %err, "Dataset scan failed");
        DatasetError::Unavailable
    }
}

/// Collect optional typed ids into a bindable array.
fn id_array<T: Copy>(ids: Option<&[T]>, raw: impl Fn(T) -> i32) -> Option<Vec<i32>> {
    ids.map(|ids| ids.iter().copied().map(raw).collect())
}

#[async_trait]
impl Dataset for PostgresPool {
    async fn session(&self) -> Result<Box<dyn DatasetSession>, DatasetError> {
        let conn = self.pool().acquire().await.map_err(scan_failed("acquire"))?;
        Ok(Box::new(PostgresSession { conn }))
    }
}

/// A query session holding one pooled connection.
struct PostgresSession {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl DatasetSession for PostgresSession {
    async fn seasons(&mut self) -> Result<Vec<i32>, DatasetError> {
        let years: Vec<(i32,)> =
            sqlx::query_as("SELECT DISTINCT year FROM races WHERE year IS NOT NULL")
                .fetch_all(&mut *self.conn)
                .await
                .map_err(scan_failed("seasons"))?;
        Ok(years.into_iter().map(|(year,)| year).collect())
    }

    async fn races(&mut self, filter: &RaceFilter) -> Result<Vec<Race>, DatasetError> {
        let rows = sqlx::query_as::<_, RaceRow>(
            r#"SELECT "raceId" AS race_id, year, round, name, "circuitId" AS circuit_id
                 FROM races
                WHERE ($1::INT IS NULL OR year = $1)
                  AND ($2::INT IS NULL OR "raceId" = $2)
                  AND ($3::INT IS NULL OR "circuitId" = $3)"#,
        )
        .bind(filter.year)
        .bind(filter.race_id.map(RaceId::into_inner))
        .bind(filter.circuit_id.map(CircuitId::into_inner))
        .fetch_all(&mut *self.conn)
        .await
        .map_err(scan_failed("races"))?;
        Ok(rows.into_iter().filter_map(RaceRow::into_race).collect())
    }

    async fn results(&mut self, filter: &ResultFilter) -> Result<Vec<RaceResult>, DatasetError> {
        let rows = sqlx::query_as::<_, ResultRow>(
            r#"SELECT res."raceId" AS race_id, res."driverId" AS driver_id,
                      res."constructorId" AS constructor_id, res.grid, res.position,
                      res.points, res."statusId" AS status_id
                 FROM results res
                 JOIN races r ON r."raceId" = res."raceId"
                WHERE ($1::INT IS NULL OR r.year = $1)
                  AND ($2::INT IS NULL OR res."raceId" = $2)
                  AND ($3::INT IS NULL OR res."driverId" = $3)
                  AND ($4::INT IS NULL OR res."constructorId" = $4)
                  AND ($5::INT IS NULL OR r."circuitId" = $5)
                  AND ($6::INT IS NULL OR res.position = $6)"#,
        )
        .bind(filter.year)
        .bind(filter.race_id.map(RaceId::into_inner))
        .bind(filter.driver_id.map(DriverId::into_inner))
        .bind(filter.constructor_id.map(ConstructorId::into_inner))
        .bind(filter.circuit_id.map(CircuitId::into_inner))
        .bind(filter.position)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(scan_failed("results"))?;
        Ok(rows.into_iter().map(RaceResult::from).collect())
    }

    async fn standings(
        &mut self,
        kind: EntityKind,
        filter: &StandingsFilter,
    ) -> Result<Vec<StandingsEntry>, DatasetError> {
        let sql = match kind {
            EntityKind::Driver => DRIVER_STANDINGS_SQL,
            EntityKind::Constructor => CONSTRUCTOR_STANDINGS_SQL,
        };
        // An entity of the other kind matches nothing in this table.
        let entity = match filter.entity {
            Some(id) if id.kind() != kind => return Ok(Vec::new()),
            other => other.map(EntityId::into_inner),
        };
        let rows = sqlx::query_as::<_, StandingRow>(sql)
            .bind(filter.year)
            .bind(filter.race_id.map(RaceId::into_inner))
            .bind(entity)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(scan_failed("standings"))?;
        Ok(rows.into_iter().map(|row| row.into_entry(kind)).collect())
    }

    async fn pit_stops(&mut self, filter: &TimingFilter) -> Result<Vec<PitStop>, DatasetError> {
        let rows = sqlx::query_as::<_, PitStopRow>(
            r#"SELECT ps."raceId" AS race_id, ps."driverId" AS driver_id, ps.stop, ps.lap,
                      ps.milliseconds
                 FROM pit_stops ps
                 JOIN races r ON r."raceId" = ps."raceId"
                WHERE ($1::INT IS NULL OR r.year = $1)
                  AND ($2::INT IS NULL OR ps."raceId" = $2)
                  AND ($3::INT IS NULL OR ps."driverId" = $3)"#,
        )
        .bind(filter.year)
        .bind(filter.race_id.map(RaceId::into_inner))
        .bind(filter.driver_id.map(DriverId::into_inner))
        .fetch_all(&mut *self.conn)
        .await
        .map_err(scan_failed("pit_stops"))?;
        Ok(rows.into_iter().map(PitStop::from).collect())
    }

    async fn lap_times(&mut self, filter: &TimingFilter) -> Result<Vec<LapTime>, DatasetError> {
        let rows = sqlx::query_as::<_, LapTimeRow>(
            r#"SELECT lt."raceId" AS race_id, lt."driverId" AS driver_id, lt.lap, lt.position,
                      lt.milliseconds
                 FROM lap_times lt
                WHERE ($1::INT IS NULL
                       OR lt."raceId" IN (SELECT "raceId" FROM races WHERE year = $1))
                  AND ($2::INT IS NULL OR lt."raceId" = $2)
                  AND ($3::INT IS NULL OR lt."driverId" = $3)"#,
        )
        .bind(filter.year)
        .bind(filter.race_id.map(RaceId::into_inner))
        .bind(filter.driver_id.map(DriverId::into_inner))
        .fetch_all(&mut *self.conn)
        .await
        .map_err(scan_failed("lap_times"))?;
        Ok(rows.into_iter().map(LapTime::from).collect())
    }

    async fn drivers(&mut self, ids: Option<&[DriverId]>) -> Result<Vec<Driver>, DatasetError> {
        let rows = sqlx::query_as::<_, DriverRow>(
            r#"SELECT "driverId" AS driver_id, forename, surname, nationality, dob
                 FROM drivers
                WHERE ($1::INT[] IS NULL OR "driverId" = ANY($1))"#,
        )
        .bind(id_array(ids, DriverId::into_inner))
        .fetch_all(&mut *self.conn)
        .await
        .map_err(scan_failed("drivers"))?;
        Ok(rows.into_iter().map(Driver::from).collect())
    }

    async fn constructors(
        &mut self,
        ids: Option<&[ConstructorId]>,
    ) -> Result<Vec<Constructor>, DatasetError> {
        let rows = sqlx::query_as::<_, ConstructorRow>(
            r#"SELECT "constructorId" AS constructor_id, name, nationality
                 FROM constructors
                WHERE ($1::INT[] IS NULL OR "constructorId" = ANY($1))"#,
        )
        .bind(id_array(ids, ConstructorId::into_inner))
        .fetch_all(&mut *self.conn)
        .await
        .map_err(scan_failed("constructors"))?;
        Ok(rows.into_iter().map(Constructor::from).collect())
    }

    async fn circuits(&mut self, ids: Option<&[CircuitId]>) -> Result<Vec<Circuit>, DatasetError> {
        let rows = sqlx::query_as::<_, CircuitRow>(
            r#"SELECT "circuitId" AS circuit_id, name, country, location
                 FROM circuits
                WHERE ($1::INT[] IS NULL OR "circuitId" = ANY($1))"#,
        )
        .bind(id_array(ids, CircuitId::into_inner))
        .fetch_all(&mut *self.conn)
        .await
        .map_err(scan_failed("circuits"))?;
        Ok(rows.into_iter().map(Circuit::from).collect())
    }

    async fn statuses(&mut self) -> Result<Vec<Status>, DatasetError> {
        let rows = sqlx::query_as::<_, StatusRow>(
            r#"SELECT "statusId" AS status_id, status FROM status"#,
        )
        .fetch_all(&mut *self.conn)
        .await
        .map_err(scan_failed("statuses"))?;
        Ok(rows.into_iter().map(Status::from).collect())
    }
}
