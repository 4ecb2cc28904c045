pub mod schema;

use crate::analysis::SeatCount;
use crate::model::election::{
    ElectionResultRow, LevelOutcome, MarginRecord, PartyTypeTally, Sex, TurnoutRecord, FIRST_YEAR,
    LAST_YEAR,
};
use schema::{ColumnRegistry, OptionalField};
use serde::Serialize;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Search results are capped at this many rows.
pub const SEARCH_LIMIT: i64 = 100;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Data integrity error: {0}")]
    Integrity(String),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Read-only handle on the election results store.
#[derive(Clone)]
pub struct ElectionDatabase {
    pool: SqlitePool,
}

impl ElectionDatabase {
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Single never-expiring connection, so the in-memory database survives
    /// between checkouts.
    #[cfg(test)]
    pub async fn create_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self { pool })
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check out a connection for the duration of one request or report
    /// question. It goes back to the pool when the handle is dropped.
    pub async fn reader(&self) -> Result<ReadHandle> {
        Ok(ReadHandle {
            conn: self.pool.acquire().await?,
        })
    }

    /// Verify the table layout and record which optional columns exist.
    pub async fn probe_columns(&self) -> Result<ColumnRegistry> {
        let mut reader = self.reader().await?;
        schema::probe_columns(&mut reader.conn).await
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PartySeats {
    #[sqlx(rename = "Year")]
    #[serde(rename = "Year", skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[sqlx(rename = "Party")]
    #[serde(rename = "Party")]
    pub party: String,
    pub seats: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenderTally {
    pub year: i64,
    pub total: i64,
    pub women: i64,
    pub men: i64,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PartyVotes {
    #[sqlx(rename = "Party")]
    pub party: String,
    pub total_votes: i64,
    pub seats_won: i64,
}

/// Filters for the free-text search. Blank strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub candidate: Option<String>,
    pub constituency: Option<String>,
    pub year: Option<i64>,
    pub state: Option<String>,
    pub party: Option<String>,
    pub gender: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

const ROW_SELECT: &str = r#"
    SELECT
        CAST(Year AS INTEGER) AS Year,
        State_Name,
        Constituency_Name,
        Candidate,
        Party,
        Sex,
        CAST(Position AS INTEGER) AS Position,
        CAST(Votes AS INTEGER) AS Votes,
        CAST(Valid_Votes AS INTEGER) AS Valid_Votes,
        CAST(Margin AS INTEGER) AS Margin,
        CAST(Margin_Percentage AS REAL) AS Margin_Percentage,
        CAST(Turnout_Percentage AS REAL) AS Turnout_Percentage,
        Party_Type_TCPD
    FROM election_results
    "#;

/// A pooled connection checked out for one unit of work.
pub struct ReadHandle {
    conn: PoolConnection<Sqlite>,
}

impl ReadHandle {
    /// Distinct election years, ascending.
    pub async fn years(&mut self) -> Result<Vec<i64>> {
        let years = sqlx::query_scalar(
            r#"
            SELECT DISTINCT CAST(Year AS INTEGER)
            FROM election_results
            WHERE Year >= ? AND Year <= ?
            ORDER BY 1
            "#,
        )
        .bind(FIRST_YEAR)
        .bind(LAST_YEAR)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(years)
    }

    pub async fn latest_year(&mut self) -> Result<Option<i64>> {
        Ok(self.years().await?.last().copied())
    }

    pub async fn states(&mut self) -> Result<Vec<String>> {
        let states = sqlx::query_scalar(
            r#"
            SELECT DISTINCT State_Name
            FROM election_results
            WHERE Year >= ? AND Year <= ? AND State_Name IS NOT NULL
            ORDER BY State_Name
            "#,
        )
        .bind(FIRST_YEAR)
        .bind(LAST_YEAR)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(states)
    }

    pub async fn parties(&mut self) -> Result<Vec<String>> {
        let parties = sqlx::query_scalar(
            r#"
            SELECT DISTINCT Party
            FROM election_results
            WHERE Year >= ? AND Year <= ? AND Party IS NOT NULL
            ORDER BY Party
            "#,
        )
        .bind(FIRST_YEAR)
        .bind(LAST_YEAR)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(parties)
    }

    /// Seats won per party, most first. Without a year, one row per year and party.
    pub async fn seat_share(&mut self, year: Option<i64>) -> Result<Vec<PartySeats>> {
        let rows = match year {
            Some(year) => {
                sqlx::query_as(
                    r#"
                    SELECT NULL AS Year, Party, COUNT(*) AS seats
                    FROM election_results
                    WHERE Year = ? AND Year >= ? AND Year <= ?
                        AND Position = 1 AND Party IS NOT NULL
                    GROUP BY Party
                    ORDER BY seats DESC, Party
                    "#,
                )
                .bind(year)
                .bind(FIRST_YEAR)
                .bind(LAST_YEAR)
                .fetch_all(&mut *self.conn)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT CAST(Year AS INTEGER) AS Year, Party, COUNT(*) AS seats
                    FROM election_results
                    WHERE Year >= ? AND Year <= ?
                        AND Position = 1 AND Party IS NOT NULL
                    GROUP BY Year, Party
                    ORDER BY Year, seats DESC, Party
                    "#,
                )
                .bind(FIRST_YEAR)
                .bind(LAST_YEAR)
                .fetch_all(&mut *self.conn)
                .await?
            }
        };

        Ok(rows)
    }

    pub async fn seats_by_party(&mut self, year: i64) -> Result<SeatCount> {
        Ok(self
            .seat_share(Some(year))
            .await?
            .into_iter()
            .map(|row| (row.party, row.seats))
            .collect())
    }

    /// Turnout rows ordered by year, state and constituency.
    pub async fn turnout_records(&mut self, year: Option<i64>) -> Result<Vec<TurnoutRecord>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                CAST(Year AS INTEGER) AS Year,
                State_Name,
                Constituency_Name,
                CAST(Turnout_Percentage AS REAL) AS Turnout_Percentage
            FROM election_results
            WHERE Year >= ? AND Year <= ? AND (? IS NULL OR Year = ?)
                AND State_Name IS NOT NULL
            ORDER BY Year, State_Name, Constituency_Name
            "#,
        )
        .bind(FIRST_YEAR)
        .bind(LAST_YEAR)
        .bind(year)
        .bind(year)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }

    /// Candidates per year split by sex.
    pub async fn gender_tallies(&mut self) -> Result<Vec<GenderTally>> {
        let rows: Vec<(i64, Option<String>, i64)> = sqlx::query_as(
            r#"
            SELECT CAST(Year AS INTEGER), Sex, COUNT(*)
            FROM election_results
            WHERE Year >= ? AND Year <= ?
            GROUP BY Year, Sex
            "#,
        )
        .bind(FIRST_YEAR)
        .bind(LAST_YEAR)
        .fetch_all(&mut *self.conn)
        .await?;

        let mut tallies: BTreeMap<i64, GenderTally> = BTreeMap::new();
        for (year, sex, count) in rows {
            let tally = tallies.entry(year).or_insert(GenderTally {
                year,
                total: 0,
                women: 0,
                men: 0,
            });
            tally.total += count;
            match Sex::from_code(sex.as_deref()) {
                Sex::Female => tally.women += count,
                Sex::Male => tally.men += count,
                Sex::Other => {}
            }
        }

        Ok(tallies.into_values().collect())
    }

    /// Parties by votes polled, most first.
    pub async fn party_votes(&mut self, year: Option<i64>, limit: i64) -> Result<Vec<PartyVotes>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                Party,
                CAST(COALESCE(SUM(Votes), 0) AS INTEGER) AS total_votes,
                SUM(CASE WHEN Position = 1 THEN 1 ELSE 0 END) AS seats_won
            FROM election_results
            WHERE Year >= ? AND Year <= ? AND (? IS NULL OR Year = ?)
                AND Party IS NOT NULL
            GROUP BY Party
            ORDER BY total_votes DESC, Party
            LIMIT ?
            "#,
        )
        .bind(FIRST_YEAR)
        .bind(LAST_YEAR)
        .bind(year)
        .bind(year)
        .bind(limit)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }

    /// All votes cast, over one year or the whole range.
    pub async fn total_votes(&mut self, year: Option<i64>) -> Result<i64> {
        let total = sqlx::query_scalar(
            r#"
            SELECT CAST(COALESCE(SUM(Votes), 0) AS INTEGER)
            FROM election_results
            WHERE Year >= ? AND Year <= ? AND (? IS NULL OR Year = ?)
            "#,
        )
        .bind(FIRST_YEAR)
        .bind(LAST_YEAR)
        .bind(year)
        .bind(year)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(total)
    }

    pub async fn total_votes_by_year(&mut self) -> Result<BTreeMap<i64, i64>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT CAST(Year AS INTEGER), CAST(COALESCE(SUM(Votes), 0) AS INTEGER)
            FROM election_results
            WHERE Year >= ? AND Year <= ?
            GROUP BY Year
            "#,
        )
        .bind(FIRST_YEAR)
        .bind(LAST_YEAR)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Votes and seats of national and regional parties per year.
    pub async fn party_type_tallies(&mut self) -> Result<Vec<PartyTypeTally>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                CAST(Year AS INTEGER) AS Year,
                Party_Type_TCPD,
                CAST(COALESCE(SUM(Votes), 0) AS INTEGER) AS votes,
                SUM(CASE WHEN Position = 1 THEN 1 ELSE 0 END) AS seats
            FROM election_results
            WHERE Year >= ? AND Year <= ?
                AND Party_Type_TCPD IN ('National Party', 'Regional Party')
            GROUP BY Year, Party_Type_TCPD
            ORDER BY Year, Party_Type_TCPD
            "#,
        )
        .bind(FIRST_YEAR)
        .bind(LAST_YEAR)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }

    /// Every winning row, null margins included, ordered by year, state and
    /// constituency. Ranking code relies on this order for ties.
    pub async fn winning_margins(&mut self, year: Option<i64>) -> Result<Vec<MarginRecord>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                CAST(Year AS INTEGER) AS Year,
                State_Name,
                Constituency_Name,
                Candidate,
                Party,
                CAST(Margin_Percentage AS REAL) AS Margin_Percentage,
                CAST(Margin AS INTEGER) AS Margin,
                CAST(Votes AS INTEGER) AS Votes,
                CAST(Valid_Votes AS INTEGER) AS Valid_Votes
            FROM election_results
            WHERE Year >= ? AND Year <= ? AND (? IS NULL OR Year = ?)
                AND Position = 1
            ORDER BY Year, State_Name, Constituency_Name
            "#,
        )
        .bind(FIRST_YEAR)
        .bind(LAST_YEAR)
        .bind(year)
        .bind(year)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }

    /// Up to [`SEARCH_LIMIT`] rows, newest year first, then by position.
    pub async fn search(&mut self, filter: &SearchFilter) -> Result<Vec<ElectionResultRow>> {
        let mut query = QueryBuilder::<Sqlite>::new(ROW_SELECT);
        query.push(" WHERE Year >= ");
        query.push_bind(FIRST_YEAR);
        query.push(" AND Year <= ");
        query.push_bind(LAST_YEAR);

        if let Some(candidate) = present(&filter.candidate) {
            query.push(" AND Candidate LIKE ");
            query.push_bind(format!("%{}%", candidate));
        }
        if let Some(constituency) = present(&filter.constituency) {
            query.push(" AND Constituency_Name LIKE ");
            query.push_bind(format!("%{}%", constituency));
        }
        if let Some(year) = filter.year {
            query.push(" AND Year = ");
            query.push_bind(year);
        }
        if let Some(state) = present(&filter.state) {
            query.push(" AND State_Name = ");
            query.push_bind(state.to_string());
        }
        if let Some(party) = present(&filter.party) {
            query.push(" AND Party = ");
            query.push_bind(party.to_string());
        }
        if let Some(gender) = present(&filter.gender) {
            query.push(" AND Sex = ");
            query.push_bind(gender.to_string());
        }

        query.push(" ORDER BY Year DESC, Position LIMIT ");
        query.push_bind(SEARCH_LIMIT);

        let rows = query
            .build_query_as::<ElectionResultRow>()
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(rows)
    }

    /// Outcomes per level of an optional column that the probe found.
    pub async fn field_outcomes(&mut self, field: &OptionalField) -> Result<Vec<LevelOutcome>> {
        let rows = sqlx::query_as(field.outcome_query)
            .bind(FIRST_YEAR)
            .bind(LAST_YEAR)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(rows)
    }
}

#[cfg(test)]
pub mod fixtures {
    use super::*;

    pub async fn seeded(rows: &[ElectionResultRow], with_education: bool) -> ElectionDatabase {
        let db = ElectionDatabase::create_in_memory().await.unwrap();
        schema::create_schema(db.pool(), with_education).await.unwrap();
        for row in rows {
            insert_row(db.pool(), row).await;
        }
        db
    }

    pub async fn insert_row(pool: &SqlitePool, row: &ElectionResultRow) {
        sqlx::query(
            r#"
            INSERT INTO election_results (
                Year, State_Name, Constituency_Name, Candidate, Party, Sex, Position,
                Votes, Valid_Votes, Margin, Margin_Percentage, Turnout_Percentage,
                Party_Type_TCPD
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.year)
        .bind(&row.state_name)
        .bind(&row.constituency_name)
        .bind(&row.candidate)
        .bind(&row.party)
        .bind(&row.sex)
        .bind(row.position)
        .bind(row.votes)
        .bind(row.valid_votes)
        .bind(row.margin)
        .bind(row.margin_percentage)
        .bind(row.turnout_percentage)
        .bind(&row.party_type)
        .execute(pool)
        .await
        .unwrap();
    }

    /// A candidate row with the fields most tests care about.
    pub fn candidate(
        year: i64,
        state: &str,
        constituency: &str,
        name: &str,
        party: &str,
        position: i64,
        votes: i64,
    ) -> ElectionResultRow {
        ElectionResultRow {
            year,
            state_name: Some(state.to_string()),
            constituency_name: Some(constituency.to_string()),
            candidate: Some(name.to_string()),
            party: Some(party.to_string()),
            sex: Some("M".to_string()),
            position,
            votes: Some(votes),
            valid_votes: Some(votes * 2),
            margin: None,
            margin_percentage: None,
            turnout_percentage: Some(60.0),
            party_type: Some("National Party".to_string()),
        }
    }

    /// Two elections in two states, plus one row outside the year range.
    pub fn sample_rows() -> Vec<ElectionResultRow> {
        let mut rows = vec![
            candidate(2014, "Kerala", "Wayanad", "Shanavas", "INC", 1, 500),
            candidate(2014, "Kerala", "Wayanad", "Sathyan", "CPI", 2, 400),
            candidate(2014, "Bihar", "Patna Sahib", "Sinha", "BJP", 1, 600),
            candidate(2014, "Bihar", "Patna Sahib", "Shekhar", "INC", 2, 300),
            candidate(2019, "Kerala", "Wayanad", "Gandhi", "INC", 1, 700),
            candidate(2019, "Kerala", "Wayanad", "Suneer", "CPI", 2, 270),
            candidate(2019, "Bihar", "Patna Sahib", "Prasad", "BJP", 1, 600),
            candidate(2019, "Bihar", "Patna Sahib", "Sinha", "JD(U)", 2, 320),
            candidate(1989, "Bihar", "Patna", "Old", "JD", 1, 100),
        ];

        for row in rows.iter_mut() {
            match (row.year, row.state_name.as_deref()) {
                (2014, Some("Kerala")) => row.turnout_percentage = Some(73.3),
                (2014, Some("Bihar")) => row.turnout_percentage = Some(45.4),
                (2019, Some("Kerala")) => row.turnout_percentage = Some(80.3),
                (2019, Some("Bihar")) => row.turnout_percentage = Some(46.3),
                _ => {}
            }
            if row.party.as_deref() == Some("CPI") || row.party.as_deref() == Some("JD(U)") {
                row.party_type = Some("Regional Party".to_string());
            }
            if row.candidate.as_deref() == Some("Suneer") {
                row.sex = Some("F".to_string());
            }
        }

        rows[0].margin = Some(100);
        rows[0].margin_percentage = Some(11.1);
        rows[2].margin = Some(300);
        rows[2].margin_percentage = Some(33.3);
        rows[4].margin = Some(430);
        rows[4].margin_percentage = Some(44.2);
        rows[6].margin = Some(280);
        rows[6].margin_percentage = Some(30.4);
        rows
    }
}
