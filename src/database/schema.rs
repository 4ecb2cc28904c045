/// Layout checks for the `election_results` table and the registry of
/// optional analytical columns.
use crate::database::{DatabaseError, Result};
use sqlx::SqliteConnection;

pub const TABLE: &str = "election_results";

/// Columns every query depends on.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Year",
    "State_Name",
    "Constituency_Name",
    "Candidate",
    "Party",
    "Sex",
    "Position",
    "Votes",
    "Valid_Votes",
    "Margin",
    "Margin_Percentage",
    "Vote_Share_Percentage",
    "Turnout_Percentage",
    "Party_Type_TCPD",
];

/// A column that only some releases of the dataset carry, with the fixed
/// query that reports a [`LevelOutcome`](crate::model::election::LevelOutcome)
/// per distinct value.
#[derive(Debug)]
pub struct OptionalField {
    pub name: &'static str,
    pub column: &'static str,
    pub outcome_query: &'static str,
}

pub static EDUCATION: OptionalField = OptionalField {
    name: "education",
    column: "Education",
    outcome_query: r#"
        SELECT
            CAST(Education AS TEXT) AS level,
            COUNT(*) AS total,
            SUM(CASE WHEN Position = 1 THEN 1 ELSE 0 END) AS winners,
            AVG(Vote_Share_Percentage) AS avg_vote_share
        FROM election_results
        WHERE Year >= ? AND Year <= ? AND Education IS NOT NULL
        GROUP BY Education
        ORDER BY Education
        "#,
};

pub static OPTIONAL_FIELDS: &[&OptionalField] = &[&EDUCATION];

/// Optional fields found in the connected database.
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    present: Vec<&'static OptionalField>,
}

impl ColumnRegistry {
    pub fn get(&self, name: &str) -> Option<&'static OptionalField> {
        self.present.iter().copied().find(|field| field.name == name)
    }

    pub fn education(&self) -> Option<&'static OptionalField> {
        self.get(EDUCATION.name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.present.iter().map(|field| field.name).collect()
    }
}

/// Verify the results table exists with every required column, and record
/// which optional fields are present. Column names compare case-insensitively.
pub async fn probe_columns(conn: &mut SqliteConnection) -> Result<ColumnRegistry> {
    let columns: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info('election_results')")
            .fetch_all(&mut *conn)
            .await?;

    if columns.is_empty() {
        return Err(DatabaseError::Integrity(format!("Missing table: {}", TABLE)));
    }

    let has = |wanted: &str| columns.iter().any(|c| c.eq_ignore_ascii_case(wanted));

    for required in REQUIRED_COLUMNS {
        if !has(required) {
            return Err(DatabaseError::Integrity(format!(
                "Missing column: {}.{}",
                TABLE, required
            )));
        }
    }

    Ok(ColumnRegistry {
        present: OPTIONAL_FIELDS
            .iter()
            .copied()
            .filter(|field| has(field.column))
            .collect(),
    })
}

/// Test-only copy of the production table layout.
#[cfg(test)]
pub async fn create_schema(pool: &sqlx::SqlitePool, with_education: bool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE election_results (
            Year INTEGER,
            State_Name TEXT,
            Constituency_Name TEXT,
            Candidate TEXT,
            Party TEXT,
            Sex TEXT,
            Position INTEGER,
            Votes INTEGER,
            Valid_Votes INTEGER,
            Margin INTEGER,
            Margin_Percentage REAL,
            Vote_Share_Percentage REAL,
            Turnout_Percentage REAL,
            Party_Type_TCPD TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    if with_education {
        sqlx::query("ALTER TABLE election_results ADD COLUMN Education TEXT")
            .execute(pool)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::fixtures::{sample_rows, seeded};
    use crate::database::ElectionDatabase;
    use crate::model::election::LevelOutcome;

    #[tokio::test]
    async fn test_probe_without_optional_columns() {
        let db = seeded(&sample_rows(), false).await;
        let registry = db.probe_columns().await.unwrap();
        assert!(registry.education().is_none());
        assert!(registry.names().is_empty());
    }

    #[tokio::test]
    async fn test_probe_finds_education() {
        let db = seeded(&sample_rows(), true).await;
        let registry = db.probe_columns().await.unwrap();
        assert_eq!(registry.education().unwrap().column, "Education");
        assert_eq!(registry.names(), vec!["education"]);
    }

    #[tokio::test]
    async fn test_probe_rejects_missing_table() {
        let db = ElectionDatabase::create_in_memory().await.unwrap();
        let err = db.probe_columns().await.unwrap_err();
        assert!(matches!(err, DatabaseError::Integrity(_)));
    }

    #[tokio::test]
    async fn test_probe_rejects_missing_column() {
        let db = ElectionDatabase::create_in_memory().await.unwrap();
        sqlx::query("CREATE TABLE election_results (Year INTEGER, Party TEXT)")
            .execute(db.pool())
            .await
            .unwrap();
        let err = db.probe_columns().await.unwrap_err();
        assert!(err.to_string().contains("State_Name"));
    }

    #[tokio::test]
    async fn test_education_outcomes() {
        let db = seeded(&sample_rows(), true).await;
        sqlx::query("UPDATE election_results SET Education = 'Graduate' WHERE Position = 1")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("UPDATE election_results SET Education = '12th Pass' WHERE Position = 2")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("UPDATE election_results SET Vote_Share_Percentage = 55.0 WHERE Position = 1")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query(
            "UPDATE election_results SET Vote_Share_Percentage = 30.0 \
             WHERE Position = 2 AND Year = 2019",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let mut reader = db.reader().await.unwrap();
        let outcomes = reader.field_outcomes(&EDUCATION).await.unwrap();
        assert_eq!(
            outcomes,
            vec![
                LevelOutcome {
                    level: "12th Pass".to_string(),
                    total: 4,
                    winners: 0,
                    // Null shares in 2014 are left out of the mean.
                    avg_vote_share: Some(30.0),
                },
                LevelOutcome {
                    level: "Graduate".to_string(),
                    total: 4,
                    winners: 4,
                    avg_vote_share: Some(55.0),
                },
            ]
        );
    }
}
