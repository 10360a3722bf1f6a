use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portrait_core::{Analysis, ReportStore, StoredReport};
use serde::de::DeserializeOwned;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::path::Path;

/// Report history backed by a single SQLite file.
///
/// Each sub-result of an [`Analysis`] lives in its own JSON column so the
/// history commands can read one part without touching the others.
#[derive(Clone)]
pub struct SqliteReports {
    pool: Pool<Sqlite>,
}

impl SqliteReports {
    /// Open (or create) the database and run migrations. `":memory:"` gives a
    /// private in-memory database.
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let in_memory = path.as_os_str() == ":memory:";
        let db_url = if in_memory {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", path.display())
        };

        // every pooled connection to :memory: would see its own empty database
        let max_connections = if in_memory { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::info!("Report store ready at {}", path.display());
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                image_path TEXT NOT NULL,
                face_json TEXT NOT NULL,
                emotion_json TEXT NOT NULL,
                stress_json TEXT NOT NULL,
                personality_json TEXT NOT NULL,
                professional_json TEXT NOT NULL,
                full_report TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create reports table")?;

        // Added after the first schema; older files keep their rows with a neutral default.
        let alter = "ALTER TABLE reports ADD COLUMN confidence INTEGER NOT NULL DEFAULT 0";
        if let Err(e) = sqlx::query(alter).execute(&self.pool).await {
            tracing::debug!("Column 'confidence' likely exists or migration skipped: {}", e);
        }

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_reports_user ON reports(user_id, created_at)")
            .execute(&self.pool)
            .await
            .context("Failed to create reports user index")?;

        Ok(())
    }

    pub async fn save_report(
        &self,
        user_id: i64,
        image_path: &str,
        analysis: &Analysis,
        report: &str,
    ) -> Result<i64> {
        self.save_report_at(user_id, image_path, analysis, report, Utc::now()).await
    }

    /// Same as [`save_report`](Self::save_report) with an explicit timestamp.
    pub async fn save_report_at(
        &self,
        user_id: i64,
        image_path: &str,
        analysis: &Analysis,
        report: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        let face_json =
            serde_json::to_string(&analysis.face).context("Failed to serialize face summary")?;
        let emotion_json = serde_json::to_string(&analysis.emotion)
            .context("Failed to serialize emotion profile")?;
        let stress_json = serde_json::to_string(&analysis.stress)
            .context("Failed to serialize stress estimate")?;
        let personality_json = serde_json::to_string(&analysis.personality)
            .context("Failed to serialize personality profile")?;
        let professional_json = serde_json::to_string(&analysis.recommendations)
            .context("Failed to serialize recommendations")?;

        let result = sqlx::query(
            r#"
            INSERT INTO reports (
                user_id, image_path, face_json, emotion_json, stress_json,
                personality_json, professional_json, full_report, created_at, confidence
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(image_path)
        .bind(face_json)
        .bind(emotion_json)
        .bind(stress_json)
        .bind(personality_json)
        .bind(professional_json)
        .bind(report)
        .bind(created_at.timestamp_millis())
        .bind(analysis.confidence as i64)
        .execute(&self.pool)
        .await
        .context("Failed to insert report")?;

        let id = result.last_insert_rowid();
        tracing::debug!("Stored report {} for user {}", id, user_id);
        Ok(id)
    }

    /// All reports of a user, newest first. Reports saved within the same
    /// millisecond are ordered by insertion, newest first.
    pub async fn user_reports(&self, user_id: i64) -> Result<Vec<StoredReport>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, image_path, face_json, emotion_json, stress_json,
                   personality_json, professional_json, full_report, created_at, confidence
            FROM reports
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch user reports")?;

        rows.iter().map(row_to_report).collect()
    }

    /// The two most recent reports `(latest, previous)`, if the user has at least two.
    pub async fn latest_pair(&self, user_id: i64) -> Result<Option<(StoredReport, StoredReport)>> {
        let mut reports = self.user_reports(user_id).await?.into_iter();
        Ok(match (reports.next(), reports.next()) {
            (Some(latest), Some(previous)) => Some((latest, previous)),
            _ => None,
        })
    }

    pub async fn report_count(&self, user_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM reports WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count reports")?;
        Ok(row.get(0))
    }
}

fn column<T: DeserializeOwned>(row: &sqlx::sqlite::SqliteRow, name: &str) -> Result<T> {
    let json: String = row.get(name);
    serde_json::from_str(&json).with_context(|| format!("Corrupt JSON in column '{}'", name))
}

fn row_to_report(row: &sqlx::sqlite::SqliteRow) -> Result<StoredReport> {
    let millis: i64 = row.get("created_at");
    let created_at = DateTime::<Utc>::from_timestamp_millis(millis)
        .with_context(|| format!("Invalid timestamp {} in reports table", millis))?;
    let confidence: i64 = row.get("confidence");

    Ok(StoredReport {
        id: row.get("id"),
        user_id: row.get("user_id"),
        image_path: row.get("image_path"),
        analysis: Analysis {
            face: column(row, "face_json")?,
            emotion: column(row, "emotion_json")?,
            stress: column(row, "stress_json")?,
            personality: column(row, "personality_json")?,
            recommendations: column(row, "professional_json")?,
            confidence: confidence.clamp(0, 100) as u8,
        },
        full_report: row.get("full_report"),
        created_at,
    })
}

#[async_trait]
impl ReportStore for SqliteReports {
    async fn save_report(
        &self,
        user_id: i64,
        image_path: &str,
        analysis: &Analysis,
        report: &str,
    ) -> Result<i64> {
        SqliteReports::save_report(self, user_id, image_path, analysis, report).await
    }

    async fn user_reports(&self, user_id: i64) -> Result<Vec<StoredReport>> {
        SqliteReports::user_reports(self, user_id).await
    }
}
