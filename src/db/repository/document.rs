use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::models::{Document, DocumentPath, DocumentUpdate};

/// Create a document or replace its source fields (transcript, exam type).
/// Analysis and report columns of an existing row are preserved.
pub fn upsert_document_source(
    conn: &Connection,
    path: &DocumentPath,
    transcript: Option<&str>,
    exam_type: Option<&str>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO documents (path, transcript, exam_type)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(path) DO UPDATE SET
            transcript = excluded.transcript,
            exam_type = excluded.exam_type,
            updated_at = datetime('now')",
        params![path.as_str(), transcript, exam_type],
    )?;
    Ok(())
}

pub fn get_document(conn: &Connection, path: &DocumentPath) -> Result<Option<Document>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT transcript, exam_type, analysis, analysis_meta, report, report_meta,
         analyzed_at, reported_at
         FROM documents WHERE path = ?1",
    )?;

    let result = stmt.query_row(params![path.as_str()], |row| {
        Ok(DocumentRow {
            transcript: row.get::<_, Option<String>>(0)?,
            exam_type: row.get::<_, Option<String>>(1)?,
            analysis: row.get::<_, Option<String>>(2)?,
            analysis_meta: row.get::<_, Option<String>>(3)?,
            report: row.get::<_, Option<String>>(4)?,
            report_meta: row.get::<_, Option<String>>(5)?,
            analyzed_at: row.get::<_, Option<String>>(6)?,
            reported_at: row.get::<_, Option<String>>(7)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(document_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Merge a partial update into an existing document in a single statement.
/// Columns whose update field is `None` keep their stored value.
pub fn merge_document(
    conn: &Connection,
    path: &DocumentPath,
    update: &DocumentUpdate,
) -> Result<(), DatabaseError> {
    let analysis = to_json_column("analysis", update.analysis.as_ref())?;
    let analysis_meta = to_json_column("analysis_meta", update.analysis_meta.as_ref())?;
    let report_meta = to_json_column("report_meta", update.report_meta.as_ref())?;

    let rows = conn.execute(
        "UPDATE documents SET
            analysis = COALESCE(?2, analysis),
            analysis_meta = COALESCE(?3, analysis_meta),
            report = COALESCE(?4, report),
            report_meta = COALESCE(?5, report_meta),
            analyzed_at = COALESCE(?6, analyzed_at),
            reported_at = COALESCE(?7, reported_at),
            updated_at = datetime('now')
         WHERE path = ?1",
        params![
            path.as_str(),
            analysis,
            analysis_meta,
            update.report,
            report_meta,
            update.analyzed_at.map(|t| t.to_rfc3339()),
            update.reported_at.map(|t| t.to_rfc3339()),
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Document".into(),
            id: path.to_string(),
        });
    }
    Ok(())
}

// ═══════════════════════════════════════════
// Row mapping
// ═══════════════════════════════════════════

struct DocumentRow {
    transcript: Option<String>,
    exam_type: Option<String>,
    analysis: Option<String>,
    analysis_meta: Option<String>,
    report: Option<String>,
    report_meta: Option<String>,
    analyzed_at: Option<String>,
    reported_at: Option<String>,
}

fn document_from_row(row: DocumentRow) -> Result<Document, DatabaseError> {
    Ok(Document {
        transcript: row.transcript,
        exam_type: row.exam_type,
        analysis: from_json_column("analysis", row.analysis)?,
        analysis_meta: from_json_column("analysis_meta", row.analysis_meta)?,
        report: row.report,
        report_meta: from_json_column("report_meta", row.report_meta)?,
        analyzed_at: parse_timestamp("analyzed_at", row.analyzed_at)?,
        reported_at: parse_timestamp("reported_at", row.reported_at)?,
    })
}

fn to_json_column<T: Serialize>(
    column: &'static str,
    value: Option<&T>,
) -> Result<Option<String>, DatabaseError> {
    value
        .map(|v| {
            serde_json::to_string(v).map_err(|e| DatabaseError::CorruptColumn {
                column,
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn from_json_column<T: DeserializeOwned>(
    column: &'static str,
    raw: Option<String>,
) -> Result<Option<T>, DatabaseError> {
    raw.map(|text| {
        serde_json::from_str(&text).map_err(|e| DatabaseError::CorruptColumn {
            column,
            reason: e.to_string(),
        })
    })
    .transpose()
}

fn parse_timestamp(
    column: &'static str,
    raw: Option<String>,
) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    raw.map(|text| {
        DateTime::parse_from_rfc3339(&text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| DatabaseError::CorruptColumn {
                column,
                reason: e.to_string(),
            })
    })
    .transpose()
}
