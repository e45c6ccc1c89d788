use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use tracing::{info, warn};

use crate::error::BenchError;
use crate::model::SynthesisRanking;
use crate::util::{ensure_directory, utc_compact_string};

const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";
const OLE2_MAGIC: &[u8; 8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MIGRATED_SUMMARY_COLUMNS: [&str; 4] = [
    "vs_baseline TEXT",
    "regressions INTEGER",
    "improvements INTEGER",
    "run_spec_sha256 TEXT",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    Missing,
    Empty,
    Sqlite,
    Foreign(&'static str),
}

pub fn inspect_store_format(path: &Path) -> Result<StoreFormat> {
    if !path.exists() {
        return Ok(StoreFormat::Missing);
    }

    let mut header = Vec::with_capacity(SQLITE_MAGIC.len());
    File::open(path)
        .with_context(|| format!("failed to open ledger {}", path.display()))?
        .take(SQLITE_MAGIC.len() as u64)
        .read_to_end(&mut header)
        .with_context(|| format!("failed to read ledger header {}", path.display()))?;

    Ok(classify_header(&header))
}

fn classify_header(header: &[u8]) -> StoreFormat {
    if header.is_empty() {
        StoreFormat::Empty
    } else if header == SQLITE_MAGIC.as_slice() {
        StoreFormat::Sqlite
    } else if header.starts_with(OLE2_MAGIC) {
        StoreFormat::Foreign("ole2 legacy spreadsheet")
    } else if header.starts_with(ZIP_MAGIC) {
        StoreFormat::Foreign("zip container")
    } else {
        StoreFormat::Foreign("unknown")
    }
}

pub fn backup_foreign_store(path: &Path) -> Result<PathBuf> {
    let mut backup = path.as_os_str().to_owned();
    backup.push(".bak");
    let mut backup = PathBuf::from(backup);
    if backup.exists() {
        let mut stamped = path.as_os_str().to_owned();
        stamped.push(format!(".{}.bak", utc_compact_string(Utc::now())));
        backup = PathBuf::from(stamped);
    }

    fs::rename(path, &backup).with_context(|| {
        format!(
            "failed to move {} aside to {}",
            path.display(),
            backup.display()
        )
    })?;
    Ok(backup)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub run_id: String,
    pub timestamp: String,
    pub pipeline_version: String,
    pub acrue_version: String,
    pub styles: String,
    pub image_count: u32,
    pub winner: String,
    pub feasibility_top: Option<String>,
    pub preference_top: Option<String>,
    pub artifacts_path: String,
    pub vs_baseline: Option<String>,
    pub regressions: Option<usize>,
    pub improvements: Option<usize>,
    pub run_spec_sha256: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunDetail {
    pub run_id: String,
    pub winner: String,
    pub feasibility_weight: f64,
    pub preference_weight: f64,
    pub written_at: String,
    pub rankings: Vec<SynthesisRanking>,
}

pub struct LedgerStore {
    connection: Connection,
    path: PathBuf,
    recovered_from: Option<PathBuf>,
}

impl LedgerStore {
    pub fn open_or_create(path: &Path) -> Result<Self> {
        let mut recovered_from = None;
        match inspect_store_format(path)? {
            StoreFormat::Foreign(detected) => {
                let error = BenchError::StoreFormat {
                    path: path.to_path_buf(),
                    detected: detected.to_string(),
                };
                let backup = backup_foreign_store(path)?;
                warn!(
                    error = %error,
                    backup = %backup.display(),
                    "ledger moved aside; creating a fresh store"
                );
                recovered_from = Some(backup);
            }
            StoreFormat::Missing => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    ensure_directory(parent)?;
                }
                info!(path = %path.display(), "creating ledger");
            }
            StoreFormat::Empty | StoreFormat::Sqlite => {}
        }

        let connection = Connection::open(path)
            .with_context(|| format!("failed to open ledger {}", path.display()))?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .context("failed to set ledger busy timeout")?;
        configure_connection(&connection)?;
        ensure_schema(&connection)
            .with_context(|| format!("failed to prepare ledger schema in {}", path.display()))?;

        Ok(Self {
            connection,
            path: path.to_path_buf(),
            recovered_from,
        })
    }

    pub fn recovered_from(&self) -> Option<&Path> {
        self.recovered_from.as_deref()
    }

    /// Appends the summary row and replaces the detail record for the run in
    /// one transaction; nothing is written unless both succeed.
    pub fn record_run(&mut self, row: &SummaryRow, detail: &RunDetail) -> Result<()> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        insert_summary_row(&tx, row)?;
        replace_detail(&tx, detail)?;
        tx.commit()
            .with_context(|| format!("failed to commit ledger write for {}", row.run_id))?;
        Ok(())
    }

    pub fn summary_row_count(&self, run_id: &str) -> Result<usize> {
        let count: i64 = self.connection.query_row(
            "SELECT COUNT(*) FROM run_summary WHERE run_id = ?1",
            [run_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn load_detail(&self, run_id: &str) -> Result<Option<RunDetail>> {
        let header = self
            .connection
            .query_row(
                "
                SELECT winner, feasibility_weight, preference_weight, written_at
                FROM run_detail
                WHERE run_id = ?1
                ",
                [run_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;
        let Some((winner, feasibility_weight, preference_weight, written_at)) = header else {
            return Ok(None);
        };

        let mut statement = self.connection.prepare(
            "
            SELECT rank, style, feasibility_rank, preference_rank, final_score
            FROM run_detail_rankings
            WHERE run_id = ?1
            ORDER BY rank ASC
            ",
        )?;
        let rankings = statement
            .query_map([run_id], |row| {
                Ok(SynthesisRanking {
                    rank: row.get(0)?,
                    style: row.get(1)?,
                    feasibility_rank: row.get(2)?,
                    preference_rank: row.get(3)?,
                    final_score: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<SynthesisRanking>>>()?;

        Ok(Some(RunDetail {
            run_id: run_id.to_string(),
            winner,
            feasibility_weight,
            preference_weight,
            written_at,
            rankings,
        }))
    }

    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.connection
            .close()
            .map_err(|(_, err)| err)
            .with_context(|| format!("failed to close ledger {}", path.display()))
    }
}

fn insert_summary_row(tx: &Transaction<'_>, row: &SummaryRow) -> Result<()> {
    tx.execute(
        "
        INSERT INTO run_summary(
          run_id, timestamp, pipeline_version, acrue_version, styles, image_count,
          winner, feasibility_top, preference_top, artifacts_path,
          vs_baseline, regressions, improvements, run_spec_sha256
        )
        VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        ",
        params![
            row.run_id,
            row.timestamp,
            row.pipeline_version,
            row.acrue_version,
            row.styles,
            row.image_count,
            row.winner,
            row.feasibility_top,
            row.preference_top,
            row.artifacts_path,
            row.vs_baseline,
            row.regressions.map(|count| count as i64),
            row.improvements.map(|count| count as i64),
            row.run_spec_sha256,
        ],
    )
    .with_context(|| format!("failed to append summary row for {}", row.run_id))?;
    Ok(())
}

fn replace_detail(tx: &Transaction<'_>, detail: &RunDetail) -> Result<()> {
    tx.execute(
        "DELETE FROM run_detail_rankings WHERE run_id = ?1",
        [&detail.run_id],
    )?;
    tx.execute("DELETE FROM run_detail WHERE run_id = ?1", [&detail.run_id])?;
    tx.execute(
        "
        INSERT INTO run_detail(run_id, winner, feasibility_weight, preference_weight, written_at)
        VALUES(?1, ?2, ?3, ?4, ?5)
        ",
        params![
            detail.run_id,
            detail.winner,
            detail.feasibility_weight,
            detail.preference_weight,
            detail.written_at
        ],
    )
    .with_context(|| format!("failed to write detail record for {}", detail.run_id))?;

    let mut statement = tx.prepare(
        "
        INSERT INTO run_detail_rankings(
          run_id, rank, style, feasibility_rank, preference_rank, final_score
        )
        VALUES(?1, ?2, ?3, ?4, ?5, ?6)
        ",
    )?;
    for ranking in &detail.rankings {
        statement
            .execute(params![
                detail.run_id,
                ranking.rank,
                ranking.style,
                ranking.feasibility_rank,
                ranking.preference_rank,
                ranking.final_score
            ])
            .with_context(|| {
                format!(
                    "failed to write rank {} for {}",
                    ranking.rank, detail.run_id
                )
            })?;
    }
    Ok(())
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS run_summary (
          run_id TEXT NOT NULL,
          timestamp TEXT NOT NULL,
          pipeline_version TEXT,
          acrue_version TEXT,
          styles TEXT,
          image_count INTEGER,
          winner TEXT,
          feasibility_top TEXT,
          preference_top TEXT,
          artifacts_path TEXT
        );

        CREATE TABLE IF NOT EXISTS run_detail (
          run_id TEXT PRIMARY KEY,
          winner TEXT NOT NULL,
          feasibility_weight REAL NOT NULL,
          preference_weight REAL NOT NULL,
          written_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS run_detail_rankings (
          run_id TEXT NOT NULL,
          rank INTEGER NOT NULL,
          style TEXT NOT NULL,
          feasibility_rank INTEGER NOT NULL,
          preference_rank INTEGER NOT NULL,
          final_score REAL NOT NULL,
          PRIMARY KEY (run_id, rank),
          FOREIGN KEY (run_id) REFERENCES run_detail(run_id) ON DELETE CASCADE
        );
        ",
    )?;

    for column_definition in MIGRATED_SUMMARY_COLUMNS {
        ensure_column_exists(connection, "run_summary", column_definition)?;
    }

    connection.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_run_summary_run_id ON run_summary(run_id);",
    )?;
    Ok(())
}

fn ensure_column_exists(
    connection: &Connection,
    table_name: &str,
    column_definition: &str,
) -> Result<()> {
    let Some(column_name) = column_definition.split_whitespace().next() else {
        bail!("invalid column definition: {column_definition}");
    };

    let pragma_sql = format!("PRAGMA table_info({table_name})");
    let mut statement = connection
        .prepare(&pragma_sql)
        .with_context(|| format!("failed to inspect schema for table {table_name}"))?;

    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let existing_name: String = row.get(1)?;
        if existing_name == column_name {
            return Ok(());
        }
    }

    let alter_sql = format!("ALTER TABLE {table_name} ADD COLUMN {column_definition}");
    connection
        .execute(&alter_sql, [])
        .with_context(|| format!("failed to add column {column_name} on {table_name}"))?;
    info!(table = table_name, column = column_name, "migrated ledger column");

    Ok(())
}
