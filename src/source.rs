//! Read-only access to the architecture database and page planning.

use crate::domain::RawRecord;
use crate::error::{ExportError, ExportResult};
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};

const COUNT_SQL: &str = "SELECT COUNT(*) FROM ZCDARCHITECTURE";

const PAGE_SQL: &str = "
    SELECT
        Z_PK,
        ZAR_TITLE,
        ZAR_ARCHITECT,
        ZAR_YEAR,
        ZAR_ADDRESS,
        ZAR_LATITUDE,
        ZAR_LONGITUDE,
        ZAR_CATEGORY,
        ZAR_BIGCATEGORY,
        ZAR_DESCRIPTION,
        ZAR_IMAGE_URL,
        ZAR_TAG,
        ZAR_PREFECTURE,
        ZAR_CONTRACTOR,
        ZAR_STRUCTURAL_DESIGNER,
        ZAR_LANDSCAPE_DESIGNER,
        ZAR_SHINKENCHIKU_URL
    FROM ZCDARCHITECTURE
    ORDER BY Z_PK
    LIMIT ?1 OFFSET ?2
";

/// An open, read-only connection to the source database.
///
/// The connection is released when this value is dropped, whichever step of
/// the export fails.
#[derive(Debug)]
pub struct ArchitectureSource {
    conn: Connection,
    path: PathBuf,
}

impl ArchitectureSource {
    /// Open `path` read-only. A missing file is an error, never created.
    pub fn open(path: &Path) -> ExportResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|source| ExportError::Connection { path: path.to_path_buf(), source })?;
        tracing::debug!(path = %path.display(), "opened source database");
        Ok(Self { conn, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn count(&self) -> ExportResult<usize> {
        let total: i64 = self
            .conn
            .query_row(COUNT_SQL, [], |row| row.get(0))
            .map_err(|e| ExportError::query("counting records", e))?;
        Ok(total.max(0) as usize)
    }

    /// Fetch one bounded slice of rows in ascending primary-key order.
    pub fn fetch(&self, limit: usize, offset: usize) -> ExportResult<Vec<RawRecord>> {
        let context = || format!("reading rows at offset {offset}");
        let mut stmt =
            self.conn.prepare_cached(PAGE_SQL).map_err(|e| ExportError::query(context(), e))?;
        let rows = stmt
            .query_map(params![limit as i64, offset as i64], raw_record_from_row)
            .map_err(|e| ExportError::query(context(), e))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(|e| ExportError::query(context(), e))
    }
}

fn raw_record_from_row(row: &Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok(RawRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        architect: row.get(2)?,
        year: row.get(3)?,
        address: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        category: row.get(7)?,
        big_category: row.get(8)?,
        description: row.get(9)?,
        image_url: row.get(10)?,
        tags: row.get(11)?,
        prefecture: row.get(12)?,
        contractor: row.get(13)?,
        structural_designer: row.get(14)?,
        landscape_designer: row.get(15)?,
        shinkenchiku_url: row.get(16)?,
    })
}

/// One bounded query of the paginator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    /// 1-based page number.
    pub number: usize,
    pub offset: usize,
    pub limit: usize,
}

/// Splits `total_items` records into fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    pub total_items: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl PagePlan {
    pub fn new(total_items: usize, page_size: usize) -> ExportResult<Self> {
        if page_size == 0 {
            return Err(ExportError::Config("page_size must be > 0".to_string()));
        }
        Ok(Self { total_items, page_size, total_pages: total_items.div_ceil(page_size) })
    }

    pub fn pages(&self) -> impl Iterator<Item = PageSpec> + '_ {
        (0..self.total_pages).map(move |p| PageSpec {
            number: p + 1,
            offset: p * self.page_size,
            limit: self.page_size,
        })
    }
}
