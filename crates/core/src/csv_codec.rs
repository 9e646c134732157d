//! CSV export and validating import of annotation records.
//!
//! The file format is fixed:
//!
//! ```text
//! img_path,validity,gender,category
//! <source_label>/<image_id>,Valid,M,Top
//! ```
//!
//! Import also reads an optional `notes` column and ignores any other
//! extra columns.

use csv::{ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use serde::Serialize;

use crate::annotation::AnnotationDraft;
use crate::error::CoreError;
use crate::image_set::{normalize_image_id, ImageSet};
use crate::store::AnnotationStore;

pub const COL_IMG_PATH: &str = "img_path";
pub const COL_VALIDITY: &str = "validity";
pub const COL_GENDER: &str = "gender";
pub const COL_CATEGORY: &str = "category";
pub const COL_NOTES: &str = "notes";

/// Columns every import must carry, in export order.
pub const REQUIRED_COLUMNS: &[&str] = &[COL_IMG_PATH, COL_VALIDITY, COL_GENDER, COL_CATEGORY];

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Serialize every record in store order.
///
/// Returns `None` when the store is empty so callers can signal "nothing to
/// export" instead of producing a header-only file.
pub fn export(store: &AnnotationStore) -> Result<Option<Vec<u8>>, CoreError> {
    if store.is_empty() {
        return Ok(None);
    }

    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(REQUIRED_COLUMNS).map_err(csv_internal)?;
    for ann in store.iter() {
        wtr.write_record([
            ann.export_path(),
            ann.validity.as_str(),
            ann.gender.as_str(),
            ann.category.as_str(),
        ])
        .map_err(csv_internal)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| CoreError::Internal(format!("CSV flush failed: {e}")))?;
    tracing::debug!(records = store.len(), bytes = bytes.len(), "Exported annotations to CSV");
    Ok(Some(bytes))
}

fn csv_internal(e: csv::Error) -> CoreError {
    CoreError::Internal(format!("CSV write failed: {e}"))
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// What happened to one data row of an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    Imported,
    /// The row's image is not part of the loaded image set.
    UnknownImage,
    /// The row failed annotation validation.
    Invalid { reason: String },
    /// The row could not be parsed as CSV.
    Malformed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    /// 1-based data row number, not counting the header.
    pub row: usize,
    /// Image id derived from `img_path`, empty for malformed rows.
    pub image_id: String,
    #[serde(flatten)]
    pub status: RowStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub rows: Vec<RowOutcome>,
}

impl ImportReport {
    pub fn skipped(&self) -> usize {
        self.rows.len() - self.imported
    }
}

/// Column positions resolved from the header row.
struct Columns {
    img_path: usize,
    validity: usize,
    gender: usize,
    category: usize,
    notes: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, CoreError> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| find(c).is_none())
            .map(|c| c.to_string())
            .collect();

        match (
            find(COL_IMG_PATH),
            find(COL_VALIDITY),
            find(COL_GENDER),
            find(COL_CATEGORY),
        ) {
            (Some(img_path), Some(validity), Some(gender), Some(category)) => Ok(Self {
                img_path,
                validity,
                gender,
                category,
                notes: find(COL_NOTES),
            }),
            _ => Err(CoreError::SchemaMismatch { missing }),
        }
    }
}

/// The image id of an `img_path` value: everything after the last `/`.
pub fn image_id_from_path(img_path: &str) -> &str {
    img_path.rsplit('/').next().unwrap_or(img_path)
}

/// Import rows from `bytes` into `store`.
///
/// The header is checked before any row is applied; a missing required
/// column aborts the whole import with [`CoreError::SchemaMismatch`]. Rows
/// whose image is not in `images` and rows that fail validation are
/// skipped and reported. Valid rows are upserted exactly like a manual
/// save, under `source_label`.
pub fn import(
    bytes: &[u8],
    images: &ImageSet,
    source_label: &str,
    store: &mut AnnotationStore,
) -> Result<ImportReport, CoreError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = match rdr.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable CSV header row");
            StringRecord::new()
        }
    };
    let columns = Columns::resolve(&headers)?;

    let mut report = ImportReport::default();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                report.rows.push(RowOutcome {
                    row,
                    image_id: String::new(),
                    status: RowStatus::Malformed {
                        reason: e.to_string(),
                    },
                });
                continue;
            }
        };

        let img_path = record.get(columns.img_path).unwrap_or_default();
        let image_id = normalize_image_id(image_id_from_path(img_path));

        if !images.contains(&image_id) {
            report.rows.push(RowOutcome {
                row,
                image_id,
                status: RowStatus::UnknownImage,
            });
            continue;
        }

        let field = |idx: usize| record.get(idx).map(str::to_string);
        let draft = AnnotationDraft {
            image_id: image_id.clone(),
            validity: field(columns.validity),
            gender: field(columns.gender),
            category: field(columns.category),
            source_label: source_label.to_string(),
            notes: columns.notes.and_then(field).unwrap_or_default(),
        };

        let status = match store.save(&draft) {
            Ok(_) => {
                report.imported += 1;
                RowStatus::Imported
            }
            Err(e) => RowStatus::Invalid {
                reason: e.to_string(),
            },
        };
        report.rows.push(RowOutcome {
            row,
            image_id,
            status,
        });
    }

    tracing::info!(
        imported = report.imported,
        skipped = report.skipped(),
        source_label,
        "CSV import finished"
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
