//! One user's labelling context.
//!
//! A [`Session`] bundles the image set, the annotation store, the cursor
//! and the source label. All reads and writes go through it, and every
//! mutating call returns a [`ChangeEvent`] carrying the new revision so a
//! presentation layer knows to re-read.

use serde::{Deserialize, Serialize};

use crate::annotation::{
    Annotation, AnnotationDraft, AnnotationFields, Category, Gender, Validity,
};
use crate::bulk::{self, BulkTemplate};
use crate::csv_codec::{self, ImportReport};
use crate::cursor::Cursor;
use crate::error::CoreError;
use crate::image_set::{normalize_image_id, ImageSet};
use crate::source::ImageSource;
use crate::stats::{self, Progress, StatsReport};
use crate::store::AnnotationStore;
use crate::types::{SessionId, Timestamp};

// ---------------------------------------------------------------------------
// Change events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeKind {
    Loaded { images: usize },
    Reset,
    AnnotationsCleared { removed: usize },
    AnnotationSaved { image_id: String, cursor: Option<usize> },
    AnnotationDeleted { image_id: String, existed: bool },
    CursorMoved { position: usize },
    BulkApplied { applied: usize },
    Imported { imported: usize, skipped: usize },
}

impl ChangeKind {
    /// Stable dotted name, used as the event type on the bus.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loaded { .. } => "session.loaded",
            Self::Reset => "session.reset",
            Self::AnnotationsCleared { .. } => "annotations.cleared",
            Self::AnnotationSaved { .. } => "annotation.saved",
            Self::AnnotationDeleted { .. } => "annotation.deleted",
            Self::CursorMoved { .. } => "cursor.moved",
            Self::BulkApplied { .. } => "bulk.applied",
            Self::Imported { .. } => "csv.imported",
        }
    }
}

/// Returned by every mutating session call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub revision: u64,
    pub kind: ChangeKind,
}

// ---------------------------------------------------------------------------
// Quick actions
// ---------------------------------------------------------------------------

/// One-click labels for the current image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    ValidFemaleTop,
    ValidFemaleBottom,
    Invalid,
}

impl QuickAction {
    pub fn fields(self) -> AnnotationFields {
        let (validity, category) = match self {
            Self::ValidFemaleTop => (Validity::Valid, Category::Top),
            Self::ValidFemaleBottom => (Validity::Valid, Category::Bottom),
            Self::Invalid => (Validity::Invalid, Category::Top),
        };
        AnnotationFields {
            validity,
            gender: Gender::Female,
            category,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub source_label: String,
    pub revision: u64,
    pub image_count: usize,
    pub cursor: Option<usize>,
    pub current_image: Option<String>,
    pub current_annotation: Option<Annotation>,
    pub progress: Progress,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    source_label: String,
    images: ImageSet,
    store: AnnotationStore,
    cursor: Cursor,
    revision: u64,
    created_at: Timestamp,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(uuid::Uuid::new_v4())
    }
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            source_label: String::new(),
            images: ImageSet::new(),
            store: AnnotationStore::new(),
            cursor: Cursor::new(0),
            revision: 0,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn emit(&mut self, kind: ChangeKind) -> ChangeEvent {
        self.revision += 1;
        ChangeEvent {
            revision: self.revision,
            kind,
        }
    }

    // -- loading ----------------------------------------------------------

    /// Replace the image set, drop every record and move to the first image.
    pub fn load<I, S>(&mut self, image_ids: I, source_label: &str) -> ChangeEvent
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = ImageSet::from_ids(image_ids);
        self.store.clear_all();
        self.cursor.reset(self.images.len());
        self.source_label = source_label.trim().to_string();

        tracing::info!(
            session_id = %self.id,
            images = self.images.len(),
            source_label = %self.source_label,
            "Image set loaded"
        );
        self.emit(ChangeKind::Loaded {
            images: self.images.len(),
        })
    }

    /// Load from a provider. A failing provider yields an empty image set.
    pub fn load_from_source(&mut self, source: &dyn ImageSource, source_label: &str) -> ChangeEvent {
        let ids = match source.list() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(
                    session_id = %self.id,
                    source = %source.describe(),
                    error = %e,
                    "Image source failed, loading empty set"
                );
                Vec::new()
            }
        };
        self.load(ids, source_label)
    }

    /// Forget everything: images, records, cursor and label.
    pub fn reset(&mut self) -> ChangeEvent {
        self.images = ImageSet::new();
        self.store.clear_all();
        self.cursor.reset(0);
        self.source_label.clear();
        tracing::info!(session_id = %self.id, "Session reset");
        self.emit(ChangeKind::Reset)
    }

    /// Drop every record, keeping the image set and cursor.
    pub fn clear_annotations(&mut self) -> ChangeEvent {
        let removed = self.store.len();
        self.store.clear_all();
        tracing::info!(session_id = %self.id, removed, "Annotations cleared");
        self.emit(ChangeKind::AnnotationsCleared { removed })
    }

    // -- records ----------------------------------------------------------

    /// Save a record for an image in the set, under the session's label.
    pub fn save(&mut self, mut draft: AnnotationDraft) -> Result<ChangeEvent, CoreError> {
        draft.image_id = normalize_image_id(&draft.image_id);
        self.ensure_known(&draft.image_id)?;
        draft.source_label = self.source_label.clone();
        self.store.save(&draft)?;

        tracing::debug!(session_id = %self.id, image_id = %draft.image_id, "Annotation saved");
        Ok(self.emit(ChangeKind::AnnotationSaved {
            image_id: draft.image_id,
            cursor: self.cursor.position(),
        }))
    }

    /// Save a record for the current image, then advance unless it is the
    /// last one. The draft's `image_id` is ignored.
    pub fn save_current_and_advance(
        &mut self,
        mut draft: AnnotationDraft,
    ) -> Result<ChangeEvent, CoreError> {
        let current = self
            .current_image()
            .ok_or(CoreError::OutOfRange { index: 0, len: 0 })?
            .to_string();
        draft.image_id = current.clone();
        draft.source_label = self.source_label.clone();
        self.store.save(&draft)?;
        let cursor = self.cursor.next();

        tracing::debug!(session_id = %self.id, image_id = %current, ?cursor, "Annotation saved, advanced");
        Ok(self.emit(ChangeKind::AnnotationSaved {
            image_id: current,
            cursor,
        }))
    }

    /// Apply a one-click label to the current image and advance.
    pub fn quick_action(&mut self, action: QuickAction) -> Result<ChangeEvent, CoreError> {
        self.save_current_and_advance(AnnotationDraft::from_fields(
            String::new(),
            action.fields(),
            String::new(),
        ))
    }

    /// Remove the record for `image_id`. Absent records are not an error.
    pub fn delete(&mut self, image_id: &str) -> ChangeEvent {
        let image_id = normalize_image_id(image_id);
        let existed = self.store.delete(&image_id);
        tracing::debug!(session_id = %self.id, %image_id, existed, "Annotation deleted");
        self.emit(ChangeKind::AnnotationDeleted { image_id, existed })
    }

    pub fn get(&self, image_id: &str) -> Option<&Annotation> {
        self.store.get(&normalize_image_id(image_id))
    }

    pub fn list_unannotated(&self) -> Vec<&str> {
        self.store.list_unannotated(&self.images)
    }

    fn ensure_known(&self, image_id: &str) -> Result<(), CoreError> {
        if image_id.is_empty() {
            return Err(CoreError::MissingField(crate::annotation::Field::ImageId));
        }
        if !self.images.contains(image_id) {
            return Err(CoreError::NotFound {
                entity: "Image",
                id: image_id.to_string(),
            });
        }
        Ok(())
    }

    // -- navigation -------------------------------------------------------

    pub fn current_image(&self) -> Option<&str> {
        self.cursor.position().and_then(|i| self.images.get(i))
    }

    pub fn current_annotation(&self) -> Option<&Annotation> {
        self.current_image().and_then(|id| self.store.get(id))
    }

    /// Move by `delta`, clamped. `None` while the image set is empty.
    pub fn move_cursor(&mut self, delta: isize) -> Option<ChangeEvent> {
        let position = self.cursor.move_by(delta)?;
        Some(self.emit(ChangeKind::CursorMoved { position }))
    }

    pub fn jump(&mut self, index: usize) -> Result<ChangeEvent, CoreError> {
        let position = self.cursor.jump(index)?;
        Ok(self.emit(ChangeKind::CursorMoved { position }))
    }

    /// Jump to the next image without a record, wrapping once. `None` when
    /// every other image is already annotated.
    pub fn jump_to_next_unannotated(&mut self) -> Option<ChangeEvent> {
        let position = self
            .cursor
            .jump_to_next_unannotated(&self.store, &self.images)?;
        Some(self.emit(ChangeKind::CursorMoved { position }))
    }

    // -- bulk / csv -------------------------------------------------------

    /// Stamp `template` onto every unannotated image.
    ///
    /// The template must be complete; nothing is written otherwise.
    pub fn apply_bulk(&mut self, template: &BulkTemplate) -> Result<ChangeEvent, CoreError> {
        let fields = template.resolve()?;
        let applied =
            bulk::apply_to_unannotated(&mut self.store, &self.images, fields, &self.source_label);
        Ok(self.emit(ChangeKind::BulkApplied { applied }))
    }

    pub fn import_csv(&mut self, bytes: &[u8]) -> Result<(ImportReport, ChangeEvent), CoreError> {
        let report = csv_codec::import(bytes, &self.images, &self.source_label, &mut self.store)?;
        let event = self.emit(ChangeKind::Imported {
            imported: report.imported,
            skipped: report.skipped(),
        });
        Ok((report, event))
    }

    pub fn export_csv(&self) -> Result<Option<Vec<u8>>, CoreError> {
        csv_codec::export(&self.store)
    }

    // -- views ------------------------------------------------------------

    pub fn stats(&self) -> StatsReport {
        stats::report(&self.store, &self.images)
    }

    pub fn progress(&self) -> Progress {
        stats::progress(&self.store, &self.images)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            source_label: self.source_label.clone(),
            revision: self.revision,
            image_count: self.images.len(),
            cursor: self.cursor.position(),
            current_image: self.current_image().map(str::to_string),
            current_annotation: self.current_annotation().cloned(),
            progress: self.progress(),
            created_at: self.created_at,
        }
    }
}
