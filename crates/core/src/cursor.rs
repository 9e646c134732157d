//! Bounds-checked navigation over the image set.

use serde::Serialize;

use crate::error::CoreError;
use crate::image_set::ImageSet;
use crate::store::AnnotationStore;

/// Current position within an image set of `len` images.
///
/// Inactive while `len == 0`; otherwise `position < len` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cursor {
    position: usize,
    len: usize,
}

impl Cursor {
    /// A cursor at the start of a set of `len` images.
    pub fn new(len: usize) -> Self {
        Self { position: 0, len }
    }

    /// Back to index 0 for a freshly (re)loaded set.
    pub fn reset(&mut self, len: usize) {
        *self = Self::new(len);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_active(&self) -> bool {
        self.len > 0
    }

    /// Current index, or `None` when the set is empty.
    pub fn position(&self) -> Option<usize> {
        self.is_active().then_some(self.position)
    }

    /// Move by `delta`, clamping at both ends. No wraparound.
    pub fn move_by(&mut self, delta: isize) -> Option<usize> {
        if !self.is_active() {
            return None;
        }
        self.position = self.position.saturating_add_signed(delta).min(self.len - 1);
        Some(self.position)
    }

    pub fn next(&mut self) -> Option<usize> {
        self.move_by(1)
    }

    pub fn prev(&mut self) -> Option<usize> {
        self.move_by(-1)
    }

    pub fn first(&mut self) -> Option<usize> {
        self.position()?;
        self.position = 0;
        Some(0)
    }

    pub fn last(&mut self) -> Option<usize> {
        self.position()?;
        self.position = self.len - 1;
        Some(self.position)
    }

    /// Jump to `index`. Out-of-range indices fail and leave the cursor alone.
    pub fn jump(&mut self, index: usize) -> Result<usize, CoreError> {
        if index >= self.len {
            return Err(CoreError::OutOfRange {
                index,
                len: self.len,
            });
        }
        self.position = index;
        Ok(index)
    }

    /// Index of the next image without an annotation.
    ///
    /// Scans forward from the image after the cursor to the end, then wraps
    /// to the start and stops just before the cursor. The current image is
    /// never returned.
    pub fn next_unannotated(&self, store: &AnnotationStore, images: &ImageSet) -> Option<usize> {
        let current = self.position()?;
        let len = self.len.min(images.len());
        (current + 1..len)
            .chain(0..current.min(len))
            .find(|&i| images.get(i).is_some_and(|id| !store.contains(id)))
    }

    /// Move to [`next_unannotated`](Self::next_unannotated), if any.
    pub fn jump_to_next_unannotated(
        &mut self,
        store: &AnnotationStore,
        images: &ImageSet,
    ) -> Option<usize> {
        let index = self.next_unannotated(store, images)?;
        self.position = index;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationDraft, AnnotationFields, Category, Gender, Validity};
    use assert_matches::assert_matches;

    fn annotate(store: &mut AnnotationStore, id: &str) {
        let fields = AnnotationFields {
            validity: Validity::Valid,
            gender: Gender::Female,
            category: Category::Top,
        };
        store
            .save(&AnnotationDraft::from_fields(id, fields, "dress"))
            .unwrap();
    }

    #[test]
    fn move_by_clamps_at_both_ends() {
        let mut cursor = Cursor::new(4);
        assert_eq!(cursor.move_by(-3), Some(0));
        assert_eq!(cursor.move_by(2), Some(2));
        assert_eq!(cursor.move_by(10), Some(3));
        assert_eq!(cursor.move_by(isize::MAX), Some(3));
        assert_eq!(cursor.move_by(isize::MIN), Some(0));
    }

    #[test]
    fn arbitrary_moves_stay_in_bounds() {
        let mut cursor = Cursor::new(7);
        for delta in [3, -1, 9, -20, 2, 2, 2, 2, -1, 0, 5, -6] {
            let pos = cursor.move_by(delta).unwrap();
            assert!(pos < 7);
        }
    }

    #[test]
    fn empty_cursor_is_inactive() {
        let mut cursor = Cursor::new(0);
        assert_eq!(cursor.position(), None);
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.last(), None);
        assert_matches!(cursor.jump(0), Err(CoreError::OutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn jump_out_of_range_leaves_cursor() {
        let mut cursor = Cursor::new(3);
        cursor.jump(1).unwrap();
        assert_matches!(cursor.jump(3), Err(CoreError::OutOfRange { index: 3, len: 3 }));
        assert_eq!(cursor.position(), Some(1));
    }

    #[test]
    fn first_last_prev_next() {
        let mut cursor = Cursor::new(3);
        assert_eq!(cursor.last(), Some(2));
        assert_eq!(cursor.next(), Some(2));
        assert_eq!(cursor.prev(), Some(1));
        assert_eq!(cursor.first(), Some(0));
        assert_eq!(cursor.prev(), Some(0));
    }

    #[test]
    fn reset_returns_to_start() {
        let mut cursor = Cursor::new(5);
        cursor.jump(4).unwrap();
        cursor.reset(2);
        assert_eq!(cursor.position(), Some(0));
        assert_eq!(cursor.len(), 2);
    }

    #[test]
    fn next_unannotated_prefers_forward_before_wrapping() {
        let images = ImageSet::from_ids(["a", "b", "c", "d"]);
        let mut store = AnnotationStore::new();
        annotate(&mut store, "c");
        let mut cursor = Cursor::new(images.len());
        cursor.jump(1).unwrap();

        assert_eq!(cursor.jump_to_next_unannotated(&store, &images), Some(3));
        assert_eq!(cursor.position(), Some(3));
    }

    #[test]
    fn next_unannotated_wraps_to_start() {
        let images = ImageSet::from_ids(["a", "b", "c", "d"]);
        let mut store = AnnotationStore::new();
        annotate(&mut store, "c");
        annotate(&mut store, "d");
        let mut cursor = Cursor::new(images.len());
        cursor.jump(2).unwrap();

        assert_eq!(cursor.next_unannotated(&store, &images), Some(0));
    }

    #[test]
    fn next_unannotated_never_returns_current() {
        let images = ImageSet::from_ids(["a", "b", "c"]);
        let mut store = AnnotationStore::new();
        annotate(&mut store, "a");
        annotate(&mut store, "c");
        let mut cursor = Cursor::new(images.len());
        cursor.jump(1).unwrap();

        assert_eq!(cursor.jump_to_next_unannotated(&store, &images), None);
        assert_eq!(cursor.position(), Some(1));
    }

    #[test]
    fn next_unannotated_none_when_all_done() {
        let images = ImageSet::from_ids(["a", "b"]);
        let mut store = AnnotationStore::new();
        annotate(&mut store, "a");
        annotate(&mut store, "b");
        let cursor = Cursor::new(images.len());
        assert_eq!(cursor.next_unannotated(&store, &images), None);
    }
}
