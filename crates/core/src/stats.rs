//! Aggregate counts, progress and quality warnings.
//!
//! Everything here is recomputed from the store on each call; nothing is
//! cached, so results can never go stale after a mutation.

use indexmap::IndexMap;
use serde::Serialize;

use crate::annotation::{Category, Gender, Validity};
use crate::image_set::ImageSet;
use crate::store::AnnotationStore;

/// `invalid` above this fraction of `valid` is flagged.
pub const INVALID_TO_VALID_RATIO: f64 = 0.5;

/// Largest category above this multiple of the smallest is flagged.
pub const CATEGORY_IMBALANCE_RATIO: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub total_images: usize,
    pub annotated: usize,
    pub remaining: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityWarning {
    /// Many invalid images relative to valid ones.
    ImbalancedValidity,
    /// Uneven distribution over the categories in use.
    ImbalancedCategory,
}

/// All statistics for one store, as returned to a presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub totals: Totals,
    pub by_gender: IndexMap<Gender, usize>,
    pub by_category: IndexMap<Category, usize>,
    pub warnings: Vec<QualityWarning>,
    pub progress: Progress,
}

pub fn totals(store: &AnnotationStore) -> Totals {
    let mut out = Totals {
        total: store.len(),
        ..Totals::default()
    };
    for ann in store.iter() {
        match ann.validity {
            Validity::Valid => out.valid += 1,
            Validity::Invalid => out.invalid += 1,
        }
    }
    out
}

/// Counts per gender combination in canonical order, zeros omitted.
pub fn by_gender(store: &AnnotationStore) -> IndexMap<Gender, usize> {
    Gender::ALL
        .into_iter()
        .map(|g| (g, store.iter().filter(|a| a.gender == g).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

/// Counts per category in canonical order, zeros omitted.
pub fn by_category(store: &AnnotationStore) -> IndexMap<Category, usize> {
    Category::ALL
        .into_iter()
        .map(|c| (c, store.iter().filter(|a| a.category == c).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

/// Quality warnings for the current records.
///
/// The category check only looks at categories that have at least one
/// record, so an unused category never counts as the minimum.
pub fn quality_warnings(store: &AnnotationStore) -> Vec<QualityWarning> {
    let mut warnings = Vec::new();
    if store.is_empty() {
        return warnings;
    }

    let t = totals(store);
    if t.invalid as f64 > t.valid as f64 * INVALID_TO_VALID_RATIO {
        warnings.push(QualityWarning::ImbalancedValidity);
    }

    let counts = by_category(store);
    let max = counts.values().copied().max();
    let min = counts.values().copied().min();
    if let (Some(max), Some(min)) = (max, min) {
        if max > min * CATEGORY_IMBALANCE_RATIO {
            warnings.push(QualityWarning::ImbalancedCategory);
        }
    }

    warnings
}

/// How much of `images` has been labelled.
pub fn progress(store: &AnnotationStore, images: &ImageSet) -> Progress {
    let total_images = images.len();
    let annotated = store.annotated_in(images);
    let percent = if total_images > 0 {
        annotated as f64 / total_images as f64 * 100.0
    } else {
        0.0
    };
    Progress {
        total_images,
        annotated,
        remaining: total_images - annotated,
        percent,
    }
}

pub fn report(store: &AnnotationStore, images: &ImageSet) -> StatsReport {
    StatsReport {
        totals: totals(store),
        by_gender: by_gender(store),
        by_category: by_category(store),
        warnings: quality_warnings(store),
        progress: progress(store, images),
    }
}
