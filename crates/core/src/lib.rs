//! Stylemark annotation state core.
//!
//! Pure, synchronous domain logic for labelling clothing images:
//!
//! - [`annotation`]: record model, closed value sets and validation.
//! - [`store`]: at most one record per image, insertion-ordered.
//! - [`cursor`]: bounds-checked navigation and next-unannotated lookup.
//! - [`stats`]: totals, distributions, progress and quality warnings.
//! - [`bulk`]: apply one label set to every unannotated image.
//! - [`csv_codec`]: fixed-column export and validating import.
//! - [`source`]: image list providers.
//! - [`session`]: the per-user context every operation goes through.

pub mod annotation;
pub mod bulk;
pub mod csv_codec;
pub mod cursor;
pub mod error;
pub mod image_set;
pub mod session;
pub mod source;
pub mod stats;
pub mod store;
pub mod types;

pub use error::CoreError;
pub use session::{ChangeEvent, ChangeKind, Session, SessionSnapshot};
