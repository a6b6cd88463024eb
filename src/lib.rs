//! # Rusty wrappers for PDH counter metadata lookups
//!
//! Three independent queries are exposed:
//!
//! - [`Pdh::lookup_name`] resolves a counter or object index into its display name;
//! - [`lookup_index_by_english_name`] resolves an English counter name into its index,
//!   regardless of the active system locale;
//! - [`Pdh::enum_object_items`] lists counters and instances of a performance object.
//!
//! Native calls go through the [`PdhApi`] trait, so everything but the bindings
//! themselves is testable on any host.
//!
//! [`Pdh::lookup_name`]: perf::Pdh::lookup_name
//! [`Pdh::enum_object_items`]: perf::Pdh::enum_object_items
//! [`lookup_index_by_english_name`]: perf::english::lookup_index_by_english_name
//! [`PdhApi`]: perf::api::PdhApi
pub mod error;
pub mod format;
#[cfg(windows)]
pub mod hkey;
pub mod perf;
pub mod prelude;
#[cfg(windows)]
pub mod reg;

pub use crate::error::{PdhError, PdhResult};
pub use crate::format::Encoding;
pub use crate::perf::Pdh;
pub use crate::perf::api::{DetailLevel, PdhApi};
pub use crate::perf::english::{CounterTableSource, lookup_index_by_english_name};
pub use crate::perf::items::ObjectItems;
