//! Locale independent counter indices.
//!
//! The English names of all counters are always available in the registry, no matter
//! which language the system is using. Looking an index up by its English name and
//! then resolving it back through [`Pdh::lookup_name`] gives the localized name.

use itertools::Itertools;
use log::{debug, warn};

use crate::error::*;
use crate::perf::Pdh;
use crate::perf::api::PdhApi;

/// `REG_MULTI_SZ` value under `HKEY_LOCAL_MACHINE` with English counter names.
pub const ENGLISH_COUNTER_KEY: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\Perflib\009";
pub const ENGLISH_COUNTER_VALUE: &str = "Counter";

/// Provider of the raw English counter table.
///
/// The table is a flat list of alternating index and name strings:
/// `["1", "1847", "2", "System", "4", "Memory", ...]`.
pub trait CounterTableSource {
    fn read_counter_table(&self) -> PdhResult<Vec<String>>;
}

impl<T: CounterTableSource + ?Sized> CounterTableSource for &T {
    fn read_counter_table(&self) -> PdhResult<Vec<String>> {
        (**self).read_counter_table()
    }
}

/// Already loaded table.
impl CounterTableSource for Vec<String> {
    fn read_counter_table(&self) -> PdhResult<Vec<String>> {
        Ok(self.clone())
    }
}

/// Index of the counter with the given English name, or 0 if there is none.
///
/// The table is read anew on every call. Failures to read it are logged and reported as
/// not found.
pub fn lookup_index_by_english_name<S: CounterTableSource + ?Sized>(source: &S, name: &str) -> u32 {
    match source.read_counter_table() {
        Ok(table) => find_index_in_table(&table, name),
        Err(why) => {
            warn!("Unable to read English counter table: {}", why);
            0
        }
    }
}

/// Scan the names of a flat index/name table; the first exact match wins.
///
/// Malformed index next to a matching name counts as not found: the result is 0,
/// same as for a missing name.
pub fn find_index_in_table<S: AsRef<str>>(table: &[S], name: &str) -> u32 {
    let found = table
        .iter()
        .tuples::<(&S, &S)>()
        .find(|(_, candidate)| candidate.as_ref() == name);

    match found {
        Some((index, _)) => match index.as_ref().parse::<u32>() {
            Ok(index) => index,
            Err(_) => {
                debug!(
                    "Malformed index {:?} for English counter name {:?}",
                    index.as_ref(),
                    name
                );
                0
            }
        },
        None => {
            debug!("English counter name {:?} not found", name);
            0
        }
    }
}

impl<A: PdhApi> Pdh<A> {
    /// Name of a counter in the language of `machine`, given its English name.
    ///
    /// `Ok(None)` when the English name is unknown.
    pub fn lookup_localized_name<S: CounterTableSource + ?Sized>(
        &self,
        source: &S,
        machine: Option<&str>,
        english_name: &str,
    ) -> PdhResult<Option<String>> {
        match lookup_index_by_english_name(source, english_name) {
            0 => Ok(None),
            index => self.lookup_name(machine, index).map(Some),
        }
    }
}
