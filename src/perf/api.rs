//! Seam between buffer negotiation and the actual PDH entry points.

use crate::format::Encoding;

/// `ERROR_SUCCESS`
pub const PDH_STATUS_SUCCESS: u32 = 0;
/// The buffer is too small; retry with the size written back by the call.
pub const PDH_MORE_DATA: u32 = 0x8000_07D2;
/// Unable to connect to the specified computer, or the computer is offline.
pub const PDH_CSTATUS_NO_MACHINE: u32 = 0x8000_07D0;
/// The specified object is not found on the system.
pub const PDH_CSTATUS_NO_OBJECT: u32 = 0xC000_0BB8;
/// A required argument is missing or incorrect.
pub const PDH_INVALID_ARGUMENT: u32 = 0xC000_0BBD;

/// Standard detail levels of performance items.
///
/// Enumeration returns every item of the requested level or less.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum DetailLevel {
    Novice,
    Advanced,
    Expert,
    Wizard,
}

impl From<DetailLevel> for u32 {
    fn from(level: DetailLevel) -> Self {
        match level {
            DetailLevel::Novice => 100,
            DetailLevel::Advanced => 200,
            DetailLevel::Expert => 300,
            DetailLevel::Wizard => 400,
        }
    }
}

/// Native counter-query interface.
///
/// Both operations follow the same convention: pass `None` as an output buffer and a
/// zeroed size to learn the required size; then pass a buffer of that many encoding
/// units. Sizes are always in encoding units. Buffers are plain bytes, laid out
/// according to `encoding`.
///
/// Return value is the raw status code.
pub trait PdhApi {
    /// `PdhLookupPerfNameByIndex`
    fn lookup_perf_name_by_index(
        &self,
        encoding: Encoding,
        machine_name: Option<&str>,
        name_index: u32,
        name_buffer: Option<&mut [u8]>,
        name_buffer_size: &mut u32,
    ) -> u32;

    /// `PdhEnumObjectItems`
    #[allow(clippy::too_many_arguments)]
    fn enum_object_items(
        &self,
        encoding: Encoding,
        data_source: Option<&str>,
        machine_name: Option<&str>,
        object_name: &str,
        counter_list: Option<&mut [u8]>,
        counter_list_length: &mut u32,
        instance_list: Option<&mut [u8]>,
        instance_list_length: &mut u32,
        detail_level: u32,
    ) -> u32;
}

impl<T: PdhApi + ?Sized> PdhApi for &T {
    fn lookup_perf_name_by_index(
        &self,
        encoding: Encoding,
        machine_name: Option<&str>,
        name_index: u32,
        name_buffer: Option<&mut [u8]>,
        name_buffer_size: &mut u32,
    ) -> u32 {
        (**self).lookup_perf_name_by_index(encoding, machine_name, name_index, name_buffer, name_buffer_size)
    }

    fn enum_object_items(
        &self,
        encoding: Encoding,
        data_source: Option<&str>,
        machine_name: Option<&str>,
        object_name: &str,
        counter_list: Option<&mut [u8]>,
        counter_list_length: &mut u32,
        instance_list: Option<&mut [u8]>,
        instance_list_length: &mut u32,
        detail_level: u32,
    ) -> u32 {
        (**self).enum_object_items(
            encoding,
            data_source,
            machine_name,
            object_name,
            counter_list,
            counter_list_length,
            instance_list,
            instance_list_length,
            detail_level,
        )
    }
}

/// Status of a size query: both success and "more data" announce a usable size.
pub fn is_size_query_ok(status: u32) -> bool {
    status == PDH_STATUS_SUCCESS || status == PDH_MORE_DATA
}
