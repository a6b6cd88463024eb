//! Real PDH and registry, via the `windows` crate.

use std::ffi::CString;

use windows::Win32::System::Performance::{
    PERF_DETAIL, PdhEnumObjectItemsA, PdhEnumObjectItemsW, PdhLookupPerfNameByIndexA,
    PdhLookupPerfNameByIndexW,
};

use crate::format::Encoding;
use crate::hkey::open_key;
use crate::perf::api::*;
use crate::perf::english::*;
use crate::prelude::*;
use crate::reg::query_value_multi_string;

/// `pdh.dll` of the local system. Both `A` and `W` entry points are used, as the
/// encoding dictates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativePdh;

fn wide_arg(value: Option<&str>) -> Result<Option<U16CString>, u32> {
    value
        .map(|s| U16CString::from_str(s).map_err(|_| PDH_INVALID_ARGUMENT))
        .transpose()
}

fn narrow_arg(value: Option<&str>) -> Result<Option<CString>, u32> {
    value
        .map(|s| CString::new(s).map_err(|_| PDH_INVALID_ARGUMENT))
        .transpose()
}

fn pcwstr(value: &Option<U16CString>) -> PCWSTR {
    value.as_ref().map_or(PCWSTR::null(), |s| PCWSTR(s.as_ptr()))
}

fn pcstr(value: &Option<CString>) -> PCSTR {
    value.as_ref().map_or(PCSTR::null(), |s| PCSTR(s.as_ptr() as *const u8))
}

/// Scratch buffer of properly aligned UTF-16 units, as many as fit in `buffer`.
fn wide_scratch(buffer: &Option<&mut [u8]>) -> Option<Vec<u16>> {
    buffer.as_ref().map(|buffer| vec![0u16; buffer.len() / 2])
}

fn copy_back(units: Option<Vec<u16>>, buffer: Option<&mut [u8]>) {
    if let (Some(units), Some(buffer)) = (units, buffer) {
        for (dst, unit) in buffer.chunks_exact_mut(2).zip(units) {
            dst.copy_from_slice(&unit.to_ne_bytes());
        }
    }
}

impl PdhApi for NativePdh {
    fn lookup_perf_name_by_index(
        &self,
        encoding: Encoding,
        machine_name: Option<&str>,
        name_index: u32,
        name_buffer: Option<&mut [u8]>,
        name_buffer_size: &mut u32,
    ) -> u32 {
        match encoding {
            Encoding::Wide => {
                let machine = match wide_arg(machine_name) {
                    Ok(machine) => machine,
                    Err(status) => return status,
                };
                let mut units = wide_scratch(&name_buffer);
                let status = unsafe {
                    PdhLookupPerfNameByIndexW(
                        pcwstr(&machine),
                        name_index,
                        units.as_mut().map(|units| PWSTR(units.as_mut_ptr())),
                        name_buffer_size,
                    )
                };
                copy_back(units, name_buffer);
                status
            }
            Encoding::Narrow => {
                let machine = match narrow_arg(machine_name) {
                    Ok(machine) => machine,
                    Err(status) => return status,
                };
                unsafe {
                    PdhLookupPerfNameByIndexA(
                        pcstr(&machine),
                        name_index,
                        name_buffer.map(|buffer| PSTR(buffer.as_mut_ptr())),
                        name_buffer_size,
                    )
                }
            }
        }
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
        match encoding {
            Encoding::Wide => {
                let args = (wide_arg(data_source), wide_arg(machine_name), wide_arg(Some(object_name)));
                let (data_source, machine, object) = match args {
                    (Ok(data_source), Ok(machine), Ok(object)) => (data_source, machine, object),
                    _ => return PDH_INVALID_ARGUMENT,
                };
                let mut counter_units = wide_scratch(&counter_list);
                let mut instance_units = wide_scratch(&instance_list);
                let status = unsafe {
                    PdhEnumObjectItemsW(
                        pcwstr(&data_source),
                        pcwstr(&machine),
                        pcwstr(&object),
                        counter_units.as_mut().map(|units| PWSTR(units.as_mut_ptr())),
                        counter_list_length,
                        instance_units.as_mut().map(|units| PWSTR(units.as_mut_ptr())),
                        instance_list_length,
                        PERF_DETAIL(detail_level),
                        0,
                    )
                };
                copy_back(counter_units, counter_list);
                copy_back(instance_units, instance_list);
                status
            }
            Encoding::Narrow => {
                let args = (narrow_arg(data_source), narrow_arg(machine_name), narrow_arg(Some(object_name)));
                let (data_source, machine, object) = match args {
                    (Ok(data_source), Ok(machine), Ok(object)) => (data_source, machine, object),
                    _ => return PDH_INVALID_ARGUMENT,
                };
                unsafe {
                    PdhEnumObjectItemsA(
                        pcstr(&data_source),
                        pcstr(&machine),
                        pcstr(&object),
                        counter_list.map(|buffer| PSTR(buffer.as_mut_ptr())),
                        counter_list_length,
                        instance_list.map(|buffer| PSTR(buffer.as_mut_ptr())),
                        instance_list_length,
                        PERF_DETAIL(detail_level),
                        0,
                    )
                }
            }
        }
    }
}

/// English counter names of the local machine, straight from the registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishCounterTable;

impl CounterTableSource for EnglishCounterTable {
    fn read_counter_table(&self) -> PdhResult<Vec<String>> {
        let key = open_key(HKEY_LOCAL_MACHINE, ENGLISH_COUNTER_KEY)?;
        query_value_multi_string(*key, ENGLISH_COUNTER_VALUE)
    }
}
