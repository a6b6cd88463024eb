//! Scripted stand-ins for PDH and the registry.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::*;
use crate::format::Encoding;
use crate::perf::api::*;
use crate::perf::english::CounterTableSource;

fn encode(s: &str, encoding: Encoding) -> Vec<u8> {
    match encoding {
        // single-byte code page, as the narrow entry points use
        Encoding::Narrow => encoding_rs::WINDOWS_1252.encode(s).0.into_owned(),
        Encoding::Wide => s.encode_utf16().flat_map(|unit| unit.to_ne_bytes()).collect(),
    }
}

fn encode_c_string(s: &str, encoding: Encoding) -> Vec<u8> {
    let mut bytes = encode(s, encoding);
    bytes.extend(std::iter::repeat_n(0, encoding.unit_size()));
    bytes
}

fn encode_multi_string(list: &[String], encoding: Encoding) -> Vec<u8> {
    let mut bytes: Vec<u8> = list
        .iter()
        .flat_map(|s| encode_c_string(s, encoding))
        .collect();
    bytes.extend(std::iter::repeat_n(0, encoding.unit_size()));
    bytes
}

/// Copy `data` into `buffer` if it fits, reporting the size in units either way.
fn fill(buffer: Option<&mut [u8]>, data: &[u8], size: &mut u32, encoding: Encoding) -> bool {
    let units = (data.len() / encoding.unit_size()) as u32;
    let fits = match buffer {
        Some(buffer) if buffer.len() >= data.len() => {
            buffer[..data.len()].copy_from_slice(data);
            true
        }
        Some(_) => false,
        None => data.is_empty(),
    };
    *size = units;
    fits
}

#[derive(Debug, Default)]
pub struct StubPdh {
    names: HashMap<u32, String>,
    counters: Vec<String>,
    instances: Vec<String>,
    size_query_status: Option<u32>,
    fetch_status: Option<u32>,
    lookup_calls: Cell<usize>,
    enum_calls: Cell<usize>,
    last_machine: RefCell<Option<String>>,
    last_detail_level: Cell<Option<u32>>,
    enum_buffers: RefCell<Vec<(Option<usize>, Option<usize>)>>,
}

impl StubPdh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty name is reported with zero size.
    pub fn with_name(mut self, index: u32, name: &str) -> Self {
        self.names.insert(index, name.to_owned());
        self
    }

    pub fn with_counters(mut self, counters: &[&str]) -> Self {
        self.counters = counters.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_instances(mut self, instances: &[&str]) -> Self {
        self.instances = instances.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Status of every size query, overriding the computed one.
    pub fn with_size_query_status(mut self, status: u32) -> Self {
        self.size_query_status = Some(status);
        self
    }

    /// Status of every call with a buffer, overriding the computed one.
    pub fn with_fetch_status(mut self, status: u32) -> Self {
        self.fetch_status = Some(status);
        self
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.get()
    }

    pub fn enum_calls(&self) -> usize {
        self.enum_calls.get()
    }

    pub fn last_machine(&self) -> Option<String> {
        self.last_machine.borrow().clone()
    }

    pub fn last_detail_level(&self) -> Option<u32> {
        self.last_detail_level.get()
    }

    /// Byte sizes of the buffers passed to each enumeration call.
    pub fn enum_buffers(&self) -> Vec<(Option<usize>, Option<usize>)> {
        self.enum_buffers.borrow().clone()
    }
}

impl PdhApi for StubPdh {
    fn lookup_perf_name_by_index(
        &self,
        encoding: Encoding,
        machine_name: Option<&str>,
        name_index: u32,
        name_buffer: Option<&mut [u8]>,
        name_buffer_size: &mut u32,
    ) -> u32 {
        self.lookup_calls.set(self.lookup_calls.get() + 1);
        *self.last_machine.borrow_mut() = machine_name.map(str::to_owned);

        let is_size_query = name_buffer.is_none();
        let data = match self.names.get(&name_index) {
            Some(name) if name.is_empty() => Vec::new(),
            Some(name) => encode_c_string(name, encoding),
            None => {
                return match (is_size_query, self.size_query_status) {
                    (true, Some(status)) => status,
                    _ => PDH_CSTATUS_NO_OBJECT,
                };
            }
        };
        let fits = fill(name_buffer, &data, name_buffer_size, encoding);

        match (is_size_query, self.size_query_status, self.fetch_status) {
            (true, Some(status), _) => status,
            (false, _, Some(status)) => status,
            _ if fits => PDH_STATUS_SUCCESS,
            _ => PDH_MORE_DATA,
        }
    }

    fn enum_object_items(
        &self,
        encoding: Encoding,
        _data_source: Option<&str>,
        machine_name: Option<&str>,
        _object_name: &str,
        counter_list: Option<&mut [u8]>,
        counter_list_length: &mut u32,
        instance_list: Option<&mut [u8]>,
        instance_list_length: &mut u32,
        detail_level: u32,
    ) -> u32 {
        self.enum_calls.set(self.enum_calls.get() + 1);
        *self.last_machine.borrow_mut() = machine_name.map(str::to_owned);
        self.last_detail_level.set(Some(detail_level));

        let is_size_query = counter_list.is_none() && instance_list.is_none();
        self.enum_buffers.borrow_mut().push((
            counter_list.as_ref().map(|buffer| buffer.len()),
            instance_list.as_ref().map(|buffer| buffer.len()),
        ));

        // absent list is reported with zero size, not as an empty multi-string
        let encode_list = |list: &[String]| {
            if list.is_empty() {
                Vec::new()
            } else {
                encode_multi_string(list, encoding)
            }
        };
        let counters = encode_list(&self.counters);
        let instances = encode_list(&self.instances);
        let counters_fit = fill(counter_list, &counters, counter_list_length, encoding);
        let instances_fit = fill(instance_list, &instances, instance_list_length, encoding);

        match (is_size_query, self.size_query_status, self.fetch_status) {
            (true, Some(status), _) => status,
            (false, _, Some(status)) => status,
            _ if counters_fit && instances_fit => PDH_STATUS_SUCCESS,
            _ => PDH_MORE_DATA,
        }
    }
}

/// Registry table stand-in which counts reads.
#[derive(Debug)]
pub struct StubTable {
    table: Result<Vec<String>, u32>,
    reads: Cell<usize>,
}

impl StubTable {
    pub fn new(table: &[&str]) -> Self {
        StubTable {
            table: Ok(table.iter().map(|s| s.to_string()).collect()),
            reads: Cell::new(0),
        }
    }

    pub fn failing(status: u32) -> Self {
        StubTable {
            table: Err(status),
            reads: Cell::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl CounterTableSource for StubTable {
    fn read_counter_table(&self) -> PdhResult<Vec<String>> {
        self.reads.set(self.reads.get() + 1);
        self.table
            .clone()
            .map_err(|status| PdhError::new(status).with_comment("RegQueryValueExW"))
    }
}
