use std::cell::Cell;

use pdh_util::perf::api::{PDH_CSTATUS_NO_OBJECT, PDH_MORE_DATA, PDH_STATUS_SUCCESS};
use pdh_util::perf::english::find_index_in_table;
use pdh_util::*;

/// Object with a fixed name, counter list and no instances; fails with `status` when set.
struct FixedPdh {
    name: &'static str,
    counters: &'static [&'static str],
    status: Option<u32>,
    calls: Cell<usize>,
}

impl FixedPdh {
    fn new() -> Self {
        FixedPdh {
            name: "Processor",
            counters: &[r"\Processor(_Total)\% Processor Time", r"\Memory\Available Bytes"],
            status: None,
            calls: Cell::new(0),
        }
    }

    fn failing(status: u32) -> Self {
        FixedPdh {
            status: Some(status),
            ..Self::new()
        }
    }
}

fn encode(strings: &[&str], encoding: Encoding) -> Vec<u8> {
    let mut bytes = Vec::new();
    for s in strings {
        match encoding {
            Encoding::Narrow => bytes.extend_from_slice(&encoding_rs::WINDOWS_1252.encode(s).0),
            Encoding::Wide => bytes.extend(s.encode_utf16().flat_map(u16::to_ne_bytes)),
        }
        bytes.extend(std::iter::repeat_n(0, encoding.unit_size()));
    }
    bytes
}

fn respond(data: &[u8], buffer: Option<&mut [u8]>, size: &mut u32, encoding: Encoding) -> u32 {
    *size = (data.len() / encoding.unit_size()) as u32;
    match buffer {
        Some(buffer) => {
            buffer[..data.len()].copy_from_slice(data);
            PDH_STATUS_SUCCESS
        }
        None if data.is_empty() => PDH_STATUS_SUCCESS,
        None => PDH_MORE_DATA,
    }
}

impl PdhApi for FixedPdh {
    fn lookup_perf_name_by_index(
        &self,
        encoding: Encoding,
        _machine_name: Option<&str>,
        _name_index: u32,
        name_buffer: Option<&mut [u8]>,
        name_buffer_size: &mut u32,
    ) -> u32 {
        self.calls.set(self.calls.get() + 1);
        if let Some(status) = self.status {
            return status;
        }
        respond(&encode(&[self.name], encoding), name_buffer, name_buffer_size, encoding)
    }

    fn enum_object_items(
        &self,
        encoding: Encoding,
        _data_source: Option<&str>,
        _machine_name: Option<&str>,
        _object_name: &str,
        counter_list: Option<&mut [u8]>,
        counter_list_length: &mut u32,
        instance_list: Option<&mut [u8]>,
        instance_list_length: &mut u32,
        _detail_level: u32,
    ) -> u32 {
        self.calls.set(self.calls.get() + 1);
        if let Some(status) = self.status {
            return status;
        }
        assert!(instance_list.is_none(), "no buffer expected for empty instance list");
        *instance_list_length = 0;
        let mut counters = encode(self.counters, encoding);
        counters.extend(std::iter::repeat_n(0, encoding.unit_size()));
        respond(&counters, counter_list, counter_list_length, encoding)
    }
}

#[test]
fn lookup_name_matches_native_side() {
    let _ = env_logger::try_init();
    for encoding in [Encoding::Narrow, Encoding::Wide] {
        let pdh = Pdh::new(FixedPdh::new(), encoding);
        assert_eq!(pdh.lookup_name(None, 238).unwrap(), "Processor");
        assert_eq!(pdh.api().calls.get(), 2);
    }
}

#[test]
fn enumerate_counters_without_instances() {
    let _ = env_logger::try_init();
    for encoding in [Encoding::Narrow, Encoding::Wide] {
        let pdh = Pdh::new(FixedPdh::new(), encoding);
        let items = pdh
            .enum_object_items(None, None, "Processor", DetailLevel::Novice)
            .unwrap();
        assert_eq!(
            items.counters(),
            [r"\Processor(_Total)\% Processor Time", r"\Memory\Available Bytes"]
        );
        assert!(items.instances().is_empty());
    }
}

#[test]
fn every_operation_surfaces_status_code() {
    let _ = env_logger::try_init();
    let pdh = Pdh::new(FixedPdh::failing(PDH_CSTATUS_NO_OBJECT), Encoding::Wide);

    let error = pdh.lookup_name(Some(r"\\server"), 6).unwrap_err();
    assert_eq!(error.status(), PDH_CSTATUS_NO_OBJECT);
    assert!(error.to_string().contains("0xC0000BB8"));

    let error = pdh
        .enum_object_items(None, Some(r"\\server"), "Processor", 100u32)
        .unwrap_err();
    assert_eq!(error.status(), PDH_CSTATUS_NO_OBJECT);

    // no retries
    assert_eq!(pdh.api().calls.get(), 2);
}

#[test]
fn english_index_lookup() {
    let table: Vec<String> = ["1", "1847", "2", "System", "4", "Memory"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(lookup_index_by_english_name(&table, "System"), 2);
    assert_eq!(lookup_index_by_english_name(&table, "Memory"), 4);
    assert_eq!(lookup_index_by_english_name(&table, "Nonexistent"), 0);

    // malformed entry and missing entry are both reported as 0
    assert_eq!(find_index_in_table(&["abc", "System"], "System"), 0);
}

#[test]
fn separate_results_do_not_share_storage() {
    let pdh = Pdh::new(FixedPdh::new(), Encoding::Wide);
    let first = pdh.enum_object_items(None, None, "Processor", 100u32).unwrap();
    let second = pdh.enum_object_items(None, None, "Processor", 100u32).unwrap();

    let (mut counters, mut instances) = first.into_parts();
    counters.push("extra".to_owned());
    instances.push("extra".to_owned());

    assert_eq!(second.counters().len(), 2);
    assert!(second.instances().is_empty());
}
