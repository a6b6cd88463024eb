use std::fmt;

use itertools::Itertools;
use log::{debug, trace};

use crate::error::*;
use crate::format::decode_multi_string;
use crate::perf::api::*;
use crate::perf::{Pdh, check_arg};

/// Counters and instances of a performance object.
///
/// Each value owns its lists; clones and separate queries never share storage.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ObjectItems {
    counters: Vec<String>,
    instances: Vec<String>,
}

impl ObjectItems {
    pub fn new(counters: Vec<String>, instances: Vec<String>) -> Self {
        ObjectItems {
            counters,
            instances,
        }
    }

    /// Counter names, in the order reported by PDH.
    pub fn counters(&self) -> &[String] {
        &self.counters
    }

    /// Instance names, empty for single-instance objects.
    pub fn instances(&self) -> &[String] {
        &self.instances
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.counters, self.instances)
    }
}

impl fmt::Display for ObjectItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ObjectItems{{counters=[{}], instances=[{}]}}",
            self.counters.iter().join(", "),
            self.instances.iter().join(", ")
        )
    }
}

impl<A: PdhApi> Pdh<A> {
    /// Counters and instances of the performance object `object_name`.
    ///
    /// `data_source` is the name of a log file to read names from; `None` means real-time
    /// data of `machine`, which in turn defaults to the local computer. Only items of
    /// `detail_level` or less are returned.
    pub fn enum_object_items<D: Into<u32>>(
        &self,
        data_source: Option<&str>,
        machine: Option<&str>,
        object_name: &str,
        detail_level: D,
    ) -> PdhResult<ObjectItems> {
        check_arg("data source", data_source)?;
        check_arg("machine name", machine)?;
        check_arg("object name", Some(object_name))?;
        let encoding = self.encoding();
        let detail_level = detail_level.into();

        // Call once to get list lengths
        let mut counter_len: u32 = 0;
        let mut instance_len: u32 = 0;
        let status = self.api().enum_object_items(
            encoding,
            data_source,
            machine,
            object_name,
            None,
            &mut counter_len,
            None,
            &mut instance_len,
            detail_level,
        );
        trace!(
            "PdhEnumObjectItems(size query) for {:?}: status=0x{:08X}, counters={}, instances={}",
            object_name,
            status,
            counter_len,
            instance_len
        );
        if !is_size_query_ok(status) {
            return Err(PdhError::new_with_message(status)
                .with_comment(format!("PdhEnumObjectItems size query for {:?}", object_name)));
        }

        let mut counter_list = (counter_len > 0).then(|| vec![0u8; encoding.byte_len(counter_len)]);
        let mut instance_list = (instance_len > 0).then(|| vec![0u8; encoding.byte_len(instance_len)]);
        if counter_list.is_none() && instance_list.is_none() {
            debug!("PdhEnumObjectItems announced no items for {:?}", object_name);
        }

        let status = self.api().enum_object_items(
            encoding,
            data_source,
            machine,
            object_name,
            counter_list.as_deref_mut(),
            &mut counter_len,
            instance_list.as_deref_mut(),
            &mut instance_len,
            detail_level,
        );
        trace!(
            "PdhEnumObjectItems(get data) for {:?}: status=0x{:08X}",
            object_name,
            status
        );
        if status != PDH_STATUS_SUCCESS {
            return Err(PdhError::new_with_message(status)
                .with_comment(format!("PdhEnumObjectItems for {:?}", object_name)));
        }

        let counters = counter_list
            .map(|buffer| decode_multi_string(&buffer, encoding))
            .unwrap_or_default();
        let instances = instance_list
            .map(|buffer| decode_multi_string(&buffer, encoding))
            .unwrap_or_default();

        Ok(ObjectItems::new(counters, instances))
    }
}
