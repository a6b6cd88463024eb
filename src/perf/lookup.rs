use log::{debug, trace};

use crate::error::*;
use crate::format::decode_c_string;
use crate::perf::api::*;
use crate::perf::{Pdh, check_arg};

impl<A: PdhApi> Pdh<A> {
    /// Name of the performance object or counter with the given index.
    ///
    /// `machine` is the computer name (DNS name or IP address); `None` means the local
    /// computer. The name is returned in the language of the target system.
    pub fn lookup_name(&self, machine: Option<&str>, index: u32) -> PdhResult<String> {
        check_arg("machine name", machine)?;
        let encoding = self.encoding();

        // Call once to get required buffer size
        let mut size: u32 = 0;
        let status = self
            .api()
            .lookup_perf_name_by_index(encoding, machine, index, None, &mut size);
        trace!(
            "PdhLookupPerfNameByIndex(size query) for index {}: status=0x{:08X}, required={}",
            index,
            status,
            size
        );
        if !is_size_query_ok(status) {
            return Err(PdhError::new_with_message(status)
                .with_comment(format!("PdhLookupPerfNameByIndex size query for index {}", index)));
        }

        // can't allocate an empty buffer
        if size < 1 {
            debug!("PdhLookupPerfNameByIndex announced empty name for index {}", index);
            return Ok(String::new());
        }

        let mut buffer = vec![0u8; encoding.byte_len(size)];
        let status = self.api().lookup_perf_name_by_index(
            encoding,
            machine,
            index,
            Some(&mut buffer[..]),
            &mut size,
        );
        trace!(
            "PdhLookupPerfNameByIndex(get data) for index {}: status=0x{:08X}",
            index,
            status
        );
        if status != PDH_STATUS_SUCCESS {
            return Err(PdhError::new_with_message(status)
                .with_comment(format!("PdhLookupPerfNameByIndex for index {}", index)));
        }

        let (name, _) = decode_c_string(&buffer, encoding);
        Ok(name)
    }
}
