use log::{trace, warn};

use crate::format::split_nul_delimited_double_nul_terminated;
use crate::prelude::*;

const INITIAL_BUFFER_SIZE: usize = 8 * 1024;
// Abort after 64 MB
const MAX_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Create new buffer and call `query_value_with_buffer`.
pub fn query_value(
    hkey: HKEY,
    value_name: &str,
    value_type: Option<&mut REG_VALUE_TYPE>,
) -> PdhResult<Vec<u8>> {
    let mut buffer = Vec::new();
    query_value_with_buffer(hkey, value_name, value_type, &mut buffer)?;
    Ok(buffer)
}

/// Query `REG_MULTI_SZ` value and split it into owned strings.
pub fn query_value_multi_string(hkey: HKEY, value_name: &str) -> PdhResult<Vec<String>> {
    let mut value_type = REG_NONE;
    let buffer = query_value(hkey, value_name, Some(&mut value_type))?;
    if value_type != REG_MULTI_SZ {
        return Err(PdhError::new(ERROR_INVALID_DATA.0).with_comment(format!(
            "Unexpected data type in registry. Expected MULTI_SZ, got: {:#10x}",
            value_type.0
        )));
    }

    let units: Vec<u16> = buffer
        .chunks_exact(2)
        .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
        .collect();
    let strings = split_nul_delimited_double_nul_terminated(U16Str::from_slice(&units))
        .into_iter()
        .map(|string| string.to_string_lossy())
        .collect();
    Ok(strings)
}

/// Query registry value of potentially unknown size, reallocating larger buffer in a loop as needed.
/// Given buffer will be cleared and overridden with zeroes before usage.
pub fn query_value_with_buffer(
    hkey: HKEY,
    value_name: &str,
    value_type: Option<&mut REG_VALUE_TYPE>,
    buffer: &mut Vec<u8>,
) -> PdhResult<()> {
    // prepare value name with trailing NULL char
    let wsz_value_name = U16CString::from_str(value_name).map_err(|_| {
        PdhError::new(ERROR_INVALID_PARAMETER.0)
            .with_comment(format!("Registry value name contains NUL character: {:?}", value_name))
    })?;
    let pcwstr_value_name = PCWSTR(wsz_value_name.as_ptr());
    let lp_type = value_type.map(|t| t as *mut _);

    let mut buffer_size = match try_get_size_hint(hkey, value_name, pcwstr_value_name) {
        Ok(hint) if hint > 0 => hint as usize,
        Ok(_) => INITIAL_BUFFER_SIZE,
        // gracefully fallback to incremental buffer allocation, do not return error here.
        Err(why) => {
            warn!("{}", why);
            INITIAL_BUFFER_SIZE
        }
    };
    // the value may grow between the two calls, so the size returned by a failed call is
    // not trusted; keep a separate variable for the buffer size.
    let mut buffer_size_out = buffer_size as u32;
    buffer.clear();
    buffer.resize(buffer_size, 0);

    let mut error_code: WIN32_ERROR;
    unsafe {
        error_code = RegQueryValueExW(
            hkey,
            pcwstr_value_name,
            None,
            lp_type,
            Some(buffer.as_mut_ptr()),
            Some(&mut buffer_size_out as *mut _),
        );

        while error_code == ERROR_MORE_DATA {
            buffer_size *= 2;
            buffer_size_out = buffer_size as u32;
            if buffer_size > MAX_BUFFER_SIZE {
                return Err(PdhError::new(ERROR_MORE_DATA.0).with_comment(format!(
                    "RegQueryValueExW reached buffer limit: {} bytes",
                    buffer_size
                )));
            }
            trace!("RegQueryValueExW({}): growing buffer to {} bytes", value_name, buffer_size);
            buffer.resize(buffer_size, 0);

            // exactly same call as above
            error_code = RegQueryValueExW(
                hkey,
                pcwstr_value_name,
                None,
                lp_type,
                Some(buffer.as_mut_ptr()),
                Some(&mut buffer_size_out as *mut _),
            );
        }
    }

    if error_code != ERROR_SUCCESS {
        return Err(PdhError::new_with_message(error_code.0)
            .with_comment(format!("RegQueryValueExW with query: {}", value_name)));
    }

    // buffer_size_out holds the number of bytes written by a successful call
    buffer.truncate(buffer_size_out as usize);
    Ok(())
}

/// Size of a static value, to be used as a first guess only: anything could happen between
/// two calls to RegQueryValueExW.
fn try_get_size_hint(
    hkey: HKEY,
    value_name: &str,
    pcwstr_value_name: PCWSTR,
) -> PdhResult<u32> {
    let mut reg_size_hint: u32 = 0;
    // pass NULL data to figure out needed buffer size
    let error_code = unsafe {
        RegQueryValueExW(
            hkey,
            pcwstr_value_name,
            None,
            None,
            None,
            Some(&mut reg_size_hint as *mut _),
        )
    };

    if error_code != ERROR_SUCCESS {
        return Err(PdhError::new_with_message(error_code.0).with_comment(format!(
            "Getting buffer size hint for registry value {:?} failed",
            value_name
        )));
    }

    Ok(reg_size_hint)
}
