use log::warn;

use crate::prelude::*;

/// Open registry subkey for reading.
pub fn open_key(hkey: HKEY, sub_key: &str) -> PdhResult<OwnedHKey> {
    let wsz_sub_key = U16CString::from_str(sub_key).map_err(|_| {
        PdhError::new(ERROR_INVALID_PARAMETER.0)
            .with_comment(format!("Registry key contains NUL character: {:?}", sub_key))
    })?;

    let mut result = HKEY::default();
    let error_code = unsafe {
        RegOpenKeyExW(
            hkey,
            PCWSTR(wsz_sub_key.as_ptr()),
            None,
            KEY_READ,
            &mut result as *mut HKEY,
        )
    };
    if error_code != ERROR_SUCCESS {
        return Err(PdhError::new_with_message(error_code.0)
            .with_comment(format!("RegOpenKeyExW with key: {}", sub_key)));
    }

    Ok(OwnedHKey(result))
}

pub fn close_key(hkey: HKEY) -> PdhResult<()> {
    let error_code = unsafe { RegCloseKey(hkey) };
    if error_code != ERROR_SUCCESS {
        return Err(PdhError::new_with_message(error_code.0).with_comment("RegCloseKey"));
    }
    Ok(())
}

/// Auto-closing wrapper for HKEY. To access underlying raw HKEY value, use deref
/// operator: `*hkey`.
#[derive(Debug)]
pub struct OwnedHKey(HKEY);

impl std::ops::Deref for OwnedHKey {
    type Target = HKEY;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Drop for OwnedHKey {
    fn drop(&mut self) {
        if let Err(e) = close_key(self.0) {
            warn!("RegCloseKey Error: {}", e);
        }
    }
}
