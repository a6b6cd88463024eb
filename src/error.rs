use std::error::Error;
use std::fmt;

/// Failure of a native PDH (or registry) call, carrying the raw status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdhError {
    status: u32,
    comment: Option<String>,
    message: Option<String>,
    source: Option<Box<PdhError>>,
}

impl PdhError {
    fn _new(status: u32, comment: Option<String>, message: Option<String>, source: Option<Box<PdhError>>) -> Self {
        PdhError {
            status,
            comment,
            message,
            source,
        }
    }

    pub fn new(status: u32) -> Self {
        Self::_new(status, None, None, None)
    }

    pub fn new_with_message(status: u32) -> Self {
        Self::new(status).with_message()
    }

    pub fn with_comment<S: Into<String>>(&self, comment: S) -> Self {
        let mut clone = self.clone();
        clone.comment = Some(comment.into());
        clone
    }

    /// If formatted message is not initialized, ask the system for one and return new error
    /// instance. Does nothing on hosts without a message table.
    pub fn with_message(&self) -> Self {
        match self.message.as_ref() {
            Some(_) => self.clone(),
            None => self.clone_with_message(),
        }
    }

    pub fn with_source(&self, source: Self) -> Self {
        let mut clone = self.clone();
        clone.source = Some(Box::new(source));
        clone
    }

    /// Raw status code as returned by the failed call.
    pub fn status(&self) -> u32 {
        self.status
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[cfg(windows)]
    fn clone_with_message(&self) -> Self {
        match win::format_message(self.status) {
            Ok(message) => {
                let mut clone = self.clone();
                clone.message = Some(message);
                clone
            }
            Err(format_error) => {
                // the status of the failed call stays, the formatting failure becomes the cause
                let mut clone = self.clone();
                clone.message = Some(format!(
                    "FormatMessageW failed while formatting error 0x{:08X}",
                    self.status
                ));
                clone.source = Some(Box::new(Self::new(format_error)));
                clone
            }
        }
    }

    #[cfg(not(windows))]
    fn clone_with_message(&self) -> Self {
        self.clone()
    }

    const UNKNOWN_ERROR: &'static str = "UNKNOWN ERROR CODE";
}

impl fmt::Display for PdhError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(comment) = self.comment.as_ref() {
            write!(f, "{}; ", comment)?;
        }
        let message = match self.message.as_ref() {
            Some(msg) => msg.trim_end(),
            None => Self::UNKNOWN_ERROR,
        };
        write!(f, "Pdh call failed with error code 0x{:08X}: {}", self.status, message)?;

        if let Some(source) = self.source.as_ref() {
            write!(f, "; Caused by: {}", source)?;
        }
        Ok(())
    }
}

impl Error for PdhError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|source| source.as_ref() as &(dyn Error + 'static))
    }
}

/// Rust + PDH extension for error handling
pub type PdhResult<T> = Result<T, PdhError>;

#[cfg(windows)]
mod win {
    use windows::Win32::Foundation::{GetLastError, HLOCAL, LocalFree};
    use windows::Win32::System::Diagnostics::Debug::*;
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows_core::{PWSTR, w};
    use widestring::U16Str;

    /// PDH status codes live in the message table of `pdh.dll`, Win32 codes in the system one.
    pub(super) fn format_message(status: u32) -> Result<String, u32> {
        let module = unsafe { GetModuleHandleW(w!("pdh.dll")) }.ok();

        let mut flags = FORMAT_MESSAGE_IGNORE_INSERTS
            | FORMAT_MESSAGE_FROM_SYSTEM
            | FORMAT_MESSAGE_ALLOCATE_BUFFER;
        if module.is_some() {
            flags |= FORMAT_MESSAGE_FROM_HMODULE;
        }
        let source = module.map(|module| module.0 as *const _);

        unsafe {
            let mut buffer: PWSTR = PWSTR::null();
            // If the function succeeds, the return value is the number of TCHARs stored in the output buffer, excluding the terminating null character.
            let len = FormatMessageW(
                flags, // dwFlags
                source, // lpSource
                status, // dwMessageId
                0, // dwLanguageId
                PWSTR(&mut buffer.0 as *mut *mut u16 as *mut u16), // lpBuffer
                0, // nSize
                None, // va_args
            );

            // If the function fails, the return value is zero. To get extended error information, call GetLastError.
            if len == 0 {
                return Err(GetLastError().0);
            }

            let message = U16Str::from_ptr(buffer.0, len as usize).to_string_lossy();

            LocalFree(Some(HLOCAL(buffer.as_ptr() as *mut _)));

            Ok(message)
        }
    }
}
