#![allow(ambiguous_glob_reexports)]

//! Everything you need to get started.
pub use widestring::{U16CString, U16Str};

#[cfg(windows)]
pub use windows_core::{PCSTR, PCWSTR, PSTR, PWSTR};

#[cfg(windows)]
pub use windows::Win32::Foundation::*;
#[cfg(windows)]
pub use windows::Win32::System::Registry::*;

pub use crate::error::*;
pub use crate::format::*;
pub use crate::perf::api::*;
