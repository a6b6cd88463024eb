//! Counter metadata queries.
//!
//! Every native call is made twice: first with no output buffer to learn the size, then
//! with a freshly allocated buffer of that size. Buffers never outlive a single query.

use crate::error::*;
use crate::format::Encoding;
use crate::perf::api::*;

pub mod api;
pub mod english;
pub mod items;
pub mod lookup;
#[cfg(windows)]
pub mod native;
#[cfg(test)]
pub(crate) mod stub;

/// Entry point for native PDH queries.
///
/// Encoding is fixed at construction and applies to every call made through this value.
#[derive(Debug, Clone)]
pub struct Pdh<A> {
    api: A,
    encoding: Encoding,
}

impl<A: PdhApi> Pdh<A> {
    pub fn new(api: A, encoding: Encoding) -> Self {
        Pdh { api, encoding }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

#[cfg(windows)]
impl Pdh<native::NativePdh> {
    /// PDH of the current process, encoding taken from the environment.
    pub fn native() -> Self {
        Self::new(native::NativePdh, Encoding::from_env())
    }
}

/// Strings with interior NULs would be silently truncated by the native side.
fn check_arg(what: &str, value: Option<&str>) -> PdhResult<()> {
    match value {
        Some(value) if value.contains('\0') => Err(PdhError::new(PDH_INVALID_ARGUMENT)
            .with_comment(format!("{} contains NUL character: {:?}", what, value))),
        _ => Ok(()),
    }
}
