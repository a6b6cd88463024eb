use std::env;

use widestring::{U16CStr, U16Str};

/// Environment variable which switches the whole process to narrow (ANSI) PDH entry points.
pub const ASCII_ENV_VAR: &str = "PDH_UTIL_ASCII";

/// Character encoding of every string that crosses the native boundary.
///
/// Sizes reported by PDH are counted in encoding units, not in bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum Encoding {
    /// Single-byte characters, `*A` family of functions.
    Narrow,
    /// UTF-16 code units, `*W` family of functions.
    #[default]
    Wide,
}

impl Encoding {
    /// Size of a single character unit in bytes.
    pub fn unit_size(&self) -> usize {
        match self {
            Encoding::Narrow => 1,
            Encoding::Wide => 2,
        }
    }

    /// Pick encoding from [`ASCII_ENV_VAR`]. Meant to be called once at startup.
    pub fn from_env() -> Self {
        Self::from_flag(env::var(ASCII_ENV_VAR).ok().as_deref())
    }

    fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(str::trim) {
            Some(v)
                if ["1", "true", "yes", "on"]
                    .iter()
                    .any(|on| v.eq_ignore_ascii_case(on)) =>
            {
                Encoding::Narrow
            }
            _ => Encoding::Wide,
        }
    }

    /// Bytes needed to hold `units` characters.
    pub fn byte_len(&self, units: u32) -> usize {
        units as usize * self.unit_size()
    }
}

/// Decode one NUL-terminated string at the beginning of `buf`.
///
/// Returns the string and its length in encoding units, terminator excluded. When no
/// terminator is found, everything up to the end of the buffer is taken.
pub fn decode_c_string(buf: &[u8], encoding: Encoding) -> (String, usize) {
    match encoding {
        Encoding::Narrow => {
            let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
            (decode_ansi(&buf[..len]), len)
        }
        Encoding::Wide => {
            // trailing odd byte can not form a unit and is ignored by chunks_exact
            let units: Vec<u16> = buf
                .chunks_exact(2)
                .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
                .take_while(|&unit| unit != 0)
                .collect();
            (U16Str::from_slice(&units).to_string_lossy(), units.len())
        }
    }
}

/// Narrow PDH strings are in the ANSI code page of the system.
#[cfg(windows)]
pub fn decode_ansi(bytes: &[u8]) -> String {
    use windows::Win32::Globalization::{CP_ACP, MULTI_BYTE_TO_WIDE_CHAR_FLAGS, MultiByteToWideChar};

    if bytes.is_empty() {
        return String::new();
    }

    // SAFETY: both slices carry their own lengths
    let len = unsafe { MultiByteToWideChar(CP_ACP, MULTI_BYTE_TO_WIDE_CHAR_FLAGS(0), bytes, None) };
    if len > 0 {
        let mut units = vec![0u16; len as usize];
        let written = unsafe {
            MultiByteToWideChar(CP_ACP, MULTI_BYTE_TO_WIDE_CHAR_FLAGS(0), bytes, Some(&mut units))
        };
        if written > 0 {
            return U16Str::from_slice(&units[..written as usize]).to_string_lossy();
        }
    }
    log::debug!("MultiByteToWideChar failed for {} bytes, decoding as Windows-1252", bytes.len());
    decode_windows_1252(bytes)
}

/// There is no ANSI code page off Windows: valid UTF-8 is taken as is, anything else is
/// read as Windows-1252, the most common one.
#[cfg(not(windows))]
pub fn decode_ansi(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(string) => string.to_owned(),
        Err(_) => decode_windows_1252(bytes),
    }
}

fn decode_windows_1252(bytes: &[u8]) -> String {
    let (string, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
    string.into_owned()
}

/// Decode a multi-string: NUL-terminated entries followed by an empty entry.
///
/// Stops at the first empty entry or at the end of the buffer, whichever comes first.
pub fn decode_multi_string(buf: &[u8], encoding: Encoding) -> Vec<String> {
    let mut strings = Vec::new();
    let mut offset = 0;
    while offset < buf.len() {
        let (string, len) = decode_c_string(&buf[offset..], encoding);
        // list ends with double NUL
        if len == 0 {
            break;
        }
        strings.push(string);
        offset += (len + 1) * encoding.unit_size();
    }
    strings
}

/// Commonly used registry format uses 0u16 as a delimiter for UTF-16 strings
/// terminated by double 0u16 sequence.
///
/// Unlike [`decode_multi_string`], empty entries in the middle are preserved: the list ends
/// only where two NULs meet or where the input ends.
pub fn split_nul_delimited_double_nul_terminated(input: &U16Str) -> Vec<&U16CStr> {
    let mut strings = Vec::new();
    let mut rest = input.as_slice();
    while !rest.is_empty() {
        let len = match rest.iter().position(|&unit| unit == 0) {
            Some(len) => len,
            // unterminated tail is not a valid string
            None => break,
        };
        // SAFETY: `len` is the position of the first NUL, so there are no interior NULs
        let string = unsafe { U16CStr::from_slice_unchecked(&rest[..=len]) };
        strings.push(string);
        rest = &rest[len + 1..];
        // now `rest` starts right after NUL which terminates the `string`,
        // which is, either at the beginning of the new str, or at the second terminating NUL.
        if rest.first() == Some(&0) {
            break;
        }
    }
    strings
}
