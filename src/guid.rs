//! Registry-style GUID strings: `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}`.

use uuid::Uuid;

/// Formats a GUID given in its native field layout (uppercase, braced).
pub fn guid_string(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> String {
    format!(
        "{:X}",
        Uuid::from_fields(data1, data2, data3, &data4).braced()
    )
}

/// UTF-16 flavor of [`guid_string`], without a terminator.
pub fn guid_string_wide(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Vec<u16> {
    guid_string(data1, data2, data3, data4).encode_utf16().collect()
}

/// Parses the braced form (either case) back into its native fields.
pub fn parse_guid(s: &str) -> Option<(u32, u16, u16, [u8; 8])> {
    let inner = s.strip_prefix('{')?.strip_suffix('}')?;
    let u = Uuid::try_parse(inner).ok()?;
    // the plain dashed form is the only one allowed between the braces
    if inner.len() != 36 {
        return None;
    }

    let (d1, d2, d3, d4) = u.as_fields();
    Some((d1, d2, d3, *d4))
}
