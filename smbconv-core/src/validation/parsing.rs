//! Parsing utilities for identifiers and numbers in text form
//!
//! Pure parsing functions with no I/O and no allocation, used by the
//! configuration loader and the command line.

use crate::format::Guid;
use crate::ConvError;

/// Parse a GUID in the form `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`
///
/// Surrounding braces are accepted. Hex digits may be either case.
pub fn parse_guid(text: &str) -> Result<Guid, ConvError> {
    let text = text.trim();
    let text = text
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .unwrap_or(text);

    let bytes = text.as_bytes();
    if bytes.len() != 36 {
        return Err(ConvError::InvalidSyntax);
    }
    for &dash in &[8usize, 13, 18, 23] {
        if bytes[dash] != b'-' {
            return Err(ConvError::InvalidSyntax);
        }
    }

    let data1 = parse_hex(&text[0..8])? as u32;
    let data2 = parse_hex(&text[9..13])? as u16;
    let data3 = parse_hex(&text[14..18])? as u16;

    let mut data4 = [0u8; 8];
    let clock = parse_hex(&text[19..23])?;
    data4[0] = (clock >> 8) as u8;
    data4[1] = clock as u8;
    let node = parse_hex(&text[24..36])?;
    for (i, byte) in data4[2..].iter_mut().enumerate() {
        *byte = (node >> (8 * (5 - i))) as u8;
    }

    Ok(Guid::from_fields(data1, data2, data3, data4))
}

/// Parse an unsigned hexadecimal number of at most 16 digits
pub fn parse_hex(s: &str) -> Result<u64, ConvError> {
    if s.is_empty() || s.len() > 16 {
        return Err(ConvError::InvalidSyntax);
    }

    let mut result: u64 = 0;
    for byte in s.bytes() {
        let digit = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => return Err(ConvError::InvalidSyntax),
        };
        result = (result << 4) | digit as u64;
    }

    Ok(result)
}

/// Parse a schema id given as decimal or `0x`-prefixed hexadecimal
pub fn parse_schema_id(s: &str) -> Result<u8, ConvError> {
    let s = s.trim();
    let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        parse_hex(hex)?
    } else {
        parse_decimal(s)?
    };

    u8::try_from(value).map_err(|_| ConvError::ValueOutOfRange)
}

fn parse_decimal(s: &str) -> Result<u64, ConvError> {
    if s.is_empty() {
        return Err(ConvError::InvalidSyntax);
    }

    let mut result: u64 = 0;
    for byte in s.bytes() {
        if !byte.is_ascii_digit() {
            return Err(ConvError::InvalidSyntax);
        }
        result = result
            .checked_mul(10)
            .and_then(|r| r.checked_add((byte - b'0') as u64))
            .ok_or(ConvError::ValueOutOfRange)?;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_guid() {
        let guid = parse_guid("772484B2-7482-4b91-9F9A-AD43F81C5881").unwrap();
        assert_eq!(guid.data1, 0x772484B2);
        assert_eq!(guid.data2, 0x7482);
        assert_eq!(guid.data3, 0x4b91);
        assert_eq!(guid.data4, [0x9F, 0x9A, 0xAD, 0x43, 0xF8, 0x1C, 0x58, 0x81]);

        let braced = parse_guid("{772484b2-7482-4b91-9f9a-ad43f81c5881}").unwrap();
        assert_eq!(braced, guid);
    }

    #[test]
    fn test_parse_guid_rejects_malformed() {
        assert_eq!(parse_guid(""), Err(ConvError::InvalidSyntax));
        assert_eq!(
            parse_guid("772484B2-7482-4b91-9F9A_AD43F81C5881"),
            Err(ConvError::InvalidSyntax)
        );
        assert_eq!(
            parse_guid("772484B2-7482-4b91-9F9A-AD43F81C588G"),
            Err(ConvError::InvalidSyntax)
        );
    }

    #[test]
    fn test_parse_schema_id() {
        assert_eq!(parse_schema_id("17"), Ok(17));
        assert_eq!(parse_schema_id("0x80"), Ok(0x80));
        assert_eq!(parse_schema_id("256"), Err(ConvError::ValueOutOfRange));
        assert_eq!(parse_schema_id("x1"), Err(ConvError::InvalidSyntax));
    }
}
