//! Field- and method-descriptor grammar: parsing, demangling to
//! human-readable dotted form, and byte-size computation.

use crate::errors::JvmError;
use crate::pointer_size;

/// Converts an internal slash-form class name to dotted form. Tolerates an
/// optional surrounding `L...;` (the shape a Class constant's name never
/// carries, but callers sometimes hold a raw field descriptor instead).
pub fn fqcn(name: &str) -> String {
    let inner = name
        .strip_prefix('L')
        .and_then(|s| s.strip_suffix(';'))
        .unwrap_or(name);
    inner.replace('/', ".")
}

/// Parses one field descriptor starting at byte 0 of `s` and renders it in
/// dotted, bracket-suffixed form (`java.lang.String`, `int[]`, `int[][]`).
/// Returns the rendered form and the number of bytes consumed, so a caller
/// walking a longer buffer (method descriptor parameters) can advance past
/// it.
pub fn demangle_field_descriptor(s: &str) -> Result<(String, usize), JvmError> {
    let bytes = s.as_bytes();
    let mut dimensions = 0usize;
    let mut pos = 0usize;
    while pos < bytes.len() && bytes[pos] == b'[' {
        dimensions += 1;
        pos += 1;
    }
    if pos >= bytes.len() {
        return Err(JvmError::BadDescriptor(s.to_string()));
    }
    let (base, consumed) = match bytes[pos] {
        b'B' => ("byte", 1),
        b'C' => ("char", 1),
        b'D' => ("double", 1),
        b'F' => ("float", 1),
        b'I' => ("int", 1),
        b'J' => ("long", 1),
        b'S' => ("short", 1),
        b'Z' => ("boolean", 1),
        b'L' => {
            let end = bytes[pos..]
                .iter()
                .position(|&b| b == b';')
                .ok_or_else(|| JvmError::BadDescriptor(s.to_string()))?;
            let internal = &s[pos + 1..pos + end];
            return Ok((
                format!("{}{}", internal.replace('/', "."), "[]".repeat(dimensions)),
                pos + end + 1,
            ));
        }
        _ => return Err(JvmError::BadDescriptor(s.to_string())),
    };
    Ok((format!("{base}{}", "[]".repeat(dimensions)), pos + consumed))
}

/// Splits `(<param-desc>*)<return-desc>` into rendered parameter types and a
/// rendered return type (`"void"` for `V`).
pub fn demangle_method_descriptor(s: &str) -> Result<(Vec<String>, String), JvmError> {
    let body = s
        .strip_prefix('(')
        .ok_or_else(|| JvmError::BadDescriptor(s.to_string()))?;
    let close = body
        .find(')')
        .ok_or_else(|| JvmError::BadDescriptor(s.to_string()))?;
    let (params_str, rest) = body.split_at(close);
    let return_str = &rest[1..]; // skip ')'

    let mut params = vec![];
    let mut remaining = params_str;
    while !remaining.is_empty() {
        let (rendered, consumed) = demangle_field_descriptor(remaining)?;
        params.push(rendered);
        remaining = &remaining[consumed..];
    }

    let return_type = if return_str == "V" {
        "void".to_string()
    } else {
        let (rendered, consumed) = demangle_field_descriptor(return_str)?;
        if consumed != return_str.len() {
            return Err(JvmError::BadDescriptor(s.to_string()));
        }
        rendered
    };

    Ok((params, return_type))
}

/// Byte size of a field of the given descriptor. Per §4.3, depends only on
/// the first character after any `[` prefix: an array is always a reference
/// (pointer-sized), regardless of its element type.
pub fn size_field_descriptor(s: &str) -> Result<usize, JvmError> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return Err(JvmError::BadDescriptor(s.to_string()));
    }
    if bytes[0] == b'[' {
        return Ok(pointer_size());
    }
    match bytes[0] {
        b'J' | b'D' => Ok(8),
        b'B' | b'Z' => Ok(1),
        b'S' | b'C' => Ok(2),
        b'I' | b'F' => Ok(4),
        b'L' => Ok(pointer_size()),
        _ => Err(JvmError::BadDescriptor(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fqcn_strips_descriptor_wrapper_and_translates_separators() {
        assert_eq!(fqcn("java/lang/String"), "java.lang.String");
        assert_eq!(fqcn("Ljava/lang/String;"), "java.lang.String");
    }

    #[test]
    fn demangles_array_of_object() {
        let (rendered, consumed) = demangle_field_descriptor("[Ljava/lang/String;").unwrap();
        assert_eq!(rendered, "java.lang.String[]");
        assert_eq!(consumed, "[Ljava/lang/String;".len());
    }

    #[test]
    fn demangles_method_descriptor_from_s2() {
        let (params, ret) = demangle_method_descriptor("(Ljava/lang/String;[I)V").unwrap();
        assert_eq!(params, vec!["java.lang.String".to_string(), "int[]".to_string()]);
        assert_eq!(ret, "void");
    }

    #[test]
    fn size_depends_only_on_leading_char_after_brackets() {
        assert_eq!(size_field_descriptor("J").unwrap(), 8);
        assert_eq!(size_field_descriptor("Z").unwrap(), 1);
        assert_eq!(size_field_descriptor("[[I").unwrap(), pointer_size());
    }

    #[test]
    fn malformed_descriptor_is_an_error() {
        assert!(demangle_field_descriptor("Q").is_err());
        assert!(demangle_field_descriptor("Ljava/lang/String").is_err());
    }
}
