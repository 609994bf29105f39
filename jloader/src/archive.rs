//! Jar (ZIP) archive reader (§4.7): enumerates class entries and extracts the
//! `Class-Path:` header from `META-INF/MANIFEST.MF`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;

use crate::class_file::ClassFile;
use crate::errors::JvmError;

/// One `.class` entry read out of a jar, alongside its parse result. A class
/// entry that fails to parse is reported per-entry (§4.7), not as a fatal
/// archive error, so the archive reader carries the error inline rather than
/// aborting iteration.
pub struct ClassEntry {
    pub name: String,
    pub result: Result<ClassFile, JvmError>,
}

pub struct Archive {
    inner: ZipArchive<File>,
}

impl Archive {
    pub fn open(path: &Path) -> Result<Archive, JvmError> {
        let file = File::open(path)?;
        let inner = ZipArchive::new(file)?;
        Ok(Archive { inner })
    }

    /// Enumerates every entry ending in `.class`, parsing each one. Order
    /// matches the archive's own directory order.
    pub fn class_entries(&mut self) -> Result<Vec<ClassEntry>, JvmError> {
        let mut out = Vec::new();
        for i in 0..self.inner.len() {
            let mut entry = self.inner.by_index(i)?;
            if !entry.is_file() || !entry.name().ends_with(".class") {
                continue;
            }
            let name = entry.name().to_string();
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            out.push(ClassEntry {
                name,
                result: ClassFile::parse(&bytes),
            });
        }
        Ok(out)
    }

    /// Reads and parses `META-INF/MANIFEST.MF` if present, returning the
    /// `Class-Path:` header's entries (space-separated relative paths to
    /// sibling jars). Returns an empty list when there is no manifest or no
    /// `Class-Path:` header.
    pub fn manifest_class_path(&mut self) -> Result<Vec<String>, JvmError> {
        let mut text = String::new();
        match self.inner.by_name("META-INF/MANIFEST.MF") {
            Ok(mut entry) => {
                entry.read_to_string(&mut text)?;
            }
            Err(zip::result::ZipError::FileNotFound) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        }
        let headers = parse_manifest_headers(&text);
        Ok(headers
            .get("Class-Path")
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default())
    }
}

/// RFC 822-like manifest parsing: a header is `Name: value`; a continuation
/// line starts with a single space and is appended to the previous header's
/// value with the leading space stripped.
fn parse_manifest_headers(text: &str) -> std::collections::HashMap<String, String> {
    let mut headers = std::collections::HashMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(' ') {
            if let Some(name) = &current {
                if let Some(value) = headers.get_mut(name) {
                    let value: &mut String = value;
                    value.push_str(rest);
                }
            }
            continue;
        }
        if line.is_empty() {
            current = None;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_string();
            let value = value.trim_start().to_string();
            headers.insert(name.clone(), value);
            current = Some(name);
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_class_path_header_with_continuation() {
        let manifest = "Manifest-Version: 1.0\r\nClass-Path: a.jar b.jar\r\n c.jar\r\n\r\n";
        let headers = parse_manifest_headers(manifest);
        assert_eq!(headers.get("Class-Path").unwrap(), "a.jar b.jarc.jar");
    }

    #[test]
    fn missing_class_path_header_yields_empty_list() {
        let headers = parse_manifest_headers("Manifest-Version: 1.0\n");
        assert!(headers.get("Class-Path").is_none());
    }
}
