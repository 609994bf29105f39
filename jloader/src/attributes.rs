//! Attribute decoding, scoped to the four variants this crate's tools read:
//! `Code` (bytecode + exception table), `Exceptions`, `SourceFile`, and a
//! passthrough `Unknown` for everything else a real class file carries
//! (`LineNumberTable`, annotations, `StackMapTable`, and so on) that neither
//! `jdump`, `jnm` nor `jldd` interpret.

use crate::errors::JvmError;
use crate::reader::Reader;

#[derive(Debug, Clone)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// Constant-pool index of the caught class, or 0 for "any" (`finally`).
    pub catch_type: u16,
}

#[derive(Debug, Clone)]
pub enum Attribute {
    Code {
        max_stack: u16,
        max_locals: u16,
        code: Vec<u8>,
        exception_table: Vec<ExceptionTableEntry>,
        attributes: Vec<Attribute>,
    },
    Exceptions {
        exception_index_table: Vec<u16>,
    },
    SourceFile {
        sourcefile_index: u16,
    },
    Unknown {
        name_index: u16,
        bytes: Vec<u8>,
    },
}

impl Attribute {
    /// Reads one `{name_index, attribute_length, info[attribute_length]}`
    /// record and dispatches on the Utf8 name. `name_of` resolves a
    /// constant-pool Utf8 index to its string without borrowing the whole
    /// pool into this module.
    pub fn parse(reader: &mut Reader, name_of: &dyn Fn(u16) -> Result<String, JvmError>) -> Result<Attribute, JvmError> {
        let name_index = reader.read_u16()?;
        let length = reader.read_u32()?;
        let name = name_of(name_index)?;
        let payload = reader.read_bytes(length as usize)?;
        log::trace!("attribute {name:?}: {length} byte(s)");
        let mut body = Reader::new(&payload);
        let attribute = match name.as_str() {
            "Code" => Self::parse_code(&mut body, name_of)?,
            "Exceptions" => Self::parse_exceptions(&mut body)?,
            "SourceFile" => Attribute::SourceFile {
                sourcefile_index: body.read_u16()?,
            },
            _ => {
                log::debug!("unrecognised attribute {name:?}, preserving {length} byte(s) as raw data");
                Attribute::Unknown {
                    name_index,
                    bytes: payload.clone(),
                }
            }
        };
        if !matches!(attribute, Attribute::Unknown { .. }) {
            body.expect_exhausted().map_err(|_| {
                log::warn!("attribute {name:?} declared length {length} but left {} byte(s) unconsumed", body.remaining());
                JvmError::BadAttribute {
                    name: name.clone(),
                    declared: length,
                }
            })?;
        }
        Ok(attribute)
    }

    fn parse_code(
        body: &mut Reader,
        name_of: &dyn Fn(u16) -> Result<String, JvmError>,
    ) -> Result<Attribute, JvmError> {
        let max_stack = body.read_u16()?;
        let max_locals = body.read_u16()?;
        let code_length = body.read_u32()?;
        let code = body.read_bytes(code_length as usize)?;

        let exception_table_length = body.read_u16()?;
        let mut exception_table = Vec::with_capacity(exception_table_length as usize);
        for _ in 0..exception_table_length {
            exception_table.push(ExceptionTableEntry {
                start_pc: body.read_u16()?,
                end_pc: body.read_u16()?,
                handler_pc: body.read_u16()?,
                catch_type: body.read_u16()?,
            });
        }

        let attributes_count = body.read_u16()?;
        let mut attributes = Vec::with_capacity(attributes_count as usize);
        for _ in 0..attributes_count {
            attributes.push(Attribute::parse(body, name_of)?);
        }

        Ok(Attribute::Code {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exceptions(body: &mut Reader) -> Result<Attribute, JvmError> {
        let count = body.read_u16()?;
        let mut exception_index_table = Vec::with_capacity(count as usize);
        for _ in 0..count {
            exception_index_table.push(body.read_u16()?);
        }
        Ok(Attribute::Exceptions { exception_index_table })
    }

    pub fn as_code(&self) -> Option<(&[u8], &[ExceptionTableEntry], u16, u16)> {
        match self {
            Attribute::Code {
                code,
                exception_table,
                max_stack,
                max_locals,
                ..
            } => Some((code, exception_table, *max_stack, *max_locals)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(table: &[(u16, &str)]) -> impl Fn(u16) -> Result<String, JvmError> + '_ {
        move |index| {
            table
                .iter()
                .find(|(i, _)| *i == index)
                .map(|(_, n)| n.to_string())
                .ok_or(JvmError::BadPoolIndex(index))
        }
    }

    #[test]
    fn parses_sourcefile_attribute() {
        let table = [(1, "SourceFile")];
        let mut bytes = vec![];
        bytes.extend_from_slice(&[0, 1]); // name_index
        bytes.extend_from_slice(&2u32.to_be_bytes()); // length
        bytes.extend_from_slice(&[0, 7]); // sourcefile_index
        let mut r = Reader::new(&bytes);
        let attr = Attribute::parse(&mut r, &names(&table)).unwrap();
        assert!(matches!(attr, Attribute::SourceFile { sourcefile_index: 7 }));
    }

    #[test]
    fn unknown_attribute_is_preserved_as_raw_bytes() {
        let table = [(1, "Exotic")];
        let mut bytes = vec![];
        bytes.extend_from_slice(&[0, 1]);
        bytes.extend_from_slice(&3u32.to_be_bytes());
        bytes.extend_from_slice(&[9, 9, 9]);
        let mut r = Reader::new(&bytes);
        let attr = Attribute::parse(&mut r, &names(&table)).unwrap();
        match attr {
            Attribute::Unknown { name_index, bytes } => {
                assert_eq!(name_index, 1);
                assert_eq!(bytes, vec![9, 9, 9]);
            }
            _ => panic!("expected Unknown"),
        }
    }

    #[test]
    fn parses_code_with_exception_table() {
        let table = [(1, "Code")];
        let mut payload = vec![];
        payload.extend_from_slice(&1u16.to_be_bytes()); // max_stack
        payload.extend_from_slice(&1u16.to_be_bytes()); // max_locals
        payload.extend_from_slice(&3u32.to_be_bytes()); // code_length
        payload.extend_from_slice(&[0x10, 0x2A, 0xAC]); // bipush 42; ireturn
        payload.extend_from_slice(&1u16.to_be_bytes()); // exception_table_length
        payload.extend_from_slice(&[0, 0, 0, 3, 0, 3, 0, 0]); // one entry, catch_type 0
        payload.extend_from_slice(&0u16.to_be_bytes()); // attributes_count

        let mut bytes = vec![];
        bytes.extend_from_slice(&[0, 1]);
        bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&payload);

        let mut r = Reader::new(&bytes);
        let attr = Attribute::parse(&mut r, &names(&table)).unwrap();
        let (code, exception_table, max_stack, max_locals) = attr.as_code().unwrap();
        assert_eq!(code, &[0x10, 0x2A, 0xAC]);
        assert_eq!(exception_table.len(), 1);
        assert_eq!(max_stack, 1);
        assert_eq!(max_locals, 1);
    }
}
