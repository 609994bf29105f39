//! The constant pool: a 1-indexed, tagged heterogeneous table at the head of
//! every class file.
//!
//! Scoped to the eleven tags this crate's tools actually need (Utf8 through
//! NameAndType); method handles, dynamic constants, modules and packages are
//! Java 7+ and beyond era features this crate does not model. An unrecognised
//! tag is a hard parse error (`BadConstantTag`), not a passthrough.

use crate::errors::JvmError;
use crate::reader::Reader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
}

impl Tag {
    fn from_u8(value: u8, index: u16) -> Result<Self, JvmError> {
        Ok(match value {
            1 => Tag::Utf8,
            3 => Tag::Integer,
            4 => Tag::Float,
            5 => Tag::Long,
            6 => Tag::Double,
            7 => Tag::Class,
            8 => Tag::String,
            9 => Tag::FieldRef,
            10 => Tag::MethodRef,
            11 => Tag::InterfaceMethodRef,
            12 => Tag::NameAndType,
            other => return Err(JvmError::BadConstantTag(other, index)),
        })
    }
}

/// A single entry in the constant pool.
///
/// `Padding` fills the slot immediately after a `Long` or `Double`; it is
/// never produced by a real class file tag, only synthesized by the parser
/// to preserve 1-based indexing (§3 "8-byte-slot rule").
#[derive(Debug, Clone)]
pub enum ConstantEntry {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    FieldRef { class_index: u16, name_and_type_index: u16 },
    MethodRef { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    Padding,
}

impl ConstantEntry {
    pub fn tag_name(&self) -> &'static str {
        match self {
            ConstantEntry::Utf8(_) => "Utf8",
            ConstantEntry::Integer(_) => "Integer",
            ConstantEntry::Float(_) => "Float",
            ConstantEntry::Long(_) => "Long",
            ConstantEntry::Double(_) => "Double",
            ConstantEntry::Class { .. } => "Class",
            ConstantEntry::String { .. } => "String",
            ConstantEntry::FieldRef { .. } => "Fieldref",
            ConstantEntry::MethodRef { .. } => "Methodref",
            ConstantEntry::InterfaceMethodRef { .. } => "InterfaceMethodref",
            ConstantEntry::NameAndType { .. } => "NameAndType",
            ConstantEntry::Padding => "Padding",
        }
    }
}

/// 1-indexed constant pool. Index 0 is never valid and is not stored.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<ConstantEntry>,
}

impl ConstantPool {
    /// `count` is the class file's `constant_pool_count`: entries occupy
    /// indices `1..count`, exactly as declared in the file.
    pub fn parse(reader: &mut Reader, count: u16) -> Result<ConstantPool, JvmError> {
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(ConstantEntry::Padding); // index 0, unused
        let mut index = 1u16;
        while index < count {
            let tag = Tag::from_u8(reader.read_u8()?, index)?;
            log::trace!("constant pool entry #{index}: tag {tag:?} at offset {}", reader.position());
            let entry = match tag {
                Tag::Utf8 => {
                    let length = reader.read_u16()? as usize;
                    let bytes = reader.read_bytes(length)?;
                    ConstantEntry::Utf8(decode_modified_utf8(&bytes))
                }
                Tag::Integer => ConstantEntry::Integer(reader.read_i32()?),
                Tag::Float => ConstantEntry::Float(reader.read_f32()?),
                Tag::Long => ConstantEntry::Long(reader.read_i64()?),
                Tag::Double => ConstantEntry::Double(reader.read_f64()?),
                Tag::Class => ConstantEntry::Class {
                    name_index: reader.read_u16()?,
                },
                Tag::String => ConstantEntry::String {
                    string_index: reader.read_u16()?,
                },
                Tag::FieldRef => ConstantEntry::FieldRef {
                    class_index: reader.read_u16()?,
                    name_and_type_index: reader.read_u16()?,
                },
                Tag::MethodRef => ConstantEntry::MethodRef {
                    class_index: reader.read_u16()?,
                    name_and_type_index: reader.read_u16()?,
                },
                Tag::InterfaceMethodRef => ConstantEntry::InterfaceMethodRef {
                    class_index: reader.read_u16()?,
                    name_and_type_index: reader.read_u16()?,
                },
                Tag::NameAndType => ConstantEntry::NameAndType {
                    name_index: reader.read_u16()?,
                    descriptor_index: reader.read_u16()?,
                },
            };
            let occupies_two_slots = matches!(entry, ConstantEntry::Long(_) | ConstantEntry::Double(_));
            entries.push(entry);
            index += 1;
            if occupies_two_slots {
                entries.push(ConstantEntry::Padding);
                index += 1;
            }
        }
        log::debug!("constant pool parsed: {} slot(s)", entries.len());
        Ok(ConstantPool { entries })
    }

    /// Number of 1-based slots, including padding slots. Equals the class
    /// file's `constant_pool_count`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    pub fn get(&self, index: u16) -> Result<&ConstantEntry, JvmError> {
        match self.entries.get(index as usize) {
            Some(ConstantEntry::Padding) | None => {
                log::warn!("bad constant pool index {index} (pool has {} slot(s))", self.entries.len());
                Err(JvmError::BadPoolIndex(index))
            }
            Some(entry) => Ok(entry),
        }
    }

    pub fn utf8(&self, index: u16) -> Result<&str, JvmError> {
        match self.get(index)? {
            ConstantEntry::Utf8(s) => Ok(s.as_str()),
            _ => Err(JvmError::BadConstantKind {
                index,
                expected: "Utf8",
            }),
        }
    }

    pub fn class_name(&self, index: u16) -> Result<&str, JvmError> {
        match self.get(index)? {
            ConstantEntry::Class { name_index } => self.utf8(*name_index),
            _ => Err(JvmError::BadConstantKind {
                index,
                expected: "Class",
            }),
        }
    }

    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str), JvmError> {
        match self.get(index)? {
            ConstantEntry::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            _ => Err(JvmError::BadConstantKind {
                index,
                expected: "NameAndType",
            }),
        }
    }

    /// Resolves a FieldRef/MethodRef/InterfaceMethodRef-shaped entry into
    /// (owning class fqcn-internal-form, member name, member descriptor).
    pub fn member_ref(&self, index: u16) -> Result<(&str, &str, &str), JvmError> {
        let (class_index, nat_index) = match self.get(index)? {
            ConstantEntry::FieldRef {
                class_index,
                name_and_type_index,
            }
            | ConstantEntry::MethodRef {
                class_index,
                name_and_type_index,
            }
            | ConstantEntry::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => (*class_index, *name_and_type_index),
            _ => {
                return Err(JvmError::BadConstantKind {
                    index,
                    expected: "FieldRef/MethodRef/InterfaceMethodRef",
                })
            }
        };
        let class_name = self.class_name(class_index)?;
        let (name, descriptor) = self.name_and_type(nat_index)?;
        Ok((class_name, name, descriptor))
    }

    pub fn is_class_constant(&self, index: u16) -> bool {
        matches!(self.entries.get(index as usize), Some(ConstantEntry::Class { .. }))
    }
}

/// Class files store Utf8 in a modified encoding (embedded NUL as two bytes,
/// supplementary characters as surrogate pairs). Ordinary ASCII/BMP text,
/// which is everything this crate's test fixtures and almost all real class
/// files use for identifiers, decodes identically to standard UTF-8; fall
/// back to lossy decoding rather than rejecting the rare exotic case.
fn decode_modified_utf8(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(bytes: &[u8], count: u16) -> ConstantPool {
        let mut r = Reader::new(bytes);
        ConstantPool::parse(&mut r, count).unwrap()
    }

    #[test]
    fn utf8_entry_round_trips() {
        let bytes = [1, 0, 5, b'h', b'e', b'l', b'l', b'o'];
        let pool = parse(&bytes, 2);
        assert_eq!(pool.utf8(1).unwrap(), "hello");
    }

    #[test]
    fn long_consumes_two_slots() {
        // index 1: Long; index 2: padding (sentinel); index 3: Utf8 "x"
        let mut bytes = vec![5u8];
        bytes.extend_from_slice(&1i64.to_be_bytes());
        bytes.extend_from_slice(&[1, 0, 1, b'x']);
        let pool = parse(&bytes, 4);
        assert_eq!(pool.len(), 4);
        assert!(matches!(pool.get(2), Err(JvmError::BadPoolIndex(2))));
        assert_eq!(pool.utf8(3).unwrap(), "x");
    }

    #[test]
    fn bad_tag_is_rejected() {
        let bytes = [99u8];
        let mut r = Reader::new(&bytes);
        assert!(matches!(
            ConstantPool::parse(&mut r, 2),
            Err(JvmError::BadConstantTag(99, 1))
        ));
    }

    #[test]
    fn member_ref_resolves_through_class_and_name_and_type() {
        // 1: Class -> name_index 2
        // 2: Utf8 "Main"
        // 3: NameAndType name_index 4, descriptor_index 5
        // 4: Utf8 "main"
        // 5: Utf8 "()V"
        // 6: Methodref class_index 1, name_and_type_index 3
        let mut bytes = vec![];
        bytes.extend_from_slice(&[7, 0, 2]);
        bytes.extend_from_slice(&[1, 0, 4, b'M', b'a', b'i', b'n']);
        bytes.extend_from_slice(&[12, 0, 4, 0, 5]);
        bytes.extend_from_slice(&[1, 0, 4, b'm', b'a', b'i', b'n']);
        bytes.extend_from_slice(&[1, 0, 3, b'(', b')', b'V']);
        bytes.extend_from_slice(&[10, 0, 1, 0, 3]);
        let pool = parse(&bytes, 7);
        let (class_name, name, descriptor) = pool.member_ref(6).unwrap();
        assert_eq!(class_name, "Main");
        assert_eq!(name, "main");
        assert_eq!(descriptor, "()V");
    }
}
