//! Top-level class file model and parser (§4.2).

use crate::attributes::Attribute;
use crate::constants::ConstantPool;
use crate::errors::JvmError;
use crate::reader::Reader;

const MAGIC: u32 = 0xCAFE_BABE;
/// Java 7 and earlier, per this crate's documented version range.
const MAX_MAJOR_VERSION: u16 = 51;

#[derive(Debug, Clone)]
pub struct Field {
    pub access_flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub access_flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

impl Method {
    pub fn code(&self) -> Option<(&[u8], &[crate::attributes::ExceptionTableEntry], u16, u16)> {
        self.attributes.iter().find_map(|a| a.as_code())
    }
}

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub attributes: Vec<Attribute>,
    /// Total byte size of the input this class file was parsed from.
    pub size: u64,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<ClassFile, JvmError> {
        let mut reader = Reader::new(bytes);

        let magic = reader.read_u32()?;
        if magic != MAGIC {
            return Err(JvmError::BadMagic(magic));
        }

        let minor_version = reader.read_u16()?;
        let major_version = reader.read_u16()?;
        if major_version > MAX_MAJOR_VERSION {
            return Err(JvmError::UnsupportedVersion {
                major: major_version,
                minor: minor_version,
            });
        }

        let constant_pool_count = reader.read_u16()?;
        let constant_pool = ConstantPool::parse(&mut reader, constant_pool_count)?;
        let name_of = |index: u16| -> Result<String, JvmError> { Ok(constant_pool.utf8(index)?.to_string()) };

        let access_flags = reader.read_u16()?;
        let this_class = reader.read_u16()?;
        let super_class = reader.read_u16()?;

        let interfaces_count = reader.read_u16()?;
        let mut interfaces = Vec::with_capacity(interfaces_count as usize);
        for _ in 0..interfaces_count {
            interfaces.push(reader.read_u16()?);
        }

        let fields_count = reader.read_u16()?;
        let mut fields = Vec::with_capacity(fields_count as usize);
        for _ in 0..fields_count {
            fields.push(Self::parse_field(&mut reader, &name_of)?);
        }

        let methods_count = reader.read_u16()?;
        let mut methods = Vec::with_capacity(methods_count as usize);
        for _ in 0..methods_count {
            methods.push(Self::parse_method(&mut reader, &name_of)?);
        }

        let attributes_count = reader.read_u16()?;
        let mut attributes = Vec::with_capacity(attributes_count as usize);
        for _ in 0..attributes_count {
            attributes.push(Attribute::parse(&mut reader, &name_of)?);
        }

        reader.expect_exhausted()?;

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
            size: bytes.len() as u64,
        })
    }

    fn parse_field(
        reader: &mut Reader,
        name_of: &dyn Fn(u16) -> Result<String, JvmError>,
    ) -> Result<Field, JvmError> {
        let access_flags = reader.read_u16()?;
        let name_index = reader.read_u16()?;
        let descriptor_index = reader.read_u16()?;
        let attributes_count = reader.read_u16()?;
        let mut attributes = Vec::with_capacity(attributes_count as usize);
        for _ in 0..attributes_count {
            attributes.push(Attribute::parse(reader, name_of)?);
        }
        Ok(Field {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method(
        reader: &mut Reader,
        name_of: &dyn Fn(u16) -> Result<String, JvmError>,
    ) -> Result<Method, JvmError> {
        let access_flags = reader.read_u16()?;
        let name_index = reader.read_u16()?;
        let descriptor_index = reader.read_u16()?;
        let attributes_count = reader.read_u16()?;
        let mut attributes = Vec::with_capacity(attributes_count as usize);
        for _ in 0..attributes_count {
            attributes.push(Attribute::parse(reader, name_of)?);
        }
        Ok(Method {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    pub fn this_class_name(&self) -> Result<&str, JvmError> {
        self.constant_pool.class_name(self.this_class)
    }

    /// `super_class` is zero only for `java.lang.Object` (§3 invariant).
    pub fn super_class_name(&self) -> Result<Option<&str>, JvmError> {
        if self.super_class == 0 {
            Ok(None)
        } else {
            Ok(Some(self.constant_pool.class_name(self.super_class)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_magic() {
        let bytes = [0u8; 16];
        assert!(matches!(ClassFile::parse(&bytes), Err(JvmError::BadMagic(0))));
    }

    #[test]
    fn rejects_version_beyond_java_7() {
        let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 61];
        bytes.extend_from_slice(&[0, 1]); // constant_pool_count = 1 (empty pool)
        let result = ClassFile::parse(&bytes);
        assert!(matches!(
            result,
            Err(JvmError::UnsupportedVersion { major: 61, minor: 0 })
        ));
    }

    /// §8 scenario S1: minimal class file, pool count 1 (empty pool), zero
    /// interfaces/fields/methods/attributes.
    #[test]
    fn parses_minimal_class_file() {
        let bytes: Vec<u8> = vec![
            0xCA, 0xFE, 0xBA, 0xBE, // magic
            0x00, 0x00, // minor
            0x00, 0x32, // major = 50
            0x00, 0x01, // constant_pool_count = 1 (no entries)
            0x00, 0x00, // access_flags
            0x00, 0x00, // this_class
            0x00, 0x00, // super_class
            0x00, 0x00, // interfaces_count
            0x00, 0x00, // fields_count
            0x00, 0x00, // methods_count
            0x00, 0x00, // attributes_count
        ];
        let class_file = ClassFile::parse(&bytes).unwrap();
        assert_eq!(class_file.size, 26);
        assert_eq!(class_file.major_version, 50);
        assert!(class_file.fields.is_empty());
        assert!(class_file.methods.is_empty());
    }

    #[test]
    fn trailing_bytes_are_extra_data() {
        let mut bytes: Vec<u8> = vec![
            0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x32, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        bytes.push(0xFF);
        assert!(matches!(ClassFile::parse(&bytes), Err(JvmError::ExtraData { .. })));
    }
}
