use thiserror::Error;

/// The error taxonomy for every fallible operation in this crate.
///
/// `Unresolved` is collected by the classpath resolver rather than returned
/// from a `Result` — a symbol that fails to resolve does not abort the run,
/// it is reported alongside the rest of the output (see `classpath::Report`).
#[derive(Debug, Error)]
pub enum JvmError {
    #[error("truncated input: needed {needed} more byte(s) at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("extra data: {remaining} byte(s) left over after parsing")]
    ExtraData { remaining: usize },

    #[error("bad magic: expected 0xCAFEBABE, found {0:#010X}")]
    BadMagic(u32),

    #[error("unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("bad constant pool tag {0} at index {1}")]
    BadConstantTag(u8, u16),

    #[error("bad constant pool index {0}")]
    BadPoolIndex(u16),

    #[error("constant at index {index} was not of the expected kind: {expected}")]
    BadConstantKind { index: u16, expected: &'static str },

    #[error("bad descriptor: {0:?}")]
    BadDescriptor(String),

    #[error("bad bytecode: {0}")]
    BadBytecode(String),

    #[error("bad attribute {name:?}: declared length {declared} disagreed with payload")]
    BadAttribute { name: String, declared: u32 },

    #[error("bad archive: {0}")]
    BadArchive(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for JvmError {
    fn from(value: zip::result::ZipError) -> Self {
        JvmError::BadArchive(value.to_string())
    }
}
