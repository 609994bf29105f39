pub mod access_flags;
/// [Attributes](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#%5B%7B%22num%22%3A1244%2C%22gen%22%3A0%7D%2C%7B%22name%22%3A%22XYZ%22%7D%2C72%2C564%2Cnull%5D)
pub mod attributes;
pub mod archive;
pub mod bytecode;
/// [Class File Format](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#%5B%7B%22num%22%3A376%2C%22gen%22%3A0%7D%2C%7B%22name%22%3A%22XYZ%22%7D%2C72%2C590%2Cnull%5D)
pub mod class_file;
pub mod classpath;
/// [Constants](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#%5B%7B%22num%22%3A2201%2C%22gen%22%3A0%7D%2C%7B%22name%22%3A%22XYZ%22%7D%2C72%2C256%2Cnull%5D)
pub mod constants;
/// [Descriptors](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#%5B%7B%22num%22%3A677%2C%22gen%22%3A0%7D%2C%7B%22name%22%3A%22XYZ%22%7D%2C72%2C448%2Cnull%5D)
pub mod descriptors;
pub mod errors;
pub mod pipeline;
pub mod reader;
pub mod render;
pub mod symbols;

pub use errors::JvmError;

use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide pointer size, in bytes, used by `descriptors::size_field_descriptor`
/// for reference and array types. Defaults to 64-bit. Set once by a CLI front-end
/// (`jnm --m32`/`--m64`) before any symbol extraction runs; never mutated afterwards.
static POINTER_SIZE: AtomicUsize = AtomicUsize::new(8);

/// Sets the process-wide pointer size. Intended to be called once, before parsing
/// or symbol extraction begins.
pub fn set_pointer_size(bytes: usize) {
    POINTER_SIZE.store(bytes, Ordering::Relaxed);
}

/// Reads the process-wide pointer size.
pub fn pointer_size() -> usize {
    POINTER_SIZE.load(Ordering::Relaxed)
}
