//! Symbol extraction (§4.5): defined and referenced symbols pulled out of a
//! parsed class file, the model `jnm` lists and `jldd` resolves against a
//! classpath.

use crate::access_flags::is_private;
use crate::bytecode::{self, Operand};
use crate::class_file::ClassFile;
use crate::descriptors::{fqcn, size_field_descriptor};
use crate::errors::JvmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    External,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Class,
    StaticField,
    InstanceField,
    Method,
    RefClass,
    RefStaticField,
    RefInstanceField,
    RefMethod,
}

impl SymbolKind {
    /// The `nm`-style kind character (§6): uppercase when external, lowercase
    /// when private (§8 property 5). Reference kinds reuse their defined
    /// counterpart's letter.
    pub fn letter(&self, visibility: Visibility) -> char {
        let upper = match self {
            SymbolKind::Class | SymbolKind::RefClass => 'C',
            SymbolKind::StaticField | SymbolKind::RefStaticField => 'D',
            SymbolKind::InstanceField | SymbolKind::RefInstanceField => 'I',
            SymbolKind::Method | SymbolKind::RefMethod => 'T',
        };
        match visibility {
            Visibility::External => upper,
            Visibility::Private => upper.to_ascii_lowercase(),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            SymbolKind::RefClass | SymbolKind::RefStaticField | SymbolKind::RefInstanceField | SymbolKind::RefMethod
        )
    }

    pub fn is_class(&self) -> bool {
        matches!(self, SymbolKind::Class | SymbolKind::RefClass)
    }
}

/// A defined or referenced entity (§3). Defined kinds carry `Some(value)`;
/// reference kinds always carry `None`.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub value: Option<u64>,
    pub kind: SymbolKind,
    pub visibility: Visibility,
    pub name: String,
    pub expanded_name: Option<String>,
}

impl Symbol {
    /// Equality per §3: (value, kind ignoring upper/lowercase, name). Two
    /// symbols that differ only in declared visibility compare equal.
    pub fn matches(&self, other: &Symbol) -> bool {
        self.value == other.value && kind_class(self.kind) == kind_class(other.kind) && self.name == other.name
    }
}

/// Collapses a reference kind onto its defined counterpart for §3's
/// kind-ignoring-case equality (a `RefClass` and a `Class` with the same name
/// are "the same symbol" for filter purposes).
fn kind_class(kind: SymbolKind) -> &'static str {
    match kind {
        SymbolKind::Class | SymbolKind::RefClass => "class",
        SymbolKind::StaticField | SymbolKind::RefStaticField => "static_field",
        SymbolKind::InstanceField | SymbolKind::RefInstanceField => "instance_field",
        SymbolKind::Method | SymbolKind::RefMethod => "method",
    }
}

fn visibility_of(access_flags: u16) -> Visibility {
    if is_private(access_flags) {
        Visibility::Private
    } else {
        Visibility::External
    }
}

/// Extracts every symbol defined by or referenced from `class`: one `Class`
/// symbol, one field symbol per field, one method symbol per method, and one
/// reference symbol per qualifying bytecode operand, in declaration order
/// (§4.6 "determinism": fields then methods, bytecode order preserved within
/// a method).
pub fn extract(class: &ClassFile) -> Result<Vec<Symbol>, JvmError> {
    let mut symbols = Vec::new();
    let class_name = fqcn(class.this_class_name()?);

    symbols.push(Symbol {
        value: Some(class.size),
        kind: SymbolKind::Class,
        visibility: visibility_of(class.access_flags),
        name: class_name.clone(),
        expanded_name: None,
    });

    for field in &class.fields {
        let name = class.constant_pool.utf8(field.name_index)?;
        let descriptor = class.constant_pool.utf8(field.descriptor_index)?;
        let size = size_field_descriptor(descriptor)?;
        let kind = if crate::access_flags::is_static(field.access_flags) {
            SymbolKind::StaticField
        } else {
            SymbolKind::InstanceField
        };
        symbols.push(Symbol {
            value: Some(size as u64),
            kind,
            visibility: visibility_of(field.access_flags),
            name: format!("{class_name}.{name}"),
            expanded_name: None,
        });
    }

    for method in &class.methods {
        let name = class.constant_pool.utf8(method.name_index)?;
        let code = method.code();
        symbols.push(Symbol {
            value: code.map(|(bytes, ..)| bytes.len() as u64),
            kind: SymbolKind::Method,
            visibility: visibility_of(method.access_flags),
            name: format!("{class_name}.{name}"),
            expanded_name: None,
        });

        if let Some((bytes, ..)) = code {
            for instr in bytecode::walk(bytes)? {
                if let Some(symbol) = reference_symbol(class, &instr)? {
                    symbols.push(symbol);
                }
            }
        }
    }

    Ok(symbols)
}

fn reference_symbol(class: &ClassFile, instr: &bytecode::Instruction) -> Result<Option<Symbol>, JvmError> {
    let pool = &class.constant_pool;
    match instr.mnemonic {
        "new" | "anewarray" | "checkcast" | "instanceof" | "multianewarray" => {
            let Some(Operand::PoolIndex(index)) = instr.operands.first() else {
                return Ok(None);
            };
            let name = pool.class_name(*index)?;
            // Array type descriptors (`[...`) are not a class dependency.
            if name.starts_with('[') {
                return Ok(None);
            }
            Ok(Some(ref_class(fqcn(name))))
        }
        "ldc" | "ldc_w" => {
            let Some(Operand::PoolIndex(index)) = instr.operands.first() else {
                return Ok(None);
            };
            // Open Question (a): only a Class constant target emits a symbol;
            // string/numeric literals are not a class dependency.
            if !pool.is_class_constant(*index) {
                return Ok(None);
            }
            let name = pool.class_name(*index)?;
            Ok(Some(ref_class(fqcn(name))))
        }
        "getfield" | "putfield" => member_ref(pool, instr, SymbolKind::RefInstanceField),
        "getstatic" | "putstatic" => member_ref(pool, instr, SymbolKind::RefStaticField),
        "invokestatic" | "invokevirtual" | "invokespecial" | "invokeinterface" => {
            member_ref(pool, instr, SymbolKind::RefMethod)
        }
        _ => Ok(None),
    }
}

fn ref_class(name: String) -> Symbol {
    Symbol {
        value: None,
        kind: SymbolKind::RefClass,
        visibility: Visibility::External,
        name,
        expanded_name: None,
    }
}

fn member_ref(
    pool: &crate::constants::ConstantPool,
    instr: &bytecode::Instruction,
    kind: SymbolKind,
) -> Result<Option<Symbol>, JvmError> {
    let Some(Operand::PoolIndex(index)) = instr.operands.first() else {
        return Ok(None);
    };
    let (class_name, member_name, _descriptor) = pool.member_ref(*index)?;
    Ok(Some(Symbol {
        value: None,
        kind,
        visibility: Visibility::External,
        name: format!("{}.{}", fqcn(class_name), member_name),
        expanded_name: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// §8 scenario S4: `public static int answer()` returning 42, code
    /// `10 2A AC` (bipush 42; ireturn), 3 bytes.
    #[test]
    fn class_with_one_static_method_emits_class_and_method_symbols() {
        // Pool: 1 Utf8 "p/Answer" 2 Class->1 3 Utf8 "answer" 4 Utf8 "()I"
        //       5 Utf8 "Code"
        let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 50];
        bytes.extend_from_slice(&6u16.to_be_bytes()); // constant_pool_count
        bytes.extend_from_slice(&[1, 0, 8]);
        bytes.extend_from_slice(b"p/Answer");
        bytes.extend_from_slice(&[7, 0, 1]); // Class -> #1
        bytes.extend_from_slice(&[1, 0, 6]);
        bytes.extend_from_slice(b"answer");
        bytes.extend_from_slice(&[1, 0, 3]);
        bytes.extend_from_slice(b"()I");
        bytes.extend_from_slice(&[1, 0, 4]);
        bytes.extend_from_slice(b"Code");
        bytes.extend_from_slice(&0x0001u16.to_be_bytes()); // access_flags (public)
        bytes.extend_from_slice(&2u16.to_be_bytes()); // this_class
        bytes.extend_from_slice(&0u16.to_be_bytes()); // super_class
        bytes.extend_from_slice(&0u16.to_be_bytes()); // interfaces_count
        bytes.extend_from_slice(&0u16.to_be_bytes()); // fields_count
        bytes.extend_from_slice(&1u16.to_be_bytes()); // methods_count
        bytes.extend_from_slice(&0x0009u16.to_be_bytes()); // public static
        bytes.extend_from_slice(&3u16.to_be_bytes()); // name_index -> "answer"
        bytes.extend_from_slice(&4u16.to_be_bytes()); // descriptor_index -> "()I"
        bytes.extend_from_slice(&1u16.to_be_bytes()); // attributes_count
        bytes.extend_from_slice(&5u16.to_be_bytes()); // name_index -> "Code"
        let mut code_attr = vec![];
        code_attr.extend_from_slice(&1u16.to_be_bytes()); // max_stack
        code_attr.extend_from_slice(&0u16.to_be_bytes()); // max_locals
        code_attr.extend_from_slice(&3u32.to_be_bytes()); // code_length
        code_attr.extend_from_slice(&[0x10, 0x2A, 0xAC]);
        code_attr.extend_from_slice(&0u16.to_be_bytes()); // exception_table_length
        code_attr.extend_from_slice(&0u16.to_be_bytes()); // attributes_count
        bytes.extend_from_slice(&(code_attr.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&code_attr);
        bytes.extend_from_slice(&0u16.to_be_bytes()); // class attributes_count

        let class = ClassFile::parse(&bytes).unwrap();
        let symbols = extract(&class).unwrap();
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].kind, SymbolKind::Class);
        assert_eq!(symbols[0].name, "p.Answer");
        assert_eq!(symbols[1].kind, SymbolKind::Method);
        assert_eq!(symbols[1].name, "p.Answer.answer");
        assert_eq!(symbols[1].value, Some(3));
        assert_eq!(symbols[1].visibility, Visibility::External);
    }

    #[test]
    fn abstract_method_has_no_code_and_null_value() {
        assert_eq!(SymbolKind::Method.letter(Visibility::External), 'T');
        assert_eq!(SymbolKind::Method.letter(Visibility::Private), 't');
    }
}
