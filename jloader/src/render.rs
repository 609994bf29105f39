//! Disassembler renderer (§4.9): textual transcription of a class file used
//! by `jdump`. Output format follows §6 literally where the spec fixes it
//! (the `Code:`/`Stack=.../Args_size=...` header line, the
//! `<pc>:\t<mnemonic>[\t<operands>][; //<suffix>]` bytecode listing) and
//! otherwise follows `javap -c`'s conventions, which is what a reader
//! diffing this tool's output against the real thing expects.

use std::fmt::Write as _;

use crate::access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
use crate::attributes::Attribute;
use crate::bytecode::{self, Operand};
use crate::class_file::{ClassFile, Field, Method};
use crate::constants::ConstantEntry;
use crate::descriptors::{demangle_field_descriptor, demangle_method_descriptor, fqcn};
use crate::errors::JvmError;

/// Renders the full `jdump` transcription of one class file.
pub fn render_class(class: &ClassFile) -> Result<String, JvmError> {
    let mut out = String::new();

    if let Some(source_file) = source_file_name(class)? {
        let _ = writeln!(out, "Compiled from \"{source_file}\"");
    }

    let class_name = fqcn(class.this_class_name()?);
    let access = class_access_description(class.access_flags);
    let mut header = String::new();
    if !access.is_empty() {
        header.push_str(&access);
        header.push(' ');
    }
    header.push_str("class ");
    header.push_str(&class_name);
    if let Some(super_name) = class.super_class_name()? {
        let _ = write!(header, " extends {}", fqcn(super_name));
    }
    if !class.interfaces.is_empty() {
        let names: Result<Vec<String>, JvmError> = class
            .interfaces
            .iter()
            .map(|&i| class.constant_pool.class_name(i).map(|n| fqcn(n)))
            .collect();
        let _ = write!(header, " implements {}", names?.join(", "));
    }
    header.push_str(" {");
    let _ = writeln!(out, "{header}");

    for field in &class.fields {
        render_field(class, field, &mut out)?;
    }

    for (i, method) in class.methods.iter().enumerate() {
        if i > 0 || !class.fields.is_empty() {
            let _ = writeln!(out);
        }
        render_method(class, method, &class_name, &mut out)?;
    }

    let _ = writeln!(out, "}}");

    render_constant_pool(class, &mut out)?;

    Ok(out)
}

fn source_file_name(class: &ClassFile) -> Result<Option<&str>, JvmError> {
    for attr in &class.attributes {
        if let Attribute::SourceFile { sourcefile_index } = attr {
            return Ok(Some(class.constant_pool.utf8(*sourcefile_index)?));
        }
    }
    Ok(None)
}

fn class_access_description(flags: u16) -> String {
    ClassAccessFlags::from_u16(flags)
        .into_iter()
        .map(|f| f.keyword())
        .filter(|kw| !kw.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_field(class: &ClassFile, field: &Field, out: &mut String) -> Result<(), JvmError> {
    let name = class.constant_pool.utf8(field.name_index)?;
    let descriptor = class.constant_pool.utf8(field.descriptor_index)?;
    let (type_name, consumed) = demangle_field_descriptor(descriptor)?;
    debug_assert_eq!(consumed, descriptor.len());
    let access = FieldAccessFlags::from_u16(field.access_flags)
        .into_iter()
        .map(|f| f.keyword())
        .filter(|kw| !kw.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if access.is_empty() {
        let _ = writeln!(out, "  {type_name} {name};");
    } else {
        let _ = writeln!(out, "  {access} {type_name} {name};");
    }
    let _ = writeln!(out, "    Signature: {descriptor}");
    Ok(())
}

fn render_method(class: &ClassFile, method: &Method, class_name: &str, out: &mut String) -> Result<(), JvmError> {
    let name = class.constant_pool.utf8(method.name_index)?;
    let descriptor = class.constant_pool.utf8(method.descriptor_index)?;
    let (params, return_type) = demangle_method_descriptor(descriptor)?;
    let is_static = crate::access_flags::is_static(method.access_flags);

    let access = MethodAccessFlags::from_u16(method.access_flags)
        .into_iter()
        .map(|f| f.keyword())
        .filter(|kw| !kw.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let access_prefix = if access.is_empty() { String::new() } else { format!("{access} ") };

    let signature = match name {
        "<init>" => format!("{access_prefix}{class_name}({})", params.join(", ")),
        "<clinit>" => format!("{access_prefix}{{}}"),
        _ => format!("{access_prefix}{return_type} {name}({})", params.join(", ")),
    };
    let mut line = format!("  {signature}");

    let exceptions = method.attributes.iter().find_map(|a| match a {
        Attribute::Exceptions { exception_index_table } => Some(exception_index_table),
        _ => None,
    });
    if let Some(indices) = exceptions {
        if !indices.is_empty() {
            let names: Result<Vec<String>, JvmError> = indices
                .iter()
                .map(|&i| class.constant_pool.class_name(i).map(|n| fqcn(n)))
                .collect();
            let _ = write!(line, " throws {}", names?.join(", "));
        }
    }
    let _ = writeln!(out, "{line};");

    if let Some((code, exception_table, max_stack, max_locals)) = method.code() {
        let args_size = count_argument_slots(&params, is_static);
        let _ = writeln!(out, "    Code:");
        let _ = writeln!(out, "      Stack={max_stack}, Locals={max_locals}, Args_size={args_size}");

        for instr in bytecode::walk(code)? {
            render_instruction(class, &instr, out)?;
        }

        if !exception_table.is_empty() {
            let _ = writeln!(out, "    Exception table:");
            let _ = writeln!(out, "       from   to  target type");
            for entry in exception_table {
                let catch_type = if entry.catch_type == 0 {
                    "any".to_string()
                } else {
                    fqcn(class.constant_pool.class_name(entry.catch_type)?)
                };
                let _ = writeln!(
                    out,
                    "      {:>6} {:>4} {:>6}   Class {catch_type}",
                    entry.start_pc, entry.end_pc, entry.handler_pc
                );
            }
        }
    }

    Ok(())
}

/// Method descriptor parameter count in local-variable slots: `long`/`double`
/// occupy two, everything else one; plus a leading `this` slot when the
/// method isn't static (§6 "argcount includes a leading this").
fn count_argument_slots(params: &[String], is_static: bool) -> usize {
    let mut slots = if is_static { 0 } else { 1 };
    for p in params {
        slots += if p == "long" || p == "double" { 2 } else { 1 };
    }
    slots
}

fn render_instruction(class: &ClassFile, instr: &bytecode::Instruction, out: &mut String) -> Result<(), JvmError> {
    let operand_text = render_operands(instr);
    let comment = operand_comment(class, instr)?;

    let _ = write!(out, "   {}:\t{}", instr.pc, instr.mnemonic);
    if !operand_text.is_empty() {
        let _ = write!(out, "\t{operand_text}");
    }
    if let Some(comment) = comment {
        let _ = write!(out, "; //{comment}");
    }
    let _ = writeln!(out);
    Ok(())
}

fn render_operands(instr: &bytecode::Instruction) -> String {
    match instr.mnemonic {
        "tableswitch" => {
            let (low, high, default, offsets) = tableswitch_fields(instr);
            let mut s = format!("{{ //{low} to {high}");
            for (i, offset) in offsets.iter().enumerate() {
                let _ = write!(s, "\n\t\t\t{}: {offset};", low + i as i32);
            }
            let _ = write!(s, "\n\t\t\tdefault: {default} }}");
            s
        }
        "lookupswitch" => {
            let (default, pairs) = lookupswitch_fields(instr);
            let mut s = String::from("{ // npairs");
            for (m, offset) in &pairs {
                let _ = write!(s, "\n\t\t\t{m}: {offset};");
            }
            let _ = write!(s, "\n\t\t\tdefault: {default} }}");
            s
        }
        _ => instr
            .operands
            .iter()
            .map(render_operand)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn render_operand(operand: &Operand) -> String {
    match operand {
        Operand::PoolIndex(i) => format!("#{i}"),
        Operand::Local(l) => format!("{l}"),
        Operand::BranchTarget(pc) => format!("{pc}"),
        Operand::ArrayType(code) => array_type_name(*code).to_string(),
        Operand::Immediate(v) => format!("{v}"),
    }
}

fn array_type_name(code: u8) -> &'static str {
    // §4.4 `newarray` array-type codes (JVM spec Table 6.5.newarray-A).
    match code {
        4 => "boolean",
        5 => "char",
        6 => "float",
        7 => "double",
        8 => "byte",
        9 => "short",
        10 => "int",
        11 => "long",
        _ => "unknown",
    }
}

fn tableswitch_fields(instr: &bytecode::Instruction) -> (i32, i32, i32, Vec<i32>) {
    let low = match instr.operands[0] {
        Operand::Immediate(v) => v,
        _ => 0,
    };
    let high = match instr.operands[1] {
        Operand::Immediate(v) => v,
        _ => 0,
    };
    let default = match instr.operands[2] {
        Operand::BranchTarget(v) => v,
        _ => 0,
    };
    let offsets = instr.operands[3..]
        .iter()
        .map(|op| match op {
            Operand::BranchTarget(v) => *v,
            _ => 0,
        })
        .collect();
    (low, high, default, offsets)
}

fn lookupswitch_fields(instr: &bytecode::Instruction) -> (i32, Vec<(i32, i32)>) {
    let default = match instr.operands[0] {
        Operand::BranchTarget(v) => v,
        _ => 0,
    };
    let mut pairs = Vec::new();
    let mut i = 1;
    while i + 1 < instr.operands.len() {
        let m = match instr.operands[i] {
            Operand::Immediate(v) => v,
            _ => 0,
        };
        let offset = match instr.operands[i + 1] {
            Operand::BranchTarget(v) => v,
            _ => 0,
        };
        pairs.push((m, offset));
        i += 2;
    }
    (default, pairs)
}

/// The `; //<suffix>` comment trailing a `Pool`-referencing instruction:
/// `// Method`/`// Field`/`// InterfaceMethod`/`// class`/`// String` plus
/// the resolved name, matching `javap -c`'s constant-pool annotations.
fn operand_comment(class: &ClassFile, instr: &bytecode::Instruction) -> Result<Option<String>, JvmError> {
    let Some(Operand::PoolIndex(index)) = instr.operands.first() else {
        return Ok(None);
    };
    let pool = &class.constant_pool;
    let comment = match instr.mnemonic {
        "new" | "anewarray" | "checkcast" | "instanceof" | "multianewarray" => {
            format!(" class {}", fqcn(pool.class_name(*index)?))
        }
        "ldc" | "ldc_w" | "ldc2_w" => match pool.get(*index)? {
            ConstantEntry::String { string_index } => format!(" String {}", pool.utf8(*string_index)?),
            ConstantEntry::Class { .. } => format!(" class {}", fqcn(pool.class_name(*index)?)),
            ConstantEntry::Integer(v) => format!(" int {v}"),
            ConstantEntry::Float(v) => format!(" float {v}"),
            ConstantEntry::Long(v) => format!(" long {v}"),
            ConstantEntry::Double(v) => format!(" double {v}"),
            _ => return Ok(None),
        },
        "getfield" | "putfield" | "getstatic" | "putstatic" => {
            let (owner, member, descriptor) = pool.member_ref(*index)?;
            format!(" Field {}.{member}:{descriptor}", fqcn(owner))
        }
        "invokevirtual" | "invokespecial" | "invokestatic" => {
            let (owner, member, descriptor) = pool.member_ref(*index)?;
            format!(" Method {}.{member}:{descriptor}", fqcn(owner))
        }
        "invokeinterface" => {
            let (owner, member, descriptor) = pool.member_ref(*index)?;
            format!(" InterfaceMethod {}.{member}:{descriptor}", fqcn(owner))
        }
        _ => return Ok(None),
    };
    Ok(Some(comment))
}

fn render_constant_pool(class: &ClassFile, out: &mut String) -> Result<(), JvmError> {
    let _ = writeln!(out, "Constant pool:");
    let pool = &class.constant_pool;
    for i in 1..pool.len() as u16 {
        let Ok(entry) = pool.get(i) else { continue };
        let tag = entry.tag_name();
        let rendered = match entry {
            ConstantEntry::Utf8(s) => format!("{tag}\t\t{s}"),
            ConstantEntry::Integer(v) => format!("{tag}\t\t{v}"),
            ConstantEntry::Float(v) => format!("{tag}\t\t{v}"),
            ConstantEntry::Long(v) => format!("{tag}\t\t{v}"),
            ConstantEntry::Double(v) => format!("{tag}\t\t{v}"),
            ConstantEntry::Class { name_index } => format!("{tag}\t\t#{name_index}"),
            ConstantEntry::String { string_index } => format!("{tag}\t\t#{string_index}"),
            ConstantEntry::FieldRef {
                class_index,
                name_and_type_index,
            } => format!("{tag}\t\t#{class_index}.#{name_and_type_index}"),
            ConstantEntry::MethodRef {
                class_index,
                name_and_type_index,
            } => format!("{tag}\t\t#{class_index}.#{name_and_type_index}"),
            ConstantEntry::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => format!("{tag}\t#{class_index}.#{name_and_type_index}"),
            ConstantEntry::NameAndType {
                name_index,
                descriptor_index,
            } => format!("{tag}\t#{name_index}:#{descriptor_index}"),
            ConstantEntry::Padding => continue,
        };
        let _ = writeln!(out, "const #{i} = {rendered};");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_class_with_tableswitch() -> ClassFile {
        // Pool: 1 Utf8 "p/M" 2 Class->1 3 Utf8 "m" 4 Utf8 "()V" 5 Utf8 "Code"
        let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 50];
        bytes.extend_from_slice(&6u16.to_be_bytes());
        bytes.extend_from_slice(&[1, 0, 3]);
        bytes.extend_from_slice(b"p/M");
        bytes.extend_from_slice(&[7, 0, 1]);
        bytes.extend_from_slice(&[1, 0, 1]);
        bytes.extend_from_slice(b"m");
        bytes.extend_from_slice(&[1, 0, 3]);
        bytes.extend_from_slice(b"()V");
        bytes.extend_from_slice(&[1, 0, 4]);
        bytes.extend_from_slice(b"Code");
        bytes.extend_from_slice(&0x0001u16.to_be_bytes());
        bytes.extend_from_slice(&2u16.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&1u16.to_be_bytes());
        bytes.extend_from_slice(&0x0009u16.to_be_bytes());
        bytes.extend_from_slice(&3u16.to_be_bytes());
        bytes.extend_from_slice(&4u16.to_be_bytes());
        bytes.extend_from_slice(&1u16.to_be_bytes());
        bytes.extend_from_slice(&5u16.to_be_bytes());
        let code: Vec<u8> = vec![
            0xAA, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00,
            0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x0C,
        ];
        let mut code_attr = vec![];
        code_attr.extend_from_slice(&1u16.to_be_bytes());
        code_attr.extend_from_slice(&1u16.to_be_bytes());
        code_attr.extend_from_slice(&(code.len() as u32).to_be_bytes());
        code_attr.extend_from_slice(&code);
        code_attr.extend_from_slice(&0u16.to_be_bytes());
        code_attr.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&(code_attr.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&code_attr);
        bytes.extend_from_slice(&0u16.to_be_bytes());
        ClassFile::parse(&bytes).unwrap()
    }

    /// §8 scenario S6.
    #[test]
    fn renders_tableswitch_with_absolute_offsets() {
        let class = minimal_class_with_tableswitch();
        let rendered = render_class(&class).unwrap();
        assert!(rendered.contains("   0:\ttableswitch"));
        assert!(rendered.contains("0: 8;"));
        assert!(rendered.contains("1: 12;"));
        assert!(rendered.contains("default: 16"));
    }

    #[test]
    fn renders_class_header_with_access_and_name() {
        let class = minimal_class_with_tableswitch();
        let rendered = render_class(&class).unwrap();
        assert!(rendered.contains("public class p.M {"));
    }
}
