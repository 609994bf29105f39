//! Opcode dispatch table and bytecode walker (§4.4).
//!
//! The table is process-wide, immutable data: one [`OpcodeInfo`] per opcode
//! value, built once by [`table`] and read by every call to [`walk`]. Three
//! opcodes (`tableswitch`, `lookupswitch`, `wide`) are variable-length and
//! are special-cased in the walker rather than described by a fixed-size
//! table entry.

use crate::errors::JvmError;
use crate::reader::Reader;

/// One decoded operand. `info` records which of §4.4's operand-info letters
/// produced it, so renderers can format pool indices, locals, branch targets
/// and literals differently without re-deriving the opcode's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// `c` — constant-pool index, already reassembled from its operand bytes.
    PoolIndex(u16),
    /// `l` — local-variable index.
    Local(u16),
    /// `o` — branch offset, already added to the opcode's own PC.
    BranchTarget(i32),
    /// `a` — `newarray` element type code.
    ArrayType(u8),
    /// `#` — literal integer operand (`bipush`, `iinc`'s constant, ...).
    Immediate(i32),
}

/// One decoded instruction: the offset of its opcode byte, its mnemonic, and
/// its operands in declaration order.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub pc: usize,
    pub opcode: u8,
    pub mnemonic: &'static str,
    pub operands: Vec<Operand>,
    /// Number of bytes this instruction occupies, opcode byte included.
    pub size: usize,
}

/// Fixed-shape operand layout for the 253 non-variable-length opcodes.
#[derive(Debug, Clone, Copy)]
enum Layout {
    /// No operands (`nop`, `iadd`, `areturn`, ...).
    None,
    /// One unsigned byte local index (`aload`, `astore`, `ret`).
    LocalU8,
    /// One unsigned 16-bit local index, only reachable via `wide`.
    LocalU16,
    /// One signed byte immediate (`bipush`).
    ImmediateI8,
    /// One signed 16-bit immediate (`sipush`).
    ImmediateI16,
    /// `newarray`'s one-byte array-type code.
    ArrayTypeU8,
    /// One unsigned 16-bit constant-pool index (`ldc_w`, `getfield`, `new`, ...).
    PoolU16,
    /// `ldc`'s one-byte constant-pool index.
    PoolU8,
    /// `invokeinterface`'s pool index plus a count byte and a required zero byte.
    InvokeInterface,
    /// `invokedynamic`'s pool index plus two required zero bytes.
    InvokeDynamic,
    /// `multianewarray`'s pool index plus a dimension count byte.
    MultiANewArray,
    /// One signed 16-bit branch offset (`goto`, `if*`, ...).
    BranchI16,
    /// One signed 32-bit branch offset (`goto_w`, `jsr_w`).
    BranchI32,
}

struct OpcodeInfo {
    mnemonic: &'static str,
    layout: Layout,
}

macro_rules! op {
    ($mnemonic:literal, $layout:expr) => {
        OpcodeInfo {
            mnemonic: $mnemonic,
            layout: $layout,
        }
    };
}

/// Builds the 256-entry opcode table. `None` marks an opcode this crate's
/// documented version range never emits (reserved slots, removed opcodes);
/// encountering one is `BadBytecode`, matching unassigned opcodes.
fn table() -> [Option<OpcodeInfo>; 256] {
    const INIT: Option<OpcodeInfo> = None;
    let mut t: [Option<OpcodeInfo>; 256] = [INIT; 256];
    let mut set = |code: u8, info: OpcodeInfo| t[code as usize] = Some(info);

    set(0x00, op!("nop", Layout::None));
    set(0x01, op!("aconst_null", Layout::None));
    set(0x02, op!("iconst_m1", Layout::None));
    set(0x03, op!("iconst_0", Layout::None));
    set(0x04, op!("iconst_1", Layout::None));
    set(0x05, op!("iconst_2", Layout::None));
    set(0x06, op!("iconst_3", Layout::None));
    set(0x07, op!("iconst_4", Layout::None));
    set(0x08, op!("iconst_5", Layout::None));
    set(0x09, op!("lconst_0", Layout::None));
    set(0x0a, op!("lconst_1", Layout::None));
    set(0x0b, op!("fconst_0", Layout::None));
    set(0x0c, op!("fconst_1", Layout::None));
    set(0x0d, op!("fconst_2", Layout::None));
    set(0x0e, op!("dconst_0", Layout::None));
    set(0x0f, op!("dconst_1", Layout::None));
    set(0x10, op!("bipush", Layout::ImmediateI8));
    set(0x11, op!("sipush", Layout::ImmediateI16));
    set(0x12, op!("ldc", Layout::PoolU8));
    set(0x13, op!("ldc_w", Layout::PoolU16));
    set(0x14, op!("ldc2_w", Layout::PoolU16));
    set(0x15, op!("iload", Layout::LocalU8));
    set(0x16, op!("lload", Layout::LocalU8));
    set(0x17, op!("fload", Layout::LocalU8));
    set(0x18, op!("dload", Layout::LocalU8));
    set(0x19, op!("aload", Layout::LocalU8));
    set(0x1a, op!("iload_0", Layout::None));
    set(0x1b, op!("iload_1", Layout::None));
    set(0x1c, op!("iload_2", Layout::None));
    set(0x1d, op!("iload_3", Layout::None));
    set(0x1e, op!("lload_0", Layout::None));
    set(0x1f, op!("lload_1", Layout::None));
    set(0x20, op!("lload_2", Layout::None));
    set(0x21, op!("lload_3", Layout::None));
    set(0x22, op!("fload_0", Layout::None));
    set(0x23, op!("fload_1", Layout::None));
    set(0x24, op!("fload_2", Layout::None));
    set(0x25, op!("fload_3", Layout::None));
    set(0x26, op!("dload_0", Layout::None));
    set(0x27, op!("dload_1", Layout::None));
    set(0x28, op!("dload_2", Layout::None));
    set(0x29, op!("dload_3", Layout::None));
    set(0x2a, op!("aload_0", Layout::None));
    set(0x2b, op!("aload_1", Layout::None));
    set(0x2c, op!("aload_2", Layout::None));
    set(0x2d, op!("aload_3", Layout::None));
    set(0x2e, op!("iaload", Layout::None));
    set(0x2f, op!("laload", Layout::None));
    set(0x30, op!("faload", Layout::None));
    set(0x31, op!("daload", Layout::None));
    set(0x32, op!("aaload", Layout::None));
    set(0x33, op!("baload", Layout::None));
    set(0x34, op!("caload", Layout::None));
    set(0x35, op!("saload", Layout::None));
    set(0x36, op!("istore", Layout::LocalU8));
    set(0x37, op!("lstore", Layout::LocalU8));
    set(0x38, op!("fstore", Layout::LocalU8));
    set(0x39, op!("dstore", Layout::LocalU8));
    set(0x3a, op!("astore", Layout::LocalU8));
    set(0x3b, op!("istore_0", Layout::None));
    set(0x3c, op!("istore_1", Layout::None));
    set(0x3d, op!("istore_2", Layout::None));
    set(0x3e, op!("istore_3", Layout::None));
    set(0x3f, op!("lstore_0", Layout::None));
    set(0x40, op!("lstore_1", Layout::None));
    set(0x41, op!("lstore_2", Layout::None));
    set(0x42, op!("lstore_3", Layout::None));
    set(0x43, op!("fstore_0", Layout::None));
    set(0x44, op!("fstore_1", Layout::None));
    set(0x45, op!("fstore_2", Layout::None));
    set(0x46, op!("fstore_3", Layout::None));
    set(0x47, op!("dstore_0", Layout::None));
    set(0x48, op!("dstore_1", Layout::None));
    set(0x49, op!("dstore_2", Layout::None));
    set(0x4a, op!("dstore_3", Layout::None));
    set(0x4b, op!("astore_0", Layout::None));
    set(0x4c, op!("astore_1", Layout::None));
    set(0x4d, op!("astore_2", Layout::None));
    set(0x4e, op!("astore_3", Layout::None));
    set(0x4f, op!("iastore", Layout::None));
    set(0x50, op!("lastore", Layout::None));
    set(0x51, op!("fastore", Layout::None));
    set(0x52, op!("dastore", Layout::None));
    set(0x53, op!("aastore", Layout::None));
    set(0x54, op!("bastore", Layout::None));
    set(0x55, op!("castore", Layout::None));
    set(0x56, op!("sastore", Layout::None));
    set(0x57, op!("pop", Layout::None));
    set(0x58, op!("pop2", Layout::None));
    set(0x59, op!("dup", Layout::None));
    set(0x5a, op!("dup_x1", Layout::None));
    set(0x5b, op!("dup_x2", Layout::None));
    set(0x5c, op!("dup2", Layout::None));
    set(0x5d, op!("dup2_x1", Layout::None));
    set(0x5e, op!("dup2_x2", Layout::None));
    set(0x5f, op!("swap", Layout::None));
    set(0x60, op!("iadd", Layout::None));
    set(0x61, op!("ladd", Layout::None));
    set(0x62, op!("fadd", Layout::None));
    set(0x63, op!("dadd", Layout::None));
    set(0x64, op!("isub", Layout::None));
    set(0x65, op!("lsub", Layout::None));
    set(0x66, op!("fsub", Layout::None));
    set(0x67, op!("dsub", Layout::None));
    set(0x68, op!("imul", Layout::None));
    set(0x69, op!("lmul", Layout::None));
    set(0x6a, op!("fmul", Layout::None));
    set(0x6b, op!("dmul", Layout::None));
    set(0x6c, op!("idiv", Layout::None));
    set(0x6d, op!("ldiv", Layout::None));
    set(0x6e, op!("fdiv", Layout::None));
    set(0x6f, op!("ddiv", Layout::None));
    set(0x70, op!("irem", Layout::None));
    set(0x71, op!("lrem", Layout::None));
    set(0x72, op!("frem", Layout::None));
    set(0x73, op!("drem", Layout::None));
    set(0x74, op!("ineg", Layout::None));
    set(0x75, op!("lneg", Layout::None));
    set(0x76, op!("fneg", Layout::None));
    set(0x77, op!("dneg", Layout::None));
    set(0x78, op!("ishl", Layout::None));
    set(0x79, op!("lshl", Layout::None));
    set(0x7a, op!("ishr", Layout::None));
    set(0x7b, op!("lshr", Layout::None));
    set(0x7c, op!("iushr", Layout::None));
    set(0x7d, op!("lushr", Layout::None));
    set(0x7e, op!("iand", Layout::None));
    set(0x7f, op!("land", Layout::None));
    set(0x80, op!("ior", Layout::None));
    set(0x81, op!("lor", Layout::None));
    set(0x82, op!("ixor", Layout::None));
    set(0x83, op!("lxor", Layout::None));
    set(0x84, op!("iinc", Layout::LocalU8)); // special-cased below (two operands)
    set(0x85, op!("i2l", Layout::None));
    set(0x86, op!("i2f", Layout::None));
    set(0x87, op!("i2d", Layout::None));
    set(0x88, op!("l2i", Layout::None));
    set(0x89, op!("l2f", Layout::None));
    set(0x8a, op!("l2d", Layout::None));
    set(0x8b, op!("f2i", Layout::None));
    set(0x8c, op!("f2l", Layout::None));
    set(0x8d, op!("f2d", Layout::None));
    set(0x8e, op!("d2i", Layout::None));
    set(0x8f, op!("d2l", Layout::None));
    set(0x90, op!("d2f", Layout::None));
    set(0x91, op!("i2b", Layout::None));
    set(0x92, op!("i2c", Layout::None));
    set(0x93, op!("i2s", Layout::None));
    set(0x94, op!("lcmp", Layout::None));
    set(0x95, op!("fcmpl", Layout::None));
    set(0x96, op!("fcmpg", Layout::None));
    set(0x97, op!("dcmpl", Layout::None));
    set(0x98, op!("dcmpg", Layout::None));
    set(0x99, op!("ifeq", Layout::BranchI16));
    set(0x9a, op!("ifne", Layout::BranchI16));
    set(0x9b, op!("iflt", Layout::BranchI16));
    set(0x9c, op!("ifge", Layout::BranchI16));
    set(0x9d, op!("ifgt", Layout::BranchI16));
    set(0x9e, op!("ifle", Layout::BranchI16));
    set(0x9f, op!("if_icmpeq", Layout::BranchI16));
    set(0xa0, op!("if_icmpne", Layout::BranchI16));
    set(0xa1, op!("if_icmplt", Layout::BranchI16));
    set(0xa2, op!("if_icmpge", Layout::BranchI16));
    set(0xa3, op!("if_icmpgt", Layout::BranchI16));
    set(0xa4, op!("if_icmple", Layout::BranchI16));
    set(0xa5, op!("if_acmpeq", Layout::BranchI16));
    set(0xa6, op!("if_acmpne", Layout::BranchI16));
    set(0xa7, op!("goto", Layout::BranchI16));
    set(0xa8, op!("jsr", Layout::BranchI16));
    set(0xa9, op!("ret", Layout::LocalU8));
    // 0xaa tableswitch, 0xab lookupswitch: variable-length, handled in `walk`.
    set(0xac, op!("ireturn", Layout::None));
    set(0xad, op!("lreturn", Layout::None));
    set(0xae, op!("freturn", Layout::None));
    set(0xaf, op!("dreturn", Layout::None));
    set(0xb0, op!("areturn", Layout::None));
    set(0xb1, op!("return", Layout::None));
    set(0xb2, op!("getstatic", Layout::PoolU16));
    set(0xb3, op!("putstatic", Layout::PoolU16));
    set(0xb4, op!("getfield", Layout::PoolU16));
    set(0xb5, op!("putfield", Layout::PoolU16));
    set(0xb6, op!("invokevirtual", Layout::PoolU16));
    set(0xb7, op!("invokespecial", Layout::PoolU16));
    set(0xb8, op!("invokestatic", Layout::PoolU16));
    set(0xb9, op!("invokeinterface", Layout::InvokeInterface));
    set(0xba, op!("invokedynamic", Layout::InvokeDynamic));
    set(0xbb, op!("new", Layout::PoolU16));
    set(0xbc, op!("newarray", Layout::ArrayTypeU8));
    set(0xbd, op!("anewarray", Layout::PoolU16));
    set(0xbe, op!("arraylength", Layout::None));
    set(0xbf, op!("athrow", Layout::None));
    set(0xc0, op!("checkcast", Layout::PoolU16));
    set(0xc1, op!("instanceof", Layout::PoolU16));
    set(0xc2, op!("monitorenter", Layout::None));
    set(0xc3, op!("monitorexit", Layout::None));
    // 0xc4 wide: variable-length, handled in `walk`.
    set(0xc5, op!("multianewarray", Layout::MultiANewArray));
    set(0xc6, op!("ifnull", Layout::BranchI16));
    set(0xc7, op!("ifnonnull", Layout::BranchI16));
    set(0xc8, op!("goto_w", Layout::BranchI32));
    set(0xc9, op!("jsr_w", Layout::BranchI32));

    t
}

const TABLESWITCH: u8 = 0xaa;
const LOOKUPSWITCH: u8 = 0xab;
const WIDE: u8 = 0xc4;
const IINC: u8 = 0x84;

/// Walks one method's `Code` buffer, producing (pc, mnemonic, operands) in
/// order. Totality (§8 property 3): the sum of consumed instruction sizes
/// equals `code.len()` exactly, or a `BadBytecode`/`Truncated` error is
/// returned instead of a partial result.
pub fn walk(code: &[u8]) -> Result<Vec<Instruction>, JvmError> {
    let ops = table();
    let mut out = Vec::new();
    let mut pc = 0usize;

    while pc < code.len() {
        let opcode = code[pc];
        match opcode {
            TABLESWITCH => out.push(walk_tableswitch(code, pc)?),
            LOOKUPSWITCH => out.push(walk_lookupswitch(code, pc)?),
            WIDE => out.push(walk_wide(code, pc)?),
            _ => {
                let info = ops[opcode as usize]
                    .as_ref()
                    .ok_or_else(|| JvmError::BadBytecode(format!("unknown opcode {opcode:#04x} at pc {pc}")))?;
                let mut reader = Reader::new(&code[pc + 1..]);
                let operands = decode_fixed(opcode, info.layout, &mut reader, pc)?;
                let size = 1 + reader.position();
                out.push(Instruction {
                    pc,
                    opcode,
                    mnemonic: info.mnemonic,
                    operands,
                    size,
                });
            }
        }
        pc += out.last().unwrap().size;
    }
    Ok(out)
}

fn decode_fixed(opcode: u8, layout: Layout, r: &mut Reader, pc: usize) -> Result<Vec<Operand>, JvmError> {
    Ok(match layout {
        Layout::None => vec![],
        Layout::LocalU8 if opcode == IINC => vec![
            Operand::Local(r.read_u8()? as u16),
            Operand::Immediate(r.read_i8()? as i32),
        ],
        Layout::LocalU8 => vec![Operand::Local(r.read_u8()? as u16)],
        Layout::LocalU16 => vec![Operand::Local(r.read_u16()?)],
        Layout::ImmediateI8 => vec![Operand::Immediate(r.read_i8()? as i32)],
        Layout::ImmediateI16 => vec![Operand::Immediate(r.read_i16()? as i32)],
        Layout::ArrayTypeU8 => vec![Operand::ArrayType(r.read_u8()?)],
        Layout::PoolU16 => vec![Operand::PoolIndex(r.read_u16()?)],
        Layout::PoolU8 => vec![Operand::PoolIndex(r.read_u8()? as u16)],
        Layout::InvokeInterface => {
            let index = r.read_u16()?;
            let count = r.read_u8()?;
            let zero = r.read_u8()?;
            if zero != 0 {
                return Err(JvmError::BadBytecode(format!(
                    "invokeinterface at pc {pc} missing required zero byte"
                )));
            }
            vec![Operand::PoolIndex(index), Operand::Immediate(count as i32)]
        }
        Layout::InvokeDynamic => {
            let index = r.read_u16()?;
            let zero = r.read_u16()?;
            if zero != 0 {
                return Err(JvmError::BadBytecode(format!(
                    "invokedynamic at pc {pc} missing required zero bytes"
                )));
            }
            vec![Operand::PoolIndex(index)]
        }
        Layout::MultiANewArray => {
            let index = r.read_u16()?;
            let dims = r.read_u8()?;
            vec![Operand::PoolIndex(index), Operand::Immediate(dims as i32)]
        }
        Layout::BranchI16 => vec![Operand::BranchTarget(pc as i32 + r.read_i16()? as i32)],
        Layout::BranchI32 => vec![Operand::BranchTarget(pc as i32 + r.read_i32()? as i32)],
    })
}

/// §4.4 alignment rule, shared by `tableswitch` and `lookupswitch`: pad with
/// 0-3 zero bytes so the first payload int starts on a 4-byte boundary
/// relative to the start of the method's code, i.e. at
/// `p + 1 + ((4 - (p+1) mod 4) mod 4)` (§8 property 4).
fn aligned_payload_start(pc: usize) -> usize {
    let after_opcode = pc + 1;
    after_opcode + (4 - after_opcode % 4) % 4
}

fn walk_tableswitch(code: &[u8], pc: usize) -> Result<Instruction, JvmError> {
    let payload_start = aligned_payload_start(pc);
    if payload_start > code.len() {
        return Err(JvmError::Truncated {
            offset: pc,
            needed: payload_start - code.len(),
        });
    }
    let mut r = Reader::new(&code[payload_start..]);
    let default = r.read_i32()?;
    let low = r.read_i32()?;
    let high = r.read_i32()?;
    if high < low {
        return Err(JvmError::BadBytecode(format!(
            "tableswitch at pc {pc} has high ({high}) < low ({low})"
        )));
    }
    let count = (high - low + 1) as usize;
    let mut operands = vec![
        Operand::Immediate(low),
        Operand::Immediate(high),
        Operand::BranchTarget(pc as i32 + default),
    ];
    for _ in 0..count {
        operands.push(Operand::BranchTarget(pc as i32 + r.read_i32()?));
    }
    let size = payload_start - pc + r.position();
    Ok(Instruction {
        pc,
        opcode: TABLESWITCH,
        mnemonic: "tableswitch",
        operands,
        size,
    })
}

fn walk_lookupswitch(code: &[u8], pc: usize) -> Result<Instruction, JvmError> {
    let payload_start = aligned_payload_start(pc);
    if payload_start > code.len() {
        return Err(JvmError::Truncated {
            offset: pc,
            needed: payload_start - code.len(),
        });
    }
    let mut r = Reader::new(&code[payload_start..]);
    let default = r.read_i32()?;
    let npairs = r.read_u32()?;
    let mut operands = vec![Operand::BranchTarget(pc as i32 + default)];
    for _ in 0..npairs {
        let match_ = r.read_i32()?;
        let offset = r.read_i32()?;
        operands.push(Operand::Immediate(match_));
        operands.push(Operand::BranchTarget(pc as i32 + offset));
    }
    let size = payload_start - pc + r.position();
    Ok(Instruction {
        pc,
        opcode: LOOKUPSWITCH,
        mnemonic: "lookupswitch",
        operands,
        size,
    })
}

fn walk_wide(code: &[u8], pc: usize) -> Result<Instruction, JvmError> {
    if pc + 1 >= code.len() {
        return Err(JvmError::Truncated { offset: pc, needed: 1 });
    }
    let modified = code[pc + 1];
    let mut r = Reader::new(&code[pc + 2..]);
    let (mnemonic, operands) = if modified == IINC {
        let local = r.read_u16()?;
        let constant = r.read_i16()?;
        ("iinc", vec![Operand::Local(local), Operand::Immediate(constant as i32)])
    } else {
        let ops = table();
        let info = ops[modified as usize]
            .as_ref()
            .filter(|info| matches!(info.layout, Layout::LocalU8))
            .ok_or_else(|| {
                JvmError::BadBytecode(format!("wide at pc {pc} modifies non-widenable opcode {modified:#04x}"))
            })?;
        let local = r.read_u16()?;
        (info.mnemonic, vec![Operand::Local(local)])
    };
    let size = 2 + r.position();
    Ok(Instruction {
        pc,
        opcode: WIDE,
        mnemonic,
        operands,
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// §8 scenario S3: tableswitch with default=16, low=0, high=1, offsets=[8,12].
    #[test]
    fn walks_tableswitch_from_s3() {
        let code: Vec<u8> = vec![
            0xAA, 0x00, 0x00, 0x00, // opcode + 3 padding bytes
            0x00, 0x00, 0x00, 0x10, // default = 16
            0x00, 0x00, 0x00, 0x00, // low = 0
            0x00, 0x00, 0x00, 0x01, // high = 1
            0x00, 0x00, 0x00, 0x08, // offsets[0] = 8
            0x00, 0x00, 0x00, 0x0C, // offsets[1] = 12
        ];
        let instructions = walk(&code).unwrap();
        assert_eq!(instructions.len(), 1);
        let instr = &instructions[0];
        assert_eq!(instr.mnemonic, "tableswitch");
        assert_eq!(
            instr.operands,
            vec![
                Operand::Immediate(0),
                Operand::Immediate(1),
                Operand::BranchTarget(16),
                Operand::BranchTarget(8),
                Operand::BranchTarget(12),
            ]
        );
        assert_eq!(instr.size, 25);
    }

    #[test]
    fn lookupswitch_payload_follows_spec_formula_not_either_buggy_tool() {
        // default=0, npairs=2, pairs (1,10) (2,20); payload is 8 + 8*npairs = 24 bytes
        // after 3 bytes of padding at pc 0.
        let mut code = vec![0xAB, 0x00, 0x00, 0x00];
        code.extend_from_slice(&0i32.to_be_bytes());
        code.extend_from_slice(&2i32.to_be_bytes());
        code.extend_from_slice(&1i32.to_be_bytes());
        code.extend_from_slice(&10i32.to_be_bytes());
        code.extend_from_slice(&2i32.to_be_bytes());
        code.extend_from_slice(&20i32.to_be_bytes());
        let instructions = walk(&code).unwrap();
        assert_eq!(instructions[0].size, 4 + 8 + 8 * 2);
    }

    #[test]
    fn wide_iinc_has_two_u16_wide_operands() {
        let code: Vec<u8> = vec![0xC4, 0x84, 0x01, 0x00, 0x00, 0x05];
        let instructions = walk(&code).unwrap();
        assert_eq!(instructions[0].mnemonic, "iinc");
        assert_eq!(
            instructions[0].operands,
            vec![Operand::Local(256), Operand::Immediate(5)]
        );
        assert_eq!(instructions[0].size, 6);
    }

    #[test]
    fn wide_aload_has_one_u16_local() {
        let code: Vec<u8> = vec![0xC4, 0x19, 0x01, 0x00];
        let instructions = walk(&code).unwrap();
        assert_eq!(instructions[0].mnemonic, "aload");
        assert_eq!(instructions[0].operands, vec![Operand::Local(256)]);
    }

    #[test]
    fn unknown_opcode_is_bad_bytecode() {
        let code: Vec<u8> = vec![0xFE];
        assert!(matches!(walk(&code), Err(JvmError::BadBytecode(_))));
    }

    /// §8 property 3: sum of instruction sizes exhausts the buffer exactly.
    #[test]
    fn walker_is_total_over_simple_method() {
        // bipush 42; ireturn
        let code: Vec<u8> = vec![0x10, 0x2A, 0xAC];
        let instructions = walk(&code).unwrap();
        let total: usize = instructions.iter().map(|i| i.size).sum();
        assert_eq!(total, code.len());
        assert_eq!(instructions.len(), 2);
    }
}
