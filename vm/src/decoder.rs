use crate::{
    isa::{
        Instruction, InstructionB, InstructionI, InstructionJ, InstructionR, InstructionS, Opcode,
    },
    registers::Register,
};
use thiserror::Error;

const FUNCT3_ADD: u32 = 0b000;
const FUNCT3_BEQ: u32 = 0b000;
const FUNCT3_WORD: u32 = 0b010;
const FUNCT7_ADD: u32 = 0b0000000;
const FUNCT7_SUB: u32 = 0b0100000;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unknown instruction: 0x{instruction:08x}")]
    UnknownInstruction { instruction: u32 },
}

/// Takes `len` bits starting at `pos`.
const fn cut(instruction: u32, len: u32, pos: u32) -> u32 {
    (instruction >> pos) & ((1 << len) - 1)
}

/// Interprets the low `bits` bits of `value` as a two's complement number.
pub const fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;

    ((value << shift) as i32) >> shift
}

pub const fn fetch_opcode(instruction: u32) -> u32 {
    cut(instruction, 7, 0)
}

pub const fn fetch_rd(instruction: u32) -> Register {
    Register::from_field(cut(instruction, 5, 7))
}

pub const fn fetch_funct3(instruction: u32) -> u32 {
    cut(instruction, 3, 12)
}

pub const fn fetch_rs1(instruction: u32) -> Register {
    Register::from_field(cut(instruction, 5, 15))
}

pub const fn fetch_rs2(instruction: u32) -> Register {
    Register::from_field(cut(instruction, 5, 20))
}

pub const fn fetch_funct7(instruction: u32) -> u32 {
    cut(instruction, 7, 25)
}

pub const fn fetch_imm_i(instruction: u32) -> i32 {
    sign_extend(cut(instruction, 12, 20), 12)
}

pub const fn fetch_imm_s(instruction: u32) -> i32 {
    // [11:5]
    let mut result = cut(instruction, 7, 25) << 5;
    // [4:0]
    result |= cut(instruction, 5, 7);

    sign_extend(result, 12)
}

pub const fn fetch_imm_b(instruction: u32) -> i32 {
    // [12]
    let mut result = cut(instruction, 1, 31) << 12;
    // [11]
    result |= cut(instruction, 1, 7) << 11;
    // [10:5]
    result |= cut(instruction, 6, 25) << 5;
    // [4:1]
    result |= cut(instruction, 4, 8) << 1;

    sign_extend(result, 13)
}

pub const fn fetch_imm_j(instruction: u32) -> i32 {
    // [20]
    let mut result = cut(instruction, 1, 31) << 20;
    // [19:12]
    result |= cut(instruction, 8, 12) << 12;
    // [11]
    result |= cut(instruction, 1, 20) << 11;
    // [10:1]
    result |= cut(instruction, 10, 21) << 1;

    sign_extend(result, 21)
}

const fn fetch_instruction_r(instruction: u32) -> InstructionR {
    InstructionR::new(
        fetch_rd(instruction),
        fetch_rs1(instruction),
        fetch_rs2(instruction),
    )
}

const fn fetch_instruction_i(instruction: u32) -> InstructionI {
    InstructionI::new(
        fetch_rd(instruction),
        fetch_rs1(instruction),
        fetch_imm_i(instruction),
    )
}

const fn fetch_instruction_s(instruction: u32) -> InstructionS {
    InstructionS::new(
        fetch_rs1(instruction),
        fetch_rs2(instruction),
        fetch_imm_s(instruction),
    )
}

const fn fetch_instruction_b(instruction: u32) -> InstructionB {
    InstructionB::new(
        fetch_rs1(instruction),
        fetch_rs2(instruction),
        fetch_imm_b(instruction),
    )
}

const fn fetch_instruction_j(instruction: u32) -> InstructionJ {
    InstructionJ::new(fetch_rd(instruction), fetch_imm_j(instruction))
}

/// Decodes a raw instruction word. Decoding does not depend on where the word
/// was fetched from.
///
/// Every opcode, funct3 and funct7 combination without defined semantics is
/// rejected, including unsupported variants of a supported opcode.
pub fn decode(instruction: u32) -> Result<Instruction, DecodeError> {
    let unknown = DecodeError::UnknownInstruction { instruction };
    let opcode = Opcode::from_bits(fetch_opcode(instruction)).ok_or(unknown)?;
    let funct3 = fetch_funct3(instruction);

    match opcode {
        Opcode::Load => match funct3 {
            FUNCT3_WORD => Ok(Instruction::LW(fetch_instruction_i(instruction))),
            _ => Err(unknown),
        },
        Opcode::Store => match funct3 {
            FUNCT3_WORD => Ok(Instruction::SW(fetch_instruction_s(instruction))),
            _ => Err(unknown),
        },
        Opcode::OpImm => match funct3 {
            FUNCT3_ADD => Ok(Instruction::ADDI(fetch_instruction_i(instruction))),
            _ => Err(unknown),
        },
        Opcode::Op => match (fetch_funct7(instruction), funct3) {
            (FUNCT7_ADD, FUNCT3_ADD) => Ok(Instruction::ADD(fetch_instruction_r(instruction))),
            (FUNCT7_SUB, FUNCT3_ADD) => Ok(Instruction::SUB(fetch_instruction_r(instruction))),
            _ => Err(unknown),
        },
        Opcode::Branch => match funct3 {
            FUNCT3_BEQ => Ok(Instruction::BEQ(fetch_instruction_b(instruction))),
            _ => Err(unknown),
        },
        Opcode::Jal => Ok(Instruction::JAL(fetch_instruction_j(instruction))),
    }
}
