use crate::registers::Register;

/// Low 7 bits of an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Opcode {
    Load = 0b0000011,
    OpImm = 0b0010011,
    Store = 0b0100011,
    Op = 0b0110011,
    Branch = 0b1100011,
    Jal = 0b1101111,
}

impl Opcode {
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0b0000011 => Some(Self::Load),
            0b0010011 => Some(Self::OpImm),
            0b0100011 => Some(Self::Store),
            0b0110011 => Some(Self::Op),
            0b1100011 => Some(Self::Branch),
            0b1101111 => Some(Self::Jal),
            _ => None,
        }
    }

    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstructionR {
    pub rd: Register,
    pub rs1: Register,
    pub rs2: Register,
}

impl InstructionR {
    pub const fn new(rd: Register, rs1: Register, rs2: Register) -> Self {
        Self { rd, rs1, rs2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstructionI {
    pub rd: Register,
    pub rs1: Register,
    pub imm: i32,
}

impl InstructionI {
    pub const fn new(rd: Register, rs1: Register, imm: i32) -> Self {
        Self { rd, rs1, imm }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstructionS {
    pub rs1: Register,
    pub rs2: Register,
    pub imm: i32,
}

impl InstructionS {
    pub const fn new(rs1: Register, rs2: Register, imm: i32) -> Self {
        Self { rs1, rs2, imm }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstructionB {
    pub rs1: Register,
    pub rs2: Register,
    pub imm: i32,
}

impl InstructionB {
    pub const fn new(rs1: Register, rs2: Register, imm: i32) -> Self {
        Self { rs1, rs2, imm }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstructionJ {
    pub rd: Register,
    pub imm: i32,
}

impl InstructionJ {
    pub const fn new(rd: Register, imm: i32) -> Self {
        Self { rd, imm }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Instruction {
    LW(InstructionI),
    SW(InstructionS),
    ADDI(InstructionI),
    ADD(InstructionR),
    SUB(InstructionR),
    BEQ(InstructionB),
    JAL(InstructionJ),
}

impl Instruction {
    pub const fn opcode(&self) -> Opcode {
        match self {
            Instruction::LW(_) => Opcode::Load,
            Instruction::SW(_) => Opcode::Store,
            Instruction::ADDI(_) => Opcode::OpImm,
            Instruction::ADD(_) | Instruction::SUB(_) => Opcode::Op,
            Instruction::BEQ(_) => Opcode::Branch,
            Instruction::JAL(_) => Opcode::Jal,
        }
    }
}
