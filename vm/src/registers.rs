use std::io::{self, Write};

/// x0, always reads as 0
pub const ZERO: Register = Register(0);
/// x1, link register written by `jal`
pub const RA: Register = Register(1);
/// x2, stack
pub const SP: Register = Register(2);
/// x3, globals
pub const GP: Register = Register(3);
/// x4, thread-local storage
pub const TP: Register = Register(4);
/// x5, caller-saved
pub const T0: Register = Register(5);
/// x6, caller-saved
pub const T1: Register = Register(6);
/// x7, caller-saved
pub const T2: Register = Register(7);
/// x8, callee-saved, doubles as the frame pointer
pub const S0: Register = Register(8);
/// x9, callee-saved
pub const S1: Register = Register(9);
/// x10, first argument and return value. Writing 1 here halts the default VM
pub const A0: Register = Register(10);
/// x11, second argument and return value
pub const A1: Register = Register(11);
/// x12, argument
pub const A2: Register = Register(12);
/// x13, argument
pub const A3: Register = Register(13);
/// x14, argument
pub const A4: Register = Register(14);
/// x15, argument
pub const A5: Register = Register(15);
/// x16, argument
pub const A6: Register = Register(16);
/// x17, argument
pub const A7: Register = Register(17);
/// x18, callee-saved
pub const S2: Register = Register(18);
/// x19, callee-saved
pub const S3: Register = Register(19);
/// x20, callee-saved
pub const S4: Register = Register(20);
/// x21, callee-saved
pub const S5: Register = Register(21);
/// x22, callee-saved
pub const S6: Register = Register(22);
/// x23, callee-saved
pub const S7: Register = Register(23);
/// x24, callee-saved
pub const S8: Register = Register(24);
/// x25, callee-saved
pub const S9: Register = Register(25);
/// x26, callee-saved
pub const S10: Register = Register(26);
/// x27, callee-saved
pub const S11: Register = Register(27);
/// x28, caller-saved
pub const T3: Register = Register(28);
/// x29, caller-saved
pub const T4: Register = Register(29);
/// x30, caller-saved
pub const T5: Register = Register(30);
/// x31, caller-saved
pub const T6: Register = Register(31);

pub const REGISTER_COUNT: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Register(u8);

impl Register {
    pub const fn new(i: u8) -> Option<Self> {
        if (i as usize) < REGISTER_COUNT {
            Some(Self(i))
        } else {
            None
        }
    }

    /// Builds a register from a 5-bit instruction field. Higher bits are discarded.
    pub const fn from_field(bits: u32) -> Self {
        Self((bits & 0b11111) as u8)
    }

    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Register> {
        (0..REGISTER_COUNT as u8).map(Register)
    }
}

/// See [ASM Manual](https://github.com/riscv-non-isa/riscv-asm-manual/blob/main/riscv-asm.md#general-registers)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registers {
    // x0 has no storage, so it reads as 0 no matter what was written to it.
    registers: [u32; REGISTER_COUNT - 1],
    pc: u32,
}

impl Registers {
    pub fn get(&self, register: Register) -> u32 {
        match register.as_u8() as usize {
            0 => 0,
            i => self.registers[i - 1],
        }
    }

    pub fn set(&mut self, register: Register, value: u32) {
        match register.as_u8() as usize {
            0 => {}
            i => self.registers[i - 1] = value,
        }
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
    }

    /// Writes `x00` through `x31`, one register per line.
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Registers:")?;

        for register in Register::all() {
            writeln!(out, "x{:02}: 0x{:08x}", register.as_u8(), self.get(register))?;
        }

        Ok(())
    }
}
