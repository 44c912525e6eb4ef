use crate::{
    decoder::{self, DecodeError},
    isa::{Instruction, InstructionB, InstructionI, InstructionJ, InstructionR, InstructionS},
    prof,
    ram::{RAMError, RAM},
    registers::{Registers, ZERO},
};
use thiserror::Error;

const INSTRUCTION_SIZE: u32 = std::mem::size_of::<u32>() as u32;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CPUError {
    #[error(transparent)]
    RAMError(#[from] RAMError),
    #[error(transparent)]
    DecodeError(#[from] DecodeError),
}

/// A hart with its own register file and exclusive access to memory.
#[derive(Debug, Clone)]
pub struct CPU {
    pub registers: Registers,
    pub ram: RAM,
}

impl CPU {
    pub fn new(ram: RAM) -> Self {
        Self {
            registers: Registers::default(),
            ram,
        }
    }

    /// Fetches, decodes and executes the instruction at `pc`.
    ///
    /// A failing instruction leaves registers, memory and `pc` unchanged.
    pub fn tick(&mut self) -> Result<Instruction, CPUError> {
        let _span = prof::span!("tick");

        let pc = self.registers.pc();
        let word = self.ram.read_u32(pc)?;
        let instruction = decoder::decode(word)?;

        tracing::trace!(
            pc = format_args!("0x{pc:08x}"),
            word = format_args!("0x{word:08x}"),
            opcode = format_args!("0b{:07b}", instruction.opcode().as_u32()),
            ?instruction
        );

        self.execute(instruction)?;

        Ok(instruction)
    }

    /// Applies `instruction` as if it was fetched from `pc`.
    pub fn execute(&mut self, instruction: Instruction) -> Result<(), CPUError> {
        let pc = self.registers.pc();
        let npc = pc.wrapping_add(INSTRUCTION_SIZE);

        let next = match instruction {
            Instruction::LW(InstructionI { rd, rs1, imm }) => {
                let addr = self.registers.get(rs1).wrapping_add_signed(imm);
                let value = self.ram.read_u32(addr)?;

                self.registers.set(rd, value);

                npc
            }
            Instruction::SW(InstructionS { rs1, rs2, imm }) => {
                let addr = self.registers.get(rs1).wrapping_add_signed(imm);
                let value = self.registers.get(rs2);

                self.ram.write_u32(value, addr)?;

                npc
            }
            Instruction::ADDI(InstructionI { rd, rs1, imm }) => {
                let result = self.registers.get(rs1).wrapping_add_signed(imm);

                self.registers.set(rd, result);

                npc
            }
            Instruction::ADD(InstructionR { rd, rs1, rs2 }) => {
                let rs1 = self.registers.get(rs1);
                let rs2 = self.registers.get(rs2);

                self.registers.set(rd, rs1.wrapping_add(rs2));

                npc
            }
            Instruction::SUB(InstructionR { rd, rs1, rs2 }) => {
                let rs1 = self.registers.get(rs1);
                let rs2 = self.registers.get(rs2);

                self.registers.set(rd, rs1.wrapping_sub(rs2));

                npc
            }
            Instruction::BEQ(InstructionB { rs1, rs2, imm }) => {
                let rs1 = self.registers.get(rs1);
                let rs2 = self.registers.get(rs2);

                if rs1 == rs2 {
                    pc.wrapping_add_signed(imm)
                } else {
                    npc
                }
            }
            Instruction::JAL(InstructionJ { rd, imm }) => {
                self.registers.set(rd, npc);

                pc.wrapping_add_signed(imm)
            }
        };

        debug_assert_eq!(self.registers.get(ZERO), 0);

        self.registers.set_pc(next);

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{CPUError, CPU};
    use crate::{
        decoder::DecodeError,
        isa::{Instruction, InstructionI},
        ram::{RAMError, RAM},
    };

    /// Builds a CPU whose memory starts with `program`, given as big-endian
    /// instruction words the way they appear in a listing.
    pub(crate) fn make_cpu(program: &[u8], size: u32) -> CPU {
        assert!(program.len() % std::mem::size_of::<u32>() == 0);

        let mut ram = RAM::new(size).unwrap();

        for (idx, word) in program.chunks_exact(4).enumerate() {
            let word = u32::from_be_bytes(word.try_into().unwrap());

            ram.write_u32(word, (idx * std::mem::size_of::<u32>()) as u32)
                .unwrap();
        }

        CPU::new(ram)
    }

    mod i_extension {
        use super::make_cpu;
        use crate::{
            isa::Opcode,
            registers::{A0, GP, RA, SP, TP, ZERO},
        };
        use hex_literal::hex;

        #[test]
        fn addi() {
            // addi x1, x0, 5
            // addi x2, x1, -7
            let mut cpu = make_cpu(&hex!("00500093 ff908113"), 64);

            cpu.tick().unwrap();
            cpu.tick().unwrap();

            assert_eq!(cpu.registers.get(RA), 5);
            assert_eq!(cpu.registers.get(SP), -2i32 as u32);
            assert_eq!(cpu.registers.pc(), 8);
        }

        #[test]
        fn add() {
            // addi x1, x0, 5
            // addi x2, x0, 3
            // add x3, x1, x2
            let mut cpu = make_cpu(&hex!("00500093 00300113 002081b3"), 64);

            cpu.tick().unwrap();
            cpu.tick().unwrap();
            cpu.tick().unwrap();

            assert_eq!(cpu.registers.get(GP), 8);
            assert_eq!(cpu.registers.pc(), 12);
        }

        #[test]
        fn sub() {
            // addi x1, x0, 5
            // addi x2, x0, 3
            // sub x3, x1, x2
            // sub x4, x2, x1
            let mut cpu = make_cpu(&hex!("00500093 00300113 402081b3 40110233"), 64);

            for _ in 0..4 {
                cpu.tick().unwrap();
            }

            assert_eq!(cpu.registers.get(GP), 2);
            assert_eq!(cpu.registers.get(TP), 0xFFFF_FFFE);
        }

        #[test]
        fn wrapping() {
            // addi x1, x0, -1
            // addi x2, x0, 1
            // add x3, x1, x2
            // sub x4, x0, x2
            let mut cpu = make_cpu(&hex!("fff00093 00100113 002081b3 40200233"), 64);

            for _ in 0..4 {
                cpu.tick().unwrap();
            }

            assert_eq!(cpu.registers.get(RA), 0xFFFF_FFFF);
            assert_eq!(cpu.registers.get(GP), 0);
            assert_eq!(cpu.registers.get(TP), 0xFFFF_FFFF);
        }

        #[test]
        fn write_to_zero() {
            // addi x0, x0, 5
            // add x1, x0, x0
            let mut cpu = make_cpu(&hex!("00500013 000000b3"), 64);

            cpu.tick().unwrap();
            cpu.tick().unwrap();

            assert_eq!(cpu.registers.get(ZERO), 0);
            assert_eq!(cpu.registers.get(RA), 0);
        }

        #[test]
        fn sw_lw() {
            // addi x1, x0, 7
            // sw x1, 0(x0)
            // lw x4, 0(x0)
            let mut cpu = make_cpu(&hex!("00700093 00102023 00002203"), 64);

            cpu.tick().unwrap();
            cpu.tick().unwrap();
            cpu.tick().unwrap();

            assert_eq!(cpu.registers.get(TP), 7);
            assert_eq!(cpu.ram.read_u32(0), Ok(7));
        }

        #[test]
        fn sw_lw_offset() {
            // addi x1, x0, 64
            // addi x2, x0, -1
            // sw x2, -4(x1)
            // lw x10, 60(x0)
            let mut cpu = make_cpu(&hex!("04000093 fff00113 fe20ae23 03c02503"), 64);

            for _ in 0..4 {
                cpu.tick().unwrap();
            }

            assert_eq!(cpu.ram.as_slice()[60..], [0xFF; 4]);
            assert_eq!(cpu.registers.get(A0), 0xFFFF_FFFF);
        }

        #[test]
        fn beq_taken() {
            // addi x1, x0, 2
            // addi x2, x0, 2
            // beq x1, x2, 8
            // addi x2, x1, 0
            // addi x3, x0, 1024
            let mut cpu = make_cpu(&hex!("00200093 00200113 00208463 00008113 40000193"), 64);

            cpu.tick().unwrap();
            cpu.tick().unwrap();
            cpu.tick().unwrap();

            assert_eq!(cpu.registers.pc(), 16);

            cpu.tick().unwrap();

            assert_eq!(cpu.registers.get(GP), 1024);
            assert_eq!(cpu.registers.get(SP), 2);
        }

        #[test]
        fn beq_not_taken() {
            // addi x1, x0, 1
            // addi x2, x0, 2
            // beq x1, x2, 8
            let mut cpu = make_cpu(&hex!("00100093 00200113 00208463"), 64);

            cpu.tick().unwrap();
            cpu.tick().unwrap();
            cpu.tick().unwrap();

            assert_eq!(cpu.registers.pc(), 12);
        }

        #[test]
        fn beq_backwards() {
            // addi x1, x0, 1
            // beq x0, x0, -4
            let mut cpu = make_cpu(&hex!("00100093 fe000ee3"), 64);

            cpu.tick().unwrap();
            cpu.tick().unwrap();

            assert_eq!(cpu.registers.pc(), 0);
        }

        #[test]
        fn jal() {
            // jal x1, 8
            // addi x2, x0, 1024
            // addi x2, x2, 1
            let mut cpu = make_cpu(&hex!("008000ef 40000113 00110113"), 64);

            cpu.tick().unwrap();

            assert_eq!(cpu.registers.get(RA), 4);
            assert_eq!(cpu.registers.pc(), 8);

            cpu.tick().unwrap();

            assert_eq!(cpu.registers.get(SP), 1);
        }

        #[test]
        fn jal_backwards() {
            // addi x1, x0, 1
            // addi x1, x1, 1
            // jal x0, -8
            let mut cpu = make_cpu(&hex!("00100093 00108093 ff9ff06f"), 64);

            cpu.tick().unwrap();
            cpu.tick().unwrap();
            cpu.tick().unwrap();

            assert_eq!(cpu.registers.pc(), 0);
            assert_eq!(cpu.registers.get(ZERO), 0);
        }

        #[test]
        fn control_transfer_into_zero() {
            // jal x0, 8
            // addi x1, x0, 1
            // beq x0, x0, -4
            let mut cpu = make_cpu(&hex!("0080006f 00100093 fe000ee3"), 64);

            assert_eq!(cpu.tick().unwrap().opcode(), Opcode::Jal);
            assert_eq!(cpu.registers.pc(), 8);
            assert_eq!(cpu.registers.get(ZERO), 0);

            assert_eq!(cpu.tick().unwrap().opcode(), Opcode::Branch);
            assert_eq!(cpu.registers.pc(), 4);
            assert_eq!(cpu.registers.get(ZERO), 0);

            assert_eq!(cpu.tick().unwrap().opcode(), Opcode::OpImm);
            assert_eq!(cpu.registers.get(RA), 1);
        }
    }

    mod faults {
        use super::make_cpu;
        use crate::{
            cpu::CPUError,
            decoder::DecodeError,
            ram::RAMError,
            registers::{A0, RA},
        };
        use hex_literal::hex;

        #[test]
        fn unknown_instruction() {
            // addi x1, x0, 1
            // lui x1, 1
            let mut cpu = make_cpu(&hex!("00100093 000010b7"), 64);

            cpu.tick().unwrap();

            let before = cpu.registers.clone();

            assert_eq!(
                cpu.tick(),
                Err(CPUError::DecodeError(DecodeError::UnknownInstruction {
                    instruction: 0x000010b7
                }))
            );
            assert_eq!(cpu.registers, before);
            assert_eq!(cpu.registers.pc(), 4);
            assert_eq!(cpu.registers.get(RA), 1);
        }

        #[test]
        fn load_out_of_bounds() {
            // addi x1, x0, 62
            // lw x10, 0(x1)
            let mut cpu = make_cpu(&hex!("03e00093 0000a503"), 64);

            cpu.tick().unwrap();

            assert_eq!(
                cpu.tick(),
                Err(CPUError::RAMError(RAMError::OutOfBounds { address: 62 }))
            );
            assert_eq!(cpu.registers.get(A0), 0);
            assert_eq!(cpu.registers.pc(), 4);
        }

        #[test]
        fn store_out_of_bounds() {
            // addi x1, x0, -1
            // sw x1, 0(x1)
            let mut cpu = make_cpu(&hex!("fff00093 0010a023"), 64);

            cpu.tick().unwrap();

            assert_eq!(
                cpu.tick(),
                Err(CPUError::RAMError(RAMError::OutOfBounds {
                    address: 0xFFFF_FFFF
                }))
            );
        }

        #[test]
        fn fetch_out_of_bounds() {
            // jal x0, 64
            let mut cpu = make_cpu(&hex!("0400006f"), 64);

            cpu.tick().unwrap();

            assert_eq!(
                cpu.tick(),
                Err(CPUError::RAMError(RAMError::OutOfBounds { address: 64 }))
            );
        }
    }

    #[test]
    fn execute_without_fetch() {
        let mut cpu = CPU::new(RAM::new(16).unwrap());

        cpu.execute(Instruction::ADDI(InstructionI::new(
            crate::registers::A0,
            crate::registers::ZERO,
            1,
        )))
        .unwrap();

        assert_eq!(cpu.registers.get(crate::registers::A0), 1);
        assert_eq!(cpu.registers.pc(), 4);
    }

    #[test]
    fn error_messages() {
        let error = CPUError::from(RAMError::OutOfBounds { address: 0xFFFFE });

        assert_eq!(error.to_string(), "Memory access out of bounds: 0x000ffffe");

        let error = CPUError::from(DecodeError::UnknownInstruction { instruction: 0x73 });

        assert_eq!(error.to_string(), "Unknown instruction: 0x00000073");
    }

    #[test]
    fn fault_is_kept_after_clone() {
        let fault = CPUError::from(RAMError::OutOfBounds { address: 62 });
        let reported = fault.clone();

        assert_eq!(fault, reported);
        assert_eq!(
            crate::VMError::from(reported),
            crate::VMError::CPUError(CPUError::RAMError(RAMError::OutOfBounds {
                address: 62
            }))
        );
    }
}
