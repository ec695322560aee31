//! The 6502 instruction table, addressing modes, and operation handlers.
//!
//! <http://wiki.nesdev.com/w/index.php/6502_instructions>

use crate::{
    cpu::{
        Cpu,
        StatusFlag::{B, C, D, I, N, U, V, Z},
        IRQ_VECTOR,
    },
    error::Result,
};

/// Official 6502 operations. `XXX` marks the unofficial opcodes, which are
/// out of scope and fatal to execute.
#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum Operation {
    ADC, AND, ASL, BCC, BCS, BEQ, BIT, BMI, BNE, BPL, BRK, BVC, BVS, CLC, CLD,
    CLI, CLV, CMP, CPX, CPY, DEC, DEX, DEY, EOR, INC, INX, INY, JMP, JSR, LDA,
    LDX, LDY, LSR, NOP, ORA, PHA, PHP, PLA, PLP, ROL, ROR, RTI, RTS, SBC, SEC,
    SED, SEI, STA, STX, STY, TAX, TAY, TSX, TXA, TXS, TYA, XXX,
}

#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum AddrMode {
    IMM,
    ZP0, ZPX, ZPY,
    ABS, ABX, ABY,
    IND, IDX, IDY,
    REL, ACC, IMP,
}

use AddrMode::{ABS, ABX, ABY, ACC, IDX, IDY, IMM, IMP, IND, REL, ZP0, ZPX, ZPY};
use Operation::{
    ADC, AND, ASL, BCC, BCS, BEQ, BIT, BMI, BNE, BPL, BRK, BVC, BVS, CLC, CLD, CLI, CLV, CMP,
    CPX, CPY, DEC, DEX, DEY, EOR, INC, INX, INY, JMP, JSR, LDA, LDX, LDY, LSR, NOP, ORA, PHA,
    PHP, PLA, PLP, ROL, ROR, RTI, RTS, SBC, SEC, SED, SEI, STA, STX, STY, TAX, TAY, TSX, TXA,
    TXS, TYA, XXX,
};

/// One decoded opcode: operation, addressing mode, base cycle count, and
/// whether page crossings or taken branches add a cycle.
#[derive(Copy, Clone, PartialEq, Eq)]
#[must_use]
pub struct Instr {
    opcode: u8,
    addr_mode: AddrMode,
    op: Operation,
    cycles: usize,
    page_penalty: bool,
    branch_penalty: bool,
}

impl Instr {
    #[must_use]
    pub const fn opcode(&self) -> u8 {
        self.opcode
    }

    pub const fn addr_mode(&self) -> AddrMode {
        self.addr_mode
    }

    pub const fn op(&self) -> Operation {
        self.op
    }

    #[must_use]
    pub const fn cycles(&self) -> usize {
        self.cycles
    }

    #[must_use]
    pub const fn page_penalty(&self) -> bool {
        self.page_penalty
    }

    #[must_use]
    pub const fn branch_penalty(&self) -> bool {
        self.branch_penalty
    }
}

impl std::fmt::Debug for Instr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "${:02X} {:?} {:?} ({} cycles)",
            self.opcode, self.op, self.addr_mode, self.cycles
        )
    }
}

// Fixed-timing entry.
const fn op(opcode: u8, addr_mode: AddrMode, op: Operation, cycles: usize) -> Instr {
    Instr {
        opcode,
        addr_mode,
        op,
        cycles,
        page_penalty: false,
        branch_penalty: false,
    }
}

// Read entry that pays one cycle for crossing a page.
const fn pg(opcode: u8, addr_mode: AddrMode, op: Operation, cycles: usize) -> Instr {
    Instr {
        opcode,
        addr_mode,
        op,
        cycles,
        page_penalty: true,
        branch_penalty: false,
    }
}

// Branch entry: +1 when taken, +1 more when the target crosses a page.
const fn br(opcode: u8, op: Operation) -> Instr {
    Instr {
        opcode,
        addr_mode: REL,
        op,
        cycles: 2,
        page_penalty: false,
        branch_penalty: true,
    }
}

// Unofficial opcode slot.
const fn ill(opcode: u8) -> Instr {
    op(opcode, IMP, XXX, 2)
}

impl Cpu {
    /// All 256 opcode slots, indexed by opcode.
    #[rustfmt::skip]
    pub const INSTRUCTIONS: [Instr; 256] = [
        op(0x00, IMM, BRK, 7), op(0x01, IDX, ORA, 6), ill(0x02),             ill(0x03),
        ill(0x04),             op(0x05, ZP0, ORA, 3), op(0x06, ZP0, ASL, 5), ill(0x07),
        op(0x08, IMP, PHP, 3), op(0x09, IMM, ORA, 2), op(0x0A, ACC, ASL, 2), ill(0x0B),
        ill(0x0C),             op(0x0D, ABS, ORA, 4), op(0x0E, ABS, ASL, 6), ill(0x0F),
        br(0x10, BPL),         pg(0x11, IDY, ORA, 5), ill(0x12),             ill(0x13),
        ill(0x14),             op(0x15, ZPX, ORA, 4), op(0x16, ZPX, ASL, 6), ill(0x17),
        op(0x18, IMP, CLC, 2), pg(0x19, ABY, ORA, 4), ill(0x1A),             ill(0x1B),
        ill(0x1C),             pg(0x1D, ABX, ORA, 4), op(0x1E, ABX, ASL, 7), ill(0x1F),
        op(0x20, ABS, JSR, 6), op(0x21, IDX, AND, 6), ill(0x22),             ill(0x23),
        op(0x24, ZP0, BIT, 3), op(0x25, ZP0, AND, 3), op(0x26, ZP0, ROL, 5), ill(0x27),
        op(0x28, IMP, PLP, 4), op(0x29, IMM, AND, 2), op(0x2A, ACC, ROL, 2), ill(0x2B),
        op(0x2C, ABS, BIT, 4), op(0x2D, ABS, AND, 4), op(0x2E, ABS, ROL, 6), ill(0x2F),
        br(0x30, BMI),         pg(0x31, IDY, AND, 5), ill(0x32),             ill(0x33),
        ill(0x34),             op(0x35, ZPX, AND, 4), op(0x36, ZPX, ROL, 6), ill(0x37),
        op(0x38, IMP, SEC, 2), pg(0x39, ABY, AND, 4), ill(0x3A),             ill(0x3B),
        ill(0x3C),             pg(0x3D, ABX, AND, 4), op(0x3E, ABX, ROL, 7), ill(0x3F),
        op(0x40, IMP, RTI, 6), op(0x41, IDX, EOR, 6), ill(0x42),             ill(0x43),
        ill(0x44),             op(0x45, ZP0, EOR, 3), op(0x46, ZP0, LSR, 5), ill(0x47),
        op(0x48, IMP, PHA, 3), op(0x49, IMM, EOR, 2), op(0x4A, ACC, LSR, 2), ill(0x4B),
        op(0x4C, ABS, JMP, 3), op(0x4D, ABS, EOR, 4), op(0x4E, ABS, LSR, 6), ill(0x4F),
        br(0x50, BVC),         pg(0x51, IDY, EOR, 5), ill(0x52),             ill(0x53),
        ill(0x54),             op(0x55, ZPX, EOR, 4), op(0x56, ZPX, LSR, 6), ill(0x57),
        op(0x58, IMP, CLI, 2), pg(0x59, ABY, EOR, 4), ill(0x5A),             ill(0x5B),
        ill(0x5C),             pg(0x5D, ABX, EOR, 4), op(0x5E, ABX, LSR, 7), ill(0x5F),
        op(0x60, IMP, RTS, 6), op(0x61, IDX, ADC, 6), ill(0x62),             ill(0x63),
        ill(0x64),             op(0x65, ZP0, ADC, 3), op(0x66, ZP0, ROR, 5), ill(0x67),
        op(0x68, IMP, PLA, 4), op(0x69, IMM, ADC, 2), op(0x6A, ACC, ROR, 2), ill(0x6B),
        op(0x6C, IND, JMP, 5), op(0x6D, ABS, ADC, 4), op(0x6E, ABS, ROR, 6), ill(0x6F),
        br(0x70, BVS),         pg(0x71, IDY, ADC, 5), ill(0x72),             ill(0x73),
        ill(0x74),             op(0x75, ZPX, ADC, 4), op(0x76, ZPX, ROR, 6), ill(0x77),
        op(0x78, IMP, SEI, 2), pg(0x79, ABY, ADC, 4), ill(0x7A),             ill(0x7B),
        ill(0x7C),             pg(0x7D, ABX, ADC, 4), op(0x7E, ABX, ROR, 7), ill(0x7F),
        ill(0x80),             op(0x81, IDX, STA, 6), ill(0x82),             ill(0x83),
        op(0x84, ZP0, STY, 3), op(0x85, ZP0, STA, 3), op(0x86, ZP0, STX, 3), ill(0x87),
        op(0x88, IMP, DEY, 2), ill(0x89),             op(0x8A, IMP, TXA, 2), ill(0x8B),
        op(0x8C, ABS, STY, 4), op(0x8D, ABS, STA, 4), op(0x8E, ABS, STX, 4), ill(0x8F),
        br(0x90, BCC),         op(0x91, IDY, STA, 6), ill(0x92),             ill(0x93),
        op(0x94, ZPX, STY, 4), op(0x95, ZPX, STA, 4), op(0x96, ZPY, STX, 4), ill(0x97),
        op(0x98, IMP, TYA, 2), op(0x99, ABY, STA, 5), op(0x9A, IMP, TXS, 2), ill(0x9B),
        ill(0x9C),             op(0x9D, ABX, STA, 5), ill(0x9E),             ill(0x9F),
        op(0xA0, IMM, LDY, 2), op(0xA1, IDX, LDA, 6), op(0xA2, IMM, LDX, 2), ill(0xA3),
        op(0xA4, ZP0, LDY, 3), op(0xA5, ZP0, LDA, 3), op(0xA6, ZP0, LDX, 3), ill(0xA7),
        op(0xA8, IMP, TAY, 2), op(0xA9, IMM, LDA, 2), op(0xAA, IMP, TAX, 2), ill(0xAB),
        op(0xAC, ABS, LDY, 4), op(0xAD, ABS, LDA, 4), op(0xAE, ABS, LDX, 4), ill(0xAF),
        br(0xB0, BCS),         pg(0xB1, IDY, LDA, 5), ill(0xB2),             ill(0xB3),
        op(0xB4, ZPX, LDY, 4), op(0xB5, ZPX, LDA, 4), op(0xB6, ZPY, LDX, 4), ill(0xB7),
        op(0xB8, IMP, CLV, 2), pg(0xB9, ABY, LDA, 4), op(0xBA, IMP, TSX, 2), ill(0xBB),
        pg(0xBC, ABX, LDY, 4), pg(0xBD, ABX, LDA, 4), pg(0xBE, ABY, LDX, 4), ill(0xBF),
        op(0xC0, IMM, CPY, 2), op(0xC1, IDX, CMP, 6), ill(0xC2),             ill(0xC3),
        op(0xC4, ZP0, CPY, 3), op(0xC5, ZP0, CMP, 3), op(0xC6, ZP0, DEC, 5), ill(0xC7),
        op(0xC8, IMP, INY, 2), op(0xC9, IMM, CMP, 2), op(0xCA, IMP, DEX, 2), ill(0xCB),
        op(0xCC, ABS, CPY, 4), op(0xCD, ABS, CMP, 4), op(0xCE, ABS, DEC, 6), ill(0xCF),
        br(0xD0, BNE),         pg(0xD1, IDY, CMP, 5), ill(0xD2),             ill(0xD3),
        ill(0xD4),             op(0xD5, ZPX, CMP, 4), op(0xD6, ZPX, DEC, 6), ill(0xD7),
        op(0xD8, IMP, CLD, 2), pg(0xD9, ABY, CMP, 4), ill(0xDA),             ill(0xDB),
        ill(0xDC),             pg(0xDD, ABX, CMP, 4), op(0xDE, ABX, DEC, 7), ill(0xDF),
        op(0xE0, IMM, CPX, 2), op(0xE1, IDX, SBC, 6), ill(0xE2),             ill(0xE3),
        op(0xE4, ZP0, CPX, 3), op(0xE5, ZP0, SBC, 3), op(0xE6, ZP0, INC, 5), ill(0xE7),
        op(0xE8, IMP, INX, 2), op(0xE9, IMM, SBC, 2), op(0xEA, IMP, NOP, 2), ill(0xEB),
        op(0xEC, ABS, CPX, 4), op(0xED, ABS, SBC, 4), op(0xEE, ABS, INC, 6), ill(0xEF),
        br(0xF0, BEQ),         pg(0xF1, IDY, SBC, 5), ill(0xF2),             ill(0xF3),
        ill(0xF4),             op(0xF5, ZPX, SBC, 4), op(0xF6, ZPX, INC, 6), ill(0xF7),
        op(0xF8, IMP, SED, 2), pg(0xF9, ABY, SBC, 4), ill(0xFA),             ill(0xFB),
        ill(0xFC),             pg(0xFD, ABX, SBC, 4), op(0xFE, ABX, INC, 7), ill(0xFF),
    ];
}

/// Addressing mode handlers. Each consumes the instruction's operand bytes
/// and leaves the effective address in `abs_addr` (or the branch offset in
/// `rel_addr`), recording page crossings where the hardware charges for
/// them.
impl Cpu {
    /// The operand byte itself is the value.
    pub(super) fn imm(&mut self) {
        self.abs_addr = self.pc;
        self.pc = self.pc.wrapping_add(1);
    }

    /// One-byte address into the zero page.
    pub(super) fn zp0(&mut self) -> Result<()> {
        self.abs_addr = u16::from(self.read_operand()?);
        Ok(())
    }

    /// Zero page plus X, wrapping within the page.
    pub(super) fn zpx(&mut self) -> Result<()> {
        self.abs_addr = u16::from(self.read_operand()?.wrapping_add(self.x));
        Ok(())
    }

    /// Zero page plus Y, wrapping within the page.
    pub(super) fn zpy(&mut self) -> Result<()> {
        self.abs_addr = u16::from(self.read_operand()?.wrapping_add(self.y));
        Ok(())
    }

    /// Full 16-bit address.
    pub(super) fn abs(&mut self) -> Result<()> {
        self.abs_addr = self.read_operand_word()?;
        Ok(())
    }

    /// Absolute plus X; crossing into the next page costs read
    /// instructions a cycle.
    pub(super) fn abx(&mut self) -> Result<()> {
        let base = self.read_operand_word()?;
        self.abs_addr = base.wrapping_add(self.x.into());
        self.page_crossed = Cpu::pages_differ(base, self.abs_addr);
        Ok(())
    }

    /// Absolute plus Y, with the same page-cross accounting.
    pub(super) fn aby(&mut self) -> Result<()> {
        let base = self.read_operand_word()?;
        self.abs_addr = base.wrapping_add(self.y.into());
        self.page_crossed = Cpu::pages_differ(base, self.abs_addr);
        Ok(())
    }

    /// JMP's pointer form. The pointer's high byte is fetched from the same
    /// page as the low byte, reproducing the hardware's page-wrap bug.
    pub(super) fn ind(&mut self) -> Result<()> {
        let ptr = self.read_operand_word()?;
        let lo = self.load(ptr)?;
        let hi = if ptr & 0x00FF == 0x00FF {
            self.load(ptr & 0xFF00)?
        } else {
            self.load(ptr + 1)?
        };
        self.abs_addr = u16::from_le_bytes([lo, hi]);
        Ok(())
    }

    /// ($zp,X): the X-offset zero-page location holds the effective address.
    pub(super) fn idx(&mut self) -> Result<()> {
        let zp = self.read_operand()?.wrapping_add(self.x);
        self.abs_addr = self.load_word_zp(zp)?;
        Ok(())
    }

    /// ($zp),Y: the zero-page pointer plus Y, with page-cross accounting.
    pub(super) fn idy(&mut self) -> Result<()> {
        let zp = self.read_operand()?;
        let base = self.load_word_zp(zp)?;
        self.abs_addr = base.wrapping_add(self.y.into());
        self.page_crossed = Cpu::pages_differ(base, self.abs_addr);
        Ok(())
    }

    /// Signed 8-bit branch offset from the PC after the operand.
    pub(super) fn rel(&mut self) -> Result<()> {
        self.rel_addr = self.read_operand()? as i8;
        Ok(())
    }
}

/// Operation handlers.
impl Cpu {
    // ADC and SBC share this core; SBC feeds the complemented operand in.
    fn add(&mut self, val: u8) {
        let acc = self.acc;
        let sum = u16::from(acc) + u16::from(val) + u16::from(self.flag_set(C));
        self.set_flag(C, sum > 0xFF);
        let result = sum as u8;
        // Overflow: both operands share a sign the result doesn't.
        self.set_flag(V, (acc ^ result) & (val ^ result) & 0x80 != 0);
        self.acc = result;
        self.set_zn(result);
    }

    pub(super) fn adc(&mut self) -> Result<()> {
        let val = self.fetch()?;
        self.add(val);
        Ok(())
    }

    pub(super) fn sbc(&mut self) -> Result<()> {
        let val = self.fetch()?;
        self.add(val ^ 0xFF);
        Ok(())
    }

    pub(super) fn and(&mut self) -> Result<()> {
        self.acc &= self.fetch()?;
        self.set_zn(self.acc);
        Ok(())
    }

    pub(super) fn eor(&mut self) -> Result<()> {
        self.acc ^= self.fetch()?;
        self.set_zn(self.acc);
        Ok(())
    }

    pub(super) fn ora(&mut self) -> Result<()> {
        self.acc |= self.fetch()?;
        self.set_zn(self.acc);
        Ok(())
    }

    /// Z from A & M; V and N copied straight out of bits 6 and 7 of M.
    pub(super) fn bit(&mut self) -> Result<()> {
        let val = self.fetch()?;
        self.set_flag(Z, self.acc & val == 0);
        self.set_flag(V, val & 0x40 == 0x40);
        self.set_flag(N, val & 0x80 == 0x80);
        Ok(())
    }

    fn compare(&mut self, reg: u8) -> Result<()> {
        let val = self.fetch()?;
        self.set_flag(C, reg >= val);
        self.set_zn(reg.wrapping_sub(val));
        Ok(())
    }

    pub(super) fn cmp(&mut self) -> Result<()> {
        let acc = self.acc;
        self.compare(acc)
    }

    pub(super) fn cpx(&mut self) -> Result<()> {
        let x = self.x;
        self.compare(x)
    }

    pub(super) fn cpy(&mut self) -> Result<()> {
        let y = self.y;
        self.compare(y)
    }

    pub(super) fn asl(&mut self) -> Result<()> {
        let val = self.fetch()?;
        self.set_flag(C, val & 0x80 == 0x80);
        let result = val << 1;
        self.write_fetched(result)?;
        self.set_zn(result);
        Ok(())
    }

    pub(super) fn lsr(&mut self) -> Result<()> {
        let val = self.fetch()?;
        self.set_flag(C, val & 0x01 == 0x01);
        let result = val >> 1;
        self.write_fetched(result)?;
        self.set_zn(result);
        Ok(())
    }

    pub(super) fn rol(&mut self) -> Result<()> {
        let val = self.fetch()?;
        let carry_in = u8::from(self.flag_set(C));
        self.set_flag(C, val & 0x80 == 0x80);
        let result = (val << 1) | carry_in;
        self.write_fetched(result)?;
        self.set_zn(result);
        Ok(())
    }

    pub(super) fn ror(&mut self) -> Result<()> {
        let val = self.fetch()?;
        let carry_in = u8::from(self.flag_set(C));
        self.set_flag(C, val & 0x01 == 0x01);
        let result = (val >> 1) | (carry_in << 7);
        self.write_fetched(result)?;
        self.set_zn(result);
        Ok(())
    }

    pub(super) fn inc(&mut self) -> Result<()> {
        let result = self.fetch()?.wrapping_add(1);
        self.write_fetched(result)?;
        self.set_zn(result);
        Ok(())
    }

    pub(super) fn dec(&mut self) -> Result<()> {
        let result = self.fetch()?.wrapping_sub(1);
        self.write_fetched(result)?;
        self.set_zn(result);
        Ok(())
    }

    pub(super) fn lda(&mut self) -> Result<()> {
        self.acc = self.fetch()?;
        self.set_zn(self.acc);
        Ok(())
    }

    pub(super) fn ldx(&mut self) -> Result<()> {
        self.x = self.fetch()?;
        self.set_zn(self.x);
        Ok(())
    }

    pub(super) fn ldy(&mut self) -> Result<()> {
        self.y = self.fetch()?;
        self.set_zn(self.y);
        Ok(())
    }

    pub(super) fn sta(&mut self) -> Result<()> {
        self.store(self.abs_addr, self.acc)
    }

    pub(super) fn stx(&mut self) -> Result<()> {
        self.store(self.abs_addr, self.x)
    }

    pub(super) fn sty(&mut self) -> Result<()> {
        self.store(self.abs_addr, self.y)
    }

    pub(super) fn jmp(&mut self) {
        self.pc = self.abs_addr;
    }

    /// Pushes the address of the JSR's last byte, high byte first.
    pub(super) fn jsr(&mut self) -> Result<()> {
        self.push_word(self.pc.wrapping_sub(1))?;
        self.pc = self.abs_addr;
        Ok(())
    }

    pub(super) fn rts(&mut self) -> Result<()> {
        self.pc = self.pop_word()?.wrapping_add(1);
        Ok(())
    }

    /// Software interrupt: B and U ride along on the pushed flags.
    pub(super) fn brk(&mut self) -> Result<()> {
        self.push_word(self.pc)?;
        self.push((self.status | B as u8) | U as u8)?;
        self.set_flag(I, true);
        self.pc = self.load_word(IRQ_VECTOR)?;
        Ok(())
    }

    pub(super) fn rti(&mut self) -> Result<()> {
        let status = self.pop()?;
        self.status = (status | U as u8) & !(B as u8);
        self.pc = self.pop_word()?;
        Ok(())
    }

    pub(super) fn pha(&mut self) -> Result<()> {
        self.push(self.acc)
    }

    pub(super) fn pla(&mut self) -> Result<()> {
        self.acc = self.pop()?;
        self.set_zn(self.acc);
        Ok(())
    }

    pub(super) fn php(&mut self) -> Result<()> {
        self.push((self.status | B as u8) | U as u8)
    }

    /// B is a push-time artifact, not a real flag; it never lands back in
    /// the status register.
    pub(super) fn plp(&mut self) -> Result<()> {
        let status = self.pop()?;
        self.status = (status | U as u8) & !(B as u8);
        Ok(())
    }

    pub(super) fn bcc(&mut self) {
        if !self.flag_set(C) {
            self.branch();
        }
    }

    pub(super) fn bcs(&mut self) {
        if self.flag_set(C) {
            self.branch();
        }
    }

    pub(super) fn bne(&mut self) {
        if !self.flag_set(Z) {
            self.branch();
        }
    }

    pub(super) fn beq(&mut self) {
        if self.flag_set(Z) {
            self.branch();
        }
    }

    pub(super) fn bpl(&mut self) {
        if !self.flag_set(N) {
            self.branch();
        }
    }

    pub(super) fn bmi(&mut self) {
        if self.flag_set(N) {
            self.branch();
        }
    }

    pub(super) fn bvc(&mut self) {
        if !self.flag_set(V) {
            self.branch();
        }
    }

    pub(super) fn bvs(&mut self) {
        if self.flag_set(V) {
            self.branch();
        }
    }

    pub(super) fn tax(&mut self) {
        self.x = self.acc;
        self.set_zn(self.x);
    }

    pub(super) fn tay(&mut self) {
        self.y = self.acc;
        self.set_zn(self.y);
    }

    pub(super) fn txa(&mut self) {
        self.acc = self.x;
        self.set_zn(self.acc);
    }

    pub(super) fn tya(&mut self) {
        self.acc = self.y;
        self.set_zn(self.acc);
    }

    pub(super) fn tsx(&mut self) {
        self.x = self.sp;
        self.set_zn(self.x);
    }

    pub(super) fn txs(&mut self) {
        self.sp = self.x;
    }

    pub(super) fn inx(&mut self) {
        self.x = self.x.wrapping_add(1);
        self.set_zn(self.x);
    }

    pub(super) fn iny(&mut self) {
        self.y = self.y.wrapping_add(1);
        self.set_zn(self.y);
    }

    pub(super) fn dex(&mut self) {
        self.x = self.x.wrapping_sub(1);
        self.set_zn(self.x);
    }

    pub(super) fn dey(&mut self) {
        self.y = self.y.wrapping_sub(1);
        self.set_zn(self.y);
    }

    pub(super) fn clc(&mut self) {
        self.set_flag(C, false);
    }

    pub(super) fn cld(&mut self) {
        self.set_flag(D, false);
    }

    pub(super) fn cli(&mut self) {
        self.set_flag(I, false);
    }

    pub(super) fn clv(&mut self) {
        self.set_flag(V, false);
    }

    pub(super) fn sec(&mut self) {
        self.set_flag(C, true);
    }

    pub(super) fn sed(&mut self) {
        self.set_flag(D, true);
    }

    pub(super) fn sei(&mut self) {
        self.set_flag(I, true);
    }
}
