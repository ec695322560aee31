//! The 6502 core.
//!
//! <http://wiki.nesdev.com/w/index.php/CPU>

use crate::{
    bus::Bus,
    common::Powered,
    error::{Error, Result},
};
use instr::{AddrMode, Instr, Operation};
use std::fmt;

pub mod instr;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

const SP_BASE: u16 = 0x0100;
const POWER_ON_SP: u8 = 0xFD;
const POWER_ON_STATUS: u8 = StatusFlag::I as u8 | StatusFlag::U as u8;
const INTERRUPT_CYCLES: usize = 7;

// Status register layout, NV-BDIZC.
//
// http://wiki.nesdev.com/w/index.php/Status_flags
#[derive(Debug, Copy, Clone)]
pub enum StatusFlag {
    C = 1,        // Carry
    Z = 1 << 1,   // Zero
    I = 1 << 2,   // IRQ disable
    D = 1 << 3,   // Decimal (no effect on the 2A03)
    B = 1 << 4,   // Break: only ever set on pushed copies
    U = 1 << 5,   // Unused: always reads back set
    V = 1 << 6,   // Overflow
    N = 1 << 7,   // Negative
}
use StatusFlag::{B, I, N, U, Z};

/// Pending interrupt line. Reset outranks NMI, NMI outranks IRQ, and IRQ
/// stays pending while the I flag masks it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[must_use]
pub enum Interrupt {
    None,
    Irq,
    Nmi,
    Reset,
}

/// The CPU: registers, the pending-interrupt line, and the bus it owns.
///
/// `step` executes whole instructions and reports their cycle cost; the
/// per-instruction fields hold the decoded state between the addressing and
/// execution phases.
pub struct Cpu {
    pub bus: Bus,
    pub acc: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub pending: Interrupt,
    instr: Instr,
    abs_addr: u16,
    rel_addr: i8,
    page_crossed: bool,
    branch_taken: bool,
}

impl Cpu {
    pub fn new(bus: Bus) -> Self {
        Self {
            bus,
            acc: 0x00,
            x: 0x00,
            y: 0x00,
            sp: POWER_ON_SP,
            pc: 0x0000,
            status: POWER_ON_STATUS,
            pending: Interrupt::None,
            instr: Cpu::INSTRUCTIONS[0x00],
            abs_addr: 0x0000,
            rel_addr: 0,
            page_crossed: false,
            branch_taken: false,
        }
    }

    /// Executes one instruction, or services a pending interrupt, and
    /// returns the cycles consumed: the opcode's base timing plus at most
    /// one page-cross penalty, at most one branch-taken penalty, and any DMA
    /// stall the instruction triggered.
    ///
    /// # Errors
    ///
    /// Fails on unofficial opcodes and on accesses outside every mapped
    /// range; both leave the machine in undefined state.
    pub fn step(&mut self) -> Result<usize> {
        match self.pending {
            Interrupt::Reset => {
                self.pending = Interrupt::None;
                self.service_reset()?;
                return Ok(INTERRUPT_CYCLES);
            }
            Interrupt::Nmi => {
                self.pending = Interrupt::None;
                self.service_interrupt(NMI_VECTOR)?;
                return Ok(INTERRUPT_CYCLES);
            }
            Interrupt::Irq if !self.flag_set(I) => {
                self.pending = Interrupt::None;
                self.service_interrupt(IRQ_VECTOR)?;
                return Ok(INTERRUPT_CYCLES);
            }
            _ => (),
        }

        let opcode = self.load(self.pc)?;
        let instr = Cpu::INSTRUCTIONS[opcode as usize];
        if instr.op() == Operation::XXX {
            return Err(Error::IllegalOpcode {
                opcode,
                pc: self.pc,
            });
        }
        self.pc = self.pc.wrapping_add(1);
        self.instr = instr;
        self.page_crossed = false;
        self.branch_taken = false;

        match instr.addr_mode() {
            AddrMode::IMM => self.imm(),
            AddrMode::ZP0 => self.zp0()?,
            AddrMode::ZPX => self.zpx()?,
            AddrMode::ZPY => self.zpy()?,
            AddrMode::ABS => self.abs()?,
            AddrMode::ABX => self.abx()?,
            AddrMode::ABY => self.aby()?,
            AddrMode::IND => self.ind()?,
            AddrMode::IDX => self.idx()?,
            AddrMode::IDY => self.idy()?,
            AddrMode::REL => self.rel()?,
            AddrMode::ACC | AddrMode::IMP => (),
        }

        match instr.op() {
            Operation::ADC => self.adc()?,
            Operation::AND => self.and()?,
            Operation::ASL => self.asl()?,
            Operation::BCC => self.bcc(),
            Operation::BCS => self.bcs(),
            Operation::BEQ => self.beq(),
            Operation::BIT => self.bit()?,
            Operation::BMI => self.bmi(),
            Operation::BNE => self.bne(),
            Operation::BPL => self.bpl(),
            Operation::BRK => self.brk()?,
            Operation::BVC => self.bvc(),
            Operation::BVS => self.bvs(),
            Operation::CLC => self.clc(),
            Operation::CLD => self.cld(),
            Operation::CLI => self.cli(),
            Operation::CLV => self.clv(),
            Operation::CMP => self.cmp()?,
            Operation::CPX => self.cpx()?,
            Operation::CPY => self.cpy()?,
            Operation::DEC => self.dec()?,
            Operation::DEX => self.dex(),
            Operation::DEY => self.dey(),
            Operation::EOR => self.eor()?,
            Operation::INC => self.inc()?,
            Operation::INX => self.inx(),
            Operation::INY => self.iny(),
            Operation::JMP => self.jmp(),
            Operation::JSR => self.jsr()?,
            Operation::LDA => self.lda()?,
            Operation::LDX => self.ldx()?,
            Operation::LDY => self.ldy()?,
            Operation::LSR => self.lsr()?,
            Operation::NOP => (),
            Operation::ORA => self.ora()?,
            Operation::PHA => self.pha()?,
            Operation::PHP => self.php()?,
            Operation::PLA => self.pla()?,
            Operation::PLP => self.plp()?,
            Operation::ROL => self.rol()?,
            Operation::ROR => self.ror()?,
            Operation::RTI => self.rti()?,
            Operation::RTS => self.rts()?,
            Operation::SBC => self.sbc()?,
            Operation::SEC => self.sec(),
            Operation::SED => self.sed(),
            Operation::SEI => self.sei(),
            Operation::STA => self.sta()?,
            Operation::STX => self.stx()?,
            Operation::STY => self.sty()?,
            Operation::TAX => self.tax(),
            Operation::TAY => self.tay(),
            Operation::TSX => self.tsx(),
            Operation::TXA => self.txa(),
            Operation::TXS => self.txs(),
            Operation::TYA => self.tya(),
            Operation::XXX => unreachable!("rejected before dispatch"),
        }

        let mut cycles = instr.cycles();
        if instr.branch_penalty() {
            if self.branch_taken {
                cycles += 1;
                if self.page_crossed {
                    cycles += 1;
                }
            }
        } else if instr.page_penalty() && self.page_crossed {
            cycles += 1;
        }
        cycles += self.bus.take_dma_stall();
        Ok(cycles)
    }

    /// Edge from the PPU at the start of vblank; serviced at the next
    /// instruction boundary.
    pub fn set_nmi(&mut self) {
        self.pending = Interrupt::Nmi;
    }

    /// Level-triggered request; held until the I flag allows servicing.
    /// Reset and NMI outrank it.
    pub fn set_irq(&mut self) {
        if self.pending == Interrupt::None {
            self.pending = Interrupt::Irq;
        }
    }

    fn service_interrupt(&mut self, vector: u16) -> Result<()> {
        self.push_word(self.pc)?;
        // Hardware interrupts push with U set and B clear.
        self.push((self.status | U as u8) & !(B as u8))?;
        self.set_flag(I, true);
        self.pc = self.load_word(vector)?;
        Ok(())
    }

    fn service_reset(&mut self) -> Result<()> {
        self.sp = POWER_ON_SP;
        self.status = POWER_ON_STATUS;
        self.pc = self.load_word(RESET_VECTOR)?;
        Ok(())
    }

    // Status register helpers.

    pub(crate) fn flag_set(&self, flag: StatusFlag) -> bool {
        self.status & flag as u8 != 0
    }

    pub(crate) fn set_flag(&mut self, flag: StatusFlag, val: bool) {
        if val {
            self.status |= flag as u8;
        } else {
            self.status &= !(flag as u8);
        }
    }

    pub(crate) fn set_zn(&mut self, val: u8) {
        self.set_flag(Z, val == 0x00);
        self.set_flag(N, val & 0x80 == 0x80);
    }

    // Memory access. All roads lead through the bus.

    pub(crate) fn load(&mut self, addr: u16) -> Result<u8> {
        self.bus.load(addr)
    }

    pub(crate) fn store(&mut self, addr: u16, val: u8) -> Result<()> {
        self.bus.store(addr, val)
    }

    pub(crate) fn load_word(&mut self, addr: u16) -> Result<u16> {
        let lo = self.load(addr)?;
        let hi = self.load(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// 16-bit load that wraps within the zero page.
    pub(crate) fn load_word_zp(&mut self, addr: u8) -> Result<u16> {
        let lo = self.load(addr.into())?;
        let hi = self.load(addr.wrapping_add(1).into())?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Consumes one operand byte at PC.
    pub(crate) fn read_operand(&mut self) -> Result<u8> {
        let val = self.load(self.pc)?;
        self.pc = self.pc.wrapping_add(1);
        Ok(val)
    }

    /// Consumes a two-byte little-endian operand at PC.
    pub(crate) fn read_operand_word(&mut self) -> Result<u16> {
        let lo = self.read_operand()?;
        let hi = self.read_operand()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    // Stack, at $0100 + SP, growing downward.

    pub(crate) fn push(&mut self, val: u8) -> Result<()> {
        self.store(SP_BASE | u16::from(self.sp), val)?;
        self.sp = self.sp.wrapping_sub(1);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<u8> {
        self.sp = self.sp.wrapping_add(1);
        self.load(SP_BASE | u16::from(self.sp))
    }

    pub(crate) fn push_word(&mut self, val: u16) -> Result<()> {
        let [lo, hi] = val.to_le_bytes();
        self.push(hi)?;
        self.push(lo)
    }

    pub(crate) fn pop_word(&mut self) -> Result<u16> {
        let lo = self.pop()?;
        let hi = self.pop()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// The value the current instruction operates on: the accumulator for
    /// register forms, memory at the effective address otherwise.
    pub(crate) fn fetch(&mut self) -> Result<u8> {
        match self.instr.addr_mode() {
            AddrMode::ACC | AddrMode::IMP => Ok(self.acc),
            _ => self.load(self.abs_addr),
        }
    }

    /// Writes a result back where `fetch` found it.
    pub(crate) fn write_fetched(&mut self, val: u8) -> Result<()> {
        match self.instr.addr_mode() {
            AddrMode::ACC | AddrMode::IMP => {
                self.acc = val;
                Ok(())
            }
            AddrMode::IMM => Ok(()),
            _ => self.store(self.abs_addr, val),
        }
    }

    /// Takes the decoded branch: +1 cycle, and a second if the target sits
    /// on a different page than the branch opcode.
    pub(crate) fn branch(&mut self) {
        let target = self.pc.wrapping_add(self.rel_addr as u16);
        self.page_crossed = Cpu::pages_differ(self.pc.wrapping_sub(2), target);
        self.pc = target;
        self.branch_taken = true;
    }

    pub(crate) const fn pages_differ(addr1: u16, addr2: u16) -> bool {
        addr1 & 0xFF00 != addr2 & 0xFF00
    }
}

impl Powered for Cpu {
    fn reset(&mut self) {
        self.bus.reset();
        self.set_flag(I, true);
        self.pending = Interrupt::Reset;
    }

    fn power_cycle(&mut self) {
        self.bus.power_cycle();
        self.acc = 0x00;
        self.x = 0x00;
        self.y = 0x00;
        self.sp = POWER_ON_SP;
        self.status = POWER_ON_STATUS;
        self.pending = Interrupt::Reset;
    }
}

impl fmt::Debug for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cpu {{ ${:04X} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} }}",
            self.pc, self.acc, self.x, self.y, self.status, self.sp
        )
    }
}
