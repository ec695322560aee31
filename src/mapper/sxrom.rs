//! SxROM / MMC1 (Mapper 001)
//!
//! <http://wiki.nesdev.com/w/index.php/SxROM>
//! <http://wiki.nesdev.com/w/index.php/MMC1>

use crate::{
    cart::Cartridge,
    error::{Error, Result},
    mapper::{Mapper, MapperRef, Mirroring},
};
use std::{cell::RefCell, fmt, rc::Rc};
use tracing::trace;

const PRG_RAM_SIZE: usize = 8 * 1024;
const CHR_RAM_SIZE: usize = 8 * 1024;

// Power-on control value: switch the first PRG window, fix the last.
const CTRL_POWER_ON: u8 = 0x0C;

/// MMC1: serially-programmed bank switching with live mirroring control.
///
/// Internal registers are written one bit at a time through $8000..=$FFFF.
/// Control register layout `CPPMM`: C selects 4K CHR banking, PP the PRG
/// bank mode, MM the mirroring mode.
pub struct Sxrom {
    cart: Cartridge,
    prg_ram: Vec<u8>,
    chr_ram: Vec<u8>,
    ctrl: u8,      // $8000..=$9FFF
    chr_bank0: u8, // $A000..=$BFFF
    chr_bank1: u8, // $C000..=$DFFF
    prg_bank: u8,  // $E000..=$FFFF
    accumulator: u8,
    write_count: u8,
}

impl Sxrom {
    pub fn load(cart: Cartridge) -> MapperRef {
        Rc::new(RefCell::new(Self {
            cart,
            prg_ram: vec![0x00; PRG_RAM_SIZE],
            chr_ram: vec![0x00; CHR_RAM_SIZE],
            ctrl: CTRL_POWER_ON,
            chr_bank0: 0x00,
            chr_bank1: 0x00,
            prg_bank: 0x00,
            accumulator: 0x00,
            write_count: 0,
        }))
    }

    /// Serializes one bit into the accumulator. The fifth write routes the
    /// assembled 5-bit value to the register selected by the address. A write
    /// with bit 7 set discards the sequence and re-fixes the last PRG bank,
    /// without consuming the written bit.
    fn write_register(&mut self, addr: u16, val: u8) {
        if val & 0x80 == 0x80 {
            self.accumulator = 0x00;
            self.write_count = 0;
            self.ctrl |= CTRL_POWER_ON;
            return;
        }

        self.accumulator |= (val & 0x01) << self.write_count;
        self.write_count += 1;
        if self.write_count == 5 {
            match addr {
                0x8000..=0x9FFF => self.ctrl = self.accumulator,
                0xA000..=0xBFFF => self.chr_bank0 = self.accumulator,
                0xC000..=0xDFFF => self.chr_bank1 = self.accumulator,
                _ => self.prg_bank = self.accumulator,
            }
            trace!(
                "mmc1 register ${addr:04X} <- ${:02X} (ctrl ${:02X})",
                self.accumulator,
                self.ctrl,
            );
            self.accumulator = 0x00;
            self.write_count = 0;
        }
    }

    const fn prg_bank_mode(&self) -> u8 {
        (self.ctrl >> 2) & 0x03
    }

    const fn chr_banked_4k(&self) -> bool {
        (self.ctrl >> 4) & 0x01 == 0x01
    }
}

impl Mapper for Sxrom {
    fn load_prg(&self, addr: u16) -> Result<u8> {
        match addr {
            0x6000..=0x7FFF => Ok(self.prg_ram[(addr - 0x6000) as usize]),
            0x8000..=0xFFFF => {
                let last_bank = self.cart.header.prg_rom_banks.saturating_sub(1);
                let bank = match self.prg_bank_mode() {
                    // 32K switching ignores the low bank bit.
                    0 | 1 => (self.prg_bank & 0xFE) | (addr >> 14 & 0x01) as u8,
                    2 => {
                        if addr <= 0xBFFF {
                            0
                        } else {
                            self.prg_bank
                        }
                    }
                    _ => {
                        if addr <= 0xBFFF {
                            self.prg_bank
                        } else {
                            last_bank
                        }
                    }
                };
                let bank = bank % self.cart.header.prg_rom_banks.max(1);
                Ok(self.cart.prg_rom[((bank as usize) << 14) | (addr & 0x3FFF) as usize])
            }
            _ => Err(Error::InvalidBusAddress { addr }),
        }
    }

    fn store_prg(&mut self, addr: u16, val: u8) -> Result<()> {
        match addr {
            // PRG-RAM bypasses the serial interface entirely.
            0x6000..=0x7FFF => {
                self.prg_ram[(addr - 0x6000) as usize] = val;
                Ok(())
            }
            0x8000..=0xFFFF => {
                self.write_register(addr, val);
                Ok(())
            }
            _ => Err(Error::InvalidBusAddress { addr }),
        }
    }

    fn load_chr(&self, addr: u16) -> Result<u8> {
        if self.cart.header.chr_rom_banks == 0 {
            return Ok(self.chr_ram[addr as usize]);
        }
        let bank = if addr < 0x1000 {
            self.chr_bank0
        } else if self.chr_banked_4k() {
            self.chr_bank1
        } else {
            self.chr_bank0 + 1
        };
        let bank = bank as usize % (self.cart.chr_rom.len() >> 12).max(1);
        Ok(self.cart.chr_rom[(bank << 12) | (addr & 0x0FFF) as usize])
    }

    fn store_chr(&mut self, addr: u16, val: u8) -> Result<()> {
        // With CHR-ROM present the write lands in the shadowed RAM, which
        // reads never see.
        self.chr_ram[addr as usize] = val;
        Ok(())
    }

    fn mirroring(&self) -> Mirroring {
        match self.ctrl & 0x03 {
            0 => Mirroring::SingleScreen0,
            1 => Mirroring::SingleScreen1,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        }
    }
}

impl fmt::Debug for Sxrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sxrom")
            .field("cart", &self.cart)
            .field("ctrl", &format_args!("${:02X}", self.ctrl))
            .field("chr_bank0", &self.chr_bank0)
            .field("chr_bank1", &self.chr_bank1)
            .field("prg_bank", &self.prg_bank)
            .field("mirroring", &self.mirroring())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::build_rom;

    fn sxrom(prg_banks: u8, chr_banks: u8) -> Rc<RefCell<Sxrom>> {
        let rom = build_rom(prg_banks, chr_banks, 1, 0x00);
        let cart = Cartridge::from_rom(&mut &rom[..]).expect("valid cart");
        Rc::new(RefCell::new(Sxrom {
            cart,
            prg_ram: vec![0x00; PRG_RAM_SIZE],
            chr_ram: vec![0x00; CHR_RAM_SIZE],
            ctrl: CTRL_POWER_ON,
            chr_bank0: 0x00,
            chr_bank1: 0x00,
            prg_bank: 0x00,
            accumulator: 0x00,
            write_count: 0,
        }))
    }

    fn write_serial(mapper: &mut Sxrom, addr: u16, bits: [u8; 5]) {
        for bit in bits {
            mapper.store_prg(addr, bit).expect("mapped");
        }
    }

    #[test]
    fn serial_writes_assemble_low_bit_first() {
        let mapper = sxrom(4, 1);
        let mut mapper = mapper.borrow_mut();
        write_serial(&mut mapper, 0xE000, [1, 0, 1, 0, 1]);
        assert_eq!(mapper.prg_bank, 0b10101);
        assert_eq!(mapper.write_count, 0, "sequence consumed");
    }

    #[test]
    fn reset_bit_discards_sequence_and_fixes_last_bank() {
        let mapper = sxrom(4, 1);
        let mut mapper = mapper.borrow_mut();
        // Point the serial sequence at the control register, then abort it.
        mapper.store_prg(0x8000, 1).expect("mapped");
        mapper.store_prg(0x8000, 1).expect("mapped");
        mapper.ctrl = 0x00;
        mapper.store_prg(0x9FFF, 0x80).expect("mapped");
        assert_eq!(mapper.ctrl, CTRL_POWER_ON);
        assert_eq!(mapper.accumulator, 0);
        assert_eq!(mapper.write_count, 0);
        // A fresh sequence starts from bit zero again.
        write_serial(&mut mapper, 0xE000, [0, 1, 0, 0, 0]);
        assert_eq!(mapper.prg_bank, 0b00010);
    }

    #[test]
    fn prg_bank_modes() {
        let mapper = sxrom(4, 1);
        let mut mapper = mapper.borrow_mut();
        mapper.prg_bank = 2;

        // Mode 3 (power-on): first window switches, last bank fixed.
        assert_eq!(mapper.load_prg(0x8000).expect("mapped"), 2);
        assert_eq!(mapper.load_prg(0xC000).expect("mapped"), 3);

        // Mode 2: first bank fixed, second window switches.
        mapper.ctrl = 0x08;
        assert_eq!(mapper.load_prg(0x8000).expect("mapped"), 0);
        assert_eq!(mapper.load_prg(0xC000).expect("mapped"), 2);

        // Modes 0/1: 32K switching drops the low bank bit.
        mapper.ctrl = 0x00;
        mapper.prg_bank = 3;
        assert_eq!(mapper.load_prg(0x8000).expect("mapped"), 2);
        assert_eq!(mapper.load_prg(0xC000).expect("mapped"), 3);
    }

    #[test]
    fn prg_ram_bypasses_serial_interface() {
        let mapper = sxrom(2, 1);
        let mut mapper = mapper.borrow_mut();
        mapper.store_prg(0x6000, 0x81).expect("mapped");
        assert_eq!(mapper.load_prg(0x6000).expect("mapped"), 0x81);
        assert_eq!(mapper.write_count, 0);
    }

    #[test]
    fn mirroring_tracks_control() {
        let mapper = sxrom(2, 1);
        let mut mapper = mapper.borrow_mut();
        assert_eq!(mapper.mirroring(), Mirroring::SingleScreen0);
        write_serial(&mut mapper, 0x8000, [0, 1, 1, 1, 0]);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);
        write_serial(&mut mapper, 0x8000, [1, 1, 1, 1, 0]);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);
    }

    #[test]
    fn chr_ram_backs_chr_less_carts() {
        let mapper = sxrom(2, 0);
        let mut mapper = mapper.borrow_mut();
        mapper.store_chr(0x0123, 0x42).expect("writable");
        assert_eq!(mapper.load_chr(0x0123).expect("mapped"), 0x42);
    }
}
