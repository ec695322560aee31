//! NROM (Mapper 000)
//!
//! <http://wiki.nesdev.com/w/index.php/NROM>

use crate::{
    cart::Cartridge,
    error::{Error, Result},
    mapper::{Mapper, MapperRef, Mirroring},
};
use std::{cell::RefCell, fmt, rc::Rc};

const PRG_RAM_SIZE: usize = 8 * 1024;

/// No mapping capability: one or two fixed 16K PRG banks plus fixed CHR-ROM.
///
/// CPU $6000..=$7FFF: 8K PRG-RAM
/// CPU $8000..=$FFFF: both PRG banks, or one bank mirrored at $8000 and $C000
/// PPU $0000..=$1FFF: 8K fixed CHR-ROM
pub struct Nrom {
    cart: Cartridge,
    prg_ram: Vec<u8>,
}

impl Nrom {
    pub fn load(cart: Cartridge) -> MapperRef {
        Rc::new(RefCell::new(Self {
            cart,
            prg_ram: vec![0x00; PRG_RAM_SIZE],
        }))
    }
}

impl Mapper for Nrom {
    fn load_prg(&self, addr: u16) -> Result<u8> {
        match addr {
            0x6000..=0x7FFF => Ok(self.prg_ram[(addr - 0x6000) as usize]),
            0x8000..=0xFFFF => {
                // NROM-128 mirrors its single bank at $8000 and $C000.
                let mirror = if self.cart.header.prg_rom_banks > 1 {
                    0x7FFF
                } else {
                    0x3FFF
                };
                self.cart
                    .prg_rom
                    .get((addr & mirror) as usize)
                    .copied()
                    .ok_or(Error::InvalidBusAddress { addr })
            }
            _ => Err(Error::InvalidBusAddress { addr }),
        }
    }

    fn store_prg(&mut self, addr: u16, val: u8) -> Result<()> {
        match addr {
            0x6000..=0x7FFF => {
                self.prg_ram[(addr - 0x6000) as usize] = val;
                Ok(())
            }
            _ => Err(Error::MapperWriteViolation { addr, val }),
        }
    }

    fn load_chr(&self, addr: u16) -> Result<u8> {
        self.cart
            .chr_rom
            .get(addr as usize)
            .copied()
            .ok_or(Error::InvalidBusAddress { addr })
    }

    fn store_chr(&mut self, addr: u16, val: u8) -> Result<()> {
        Err(Error::MapperWriteViolation { addr, val })
    }

    fn mirroring(&self) -> Mirroring {
        self.cart.header.mirroring()
    }
}

impl fmt::Debug for Nrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Nrom")
            .field("cart", &self.cart)
            .field("mirroring", &self.mirroring())
            .finish()
    }
}
