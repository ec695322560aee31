//! Cartridge memory mappers.
//!
//! <http://wiki.nesdev.com/w/index.php/Mapper>

use crate::{
    cart::Cartridge,
    error::{Error, Result},
};
use std::{cell::RefCell, fmt, rc::Rc};

use nrom::Nrom;
use sxrom::Sxrom;

pub mod nrom;
pub mod sxrom;

/// Alias for a Mapper shared between the CPU bus and the PPU bus.
pub type MapperRef = Rc<RefCell<dyn Mapper>>;

/// The capability set every board-resident mapper exposes.
///
/// PRG operations serve the CPU bus, CHR operations serve the PPU bus, and
/// `mirroring` may change live on boards with software-controlled mirroring.
pub trait Mapper: fmt::Debug {
    fn load_prg(&self, addr: u16) -> Result<u8>;
    fn store_prg(&mut self, addr: u16, val: u8) -> Result<()>;
    fn load_chr(&self, addr: u16) -> Result<u8>;
    fn store_chr(&mut self, addr: u16, val: u8) -> Result<()>;
    fn mirroring(&self) -> Mirroring;
}

/// Attempts to return a valid mapper for the given cartridge.
///
/// # Errors
///
/// Returns `Error::UnsupportedMapper` for mapper numbers other than 0 and 1.
pub fn load(cart: Cartridge) -> Result<MapperRef> {
    match cart.header.mapper_num() {
        0 => Ok(Nrom::load(cart)),
        1 => Ok(Sxrom::load(cart)),
        num => Err(Error::UnsupportedMapper(num)),
    }
}

/// Placeholder mapper for a console with no cartridge inserted.
#[derive(Debug)]
pub struct NullMapper;

impl NullMapper {
    pub fn load() -> MapperRef {
        Rc::new(RefCell::new(Self))
    }
}

impl Mapper for NullMapper {
    fn load_prg(&self, _addr: u16) -> Result<u8> {
        Ok(0x00)
    }
    fn store_prg(&mut self, _addr: u16, _val: u8) -> Result<()> {
        Ok(())
    }
    fn load_chr(&self, _addr: u16) -> Result<u8> {
        Ok(0x00)
    }
    fn store_chr(&mut self, _addr: u16, _val: u8) -> Result<()> {
        Ok(())
    }
    fn mirroring(&self) -> Mirroring {
        Mirroring::Horizontal
    }
}

/// Nametable mirroring mode.
///
/// <http://wiki.nesdev.com/w/index.php/Mirroring#Nametable_Mirroring>
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[must_use]
pub enum Mirroring {
    Horizontal,
    Vertical,
    SingleScreen0,
    SingleScreen1,
}

impl Mirroring {
    /// Maps the four logical nametables to the two physical nametables.
    ///
    /// Vertical mirroring duplicates left and right, horizontal duplicates
    /// top and bottom, and the single-screen modes pin every quadrant to one
    /// physical table.
    #[must_use]
    pub const fn nametable_map(&self) -> [usize; 4] {
        match self {
            Self::Vertical => [0, 1, 0, 1],
            Self::Horizontal => [0, 0, 1, 1],
            Self::SingleScreen0 => [0, 0, 0, 0],
            Self::SingleScreen1 => [1, 1, 1, 1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::build_rom;

    #[test]
    fn unsupported_mapper_rejected() {
        let rom = build_rom(1, 1, 4, 0x00);
        let cart = Cartridge::from_rom(&mut &rom[..]).expect("valid cart");
        assert!(matches!(load(cart), Err(Error::UnsupportedMapper(4))));
    }
}
