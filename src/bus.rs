//! The CPU's memory bus.
//!
//! <http://wiki.nesdev.com/w/index.php/CPU_memory_map>

use crate::{
    apu::Apu,
    common::Powered,
    error::Result,
    input::Input,
    mapper::MapperRef,
    mem::RamState,
    ppu::Ppu,
};
use std::{fmt, rc::Rc};

const WRAM_SIZE: usize = 2 * 1024;

/// CPU cycles an OAM DMA transfer steals from the executing instruction.
pub const OAM_DMA_CYCLES: usize = 513;

/// Routes CPU addresses to work RAM, the PPU and APU registers, the
/// controller ports, or the cartridge mapper.
///
/// | Range           | Target                      |
/// |-----------------|-----------------------------|
/// | $0000..=$1FFF   | 2K work RAM, mirrored       |
/// | $2000..=$3FFF   | PPU registers, mirrored     |
/// | $4000..=$4015   | APU                         |
/// | $4016..=$4017   | controllers ($4016 strobes) |
/// | $4018..=$FFFF   | mapper PRG                  |
pub struct Bus {
    pub ppu: Ppu,
    pub apu: Apu,
    pub input: Input,
    pub mapper: MapperRef,
    wram: Vec<u8>,
    dma_stall: usize,
}

impl Bus {
    pub fn new(mapper: MapperRef, ram_state: RamState) -> Self {
        Self {
            ppu: Ppu::new(Rc::clone(&mapper)),
            apu: Apu::new(),
            input: Input::new(),
            mapper,
            wram: RamState::filled(WRAM_SIZE, ram_state),
            dma_stall: 0,
        }
    }

    /// Swaps in the mapper of a newly loaded cartridge, for both the CPU and
    /// PPU sides.
    pub fn load_mapper(&mut self, mapper: MapperRef) {
        self.ppu.set_mapper(Rc::clone(&mapper));
        self.mapper = mapper;
    }

    pub fn load(&mut self, addr: u16) -> Result<u8> {
        match addr {
            0x0000..=0x1FFF => Ok(self.wram[(addr & 0x07FF) as usize]),
            0x2000..=0x3FFF => self.ppu.read_register(addr),
            0x4000..=0x4015 => Ok(self.apu.read(addr)),
            0x4016..=0x4017 => Ok(self.input.read(addr)),
            0x4018..=0xFFFF => self.mapper.borrow().load_prg(addr),
        }
    }

    pub fn store(&mut self, addr: u16, val: u8) -> Result<()> {
        match addr {
            0x0000..=0x1FFF => {
                self.wram[(addr & 0x07FF) as usize] = val;
                Ok(())
            }
            0x2000..=0x3FFF => self.ppu.write_register(addr, val),
            0x4014 => self.oam_dma(val),
            0x4016 => {
                self.input.write(val);
                Ok(())
            }
            0x4000..=0x4013 | 0x4015 | 0x4017 => {
                self.apu.write(addr, val);
                Ok(())
            }
            0x4018..=0xFFFF => self.mapper.borrow_mut().store_prg(addr, val),
        }
    }

    /// $4014: copies a 256-byte page into OAM through the OAMDATA register.
    ///
    /// Interleaving with APU DMC DMA is not modeled; the CPU just stalls for
    /// the length of the transfer.
    fn oam_dma(&mut self, page: u8) -> Result<()> {
        let base = u16::from(page) << 8;
        for low in 0x00..=0xFF {
            let val = self.load(base | low)?;
            self.ppu.write_register(0x2004, val)?;
        }
        self.dma_stall += OAM_DMA_CYCLES;
        Ok(())
    }

    /// Cycles the CPU owes for DMA transfers since the last call.
    pub(crate) fn take_dma_stall(&mut self) -> usize {
        std::mem::take(&mut self.dma_stall)
    }
}

impl Powered for Bus {
    fn reset(&mut self) {
        self.ppu.reset();
        self.apu.reset();
        self.input.reset();
        self.dma_stall = 0;
    }

    fn power_cycle(&mut self) {
        self.ppu.power_cycle();
        self.apu.power_cycle();
        self.input.power_cycle();
        self.wram.fill(0x00);
        self.dma_stall = 0;
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("ppu", &self.ppu)
            .field("apu", &self.apu)
            .field("input", &self.input)
            .field("mapper", &self.mapper.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cart::{tests::build_rom, Cartridge},
        error::Error,
        mapper,
    };

    fn test_bus() -> Bus {
        let rom = build_rom(2, 1, 0, 0x00);
        let cart = Cartridge::from_rom(&mut &rom[..]).expect("valid cart");
        let mapper = mapper::load(cart).expect("valid mapper");
        Bus::new(mapper, RamState::AllZeros)
    }

    #[test]
    fn wram_mirrors_every_2k() {
        let mut bus = test_bus();
        bus.store(0x0005, 0x15).expect("store");
        bus.store(0x0815, 0x50).expect("store");

        assert_eq!(bus.load(0x0008).expect("load"), 0x00, "uninitialized");
        assert_eq!(bus.load(0x0005).expect("load"), 0x15);
        assert_eq!(bus.load(0x0805).expect("load"), 0x15, "mirror 1");
        assert_eq!(bus.load(0x1005).expect("load"), 0x15, "mirror 2");
        assert_eq!(bus.load(0x1805).expect("load"), 0x15, "mirror 3");
        assert_eq!(bus.load(0x0015).expect("load"), 0x50, "mirrored store");
    }

    #[test]
    fn prg_reads_reach_the_mapper() {
        let mut bus = test_bus();
        assert_eq!(bus.load(0x8000).expect("load"), 0x00);
        assert_eq!(bus.load(0xC000).expect("load"), 0x01, "second bank tag");
    }

    #[test]
    fn rom_writes_are_fatal() {
        let mut bus = test_bus();
        assert!(matches!(
            bus.store(0x8000, 0x01),
            Err(Error::MapperWriteViolation { .. })
        ));
    }

    #[test]
    fn oam_dma_copies_a_page_and_stalls() {
        let mut bus = test_bus();
        for i in 0x00..=0xFF {
            bus.store(0x0700 | i, i as u8).expect("store");
        }
        bus.store(0x2003, 0x10).expect("oam addr");
        bus.store(0x4014, 0x07).expect("dma");

        assert_eq!(bus.take_dma_stall(), OAM_DMA_CYCLES);
        assert_eq!(bus.take_dma_stall(), 0, "stall consumed");

        // Transfer started at OAMADDR $10 and wrapped.
        for (offset, want) in [(0x10u8, 0x00u8), (0x11, 0x01), (0x0F, 0xFF)] {
            bus.store(0x2003, offset).expect("oam addr");
            assert_eq!(
                bus.load(0x2004).expect("oam data"),
                want,
                "oam ${offset:02X}"
            );
        }
    }

    #[test]
    fn controller_strobe_reaches_input() {
        let mut bus = test_bus();
        bus.store(0x4016, 0x01).expect("strobe on");
        bus.store(0x4016, 0x00).expect("strobe off");
        // Nothing pressed: eight open-bus reads.
        for _ in 0..8 {
            assert_eq!(bus.load(0x4016).expect("load"), 0x40);
        }
        assert_eq!(bus.load(0x4016).expect("load"), 0x41, "ninth read");
    }

    #[test]
    fn apu_status_routes_through_the_bus() {
        let mut bus = test_bus();
        bus.store(0x4015, 0x1F).expect("store");
        assert_eq!(bus.load(0x4015).expect("load"), 0x1F);
    }
}
