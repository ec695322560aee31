//! The console aggregate and its driver-loop API.

use crate::{
    bus::Bus,
    cart::Cartridge,
    common::Powered,
    cpu::Cpu,
    error::Result,
    input::{Button, Slot},
    mapper::{self, NullMapper},
    mem::RamState,
    ppu::{Ppu, PpuStep},
};
use std::{io::Read, path::Path};

/// The PPU runs three dots for every CPU cycle.
const PPU_STEPS_PER_CPU_CYCLE: usize = 3;

/// An NES control deck: owns the whole machine and exposes the driver loop.
///
/// Each `clock` call runs one CPU instruction, ticks the PPU three dots per
/// elapsed cycle, raises the vblank NMI when the PPU asks for it, and
/// latches frame completion for `clock_frame`.
#[derive(Debug)]
#[must_use]
pub struct ControlDeck {
    cpu: Cpu,
    running: bool,
    frame_pending: bool,
}

impl Default for ControlDeck {
    fn default() -> Self {
        Self::new(RamState::default())
    }
}

impl ControlDeck {
    pub fn new(ram_state: RamState) -> Self {
        Self {
            cpu: Cpu::new(Bus::new(NullMapper::load(), ram_state)),
            running: false,
            frame_pending: false,
        }
    }

    /// Loads a cartridge from a `.nes` file and resets the console.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, the image is corrupt, or the
    /// mapper is unsupported.
    pub fn load_rom_path<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.load_cart(Cartridge::from_path(path)?)
    }

    /// Loads a cartridge from an iNES byte stream and resets the console.
    ///
    /// # Errors
    ///
    /// Fails when the image is corrupt or the mapper is unsupported.
    pub fn load_rom<F: Read>(&mut self, rom: &mut F) -> Result<()> {
        self.load_cart(Cartridge::from_rom(rom)?)
    }

    fn load_cart(&mut self, cart: Cartridge) -> Result<()> {
        let mapper = mapper::load(cart)?;
        self.cpu.bus.load_mapper(mapper);
        self.running = true;
        self.reset();
        Ok(())
    }

    /// Runs one CPU instruction and everything it drags along, returning
    /// the CPU cycles consumed.
    ///
    /// # Errors
    ///
    /// Propagates fatal CPU and PPU faults; the deck stops running.
    pub fn clock(&mut self) -> Result<usize> {
        let cycles = match self.cpu.step() {
            Ok(cycles) => cycles,
            Err(err) => {
                self.running = false;
                return Err(err);
            }
        };
        for _ in 0..cycles * PPU_STEPS_PER_CPU_CYCLE {
            match self.cpu.bus.ppu.step()? {
                PpuStep::VblankNmi => self.cpu.set_nmi(),
                PpuStep::NewFrame => self.frame_pending = true,
                PpuStep::Tick => (),
            }
        }
        self.cpu.bus.apu.clock(cycles);
        Ok(cycles)
    }

    /// Clocks until the PPU completes the current frame.
    ///
    /// # Errors
    ///
    /// Propagates fatal CPU and PPU faults.
    pub fn clock_frame(&mut self) -> Result<usize> {
        let mut total = 0;
        while !self.frame_pending {
            total += self.clock()?;
        }
        self.frame_pending = false;
        Ok(total)
    }

    /// The most recently completed frame, 256x240 RGB.
    #[must_use]
    pub fn frame_buffer(&self) -> &[u8] {
        self.cpu.bus.ppu.frame_buffer()
    }

    #[must_use]
    pub const fn frame_number(&self) -> u32 {
        self.cpu.bus.ppu.frame_number()
    }

    /// Presses or releases a controller button.
    pub fn set_button(&mut self, slot: Slot, button: Button, pressed: bool) {
        self.cpu.bus.input.set_button(slot, button, pressed);
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub const fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub const fn ppu(&self) -> &Ppu {
        &self.cpu.bus.ppu
    }
}

impl Powered for ControlDeck {
    fn reset(&mut self) {
        self.cpu.reset();
        self.frame_pending = false;
    }

    fn power_cycle(&mut self) {
        self.cpu.power_cycle();
        self.frame_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::PRG_ROM_BANK_SIZE;

    /// Builds a 32K NROM image with `main` at $8000 (which is also the reset
    /// target) and `nmi` at $9000.
    fn rom_with_program(main: &[u8], nmi: &[u8]) -> Vec<u8> {
        let mut prg = vec![0x00; 2 * PRG_ROM_BANK_SIZE];
        prg[..main.len()].copy_from_slice(main);
        prg[0x1000..0x1000 + nmi.len()].copy_from_slice(nmi);
        // Vectors: NMI $9000, RESET $8000, IRQ $8000.
        prg[0x7FFA..].copy_from_slice(&[0x00, 0x90, 0x00, 0x80, 0x00, 0x80]);

        let mut rom = Vec::new();
        rom.extend_from_slice(b"NES\x1A");
        rom.extend_from_slice(&[2, 1, 0, 0]);
        rom.extend_from_slice(&[0x00; 8]);
        rom.extend_from_slice(&prg);
        rom.extend_from_slice(&[0x00; 0x2000]);
        rom
    }

    fn deck_with_program(main: &[u8], nmi: &[u8]) -> ControlDeck {
        let rom = rom_with_program(main, nmi);
        let mut deck = ControlDeck::new(RamState::AllZeros);
        deck.load_rom(&mut &rom[..]).expect("loaded rom");
        deck
    }

    #[test]
    fn a_frame_is_about_29780_cpu_cycles() {
        // Spin forever: JMP $8000
        let mut deck = deck_with_program(&[0x4C, 0x00, 0x80], &[0x40]);
        let start = deck.frame_number();
        deck.clock_frame().expect("first frame");
        let cycles = deck.clock_frame().expect("full frame");
        assert_eq!(deck.frame_number(), start + 2);
        // 262 scanlines x 341 dots / 3 dots per cycle, plus one instruction
        // of slop on either side.
        assert!((29_770..=29_800).contains(&cycles), "cycles = {cycles}");
    }

    #[test]
    fn vblank_nmi_reaches_the_program() {
        // Main: enable vblank NMIs, then spin.
        //   LDA #$80; STA $2000; JMP $8005
        let main = [0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80];
        // NMI handler: INC $10; RTI
        let nmi = [0xE6, 0x10, 0x40];
        let mut deck = deck_with_program(&main, &nmi);

        for _ in 0..2 {
            deck.clock_frame().expect("frame");
        }
        let count = deck.cpu_mut().load(0x0010).expect("load");
        assert!(count >= 1, "nmi handler ran {count} times");
    }

    #[test]
    fn deck_stops_running_on_fatal_fault() {
        // $02 is an unofficial opcode.
        let mut deck = deck_with_program(&[0x02], &[0x40]);
        assert!(deck.is_running());
        deck.clock().expect("reset service");
        assert!(deck.clock().is_err());
        assert!(!deck.is_running());
    }

    #[test]
    fn buttons_reach_the_controller_port() {
        // Strobe $4016, read the A bit into $10, then spin.
        //   LDA #$01; STA $4016; LDA #$00; STA $4016;
        //   LDA $4016; AND #$01; STA $10; JMP spin
        let main = [
            0xA9, 0x01, 0x8D, 0x16, 0x40, 0xA9, 0x00, 0x8D, 0x16, 0x40, 0xAD, 0x16, 0x40, 0x29,
            0x01, 0x85, 0x10, 0x4C, 0x11, 0x80,
        ];
        let mut deck = deck_with_program(&main, &[0x40]);
        deck.set_button(Slot::One, Button::A, true);
        deck.clock_frame().expect("frame");
        assert_eq!(deck.cpu_mut().load(0x0010).expect("load"), 0x01);
    }
}
