//! Picture Processing Unit: a scanline renderer.
//!
//! <http://wiki.nesdev.com/w/index.php/PPU>

use crate::{common::Powered, error::Result, mapper::MapperRef};
use ctrl::PpuCtrl;
use frame::Frame;
use mask::PpuMask;
use scroll::Scroll;
use status::PpuStatus;
use vram::Vram;

pub mod ctrl;
pub mod frame;
pub mod mask;
pub mod scroll;
pub mod status;
pub mod vram;

pub use frame::{RENDER_HEIGHT, RENDER_SIZE, RENDER_WIDTH};

pub const PRERENDER_SCANLINE: i32 = -1;
pub const VISIBLE_SCANLINE_END: i32 = 239;
pub const VBLANK_START_SCANLINE: i32 = 241;
pub const VBLANK_END_SCANLINE: i32 = 260;
pub const CYCLES_PER_SCANLINE: u32 = 341;

const OAM_SIZE: usize = 256;
const SPRITE_COUNT: usize = 64;
const SPRITES_PER_LINE: usize = 8;

/// Outcome of one PPU dot, surfaced to the driver loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[must_use]
pub enum PpuStep {
    Tick,
    /// VBlank began with NMIs enabled; the driver should interrupt the CPU.
    VblankNmi,
    /// The frame wrapped; `frame_buffer` holds a newly completed image.
    NewFrame,
}

/// The PPU: memory-mapped registers, OAM, and the scanline renderer.
///
/// Driven three dots per CPU cycle. Background and sprites for a visible
/// scanline are rendered in one batch at dot 254, which is coarse enough to
/// ignore mid-scanline register writes but keeps sprite-0 hits and scroll
/// updates on their hardware dots.
pub struct Ppu {
    ctrl: PpuCtrl,     // $2000
    mask: PpuMask,     // $2001
    status: PpuStatus, // $2002
    oam_addr: u8,      // $2003
    oam: [u8; OAM_SIZE],
    scroll: Scroll,
    read_buffer: u8, // $2007 read-behind
    vram: Vram,
    frame: Frame,
    cycle: u32,
    scanline: i32,
}

impl Ppu {
    pub fn new(mapper: MapperRef) -> Self {
        Self {
            ctrl: PpuCtrl::default(),
            mask: PpuMask::default(),
            status: PpuStatus::default(),
            oam_addr: 0x00,
            oam: [0x00; OAM_SIZE],
            scroll: Scroll::new(),
            read_buffer: 0x00,
            vram: Vram::new(mapper),
            frame: Frame::new(),
            // Power on inside vblank so the first rendered frame starts
            // from a clean pre-render line.
            cycle: 0,
            scanline: VBLANK_START_SCANLINE,
        }
    }

    pub fn set_mapper(&mut self, mapper: MapperRef) {
        self.vram.set_mapper(mapper);
    }

    /// Advances the PPU a single dot.
    ///
    /// # Errors
    ///
    /// Fails if rendering or a PPUDATA access reaches an unmapped or
    /// read-only cartridge address.
    pub fn step(&mut self) -> Result<PpuStep> {
        let mut step = PpuStep::Tick;

        match self.scanline {
            PRERENDER_SCANLINE => self.prerender_cycle(),
            0..=VISIBLE_SCANLINE_END => self.render_cycle()?,
            VBLANK_START_SCANLINE => {
                if self.cycle == 1 {
                    self.status.set_vblank();
                    if self.ctrl.nmi_enabled() {
                        step = PpuStep::VblankNmi;
                    }
                }
            }
            // Post-render line 240 and the vblank body are idle.
            _ => (),
        }

        self.cycle += 1;
        if self.cycle == CYCLES_PER_SCANLINE {
            self.cycle = 0;
            self.scanline += 1;
            if self.scanline > VBLANK_END_SCANLINE {
                self.scanline = PRERENDER_SCANLINE;
                self.frame.finish();
                step = PpuStep::NewFrame;
            }
        }

        Ok(step)
    }

    /// The last completed frame as RGB triplets.
    #[must_use]
    pub fn frame_buffer(&self) -> &[u8] {
        self.frame.buffer()
    }

    #[must_use]
    pub const fn frame_number(&self) -> u32 {
        self.frame.number()
    }

    // Register interface, $2000..=$2007 mirrored through $3FFF.

    pub fn read_register(&mut self, addr: u16) -> Result<u8> {
        match addr & 0x07 {
            2 => Ok(self.read_status()),
            4 => Ok(self.read_oam_data()),
            7 => self.read_data(),
            // Write-only registers read back 0 rather than emulating bus
            // decay.
            _ => Ok(0x00),
        }
    }

    pub fn write_register(&mut self, addr: u16, val: u8) -> Result<()> {
        match addr & 0x07 {
            0 => {
                self.ctrl.write(val);
                self.scroll.write_nametable(val);
            }
            1 => self.mask.write(val),
            3 => self.oam_addr = val,
            4 => self.write_oam_data(val),
            5 => self.scroll.write_scroll(val),
            6 => self.scroll.write_addr(val),
            7 => return self.write_data(val),
            _ => (), // $2002 is read-only
        }
        Ok(())
    }

    fn read_status(&mut self) -> u8 {
        self.scroll.reset_latch();
        let status = self.status.read();
        self.status.clear_vblank();
        status
    }

    fn read_oam_data(&self) -> u8 {
        self.oam[self.oam_addr as usize]
    }

    fn write_oam_data(&mut self, mut val: u8) {
        if self.oam_addr & 0x03 == 0x02 {
            // Byte 2 only implements five bits.
            val &= 0xE3;
        }
        self.oam[self.oam_addr as usize] = val;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    fn read_data(&mut self) -> Result<u8> {
        let addr = self.scroll.addr();
        let value = self.vram.load(addr)?;
        let data = if (addr & 0x3FFF) < 0x3F00 {
            std::mem::replace(&mut self.read_buffer, value)
        } else {
            // Palette reads bypass the buffer, which still refills from the
            // nametable mirror underneath.
            self.read_buffer = self.vram.load(addr.wrapping_sub(0x1000))?;
            value
        };
        self.scroll.increment(self.ctrl.vram_increment());
        Ok(data)
    }

    fn write_data(&mut self, val: u8) -> Result<()> {
        self.vram.store(self.scroll.addr(), val)?;
        self.scroll.increment(self.ctrl.vram_increment());
        Ok(())
    }

    // Scanline schedule.

    fn prerender_cycle(&mut self) {
        match self.cycle {
            1 => {
                self.status.clear_vblank();
                self.status.clear_sprite_flags();
                self.oam_addr = 0x00;
            }
            304 => {
                if self.mask.rendering_enabled() {
                    self.scroll.reload();
                }
            }
            _ => (),
        }
    }

    fn render_cycle(&mut self) -> Result<()> {
        match self.cycle {
            254 => {
                if self.mask.show_background() {
                    self.render_background()?;
                }
                if self.mask.show_sprites() {
                    self.render_sprites()?;
                }
            }
            256 => {
                if self.mask.rendering_enabled() {
                    // The two tile-prefetch increments for the next line,
                    // then the Y advance, then the horizontal bits come back
                    // from t.
                    self.scroll.increment_coarse_x();
                    self.scroll.increment_coarse_x();
                    self.scroll.increment_y();
                    self.scroll.copy_x();
                }
            }
            _ => (),
        }
        Ok(())
    }

    /// Fetches one background tile's pattern planes and palette, advancing
    /// coarse X.
    fn fetch_tile(&mut self) -> Result<(u8, u8, u8)> {
        let tile_index = self.vram.load(self.scroll.tile_addr())?;
        let pattern_addr =
            self.ctrl.bg_select() | (u16::from(tile_index) << 4) | self.scroll.fine_y();
        let low = self.vram.load(pattern_addr)?;
        let high = self.vram.load(pattern_addr + 8)?;
        let attr = self.vram.load(self.scroll.attr_addr())?;
        let palette = (attr >> self.scroll.attr_shift()) & 0x03;
        self.scroll.increment_coarse_x();
        Ok((low, high, palette))
    }

    /// Renders the background for the current scanline: 32 tiles through a
    /// pair of 16-bit shift registers, offset by fine X.
    fn render_background(&mut self) -> Result<()> {
        let line_base = self.scanline as usize * RENDER_WIDTH;
        let fine_x = u16::from(self.scroll.fine_x());

        let (low, high, mut tile_palette) = self.fetch_tile()?;
        let (low_next, high_next, mut next_palette) = self.fetch_tile()?;
        let mut low_shift = u16::from(low) << 8 | u16::from(low_next);
        let mut high_shift = u16::from(high) << 8 | u16::from(high_next);

        for tile in 0..32 {
            for pixel in 0..8u16 {
                let shift = 15 - pixel - fine_x;
                let value =
                    (((high_shift >> shift) & 0x01) << 1 | ((low_shift >> shift) & 0x01)) as u8;
                let palette = if shift < 8 { next_palette } else { tile_palette };
                // Transparent pixels resolve to the universal background.
                let color = if value == 0 {
                    self.vram.palette_entry(0x00)
                } else {
                    self.vram.palette_entry((palette << 2) | value)
                };

                let index = line_base + tile * 8 + pixel as usize;
                if self.frame.slot(index).color == 0 {
                    self.frame.set_slot(index, color, -1);
                }
            }

            tile_palette = next_palette;
            let (low, high, palette) = self.fetch_tile()?;
            next_palette = palette;
            low_shift = (low_shift << 8) | u16::from(low);
            high_shift = (high_shift << 8) | u16::from(high);
        }
        Ok(())
    }

    /// Renders every in-range sprite for the current scanline, honoring OAM
    /// priority, background priority, sprite-0 hits, and overflow.
    fn render_sprites(&mut self) -> Result<()> {
        let scanline = self.scanline;
        let height = self.ctrl.spr_height() as i32;

        let mut in_range = 0;
        for sprite in 0..SPRITE_COUNT {
            let entry = sprite * 4;
            let y = i32::from(self.oam[entry]);
            let tile = u16::from(self.oam[entry + 1]);
            let attr = self.oam[entry + 2];
            let x = i32::from(self.oam[entry + 3]);

            let palette = attr & 0x03;
            let behind_background = attr & 0x20 == 0x20;
            let flip_x = attr & 0x40 == 0x40;
            let flip_y = attr & 0x80 == 0x80;

            // Sprites cover scanlines (y, y + height].
            if scanline <= y || scanline > y + height {
                continue;
            }
            let mut row = scanline - y - 1;
            if flip_y {
                row = height - row - 1;
            }

            let pattern_addr = if height == 8 {
                self.ctrl.spr_select() + tile * 16
            } else {
                // 8x16 sprites take their table from tile bit 0 and span two
                // consecutive tiles.
                let mut addr = (tile >> 1) * 32;
                if tile & 0x01 == 0x01 {
                    addr |= 0x1000;
                }
                if row >= 8 {
                    addr += 16;
                    row -= 8;
                }
                addr
            };
            let low = self.vram.load(pattern_addr + row as u16)?;
            let high = self.vram.load(pattern_addr + row as u16 + 8)?;

            for pixel in 0..8i32 {
                let value = ((high >> pixel) & 0x01) << 1 | ((low >> pixel) & 0x01);
                if value == 0 {
                    continue;
                }

                let frame_x = if flip_x { x + pixel } else { x + (7 - pixel) };
                if frame_x > 255 {
                    continue;
                }
                let index = scanline as usize * RENDER_WIDTH + frame_x as usize;
                let slot = self.frame.slot(index);

                // Sprite 0 hits fire on any overlap, before priority drops
                // the pixel.
                if slot.color != 0 && sprite == 0 {
                    self.status.set_sprite_zero_hit();
                }
                // A lower OAM index already claimed this pixel.
                if slot.priority > -1 && (slot.priority as usize) < sprite {
                    continue;
                }
                if slot.color != 0 && behind_background {
                    continue;
                }

                let color = self.vram.palette_entry(0x10 | (palette << 2) | value);
                self.frame.set_slot(index, color, sprite as i8);
            }

            in_range += 1;
            if in_range > SPRITES_PER_LINE {
                self.status.set_sprite_overflow();
                break;
            }
        }
        Ok(())
    }
}

impl Powered for Ppu {
    fn reset(&mut self) {
        self.ctrl.reset();
        self.mask.reset();
        self.status.reset();
        self.oam_addr = 0x00;
        self.scroll.reset();
        self.read_buffer = 0x00;
        self.cycle = 0;
        self.scanline = VBLANK_START_SCANLINE;
        self.frame.reset();
    }

    fn power_cycle(&mut self) {
        self.oam = [0x00; OAM_SIZE];
        self.vram.clear();
        self.reset();
    }
}

impl std::fmt::Debug for Ppu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ppu")
            .field("ctrl", &self.ctrl)
            .field("mask", &self.mask)
            .field("status", &self.status)
            .field("scanline", &self.scanline)
            .field("cycle", &self.cycle)
            .field("frame", &self.frame)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cart::{tests::build_rom, Cartridge},
        mapper::sxrom::Sxrom,
    };

    /// A PPU over an MMC1 board with CHR-RAM, so tests can write pattern
    /// data through the PPU bus.
    fn test_ppu() -> Ppu {
        let rom = build_rom(2, 0, 1, 0x00);
        let cart = Cartridge::from_rom(&mut &rom[..]).expect("valid cart");
        Ppu::new(Sxrom::load(cart))
    }

    fn step_frame(ppu: &mut Ppu) -> (u32, u32) {
        let mut rises = 0;
        let mut falls = 0;
        let mut last = ppu.status.in_vblank();
        loop {
            let step = ppu.step().expect("ppu step");
            let vblank = ppu.status.in_vblank();
            if vblank && !last {
                rises += 1;
            }
            if !vblank && last {
                falls += 1;
            }
            last = vblank;
            if step == PpuStep::NewFrame {
                break;
            }
        }
        (rises, falls)
    }

    #[test]
    fn vblank_rises_and_falls_once_per_frame() {
        let mut ppu = test_ppu();
        // Power-on starts mid-vblank; let the partial frame pass first.
        step_frame(&mut ppu);
        for _ in 0..3 {
            let (rises, falls) = step_frame(&mut ppu);
            assert_eq!(rises, 1);
            assert_eq!(falls, 1);
        }
    }

    #[test]
    fn vblank_nmi_fires_at_241_1_when_enabled() {
        let mut ppu = test_ppu();
        ppu.write_register(0, 0x80).expect("ctrl write");
        ppu.scanline = VBLANK_START_SCANLINE;
        ppu.cycle = 0;
        assert_eq!(ppu.step().expect("dot 0"), PpuStep::Tick);
        assert_eq!(ppu.step().expect("dot 1"), PpuStep::VblankNmi);
        assert!(ppu.status.in_vblank());
    }

    #[test]
    fn nmi_suppressed_when_disabled() {
        let mut ppu = test_ppu();
        ppu.scanline = VBLANK_START_SCANLINE;
        ppu.cycle = 1;
        assert_eq!(ppu.step().expect("dot 1"), PpuStep::Tick);
        assert!(ppu.status.in_vblank());
    }

    #[test]
    fn status_read_clears_vblank_and_write_latch() {
        let mut ppu = test_ppu();
        ppu.status.set_vblank();
        ppu.scroll.write_addr(0x3F); // first half of a PPUADDR pair
        let status = ppu.read_register(2).expect("status read");
        assert_eq!(status & 0x80, 0x80);
        assert!(!ppu.status.in_vblank());
        // The latch restarted: this pair lands cleanly.
        ppu.write_register(6, 0x21).expect("addr write");
        ppu.write_register(6, 0x08).expect("addr write");
        assert_eq!(ppu.scroll.addr(), 0x2108);
    }

    #[test]
    fn ppudata_reads_are_buffered_below_the_palette() {
        let mut ppu = test_ppu();
        ppu.write_register(6, 0x20).expect("addr");
        ppu.write_register(6, 0x00).expect("addr");
        ppu.write_register(7, 0x41).expect("data");
        ppu.write_register(7, 0x42).expect("data");

        ppu.write_register(6, 0x20).expect("addr");
        ppu.write_register(6, 0x00).expect("addr");
        let stale = ppu.read_register(7).expect("data");
        assert_ne!(stale, 0x41, "first read returns the old buffer");
        assert_eq!(ppu.read_register(7).expect("data"), 0x41);
        assert_eq!(ppu.read_register(7).expect("data"), 0x42);
    }

    #[test]
    fn palette_reads_bypass_the_buffer() {
        let mut ppu = test_ppu();
        ppu.vram.store(0x3F01, 0x2C).expect("palette");
        ppu.vram.store(0x2F01, 0x99).expect("nametable mirror");
        ppu.write_register(6, 0x3F).expect("addr");
        ppu.write_register(6, 0x01).expect("addr");
        assert_eq!(ppu.read_register(7).expect("data"), 0x2C);
        assert_eq!(ppu.read_buffer, 0x99, "buffer refilled from $2F01");
    }

    #[test]
    fn vram_increment_follows_ctrl() {
        let mut ppu = test_ppu();
        ppu.write_register(6, 0x20).expect("addr");
        ppu.write_register(6, 0x00).expect("addr");
        ppu.read_register(7).expect("data");
        assert_eq!(ppu.scroll.addr(), 0x2001);
        ppu.write_register(0, 0x04).expect("ctrl");
        ppu.read_register(7).expect("data");
        assert_eq!(ppu.scroll.addr(), 0x2021);
    }

    #[test]
    fn oam_byte_two_masks_unused_bits() {
        let mut ppu = test_ppu();
        ppu.write_register(3, 0x02).expect("oam addr");
        ppu.write_register(4, 0xFF).expect("oam data");
        assert_eq!(ppu.oam[2], 0xE3);
        assert_eq!(ppu.oam_addr, 0x03);
    }

    fn setup_overlap(ppu: &mut Ppu) {
        // Tile 1: low plane solid, so every pixel has value 1.
        for row in 0..8 {
            ppu.vram.store(0x0010 + row, 0xFF).expect("chr ram");
        }
        // Top-left background tile uses tile 1.
        ppu.vram.store(0x2000, 0x01).expect("nametable");
        // Non-zero colors for background and sprite pixels.
        ppu.vram.store(0x3F01, 0x21).expect("palette");
        ppu.vram.store(0x3F11, 0x16).expect("palette");
        // Sprite 0 at the same spot.
        ppu.oam[0..4].copy_from_slice(&[0x00, 0x01, 0x00, 0x00]);
        ppu.mask.write(0x18);
    }

    #[test]
    fn sprite_zero_hit_on_overlap() {
        let mut ppu = test_ppu();
        setup_overlap(&mut ppu);
        ppu.scanline = 1;
        ppu.cycle = 254;
        let _ = ppu.step().expect("render dot");
        assert!(ppu.status.sprite_zero_hit());
    }

    #[test]
    fn no_sprite_zero_hit_without_background_pixel() {
        let mut ppu = test_ppu();
        setup_overlap(&mut ppu);
        // Move the sprite away from the rendered background tile.
        ppu.oam[3] = 0x80;
        ppu.scanline = 1;
        ppu.cycle = 254;
        let _ = ppu.step().expect("render dot");
        assert!(!ppu.status.sprite_zero_hit());
    }

    #[test]
    fn ninth_sprite_on_a_line_sets_overflow() {
        let mut ppu = test_ppu();
        setup_overlap(&mut ppu);
        for sprite in 0..10 {
            let entry = sprite * 4;
            ppu.oam[entry..entry + 4].copy_from_slice(&[0x00, 0x01, 0x00, sprite as u8 * 8]);
        }
        ppu.scanline = 1;
        ppu.cycle = 254;
        let _ = ppu.step().expect("render dot");
        assert!(ppu.status.read() & 0x20 == 0x20);
    }

    #[test]
    fn prerender_clears_status_and_reloads_scroll() {
        let mut ppu = test_ppu();
        ppu.status.set_vblank();
        ppu.status.set_sprite_zero_hit();
        ppu.oam_addr = 0x13;
        ppu.scanline = PRERENDER_SCANLINE;
        ppu.cycle = 1;
        let _ = ppu.step().expect("dot 1");
        assert_eq!(ppu.status.read(), 0x00);
        assert_eq!(ppu.oam_addr, 0x00);

        ppu.mask.write(0x08);
        ppu.scroll.write_addr(0x21);
        ppu.scroll.write_addr(0x08); // v and t now hold $2108
        ppu.scroll.increment(0x40);
        ppu.cycle = 304;
        let _ = ppu.step().expect("dot 304");
        assert_eq!(ppu.scroll.addr(), 0x2108, "v reloaded from t");
    }

    #[test]
    fn new_frame_emitted_at_wraparound() {
        let mut ppu = test_ppu();
        let start = ppu.frame_number();
        let mut saw_new_frame = false;
        for _ in 0..(CYCLES_PER_SCANLINE as usize * 25) {
            if ppu.step().expect("step") == PpuStep::NewFrame {
                saw_new_frame = true;
                break;
            }
        }
        assert!(saw_new_frame);
        assert_eq!(ppu.frame_number(), start + 1);
    }
}
