use crate::common::Powered;
use bitflags::bitflags;

bitflags! {
    // $2001 PPUMASK
    //
    // http://wiki.nesdev.com/w/index.php/PPU_registers#PPUMASK
    // BGRs bMmG
    // |||| |||+- Grayscale
    // |||| ||+-- Show background in the leftmost 8 pixels
    // |||| |+--- Show sprites in the leftmost 8 pixels
    // |||| +---- Show background
    // |||+------ Show sprites
    // +++------- Color emphasis
    #[derive(Default, Debug, Copy, Clone)]
    #[must_use]
    pub struct PpuMask: u8 {
        const GRAYSCALE = 0x01;
        const SHOW_BG_LEFT = 0x02;
        const SHOW_SPR_LEFT = 0x04;
        const SHOW_BG = 0x08;
        const SHOW_SPR = 0x10;
        const EMPHASIZE_RED = 0x20;
        const EMPHASIZE_GREEN = 0x40;
        const EMPHASIZE_BLUE = 0x80;
    }
}

impl PpuMask {
    pub fn write(&mut self, val: u8) {
        *self = Self::from_bits_truncate(val);
    }

    #[must_use]
    pub const fn show_background(&self) -> bool {
        self.contains(Self::SHOW_BG)
    }

    #[must_use]
    pub const fn show_sprites(&self) -> bool {
        self.contains(Self::SHOW_SPR)
    }

    /// Rendering is enabled when either layer is visible.
    #[must_use]
    pub const fn rendering_enabled(&self) -> bool {
        self.intersects(Self::SHOW_BG.union(Self::SHOW_SPR))
    }
}

impl Powered for PpuMask {
    fn reset(&mut self) {
        *self = Self::empty();
    }
}
