use crate::common::Powered;
use bitflags::bitflags;

bitflags! {
    // $2000 PPUCTRL
    //
    // http://wiki.nesdev.com/w/index.php/PPU_registers#PPUCTRL
    // VPHB SINN
    // |||| ||++- Base nametable: $2000 + $400 * NN
    // |||| |+--- VRAM increment per PPUDATA access: 0 = 1, 1 = 32
    // |||| +---- Sprite pattern table for 8x8 sprites: 0 = $0000, 1 = $1000
    // |||+------ Background pattern table: 0 = $0000, 1 = $1000
    // ||+------- Sprite height: 0 = 8x8, 1 = 8x16
    // |+-------- PPU master/slave select (unused here)
    // +--------- Generate an NMI at the start of vblank
    #[derive(Default, Debug, Copy, Clone)]
    #[must_use]
    pub struct PpuCtrl: u8 {
        const NAMETABLE_LO = 0x01;
        const NAMETABLE_HI = 0x02;
        const VRAM_INCREMENT = 0x04;
        const SPR_SELECT = 0x08;
        const BG_SELECT = 0x10;
        const SPR_HEIGHT = 0x20;
        const MASTER_SLAVE = 0x40;
        const NMI_ENABLE = 0x80;
    }
}

impl PpuCtrl {
    pub fn write(&mut self, val: u8) {
        *self = Self::from_bits_truncate(val);
    }

    #[must_use]
    pub const fn base_nametable_addr(&self) -> u16 {
        0x2000 + 0x400 * (self.bits() & 0x03) as u16
    }

    #[must_use]
    pub const fn vram_increment(&self) -> u16 {
        if self.contains(Self::VRAM_INCREMENT) {
            32
        } else {
            1
        }
    }

    #[must_use]
    pub const fn spr_select(&self) -> u16 {
        if self.contains(Self::SPR_SELECT) {
            0x1000
        } else {
            0x0000
        }
    }

    #[must_use]
    pub const fn bg_select(&self) -> u16 {
        if self.contains(Self::BG_SELECT) {
            0x1000
        } else {
            0x0000
        }
    }

    /// Sprite height in scanlines: 8 or 16.
    #[must_use]
    pub const fn spr_height(&self) -> u32 {
        if self.contains(Self::SPR_HEIGHT) {
            16
        } else {
            8
        }
    }

    #[must_use]
    pub const fn nmi_enabled(&self) -> bool {
        self.contains(Self::NMI_ENABLE)
    }
}

impl Powered for PpuCtrl {
    fn reset(&mut self) {
        *self = Self::empty();
    }
}
