use crate::common::Powered;
use bitflags::bitflags;

bitflags! {
    // $2002 PPUSTATUS
    //
    // http://wiki.nesdev.com/w/index.php/PPU_registers#PPUSTATUS
    // VSO. ....
    // |||+-++++- Open bus on real hardware, always 0 here
    // ||+------- Sprite overflow
    // |+-------- Sprite 0 hit
    // +--------- VBlank has started
    #[derive(Default, Debug, Copy, Clone)]
    #[must_use]
    pub struct PpuStatus: u8 {
        const SPR_OVERFLOW = 0x20;
        const SPR_ZERO_HIT = 0x40;
        const VBLANK = 0x80;
    }
}

impl PpuStatus {
    #[must_use]
    pub const fn read(&self) -> u8 {
        self.bits()
    }

    pub fn set_vblank(&mut self) {
        self.insert(Self::VBLANK);
    }

    pub fn clear_vblank(&mut self) {
        self.remove(Self::VBLANK);
    }

    #[must_use]
    pub const fn in_vblank(&self) -> bool {
        self.contains(Self::VBLANK)
    }

    pub fn set_sprite_zero_hit(&mut self) {
        self.insert(Self::SPR_ZERO_HIT);
    }

    #[must_use]
    pub const fn sprite_zero_hit(&self) -> bool {
        self.contains(Self::SPR_ZERO_HIT)
    }

    pub fn set_sprite_overflow(&mut self) {
        self.insert(Self::SPR_OVERFLOW);
    }

    pub fn clear_sprite_flags(&mut self) {
        self.remove(Self::SPR_ZERO_HIT.union(Self::SPR_OVERFLOW));
    }
}

impl Powered for PpuStatus {
    fn reset(&mut self) {
        *self = Self::empty();
    }
}
