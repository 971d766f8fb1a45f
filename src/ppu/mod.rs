/*!
PPU (2C02-style picture processing unit).

Provides:
- CPU-visible register interface ($2000..$2007) with the loopy v/t/x/w scroll model
- OAM (sprite) memory and the OAM DMA entry point
- Dot-accurate timing: 262 scanlines (0..=261, 261 = pre-render) of 341 dots
- Background pipeline with pattern/attribute shift registers and 8-dot fetch cycle
- Per-scanline sprite evaluation (8-sprite limit, hardware overflow bug), pattern
  fetches during dots 257..=320, sprite-0 hit and priority
- Vblank flag and NMI edge at scanline 241 dot 1, cleared at 261 dot 1
- A frame buffer of 256x240 palette indices (0..=63)

STRUCTURE:
- `Ppu` holds all state; the submodules add inherent methods:
  * `registers.rs` - register semantics and the bitflags register types
  * `fetch.rs`     - background fetches and scroll counter updates
  * `oam_eval.rs`  - sprite evaluation and sprite pattern fetches
  * `sprite.rs`    - sprite slot loading and per-dot sprite output
  * `renderer.rs`  - `tick` orchestration and pixel composition
- Memory is reached through `PpuBus`, so the PPU never holds a Bus reference.
*/

mod fetch;
mod oam_eval;
mod registers;
mod renderer;
mod sprite;

pub use registers::{PpuCtrl, PpuMask, PpuStatus};

/// Screen width in pixels.
pub const NES_WIDTH: usize = 256;
/// Screen height in pixels.
pub const NES_HEIGHT: usize = 240;
/// Dots per scanline (0..=340).
pub const DOTS_PER_SCANLINE: u16 = 341;
/// Scanlines per frame (0..=261).
pub const SCANLINES_PER_FRAME: u16 = 262;
/// First vertical-blank scanline; vblank starts at its dot 1.
pub const VBLANK_SCANLINE: u16 = 241;
/// Pre-render scanline.
pub const PRE_RENDER_SCANLINE: u16 = 261;

/// Row-major 256x240 palette indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Vec<u8>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            pixels: vec![0; NES_WIDTH * NES_HEIGHT],
        }
    }
}

impl FrameBuffer {
    pub fn width(&self) -> usize {
        NES_WIDTH
    }

    pub fn height(&self) -> usize {
        NES_HEIGHT
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    /// Palette index at (x, y). Panics outside 256x240.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * NES_WIDTH + x]
    }

    #[inline]
    pub(crate) fn set(&mut self, x: usize, y: usize, color: u8) {
        self.pixels[y * NES_WIDTH + x] = color & 0x3F;
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }
}

/// A sprite prepared for output on a scanline.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct SpriteSlot {
    pub x: u8,
    pub attr: u8,
    // pattern bits, already reversed for horizontal flip
    pub pattern_lo: u8,
    pub pattern_hi: u8,
    pub is_sprite_zero: bool,
}

pub struct Ppu {
    // Registers
    ctrl: PpuCtrl,
    mask: PpuMask,
    status: PpuStatus,
    oam_addr: u8,

    // Loopy scroll state: v (current), t (temporary), fine x, write toggle
    v: u16,
    t: u16,
    fine_x: u8,
    w: bool,

    read_buffer: u8,
    // Last value driven on the PPU I/O bus; returned for write-only registers
    io_latch: u8,

    oam: [u8; 256],

    // Timing
    scanline: u16,
    dot: u16,
    frame: u64,
    odd_frame: bool,
    frame_complete: bool,

    // NMI output line and its latched rising edge
    nmi_line: bool,
    nmi_request: bool,

    // Background pipeline
    bg_next_tile: u8,
    bg_next_attr: u8,
    bg_next_lo: u8,
    bg_next_hi: u8,
    bg_shift_lo: u16,
    bg_shift_hi: u16,
    bg_attr_lo: u16,
    bg_attr_hi: u16,

    // Sprite pipeline: evaluation fills `secondary_oam` / `next_slots` for the
    // following scanline, which are copied to `slots` at its dot 1.
    secondary_oam: [u8; 32],
    next_count: u8,
    next_has_sprite_zero: bool,
    next_slots: [SpriteSlot; 8],
    slots: [SpriteSlot; 8],
    slot_count: u8,

    frame_buffer: FrameBuffer,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            ctrl: PpuCtrl::empty(),
            mask: PpuMask::empty(),
            status: PpuStatus::empty(),
            oam_addr: 0,
            v: 0,
            t: 0,
            fine_x: 0,
            w: false,
            read_buffer: 0,
            io_latch: 0,
            oam: [0; 256],
            scanline: 0,
            dot: 0,
            frame: 0,
            odd_frame: false,
            frame_complete: false,
            nmi_line: false,
            nmi_request: false,
            bg_next_tile: 0,
            bg_next_attr: 0,
            bg_next_lo: 0,
            bg_next_hi: 0,
            bg_shift_lo: 0,
            bg_shift_hi: 0,
            bg_attr_lo: 0,
            bg_attr_hi: 0,
            secondary_oam: [0xFF; 32],
            next_count: 0,
            next_has_sprite_zero: false,
            next_slots: [SpriteSlot::default(); 8],
            slots: [SpriteSlot::default(); 8],
            slot_count: 0,
            frame_buffer: FrameBuffer::default(),
        }
    }

    /// Power-on state. The frame buffer keeps its allocation.
    pub fn reset(&mut self) {
        let mut frame_buffer = std::mem::take(&mut self.frame_buffer);
        frame_buffer.clear();
        *self = Self {
            frame_buffer,
            ..Self::new()
        };
    }

    // ---------------------------------------------------------------------
    // Signals
    // ---------------------------------------------------------------------

    /// Returns and clears a pending NMI edge.
    pub fn take_nmi_request(&mut self) -> bool {
        std::mem::take(&mut self.nmi_request)
    }

    /// Returns and clears the frame-complete flag (set when scanline wraps to 0).
    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    /// Drop a frame-complete flag left over from earlier stepping.
    pub fn clear_frame_complete(&mut self) {
        self.frame_complete = false;
    }

    /// Recompute the NMI output (vblank AND enable) and latch a rising edge.
    fn update_nmi_line(&mut self) {
        let line = self.status.contains(PpuStatus::VBLANK) && self.ctrl.contains(PpuCtrl::NMI_ENABLE);
        if line && !self.nmi_line {
            self.nmi_request = true;
        }
        self.nmi_line = line;
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame_buffer
    }

    /// Next (scanline, dot) to be processed.
    pub fn position(&self) -> (u16, u16) {
        (self.scanline, self.dot)
    }

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn dot(&self) -> u16 {
        self.dot
    }

    /// Completed frames since power-on.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn ctrl(&self) -> PpuCtrl {
        self.ctrl
    }

    pub fn mask(&self) -> PpuMask {
        self.mask
    }

    pub fn status(&self) -> PpuStatus {
        self.status
    }

    pub fn vblank(&self) -> bool {
        self.status.contains(PpuStatus::VBLANK)
    }

    pub fn sprite_zero_hit(&self) -> bool {
        self.status.contains(PpuStatus::SPRITE_ZERO_HIT)
    }

    pub fn sprite_overflow(&self) -> bool {
        self.status.contains(PpuStatus::SPRITE_OVERFLOW)
    }

    pub fn vram_addr(&self) -> u16 {
        self.v
    }

    pub fn temp_vram_addr(&self) -> u16 {
        self.t
    }

    pub fn fine_x(&self) -> u8 {
        self.fine_x
    }

    pub fn write_toggle(&self) -> bool {
        self.w
    }

    pub fn oam_addr(&self) -> u8 {
        self.oam_addr
    }

    /// Value a read of a write-only register returns.
    pub fn io_latch(&self) -> u8 {
        self.io_latch
    }

    pub fn peek_oam(&self, index: u8) -> u8 {
        self.oam[index as usize]
    }

    pub fn poke_oam(&mut self, index: u8, value: u8) {
        self.oam[index as usize] = value;
    }

    /// OAM DMA: 256 writes through OAMDATA starting at the current OAMADDR.
    pub fn write_oam_dma(&mut self, page: &[u8; 256]) {
        for &byte in page {
            self.oam[self.oam_addr as usize] = byte;
            self.oam_addr = self.oam_addr.wrapping_add(1);
        }
    }

    #[inline]
    fn rendering_enabled(&self) -> bool {
        self.mask
            .intersects(PpuMask::SHOW_BACKGROUND | PpuMask::SHOW_SPRITES)
    }

    #[inline]
    fn sprite_height(&self) -> u16 {
        if self.ctrl.contains(PpuCtrl::SPRITE_SIZE_16) { 16 } else { 8 }
    }

    /// Place the PPU at an arbitrary position (tests only).
    #[cfg(test)]
    pub(crate) fn set_position(&mut self, scanline: u16, dot: u16) {
        self.scanline = scanline;
        self.dot = dot;
    }
}
