#![doc = r#"
PPU renderer module

Responsibilities
- `Ppu::tick`: process one dot and advance the (scanline, dot) counter
- Compose background and sprite pixels into the frame buffer
- Raise vblank / NMI, clear flags on the pre-render line, clock the mapper's
  scanline counter

Per-dot order
1. Flag updates (241/1 sets vblank, 261/1 clears vblank, sprite-0 hit, overflow).
2. With rendering enabled on visible and pre-render lines: background fetch,
   sprite evaluation at 257, sprite fetches at 257..=320, scanline clock at 260.
3. Visible dots 1..=256 output pixel x = dot - 1.
4. Advance. On odd frames with rendering enabled, dot 340 of the pre-render
   line is skipped.

With rendering disabled a visible dot shows the backdrop color, or the palette
entry v points at when v is inside $3F00-$3FFF.
"#]

use super::*;
use crate::ppu_bus::PpuBus;

impl Ppu {
    /// Advance one PPU dot (invoked 3x per CPU cycle).
    pub fn tick<B: PpuBus>(&mut self, bus: &mut B) {
        let visible = self.scanline < NES_HEIGHT as u16;
        let pre_render = self.scanline == PRE_RENDER_SCANLINE;
        let rendering = self.rendering_enabled();

        if self.dot == 1 {
            if self.scanline == VBLANK_SCANLINE {
                self.status.insert(PpuStatus::VBLANK);
                self.update_nmi_line();
            } else if pre_render {
                self.status.remove(
                    PpuStatus::VBLANK | PpuStatus::SPRITE_ZERO_HIT | PpuStatus::SPRITE_OVERFLOW,
                );
                self.update_nmi_line();
            } else if visible {
                self.load_sprite_slots();
            }
        }

        if rendering && (visible || pre_render) {
            self.background_step(bus);
            if self.dot == 257 {
                if visible {
                    self.evaluate_sprites();
                } else {
                    self.clear_next_sprites();
                }
            }
            if (257..=320).contains(&self.dot) {
                self.sprite_fetch_step(bus);
            }
            if self.dot == 260 {
                bus.scanline_tick();
            }
        } else if self.dot == 257 {
            self.clear_next_sprites();
        }

        if visible && (1..=256).contains(&self.dot) {
            self.render_pixel(bus, rendering);
        }

        self.advance(rendering);
    }

    fn render_pixel<B: PpuBus>(&mut self, bus: &B, rendering: bool) {
        let x = (self.dot - 1) as usize;
        let y = self.scanline as usize;

        let palette_addr = if rendering {
            self.compose(x)
        } else if self.v & 0x3F00 == 0x3F00 {
            self.v & 0x1F
        } else {
            0
        };

        let mut color = bus.ppu_read(0x3F00 | palette_addr) & 0x3F;
        if self.mask.contains(PpuMask::GRAYSCALE) {
            color &= 0x30;
        }
        self.frame_buffer.set(x, y, color);
    }

    /// Palette RAM offset for column `x`, with sprite-0 hit detection.
    fn compose(&mut self, x: usize) -> u16 {
        let (bg_pixel, bg_palette) = self.background_pixel(x);
        let background = ((bg_palette << 2) | bg_pixel) as u16;

        let Some(sprite) = self.sprite_pixel(x) else {
            return if bg_pixel == 0 { 0 } else { background };
        };
        let foreground = 0x10 | ((sprite.palette << 2) | sprite.pixel) as u16;
        if bg_pixel == 0 {
            return foreground;
        }

        // Both opaque. Left-edge clipping already zeroed the pixels it hides.
        if sprite.is_sprite_zero && x != 255 {
            self.status.insert(PpuStatus::SPRITE_ZERO_HIT);
        }
        if sprite.behind_background { background } else { foreground }
    }

    fn advance(&mut self, rendering: bool) {
        self.dot += 1;
        if self.scanline == PRE_RENDER_SCANLINE && self.dot == 340 && self.odd_frame && rendering {
            self.dot = DOTS_PER_SCANLINE;
        }
        if self.dot < DOTS_PER_SCANLINE {
            return;
        }
        self.dot = 0;
        self.scanline += 1;
        if self.scanline == SCANLINES_PER_FRAME {
            self.scanline = 0;
            self.frame += 1;
            self.odd_frame = !self.odd_frame;
            self.frame_complete = true;
            log::trace!("ppu: frame {} complete", self.frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu_bus::mock::MockPpuBus;

    const DOTS_PER_FRAME: u32 = DOTS_PER_SCANLINE as u32 * SCANLINES_PER_FRAME as u32;

    fn run_until(p: &mut Ppu, bus: &mut MockPpuBus, scanline: u16, dot: u16) {
        while p.position() != (scanline, dot) {
            p.tick(bus);
        }
    }

    /// Solid tile 1 (pixel value 1) across the whole first nametable.
    fn solid_background(bus: &mut MockPpuBus) {
        for row in 0..8 {
            bus.pattern[0x10 + row] = 0xFF;
        }
        bus.nametable[..0x3C0].fill(1);
        bus.palette[0] = 0x0F;
        bus.palette[1] = 0x21;
    }

    #[test]
    fn vblank_and_nmi_at_241_dot_1() {
        let mut bus = MockPpuBus::default();
        let mut p = Ppu::new();
        p.ctrl.insert(PpuCtrl::NMI_ENABLE);

        run_until(&mut p, &mut bus, VBLANK_SCANLINE, 1);
        assert!(!p.vblank());
        p.tick(&mut bus);
        assert!(p.vblank());
        assert!(p.take_nmi_request());
        assert!(!p.take_nmi_request());

        run_until(&mut p, &mut bus, PRE_RENDER_SCANLINE, 2);
        assert!(!p.vblank(), "pre-render dot 1 clears vblank");
    }

    #[test]
    fn clear_frame_complete_drops_stale_flag() {
        let mut bus = MockPpuBus::default();
        let mut p = Ppu::new();
        for _ in 0..DOTS_PER_FRAME {
            p.tick(&mut bus);
        }
        p.clear_frame_complete();
        assert!(!p.take_frame_complete());
        assert_eq!(p.frame_count(), 1);
    }

    #[test]
    fn frame_length_with_and_without_odd_skip() {
        let mut bus = MockPpuBus::default();
        let mut p = Ppu::new();
        for _ in 0..DOTS_PER_FRAME {
            p.tick(&mut bus);
        }
        assert_eq!(p.position(), (0, 0));
        assert!(p.take_frame_complete());
        assert_eq!(p.frame_count(), 1);

        // frame 1 is odd: with rendering on it is one dot shorter
        p.mask = PpuMask::SHOW_BACKGROUND;
        for _ in 0..DOTS_PER_FRAME - 1 {
            p.tick(&mut bus);
        }
        assert_eq!(p.position(), (0, 0));
        assert_eq!(p.frame_count(), 2);

        // frame 2 is even: full length
        for _ in 0..DOTS_PER_FRAME - 1 {
            p.tick(&mut bus);
        }
        assert_eq!(p.position(), (PRE_RENDER_SCANLINE, 340));
    }

    #[test]
    fn scanline_clock_only_while_rendering() {
        let mut bus = MockPpuBus::default();
        let mut p = Ppu::new();
        for _ in 0..DOTS_PER_FRAME {
            p.tick(&mut bus);
        }
        assert_eq!(bus.scanline_ticks, 0);

        p.mask = PpuMask::SHOW_SPRITES;
        run_until(&mut p, &mut bus, 0, 0);
        for _ in 0..DOTS_PER_FRAME {
            p.tick(&mut bus);
            if p.position() == (0, 0) {
                break;
            }
        }
        assert_eq!(bus.scanline_ticks, 241, "lines 0..=239 plus pre-render");
    }

    #[test]
    fn background_renders_through_palette() {
        let mut bus = MockPpuBus::default();
        solid_background(&mut bus);
        let mut p = Ppu::new();
        p.mask = PpuMask::SHOW_BACKGROUND | PpuMask::SHOW_BACKGROUND_LEFT;

        // first frame primes v from t on the pre-render line
        for _ in 0..2 * DOTS_PER_FRAME {
            p.tick(&mut bus);
        }
        let fb = p.frame_buffer();
        assert_eq!(fb.pixel(0, 0), 0x21);
        assert_eq!(fb.pixel(255, 239), 0x21);
        assert_eq!(fb.pixel(128, 100), 0x21);
    }

    #[test]
    fn left_clip_shows_backdrop() {
        let mut bus = MockPpuBus::default();
        solid_background(&mut bus);
        let mut p = Ppu::new();
        p.mask = PpuMask::SHOW_BACKGROUND;
        for _ in 0..2 * DOTS_PER_FRAME {
            p.tick(&mut bus);
        }
        assert_eq!(p.frame_buffer().pixel(7, 50), 0x0F);
        assert_eq!(p.frame_buffer().pixel(8, 50), 0x21);
    }

    #[test]
    fn rendering_disabled_shows_backdrop_or_palette_at_v() {
        let mut bus = MockPpuBus::default();
        bus.palette[0] = 0x11;
        bus.palette[5] = 0x2C;
        let mut p = Ppu::new();
        run_until(&mut p, &mut bus, 1, 0);
        assert_eq!(p.frame_buffer().pixel(40, 0), 0x11);

        p.v = 0x3F05;
        run_until(&mut p, &mut bus, 2, 0);
        assert_eq!(p.frame_buffer().pixel(40, 1), 0x2C);
    }

    #[test]
    fn sprite_zero_hit_over_opaque_background() {
        let mut bus = MockPpuBus::default();
        solid_background(&mut bus);
        // sprite tile 2: one opaque column at its leftmost pixel
        for row in 0..8 {
            bus.pattern[0x20 + row] = 0x80;
        }
        let mut p = Ppu::new();
        p.mask = PpuMask::SHOW_BACKGROUND
            | PpuMask::SHOW_SPRITES
            | PpuMask::SHOW_BACKGROUND_LEFT
            | PpuMask::SHOW_SPRITES_LEFT;
        p.oam = [0xF0; 256];
        p.oam[..4].copy_from_slice(&[30, 2, 0, 100]);

        // let v settle, then watch the second frame
        run_until(&mut p, &mut bus, PRE_RENDER_SCANLINE, 2);
        run_until(&mut p, &mut bus, 31, 100);
        assert!(!p.sprite_zero_hit(), "sprite shows from line 31, column 100");
        run_until(&mut p, &mut bus, 31, 102);
        assert!(p.sprite_zero_hit());

        run_until(&mut p, &mut bus, PRE_RENDER_SCANLINE, 2);
        assert!(!p.sprite_zero_hit(), "cleared on the pre-render line");
    }

    #[test]
    fn no_sprite_zero_hit_on_transparent_background() {
        let mut bus = MockPpuBus::default();
        for row in 0..8 {
            bus.pattern[0x20 + row] = 0xFF;
        }
        let mut p = Ppu::new();
        p.mask = PpuMask::SHOW_BACKGROUND | PpuMask::SHOW_SPRITES | PpuMask::SHOW_SPRITES_LEFT;
        p.oam = [0xF0; 256];
        p.oam[..4].copy_from_slice(&[30, 2, 0, 100]);
        bus.palette[0x11] = 0x16;

        run_until(&mut p, &mut bus, PRE_RENDER_SCANLINE, 2);
        run_until(&mut p, &mut bus, 40, 0);
        assert!(!p.sprite_zero_hit());
        assert_eq!(p.frame_buffer().pixel(100, 31), 0x16, "sprite drawn over backdrop");
        assert_eq!(p.frame_buffer().pixel(100, 30), 0x00, "one line below OAM Y");
    }

    #[test]
    fn overflow_flag_set_during_frame_and_cleared_on_pre_render() {
        let mut bus = MockPpuBus::default();
        let mut p = Ppu::new();
        p.mask = PpuMask::SHOW_SPRITES;
        p.oam = [0xF0; 256];
        for i in 0..9 {
            p.oam[i * 4] = 60;
        }
        run_until(&mut p, &mut bus, 60, 258);
        assert!(p.sprite_overflow());
        run_until(&mut p, &mut bus, PRE_RENDER_SCANLINE, 2);
        assert!(!p.sprite_overflow());
    }

    #[test]
    fn reset_returns_to_power_on() {
        let mut bus = MockPpuBus::default();
        let mut p = Ppu::new();
        p.write_register(0, 0x80, &mut bus);
        run_until(&mut p, &mut bus, 100, 5);
        p.reset();
        assert_eq!(p.position(), (0, 0));
        assert_eq!(p.ctrl(), PpuCtrl::empty());
        assert_eq!(p.frame_count(), 0);
    }
}
