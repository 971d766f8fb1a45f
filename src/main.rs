//! famicore frontend.
//!
//! Usage: `famicore <rom.nes> [--test-entry] [--frames=N]`
//!
//! With the `display` feature the ROM runs in a window (2x scale, keyboard on
//! player 1: Z=A, X=B, RShift=Select, Enter=Start, arrows). Without it the
//! ROM runs headless for a fixed number of frames and the frame checksum is
//! logged. `RUST_LOG` controls verbosity.

use std::error::Error;
use std::path::PathBuf;
use std::rc::Rc;

use famicore::{ButtonState, Console, ExecMode};
use log::error;

/// Frames run by the headless driver unless `--frames=N` is given.
const HEADLESS_FRAMES: u64 = 120;

struct Options {
    rom: PathBuf,
    exec_mode: ExecMode,
    #[cfg_attr(feature = "display", allow(dead_code))]
    frames: u64,
}

fn parse_args() -> Result<Options, String> {
    let mut rom = None;
    let mut exec_mode = ExecMode::NormalReset;
    let mut frames = HEADLESS_FRAMES;
    for arg in std::env::args().skip(1) {
        if arg == "--test-entry" {
            exec_mode = ExecMode::FixedEntry;
        } else if let Some(n) = arg.strip_prefix("--frames=") {
            frames = n.parse().map_err(|e| format!("bad --frames value {n:?}: {e}"))?;
        } else if !arg.starts_with("--") && rom.is_none() {
            rom = Some(PathBuf::from(arg));
        } else {
            return Err(format!("unexpected argument {arg:?}"));
        }
    }
    let rom = rom.ok_or("usage: famicore <rom.nes> [--test-entry] [--frames=N]")?;
    Ok(Options {
        rom,
        exec_mode,
        frames,
    })
}

fn frame_checksum(console: &Console) -> u32 {
    // FNV-1a over the palette indices
    console
        .frame_buffer()
        .as_slice()
        .iter()
        .fold(0x811C_9DC5u32, |h, &b| (h ^ b as u32).wrapping_mul(0x0100_0193))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let options = parse_args()?;
    let bytes = std::fs::read(&options.rom).inspect_err(|e| {
        error!("cannot read {}: {e}", options.rom.display());
    })?;

    let mut console = Console::new();
    console.load_rom(&bytes, options.exec_mode).inspect_err(|e| {
        error!("cannot load {}: {e}", options.rom.display());
    })?;

    let pad = Rc::new(ButtonState::new());
    console.register_input(0, pad.clone())?;

    run(console, pad, &options)
}

#[cfg(not(feature = "display"))]
fn run(mut console: Console, _pad: Rc<ButtonState>, options: &Options) -> Result<(), Box<dyn Error>> {
    for _ in 0..options.frames {
        console.run_frame();
    }
    log::info!(
        "ran {} frames ({} ticks), frame checksum {:08X}",
        console.frame_count(),
        console.ticks(),
        frame_checksum(&console)
    );

    #[cfg(feature = "screenshot")]
    famicore::screenshot::save_png(console.frame_buffer(), options.rom.with_extension("png"))?;

    Ok(())
}

#[cfg(feature = "display")]
fn run(console: Console, pad: Rc<ButtonState>, options: &Options) -> Result<(), Box<dyn Error>> {
    display::run(console, pad, options)
}

#[cfg(feature = "display")]
mod display {
    use std::error::Error;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::time::Instant;

    use famicore::palette::frame_to_rgba;
    use famicore::{Button, ButtonState, Console, NES_HEIGHT, NES_WIDTH, Pacer};
    use log::{error, info};
    use pixels::{Pixels, SurfaceTexture};
    use winit::application::ApplicationHandler;
    use winit::dpi::LogicalSize;
    use winit::event::{ElementState, KeyEvent, WindowEvent};
    use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
    use winit::keyboard::{KeyCode, PhysicalKey};
    use winit::window::{Window, WindowId};

    use super::{Options, frame_checksum};

    const SCALE: f64 = 2.0;

    /// Keyboard layout for player 1.
    fn key_button(code: KeyCode) -> Option<Button> {
        Some(match code {
            KeyCode::KeyZ => Button::A,
            KeyCode::KeyX => Button::B,
            KeyCode::ShiftRight => Button::Select,
            KeyCode::Enter => Button::Start,
            KeyCode::ArrowUp => Button::Up,
            KeyCode::ArrowDown => Button::Down,
            KeyCode::ArrowLeft => Button::Left,
            KeyCode::ArrowRight => Button::Right,
            _ => return None,
        })
    }

    struct App {
        console: Console,
        pad: Rc<ButtonState>,
        pacer: Pacer,
        window: Option<Arc<Window>>,
        pixels: Option<Pixels<'static>>,
        error: Option<Box<dyn Error>>,
    }

    impl App {
        fn fail(&mut self, event_loop: &ActiveEventLoop, err: Box<dyn Error>) {
            error!("{err}");
            self.error = Some(err);
            event_loop.exit();
        }

        fn create_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
            let size = LogicalSize::new(NES_WIDTH as f64 * SCALE, NES_HEIGHT as f64 * SCALE);
            let attributes = Window::default_attributes()
                .with_title("famicore")
                .with_inner_size(size)
                .with_min_inner_size(LogicalSize::new(NES_WIDTH as f64, NES_HEIGHT as f64));
            let window = Arc::new(event_loop.create_window(attributes)?);
            let inner = window.inner_size();
            let surface = SurfaceTexture::new(inner.width, inner.height, Arc::clone(&window));
            let pixels = Pixels::new(NES_WIDTH as u32, NES_HEIGHT as u32, surface)?;
            self.window = Some(window);
            self.pixels = Some(pixels);
            self.pacer = Pacer::new(Instant::now());
            Ok(())
        }

        fn redraw(&mut self) -> Result<(), Box<dyn Error>> {
            let ticks = self.pacer.ticks_since_last(Instant::now());
            self.console.step(ticks);
            if let Some(pixels) = self.pixels.as_mut() {
                frame_to_rgba(self.console.frame_buffer(), pixels.frame_mut());
                pixels.render()?;
            }
            Ok(())
        }
    }

    impl ApplicationHandler for App {
        fn resumed(&mut self, event_loop: &ActiveEventLoop) {
            if self.window.is_some() {
                return;
            }
            if let Err(err) = self.create_surface(event_loop) {
                self.fail(event_loop, err);
            }
        }

        fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
            match event {
                WindowEvent::CloseRequested => event_loop.exit(),
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(code),
                            state,
                            ..
                        },
                    ..
                } => {
                    if code == KeyCode::Escape {
                        event_loop.exit();
                    } else if let Some(button) = key_button(code) {
                        self.pad.set(button, state == ElementState::Pressed);
                    }
                }
                WindowEvent::Resized(size) => {
                    if let Some(pixels) = self.pixels.as_mut() {
                        if let Err(err) = pixels.resize_surface(size.width, size.height) {
                            self.fail(event_loop, err.into());
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    if let Err(err) = self.redraw() {
                        self.fail(event_loop, err);
                    }
                }
                _ => {}
            }
        }

        fn about_to_wait(&mut self, _: &ActiveEventLoop) {
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
        }
    }

    pub(super) fn run(console: Console, pad: Rc<ButtonState>, _options: &Options) -> Result<(), Box<dyn Error>> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App {
            console,
            pad,
            pacer: Pacer::new(Instant::now()),
            window: None,
            pixels: None,
            error: None,
        };
        event_loop.run_app(&mut app)?;

        info!(
            "exited after {} frames, frame checksum {:08X}",
            app.console.frame_count(),
            frame_checksum(&app.console)
        );
        app.error.map_or(Ok(()), Err)
    }
}
