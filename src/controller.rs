/*!
Controller input: the polled-device capability and the serial port protocol
behind $4016/$4017.

Behavior:
- Buttons are a bitmask with A in bit 7 down to Right in bit 0, so the CPU
  reads them MSB first: A, B, Select, Start, Up, Down, Left, Right.
- Writing $4016 bit 0 drives the strobe line of every port:
  * While strobe is high, each read re-polls the device and returns the A bit.
  * The high-to-low transition freezes a snapshot and rewinds the shift index.
  * With strobe low, each read returns the next bit of the snapshot. After the
    8th read every further read returns 1.
- Reads return the bit alone in bit 0; upper bits are 0.

Devices are injected: a host backend implements [`InputDevice`] and is
registered into a slot. The core only polls it and never owns its lifecycle.
An empty slot reads as no buttons pressed.
*/

use std::cell::Cell;
use std::rc::Rc;

use bitflags::bitflags;

use crate::error::InputError;

/// Number of controller ports.
pub const MAX_PLAYERS: usize = 2;

bitflags! {
    /// Button state bitmask, shifted out MSB first.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ButtonFlags: u8 {
        const A = 0x80;
        const B = 0x40;
        const SELECT = 0x20;
        const START = 0x10;
        const UP = 0x08;
        const DOWN = 0x04;
        const LEFT = 0x02;
        const RIGHT = 0x01;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    #[inline]
    pub fn flag(self) -> ButtonFlags {
        match self {
            Button::A => ButtonFlags::A,
            Button::B => ButtonFlags::B,
            Button::Select => ButtonFlags::SELECT,
            Button::Start => ButtonFlags::START,
            Button::Up => ButtonFlags::UP,
            Button::Down => ButtonFlags::DOWN,
            Button::Left => ButtonFlags::LEFT,
            Button::Right => ButtonFlags::RIGHT,
        }
    }
}

/// A source of button state.
pub trait InputDevice {
    /// Current pressed buttons.
    fn poll_status(&self) -> ButtonFlags;

    /// Whether the backend can deliver input. Checked once, at registration.
    fn is_available(&self) -> bool {
        true
    }
}

/// Shared button state that hosts update from their own events.
///
/// Clone the `Rc` handed to [`InputPorts::register`] and call `set` from the
/// event loop; the emulated controller sees the change on its next poll.
#[derive(Debug, Default)]
pub struct ButtonState {
    buttons: Cell<ButtonFlags>,
}

impl ButtonState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, button: Button, pressed: bool) {
        let mut flags = self.buttons.get();
        flags.set(button.flag(), pressed);
        self.buttons.set(flags);
    }

    pub fn press(&self, button: Button) {
        self.set(button, true);
    }

    pub fn release(&self, button: Button) {
        self.set(button, false);
    }

    pub fn set_all(&self, flags: ButtonFlags) {
        self.buttons.set(flags);
    }
}

impl InputDevice for ButtonState {
    fn poll_status(&self) -> ButtonFlags {
        self.buttons.get()
    }
}

/// One controller port: the device plugged into it plus the shift register.
#[derive(Default)]
pub struct ControllerPort {
    device: Option<Rc<dyn InputDevice>>,
    latched: u8,
    strobe: bool,
    // 0..8 -> bits A..Right, 8 -> exhausted (reads return 1)
    index: u8,
}

impl ControllerPort {
    fn poll(&self) -> u8 {
        self.device
            .as_ref()
            .map_or(0, |d| d.poll_status().bits())
    }

    #[inline]
    fn latch(&mut self) {
        self.latched = self.poll();
        self.index = 0;
    }

    pub fn write_strobe(&mut self, value: u8) {
        let high = value & 1 != 0;
        if high || self.strobe {
            self.latch();
        }
        self.strobe = high;
    }

    pub fn read(&mut self) -> u8 {
        if self.strobe {
            self.latch();
            return self.latched >> 7;
        }
        if self.index < 8 {
            let bit = (self.latched >> (7 - self.index)) & 1;
            self.index += 1;
            bit
        } else {
            1
        }
    }

    pub fn is_connected(&self) -> bool {
        self.device.is_some()
    }

    pub fn latched_mask(&self) -> u8 {
        self.latched
    }
}

/// The fixed set of controller ports.
#[derive(Default)]
pub struct InputPorts {
    ports: [ControllerPort; MAX_PLAYERS],
}

impl InputPorts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plug `device` into `slot`, replacing whatever was there. The slot's
    /// shift state is kept so an in-flight read sequence is not disturbed.
    pub fn register(&mut self, slot: usize, device: Rc<dyn InputDevice>) -> Result<(), InputError> {
        let port = self.ports.get_mut(slot).ok_or(InputError::SlotOutOfRange {
            slot,
            max: MAX_PLAYERS,
        })?;
        if !device.is_available() {
            port.device = None;
            return Err(InputError::Unavailable { slot });
        }
        port.device = Some(device);
        Ok(())
    }

    pub fn unregister(&mut self, slot: usize) {
        if let Some(port) = self.ports.get_mut(slot) {
            port.device = None;
        }
    }

    pub fn unregister_all(&mut self) {
        for port in &mut self.ports {
            port.device = None;
        }
    }

    /// $4016 write: strobe every port.
    pub fn write_strobe(&mut self, value: u8) {
        for port in &mut self.ports {
            port.write_strobe(value);
        }
    }

    /// $4016/$4017 read for port `slot`.
    pub fn read(&mut self, slot: usize) -> u8 {
        self.ports.get_mut(slot).map_or(0, ControllerPort::read)
    }

    /// Clear shift state on power-on. Registered devices stay plugged in.
    pub fn reset(&mut self) {
        for port in &mut self.ports {
            port.latched = 0;
            port.strobe = false;
            port.index = 0;
        }
    }

    pub fn port(&self, slot: usize) -> Option<&ControllerPort> {
        self.ports.get(slot)
    }
}
