/*
Module: mappers

Bank-switching cartridge boards. NROM lives next to the trait in
`crate::mapper`; everything here is selected by the cartridge loader.

Implemented:
- MMC1 (Mapper 1)
- UxROM (Mapper 2)
- CNROM (Mapper 3)
- MMC3 (Mapper 4), scanline IRQ counter included
- AxROM (Mapper 7)
*/

pub mod axrom;
pub mod cnrom;
pub mod mmc1;
pub mod mmc3;
pub mod uxrom;

pub use axrom::Axrom;
pub use cnrom::Cnrom;
pub use mmc1::Mmc1;
pub use mmc3::Mmc3;
pub use uxrom::Uxrom;
