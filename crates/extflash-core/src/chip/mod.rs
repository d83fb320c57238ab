//! Flash chip types and supported variants
//!
//! This module provides the static description of each supported part
//! (identity, geometry, timing, opcodes) and the [`FlashChip`] trait the
//! driver is written against.

mod types;
mod variants;

pub use types::*;
pub use variants::*;

use crate::bus::BusConfig;
use crate::spi::AddressWidth;

/// Capability interface implemented once per supported part
///
/// The policy layer only ever talks to a chip through this trait, so adding
/// a part means adding a descriptor, never touching the driver.
pub trait FlashChip {
    /// Static description of the part
    fn descriptor(&self) -> &'static ChipDescriptor;

    /// Geometry and timing
    fn geometry(&self) -> FlashGeometry {
        self.descriptor().geometry
    }

    /// Opcodes
    fn commands(&self) -> CommandSet {
        self.descriptor().commands
    }

    /// Address width of the array commands
    fn address_width(&self) -> AddressWidth {
        self.descriptor().address_width
    }

    /// Expected RDID identity
    fn id(&self) -> JedecId {
        self.descriptor().id
    }

    /// Default bus settings
    fn bus_config(&self) -> BusConfig {
        self.descriptor().bus
    }
}
