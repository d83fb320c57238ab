//! Runtime chip detection

use crate::bus::SpiBus;
use crate::chip::{ChipVariant, FlashChip, JedecId};
use crate::error::{Error, IdentFailure, Result};
use crate::protocol;
use maybe_async::maybe_async;

use super::{DriverConfig, FlashDriver};

/// Find which of `candidates` is attached and return an initialized driver
///
/// Each round applies every candidate's bus settings in turn and issues one
/// RDID; the first candidate whose identity comes back wins. Rounds repeat
/// under `config.ident`, so the power-up budget is the same as for `init()`.
/// The winning driver is then brought up with `init()`.
#[maybe_async]
pub async fn probe<B: SpiBus>(
    mut bus: B,
    candidates: &[ChipVariant],
    config: DriverConfig,
) -> Result<FlashDriver<B, ChipVariant>> {
    let policy = config.ident;
    let rounds = if candidates.is_empty() {
        0
    } else {
        policy.effective_attempts()
    };
    let mut last = JedecId::default();

    for round in 1..=rounds {
        for &candidate in candidates {
            bus.set_cs(false);
            bus.configure(&config.bus_for(&candidate))?;
            last = protocol::read_identity(&mut bus, candidate.commands().identify).await?;
            log::trace!("probe: {} -> {}", candidate, last);

            if let Some(found) = candidates.iter().copied().find(|c| c.id() == last) {
                // A part answering under another candidate's settings only
                // counts when those settings agree with its own
                if config.bus_for(&found) == config.bus_for(&candidate) {
                    log::debug!("probe: matched {} in round {}", found, round);
                    let mut driver = FlashDriver::new(bus, found, config);
                    driver.init().await?;
                    return Ok(driver);
                }
            }
        }
        if round < rounds && policy.delay_us > 0 {
            bus.delay_us(policy.delay_us).await;
        }
    }

    log::warn!("probe: no candidate answered, last id {}", last);
    Err(Error::IdentificationFailed(IdentFailure::NotDetected {
        last,
        attempts: rounds,
    }))
}
