//! Commands accepted by the simulation engine between ticks.

use serde::{Deserialize, Serialize};

/// Engine control issued by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    /// Stop advancing time until resumed.
    Pause,
    /// Resume a paused simulation.
    Resume,
    /// Scale elapsed time per tick (1.0 = normal).
    SetTimeScale { scale: f64 },
}
