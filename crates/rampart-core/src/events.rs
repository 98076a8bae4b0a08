//! Events emitted by the simulation for audio and UI feedback.

use serde::{Deserialize, Serialize};

use crate::enums::WeaponKind;
use crate::types::Position;

/// Something observable happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A new enemy entered at the spawn point.
    EnemySpawned { position: Position },
    /// An enemy walked off the end of the path.
    EnemyEscaped { position: Position },
    /// An enemy's health ran out and it exploded.
    EnemyDestroyed { position: Position },
    /// A turret discharged its weapon.
    WeaponFired {
        weapon: WeaponKind,
        position: Position,
    },
}
