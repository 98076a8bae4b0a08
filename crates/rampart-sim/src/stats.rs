//! Cumulative counters kept by the engine.

use rampart_core::enums::WeaponKind;
use rampart_core::state::StatsView;

/// Running totals since the engine was created.
#[derive(Debug, Clone, Default)]
pub struct SimStats {
    pub enemies_spawned: u32,
    pub enemies_destroyed: u32,
    pub enemies_escaped: u32,
    pub cannon_shots: u32,
    pub railgun_shots: u32,
}

impl SimStats {
    pub fn record_shot(&mut self, weapon: WeaponKind) {
        match weapon {
            WeaponKind::Cannon => self.cannon_shots += 1,
            WeaponKind::Railgun => self.railgun_shots += 1,
        }
    }

    pub fn view(&self) -> StatsView {
        StatsView {
            enemies_spawned: self.enemies_spawned,
            enemies_destroyed: self.enemies_destroyed,
            enemies_escaped: self.enemies_escaped,
            cannon_shots: self.cannon_shots,
            railgun_shots: self.railgun_shots,
        }
    }
}
