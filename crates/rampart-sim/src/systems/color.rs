//! Enemy tint as a function of remaining health.

use hecs::World;

use rampart_core::components::{Enemy, Health};
use rampart_core::types::Color;

/// Tint for an enemy at `health`. Full health is black; damage shades
/// towards a dark red.
pub fn damage_color(health: f64) -> Color {
    let damage = 1.0 - health;
    Color::new(damage / 2.0, damage / 5.0, damage / 7.0)
}

/// Overwrite every enemy's color from its health.
pub fn run(world: &mut World) {
    for (_entity, (_enemy, health, color)) in world.query_mut::<(&Enemy, &Health, &mut Color)>() {
        *color = damage_color(health.value);
    }
}
