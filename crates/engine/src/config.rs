//! Configuration for the puzzle engine.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Evaluation constants
    pub threat_bonus: f64,
    pub follow_up_weight: f64,
    pub follow_up_piece_value: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub center_base: f64,

    // Environment events
    pub spawn_count: usize,
    pub shift_chance: f64,
}

impl Config {
    /// Bonus for a move that lines the Car up with `count` pieces after a King capture.
    pub fn follow_up_bonus(&self, count: u32) -> f64 {
        self.follow_up_weight * self.follow_up_piece_value * f64::from(count)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threat_bonus: 15.0,
            follow_up_weight: 0.7,
            follow_up_piece_value: 20.0,
            center_x: 4.5,
            center_y: 5.0,
            center_base: 4.0,
            spawn_count: 3,
            shift_chance: 0.35,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{"threat_bonus": 10.0}"#).unwrap();
        assert_eq!(config.threat_bonus, 10.0);
        assert_eq!(config.spawn_count, 3);
        assert!((config.follow_up_bonus(2) - 28.0).abs() < 1e-9);
    }
}
