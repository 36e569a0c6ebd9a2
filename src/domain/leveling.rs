use serde::{Deserialize, Serialize};

/// XP counters as stored on the user profile.
///
/// Canonical leveling rule: the threshold grows by half on every level-up,
/// `xp_to_next_level = floor(xp_to_next_level * 1.5)`. (An alternative
/// `level * 100` rule existed historically; this crate implements only the
/// multiplicative one.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub level: i32,
    pub xp: i32,
    pub xp_to_next_level: i32,
}

impl Progress {
    /// Counters a freshly registered user starts with.
    pub fn starting() -> Self {
        Progress {
            level: 1,
            xp: 0,
            xp_to_next_level: 100,
        }
    }

    /// Apply an XP grant, rolling over as many levels as it covers.
    /// Returns the number of levels gained.
    pub fn gain(&mut self, earned: i32) -> i32 {
        let mut gained = 0;
        self.xp += earned.max(0);
        while self.xp >= self.xp_to_next_level {
            self.xp -= self.xp_to_next_level;
            self.level += 1;
            self.xp_to_next_level = self.xp_to_next_level * 3 / 2;
            gained += 1;
        }
        gained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_without_level_up() {
        let mut p = Progress::starting();
        assert_eq!(p.gain(50), 0);
        assert_eq!(p, Progress { level: 1, xp: 50, xp_to_next_level: 100 });
    }

    #[test]
    fn gain_with_single_level_up() {
        let mut p = Progress { level: 3, xp: 90, xp_to_next_level: 100 };
        assert_eq!(p.gain(30), 1);
        assert_eq!(p, Progress { level: 4, xp: 20, xp_to_next_level: 150 });
    }

    #[test]
    fn gain_rolls_over_multiple_levels() {
        let mut p = Progress::starting();
        // 100 + 150 = 250 crosses two thresholds, 10 left over.
        assert_eq!(p.gain(260), 2);
        assert_eq!(p, Progress { level: 3, xp: 10, xp_to_next_level: 225 });
    }

    #[test]
    fn threshold_floors_on_odd_values() {
        let mut p = Progress { level: 5, xp: 0, xp_to_next_level: 225 };
        p.gain(225);
        assert_eq!(p.xp_to_next_level, 337);
    }

    #[test]
    fn negative_grants_are_ignored() {
        let mut p = Progress::starting();
        assert_eq!(p.gain(-40), 0);
        assert_eq!(p.xp, 0);
    }
}
