/// Experience needed to complete one full prestige of 100 levels.
pub const PRESTIGE_XP: u64 = 487_000;

/// The first four levels after a prestige are discounted.
const EARLY_LEVEL_COSTS: [u64; 4] = [500, 1_000, 2_000, 3_500];

/// Every level past the discounted ones costs a flat amount.
const LEVEL_XP: u64 = 5_000;

/// Converts raw Bedwars experience into a star level. Whole prestiges are
/// peeled off first, then the discounted early levels, then flat levels.
pub fn level_for_experience(experience: u64) -> u32 {
    let prestiges = experience / PRESTIGE_XP;
    let mut remainder = experience % PRESTIGE_XP;
    let mut level = prestiges as u32 * 100;

    for cost in EARLY_LEVEL_COSTS {
        if remainder < cost {
            return level;
        }
        remainder -= cost;
        level += 1;
    }

    level + (remainder / LEVEL_XP) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_experience_is_level_zero() {
        assert_eq!(level_for_experience(0), 0);
        assert_eq!(level_for_experience(499), 0);
    }

    #[test]
    fn early_levels_use_discounted_costs() {
        assert_eq!(level_for_experience(500), 1);
        assert_eq!(level_for_experience(1_500), 2);
        assert_eq!(level_for_experience(3_500), 3);
        assert_eq!(level_for_experience(6_999), 3);
        assert_eq!(level_for_experience(7_000), 4);
    }

    #[test]
    fn flat_levels_after_the_discounts() {
        assert_eq!(level_for_experience(12_000), 5);
        assert_eq!(level_for_experience(11_999), 4);
    }

    #[test]
    fn prestige_boundaries() {
        assert_eq!(level_for_experience(PRESTIGE_XP - 1), 99);
        assert_eq!(level_for_experience(PRESTIGE_XP), 100);
        assert_eq!(level_for_experience(PRESTIGE_XP + 500), 101);
        assert_eq!(level_for_experience(3 * PRESTIGE_XP + 7_000), 304);
    }
}
