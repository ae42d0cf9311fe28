//! Stat ranges and boost stages

use seer_protocol::{PokemonStats, Stat};
use serde::{Deserialize, Serialize};

/// Lower and upper bound of one stat. Equal bounds mean the stat is known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl StatRange {
    pub fn exact(value: u32) -> Self {
        Self {
            min: Some(value),
            max: Some(value),
        }
    }

    pub fn is_known(&self) -> bool {
        self.min.is_some() && self.min == self.max
    }
}

/// Min/max stat block of one pokemon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub hp: StatRange,
    pub atk: StatRange,
    pub def: StatRange,
    pub spa: StatRange,
    pub spd: StatRange,
    pub spe: StatRange,
}

impl StatBlock {
    /// Stats disclosed by our own request, which are exact
    pub fn exact(stats: &PokemonStats, max_hp: Option<u32>) -> Self {
        Self {
            hp: max_hp.map(StatRange::exact).unwrap_or_default(),
            atk: StatRange::exact(stats.atk),
            def: StatRange::exact(stats.def),
            spa: StatRange::exact(stats.spa),
            spd: StatRange::exact(stats.spd),
            spe: StatRange::exact(stats.spe),
        }
    }
}

/// Boost stages (-6 to +6)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boosts {
    pub atk: i8,
    pub def: i8,
    pub spa: i8,
    pub spd: i8,
    pub spe: i8,
    pub accuracy: i8,
    pub evasion: i8,
}

impl Boosts {
    fn stage_mut(&mut self, stat: Stat) -> &mut i8 {
        match stat {
            Stat::Atk => &mut self.atk,
            Stat::Def => &mut self.def,
            Stat::Spa => &mut self.spa,
            Stat::Spd => &mut self.spd,
            Stat::Spe => &mut self.spe,
            Stat::Accuracy => &mut self.accuracy,
            Stat::Evasion => &mut self.evasion,
        }
    }

    pub fn get(&self, stat: Stat) -> i8 {
        match stat {
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::Spa => self.spa,
            Stat::Spd => self.spd,
            Stat::Spe => self.spe,
            Stat::Accuracy => self.accuracy,
            Stat::Evasion => self.evasion,
        }
    }

    /// Set stage for a stat (clamped to -6..+6)
    pub fn set(&mut self, stat: Stat, value: i8) {
        *self.stage_mut(stat) = value.clamp(-6, 6);
    }

    /// Apply a boost (negative for drops)
    pub fn boost(&mut self, stat: Stat, amount: i8) {
        let stage = self.stage_mut(stat);
        *stage = stage.saturating_add(amount).clamp(-6, 6);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boost_clamps() {
        let mut boosts = Boosts::default();
        boosts.boost(Stat::Atk, 2);
        assert_eq!(boosts.get(Stat::Atk), 2);

        boosts.boost(Stat::Atk, 6);
        assert_eq!(boosts.atk, 6);

        boosts.boost(Stat::Spe, -1);
        boosts.boost(Stat::Spe, -12);
        assert_eq!(boosts.spe, -6);
    }

    #[test]
    fn test_set_and_clear() {
        let mut boosts = Boosts::default();
        boosts.set(Stat::Def, 10);
        assert_eq!(boosts.def, 6);

        boosts.clear();
        assert!(boosts.is_clear());
    }

    #[test]
    fn test_exact_stat_block() {
        let stats = PokemonStats {
            atk: 100,
            def: 90,
            spa: 80,
            spd: 70,
            spe: 60,
        };
        let block = StatBlock::exact(&stats, Some(250));

        assert!(block.hp.is_known());
        assert_eq!(block.hp.max, Some(250));
        assert_eq!(block.spe, StatRange::exact(60));
        assert!(!StatBlock::exact(&stats, None).hp.is_known());
    }
}
