/// Spell rarity tier, derived purely from the number of applied modifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    pub fn from_modifier_count(count: usize) -> Self {
        match count {
            0 => Rarity::Common,
            1 => Rarity::Uncommon,
            2 => Rarity::Rare,
            _ => Rarity::Legendary,
        }
    }

    /// Tag shown before a spell's name in reward listings.
    pub const fn prefix(self) -> &'static str {
        match self {
            Rarity::Common => "",
            Rarity::Uncommon => "[UNCOMMON] ",
            Rarity::Rare => "[RARE] ",
            Rarity::Legendary => "[LEGENDARY] ",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_follow_modifier_count() {
        let tiers: Vec<Rarity> = (0..=4).map(Rarity::from_modifier_count).collect();
        assert_eq!(
            tiers,
            vec![
                Rarity::Common,
                Rarity::Uncommon,
                Rarity::Rare,
                Rarity::Legendary,
                Rarity::Legendary
            ]
        );
        assert_eq!(Rarity::Rare.prefix(), "[RARE] ");
    }
}
