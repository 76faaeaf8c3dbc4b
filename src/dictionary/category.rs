use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight mutually exclusive item categories a term can belong to.
///
/// Each category owns exactly one column of the loot log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Trinket,
    Replacement,
    Replica,
    Experimental,
    WeaponEnchant,
    ArmorEnchant,
    Scarab,
    Currency,
}

impl Category {
    /// All categories in log column order.
    pub const ALL: [Category; 8] = [
        Category::Trinket,
        Category::Replacement,
        Category::Replica,
        Category::Experimental,
        Category::WeaponEnchant,
        Category::ArmorEnchant,
        Category::Scarab,
        Category::Currency,
    ];

    /// Parses a dictionary category label.
    ///
    /// Case, spaces, hyphens and underscores are ignored, so "Weapon Enchant",
    /// "weapon-enchant" and "WeaponEnchant" are the same label.
    pub fn parse_label(label: &str) -> Option<Self> {
        let key: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "trinket" => Some(Self::Trinket),
            "replacement" => Some(Self::Replacement),
            "replica" => Some(Self::Replica),
            "experimental" => Some(Self::Experimental),
            "weaponenchant" => Some(Self::WeaponEnchant),
            "armorenchant" | "armourenchant" => Some(Self::ArmorEnchant),
            "scarab" => Some(Self::Scarab),
            "currency" => Some(Self::Currency),
            _ => None,
        }
    }

    /// Header of the loot log column this category writes into.
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Trinket => "Trinket",
            Self::Replacement => "Replacement",
            Self::Replica => "Replica",
            Self::Experimental => "Experimental",
            Self::WeaponEnchant => "Weapon-Enchant",
            Self::ArmorEnchant => "Armor-Enchant",
            Self::Scarab => "Scarab",
            Self::Currency => "Currency",
        }
    }

    pub fn is_enchant(self) -> bool {
        matches!(self, Self::WeaponEnchant | Self::ArmorEnchant)
    }

    /// Categories whose items stack and carry a `current/maximum` ratio.
    pub fn has_stack_size(self) -> bool {
        matches!(self, Self::Scarab | Self::Currency)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trinket => write!(f, "Trinket"),
            Self::Replacement => write!(f, "Replacement"),
            Self::Replica => write!(f, "Replica"),
            Self::Experimental => write!(f, "Experimental"),
            Self::WeaponEnchant => write!(f, "Weapon Enchant"),
            Self::ArmorEnchant => write!(f, "Armor Enchant"),
            Self::Scarab => write!(f, "Scarab"),
            Self::Currency => write!(f, "Currency"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_variants() {
        assert_eq!(Category::parse_label("Currency"), Some(Category::Currency));
        assert_eq!(
            Category::parse_label("Weapon Enchant"),
            Some(Category::WeaponEnchant)
        );
        assert_eq!(
            Category::parse_label(" armor-enchant "),
            Some(Category::ArmorEnchant)
        );
        assert_eq!(
            Category::parse_label("ArmourEnchant"),
            Some(Category::ArmorEnchant)
        );
        assert_eq!(Category::parse_label("gem"), None);
        assert_eq!(Category::parse_label(""), None);
    }

    #[test]
    fn test_display_labels_parse_back() {
        for category in Category::ALL {
            assert_eq!(Category::parse_label(&category.to_string()), Some(category));
            assert_eq!(Category::parse_label(category.column_name()), Some(category));
        }
    }

    #[test]
    fn test_stack_and_enchant_flags() {
        assert!(Category::Currency.has_stack_size());
        assert!(Category::Scarab.has_stack_size());
        assert!(!Category::Trinket.has_stack_size());
        assert!(Category::WeaponEnchant.is_enchant());
        assert!(!Category::Replica.is_enchant());
    }
}
