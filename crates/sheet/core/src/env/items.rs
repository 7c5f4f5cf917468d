//! Weapon, armor and equipment catalogs.

/// Catalog entry for a weapon. Values are kept as the template writes them
/// since ranges and damage use compound notation (e.g. "20/40/80").
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponData {
    pub damage: String,
    pub ranges: String,
    pub capacity: String,
    pub strength: String,
    pub size: String,
    pub durability: String,
}

/// Catalog entry for a suit of armor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmorData {
    /// Protection against everything except firearms and bows.
    pub general: i32,
    pub firearms: i32,
    /// Defense penalty.
    pub defense: i32,
    /// Speed penalty.
    pub speed: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquipmentData {
    pub durability: i32,
    pub size: i32,
    pub cost: i32,
}
