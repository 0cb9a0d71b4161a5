//! Static waste catalog mapping category labels to disposal metadata.

use crate::model::WasteCategoryInfo;

const BLUE_BIN: &str = "Recycling Bin (Blue)";
const TEXTILE_BIN: &str = "Textile Recycling / Donation";

static BUILTIN: [WasteCategoryInfo; 9] = [
    WasteCategoryInfo {
        label: "CARDBOARD",
        recyclable: true,
        disposal_bin: BLUE_BIN,
        color: "#D97706",
        icon: "📦",
        category: "Paper Products",
        instructions: &[
            "Flatten all cardboard boxes",
            "Remove tape and labels",
            "Keep dry and clean",
            "Place in recycling bin",
        ],
        environmental_tip: "Recycling cardboard saves 24% of energy",
        co2_saved: 0.4,
        energy_saved: 1.2,
        water_saved: 8.0,
        trees_equivalent: 0.017,
        warnings: &[],
    },
    WasteCategoryInfo {
        label: "GLASS",
        recyclable: true,
        disposal_bin: BLUE_BIN,
        color: "#06B6D4",
        icon: "🥃",
        category: "Glass Materials",
        instructions: &[
            "Rinse thoroughly",
            "Remove caps and lids",
            "No need to remove labels",
            "Place in glass recycling",
        ],
        environmental_tip: "Glass can be recycled infinitely without loss of quality",
        co2_saved: 0.3,
        energy_saved: 0.8,
        water_saved: 5.0,
        trees_equivalent: 0.012,
        warnings: &[],
    },
    WasteCategoryInfo {
        label: "METAL",
        recyclable: true,
        disposal_bin: BLUE_BIN,
        color: "#64748B",
        icon: "⚙️",
        category: "Metal Products",
        instructions: &[
            "Rinse and clean",
            "Crush cans to save space",
            "Remove paper labels",
            "Place in metal recycling",
        ],
        environmental_tip: "Recycling aluminum saves 95% of energy",
        co2_saved: 1.2,
        energy_saved: 3.5,
        water_saved: 15.0,
        trees_equivalent: 0.045,
        warnings: &[],
    },
    WasteCategoryInfo {
        label: "PAPER",
        recyclable: true,
        disposal_bin: BLUE_BIN,
        color: "#3B82F6",
        icon: "📄",
        category: "Paper Products",
        instructions: &[
            "Keep dry and clean",
            "Remove plastic coating",
            "Flatten paper items",
            "Place in paper recycling",
        ],
        environmental_tip: "Recycling one ton of paper saves 17 trees",
        co2_saved: 0.6,
        energy_saved: 1.5,
        water_saved: 25.0,
        trees_equivalent: 0.024,
        warnings: &[],
    },
    WasteCategoryInfo {
        label: "PLASTIC",
        recyclable: true,
        disposal_bin: BLUE_BIN,
        color: "#8B5CF6",
        icon: "♻️",
        category: "Plastic Products",
        instructions: &[
            "Check recycling number (1-7)",
            "Rinse thoroughly",
            "Remove caps",
            "Place in plastic recycling",
        ],
        environmental_tip: "Plastic takes 450+ years to decompose in landfills",
        co2_saved: 0.5,
        energy_saved: 1.8,
        water_saved: 12.0,
        trees_equivalent: 0.019,
        warnings: &[],
    },
    WasteCategoryInfo {
        label: "BATTERY",
        recyclable: true,
        disposal_bin: "Special Waste Collection",
        color: "#EAB308",
        icon: "🔋",
        category: "Hazardous Waste",
        instructions: &[
            "Never throw in regular trash",
            "Take to battery collection point",
            "Tape terminals for safety",
            "Store in cool, dry place",
        ],
        environmental_tip: "Batteries contain toxic materials that contaminate soil",
        co2_saved: 0.2,
        energy_saved: 0.5,
        water_saved: 3.0,
        trees_equivalent: 0.008,
        warnings: &["⚠️ HAZARDOUS WASTE - Never put in regular bins!"],
    },
    WasteCategoryInfo {
        label: "CLOTHES",
        recyclable: true,
        disposal_bin: TEXTILE_BIN,
        color: "#EC4899",
        icon: "👕",
        category: "Textiles",
        instructions: &[
            "Clean and dry clothes",
            "Donate if in good condition",
            "Textile recycling for damaged items",
            "Never throw in regular trash",
        ],
        environmental_tip: "Textile recycling reduces landfill waste",
        co2_saved: 0.8,
        energy_saved: 2.2,
        water_saved: 30.0,
        trees_equivalent: 0.032,
        warnings: &[],
    },
    WasteCategoryInfo {
        label: "ORGANIC",
        recyclable: false,
        disposal_bin: "Compost Bin (Green)",
        color: "#22C55E",
        icon: "🌱",
        category: "Organic Waste",
        instructions: &[
            "Separate from packaging",
            "Chop large pieces",
            "Place in compost bin",
            "Cover with brown materials",
        ],
        environmental_tip: "Composting reduces methane emissions from landfills",
        co2_saved: 0.3,
        energy_saved: 0.4,
        water_saved: 2.0,
        trees_equivalent: 0.011,
        warnings: &["⚠️ Avoid meat, dairy in home compost"],
    },
    WasteCategoryInfo {
        label: "SHOES",
        recyclable: true,
        disposal_bin: TEXTILE_BIN,
        color: "#7C3AED",
        icon: "👟",
        category: "Footwear",
        instructions: &[
            "Clean shoes",
            "Tie pairs together",
            "Donate if wearable",
            "Shoe recycling for damaged",
        ],
        environmental_tip: "Many brands have take-back recycling programs",
        co2_saved: 0.7,
        energy_saved: 1.9,
        water_saved: 20.0,
        trees_equivalent: 0.028,
        warnings: &[],
    },
];

/// Read-only lookup table of waste categories.
#[derive(Debug, Clone, Copy)]
pub struct WasteCatalog {
    entries: &'static [WasteCategoryInfo],
}

impl WasteCatalog {
    /// Catalog containing the categories the detector is trained on.
    #[must_use]
    pub fn builtin() -> Self {
        Self { entries: &BUILTIN }
    }

    /// Catalog over a custom table.
    #[must_use]
    pub const fn from_static(entries: &'static [WasteCategoryInfo]) -> Self {
        Self { entries }
    }

    /// Find the entry for `label`, ignoring ASCII case and surrounding whitespace.
    #[must_use]
    pub fn lookup(&self, label: &str) -> Option<&'static WasteCategoryInfo> {
        let label = label.trim();
        self.entries
            .iter()
            .find(|entry| entry.label.eq_ignore_ascii_case(label))
    }

    /// All entries in catalog order.
    #[must_use]
    pub fn entries(&self) -> &'static [WasteCategoryInfo] {
        self.entries
    }
}

impl Default for WasteCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let catalog = WasteCatalog::builtin();
        let info = catalog.lookup(" glass ").expect("glass is built in");
        assert_eq!(info.label, "GLASS", "canonical label is returned");
    }

    #[test]
    fn unknown_label_is_not_defaulted() {
        assert!(
            WasteCatalog::builtin().lookup("STYROFOAM").is_none(),
            "unknown labels must not fall back to an empty entry"
        );
    }

    #[test]
    fn labels_are_unique_and_impacts_non_negative() {
        let entries = WasteCatalog::builtin().entries();
        let labels: HashSet<&str> = entries.iter().map(|entry| entry.label).collect();
        assert_eq!(labels.len(), entries.len(), "duplicate label in catalog");

        for entry in entries {
            assert!(entry.co2_saved >= 0.0, "{} co2", entry.label);
            assert!(entry.energy_saved >= 0.0, "{} energy", entry.label);
            assert!(entry.water_saved >= 0.0, "{} water", entry.label);
            assert!(entry.trees_equivalent >= 0.0, "{} trees", entry.label);
            assert!(!entry.instructions.is_empty(), "{} instructions", entry.label);
        }
    }

    #[test]
    fn only_hazardous_and_compost_entries_carry_warnings() {
        let warned: Vec<&str> = WasteCatalog::builtin()
            .entries()
            .iter()
            .filter(|entry| !entry.warnings.is_empty())
            .map(|entry| entry.label)
            .collect();
        assert_eq!(warned, ["BATTERY", "ORGANIC"], "entries with warnings");
    }
}
