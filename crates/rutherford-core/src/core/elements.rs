//! Element presets for the target foil.
//!
//! Each entry pairs an element symbol with the proton and neutron counts of its most common
//! stable (or longest-lived) isotope. All presets fall inside the proton and neutron slider
//! ranges of the simulation.

use phf::phf_map;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub symbol: &'static str,
    pub name: &'static str,
    pub protons: u32,
    pub neutrons: u32,
}

static ELEMENTS: phf::Map<&'static str, Element> = phf_map! {
    "ca" => Element { symbol: "Ca", name: "Calcium", protons: 20, neutrons: 20 },
    "ti" => Element { symbol: "Ti", name: "Titanium", protons: 22, neutrons: 26 },
    "fe" => Element { symbol: "Fe", name: "Iron", protons: 26, neutrons: 30 },
    "ni" => Element { symbol: "Ni", name: "Nickel", protons: 28, neutrons: 30 },
    "cu" => Element { symbol: "Cu", name: "Copper", protons: 29, neutrons: 35 },
    "zn" => Element { symbol: "Zn", name: "Zinc", protons: 30, neutrons: 34 },
    "ag" => Element { symbol: "Ag", name: "Silver", protons: 47, neutrons: 60 },
    "sn" => Element { symbol: "Sn", name: "Tin", protons: 50, neutrons: 70 },
    "ba" => Element { symbol: "Ba", name: "Barium", protons: 56, neutrons: 82 },
    "w" => Element { symbol: "W", name: "Tungsten", protons: 74, neutrons: 110 },
    "pt" => Element { symbol: "Pt", name: "Platinum", protons: 78, neutrons: 117 },
    "au" => Element { symbol: "Au", name: "Gold", protons: 79, neutrons: 118 },
    "hg" => Element { symbol: "Hg", name: "Mercury", protons: 80, neutrons: 122 },
    "pb" => Element { symbol: "Pb", name: "Lead", protons: 82, neutrons: 126 },
    "bi" => Element { symbol: "Bi", name: "Bismuth", protons: 83, neutrons: 126 },
    "th" => Element { symbol: "Th", name: "Thorium", protons: 90, neutrons: 142 },
    "u" => Element { symbol: "U", name: "Uranium", protons: 92, neutrons: 146 },
};

/// Looks up an element by symbol, ignoring case.
pub fn by_symbol(symbol: &str) -> Option<&'static Element> {
    ELEMENTS.get(symbol.trim().to_ascii_lowercase().as_str())
}

pub fn by_proton_count(protons: u32) -> Option<&'static Element> {
    ELEMENTS.values().find(|element| element.protons == protons)
}

/// All presets ordered by proton count.
pub fn all() -> Vec<&'static Element> {
    let mut elements: Vec<_> = ELEMENTS.values().collect();
    elements.sort_by_key(|element| element.protons);
    elements
}
