//! Reading loosely keyed spec snapshots: sockets, memory generations, wattage and
//! form factors. Anything that cannot be resolved comes back as `None`; callers
//! decide whether that is worth a warning.

use crate::domain::model::PartCandidate;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

const SOCKET_KEYS: [&str; 2] = ["socket", "cpu_socket"];
const MEMORY_KEYS: [&str; 5] = [
    "product_class",
    "memory_standard",
    "memory_type",
    "memory_spec",
    "device_type",
];
const WATTAGE_KEYS: [&str; 2] = ["rated_output", "rated_power"];
const TDP_KEYS: [&str; 3] = ["tdp", "thermal_design_power", "power_consumption"];
const FORM_FACTOR_KEYS: [&str; 3] = ["form_factor", "product_class", "board_form_factor"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MemoryGeneration {
    Ddr3,
    Ddr4,
    Ddr5,
}

impl MemoryGeneration {
    /// Highest generation first, so a kit listing both resolves to the newer one.
    const SEARCH_ORDER: [MemoryGeneration; 3] = [Self::Ddr5, Self::Ddr4, Self::Ddr3];

    pub fn label(self) -> &'static str {
        match self {
            Self::Ddr3 => "DDR3",
            Self::Ddr4 => "DDR4",
            Self::Ddr5 => "DDR5",
        }
    }

    fn from_clock_mhz(mhz: i64) -> Option<Self> {
        match mhz {
            4800.. => Some(Self::Ddr5),
            2000..=4799 => Some(Self::Ddr4),
            _ => None,
        }
    }
}

impl fmt::Display for MemoryGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardMemory {
    Fixed(MemoryGeneration),
    /// Boards exist in both DDR4 and DDR5 variants for this chipset.
    Either,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipsetFamily {
    pub codes: &'static [&'static str],
    pub socket: &'static str,
    pub memory: BoardMemory,
}

pub const CHIPSET_FAMILIES: [ChipsetFamily; 4] = [
    ChipsetFamily {
        codes: &["B850", "X870", "B650", "X670", "A620"],
        socket: "AM5",
        memory: BoardMemory::Fixed(MemoryGeneration::Ddr5),
    },
    ChipsetFamily {
        codes: &["B550", "X570", "A520", "B450", "X470", "A320"],
        socket: "AM4",
        memory: BoardMemory::Fixed(MemoryGeneration::Ddr4),
    },
    ChipsetFamily {
        codes: &["Z890", "B860", "H810"],
        socket: "LGA1851",
        memory: BoardMemory::Fixed(MemoryGeneration::Ddr5),
    },
    ChipsetFamily {
        codes: &["Z790", "B760", "H770", "Z690", "B660", "H670", "H610"],
        socket: "LGA1700",
        memory: BoardMemory::Either,
    },
];

fn family_in(text: &str) -> Option<&'static ChipsetFamily> {
    let upper = text.to_uppercase();
    CHIPSET_FAMILIES
        .iter()
        .find(|family| family.codes.iter().any(|code| upper.contains(code)))
}

/// Chipset spec first, then chipset codes embedded in the product name.
pub fn chipset_family(board: &PartCandidate) -> Option<&'static ChipsetFamily> {
    board
        .spec("chipset")
        .and_then(family_in)
        .or_else(|| family_in(&board.name))
}

/// Strips "소켓"/"socket" prefixes, separators and case.
pub fn normalize_socket(raw: &str) -> String {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let prefix = PREFIX.get_or_init(|| Regex::new(r"(?i)^\s*(소켓|socket)").expect("static regex"));
    prefix
        .replace(raw.trim(), "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .collect::<String>()
        .to_uppercase()
}

pub fn cpu_socket(cpu: &PartCandidate) -> Option<String> {
    cpu.spec_any(&SOCKET_KEYS)
        .map(normalize_socket)
        .filter(|socket| !socket.is_empty())
}

pub fn board_socket(board: &PartCandidate) -> Option<String> {
    board
        .spec_any(&SOCKET_KEYS)
        .map(normalize_socket)
        .filter(|socket| !socket.is_empty())
        .or_else(|| chipset_family(board).map(|family| family.socket.to_string()))
}

pub fn memory_generation(part: &PartCandidate) -> Option<MemoryGeneration> {
    let combined = MEMORY_KEYS
        .iter()
        .filter_map(|key| part.spec(key))
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();
    MemoryGeneration::SEARCH_ORDER
        .into_iter()
        .find(|generation| combined.contains(generation.label()))
}

pub fn board_memory_generation(board: &PartCandidate) -> Option<MemoryGeneration> {
    if let Some(generation) = memory_generation(board) {
        return Some(generation);
    }
    match chipset_family(board)?.memory {
        BoardMemory::Fixed(generation) => Some(generation),
        BoardMemory::Either => board
            .spec("memory_clock")
            .and_then(first_number)
            .and_then(MemoryGeneration::from_clock_mhz),
    }
}

/// First run of digits in a spec value, e.g. "650W" -> 650.
pub fn first_number(raw: &str) -> Option<i64> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let re = DIGITS.get_or_init(|| Regex::new(r"\d+").expect("static regex"));
    re.find(raw).and_then(|m| m.as_str().parse().ok())
}

pub fn psu_wattage(psu: &PartCandidate) -> Option<i64> {
    psu.spec_any(&WATTAGE_KEYS)
        .and_then(first_number)
        .filter(|watts| *watts > 0)
}

pub fn tdp_watts(part: &PartCandidate) -> Option<i64> {
    part.spec_any(&TDP_KEYS).and_then(first_number)
}

/// Uppercased concatenation of every form-factor-ish field.
pub fn form_factor_descriptor(part: &PartCandidate) -> Option<String> {
    let combined = FORM_FACTOR_KEYS
        .iter()
        .filter_map(|key| part.spec(key))
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();
    (!combined.trim().is_empty()).then_some(combined)
}

const MICRO_ATX_TOKENS: [&str; 4] = ["M-ATX", "MATX", "MICRO-ATX", "MICROATX"];

fn compact(descriptor: &str) -> String {
    descriptor.to_uppercase().replace([' ', '_'], "-")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardClass {
    FullAtx,
    MicroAtx,
    MiniItx,
}

impl BoardClass {
    pub fn classify(descriptor: &str) -> Option<Self> {
        let text = compact(descriptor);
        if MICRO_ATX_TOKENS.iter().any(|token| text.contains(token)) {
            Some(Self::MicroAtx)
        } else if text.contains("ITX") {
            Some(Self::MiniItx)
        } else if text.contains("ATX") {
            Some(Self::FullAtx)
        } else {
            None
        }
    }

    pub fn fits(self, case: CaseTags) -> bool {
        match self {
            Self::FullAtx => case.tower || case.atx,
            Self::MicroAtx => case.tower || case.atx || case.micro || case.mini,
            Self::MiniItx => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaseTags {
    pub tower: bool,
    pub atx: bool,
    pub micro: bool,
    pub mini: bool,
}

impl CaseTags {
    pub fn classify(descriptor: &str) -> Option<Self> {
        let text = compact(descriptor);
        let micro = MICRO_ATX_TOKENS.iter().any(|token| text.contains(token));
        let mut without_small = text.clone();
        for token in MICRO_ATX_TOKENS.iter().chain(["MINI-ITX"].iter()) {
            without_small = without_small.replace(token, "");
        }
        let tags = Self {
            tower: text.contains("타워") || text.contains("TOWER"),
            atx: without_small.contains("ATX"),
            micro,
            mini: text.contains("MINI") || text.contains("미니") || text.contains("ITX"),
        };
        (tags != Self::default()).then_some(tags)
    }
}

/// Air-cooled unless the specs explicitly say liquid.
pub fn is_air_cooled(cooler: &PartCandidate) -> bool {
    const LIQUID: [&str; 5] = ["수랭", "수냉", "liquid", "water", "aio"];
    !["cooling_method", "product_type", "product_class"]
        .iter()
        .map(|key| cooler.spec_lower(key))
        .any(|value| LIQUID.iter().any(|kw| value.contains(kw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Category, Specs};

    fn part(name: &str, category: Category, specs: &[(&str, &str)]) -> PartCandidate {
        PartCandidate {
            id: 1,
            name: name.to_string(),
            category,
            price: 100_000,
            manufacturer: None,
            star_rating: None,
            review_count: None,
            warranty_info: None,
            specs: specs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Specs>(),
        }
    }

    #[test]
    fn test_normalize_socket() {
        assert_eq!(normalize_socket("Socket AM5"), "AM5");
        assert_eq!(normalize_socket("소켓 AM4"), "AM4");
        assert_eq!(normalize_socket("LGA 1700"), "LGA1700");
        assert_eq!(normalize_socket("lga_1851"), "LGA1851");
        assert_eq!(normalize_socket("SOCKET-AM5"), "AM5");
    }

    #[test]
    fn test_board_socket_falls_back_to_chipset_then_name() {
        let from_spec = part("X", Category::Motherboard, &[("cpu_socket", "AM5")]);
        assert_eq!(board_socket(&from_spec).as_deref(), Some("AM5"));

        let from_chipset = part("X", Category::Motherboard, &[("chipset", "AMD B550")]);
        assert_eq!(board_socket(&from_chipset).as_deref(), Some("AM4"));

        let from_name = part("ASUS PRIME B760M-A", Category::Motherboard, &[]);
        assert_eq!(board_socket(&from_name).as_deref(), Some("LGA1700"));

        let unknown = part("Mystery board", Category::Motherboard, &[]);
        assert_eq!(board_socket(&unknown), None);
    }

    #[test]
    fn test_memory_generation_prefers_newest() {
        let ram = part("Kit", Category::Ram, &[("memory_standard", "DDR5 / DDR4 compatible")]);
        assert_eq!(memory_generation(&ram), Some(MemoryGeneration::Ddr5));
        let ram = part("Kit", Category::Ram, &[("product_class", "데스크탑용 ddr4")]);
        assert_eq!(memory_generation(&ram), Some(MemoryGeneration::Ddr4));
        assert_eq!(memory_generation(&part("Kit", Category::Ram, &[])), None);
    }

    #[test]
    fn test_board_memory_uses_clock_for_ambiguous_chipsets() {
        let ddr5 = part(
            "B760",
            Category::Motherboard,
            &[("chipset", "B760"), ("memory_clock", "5600MHz")],
        );
        assert_eq!(board_memory_generation(&ddr5), Some(MemoryGeneration::Ddr5));

        let ddr4 = part(
            "B760",
            Category::Motherboard,
            &[("chipset", "B760"), ("memory_clock", "3200MHz")],
        );
        assert_eq!(board_memory_generation(&ddr4), Some(MemoryGeneration::Ddr4));

        let unknown = part("B760", Category::Motherboard, &[("chipset", "B760")]);
        assert_eq!(board_memory_generation(&unknown), None);

        let fixed = part("MSI B650 TOMAHAWK", Category::Motherboard, &[]);
        assert_eq!(board_memory_generation(&fixed), Some(MemoryGeneration::Ddr5));
    }

    #[test]
    fn test_wattage_and_tdp() {
        let psu = part("PSU", Category::Psu, &[("rated_output", "650W")]);
        assert_eq!(psu_wattage(&psu), Some(650));
        let psu = part("PSU", Category::Psu, &[("rated_output", "정격")]);
        assert_eq!(psu_wattage(&psu), None);
        let cpu = part("CPU", Category::Cpu, &[("thermal_design_power", "125 W")]);
        assert_eq!(tdp_watts(&cpu), Some(125));
    }

    #[test]
    fn test_board_class() {
        assert_eq!(BoardClass::classify("ATX"), Some(BoardClass::FullAtx));
        assert_eq!(BoardClass::classify("M-ATX"), Some(BoardClass::MicroAtx));
        assert_eq!(BoardClass::classify("MICRO ATX"), Some(BoardClass::MicroAtx));
        assert_eq!(BoardClass::classify("MINI-ITX"), Some(BoardClass::MiniItx));
        assert_eq!(BoardClass::classify("???"), None);
    }

    #[test]
    fn test_case_tags_and_fit() {
        let mid_tower = CaseTags::classify("미들타워 ATX").unwrap();
        assert!(BoardClass::FullAtx.fits(mid_tower));

        let matx_case = CaseTags::classify("M-ATX").unwrap();
        assert!(!matx_case.atx);
        assert!(!BoardClass::FullAtx.fits(matx_case));
        assert!(BoardClass::MicroAtx.fits(matx_case));

        let itx_case = CaseTags::classify("MINI-ITX").unwrap();
        assert!(!BoardClass::MicroAtx.fits(CaseTags { mini: false, ..itx_case }));
        assert!(BoardClass::MiniItx.fits(itx_case));

        assert_eq!(CaseTags::classify("BLACK"), None);
    }

    #[test]
    fn test_air_cooled_unless_liquid() {
        let tower = part("DEEPCOOL AK400", Category::Cooler, &[("cooling_method", "공랭")]);
        assert!(is_air_cooled(&tower));
        let aio = part("NZXT Kraken", Category::Cooler, &[("cooling_method", "수랭")]);
        assert!(!is_air_cooled(&aio));
        // 名稱不算數，只看規格
        let unnamed = part("Liquid Freezer", Category::Cooler, &[]);
        assert!(is_air_cooled(&unnamed));
    }
}
