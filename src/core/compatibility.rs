use crate::core::inference::{
    board_memory_generation, board_socket, cpu_socket, form_factor_descriptor, memory_generation,
    psu_wattage, tdp_watts, BoardClass, CaseTags,
};
use crate::domain::model::{Category, CompatibilityOutcome, PartCandidate, SelectionResult};

/// Assumed draw for a CPU or GPU whose TDP cannot be read.
pub const PLACEHOLDER_TDP_WATTS: i64 = 150;
/// Everything that is not the CPU or GPU.
pub const BASELINE_SYSTEM_WATTS: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Socket,
    MemoryGeneration,
    Power,
    FormFactor,
}

impl Rule {
    pub const ALL: [Rule; 4] = [
        Rule::Socket,
        Rule::MemoryGeneration,
        Rule::Power,
        Rule::FormFactor,
    ];

    /// Category whose replacement is most likely to clear a failure of this rule.
    pub fn repair_target(self) -> Category {
        match self {
            Rule::Power => Category::Psu,
            Rule::Socket | Rule::MemoryGeneration | Rule::FormFactor => Category::Motherboard,
        }
    }

    /// Appends this rule's errors and warnings. Returns true if it added an error.
    pub fn evaluate(self, selection: &SelectionResult, outcome: &mut CompatibilityOutcome) -> bool {
        let before = outcome.errors.len();
        match self {
            Rule::Socket => check_socket(selection, outcome),
            Rule::MemoryGeneration => check_memory(selection, outcome),
            Rule::Power => check_power(selection, outcome),
            Rule::FormFactor => check_form_factor(selection, outcome),
        }
        outcome.errors.len() > before
    }
}

/// Result of one full pass, with the rules that produced errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub outcome: CompatibilityOutcome,
    pub failed_rules: Vec<Rule>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityChecker;

impl CompatibilityChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, selection: &SelectionResult) -> CompatibilityOutcome {
        self.check_detailed(selection).outcome
    }

    pub fn check_detailed(&self, selection: &SelectionResult) -> CheckReport {
        let mut outcome = CompatibilityOutcome::new();
        let failed_rules = Rule::ALL
            .into_iter()
            .filter(|rule| rule.evaluate(selection, &mut outcome))
            .collect();
        CheckReport {
            outcome: outcome.finalize(),
            failed_rules,
        }
    }

    /// True when none of `rules` reports an error for `selection`.
    pub fn passes(&self, selection: &SelectionResult, rules: &[Rule]) -> bool {
        let mut scratch = CompatibilityOutcome::new();
        rules
            .iter()
            .all(|rule| !rule.evaluate(selection, &mut scratch))
    }
}

fn pair(
    selection: &SelectionResult,
    a: Category,
    b: Category,
) -> Option<(&PartCandidate, &PartCandidate)> {
    Some((selection.get(&a)?, selection.get(&b)?))
}

fn check_socket(selection: &SelectionResult, outcome: &mut CompatibilityOutcome) {
    let Some((cpu, board)) = pair(selection, Category::Cpu, Category::Motherboard) else {
        return;
    };

    match (cpu_socket(cpu), board_socket(board)) {
        (Some(cpu_socket), Some(board_socket)) => {
            if cpu_socket == board_socket {
                tracing::debug!("CPU and motherboard socket match: {}", cpu_socket);
            } else {
                outcome.add_error(format!(
                    "CPU socket ({}) does not match motherboard socket ({}); the CPU cannot be installed.",
                    cpu_socket, board_socket
                ));
            }
        }
        (cpu_socket, board_socket) => {
            if cpu_socket.is_none() {
                outcome.add_warning(format!(
                    "Socket of CPU '{}' is unknown; CPU and motherboard compatibility could not be verified.",
                    cpu.name
                ));
            }
            if board_socket.is_none() {
                outcome.add_warning(format!(
                    "Socket of motherboard '{}' is unknown; CPU and motherboard compatibility could not be verified.",
                    board.name
                ));
            }
        }
    }
}

fn check_memory(selection: &SelectionResult, outcome: &mut CompatibilityOutcome) {
    let Some((ram, board)) = pair(selection, Category::Ram, Category::Motherboard) else {
        return;
    };

    match (memory_generation(ram), board_memory_generation(board)) {
        (Some(ram_gen), Some(board_gen)) => {
            if ram_gen == board_gen {
                tracing::debug!("RAM and motherboard memory generation match: {}", ram_gen);
            } else {
                outcome.add_error(format!(
                    "RAM generation ({}) is not supported by the motherboard ({}); memory generations are not interchangeable.",
                    ram_gen, board_gen
                ));
            }
        }
        (ram_gen, board_gen) => {
            if ram_gen.is_none() {
                outcome.add_warning(format!(
                    "Memory generation of RAM '{}' is unknown; check whether it is DDR4 or DDR5.",
                    ram.name
                ));
            }
            if board_gen.is_none() {
                outcome.add_warning(format!(
                    "Supported memory generation of motherboard '{}' is unknown.",
                    board.name
                ));
            }
        }
    }
}

/// (CPU + GPU + baseline) with 20% headroom.
pub fn required_wattage(selection: &SelectionResult) -> i64 {
    let component_tdp: i64 = [Category::Cpu, Category::Gpu]
        .iter()
        .filter_map(|category| selection.get(category))
        .map(|part| tdp_watts(part).unwrap_or(PLACEHOLDER_TDP_WATTS))
        .sum();
    (component_tdp + BASELINE_SYSTEM_WATTS) * 12 / 10
}

fn check_power(selection: &SelectionResult, outcome: &mut CompatibilityOutcome) {
    let Some(psu) = selection.get(&Category::Psu) else {
        return;
    };
    let Some(wattage) = psu_wattage(psu) else {
        outcome.add_warning(format!(
            "Rated output of power supply '{}' is unknown; capacity could not be verified.",
            psu.name
        ));
        return;
    };

    let required = required_wattage(selection);
    if wattage < required {
        outcome.add_error(format!(
            "Power supply output ({}W) is insufficient; at least {}W is recommended.",
            wattage, required
        ));
    } else if wattage * 10 < required * 11 {
        outcome.add_warning(format!(
            "Power supply output ({}W) leaves little headroom over the recommended {}W.",
            wattage, required
        ));
    }
}

fn check_form_factor(selection: &SelectionResult, outcome: &mut CompatibilityOutcome) {
    let Some((case, board)) = pair(selection, Category::Case, Category::Motherboard) else {
        return;
    };

    let board_descriptor = form_factor_descriptor(board);
    let case_descriptor = form_factor_descriptor(case);
    let board_class = board_descriptor.as_deref().and_then(BoardClass::classify);
    let case_tags = case_descriptor.as_deref().and_then(CaseTags::classify);

    match (board_class, case_tags) {
        (Some(board_class), Some(case_tags)) => {
            if board_class.fits(case_tags) {
                tracing::debug!(
                    "Case fits motherboard: board={:?}, case={:?}",
                    board_descriptor,
                    case_descriptor
                );
            } else {
                outcome.add_error(format!(
                    "Motherboard ({}) may not fit in the case ({}); check the case size.",
                    board_descriptor.unwrap_or_default().trim(),
                    case_descriptor.unwrap_or_default().trim()
                ));
            }
        }
        (board_class, case_tags) => {
            if board_class.is_none() {
                outcome.add_warning(format!(
                    "Form factor of motherboard '{}' is unknown; case fit could not be verified.",
                    board.name
                ));
            }
            if case_tags.is_none() {
                outcome.add_warning(format!(
                    "Form factor of case '{}' is unknown; motherboard fit could not be verified.",
                    case.name
                ));
            }
        }
    }
}
