/// Resource limits and strategy switches for [`LogicEngine`](crate::LogicEngine)
///
/// Every buffer is bounded: a step that would hold more entries than its
/// capacity fails with [`Error::CapacityExceeded`](crate::Error::CapacityExceeded)
/// instead of truncating, so answers are either complete or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Facts a single fact scan may select
    pub max_matching_facts: usize,
    /// Rules a single rule scan may select
    pub max_matching_rules: usize,
    /// Bindings a single `solve` step may accumulate
    pub max_results: usize,
    /// Solve the more constrained subgoal of an AND body first
    pub reorder_conjunctions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_matching_facts: 1024,
            max_matching_rules: 256,
            max_results: 4096,
            reorder_conjunctions: true,
        }
    }
}

impl EngineConfig {
    /// Same capacity for every buffer, for memory-constrained targets
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        Self {
            max_matching_facts: capacity,
            max_matching_rules: capacity,
            max_results: capacity,
            ..Self::default()
        }
    }

    /// Sets the fact scan capacity
    #[must_use]
    pub fn with_max_matching_facts(mut self, capacity: usize) -> Self {
        self.max_matching_facts = capacity;
        self
    }

    /// Sets the rule scan capacity
    #[must_use]
    pub fn with_max_matching_rules(mut self, capacity: usize) -> Self {
        self.max_matching_rules = capacity;
        self
    }

    /// Sets the per-step result capacity
    #[must_use]
    pub fn with_max_results(mut self, capacity: usize) -> Self {
        self.max_results = capacity;
        self
    }

    /// Enables or disables the AND subgoal reordering heuristic
    #[must_use]
    pub fn with_reorder_conjunctions(mut self, enabled: bool) -> Self {
        self.reorder_conjunctions = enabled;
        self
    }
}
