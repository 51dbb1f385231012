//! Global particle cap shared by all particle kinds of one celebration.

/// Hard ceiling on particles emitted by a single trigger.
pub const MAX_PARTICLES: u32 = 1000;

/// Splits a fixed particle allowance across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleBudget {
    pub cap: u32,
}

impl Default for ParticleBudget {
    fn default() -> Self {
        Self { cap: MAX_PARTICLES }
    }
}

impl ParticleBudget {
    pub fn new(cap: u32) -> Self {
        Self { cap }
    }

    /// Per-kind counts after applying the cap.
    ///
    /// Under the cap the nominal counts pass through. Over it, each count is
    /// scaled by `cap / sum` and rounded with the largest-remainder rule, so
    /// the result sums to exactly `cap` and no count is off by more than one
    /// from its exact proportional share.
    pub fn allocate(&self, nominal: &[u32]) -> Vec<u32> {
        let total: u64 = nominal.iter().map(|&n| n as u64).sum();
        if total <= self.cap as u64 {
            return nominal.to_vec();
        }

        let cap = self.cap as u64;
        let mut counts = Vec::with_capacity(nominal.len());
        let mut remainders = Vec::with_capacity(nominal.len());
        for (i, &n) in nominal.iter().enumerate() {
            let scaled = n as u64 * cap;
            counts.push((scaled / total) as u32);
            remainders.push((scaled % total, i));
        }

        let assigned: u64 = counts.iter().map(|&c| c as u64).sum();
        let mut leftover = cap - assigned;
        // Largest remainder first; ties go to the earlier kind.
        remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        for &(_, i) in &remainders {
            if leftover == 0 {
                break;
            }
            counts[i] += 1;
            leftover -= 1;
        }

        log::debug!("particle budget: nominal {} scaled to {}", total, self.cap);
        counts
    }
}
