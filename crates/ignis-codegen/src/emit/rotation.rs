//! Register-rotation state threaded through kernel expansion.

/// Outcome of one L1 pointer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum L1Step {
    /// Advance the pointer by one cache line.
    Advance,
    /// Coverage threshold reached: rewind to the region base.
    Rewind,
}

/// Rotation indices and the L1 scan offset carried across bundles.
///
/// The state is passed and returned by value so expansion stays a pure
/// function of its inputs. The accumulator destination starts one register
/// past the pool base, so each add consumes a value written a full pool
/// rotation earlier — the dependency chain that hides instruction latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationState {
    /// Accumulator-destination index within the accumulator pool.
    pub acc_dest: usize,
    /// Transfer-destination index within the transfer pool.
    pub trans_dest: usize,
    /// Transfer-source index within the transfer pool.
    pub trans_src: usize,
    /// Cumulative L1 scan offset in bytes.
    pub l1_offset: u64,
}

impl RotationState {
    /// Initial state at the top of the work loop.
    pub fn new() -> Self {
        Self {
            acc_dest: 1,
            trans_dest: 0,
            trans_src: 1,
            l1_offset: 0,
        }
    }

    /// Accumulator read one slot ahead of the destination: the register
    /// written `acc_pool - 1` bundles ago.
    pub fn acc_src_ahead(&self, acc_pool: usize) -> usize {
        (self.acc_dest + 1) % acc_pool
    }

    /// Accumulator read one slot behind the destination: the register
    /// written by the previous bundle.
    pub fn acc_src_behind(&self, acc_pool: usize) -> usize {
        (self.acc_dest + acc_pool - 1) % acc_pool
    }

    /// Advance every rotation index after one bundle.
    #[must_use]
    pub fn rotated(mut self, acc_pool: usize, trans_pool: usize) -> Self {
        self.acc_dest = (self.acc_dest + 1) % acc_pool;
        self.trans_dest = (self.trans_dest + 1) % trans_pool;
        self.trans_src = (self.trans_src + 1) % trans_pool;
        self
    }

    /// Account one L1 access against the coverage threshold.
    ///
    /// Below the threshold the pointer advances by one cache line; at the
    /// threshold the offset resets and the pointer rewinds to the region
    /// base.
    #[must_use]
    pub fn l1_stepped(mut self, cl_size: u64, threshold: u64) -> (Self, L1Step) {
        self.l1_offset += cl_size;
        if self.l1_offset < threshold {
            (self, L1Step::Advance)
        } else {
            self.l1_offset = 0;
            (self, L1Step::Rewind)
        }
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_cycles_with_pool_period() {
        let mut state = RotationState::new();
        let first = state.acc_dest;
        for _ in 0..14 {
            state = state.rotated(14, 2);
        }
        assert_eq!(state.acc_dest, first);
    }

    #[test]
    fn sources_bracket_destination() {
        let state = RotationState::new();
        assert_eq!(state.acc_dest, 1);
        assert_eq!(state.acc_src_ahead(14), 2);
        assert_eq!(state.acc_src_behind(14), 0);

        let wrapped = RotationState {
            acc_dest: 13,
            ..RotationState::new()
        };
        assert_eq!(wrapped.acc_src_ahead(14), 0);
        assert_eq!(wrapped.acc_src_behind(14), 12);
    }

    #[test]
    fn transfer_indices_alternate() {
        let mut state = RotationState::new();
        assert_eq!((state.trans_dest, state.trans_src), (0, 1));
        state = state.rotated(14, 2);
        assert_eq!((state.trans_dest, state.trans_src), (1, 0));
        state = state.rotated(14, 2);
        assert_eq!((state.trans_dest, state.trans_src), (0, 1));
    }

    #[test]
    fn l1_scan_rewinds_at_threshold() {
        let mut state = RotationState::new();
        let threshold = 256;
        let mut steps = Vec::new();
        for _ in 0..8 {
            let (next, step) = state.l1_stepped(64, threshold);
            state = next;
            steps.push(step);
        }
        assert_eq!(
            steps,
            vec![
                L1Step::Advance,
                L1Step::Advance,
                L1Step::Advance,
                L1Step::Rewind,
                L1Step::Advance,
                L1Step::Advance,
                L1Step::Advance,
                L1Step::Rewind,
            ]
        );
        assert_eq!(state.l1_offset, 0);
    }
}
