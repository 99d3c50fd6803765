use std::time::Duration;

/// Number of blocks the reorg walker retreats by on each backward step.
pub const DEFAULT_REORG_STEP_BLOCKS: u64 = 10;

/// Bootstrap gate: poll interval and attempt budget (~30s total at the defaults).
pub const DEFAULT_BOOTSTRAP_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_BOOTSTRAP_POLL_ATTEMPTS: u32 = 300;

/// Immutable configuration for an inbox reader instance.
///
/// Mirrors the behavior described for `delay_blocks` / `check_delay` / `hard_reorg` /
/// `min_blocks_to_read`; `reorg_step_blocks` and the bootstrap polling knobs are exposed
/// for tests and tuning but default to the values the reader is specified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Number of most-recent parent-chain blocks to ignore, reducing reorg exposure.
    pub delay_blocks: u64,
    /// Maximum time to wait between inbox checks when no new blocks arrive.
    pub check_delay: Duration,
    /// If true, truncate the tracker down to the parent chain's view when the tracker's
    /// tip is ahead of it. If false, only overwrite on a direct accumulator mismatch.
    pub hard_reorg: bool,
    /// Minimum new parent-chain block advance required before reading, to batch work
    /// when caught up. Must be >= 1.
    pub min_blocks_to_read: u64,
    /// Number of blocks the reorg walker retreats by on each backward step.
    pub reorg_step_blocks: u64,
    /// Bootstrap gate poll interval.
    pub bootstrap_poll_interval: Duration,
    /// Bootstrap gate poll attempt budget.
    pub bootstrap_poll_attempts: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delay_blocks: 0,
            check_delay: Duration::from_secs(60),
            hard_reorg: false,
            min_blocks_to_read: 1,
            reorg_step_blocks: DEFAULT_REORG_STEP_BLOCKS,
            bootstrap_poll_interval: DEFAULT_BOOTSTRAP_POLL_INTERVAL,
            bootstrap_poll_attempts: DEFAULT_BOOTSTRAP_POLL_ATTEMPTS,
        }
    }
}

impl ReaderConfig {
    /// Configuration tuned for tests: no delay window, a short `check_delay` so pacing
    /// tests don't sit on the full production timer, and a fast bootstrap poll.
    pub fn for_test() -> Self {
        Self {
            delay_blocks: 0,
            check_delay: Duration::from_millis(10),
            hard_reorg: false,
            min_blocks_to_read: 1,
            reorg_step_blocks: DEFAULT_REORG_STEP_BLOCKS,
            bootstrap_poll_interval: Duration::from_millis(1),
            bootstrap_poll_attempts: DEFAULT_BOOTSTRAP_POLL_ATTEMPTS,
        }
    }
}
