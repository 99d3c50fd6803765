//! Per-pass divergence state: two parallel stream states (delayed, sequencer) each in one
//! of `{Clean, Missing, Reorging}`, plus the coupling edge between them (applying a
//! sequencer batch can demand delayed messages the tracker doesn't have yet).

/// Divergence state of a single stream (delayed messages or sequencer batches) as of the
/// most recent probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum StreamState {
    /// Tracker agrees with the parent-chain view as of the last probe.
    #[default]
    Clean,
    /// The parent-chain view has more entries than the tracker; nothing inconsistent, just
    /// behind.
    Missing,
    /// The tracker's last common entry disagrees with the parent-chain view at the same
    /// index; a reorg must be walked back.
    Reorging,
}

impl StreamState {
    pub(crate) fn is_dirty(self) -> bool {
        !matches!(self, StreamState::Clean)
    }

    pub(crate) fn promote_missing_to_reorging(self) -> StreamState {
        match self {
            StreamState::Missing => StreamState::Reorging,
            other => other,
        }
    }
}

/// Combined divergence state for both streams during a pass's range-scan phase.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PassState {
    pub delayed: StreamState,
    pub sequencer: StreamState,
}

impl PassState {
    pub(crate) fn any_dirty(self) -> bool {
        self.delayed.is_dirty() || self.sequencer.is_dirty()
    }

    pub(crate) fn promote_missing_to_reorging(self) -> PassState {
        PassState {
            delayed: self.delayed.promote_missing_to_reorging(),
            sequencer: self.sequencer.promote_missing_to_reorging(),
        }
    }
}
