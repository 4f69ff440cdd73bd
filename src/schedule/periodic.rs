/// Counter driving questionnaire placement.
///
/// Uses a running counter instead of date arithmetic so the cadence does not
/// depend on which weekday or offset a range starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicState {
    counter: u32,
    frequency_days: u32,
}

impl PeriodicState {
    /// State for the start of a generate or extend call.
    ///
    /// The counter begins saturated, so the first processed day triggers.
    pub fn fresh(frequency_days: u32) -> Self {
        Self {
            counter: frequency_days,
            frequency_days,
        }
    }

    pub fn with_counter(counter: u32, frequency_days: u32) -> Self {
        Self {
            counter,
            frequency_days,
        }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn frequency_days(&self) -> u32 {
        self.frequency_days
    }
}

/// Decides whether the periodic task is due today and advances the counter.
///
/// A triggering day counts as day 1 of the next interval.
pub fn should_trigger(state: PeriodicState) -> (bool, PeriodicState) {
    if state.counter >= state.frequency_days {
        (true, PeriodicState { counter: 1, ..state })
    } else {
        (
            false,
            PeriodicState {
                counter: state.counter.saturating_add(1),
                ..state
            },
        )
    }
}
