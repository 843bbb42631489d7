use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, StrumDisplay)]
#[strum(serialize_all = "kebab-case")]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    /// Structural nodes exist but balloons may not be placed or animated.
    Disabled,
    Enabled,
}

/// `Uninitialized -> Disabled -> Enabled`, with `Enabled -> Disabled` as the only way back.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state != LifecycleState::Uninitialized
    }

    pub fn is_enabled(&self) -> bool {
        self.state == LifecycleState::Enabled
    }

    /// Returns `false` if already initialized.
    pub fn initialize(&mut self) -> bool {
        if self.is_initialized() {
            return false;
        }
        self.state = LifecycleState::Disabled;
        true
    }

    /// Returns `false` when not initialized yet or already enabled.
    pub fn enable(&mut self) -> bool {
        if self.state != LifecycleState::Disabled {
            return false;
        }
        self.state = LifecycleState::Enabled;
        true
    }

    pub fn disable(&mut self) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.state = LifecycleState::Disabled;
        true
    }
}
