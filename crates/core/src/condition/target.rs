/// Whether a target is a fixed value or an offset from the starting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetKind {
    Absolute,
    Relative,
}

/// The value a condition's scalar is compared against.
///
/// A relative target is measured from the value of the scalar at the start
/// of propagation. That starting value is captured by
/// [`EventCondition::update_target`](super::EventCondition::update_target);
/// until then the target is unresolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    value: f64,
    kind: TargetKind,
    offset: Option<f64>,
}

impl Target {
    #[must_use]
    pub fn absolute(value: f64) -> Self {
        Self {
            value,
            kind: TargetKind::Absolute,
            offset: None,
        }
    }

    #[must_use]
    pub fn relative(value: f64) -> Self {
        Self {
            value,
            kind: TargetKind::Relative,
            offset: None,
        }
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// The captured starting value of a relative target.
    #[must_use]
    pub fn offset(&self) -> Option<f64> {
        self.offset
    }

    /// The value to compare against, if it is known.
    #[must_use]
    pub fn resolved(&self) -> Option<f64> {
        match self.kind {
            TargetKind::Absolute => Some(self.value),
            TargetKind::Relative => self.offset.map(|offset| self.value + offset),
        }
    }

    /// Captures the starting value of a relative target, replacing any
    /// earlier capture. Absolute targets are unaffected.
    pub(super) fn capture(&mut self, offset: f64) {
        if self.kind == TargetKind::Relative {
            self.offset = Some(offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_targets_resolve_immediately() {
        let mut target = Target::absolute(3.0);
        assert_eq!(target.resolved(), Some(3.0));

        target.capture(10.0);
        assert_eq!(target.resolved(), Some(3.0));
        assert_eq!(target.offset(), None);
    }

    #[test]
    fn relative_targets_wait_for_a_capture() {
        let mut target = Target::relative(60.0);
        assert_eq!(target.resolved(), None);

        target.capture(100.0);
        assert_eq!(target.resolved(), Some(160.0));

        target.capture(200.0);
        assert_eq!(target.resolved(), Some(260.0));
    }
}
