use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Work,
    Break,
    LongBreak,
}

impl PhaseKind {
    pub fn label(&self) -> &'static str {
        match self {
            PhaseKind::Work => "Work",
            PhaseKind::Break => "Break",
            PhaseKind::LongBreak => "Long Break",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub kind: PhaseKind,
    /// 1-based cycle index. The long break carries the cycle count.
    pub cycle: u32,
    pub duration_secs: u64,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}

/// Durations and cycle count for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlan {
    pub work_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
    pub cycles: u32,
    /// Replaces the duration of the first work phase only.
    #[serde(default)]
    pub resume_override_secs: Option<u64>,
}

impl SessionPlan {
    /// Build a plan from minute values.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn from_minutes(work: u64, short_break: u64, long_break: u64, cycles: u32) -> Self {
        Self {
            work_secs: work.saturating_mul(60),
            short_break_secs: short_break.saturating_mul(60),
            long_break_secs: long_break.saturating_mul(60),
            cycles,
            resume_override_secs: None,
        }
    }

    pub fn with_resume_secs(mut self, secs: Option<u64>) -> Self {
        self.resume_override_secs = secs;
        self
    }

    pub fn with_resume_minutes(self, minutes: Option<u64>) -> Self {
        self.with_resume_secs(minutes.map(|m| m.saturating_mul(60)))
    }

    /// Work duration for the given 1-based cycle.
    pub fn work_secs_for(&self, cycle: u32) -> u64 {
        match self.resume_override_secs {
            Some(secs) if cycle == 1 => secs,
            _ => self.work_secs,
        }
    }

    /// Every phase in order: `cycles` x (Work, Break), then one LongBreak.
    pub fn phases(&self) -> Vec<Phase> {
        let mut phases = Vec::with_capacity(self.cycles as usize * 2 + 1);
        for cycle in 1..=self.cycles {
            phases.push(Phase {
                kind: PhaseKind::Work,
                cycle,
                duration_secs: self.work_secs_for(cycle),
            });
            phases.push(Phase {
                kind: PhaseKind::Break,
                cycle,
                duration_secs: self.short_break_secs,
            });
        }
        phases.push(Phase {
            kind: PhaseKind::LongBreak,
            cycle: self.cycles,
            duration_secs: self.long_break_secs,
        });
        phases
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.phases().iter().map(|p| p.duration_secs).sum()
    }
}

impl Default for SessionPlan {
    fn default() -> Self {
        Self::from_minutes(25, 5, 15, 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_has_nine_phases() {
        let plan = SessionPlan::default();
        let phases = plan.phases();
        assert_eq!(phases.len(), 9);
        assert_eq!(phases[0].kind, PhaseKind::Work);
        assert_eq!(phases[1].kind, PhaseKind::Break);
        assert_eq!(phases[8].kind, PhaseKind::LongBreak);
    }

    #[test]
    fn total_duration() {
        let plan = SessionPlan::default();
        assert_eq!(plan.total_duration_secs(), (4 * (25 + 5) + 15) * 60);
    }

    #[test]
    fn resume_override_only_touches_first_work_phase() {
        let plan = SessionPlan {
            work_secs: 1500,
            short_break_secs: 300,
            long_break_secs: 900,
            cycles: 2,
            resume_override_secs: Some(300),
        };
        let work: Vec<u64> = plan
            .phases()
            .iter()
            .filter(|p| p.kind == PhaseKind::Work)
            .map(|p| p.duration_secs)
            .collect();
        assert_eq!(work, vec![300, 1500]);
        assert_eq!(plan.work_secs_for(1), 300);
        assert_eq!(plan.work_secs_for(2), 1500);
    }

    #[test]
    fn resume_minutes_convert_to_seconds() {
        let plan = SessionPlan::from_minutes(25, 5, 15, 1).with_resume_minutes(Some(5));
        assert_eq!(plan.resume_override_secs, Some(300));
    }

    #[test]
    fn zero_cycles_runs_only_the_long_break() {
        let plan = SessionPlan::from_minutes(25, 5, 15, 0);
        let phases = plan.phases();
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].kind, PhaseKind::LongBreak);
    }

    #[test]
    fn labels() {
        assert_eq!(PhaseKind::Work.label(), "Work");
        assert_eq!(PhaseKind::Break.label(), "Break");
        assert_eq!(PhaseKind::LongBreak.label(), "Long Break");
    }
}
