use serde::{Deserialize, Serialize};

use super::domain::SlotRole;

const DEFAULT_LEAD_WEIGHT: i32 = 2;
const DEFAULT_ASSIST_WEIGHT: i32 = 1;
const DEFAULT_LEAD_COOLDOWN_WEEKS: i32 = 4;
const DEFAULT_ASSIST_COOLDOWN_WEEKS: i32 = 2;

/// Persisted assignment tuning.
///
/// `strict_cooldown` and the two weights are carried as configuration only; no ranking
/// or validation formula reads them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentSettings {
    pub strict_cooldown: bool,
    pub lead_weight: i32,
    pub assist_weight: i32,
    pub lead_cooldown_weeks: i32,
    pub assist_cooldown_weeks: i32,
}

impl Default for AssignmentSettings {
    fn default() -> Self {
        Self {
            strict_cooldown: false,
            lead_weight: DEFAULT_LEAD_WEIGHT,
            assist_weight: DEFAULT_ASSIST_WEIGHT,
            lead_cooldown_weeks: DEFAULT_LEAD_COOLDOWN_WEEKS,
            assist_cooldown_weeks: DEFAULT_ASSIST_COOLDOWN_WEEKS,
        }
    }
}

impl AssignmentSettings {
    /// Clamp weights to at least 1 and cooldowns to at least 0.
    pub fn normalized(self) -> Self {
        Self {
            strict_cooldown: self.strict_cooldown,
            lead_weight: self.lead_weight.max(1),
            assist_weight: self.assist_weight.max(1),
            lead_cooldown_weeks: self.lead_cooldown_weeks.max(0),
            assist_cooldown_weeks: self.assist_cooldown_weeks.max(0),
        }
    }

    pub fn cooldown_for(&self, role: SlotRole) -> i64 {
        let weeks = match role {
            SlotRole::Lead => self.lead_cooldown_weeks,
            SlotRole::Assist => self.assist_cooldown_weeks,
        };
        i64::from(weeks.max(0))
    }
}
