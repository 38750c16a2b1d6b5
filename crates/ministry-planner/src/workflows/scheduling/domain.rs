use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a person on the roster.
    PersonId
);
string_id!(
    /// Identifier of a part type template.
    RoleTypeId
);
string_id!(WeeklyPartId);
string_id!(WeekPlanId);
string_id!(ProgramId);
string_id!(AssignmentId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

/// Which sexes may occupy the slots of a part type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SexRule {
    MaleOnly,
    Open,
}

impl SexRule {
    pub const fn admits(self, sex: Sex) -> bool {
        match self {
            SexRule::MaleOnly => matches!(sex, Sex::Male),
            SexRule::Open => true,
        }
    }
}

/// Roster entry. Maintained outside the engine, which only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub given_name: String,
    pub family_name: String,
    pub sex: Sex,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub can_assist: bool,
}

fn default_true() -> bool {
    true
}

impl Person {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}

/// Template for a recurring programme part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleType {
    pub id: RoleTypeId,
    pub code: String,
    pub label: String,
    pub slot_count: u8,
    pub sex_rule: SexRule,
    /// Structural parts (songs, prayers) never receive assignments.
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub display_order: u32,
}

/// One occurrence of a part type inside a week plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPart {
    pub id: WeeklyPartId,
    pub role_type: RoleType,
    pub sort_order: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekPlanStatus {
    Active,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekPlan {
    pub id: WeekPlanId,
    /// Always a Monday.
    pub week_start: NaiveDate,
    pub program_id: ProgramId,
    pub status: WeekPlanStatus,
    pub parts: Vec<WeeklyPart>,
}

impl WeekPlan {
    pub fn summary(&self) -> WeekPlanSummary {
        WeekPlanSummary {
            id: self.id.clone(),
            week_start: self.week_start,
            program_id: self.program_id.clone(),
            status: self.status,
        }
    }

    pub fn part(&self, id: &WeeklyPartId) -> Option<&WeeklyPart> {
        self.parts.iter().find(|part| &part.id == id)
    }

    /// Parts ordered by their position within the week, ties broken by the part type's display order.
    pub fn ordered_parts(&self) -> Vec<&WeeklyPart> {
        let mut parts: Vec<&WeeklyPart> = self.parts.iter().collect();
        parts.sort_by_key(|part| (part.sort_order, part.role_type.display_order));
        parts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekPlanSummary {
    pub id: WeekPlanId,
    pub week_start: NaiveDate,
    pub program_id: ProgramId,
    pub status: WeekPlanStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub weekly_part_id: WeeklyPartId,
    pub person_id: PersonId,
    pub slot: u8,
}

/// Assignment joined with the roster entry it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentWithPerson {
    pub assignment: Assignment,
    pub person: Person,
}

/// Past assignment as seen by the recency ranker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub person_id: PersonId,
    pub role_type_id: RoleTypeId,
    pub slot: u8,
    pub week_start: NaiveDate,
}

/// Slot 1 leads the part; every other slot assists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotRole {
    Lead,
    Assist,
}

impl SlotRole {
    pub const fn of(slot: u8) -> Self {
        if slot == 1 {
            SlotRole::Lead
        } else {
            SlotRole::Assist
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            SlotRole::Lead => "lead",
            SlotRole::Assist => "assist",
        }
    }

    /// Whether a past assignment in `slot` counts towards this role's history.
    pub const fn counts(self, slot: u8) -> bool {
        match self {
            SlotRole::Lead => slot == 1,
            SlotRole::Assist => true,
        }
    }
}

/// A future week in which a person already holds a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekCommitment {
    pub week_start: NaiveDate,
    pub part_label: String,
    pub slot: u8,
}

/// Whole number of weeks between two dates, rounded down.
pub fn weeks_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days().div_euclid(7)
}
