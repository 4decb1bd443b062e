use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_BREAKFAST_TIME: &str = "8:30";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown value '{0}'")]
pub struct UnknownValue(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
}

impl Meal {
    pub const ALL: [Meal; 3] = [Meal::Breakfast, Meal::Lunch, Meal::Dinner];

    pub fn as_str(self) -> &'static str {
        match self {
            Meal::Breakfast => "breakfast",
            Meal::Lunch => "lunch",
            Meal::Dinner => "dinner",
        }
    }

    /// Advances `current` one step around this meal's cycle.
    ///
    /// Breakfast loops yes -> no -> maybe; the other meals also pass through
    /// `late` before returning to yes.
    pub fn next(self, current: MealStatus) -> MealStatus {
        use MealStatus::{Late, Maybe, No, Yes};
        match (self, current) {
            (Meal::Breakfast, Yes) => No,
            (Meal::Breakfast, No) => Maybe,
            (Meal::Breakfast, Maybe | Late) => Yes,
            (Meal::Lunch | Meal::Dinner, Yes) => No,
            (Meal::Lunch | Meal::Dinner, No) => Maybe,
            (Meal::Lunch | Meal::Dinner, Maybe) => Late,
            (Meal::Lunch | Meal::Dinner, Late) => Yes,
        }
    }

    pub fn allows(self, status: MealStatus) -> bool {
        !(self == Meal::Breakfast && status == MealStatus::Late)
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Meal {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "breakfast" => Ok(Meal::Breakfast),
            "lunch" => Ok(Meal::Lunch),
            "dinner" => Ok(Meal::Dinner),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealStatus {
    Yes,
    No,
    Maybe,
    Late,
}

impl MealStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MealStatus::Yes => "yes",
            MealStatus::No => "no",
            MealStatus::Maybe => "maybe",
            MealStatus::Late => "late",
        }
    }
}

impl fmt::Display for MealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealStatus {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "yes" => Ok(MealStatus::Yes),
            "no" => Ok(MealStatus::No),
            "maybe" => Ok(MealStatus::Maybe),
            "late" => Ok(MealStatus::Late),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

/// One stored day. `breakfast_time` travels as an empty string when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub breakfast: MealStatus,
    pub lunch: MealStatus,
    pub dinner: MealStatus,
    #[serde(default, with = "empty_as_none")]
    pub breakfast_time: Option<String>,
}

impl DayRecord {
    pub fn defaulted(date: NaiveDate) -> Self {
        Self {
            date,
            breakfast: MealStatus::Yes,
            lunch: MealStatus::No,
            dinner: MealStatus::Yes,
            breakfast_time: None,
        }
    }

    pub fn status(&self, meal: Meal) -> MealStatus {
        match meal {
            Meal::Breakfast => self.breakfast,
            Meal::Lunch => self.lunch,
            Meal::Dinner => self.dinner,
        }
    }

    /// Sets one meal. Moving breakfast off `yes` drops its time.
    pub fn set_status(&mut self, meal: Meal, status: MealStatus) {
        match meal {
            Meal::Breakfast => {
                self.breakfast = status;
                if status != MealStatus::Yes {
                    self.breakfast_time = None;
                }
            }
            Meal::Lunch => self.lunch = status,
            Meal::Dinner => self.dinner = status,
        }
    }

    /// The record as surfaced to clients: breakfast time filled with the
    /// default when breakfast is on, empty otherwise.
    pub fn for_display(mut self) -> Self {
        self.breakfast_time = match self.breakfast {
            MealStatus::Yes => Some(
                self.breakfast_time
                    .unwrap_or_else(|| DEFAULT_BREAKFAST_TIME.to_string()),
            ),
            _ => None,
        };
        self
    }
}

mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|time| !time.trim().is_empty()))
    }
}

/// Parses `H:MM` or `HH:MM` and renders it back without hour padding.
pub fn normalize_time(value: &str) -> Option<String> {
    let time = NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()?;
    Some(format!("{}:{:02}", time.hour(), time.minute()))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("Missing required fields")]
    Missing,
    #[error("Invalid meal or value")]
    InvalidValue,
    #[error("Invalid date")]
    InvalidDate,
    #[error("Invalid breakfast time")]
    InvalidTime,
}

/// Body of `POST /api/meals` as it arrives on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct MealWriteRequest {
    pub date: Option<String>,
    pub meal: Option<String>,
    pub value: Option<String>,
    pub breakfast_time: Option<String>,
}

impl MealWriteRequest {
    pub fn validate(self) -> Result<FieldPatch, PatchError> {
        let (Some(date), Some(meal), Some(value)) = (
            present(self.date),
            present(self.meal),
            present(self.value),
        ) else {
            return Err(PatchError::Missing);
        };

        let meal: Meal = meal.parse().map_err(|_| PatchError::InvalidValue)?;
        let status: MealStatus = value.parse().map_err(|_| PatchError::InvalidValue)?;
        if !meal.allows(status) {
            return Err(PatchError::InvalidValue);
        }
        let date =
            NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| PatchError::InvalidDate)?;

        let breakfast_time = match present(self.breakfast_time) {
            Some(time) if meal == Meal::Breakfast && status == MealStatus::Yes => {
                Some(normalize_time(&time).ok_or(PatchError::InvalidTime)?)
            }
            _ => None,
        };

        Ok(FieldPatch {
            date,
            meal,
            status,
            breakfast_time,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// A validated single-field update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldPatch {
    pub date: NaiveDate,
    pub meal: Meal,
    #[serde(rename = "value")]
    pub status: MealStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakfast_time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WriteResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
