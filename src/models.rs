use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Inclusive gram band a day must land in to count as "in target".
pub const TARGET_BAND: RangeInclusive<u32> = 125..=250;

/// One logged day. The dataset holds at most one entry per date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroEntry {
    pub date: NaiveDate,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

impl MacroEntry {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            protein: 0,
            carbs: 0,
            fat: 0,
        }
    }

    pub fn value(&self, kind: Macro) -> u32 {
        match kind {
            Macro::Protein => self.protein,
            Macro::Carbs => self.carbs,
            Macro::Fat => self.fat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Macro {
    Protein,
    Carbs,
    Fat,
}

impl Macro {
    pub const ALL: [Macro; 3] = [Macro::Protein, Macro::Carbs, Macro::Fat];

    pub fn label(self) -> &'static str {
        match self {
            Macro::Protein => "Protein",
            Macro::Carbs => "Carbs",
            Macro::Fat => "Fat",
        }
    }

    /// Upper bound of the entry form input, in grams.
    pub fn max_grams(self) -> u32 {
        match self {
            Macro::Protein => 300,
            Macro::Carbs => 400,
            Macro::Fat => 200,
        }
    }
}

/// Values submitted by the entry form. Always carries the full triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroInput {
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

impl MacroInput {
    /// Pins every field into the range the form widgets allow.
    pub fn clamped(self) -> Self {
        Self {
            protein: self.protein.min(Macro::Protein.max_grams()),
            carbs: self.carbs.min(Macro::Carbs.max_grams()),
            fat: self.fat.min(Macro::Fat.max_grams()),
        }
    }
}

impl From<&MacroEntry> for MacroInput {
    fn from(entry: &MacroEntry) -> Self {
        Self {
            protein: entry.protein,
            carbs: entry.carbs,
            fat: entry.fat,
        }
    }
}

/// Per-macro statistics for one week. `None` means the week had no rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    #[serde(rename = "Macro")]
    pub name: Macro,
    #[serde(rename = "Average")]
    pub average: Option<f64>,
    #[serde(rename = "Min")]
    pub min: Option<f64>,
    #[serde(rename = "Max")]
    pub max: Option<f64>,
    #[serde(rename = "DaysInTarget")]
    pub days_in_target: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub days_logged: usize,
    pub rows: Vec<SummaryRow>,
}

impl WeeklySummary {
    pub fn has_data(&self) -> bool {
        self.days_logged > 0
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

impl From<MacroEntry> for TodayResponse {
    fn from(entry: MacroEntry) -> Self {
        Self {
            date: entry.date,
            protein: entry.protein,
            carbs: entry.carbs,
            fat: entry.fat,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekOption {
    pub week_start: NaiveDate,
    pub label: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct WeekQuery {
    pub week: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_pins_values_to_form_bounds() {
        let input = MacroInput {
            protein: 999,
            carbs: 401,
            fat: 12,
        };
        assert_eq!(
            input.clamped(),
            MacroInput {
                protein: 300,
                carbs: 400,
                fat: 12,
            }
        );
    }
}
