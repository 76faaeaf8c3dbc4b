//! One row of the loot log and its line encoding.
//!
//! Columns: Record #, League, Logged-By, Blueprint-Type, Area-Level, the
//! eight category columns, Stack-Size, Variant, Flag, Time.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::dictionary::Category;
use crate::text::{escape_field, split_fields};

/// Timestamp format of the `Time` column.
pub const TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Header row of the loot log.
pub const LOG_HEADER: &str = "Record #,League,Logged-By,Blueprint-Type,Area-Level,Trinket,Replacement,Replica,Experimental,Weapon-Enchant,Armor-Enchant,Scarab,Currency,Stack-Size,Variant,Flag,Time";

/// Number of columns per row.
pub const COLUMN_COUNT: usize = 17;

/// `Flag` value for rows recorded despite being a recent duplicate.
pub const DUPLICATE_FLAG: &str = "Duplicate";

/// Parses a `Time` column value.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIME_FORMAT).ok()
}

/// Formats a timestamp for the `Time` column.
pub fn format_timestamp(time: &NaiveDateTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// One persisted loot log row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogEntry {
    /// Strictly increasing row number, assigned on append
    pub record: u64,
    pub league: String,
    pub logged_by: String,
    pub blueprint_type: String,
    pub area_level: String,
    pub trinket: String,
    pub replacement: String,
    pub replica: String,
    pub experimental: String,
    pub weapon_enchant: String,
    pub armor_enchant: String,
    pub scarab: String,
    pub currency: String,
    pub stack_size: String,
    pub variant: String,
    pub flag: String,
    /// Capture time in `TIME_FORMAT`
    pub time: String,
}

impl LogEntry {
    /// The category column's value.
    pub fn category_value(&self, category: Category) -> &str {
        match category {
            Category::Trinket => &self.trinket,
            Category::Replacement => &self.replacement,
            Category::Replica => &self.replica,
            Category::Experimental => &self.experimental,
            Category::WeaponEnchant => &self.weapon_enchant,
            Category::ArmorEnchant => &self.armor_enchant,
            Category::Scarab => &self.scarab,
            Category::Currency => &self.currency,
        }
    }

    fn category_value_mut(&mut self, category: Category) -> &mut String {
        match category {
            Category::Trinket => &mut self.trinket,
            Category::Replacement => &mut self.replacement,
            Category::Replica => &mut self.replica,
            Category::Experimental => &mut self.experimental,
            Category::WeaponEnchant => &mut self.weapon_enchant,
            Category::ArmorEnchant => &mut self.armor_enchant,
            Category::Scarab => &mut self.scarab,
            Category::Currency => &mut self.currency,
        }
    }

    /// Writes `value` into `category`'s column and clears the other seven.
    pub fn set_category(&mut self, category: Category, value: &str) {
        for other in Category::ALL {
            self.category_value_mut(other).clear();
        }
        *self.category_value_mut(category) = value.to_string();
    }

    /// The first populated category column, if any.
    pub fn populated_category(&self) -> Option<(Category, &str)> {
        Category::ALL
            .into_iter()
            .map(|c| (c, self.category_value(c)))
            .find(|(_, value)| !value.is_empty())
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.time)
    }

    pub fn is_flagged_duplicate(&self) -> bool {
        self.flag == DUPLICATE_FLAG
    }

    /// Every column except `Record #`, in header order.
    pub fn values(&self) -> [&str; COLUMN_COUNT - 1] {
        [
            &self.league,
            &self.logged_by,
            &self.blueprint_type,
            &self.area_level,
            &self.trinket,
            &self.replacement,
            &self.replica,
            &self.experimental,
            &self.weapon_enchant,
            &self.armor_enchant,
            &self.scarab,
            &self.currency,
            &self.stack_size,
            &self.variant,
            &self.flag,
            &self.time,
        ]
    }

    /// Sets a column by its header name. `Record #` cannot be edited.
    pub fn set_column(&mut self, column: &str, value: &str) -> Result<()> {
        let value = value.to_string();
        match column.trim() {
            "League" => self.league = value,
            "Logged-By" => self.logged_by = value,
            "Blueprint-Type" => self.blueprint_type = value,
            "Area-Level" => self.area_level = value,
            "Stack-Size" => self.stack_size = value,
            "Variant" => self.variant = value,
            "Flag" => self.flag = value,
            "Time" => {
                if parse_timestamp(&value).is_none() {
                    return Err(anyhow!("Invalid time '{}', expected {}", value, TIME_FORMAT));
                }
                self.time = value;
            }
            other => {
                let category = Category::ALL
                    .into_iter()
                    .find(|c| c.column_name() == other)
                    .ok_or_else(|| anyhow!("Unknown or read-only column '{}'", other))?;
                *self.category_value_mut(category) = value;
            }
        }
        Ok(())
    }

    /// Encodes the row as one log line (no trailing newline).
    pub fn to_line(&self) -> String {
        let mut fields = Vec::with_capacity(COLUMN_COUNT);
        fields.push(self.record.to_string());
        fields.extend(self.values().iter().map(|v| escape_field(v)));
        fields.join(",")
    }

    /// Decodes one log line.
    pub fn parse_line(line: &str) -> Result<Self> {
        let parts = split_fields(line);
        if parts.len() != COLUMN_COUNT {
            return Err(anyhow!(
                "Expected {} columns, got {}",
                COLUMN_COUNT,
                parts.len()
            ));
        }

        let record = parts[0]
            .trim()
            .parse::<u64>()
            .context(format!("Invalid record number '{}'", parts[0]))?;

        let mut fields = parts.into_iter().skip(1);
        let mut next = || fields.next().unwrap_or_default();
        Ok(LogEntry {
            record,
            league: next(),
            logged_by: next(),
            blueprint_type: next(),
            area_level: next(),
            trinket: next(),
            replacement: next(),
            replica: next(),
            experimental: next(),
            weapon_enchant: next(),
            armor_enchant: next(),
            scarab: next(),
            currency: next(),
            stack_size: next(),
            variant: next(),
            flag: next(),
            time: next(),
        })
    }
}
