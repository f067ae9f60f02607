//! Declarative description of wizard forms.
//!
//! Every screen model implements [`FormData`], which exposes its fields as
//! strings keyed by their JSON name. The application layer edits, validates
//! and persists screens through this trait without knowing their concrete type.

use serde::{Serialize, de::DeserializeOwned};

use super::validation::FieldRules;

/// Inclusive integer range with a fixed step, as used by slider fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl RangeSpec {
    /// Clamps `value` into the range and rounds it to the nearest step from `min`.
    ///
    /// # Examples
    ///
    /// ```
    /// use loan_wizard::domain::RangeSpec;
    ///
    /// let range = RangeSpec { min: 200, max: 1000, step: 100 };
    /// assert_eq!(range.snap(0), 200);
    /// assert_eq!(range.snap(460), 500);
    /// assert_eq!(range.snap(9999), 1000);
    /// ```
    pub fn snap(&self, value: u32) -> u32 {
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 1 {
            return clamped;
        }
        let offset = clamped - self.min;
        let steps = (offset + self.step / 2) / self.step;
        (self.min + steps * self.step).min(self.max)
    }

    /// Moves `value` by `delta` whole steps, staying inside the range.
    pub fn step_by(&self, value: u32, delta: i32) -> u32 {
        let current = i64::from(self.snap(value));
        let moved = current + i64::from(delta) * i64::from(self.step.max(1));
        let bounded = moved.clamp(i64::from(self.min), i64::from(self.max));
        self.snap(bounded as u32)
    }

    /// Position of `value` within the range as a ratio in `[0, 1]`.
    pub fn ratio(&self, value: u32) -> f64 {
        if self.max == self.min {
            return 1.0;
        }
        f64::from(self.snap(value) - self.min) / f64::from(self.max - self.min)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text input.
    Text,
    /// Text input with live `+7 (DDD) DDD DDDD` formatting.
    Phone,
    /// One value out of a list of options.
    Select,
    /// Slider over an integer range.
    Range(RangeSpec),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// JSON name of the field, also used as its identifier.
    pub name: &'static str,
    pub label: &'static str,
    /// Shown in place of an empty value.
    pub placeholder: &'static str,
    pub kind: FieldKind,
    pub rules: FieldRules,
}

/// A flat, JSON-serialisable form persisted under a fixed key.
pub trait FormData: Serialize + DeserializeOwned + Default + Clone {
    /// Key under which the form is stored in the persistence store.
    const STORAGE_KEY: &'static str;

    fn fields() -> &'static [FieldSpec];

    /// Current value of `field` rendered as a string. Unknown names yield "".
    fn value(&self, field: &str) -> String;

    /// Replaces the value of `field`. Unknown names are ignored.
    fn set_value(&mut self, field: &str, value: String);

    fn field(name: &str) -> Option<&'static FieldSpec> {
        Self::fields().iter().find(|spec| spec.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AMOUNT: RangeSpec = RangeSpec { min: 200, max: 1000, step: 100 };
    const TERM: RangeSpec = RangeSpec { min: 10, max: 30, step: 1 };

    #[test]
    fn test_snap_clamps_and_rounds() {
        assert_eq!(AMOUNT.snap(150), 200);
        assert_eq!(AMOUNT.snap(249), 200);
        assert_eq!(AMOUNT.snap(250), 300);
        assert_eq!(AMOUNT.snap(1000), 1000);
        assert_eq!(AMOUNT.snap(1049), 1000);
        assert_eq!(TERM.snap(0), 10);
        assert_eq!(TERM.snap(17), 17);
        assert_eq!(TERM.snap(31), 30);
    }

    #[test]
    fn test_step_by_never_leaves_grid() {
        let mut value = AMOUNT.min;
        for _ in 0..20 {
            value = AMOUNT.step_by(value, 1);
            assert_eq!((value - AMOUNT.min) % AMOUNT.step, 0);
            assert!(value <= AMOUNT.max);
        }
        assert_eq!(value, 1000);

        for _ in 0..20 {
            value = AMOUNT.step_by(value, -1);
            assert!(value >= AMOUNT.min);
        }
        assert_eq!(value, 200);
    }

    #[test]
    fn test_step_by_term() {
        assert_eq!(TERM.step_by(10, 1), 11);
        assert_eq!(TERM.step_by(10, -1), 10);
        assert_eq!(TERM.step_by(29, 5), 30);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(AMOUNT.ratio(200), 0.0);
        assert_eq!(AMOUNT.ratio(1000), 1.0);
        assert_eq!(AMOUNT.ratio(600), 0.5);
    }
}
