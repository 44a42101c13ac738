use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::drivers::CaptureError;
use crate::types::Step;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Failed,
    /// The call reports no status.
    Unchecked,
}

/// Result of one SDK call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepRecord {
    pub step: Step,
    pub status: Option<i32>,
    pub outcome: Outcome,
}
impl StepRecord {
    pub fn checked(step: Step, status: i32, ok: bool) -> Self {
        Self {
            step,
            status: Some(status),
            outcome: if ok { Outcome::Ok } else { Outcome::Failed },
        }
    }
    pub fn unchecked(step: Step) -> Self {
        Self {
            step,
            status: None,
            outcome: Outcome::Unchecked,
        }
    }
}

/// A step's record together with what it produced.
#[derive(Debug)]
pub struct Checked<T> {
    pub record: StepRecord,
    pub value: Result<T, CaptureError>,
}
impl<T> Checked<T> {
    pub fn ok(record: StepRecord, value: T) -> Self {
        Self {
            record,
            value: Ok(value),
        }
    }
    pub fn err(record: StepRecord, error: CaptureError) -> Self {
        Self {
            record,
            value: Err(error),
        }
    }
}

/// Per-step status codes in execution order.
#[derive(Clone, Debug, Default)]
pub struct StatusReport {
    records: Vec<StepRecord>,
}
impl StatusReport {
    pub fn new() -> Self {
        Self::default()
    }
    /// Files the step's record and hands back its value.
    pub fn track<T>(&mut self, checked: Checked<T>) -> Result<T, CaptureError> {
        self.records.push(checked.record);
        checked.value
    }
    #[cfg(test)]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }
    #[cfg(test)]
    pub fn get(&self, step: Step) -> Option<&StepRecord> {
        self.records.iter().rev().find(|r| r.step == step)
    }
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
impl Serialize for StatusReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(record.step.as_str(), &record.status)?;
        }
        map.end()
    }
}
impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            let status = record.status.map_or_else(|| "-".to_owned(), |s| s.to_string());
            writeln!(f, "{:<20} {:>6}  {:?}", record.step.as_str(), status, record.outcome)?;
        }
        Ok(())
    }
}
