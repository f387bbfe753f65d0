//! Shared key-value table seam.
//!
//! The robot controller polls an external distributed key-value table once
//! per control cycle. This bridge only ever issues independent point writes
//! and point reads against it — never a transaction spanning multiple keys —
//! so the seam is a small trait. The daemon's loopback mode and the tests
//! both use `InMemoryTable`, which records write order so the publication
//! ordering contract can be checked.

use anyhow::Result;
use std::collections::HashMap;

/// Point operations against the shared table.
///
/// Writes are independent and idempotent. A failed write is reported to the
/// caller; callers never retry within the frame and rely on the next frame's
/// overwrite instead.
pub trait SharedTable {
    fn put_string(&mut self, key: &str, value: &str) -> Result<()>;
    fn put_numbers(&mut self, key: &str, values: &[f64]) -> Result<()>;
    fn put_bool(&mut self, key: &str, value: bool) -> Result<()>;
    fn get_string(&self, key: &str) -> Option<String>;
}

/// One recorded table write, in issue order.
#[derive(Clone, Debug, PartialEq)]
pub enum WriteOp {
    String { key: String, value: String },
    Numbers { key: String, values: Vec<f64> },
    Bool { key: String, value: bool },
}

impl WriteOp {
    pub fn key(&self) -> &str {
        match self {
            WriteOp::String { key, .. } => key,
            WriteOp::Numbers { key, .. } => key,
            WriteOp::Bool { key, .. } => key,
        }
    }
}

/// In-memory table that records every write in issue order.
#[derive(Debug, Default)]
pub struct InMemoryTable {
    strings: HashMap<String, String>,
    numbers: HashMap<String, Vec<f64>>,
    bools: HashMap<String, bool>,
    writes: Vec<WriteOp>,
}

impl InMemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes since construction (or the last `clear_writes`), in order.
    pub fn writes(&self) -> &[WriteOp] {
        &self.writes
    }

    /// Forget the recorded write log, keeping current values. Tests use this
    /// to isolate one frame's writes.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    pub fn bool_value(&self, key: &str) -> Option<bool> {
        self.bools.get(key).copied()
    }

    pub fn numbers_value(&self, key: &str) -> Option<&[f64]> {
        self.numbers.get(key).map(|v| v.as_slice())
    }
}

impl SharedTable for InMemoryTable {
    fn put_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.strings.insert(key.to_string(), value.to_string());
        self.writes.push(WriteOp::String {
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn put_numbers(&mut self, key: &str, values: &[f64]) -> Result<()> {
        self.numbers.insert(key.to_string(), values.to_vec());
        self.writes.push(WriteOp::Numbers {
            key: key.to_string(),
            values: values.to_vec(),
        });
        Ok(())
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.bools.insert(key.to_string(), value);
        self.writes.push(WriteOp::Bool {
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.strings.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_recorded_in_issue_order() -> Result<()> {
        let mut table = InMemoryTable::new();
        table.put_string("a", "one")?;
        table.put_bool("b", true)?;
        table.put_numbers("c", &[1.0, 2.0])?;

        let keys: Vec<&str> = table.writes().iter().map(|w| w.key()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        Ok(())
    }

    #[test]
    fn reads_return_latest_value() -> Result<()> {
        let mut table = InMemoryTable::new();
        table.put_string("k", "first")?;
        table.put_string("k", "second")?;

        assert_eq!(table.get_string("k").as_deref(), Some("second"));
        assert_eq!(table.writes().len(), 2);
        Ok(())
    }

    #[test]
    fn missing_key_reads_none() {
        let table = InMemoryTable::new();
        assert!(table.get_string("absent").is_none());
        assert!(table.bool_value("absent").is_none());
    }
}
