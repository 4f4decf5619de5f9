//! Sensor values

use std::fmt;

use serde::{Deserialize, Serialize};

use entity_store::STATE_UNKNOWN;

/// Last-known value of a sensor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorValue {
    /// No value has been received, or the device became unreachable
    #[default]
    Unknown,
    Int(i64),
    Float(f64),
    Text(String),
}

impl SensorValue {
    pub fn is_unknown(&self) -> bool {
        matches!(self, SensorValue::Unknown)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SensorValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            SensorValue::Float(value) => Some(*value),
            SensorValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SensorValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// State string the host renders
    pub fn to_state_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Unknown => f.write_str(STATE_UNKNOWN),
            SensorValue::Int(value) => write!(f, "{}", value),
            SensorValue::Float(value) => write!(f, "{}", value),
            SensorValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for SensorValue {
    fn from(value: i64) -> Self {
        SensorValue::Int(value)
    }
}

impl From<i32> for SensorValue {
    fn from(value: i32) -> Self {
        SensorValue::Int(i64::from(value))
    }
}

impl From<u32> for SensorValue {
    fn from(value: u32) -> Self {
        SensorValue::Int(i64::from(value))
    }
}

impl From<f64> for SensorValue {
    fn from(value: f64) -> Self {
        SensorValue::Float(value)
    }
}

impl From<String> for SensorValue {
    fn from(value: String) -> Self {
        SensorValue::Text(value)
    }
}

impl From<&str> for SensorValue {
    fn from(value: &str) -> Self {
        SensorValue::Text(value.to_string())
    }
}
