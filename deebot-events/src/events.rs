//! Event payloads emitted by a vacuum robot
//!
//! Events are immutable snapshots. Fields the robot did not report are
//! `None` rather than a default value, so consumers can tell "not sent" apart
//! from "zero".

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Reachability of the robot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub available: bool,
}

impl StatusEvent {
    pub fn new(available: bool) -> Self {
        Self { available }
    }

    pub fn available() -> Self {
        Self::new(true)
    }

    pub fn unavailable() -> Self {
        Self::new(false)
    }
}

// ============================================================================
// Clean logs
// ============================================================================

/// One finished cleaning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanLogEntry {
    /// Start time, seconds since the epoch
    pub timestamp: i64,
    /// URL of the map image recorded for the run
    pub image_url: String,
    /// Cleaned area in square metres
    pub area: u32,
    /// Duration in seconds
    pub duration: u32,
    #[serde(rename = "type")]
    pub clean_type: Option<String>,
    pub stop_reason: Option<String>,
}

impl CleanLogEntry {
    pub fn new(timestamp: i64, image_url: impl Into<String>) -> Self {
        Self {
            timestamp,
            image_url: image_url.into(),
            area: 0,
            duration: 0,
            clean_type: None,
            stop_reason: None,
        }
    }
}

/// Clean history, most recent run first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanLogEvent {
    pub logs: Vec<CleanLogEntry>,
}

impl CleanLogEvent {
    pub fn new(logs: Vec<CleanLogEntry>) -> Self {
        Self { logs }
    }

    /// The most recent run, if any
    pub fn latest(&self) -> Option<&CleanLogEntry> {
        self.logs.first()
    }
}

// ============================================================================
// Water
// ============================================================================

/// Mopping water flow setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterAmount {
    Low,
    Medium,
    High,
    UltraHigh,
}

impl WaterAmount {
    /// Numeric level used on the wire (1-4)
    pub fn level(&self) -> u8 {
        match self {
            WaterAmount::Low => 1,
            WaterAmount::Medium => 2,
            WaterAmount::High => 3,
            WaterAmount::UltraHigh => 4,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(WaterAmount::Low),
            2 => Some(WaterAmount::Medium),
            3 => Some(WaterAmount::High),
            4 => Some(WaterAmount::UltraHigh),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WaterAmount::Low => "low",
            WaterAmount::Medium => "medium",
            WaterAmount::High => "high",
            WaterAmount::UltraHigh => "ultrahigh",
        }
    }
}

impl fmt::Display for WaterAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterInfoEvent {
    pub mop_attached: Option<bool>,
    pub amount: Option<WaterAmount>,
}

impl WaterInfoEvent {
    pub fn with_amount(amount: WaterAmount) -> Self {
        Self {
            mop_attached: None,
            amount: Some(amount),
        }
    }
}

// ============================================================================
// Component life span
// ============================================================================

/// Consumable components whose remaining life is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LifeSpan {
    #[serde(rename = "brush")]
    Brush,
    #[serde(rename = "sideBrush")]
    SideBrush,
    #[serde(rename = "heap")]
    Filter,
}

impl LifeSpan {
    /// Identifier the robot uses for the component
    pub fn as_str(&self) -> &'static str {
        match self {
            LifeSpan::Brush => "brush",
            LifeSpan::SideBrush => "sideBrush",
            LifeSpan::Filter => "heap",
        }
    }

    pub fn all() -> [LifeSpan; 3] {
        [LifeSpan::Brush, LifeSpan::SideBrush, LifeSpan::Filter]
    }
}

impl fmt::Display for LifeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remaining life per component, in percent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifeSpanEvent {
    pub components: BTreeMap<LifeSpan, f64>,
}

impl LifeSpanEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, component: LifeSpan, percent: f64) -> Self {
        self.components.insert(component, percent);
        self
    }

    pub fn get(&self, component: LifeSpan) -> Option<f64> {
        self.components.get(&component).copied()
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Statistics of the current or last cleaning run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsEvent {
    /// Square metres
    pub area: Option<u32>,
    /// Seconds
    pub time: Option<u64>,
    #[serde(rename = "type")]
    pub clean_type: Option<String>,
    /// Cleaning run id
    pub cid: Option<String>,
    /// Start time, seconds since the epoch
    pub start: Option<i64>,
}

/// Lifetime totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalStatsEvent {
    /// Square metres
    pub area: u64,
    /// Seconds
    pub time: u64,
    pub cleanings: u64,
}

impl TotalStatsEvent {
    pub fn new(area: u64, time: u64, cleanings: u64) -> Self {
        Self {
            area,
            time,
            cleanings,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Last error reported by the robot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub code: i32,
    pub description: Option<String>,
}

impl ErrorEvent {
    pub fn new(code: i32, description: Option<impl Into<String>>) -> Self {
        Self {
            code,
            description: description.map(Into::into),
        }
    }
}

// ============================================================================
// Rooms
// ============================================================================

/// A room saved on the robot's map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: u32,
    /// Room type description, e.g. "Living Room"
    pub subtype: String,
}

impl Room {
    pub fn new(id: u32, subtype: impl Into<String>) -> Self {
        Self {
            id,
            subtype: subtype.into(),
        }
    }
}
