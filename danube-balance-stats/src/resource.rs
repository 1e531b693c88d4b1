use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical resources tracked for every broker.
///
/// The declaration order is the enumeration order used by every statistic map,
/// the utilization matrix columns and both renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    #[serde(rename = "cpu")]
    Cpu,
    #[serde(rename = "networkInbound")]
    NetworkInbound,
    #[serde(rename = "networkOutbound")]
    NetworkOutbound,
    #[serde(rename = "disk")]
    Disk,
}

pub(crate) const NUM_RESOURCES: usize = 4;

const RESOURCES: [Resource; NUM_RESOURCES] = [
    Resource::Cpu,
    Resource::NetworkInbound,
    Resource::NetworkOutbound,
    Resource::Disk,
];

impl Resource {
    /// All resources in enumeration order
    pub fn cached_values() -> &'static [Resource] {
        &RESOURCES
    }

    /// Host resources are shared by every broker co-located on the same host,
    /// so their load and capacity must be read from the host aggregate.
    pub fn is_host_resource(&self) -> bool {
        match self {
            Self::Cpu | Self::NetworkInbound | Self::NetworkOutbound => true,
            Self::Disk => false,
        }
    }

    /// Machine name, used as key in the structured rendering
    pub fn resource(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::NetworkInbound => "networkInbound",
            Self::NetworkOutbound => "networkOutbound",
            Self::Disk => "disk",
        }
    }

    /// Column of this resource in the utilization matrix
    pub fn index(&self) -> usize {
        match self {
            Self::Cpu => 0,
            Self::NetworkInbound => 1,
            Self::NetworkOutbound => 2,
            Self::Disk => 3,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cpu => "CPU",
            Self::NetworkInbound => "NW_IN",
            Self::NetworkOutbound => "NW_OUT",
            Self::Disk => "DISK",
        };
        f.write_str(label)
    }
}

/// The four statistic kinds reported for every metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Statistic {
    #[serde(rename = "AVG")]
    Avg,
    #[serde(rename = "MAX")]
    Max,
    #[serde(rename = "MIN")]
    Min,
    #[serde(rename = "STD")]
    StDev,
}

const STATISTICS: [Statistic; 4] = [
    Statistic::Avg,
    Statistic::Max,
    Statistic::Min,
    Statistic::StDev,
];

impl Statistic {
    /// All statistic kinds in enumeration order
    pub fn cached_values() -> &'static [Statistic] {
        &STATISTICS
    }

    pub fn stat(&self) -> &'static str {
        match self {
            Self::Avg => "AVG",
            Self::Max => "MAX",
            Self::Min => "MIN",
            Self::StDev => "STD",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stat())
    }
}

/// A count-based statistic: max and min are whole replica counts,
/// average and standard deviation are real numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(usize),
    Real(f64),
}

impl StatValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int(value) => value as f64,
            Self::Real(value) => value,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{}", value),
            // Debug keeps the fractional part ("2.0"), so reals never read as counts
            Self::Real(value) => write!(f, "{:?}", value),
        }
    }
}
