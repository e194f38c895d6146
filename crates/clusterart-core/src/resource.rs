//! Resource model: one CPU or GPU slot on one host.
//!
//! Resources are rebuilt from scratch on every data refresh. Apart from the
//! layout output (`x`, `y`) they are never mutated after construction, and
//! nothing should key off their identity across refreshes.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Alphabetic prefix plus the digits that follow it (`h04u08` → `h04`).
static ROW_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+\d+").expect("Invalid row regex"));

/// Default host status when the snapshot does not report one.
pub const UNKNOWN_HOST_STATUS: &str = "unknown";

/// Default hardware group when the host is not listed in any group.
pub const UNKNOWN_HARDWARE_GROUP: &str = "Unknown";

/// Slot kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    // Declaration order matters: GPUs sort before CPUs.
    Gpu,
    Cpu,
}

impl SlotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Gpu => "gpu",
            SlotKind::Cpu => "cpu",
        }
    }
}

/// Host load averages and usage figures, as reported by the scheduler.
///
/// Every field is optional; consumers treat an absent value as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadMetrics {
    #[serde(default, rename = "r15s")]
    pub load_15s: Option<f64>,
    #[serde(default, rename = "r1m")]
    pub load_1m: Option<f64>,
    #[serde(default, rename = "r15m")]
    pub load_15m: Option<f64>,
    #[serde(default, rename = "ut")]
    pub cpu_percent: Option<f64>,
    #[serde(default, rename = "mem")]
    pub memory_mb: Option<f64>,
    #[serde(default, rename = "io")]
    pub io_kbps: Option<f64>,
}

/// One hardware slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub hostname: String,
    pub kind: SlotKind,
    pub index: u32,
    pub occupant: Option<String>,

    pub gpu_type: Option<String>,
    /// `None` when the producer did not report a figure for this slot.
    pub utilization_percent: Option<f64>,
    pub host_status: String,
    pub hardware_group: String,
    pub load: LoadMetrics,

    pub job_id: Option<String>,
    pub job_name: Option<String>,

    pub x: i32,
    pub y: i32,
}

impl Resource {
    /// Create an idle slot with default metadata.
    pub fn new(hostname: impl Into<String>, kind: SlotKind, index: u32) -> Self {
        Self {
            hostname: hostname.into(),
            kind,
            index,
            occupant: None,
            gpu_type: None,
            utilization_percent: None,
            host_status: UNKNOWN_HOST_STATUS.to_string(),
            hardware_group: UNKNOWN_HARDWARE_GROUP.to_string(),
            load: LoadMetrics::default(),
            job_id: None,
            job_name: None,
            x: 0,
            y: 0,
        }
    }

    pub fn with_occupant(mut self, occupant: impl Into<String>) -> Self {
        self.occupant = Some(occupant.into());
        self
    }

    pub fn with_hardware_group(mut self, group: impl Into<String>) -> Self {
        self.hardware_group = group.into();
        self
    }

    pub fn with_host_status(mut self, status: impl Into<String>) -> Self {
        self.host_status = status.into();
        self
    }

    pub fn with_utilization(mut self, percent: f64) -> Self {
        self.utilization_percent = Some(percent);
        self
    }

    pub fn with_gpu_type(mut self, gpu_type: impl Into<String>) -> Self {
        self.gpu_type = Some(gpu_type.into());
        self
    }

    pub fn with_job(mut self, job_id: impl Into<String>, job_name: Option<String>) -> Self {
        self.job_id = Some(job_id.into());
        self.job_name = job_name;
        self
    }

    /// True iff nobody holds this slot.
    pub fn is_idle(&self) -> bool {
        self.occupant.as_deref().map_or(true, str::is_empty)
    }

    /// The occupant, if the slot is held by someone.
    pub fn occupant(&self) -> Option<&str> {
        self.occupant.as_deref().filter(|o| !o.is_empty())
    }

    /// Grouping key derived from the hostname (`e10u15` → `e10`).
    pub fn row(&self) -> &str {
        ROW_PATTERN
            .find(&self.hostname)
            .map_or(self.hostname.as_str(), |m| m.as_str())
    }

    /// Utilization with unreported figures read as zero.
    pub fn utilization(&self) -> f64 {
        self.utilization_percent.unwrap_or(0.0)
    }

    /// Utilization as used for "hotness" ordering: idle slots are cold,
    /// occupied slots without a reported figure are treated as fully busy.
    pub fn heat(&self) -> f64 {
        if self.is_idle() {
            0.0
        } else {
            self.utilization_percent.unwrap_or(100.0)
        }
    }

    /// Host memory in MB, zero when unreported.
    pub fn memory_mb(&self) -> f64 {
        self.load.memory_mb.unwrap_or(0.0)
    }
}

/// Canonical slot order: hostname, GPUs before CPUs, then slot index.
pub fn canonical_cmp(a: &Resource, b: &Resource) -> Ordering {
    a.hostname
        .cmp(&b.hostname)
        .then(a.kind.cmp(&b.kind))
        .then(a.index.cmp(&b.index))
}
