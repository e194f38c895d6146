//! Cluster snapshot payload and the resource builder.
//!
//! The payload is the "optimized" format written by the caching backend:
//! slot arrays are stored sparsely (`{"3": "alice"}`), the hardware group is
//! embedded per host and only the job tables needed for attribution are kept.
//! Older cache files still carry dense slot arrays, so both shapes parse.

use std::collections::{BTreeMap, HashMap};

use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::resource::{LoadMetrics, Resource, SlotKind, UNKNOWN_HARDWARE_GROUP, UNKNOWN_HOST_STATUS};

/// Upper bound on the slots of either kind built for one host. Counts above
/// it in a payload are clamped.
pub const MAX_SLOTS_PER_HOST: u32 = 4096;

/// Per-slot values in either sparse (`{"idx": v}`) or dense (`[v, null, …]`) form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValues<T> {
    Sparse(BTreeMap<String, Option<T>>),
    Dense(Vec<Option<T>>),
}

impl<T> Default for SlotValues<T> {
    fn default() -> Self {
        SlotValues::Sparse(BTreeMap::new())
    }
}

impl<T: Clone> SlotValues<T> {
    /// Collect present values keyed by slot index. Unparsable keys are dropped.
    pub fn indexed(&self) -> BTreeMap<u32, T> {
        match self {
            SlotValues::Sparse(map) => map
                .iter()
                .filter_map(|(k, v)| Some((k.parse::<u32>().ok()?, v.clone()?)))
                .collect(),
            SlotValues::Dense(list) => list
                .iter()
                .enumerate()
                .filter_map(|(i, v)| Some((i as u32, v.clone()?)))
                .collect(),
        }
    }

    /// Number of slots implied by the data alone (highest index + 1).
    fn implied_len(&self) -> u32 {
        match self {
            SlotValues::Dense(list) => u32::try_from(list.len()).unwrap_or(u32::MAX),
            SlotValues::Sparse(_) => self
                .indexed()
                .keys()
                .next_back()
                .map_or(0, |i| i.saturating_add(1)),
        }
    }
}

/// One host entry of `hostDetails`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDetail {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub cpu_slots: SlotValues<String>,
    #[serde(default)]
    pub gpu_slots: SlotValues<String>,
    #[serde(default, alias = "maxCpus")]
    pub num_cpus: Option<u32>,
    #[serde(default, alias = "maxGpus")]
    pub num_gpus: Option<u32>,
    #[serde(default)]
    pub gpu_type: Option<String>,
    #[serde(default)]
    pub gpu_utilization: SlotValues<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub hardware_group: Option<String>,
    #[serde(default)]
    pub load: LoadMetrics,
}

impl HostDetail {
    pub fn cpu_count(&self) -> u32 {
        self.num_cpus
            .unwrap_or_else(|| self.cpu_slots.implied_len())
            .min(MAX_SLOTS_PER_HOST)
    }

    pub fn gpu_count(&self) -> u32 {
        self.num_gpus
            .unwrap_or_else(|| self.gpu_slots.implied_len())
            .min(MAX_SLOTS_PER_HOST)
    }
}

/// A job from `raw.jobs.all`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    #[serde(default, alias = "job_id", deserialize_with = "string_or_number")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default, alias = "job_name")]
    pub name: Option<String>,
    /// Slots allocated per execution host.
    #[serde(default, alias = "exec_hosts")]
    pub exec_hosts: BTreeMap<String, u32>,
}

/// A GPU → job mapping from `raw.gpu_attribution`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuAttribution {
    #[serde(default)]
    pub hostname: String,
    #[serde(default, alias = "gpu_index")]
    pub gpu_index: u32,
    #[serde(default, alias = "job_id", deserialize_with = "string_or_number")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawJobs {
    #[serde(default)]
    pub all: Vec<JobRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSection {
    #[serde(default)]
    pub jobs: RawJobs,
    #[serde(default)]
    pub gpu_attribution: Vec<GpuAttribution>,
}

/// A complete cluster-state payload for one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub host_details: Vec<HostDetail>,
    #[serde(default)]
    pub active_users: Option<serde_json::Value>,
    #[serde(default)]
    pub user_job_stats: Option<serde_json::Value>,
    #[serde(default)]
    pub motd: Option<serde_json::Value>,
    #[serde(default)]
    pub fetched_at: Option<String>,
    #[serde(default)]
    pub raw: RawSection,
}

impl Snapshot {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// `fetchedAt` as unix seconds, if present and well formed.
    pub fn fetched_at_unix(&self) -> Option<i64> {
        let raw = self.fetched_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.timestamp())
            .ok()
    }

    /// Build one [`Resource`] per slot, with job attribution joined in.
    pub fn to_resources(&self) -> Vec<Resource> {
        let mut resources = Vec::new();

        for host in &self.host_details {
            if host.hostname.is_empty() {
                tracing::debug!("Skipping host entry without a hostname");
                continue;
            }

            let status = host
                .status
                .clone()
                .unwrap_or_else(|| UNKNOWN_HOST_STATUS.to_string());
            let group = host
                .hardware_group
                .clone()
                .unwrap_or_else(|| UNKNOWN_HARDWARE_GROUP.to_string());

            let gpu_occupants = host.gpu_slots.indexed();
            let gpu_util = host.gpu_utilization.indexed();
            for index in 0..host.gpu_count() {
                let mut slot = Resource::new(&host.hostname, SlotKind::Gpu, index);
                slot.occupant = gpu_occupants.get(&index).cloned();
                slot.gpu_type = host.gpu_type.clone();
                slot.utilization_percent = gpu_util.get(&index).copied();
                slot.host_status = status.clone();
                slot.hardware_group = group.clone();
                slot.load = host.load.clone();
                resources.push(slot);
            }

            let cpu_occupants = host.cpu_slots.indexed();
            for index in 0..host.cpu_count() {
                let mut slot = Resource::new(&host.hostname, SlotKind::Cpu, index);
                slot.occupant = cpu_occupants.get(&index).cloned();
                slot.utilization_percent = host.load.cpu_percent;
                slot.host_status = status.clone();
                slot.hardware_group = group.clone();
                slot.load = host.load.clone();
                resources.push(slot);
            }
        }

        attribute_jobs(&mut resources, &self.raw);
        resources
    }
}

/// Join job ids and names onto occupied slots.
///
/// GPU slots are matched exactly through `gpu_attribution`. CPU slots are
/// matched per job and execution host: the first `n` unattributed CPU slots
/// on that host held by the job's user take the job.
pub fn attribute_jobs(resources: &mut [Resource], raw: &RawSection) {
    let job_names: HashMap<&str, &str> = raw
        .jobs
        .all
        .iter()
        .filter_map(|j| Some((j.job_id.as_deref()?, j.name.as_deref()?)))
        .collect();

    let gpu_jobs: HashMap<(&str, u32), &str> = raw
        .gpu_attribution
        .iter()
        .filter_map(|a| Some(((a.hostname.as_str(), a.gpu_index), a.job_id.as_deref()?)))
        .collect();

    for slot in resources.iter_mut().filter(|r| r.kind == SlotKind::Gpu) {
        if slot.is_idle() {
            continue;
        }
        if let Some(job_id) = gpu_jobs.get(&(slot.hostname.as_str(), slot.index)) {
            slot.job_id = Some((*job_id).to_string());
            slot.job_name = job_names.get(job_id).map(|n| (*n).to_string());
        }
    }

    for job in &raw.jobs.all {
        let (Some(job_id), Some(user)) = (job.job_id.as_deref(), job.user.as_deref()) else {
            continue;
        };
        for (host, count) in &job.exec_hosts {
            let mut remaining = *count;
            for slot in resources.iter_mut() {
                if remaining == 0 {
                    break;
                }
                if slot.kind == SlotKind::Cpu
                    && slot.job_id.is_none()
                    && slot.hostname == *host
                    && slot.occupant() == Some(user)
                {
                    slot.job_id = Some(job_id.to_string());
                    slot.job_name = job.name.clone();
                    remaining -= 1;
                }
            }
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
