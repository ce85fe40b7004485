//! 基于 /proc 的进程枚举与探针（Linux）

use async_trait::async_trait;
use dashmap::DashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::backend::process::{ProcessEntry, ProcessEnumerator, ProcessProbe, matches_keywords};
use crate::error::Result;
use crate::models::{MemoryUsage, ProcessStats};

const CLOCK_TICKS_PER_SEC: f64 = 100.0;
/// 基线只在经过该窗口后前移，窗口内的调用方共享同一结果
const MIN_CPU_WINDOW: Duration = Duration::from_millis(900);

#[derive(Debug, Clone, Copy)]
struct CpuSample {
    ticks: u64,
    at: Instant,
}

#[derive(Debug, Clone, Copy)]
struct CpuWindow {
    baseline: CpuSample,
    percent: f64,
}

/// /proc 文件系统读取器，同时实现枚举器与探针
#[derive(Debug)]
pub struct ProcfsProcesses {
    root: PathBuf,
    cpu_samples: DashMap<u32, CpuWindow>,
}

impl ProcfsProcesses {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cpu_samples: DashMap::new(),
        }
    }

    fn pid_dir(&self, pid: u32) -> PathBuf {
        self.root.join(pid.to_string())
    }

    fn cpu_percent(&self, pid: u32, ticks: u64) -> f64 {
        self.cpu_percent_at(pid, ticks, Instant::now())
    }

    /// 首次采样返回 0.0；之后每个窗口按两次基线间的 CPU 时间计算一次，
    /// 同一进程的所有调用方（连接、各条遥测订阅）读到的是同一个值
    fn cpu_percent_at(&self, pid: u32, ticks: u64, now: Instant) -> f64 {
        let sample = CpuSample { ticks, at: now };
        let mut entry = self.cpu_samples.entry(pid).or_insert(CpuWindow {
            baseline: sample,
            percent: 0.0,
        });
        let window = entry.value_mut();

        let elapsed = now.saturating_duration_since(window.baseline.at);
        if elapsed < MIN_CPU_WINDOW {
            return window.percent;
        }

        let used = ticks.saturating_sub(window.baseline.ticks) as f64 / CLOCK_TICKS_PER_SEC;
        window.percent = (used / elapsed.as_secs_f64() * 100.0).max(0.0);
        window.baseline = sample;
        window.percent
    }
}

impl Default for ProcfsProcesses {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Default, PartialEq)]
struct StatusFields {
    name: String,
    state: String,
    threads: u32,
    rss_kb: u64,
    vms_kb: u64,
}

fn parse_status(content: &str) -> StatusFields {
    let mut fields = StatusFields::default();
    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key {
            "Name" => fields.name = value.to_string(),
            "State" => {
                // "S (sleeping)"
                fields.state = value
                    .split_once('(')
                    .and_then(|(_, rest)| rest.strip_suffix(')'))
                    .unwrap_or(value)
                    .to_string();
            }
            "Threads" => fields.threads = value.parse().unwrap_or(0),
            "VmRSS" => fields.rss_kb = parse_kb(value),
            "VmSize" => fields.vms_kb = parse_kb(value),
            _ => {}
        }
    }
    fields
}

fn parse_kb(value: &str) -> u64 {
    value
        .split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

/// 从 /proc/<pid>/stat 取 utime + stime
fn parse_cpu_ticks(stat: &str) -> u64 {
    // comm 字段可能包含空格，从最后一个 ')' 之后开始计数
    let Some((_, rest)) = stat.rsplit_once(')') else {
        return 0;
    };
    let fields: Vec<&str> = rest.split_whitespace().collect();
    let utime: u64 = fields.get(11).and_then(|v| v.parse().ok()).unwrap_or(0);
    let stime: u64 = fields.get(12).and_then(|v| v.parse().ok()).unwrap_or(0);
    utime + stime
}

#[async_trait]
impl ProcessEnumerator for ProcfsProcesses {
    async fn enumerate(&self, keywords: &[String]) -> Result<Vec<ProcessEntry>> {
        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = dir.next_entry().await? {
            let Some(pid) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u32>().ok())
            else {
                continue;
            };

            // 进程可能在枚举过程中退出
            let Ok(Some(comm)) = read_optional(&entry.path().join("comm")).await else {
                continue;
            };
            let name = comm.trim().to_string();
            if name.is_empty() || !matches_keywords(&name, keywords) {
                continue;
            }

            let exe_path = tokio::fs::read_link(entry.path().join("exe"))
                .await
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "Unknown".to_string());

            entries.push(ProcessEntry {
                pid,
                name,
                exe_path,
            });
        }

        entries.sort_by_key(|e| e.pid);
        debug!(count = entries.len(), "enumerated processes");
        Ok(entries)
    }
}

#[async_trait]
impl ProcessProbe for ProcfsProcesses {
    async fn probe(&self, pid: u32) -> Result<Option<ProcessStats>> {
        let dir = self.pid_dir(pid);

        let Some(status) = read_optional(&dir.join("status")).await? else {
            self.cpu_samples.remove(&pid);
            return Ok(None);
        };
        let fields = parse_status(&status);
        if fields.state == "zombie" || fields.state == "dead" {
            self.cpu_samples.remove(&pid);
            return Ok(None);
        }

        let ticks = read_optional(&dir.join("stat"))
            .await?
            .map(|stat| parse_cpu_ticks(&stat))
            .unwrap_or(0);

        Ok(Some(ProcessStats {
            name: fields.name,
            cpu_percent: self.cpu_percent(pid, ticks),
            memory_info: MemoryUsage {
                rss: fields.rss_kb * 1024,
                vms: fields.vms_kb * 1024,
            },
            num_threads: fields.threads,
            status: fields.state,
        }))
    }
}
