use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The logical operation a timing sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "UA")]
    Ua,
    #[serde(rename = "IP")]
    Ip,
}

/// Sink for per-operation latency samples.
///
/// Shared process-wide as `Arc<dyn StatsSink>`; `record_duration` is called
/// concurrently from every in-flight request.
pub trait StatsSink: Send + Sync + 'static {
    fn record_duration(&self, kind: OperationKind, elapsed: Duration);

    fn snapshot(&self) -> StatsSnapshot;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KindSnapshot {
    pub count: u64,
    pub total_ms: f64,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub started_at: DateTime<Utc>,
    pub ua: KindSnapshot,
    pub ip: KindSnapshot,
}

#[derive(Debug, Default)]
struct Accumulator {
    count: u64,
    total: Duration,
    min: Option<Duration>,
    max: Duration,
}

impl Accumulator {
    fn add(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total = self.total.saturating_add(elapsed);
        self.min = Some(self.min.map_or(elapsed, |m| m.min(elapsed)));
        self.max = self.max.max(elapsed);
    }

    fn snapshot(&self) -> KindSnapshot {
        let ms = |d: Duration| d.as_secs_f64() * 1000.0;
        KindSnapshot {
            count: self.count,
            total_ms: ms(self.total),
            avg_ms: if self.count == 0 {
                0.0
            } else {
                ms(self.total) / self.count as f64
            },
            min_ms: self.min.map(ms).unwrap_or(0.0),
            max_ms: ms(self.max),
        }
    }
}

/// Default [`StatsSink`]: one accumulator per [`OperationKind`].
///
/// Each accumulator sits behind its own mutex, held only for the update or
/// the read, so a snapshot never observes a count without its duration.
#[derive(Debug)]
pub struct ParserStatistics {
    started_at: DateTime<Utc>,
    ua: Mutex<Accumulator>,
    ip: Mutex<Accumulator>,
}

impl Default for ParserStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserStatistics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            ua: Mutex::new(Accumulator::default()),
            ip: Mutex::new(Accumulator::default()),
        }
    }

    fn slot(&self, kind: OperationKind) -> &Mutex<Accumulator> {
        match kind {
            OperationKind::Ua => &self.ua,
            OperationKind::Ip => &self.ip,
        }
    }

    fn read(&self, kind: OperationKind) -> KindSnapshot {
        self.slot(kind)
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .snapshot()
    }
}

impl StatsSink for ParserStatistics {
    fn record_duration(&self, kind: OperationKind, elapsed: Duration) {
        self.slot(kind)
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .add(elapsed);
    }

    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started_at: self.started_at,
            ua: self.read(OperationKind::Ua),
            ip: self.read(OperationKind::Ip),
        }
    }
}
