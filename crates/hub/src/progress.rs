//! 진행률 추적: 처리 속도와 남은 시간을 계산하고 보고 빈도를 제한합니다.

use std::time::Duration;

use tokio::time::Instant;

use crate::message::ProgressData;

/// 기본 최소 보고 간격
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);

/// 기간을 `1.50s`, `250.00ms` 형태로 포맷합니다.
pub fn format_duration(duration: Duration) -> String {
    format!("{:.2?}", duration)
}

/// 작업 하나의 진행률 추적기
///
/// [`advance`](Self::advance)는 마지막 보고 이후 `min_interval`이 지났거나
/// `min_step`개 이상 처리되었을 때만 [`ProgressData`]를 반환합니다.
/// 전체 개수에 도달하면 항상 한 번 보고합니다.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: u64,
    processed: u64,
    started: Instant,
    last_report: Option<(Instant, u64)>,
    min_interval: Duration,
    min_step: u64,
    current_line: Option<String>,
}

impl ProgressTracker {
    /// 전체 개수로 추적기를 생성합니다. 전체를 모르면 0을 넘깁니다.
    ///
    /// 기본 최소 단계는 전체의 1%입니다.
    pub fn new(total: u64) -> Self {
        Self {
            total,
            processed: 0,
            started: Instant::now(),
            last_report: None,
            min_interval: DEFAULT_MIN_INTERVAL,
            min_step: (total / 100).max(1),
            current_line: None,
        }
    }

    /// 최소 보고 간격을 설정합니다.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// 최소 보고 단계를 설정합니다.
    pub fn with_min_step(mut self, step: u64) -> Self {
        self.min_step = step.max(1);
        self
    }

    /// 다음 보고에 포함할 현재 줄을 설정합니다.
    pub fn set_current_line(&mut self, line: impl Into<String>) {
        self.current_line = Some(line.into());
    }

    /// `n`개를 처리했음을 기록하고, 보고할 때가 되면 스냅샷을 반환합니다.
    pub fn advance(&mut self, n: u64) -> Option<ProgressData> {
        self.processed = self.processed.saturating_add(n);
        let now = Instant::now();

        let due = match self.last_report {
            None => true,
            Some((at, count)) => {
                let finished = self.total > 0 && self.processed >= self.total && count < self.total;
                finished
                    || now.duration_since(at) >= self.min_interval
                    || self.processed - count >= self.min_step
            }
        };
        if !due {
            return None;
        }

        self.last_report = Some((now, self.processed));
        Some(self.snapshot())
    }

    /// 현재 진행률 스냅샷
    pub fn snapshot(&self) -> ProgressData {
        let elapsed = self.started.elapsed().as_secs_f64();
        let speed = if elapsed > 0.0 {
            self.processed as f64 / elapsed
        } else {
            0.0
        };

        let percentage = if self.total > 0 {
            (self.processed as f64 / self.total as f64 * 100.0).min(100.0)
        } else {
            0.0
        };

        let eta = if self.total == 0 {
            None
        } else if self.processed >= self.total {
            Some("0s".to_owned())
        } else if speed > 0.0 {
            let remaining = (self.total - self.processed) as f64 / speed;
            Some(format_duration(Duration::from_secs_f64(remaining)))
        } else {
            None
        };

        ProgressData {
            processed_lines: self.processed,
            total_lines: self.total,
            percentage,
            current_line: self.current_line.clone(),
            speed,
            eta,
        }
    }

    /// 지금까지 처리한 개수
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// 추적 시작 후 경과 시간
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
