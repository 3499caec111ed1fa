//! Scoring function for routing decisions

use super::requirements::{TaskPriority, TaskRequirements};
use crate::registry::{AccuracyTier, BackendDescriptor, PerformanceRecord, SpeedTier};

/// Average latency at which the latency term bottoms out.
pub const LATENCY_CEILING_MS: f64 = 5000.0;

/// Flat credit for backends without history.
pub const UNPROVEN_CREDIT: f64 = 25.0;

const SUCCESS_WEIGHT: f64 = 40.0;
const PREFERRED_CAPABILITY_BONUS: f64 = 15.0;
const CAPABILITY_BONUS: f64 = 10.0;

/// Score plus the human-readable facts that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub score: f64,
    pub factors: Vec<String>,
}

/// Weight of the latency term for a task priority.
pub fn latency_weight(priority: TaskPriority) -> f64 {
    match priority {
        TaskPriority::Speed => 30.0,
        TaskPriority::Balanced => 20.0,
        TaskPriority::Accuracy => 10.0,
    }
}

/// Score a candidate backend for a request. Higher is better.
///
/// `(10 - priority) * 10`, plus either `success_rate * 40` and a latency term
/// weighted by the task priority, or a flat [`UNPROVEN_CREDIT`] when there is
/// no history, plus capability bonuses for high accuracy and fast speed.
pub fn score_candidate(
    backend: &BackendDescriptor,
    performance: &PerformanceRecord,
    requirements: &TaskRequirements,
) -> ScoreBreakdown {
    let mut factors = Vec::new();
    let mut score = (10.0 - backend.priority as f64) * 10.0;
    factors.push(format!("priority tier {}", backend.priority));

    if performance.has_history() {
        let success_rate = performance.success_rate();
        let latency_score =
            (1.0 - performance.average_latency_ms / LATENCY_CEILING_MS).clamp(0.0, 1.0);
        score += success_rate * SUCCESS_WEIGHT;
        score += latency_score * latency_weight(requirements.priority);
        factors.push(format!("success rate {:.0}%", success_rate * 100.0));
        factors.push(format!("avg latency {:.0}ms", performance.average_latency_ms));
    } else {
        score += UNPROVEN_CREDIT;
        factors.push("no history yet".to_string());
    }

    if backend.capabilities.accuracy == AccuracyTier::High {
        score += if requirements.priority == TaskPriority::Accuracy {
            PREFERRED_CAPABILITY_BONUS
        } else {
            CAPABILITY_BONUS
        };
        factors.push("high accuracy".to_string());
    }

    if backend.capabilities.speed == SpeedTier::Fast {
        score += if requirements.priority == TaskPriority::Speed {
            PREFERRED_CAPABILITY_BONUS
        } else {
            CAPABILITY_BONUS
        };
        factors.push("fast".to_string());
    }

    if requirements.requires_vision {
        factors.push("vision capable".to_string());
    }
    if requirements.requires_reasoning {
        factors.push("reasoning capable".to_string());
    }

    ScoreBreakdown { score, factors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Capabilities;

    fn backend(priority: i32, speed: SpeedTier, accuracy: AccuracyTier) -> BackendDescriptor {
        BackendDescriptor::new("b", "B", "test", "model")
            .with_priority(priority)
            .with_capabilities(Capabilities {
                vision: true,
                reasoning: true,
                speed,
                accuracy,
            })
    }

    fn plain(priority: i32) -> BackendDescriptor {
        backend(priority, SpeedTier::Medium, AccuracyTier::Medium)
    }

    fn history(successes: u32, failures: u32, latency_ms: u64) -> PerformanceRecord {
        let mut record = PerformanceRecord::new();
        for _ in 0..successes {
            record.record(true, latency_ms);
        }
        for _ in 0..failures {
            record.record(false, latency_ms);
        }
        record
    }

    #[test]
    fn unproven_backend_gets_flat_credit() {
        let result = score_candidate(&plain(1), &PerformanceRecord::new(), &TaskRequirements::new());
        assert!((result.score - (90.0 + UNPROVEN_CREDIT)).abs() < 1e-9);
        assert!(result.factors.iter().any(|f| f == "no history yet"));
    }

    #[test]
    fn history_uses_success_and_latency() {
        // 90 base + 40 success + 20 * (1 - 1000/5000) latency
        let result = score_candidate(&plain(1), &history(2, 0, 1000), &TaskRequirements::new());
        assert!((result.score - 146.0).abs() < 1e-9);
        assert!(result.factors.iter().any(|f| f == "success rate 100%"));
        assert!(result.factors.iter().any(|f| f == "avg latency 1000ms"));
    }

    #[test]
    fn latency_weight_follows_task_priority() {
        let perf = history(1, 0, 0);
        let speed = score_candidate(
            &plain(5),
            &perf,
            &TaskRequirements::new().with_priority(TaskPriority::Speed),
        );
        let balanced = score_candidate(&plain(5), &perf, &TaskRequirements::new());
        let accuracy = score_candidate(
            &plain(5),
            &perf,
            &TaskRequirements::new().with_priority(TaskPriority::Accuracy),
        );
        assert!((speed.score - balanced.score - 10.0).abs() < 1e-9);
        assert!((balanced.score - accuracy.score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn lower_priority_number_scores_higher() {
        let perf = history(3, 1, 400);
        let req = TaskRequirements::new();
        let first = score_candidate(&plain(1), &perf, &req);
        let second = score_candidate(&plain(2), &perf, &req);
        assert!(first.score > second.score);
    }

    #[test]
    fn accuracy_bonus_larger_for_accuracy_tasks() {
        let b = backend(5, SpeedTier::Slow, AccuracyTier::High);
        let perf = PerformanceRecord::new();
        let accuracy = score_candidate(
            &b,
            &perf,
            &TaskRequirements::new().with_priority(TaskPriority::Accuracy),
        );
        let balanced = score_candidate(&b, &perf, &TaskRequirements::new());
        assert!((accuracy.score - (50.0 + 25.0 + 15.0)).abs() < 1e-9);
        assert!((balanced.score - (50.0 + 25.0 + 10.0)).abs() < 1e-9);
    }

    #[test]
    fn speed_bonus_larger_for_speed_tasks() {
        let b = backend(5, SpeedTier::Fast, AccuracyTier::Low);
        let perf = PerformanceRecord::new();
        let speed = score_candidate(
            &b,
            &perf,
            &TaskRequirements::new().with_priority(TaskPriority::Speed),
        );
        let balanced = score_candidate(&b, &perf, &TaskRequirements::new());
        assert!((speed.score - balanced.score - 5.0).abs() < 1e-9);
        assert!(speed.factors.iter().any(|f| f == "fast"));
    }

    #[test]
    fn latency_term_clamps_for_slow_backends() {
        let slow = score_candidate(&plain(5), &history(1, 0, 20_000), &TaskRequirements::new());
        assert!((slow.score - 90.0).abs() < 1e-9);
    }
}
