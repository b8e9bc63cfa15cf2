//! Concurrent front scheduler
//!
//! Executes every front's assembly and factorization with a fixed pool of
//! worker threads while respecting the dependency forest. All readiness
//! bookkeeping (claimed/processed flags, completed count, first error)
//! lives behind one mutex; a claimed front is exclusively owned by its
//! worker until it is marked processed, after which its factors are
//! published through a write-once slot and become read-only shared state.
//!
//! Workers that find nothing claimable wait on a condition variable with a
//! bounded timeout: the timeout covers the window where a wake-up could
//! slip between a worker's scan and its wait, and it costs nothing beyond
//! an extra scan. The first error recorded stops further claims; fronts
//! already in flight finish, then every worker drains out.

use crate::core::DenseBlock;
use crate::linalg::{ldlt_in_place, LinAlgError};
use crate::solvers::assembler::assemble_front;
use crate::solvers::front_graph::{FrontGraph, FrontId};
use crate::solvers::{MultifrontalConfig, SolverError};
use nalgebra::{DMatrix, DVector};
use std::sync::{Condvar, Mutex, OnceLock};
use std::thread;
use tracing::{debug, trace};

/// Numeric factors of one processed front
#[derive(Debug, Clone)]
pub struct FrontFactors {
    /// Eliminated columns of L (dim × num_eliminated), unit diagonal
    /// implicit
    pub l: DMatrix<f64>,
    /// Eliminated pivots of D
    pub d: DVector<f64>,
    /// Schur complement over the remaining variables, consumed by the
    /// parent's assembler
    pub schur: DenseBlock,
}

/// One bookkeeping transition, recorded under the scheduler lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    Claimed(FrontId),
    Completed(FrontId),
}

/// Result of a full scheduler run
#[derive(Debug)]
pub(crate) struct SchedulerOutcome {
    pub factors: Vec<FrontFactors>,
    /// Claim/complete transitions in lock order, for dependency auditing
    pub trace: Vec<SchedulerEvent>,
}

struct SchedulerState {
    claimed: Vec<bool>,
    processed: Vec<bool>,
    completed: usize,
    error: Option<SolverError>,
    trace: Vec<SchedulerEvent>,
}

impl SchedulerState {
    fn new(total: usize) -> Self {
        Self {
            claimed: vec![false; total],
            processed: vec![false; total],
            completed: 0,
            error: None,
            trace: Vec::with_capacity(2 * total),
        }
    }

    /// First front that is unclaimed and whose dependencies are all
    /// processed. Which of several ready fronts gets picked is not part of
    /// the contract.
    fn find_ready(&self, graph: &FrontGraph) -> Option<FrontId> {
        graph
            .fronts()
            .iter()
            .find(|front| {
                !self.claimed[front.id]
                    && front.children.iter().all(|&child| self.processed[child])
            })
            .map(|front| front.id)
    }
}

/// Run assembly + factorization for every front in `graph`.
///
/// `owned` lists the original entries owned by each front (position
/// space); `order` maps positions back to original variables so pivot
/// failures report the caller's numbering.
pub(crate) fn run_scheduler(
    graph: &FrontGraph,
    owned: &[Vec<(usize, usize, f64)>],
    order: &[usize],
    config: &MultifrontalConfig,
) -> Result<SchedulerOutcome, SolverError> {
    let total = graph.len();
    if total == 0 {
        return Ok(SchedulerOutcome {
            factors: Vec::new(),
            trace: Vec::new(),
        });
    }

    let workers = config.effective_workers().min(total).max(1);
    debug!(total, workers, "scheduling fronts");

    let slots: Vec<OnceLock<FrontFactors>> = (0..total).map(|_| OnceLock::new()).collect();
    let state = Mutex::new(SchedulerState::new(total));
    let ready = Condvar::new();

    thread::scope(|scope| {
        for worker in 0..workers {
            let slots = &slots;
            let state = &state;
            let ready = &ready;
            scope.spawn(move || {
                worker_loop(worker, graph, owned, order, config, slots, state, ready);
            });
        }
    });

    let state = state
        .into_inner()
        .map_err(|_| SolverError::Scheduler("a worker thread panicked".to_string()))?;

    if let Some(error) = state.error {
        return Err(error);
    }
    if state.completed != total {
        return Err(SolverError::Scheduler(format!(
            "only {} of {total} fronts completed",
            state.completed
        )));
    }

    let mut factors = Vec::with_capacity(total);
    for (id, slot) in slots.into_iter().enumerate() {
        factors.push(slot.into_inner().ok_or_else(|| {
            SolverError::Scheduler(format!("front {id} completed without publishing factors"))
        })?);
    }

    debug!(total, "all fronts factorized");
    Ok(SchedulerOutcome {
        factors,
        trace: state.trace,
    })
}

#[allow(clippy::too_many_arguments)]
fn worker_loop(
    worker: usize,
    graph: &FrontGraph,
    owned: &[Vec<(usize, usize, f64)>],
    order: &[usize],
    config: &MultifrontalConfig,
    slots: &[OnceLock<FrontFactors>],
    state: &Mutex<SchedulerState>,
    ready: &Condvar,
) {
    let total = graph.len();
    loop {
        // Claim under the lock.
        let front_id = {
            let Ok(mut guard) = state.lock() else {
                return;
            };
            loop {
                if guard.error.is_some() || guard.completed == total {
                    return;
                }
                if let Some(id) = guard.find_ready(graph) {
                    guard.claimed[id] = true;
                    guard.trace.push(SchedulerEvent::Claimed(id));
                    break id;
                }
                let Ok((next, _)) = ready.wait_timeout(guard, config.poll_interval) else {
                    return;
                };
                guard = next;
            }
        };

        trace!(worker, front_id, "claimed front");

        // CPU-bound work outside the lock; the claimed front is exclusively
        // ours, children are immutable.
        let result = process_front(front_id, graph, &owned[front_id], order, config, slots);

        let Ok(mut guard) = state.lock() else {
            return;
        };
        match result {
            Ok(()) => {
                guard.processed[front_id] = true;
                guard.completed += 1;
                guard.trace.push(SchedulerEvent::Completed(front_id));
            }
            Err(error) => {
                if guard.error.is_none() {
                    guard.error = Some(error);
                }
            }
        }
        drop(guard);
        ready.notify_all();
    }
}

/// Assemble and factorize one front, publishing its factors.
fn process_front(
    front_id: FrontId,
    graph: &FrontGraph,
    owned: &[(usize, usize, f64)],
    order: &[usize],
    config: &MultifrontalConfig,
    slots: &[OnceLock<FrontFactors>],
) -> Result<(), SolverError> {
    let front = graph.front(front_id);
    let mut block = assemble_front(front, owned, slots)?;

    let npivots = front.num_eliminated();
    ldlt_in_place(&mut block, npivots, config.pivot_tolerance).map_err(|error| match error {
        LinAlgError::SingularPivot(local) => SolverError::SingularPivot(order[front.vars[local]]),
        other => SolverError::Scheduler(other.to_string()),
    })?;

    let dim = front.dim();
    let l = DMatrix::from_fn(dim, npivots, |i, p| match i.cmp(&p) {
        std::cmp::Ordering::Greater => block.get(i, p),
        std::cmp::Ordering::Equal => 1.0,
        std::cmp::Ordering::Less => 0.0,
    });
    let d = DVector::from_fn(npivots, |p, _| block.get(p, p));
    let remaining = dim - npivots;
    let mut schur = DenseBlock::zeros(remaining);
    for a in 0..remaining {
        for b in 0..remaining {
            schur.set(a, b, block.get(npivots + a, npivots + b));
        }
    }

    slots[front_id]
        .set(FrontFactors { l, d, schur })
        .map_err(|_| SolverError::Scheduler(format!("front {front_id} factored twice")))?;
    Ok(())
}
