//! Unit and integration tests for ca-sim.

use std::time::Duration;

use ca_core::{CommMode, Road, SimConfig, Tick};

use crate::{RunInfo, RunSummary, SimObserver, StepReport};

// ── Helpers ───────────────────────────────────────────────────────────────────

const GUARD: Duration = Duration::from_secs(10);

fn config(road_length: usize, timesteps: u64, workers: usize, mode: CommMode) -> SimConfig {
    SimConfig {
        road_length,
        timesteps,
        density: 0.5,
        mode,
        workers,
        seed: 7,
        report_interval: 1,
        snapshot_interval: 1,
    }
}

fn road(s: &str) -> Road {
    s.parse().unwrap()
}

/// Records every callback so runs can be compared step by step.
#[derive(Default)]
struct Recorder {
    info:      Option<RunInfo>,
    reports:   Vec<StepReport>,
    snapshots: Vec<(Tick, Road)>,
    ended:     usize,
}

impl SimObserver for Recorder {
    fn on_start(&mut self, info: &RunInfo) {
        self.info = Some(info.clone());
    }
    fn on_report(&mut self, report: &StepReport) {
        self.reports.push(*report);
    }
    fn on_snapshot(&mut self, tick: Tick, road: &Road) {
        self.snapshots.push((tick, road.clone()));
    }
    fn on_sim_end(&mut self, _summary: &RunSummary) {
        self.ended += 1;
    }
}

fn run_distributed(config: SimConfig, initial: Road) -> (RunSummary, Recorder) {
    let sim = crate::SimBuilder::new(config).road(initial).timeout(GUARD).build().unwrap();
    let mut rec = Recorder::default();
    let summary = sim.run(&mut rec).unwrap();
    (summary, rec)
}

fn run_sequential(config: SimConfig, initial: Road) -> (RunSummary, Recorder) {
    let sim = crate::SimBuilder::new(config).road(initial).build_sequential().unwrap();
    let mut rec = Recorder::default();
    let summary = sim.run(&mut rec).unwrap();
    (summary, rec)
}

// ── Transition rule ───────────────────────────────────────────────────────────

#[cfg(test)]
mod rule_tests {
    use ca_comm::Ghosts;
    use ca_core::{Cell, Road, count_cars};

    use super::road;
    use crate::rule::{step_ring, step_segment};

    fn ring_once(s: &str) -> (String, u64) {
        let r = road(s);
        let mut next = vec![Cell::Empty; r.len()];
        let moved = step_ring(r.cells(), &mut next);
        (Road::from_cells(next).to_string(), moved)
    }

    #[test]
    fn alternating_road_advances_every_car() {
        assert_eq!(ring_once("1010101010"), ("0101010101".to_string(), 5));
    }

    #[test]
    fn last_car_wraps_to_first_cell() {
        assert_eq!(ring_once("0001"), ("1000".to_string(), 1));
    }

    #[test]
    fn only_the_front_of_a_queue_moves() {
        assert_eq!(ring_once("01110"), ("01101".to_string(), 1));
    }

    #[test]
    fn full_ring_is_gridlocked() {
        assert_eq!(ring_once("1111"), ("1111".to_string(), 0));
    }

    #[test]
    fn single_cell_ring_never_moves() {
        assert_eq!(ring_once("1"), ("1".to_string(), 0));
        assert_eq!(ring_once("0"), ("0".to_string(), 0));
    }

    #[test]
    fn segment_car_leaves_through_right_edge() {
        let current = road("101");
        let mut next = vec![Cell::Empty; 3];
        let moved = step_segment(
            current.cells(),
            &mut next,
            Ghosts { left: Cell::Empty, right: Cell::Empty },
        );
        assert_eq!(Road::from_cells(next).to_string(), "010");
        assert_eq!(moved, 2);
    }

    #[test]
    fn segment_car_enters_from_left_ghost() {
        let current = road("010");
        let mut next = vec![Cell::Empty; 3];
        let moved = step_segment(
            current.cells(),
            &mut next,
            Ghosts { left: Cell::Occupied, right: Cell::Empty },
        );
        assert_eq!(Road::from_cells(next).to_string(), "101");
        assert_eq!(moved, 1);
    }

    #[test]
    fn segment_blocked_by_right_ghost() {
        let current = road("011");
        let mut next = vec![Cell::Empty; 3];
        let moved = step_segment(
            current.cells(),
            &mut next,
            Ghosts { left: Cell::Empty, right: Cell::Occupied },
        );
        assert_eq!(Road::from_cells(next).to_string(), "011");
        assert_eq!(moved, 0);
    }

    #[test]
    fn occupied_first_cell_ignores_left_ghost() {
        let current = road("11");
        let mut next = vec![Cell::Empty; 2];
        step_segment(
            current.cells(),
            &mut next,
            Ghosts { left: Cell::Occupied, right: Cell::Occupied },
        );
        assert_eq!(count_cars(&next), 2);
    }

    #[test]
    fn one_cell_segment_is_its_own_ring_when_ghosts_are_itself() {
        let current = road("1");
        let mut next = vec![Cell::Empty; 1];
        let moved = step_segment(
            current.cells(),
            &mut next,
            Ghosts { left: Cell::Occupied, right: Cell::Occupied },
        );
        assert_eq!(next, vec![Cell::Occupied]);
        assert_eq!(moved, 0);
    }
}

// ── Double buffer, segment and phases ─────────────────────────────────────────

#[cfg(test)]
mod state_tests {
    use ca_comm::{Boundary, Ghosts};
    use ca_core::Cell;
    use ca_partition::SegmentSpan;

    use super::road;
    use crate::{DoubleBuffer, LocalSegment, SimError, WorkerPhase};

    #[test]
    fn buffer_swap_flips_slots_without_copying() {
        let mut buf = DoubleBuffer::new(vec![Cell::Occupied, Cell::Empty]);
        assert_eq!(buf.generation(), 0);
        {
            let (current, next) = buf.split();
            assert_eq!(current, &[Cell::Occupied, Cell::Empty]);
            next.copy_from_slice(&[Cell::Empty, Cell::Occupied]);
        }
        assert_eq!(buf.current(), &[Cell::Occupied, Cell::Empty]);
        buf.swap();
        assert_eq!(buf.generation(), 1);
        assert_eq!(buf.current(), &[Cell::Empty, Cell::Occupied]);
        assert_eq!(buf.into_current(), vec![Cell::Empty, Cell::Occupied]);
    }

    #[test]
    fn segment_rejects_wrong_length() {
        let err = LocalSegment::new(SegmentSpan { offset: 5, len: 5 }, vec![Cell::Empty; 4]);
        assert!(matches!(err, Err(SimError::SegmentLength { expected: 5, got: 4, .. })));
    }

    #[test]
    fn segment_evaluate_then_swap() {
        let cells = road("1100").cells().to_vec();
        let mut seg = LocalSegment::new(SegmentSpan { offset: 0, len: 4 }, cells).unwrap();
        assert_eq!(seg.boundary(), Boundary { first: Cell::Occupied, last: Cell::Empty });

        seg.set_ghosts(Ghosts { left: Cell::Empty, right: Cell::Empty });
        let moved = seg.evaluate();
        assert_eq!(moved, 1);
        // Not visible until the swap.
        assert_eq!(seg.cells(), road("1100").cells());

        seg.swap();
        assert_eq!(seg.cells(), road("1010").cells());
        assert_eq!(seg.generation(), 1);
        assert_eq!(seg.car_count(), 2);
    }

    #[test]
    fn phase_transitions() {
        use WorkerPhase::*;
        assert!(Initialized.can_advance_to(Exchange));
        assert!(Evaluate.can_advance_to(Report));
        assert!(Evaluate.can_advance_to(Swap));
        assert!(Swap.can_advance_to(Finalize));
        assert!(!Exchange.can_advance_to(Swap));
        assert!(!Report.can_advance_to(Exchange));
        assert!(!Finalize.can_advance_to(Exchange));
    }
}

// ── Builder validation ────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use ca_comm::Delivery;
    use ca_core::{CommMode, SimConfig};
    use ca_partition::PartitionError;

    use super::{config, road};
    use crate::{SimBuilder, SimError};

    #[test]
    fn builds_with_generated_road() {
        let sim = SimBuilder::new(config(50, 10, 4, CommMode::Async)).build().unwrap();
        assert_eq!(sim.road.len(), 50);
        assert_eq!(sim.layout.workers(), 4);
        assert_eq!(sim.comm.delivery, Delivery::Buffered);
    }

    #[test]
    fn same_seed_same_road_regardless_of_workers() {
        let a = SimBuilder::new(config(64, 1, 1, CommMode::Async)).build().unwrap();
        let b = SimBuilder::new(config(64, 1, 8, CommMode::Sync)).build().unwrap();
        assert_eq!(a.road, b.road);
    }

    #[test]
    fn sync_defaults_to_rendezvous() {
        let sim = SimBuilder::new(config(10, 1, 2, CommMode::Sync)).build().unwrap();
        assert_eq!(sim.comm.delivery, Delivery::Rendezvous);
    }

    #[test]
    fn road_length_mismatch_errors() {
        let result = SimBuilder::new(config(10, 1, 2, CommMode::Async)).road(road("0101")).build();
        assert!(matches!(result, Err(SimError::RoadLengthMismatch { expected: 10, got: 4 })));
    }

    #[test]
    fn invalid_config_errors() {
        let bad = SimConfig { density: 0.0, ..SimConfig::default() };
        assert!(matches!(SimBuilder::new(bad).build(), Err(SimError::Core(_))));

        let too_many = config(4, 1, 5, CommMode::Async);
        assert!(SimBuilder::new(too_many).build().is_err());
    }

    #[test]
    fn async_over_rendezvous_is_rejected() {
        let result = SimBuilder::new(config(10, 1, 2, CommMode::Async))
            .delivery(Delivery::Rendezvous)
            .build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn sync_over_buffered_is_allowed() {
        let sim = SimBuilder::new(config(10, 1, 2, CommMode::Sync))
            .delivery(Delivery::Buffered)
            .build()
            .unwrap();
        assert_eq!(sim.comm.delivery, Delivery::Buffered);
    }

    #[test]
    fn partition_error_converts() {
        let err: SimError = PartitionError::NoWorkers.into();
        assert!(matches!(err, SimError::Partition(PartitionError::NoWorkers)));
    }
}

// ── Distributed runs ──────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use ca_core::{CommMode, Road, RoadRng, SimConfig, Tick};

    use super::{config, road, run_distributed, run_sequential};
    use crate::SimBuilder;

    #[test]
    fn golden_two_worker_step() {
        for mode in [CommMode::Async, CommMode::Sync] {
            let (summary, rec) = run_distributed(config(10, 1, 2, mode), road("1010101010"));
            assert_eq!(summary.final_road, road("0101010101"), "mode {mode}");
            assert_eq!(rec.snapshots, vec![(Tick(0), road("0101010101"))]);
            assert_eq!(rec.reports.len(), 1);
            assert_eq!(rec.reports[0].moved, 5);
            assert_eq!(rec.reports[0].velocity, 1.0);
        }
    }

    #[test]
    fn cars_are_conserved_every_step() {
        let initial = RoadRng::new(3).road(53, 0.4);
        let cars = initial.car_count();
        let (summary, rec) = run_distributed(config(53, 40, 5, CommMode::Async), initial);
        assert_eq!(summary.info.total_cars, cars);
        assert_eq!(rec.snapshots.len(), 40);
        for (tick, snap) in &rec.snapshots {
            assert_eq!(snap.car_count(), cars, "at {tick}");
        }
        assert_eq!(summary.final_road.car_count(), cars);
    }

    #[test]
    fn matches_sequential_oracle_for_many_worker_counts() {
        let initial = RoadRng::new(11).road(37, 0.5);
        let (_, oracle) = run_sequential(config(37, 30, 1, CommMode::Async), initial.clone());

        // 37 is prime, so no P > 1 divides it evenly.
        for workers in [1, 2, 3, 4, 5, 8, 17, 37] {
            for mode in [CommMode::Async, CommMode::Sync] {
                let (summary, rec) = run_distributed(config(37, 30, workers, mode), initial.clone());
                assert_eq!(rec.snapshots, oracle.snapshots, "P={workers} mode={mode}");
                assert_eq!(rec.reports, oracle.reports, "P={workers} mode={mode}");
                assert_eq!(summary.final_road, oracle.snapshots[29].1);
            }
        }
    }

    #[test]
    fn strategies_agree_on_trajectory() {
        let initial = RoadRng::new(99).road(64, 0.6);
        let (_, a) = run_distributed(config(64, 25, 4, CommMode::Async), initial.clone());
        let (_, s) = run_distributed(config(64, 25, 4, CommMode::Sync), initial);
        assert_eq!(a.snapshots, s.snapshots);
        assert_eq!(a.reports, s.reports);
    }

    #[test]
    fn sync_completes_for_awkward_ring_sizes() {
        for workers in [1, 2, 3, 4, 8, 17] {
            let cfg = SimConfig { snapshot_interval: 0, ..config(40, 20, workers, CommMode::Sync) };
            let sim = SimBuilder::new(cfg).timeout(super::GUARD).build().unwrap();
            let summary = sim.run(&mut crate::NoopObserver).unwrap();
            assert_eq!(summary.exchange.len(), workers);
            assert!(summary.exchange.iter().all(|s| s.exchanges == 20 && s.operations() == 80));
        }
    }

    #[test]
    fn full_road_is_gridlocked() {
        let cfg = SimConfig { density: 1.0, ..config(24, 15, 3, CommMode::Async) };
        let sim = SimBuilder::new(cfg).timeout(super::GUARD).build().unwrap();
        assert_eq!(sim.road.car_count(), 24);

        let mut rec = super::Recorder::default();
        let summary = sim.run(&mut rec).unwrap();
        assert_eq!(rec.reports.len(), 15);
        assert!(rec.reports.iter().all(|r| r.moved == 0 && r.velocity == 0.0));
        assert_eq!(summary.final_road, sim.road);
    }

    #[test]
    fn reports_on_interval_and_final_tick() {
        let cfg = SimConfig { report_interval: 4, snapshot_interval: 0, ..config(20, 10, 2, CommMode::Async) };
        let (summary, rec) = run_distributed(cfg, RoadRng::new(1).road(20, 0.5));
        let ticks: Vec<u64> = rec.reports.iter().map(|r| r.tick.0).collect();
        assert_eq!(ticks, vec![0, 4, 8, 9]);
        assert!(rec.snapshots.is_empty());
        assert_eq!(summary.final_report().map(|r| r.tick), Some(Tick(9)));
    }

    #[test]
    fn observer_sees_one_start_and_one_end() {
        let (summary, rec) = run_distributed(config(12, 3, 3, CommMode::Sync), road("110011001100"));
        let info = rec.info.unwrap();
        assert_eq!(info.total_cars, 6);
        assert_eq!(info.workers, 3);
        assert_eq!(info.mode, Some(CommMode::Sync));
        assert_eq!(rec.ended, 1);
        assert_eq!(summary.reports.len(), 3);
    }

    #[test]
    fn sim_can_run_twice() {
        let sim = SimBuilder::new(config(30, 12, 3, CommMode::Async)).timeout(super::GUARD).build().unwrap();
        let first = sim.run(&mut crate::NoopObserver).unwrap();
        let second = sim.run(&mut crate::NoopObserver).unwrap();
        assert_eq!(first.final_road, second.final_road);
        assert_eq!(first.reports, second.reports);
    }

    #[test]
    fn empty_road_reports_zero_velocity() {
        let (summary, rec) = run_distributed(config(8, 4, 2, CommMode::Async), Road::empty(8));
        assert_eq!(summary.info.total_cars, 0);
        assert!(rec.reports.iter().all(|r| r.velocity == 0.0));
    }

    #[test]
    fn sequential_reports_no_mode_and_no_exchange() {
        let (summary, rec) = run_sequential(config(10, 2, 1, CommMode::Async), road("1010101010"));
        assert_eq!(rec.info.unwrap().mode, None);
        assert!(summary.exchange.is_empty());
        assert_eq!(summary.final_road, road("1010101010"));
    }
}

// ── Abort handling ────────────────────────────────────────────────────────────

#[cfg(test)]
mod abort_tests {
    use std::time::Duration;

    use ca_comm::{
        AsyncExchange, Boundary, CommError, CommResult, ExchangeStats, Ghosts, HaloExchange, Op,
        ParityExchange, Transport,
    };
    use ca_core::{CommMode, Rank};

    use super::config;
    use crate::sim::root_cause;
    use crate::{NoopObserver, SimBuilder, SimError};

    /// What a [`Sabotaged`] rank does once it reaches its step.
    #[derive(Clone, Copy)]
    enum Fault {
        Fail,
        Panic,
    }

    /// Delegates to `inner`, except on `rank` at step `at_step`.
    #[derive(Clone)]
    struct Sabotaged<H> {
        inner:   H,
        rank:    Rank,
        at_step: u64,
        fault:   Fault,
        steps:   u64,
    }

    impl<H> Sabotaged<H> {
        fn new(inner: H, rank: Rank, at_step: u64, fault: Fault) -> Self {
            Self { inner, rank, at_step, fault, steps: 0 }
        }
    }

    impl<H: HaloExchange> HaloExchange for Sabotaged<H> {
        fn name(&self) -> &'static str {
            self.inner.name()
        }

        fn exchange<T: Transport + ?Sized>(&mut self, transport: &T, boundary: Boundary) -> CommResult<Ghosts> {
            if transport.rank() == self.rank && self.steps == self.at_step {
                match self.fault {
                    Fault::Fail => {
                        return Err(CommError::SizeMismatch {
                            peer:     transport.left(),
                            op:       Op::Recv,
                            expected: 1,
                            got:      2,
                        });
                    }
                    Fault::Panic => panic!("rank {} gave up", self.rank.0),
                }
            }
            self.steps += 1;
            self.inner.exchange(transport, boundary)
        }

        fn stats(&self) -> ExchangeStats {
            self.inner.stats()
        }
    }

    /// Five workers, no timeout: a hang here would hang the test.
    fn run_sabotaged<H: HaloExchange>(mode: CommMode, inner: H, fault: Fault) -> SimError {
        let sim = SimBuilder::new(config(40, 10, 5, mode)).build().unwrap();
        sim.run_with(Sabotaged::new(inner, Rank(2), 4, fault), &mut NoopObserver).unwrap_err()
    }

    #[test]
    fn failing_rank_aborts_async_run() {
        let err = run_sabotaged(CommMode::Async, AsyncExchange::default(), Fault::Fail);
        assert!(
            matches!(err, SimError::Comm { rank: Rank(2), source: CommError::SizeMismatch { expected: 1, got: 2, .. } }),
            "{err}"
        );
    }

    #[test]
    fn failing_rank_aborts_sync_run() {
        let err = run_sabotaged(CommMode::Sync, ParityExchange::default(), Fault::Fail);
        assert!(
            matches!(err, SimError::Comm { rank: Rank(2), source: CommError::SizeMismatch { expected: 1, got: 2, .. } }),
            "{err}"
        );
    }

    #[test]
    fn panicking_rank_is_reported() {
        for (mode, err) in [
            (CommMode::Async, run_sabotaged(CommMode::Async, AsyncExchange::default(), Fault::Panic)),
            (CommMode::Sync, run_sabotaged(CommMode::Sync, ParityExchange::default(), Fault::Panic)),
        ] {
            assert!(matches!(err, SimError::WorkerPanicked(Rank(2))), "{mode}: {err}");
        }
    }

    fn disconnect(rank: u32) -> SimError {
        SimError::Comm {
            rank:   Rank(rank),
            source: CommError::PeerDisconnected { peer: Rank(0), op: Op::Recv },
        }
    }

    #[test]
    fn real_failure_beats_echoed_disconnects() {
        let timeout = SimError::Comm {
            rank:   Rank(2),
            source: CommError::Timeout { peer: Rank(1), op: Op::Send, after: Duration::from_millis(5) },
        };
        let picked = root_cause(vec![disconnect(0), disconnect(1), timeout]).unwrap();
        assert!(matches!(picked, SimError::Comm { rank: Rank(2), source: CommError::Timeout { .. } }));
    }

    #[test]
    fn panicked_worker_is_not_a_disconnect() {
        let picked = root_cause(vec![disconnect(0), SimError::WorkerPanicked(Rank(3))]).unwrap();
        assert!(matches!(picked, SimError::WorkerPanicked(Rank(3))));
    }

    #[test]
    fn only_disconnects_returns_the_first() {
        let picked = root_cause(vec![disconnect(4), disconnect(5)]).unwrap();
        assert!(matches!(picked, SimError::Comm { rank: Rank(4), .. }));
        assert!(picked.is_disconnect());
    }

    #[test]
    fn no_errors_no_cause() {
        assert!(root_cause(Vec::new()).is_none());
    }
}

// ── Property tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use ca_comm::{Boundary, Ghosts};
    use ca_core::{Cell, Rank, count_cars};
    use ca_partition::{PartitionLayout, Topology};
    use proptest::prelude::*;

    use crate::rule::{step_ring, step_segment};

    /// One decomposed step done by hand: slice the road, hand every segment
    /// the boundary cells of its ring neighbours, then concatenate.
    fn decomposed_step(cells: &[Cell], workers: usize) -> (Vec<Cell>, u64) {
        let layout = PartitionLayout::new(cells.len(), workers).unwrap();
        let ring = Topology::ring(workers).unwrap();
        let boundaries: Vec<Boundary> = layout
            .segments()
            .map(|(_, span)| Boundary::of(&cells[span.range()]))
            .collect();

        let mut next = vec![Cell::Empty; cells.len()];
        let mut moved = 0;
        for (rank, span) in layout.segments() {
            let ghosts = Ghosts {
                left:  boundaries[ring.left(rank).index()].last,
                right: boundaries[ring.right(rank).index()].first,
            };
            moved += step_segment(&cells[span.range()], &mut next[span.range()], ghosts);
        }
        (next, moved)
    }

    fn road_and_workers() -> impl Strategy<Value = (Vec<Cell>, usize)> {
        prop::collection::vec(any::<bool>(), 1..64).prop_flat_map(|bits| {
            let n = bits.len();
            let cells: Vec<Cell> = bits.into_iter().map(Cell::from).collect();
            (Just(cells), 1..=n)
        })
    }

    proptest! {
        #[test]
        fn segments_agree_with_ring((cells, workers) in road_and_workers()) {
            let mut expected = vec![Cell::Empty; cells.len()];
            let ring_moved = step_ring(&cells, &mut expected);
            let (got, moved) = decomposed_step(&cells, workers);
            prop_assert_eq!(got, expected);
            prop_assert_eq!(moved, ring_moved);
        }

        #[test]
        fn ring_step_conserves_cars(bits in prop::collection::vec(any::<bool>(), 1..128)) {
            let cells: Vec<Cell> = bits.into_iter().map(Cell::from).collect();
            let mut next = vec![Cell::Empty; cells.len()];
            let moved = step_ring(&cells, &mut next);
            prop_assert_eq!(count_cars(&next), count_cars(&cells));
            prop_assert!(moved <= count_cars(&cells));
        }
    }

    #[test]
    fn root_rank_ghosts_wrap_around() {
        let ring = Topology::ring(3).unwrap();
        assert_eq!(ring.left(Rank(0)), Rank(2));
        assert_eq!(ring.right(Rank(2)), Rank(0));
    }
}
