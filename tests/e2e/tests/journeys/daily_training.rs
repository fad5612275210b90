//! Journey: a learner trains a little every day
//!
//! New positions enter at most ten at a time, first-try solves climb the
//! ladder to level 3, and each review comes back exactly when its interval
//! has elapsed.

use chrono::Duration;
use gambit_core::{
    mastery_level, AttemptOutcome, CorpusFilter, PerformanceStore, QueueMode, TrainingSession,
};
use gambit_e2e_tests::{TestDataFactory, TestDatabaseManager};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Solve every live exposure with the expected move
fn solve_all<S: PerformanceStore, C: gambit_core::Clock>(session: &mut TrainingSession<'_, S, C>) -> usize {
    let mut solved = 0;
    while let Some(exposure) = session.current() {
        let best = exposure.position().best_move.clone();
        match session.submit_move(&best).unwrap() {
            AttemptOutcome::Solved(_) => solved += 1,
            other => panic!("expected a solve, got {:?}", other),
        }
    }
    solved
}

#[test]
fn test_new_positions_are_capped_per_queue() {
    let db = TestDatabaseManager::new_temp();
    let clock = TestDataFactory::clock();
    let scheduler = db.scheduler(clock);
    let corpus = TestDataFactory::corpus(25);
    let mut rng = StdRng::seed_from_u64(1);

    let queue = scheduler
        .build_queue(&corpus.filtered(&CorpusFilter::all()), &mut rng)
        .unwrap();

    assert_eq!(queue.len(), 10);
    assert_eq!(queue.metrics.new_count, 25);
    assert_eq!(queue.metrics.due_count, 0);
    assert_eq!(queue.metrics.total_count, 25);
    assert_eq!(queue.mode, QueueMode::Scheduled);

    // First ten in corpus order win
    let mut indexes: Vec<usize> = queue.items.iter().map(|i| i.position.index).collect();
    indexes.sort_unstable();
    assert_eq!(indexes, (0..10).collect::<Vec<_>>());
}

#[test]
fn test_first_try_solves_climb_the_ladder() {
    let db = TestDatabaseManager::new_temp();
    let clock = TestDataFactory::clock();
    let scheduler = db.scheduler(clock.clone());
    let corpus = TestDataFactory::corpus(3);
    let active = corpus.filtered(&CorpusFilter::all());
    let mut rng = StdRng::seed_from_u64(2);

    // Day 0: everything is new
    let mut session = TrainingSession::start(&scheduler, active.clone(), &mut rng).unwrap();
    assert_eq!(session.metrics().new_count, 3);
    assert_eq!(solve_all(&mut session), 3);
    session.refresh(&mut rng).unwrap();
    assert!(session.is_caught_up());
    session.finish();

    let level_of = |index: usize| {
        let record = db.storage.get(&active[index].problem_id()).unwrap();
        mastery_level(record.as_ref()).value()
    };
    assert_eq!(level_of(0), 1);

    // Day 1: level 1 means one day
    clock.advance(Duration::days(1));
    let mut session = TrainingSession::start(&scheduler, active.clone(), &mut rng).unwrap();
    assert_eq!(session.metrics().due_count, 3);
    assert_eq!(solve_all(&mut session), 3);
    session.finish();
    assert_eq!(level_of(1), 2);

    // Level 2 means three days: not yet on day 3, due on day 4
    clock.advance(Duration::days(2));
    let queue = scheduler.build_queue(&active, &mut rng).unwrap();
    assert!(queue.is_caught_up());

    clock.advance(Duration::days(1));
    let mut session = TrainingSession::start(&scheduler, active.clone(), &mut rng).unwrap();
    assert_eq!(session.metrics().due_count, 3);
    solve_all(&mut session);
    session.finish();
    assert_eq!(level_of(2), 3);

    // First-try mastery stops at level 3 (seven days)
    clock.advance(Duration::days(7));
    let mut session = TrainingSession::start(&scheduler, active.clone(), &mut rng).unwrap();
    solve_all(&mut session);
    session.finish();
    assert_eq!(level_of(0), 3);

    clock.advance(Duration::days(6));
    assert!(scheduler.build_queue(&active, &mut rng).unwrap().is_caught_up());
    clock.advance(Duration::days(1));
    assert_eq!(scheduler.build_queue(&active, &mut rng).unwrap().metrics.due_count, 3);
}

#[test]
fn test_queue_refills_after_new_batch() {
    let db = TestDatabaseManager::new_temp();
    let clock = TestDataFactory::clock();
    let scheduler = db.scheduler(clock);
    let corpus = TestDataFactory::corpus(14);
    let mut rng = StdRng::seed_from_u64(3);

    let mut session =
        TrainingSession::start(&scheduler, corpus.filtered(&CorpusFilter::all()), &mut rng).unwrap();
    assert_eq!(solve_all(&mut session), 10);

    let metrics = session.refresh(&mut rng).unwrap();
    assert_eq!(metrics.new_count, 4);
    assert_eq!(session.remaining(), 4);
    assert_eq!(solve_all(&mut session), 4);

    let record = session.finish();
    assert_eq!(record.completed_problems, 14);
    assert_eq!(record.correct_answers, 14);
    db.storage.save_session(&record).unwrap();

    let stats = db.storage.get_stats().unwrap();
    assert_eq!(stats.total_problems, 14);
    assert_eq!(stats.current_streak, 14);
    assert!((stats.success_rate - 100.0).abs() < 1e-9);
    assert_eq!(db.storage.list_sessions(5).unwrap().len(), 1);
}

#[test]
fn test_filtered_corpus_only_schedules_matching_positions() {
    let db = TestDatabaseManager::new_temp();
    let scheduler = db.scheduler(TestDataFactory::clock());
    let corpus = TestDataFactory::corpus(12);
    let filter = CorpusFilter {
        error_types: Some(vec![gambit_core::ErrorType::Blunder]),
        player_color: None,
    };
    let active = corpus.filtered(&filter);
    let mut rng = StdRng::seed_from_u64(4);

    let queue = scheduler.build_queue(&active, &mut rng).unwrap();
    assert_eq!(queue.metrics.total_count, 4);
    assert!(queue
        .items
        .iter()
        .all(|item| item.position.error_type == gambit_core::ErrorType::Blunder));
}
