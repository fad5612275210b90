//! Journey: positions the learner keeps missing
//!
//! Missed positions stay due, rank ahead of comfortable ones, and recover
//! only to a capped mastery level.

use chrono::Duration;
use gambit_core::{
    classify, mastery_level, rank, AttemptOutcome, AttemptState, Clock, CorpusFilter, OverrideKind,
    PerformanceStore, TrainingSession,
};
use gambit_e2e_tests::{TestDataFactory, TestDatabaseManager};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_three_misses_reveal_and_keep_position_due() {
    let db = TestDatabaseManager::new_temp();
    let clock = TestDataFactory::clock();
    let scheduler = db.scheduler(clock);
    let corpus = TestDataFactory::corpus(1);
    let active = corpus.filtered(&CorpusFilter::all());
    let mut rng = StdRng::seed_from_u64(21);

    let mut session = TrainingSession::start(&scheduler, active.clone(), &mut rng).unwrap();
    let id = active[0].problem_id();

    for remaining in [2, 1] {
        match session.submit_move("a1a1").unwrap() {
            AttemptOutcome::Incorrect { attempts_remaining } => assert_eq!(attempts_remaining, remaining),
            other => panic!("expected a miss, got {:?}", other),
        }
        assert_eq!(session.current().unwrap().state(), AttemptState::Attempting);
    }

    match session.submit_move("a1a1").unwrap() {
        AttemptOutcome::AutoRevealed { best_move, event } => {
            assert_eq!(best_move, active[0].best_move);
            assert!(event.was_auto_revealed);
            assert!(!event.was_correct);
            assert_eq!(event.attempts, 3);
        }
        other => panic!("expected auto-reveal, got {:?}", other),
    }

    // One completion, one store update
    let record = db.storage.get(&id).unwrap().unwrap();
    assert_eq!(record.attempts, 1);
    assert!(!record.solved);
    assert_eq!(mastery_level(Some(&record)).value(), 0);

    // Unsolved means due again at once
    let metrics = session.refresh(&mut rng).unwrap();
    assert_eq!(metrics.due_count, 1);
    assert_eq!(session.current().unwrap().position().problem_id(), id);

    let summary = session.finish();
    assert_eq!(summary.auto_revealed, 1);
    assert_eq!(summary.total_attempts, 3);
}

#[test]
fn test_struggling_positions_rank_first() {
    let db = TestDatabaseManager::new_temp();
    let clock = TestDataFactory::clock();
    let t = TestDataFactory::base_time();
    let corpus = TestDataFactory::corpus(3);
    let active = corpus.filtered(&CorpusFilter::all());

    // Missed three times, last seen two days ago
    db.seed_history(
        &active[0],
        &[
            (false, t - Duration::days(4)),
            (false, t - Duration::days(3)),
            (false, t - Duration::days(2)),
        ],
    );
    // Recovered after an early miss, last seen ten days ago
    db.seed_history(
        &active[1],
        &[
            (false, t - Duration::days(14)),
            (true, t - Duration::days(13)),
            (false, t - Duration::days(12)),
            (true, t - Duration::days(11)),
            (true, t - Duration::days(10)),
        ],
    );
    // Solved on sight two days ago
    db.seed_history(&active[2], &[(true, t - Duration::days(2))]);

    let snapshot = db.storage.snapshot().unwrap();
    let classification = classify(&active, &snapshot, clock.today());
    assert_eq!(classification.due.len(), 3);

    let ranked = rank(classification.due);
    let order: Vec<(usize, i64)> = ranked
        .iter()
        .map(|item| (item.position.index, item.priority.unwrap()))
        .collect();
    assert_eq!(order, vec![(0, 185), (1, 155), (2, 95)]);

    // The scheduler carries the same scores into the shuffled queue
    let scheduler = db.scheduler(clock);
    let queue = scheduler
        .build_queue(&active, &mut StdRng::seed_from_u64(22))
        .unwrap();
    assert_eq!(queue.metrics.due_count, 3);
    let score_of = |index: usize| {
        queue
            .items
            .iter()
            .find(|item| item.position.index == index)
            .and_then(|item| item.priority)
    };
    assert_eq!(score_of(1), Some(155));
}

#[test]
fn test_recovery_is_capped_below_first_try() {
    let db = TestDatabaseManager::new_temp();
    let t = TestDataFactory::base_time();
    let position = TestDataFactory::position(0);

    let outcomes: Vec<(bool, chrono::DateTime<chrono::Utc>)> = std::iter::once((false, t))
        .chain((1..=9).map(|d| (true, t + Duration::days(d))))
        .collect();
    db.seed_history(&position, &outcomes);

    let record = db.storage.get(&position.problem_id()).unwrap().unwrap();
    assert_eq!(record.attempts, 10);
    assert!(!record.first_try_solved);
    assert_eq!(mastery_level(Some(&record)).value(), 2);
}

#[test]
fn test_streaks_and_categories_follow_misses() {
    let db = TestDatabaseManager::new_temp();
    let clock = TestDataFactory::clock();
    let scheduler = db.scheduler(clock);
    let corpus = TestDataFactory::corpus(3);
    let mut rng = StdRng::seed_from_u64(23);

    let mut session =
        TrainingSession::start(&scheduler, corpus.filtered(&CorpusFilter::all()), &mut rng).unwrap();

    // Solve, solve, then give up on the last one
    for _ in 0..2 {
        let best = session.current().unwrap().position().best_move.clone();
        session.submit_move(&best).unwrap();
    }
    session.override_completion(OverrideKind::Skip).unwrap();
    let summary = session.finish();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.revealed, 0);

    let stats = db.storage.get_stats().unwrap();
    assert_eq!(stats.total_attempts, 3);
    assert_eq!(stats.total_correct, 2);
    assert_eq!(stats.current_streak, 0);
    assert_eq!(stats.best_streak, 2);
    assert_eq!(stats.total_problems, 2);

    let categories = db.storage.category_stats().unwrap();
    let attempts_by_type: i64 = categories
        .iter()
        .filter(|c| c.category_type == "error_type")
        .map(|c| c.attempts)
        .sum();
    assert_eq!(attempts_by_type, 3);
    let colors: Vec<&str> = categories
        .iter()
        .filter(|c| c.category_type == "player_color")
        .map(|c| c.category_value.as_str())
        .collect();
    assert_eq!(colors, vec!["black", "white"]);

    let today = db.storage.daily_stats(1).unwrap();
    assert_eq!(today[0].attempts, 3);
    assert_eq!(today[0].problems, 2);
}
