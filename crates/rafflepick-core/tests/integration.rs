//! Integration tests for rafflepick-core.
//!
//! These drive complete sessions through the public API:
//! raw text → normalize/validate → config → engine on a manual clock → results.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use rafflepick_core::{
    DrawConfig, DrawEngine, DrawEvent, DrawResults, ManualClock, Phase, Shell, Timings,
    ValidationError, View, WinnerRecord, normalize, validate_participants,
};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Run a whole session, starting each round as soon as the engine waits.
/// Returns the winners from the single `Completed` event.
fn run_session(engine: &mut DrawEngine<ManualClock>, clock: &ManualClock) -> Vec<WinnerRecord> {
    let mut completed = Vec::new();
    let mut rounds = 0;
    while engine.phase() != Phase::Complete {
        assert_eq!(engine.phase(), Phase::Waiting);
        engine.start().unwrap();
        while let Some(deadline) = engine.next_deadline() {
            clock.set(deadline);
            for event in engine.poll().unwrap() {
                if let DrawEvent::Completed(w) = event {
                    completed.push(w);
                }
            }
        }
        rounds += 1;
        assert!(rounds <= engine.config().winners_count, "too many rounds");
    }
    assert_eq!(completed.len(), 1, "Completed must be emitted exactly once");
    completed.pop().unwrap()
}

fn session(raw: &str, winners: usize, countdown: bool, seed: u64) -> Vec<WinnerRecord> {
    let pool = validate_participants(raw).unwrap();
    let config = DrawConfig::new(winners, countdown)
        .validate(pool.len())
        .unwrap();
    let clock = ManualClock::new();
    let mut engine =
        DrawEngine::new(pool, config, Timings::default(), clock.clone()).with_seed(seed);
    run_session(&mut engine, &clock)
}

#[test]
fn three_candidates_two_winners_no_countdown() {
    let pool = ["a@x.com", "b@x.com", "c@x.com"];
    let winners = session(&pool.join("\n"), 2, false, 1);

    assert_eq!(winners.len(), 2);
    assert_eq!(winners[0].position, 1);
    assert_eq!(winners[1].position, 2);
    assert_ne!(winners[0].candidate, winners[1].candidate);
    for w in &winners {
        assert!(pool.contains(&w.candidate.as_str()));
    }
}

#[test]
fn one_candidate_cannot_have_two_winners() {
    let pool = normalize("solo@x.com");
    assert_eq!(
        DrawConfig::new(2, true).validate(pool.len()),
        Err(ValidationError::WinnersOutOfRange {
            requested: 2,
            max: 1
        })
    );
}

#[test]
fn empty_input_blocks_submission() {
    assert!(normalize("").is_empty());
    let mut shell = Shell::new();
    assert_eq!(
        shell.submit_participants(""),
        Err(ValidationError::NoValidParticipants)
    );
    assert_eq!(shell.view(), View::Setup);
}

#[test]
fn every_valid_config_completes_with_contiguous_distinct_winners() {
    let all: Vec<String> = (0..8).map(|i| format!("p{i}@example.org")).collect();
    for pool_size in 2..=all.len() {
        let raw = all[..pool_size].join(";");
        for count in 1..=pool_size.min(5) {
            for countdown in [false, true] {
                let seed = (pool_size * 100 + count * 10) as u64 + u64::from(countdown);
                let winners = session(&raw, count, countdown, seed);

                assert_eq!(winners.len(), count);
                let positions: Vec<usize> = winners.iter().map(|w| w.position).collect();
                assert_eq!(positions, (1..=count).collect::<Vec<_>>());
                let distinct: HashSet<_> = winners.iter().map(|w| &w.candidate).collect();
                assert_eq!(distinct.len(), count);
                assert!(
                    winners
                        .iter()
                        .all(|w| all[..pool_size].contains(&w.candidate.to_string()))
                );
            }
        }
    }
}

#[test]
fn pool_shrinks_by_exactly_the_winners() {
    let raw = "a@x;b@x;c@x;d@x;e@x";
    let pool = validate_participants(raw).unwrap();
    let clock = ManualClock::new();
    let mut engine = DrawEngine::new(
        pool.clone(),
        DrawConfig::new(3, true),
        Timings::default(),
        clock.clone(),
    );
    let winners = run_session(&mut engine, &clock);

    let remaining: HashSet<_> = engine.session().available_pool().iter().collect();
    assert_eq!(remaining.len(), 2);
    for w in &winners {
        assert!(!remaining.contains(&w.candidate));
    }
    let mut union: Vec<_> = remaining.into_iter().cloned().collect();
    union.extend(winners.into_iter().map(|w| w.candidate));
    union.sort();
    let mut original = pool;
    original.sort();
    assert_eq!(union, original);
}

#[test]
fn session_takes_expected_wall_time() {
    let pool = validate_participants("a@x;b@x;c@x").unwrap();
    let clock = ManualClock::new();
    let config = DrawConfig::new(2, true);
    let timings = Timings::default();
    let mut engine = DrawEngine::new(pool, config, timings, clock.clone());
    run_session(&mut engine, &clock);
    assert_eq!(
        rafflepick_core::Clock::now(&clock),
        timings.session_length(&config)
    );
}

#[test]
fn reset_after_completion_is_idempotent() {
    let pool = validate_participants("a@x;b@x;c@x").unwrap();
    let clock = ManualClock::new();
    let mut engine = DrawEngine::new(
        pool.clone(),
        DrawConfig::new(2, false),
        Timings::default(),
        clock.clone(),
    );
    run_session(&mut engine, &clock);

    for _ in 0..2 {
        engine.reset();
        let s = engine.session();
        assert_eq!(s.phase(), Phase::Waiting);
        assert_eq!(s.current_position(), 1);
        assert_eq!(s.available_pool(), pool.as_slice());
        assert!(s.winners().is_empty());
    }

    // And the engine is fully usable again.
    let winners = run_session(&mut engine, &clock);
    assert_eq!(winners.len(), 2);
}

#[test]
fn seeded_sessions_are_reproducible() {
    let raw = "a@x;b@x;c@x;d@x;e@x;f@x;g@x";
    assert_eq!(session(raw, 5, true, 99), session(raw, 5, false, 99));
}

#[test]
fn shell_and_engine_end_to_end() {
    let mut shell = Shell::new();
    shell
        .submit_participants("ana@example.com, bo@example.com; cy@example.com")
        .unwrap();
    shell.submit_config(DrawConfig::new(2, true)).unwrap();
    assert_eq!(shell.view(), View::Live);

    let clock = ManualClock::new();
    let mut engine = DrawEngine::new(
        shell.participants().to_vec(),
        shell.config(),
        Timings::with_unit(Duration::from_millis(10)),
        clock.clone(),
    );
    let winners = run_session(&mut engine, &clock);
    shell.complete(winners);

    let results: &DrawResults = shell.results().unwrap();
    assert_eq!(results.len(), 2);
    let csv = results.to_csv();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Position;Email"));
    assert!(lines.next().unwrap().starts_with("🥇 1st Place;"));
    assert!(lines.next().unwrap().starts_with("🥈 2nd Place;"));
    assert_eq!(lines.next(), None);
}

#[test]
fn selection_is_uniform() {
    let raw = "a@x;b@x;c@x;d@x;e@x";
    let trials = 5000u64;
    let mut counts: HashMap<String, u64> = HashMap::new();
    for seed in 0..trials {
        let pool = normalize(raw);
        let clock = ManualClock::new();
        let mut engine = DrawEngine::new(
            pool,
            DrawConfig::new(1, false),
            Timings::instant(),
            clock.clone(),
        )
        .with_seed(seed);
        let w = run_session(&mut engine, &clock);
        *counts.entry(w[0].candidate.to_string()).or_default() += 1;
    }

    assert_eq!(counts.len(), 5, "every candidate should win sometimes");
    let expected = trials as f64 / 5.0;
    let chi2: f64 = counts
        .values()
        .map(|&c| {
            let d = c as f64 - expected;
            d * d / expected
        })
        .sum();
    let p = 1.0 - ChiSquared::new(4.0).unwrap().cdf(chi2);
    assert!(p > 0.001, "winner distribution not uniform: chi2={chi2:.2} p={p:.5}");
}
