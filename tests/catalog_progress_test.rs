//! Integration test: puzzle packs and progress tracking
//!
//! Loads a pack from disk, solves a puzzle from it, and feeds the result
//! into the progress stats.

use puzzle_trainer::progress::PuzzleProgress;
use puzzle_trainer::puzzle::{CatalogError, GamePhase, PuzzleCatalog, PuzzleDifficulty, PuzzleFilter};
use puzzle_trainer::rules::BoardRules;
use puzzle_trainer::solve::{AttemptOutcome, PuzzleSolveEngine, SolveEvent};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs;

const PACK: &str = r#"[
    {
        "id": "back-rank",
        "title": "Back Rank",
        "startingPosition": "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1",
        "solutionSteps": [
            {"expectedMoveNotation": "Ra8#", "actor": "human", "originSquare": "a1", "destinationSquare": "a8"}
        ],
        "difficulty": "novice",
        "theme": "backRank",
        "phase": "endgame"
    }
]"#;

#[test]
fn test_pack_from_disk_solves_and_records() {
    let path = std::env::temp_dir().join(format!("trainer_pack_{}.json", std::process::id()));
    fs::write(&path, PACK).unwrap();
    let catalog = PuzzleCatalog::load(&path).unwrap();
    fs::remove_file(&path).ok();

    let puzzle = catalog.get("back-rank").unwrap().clone();
    let mut progress = PuzzleProgress::default();
    progress.record_started(&puzzle.id);

    let mut engine = PuzzleSolveEngine::create(puzzle, BoardRules::new()).unwrap();
    let outcome = engine
        .attempt_move("a1".parse().unwrap(), "a8".parse().unwrap(), None)
        .unwrap();
    assert_eq!(outcome, AttemptOutcome::Solved);

    for event in engine.drain_events() {
        if let SolveEvent::Solved(record) = event {
            progress.record_solved(&record);
        }
    }
    assert!(progress.is_solved("back-rank"));
    assert_eq!(progress.get("back-rank").unwrap().best_failed_attempts, Some(0));

    let json = serde_json::to_string(&progress).unwrap();
    let restored: PuzzleProgress = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, progress);
}

#[test]
fn test_missing_pack_is_io_error() {
    let path = std::env::temp_dir().join("trainer_pack_that_does_not_exist.json");
    assert!(matches!(PuzzleCatalog::load(&path), Err(CatalogError::Io(_))));
}

#[test]
fn test_builtin_filters() {
    let catalog = PuzzleCatalog::builtin().unwrap();
    let novice = catalog.filter(&PuzzleFilter::default().difficulty(PuzzleDifficulty::Novice));
    assert!(novice.iter().all(|p| p.difficulty == PuzzleDifficulty::Novice));
    assert!(novice.len() >= 2);

    let endgames = catalog.filter(&PuzzleFilter::default().phase(GamePhase::Endgame));
    assert!(endgames.iter().any(|p| p.id == "rook-ladder"));

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let order = catalog.practice_order(&PuzzleFilter::default(), &mut rng);
    assert_eq!(order.len(), catalog.len());
}
