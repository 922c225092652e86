use puzzle_trainer::config::TrainerConfig;
use puzzle_trainer::progress::PuzzleProgress;
use puzzle_trainer::puzzle::{PuzzleCatalog, PuzzleFilter};
use puzzle_trainer::rules::{BoardRules, PromotionPiece, Square};
use puzzle_trainer::solve::{AttemptOutcome, PuzzleSolveEngine, SolveEvent};
use puzzle_trainer::utils::build_info;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

type Engine = PuzzleSolveEngine<BoardRules>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let result = match args.get(1).map(String::as_str) {
        None | Some("list") => list(),
        Some("solve") => solve(args.get(2).map(String::as_str)),
        Some("stats") => {
            stats();
            Ok(())
        }
        Some("--version") | Some("-v") => {
            println!(
                "puzzle_trainer {} ({})",
                build_info::BUILD_DATE,
                build_info::BUILD_COMMIT
            );
            Ok(())
        }
        Some("--help") | Some("-h") => {
            print_help();
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Run 'puzzle_trainer --help' for usage.");
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_help() {
    println!("Puzzle Trainer - Scripted Chess Puzzles\n");
    println!("Usage: puzzle_trainer [command]\n");
    println!("Commands:");
    println!("  list         List bundled puzzles (default)");
    println!("  solve [id]   Solve a puzzle (random if no id)");
    println!("  stats        Show saved progress");
    println!("  --version    Show version information");
    println!("  --help       Show this help message");
}

fn list() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = PuzzleCatalog::builtin()?;
    let progress = PuzzleProgress::load();
    for puzzle in catalog.iter() {
        let mark = if progress.is_solved(&puzzle.id) { "*" } else { " " };
        println!(
            "{} {:<16} {:<18} {:<11} {}",
            mark,
            puzzle.id,
            puzzle.title,
            puzzle.difficulty.name(),
            puzzle.theme
        );
    }
    Ok(())
}

fn stats() {
    let progress = PuzzleProgress::load();
    println!("Sessions started:  {}", progress.sessions_started);
    println!("Puzzles solved:    {}", progress.puzzles_solved);
    println!("Solutions watched: {}", progress.puzzles_assisted);
    println!("Failed attempts:   {}", progress.total_failed_attempts);
    println!("Solve rate:        {:.0}%", progress.solve_rate() * 100.0);
    for (id, record) in &progress.puzzles {
        println!(
            "  {:<16} solved {}/{}  best {}",
            id,
            record.times_solved,
            record.times_started,
            record
                .best_failed_attempts
                .map_or_else(|| "-".to_string(), |n| format!("{} misses", n))
        );
    }
}

fn solve(id: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = PuzzleCatalog::builtin()?;
    let puzzle = match id {
        Some(id) => catalog.get(id)?,
        None => catalog
            .random(&PuzzleFilter::default(), &mut rand::thread_rng())
            .ok_or("no puzzles available")?,
    };
    let config = TrainerConfig::load();
    let mut progress = PuzzleProgress::load();
    let mut engine = Engine::with_timing(puzzle.clone(), BoardRules::new(), config.timing())?;
    progress.record_started(&puzzle.id);

    println!("{} [{}]", puzzle.title, puzzle.difficulty.name());
    println!("Commands: <from><to>[promo], hint, retry, solution, restart, back, forward, fen, quit");
    run_pending(&mut engine, &config, &mut progress)?;
    print_status(&engine);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        match input {
            "" => {}
            "quit" | "q" => break,
            "fen" => println!("{}", engine.snapshot().current_position),
            "hint" => match engine.reveal_hint() {
                Ok(hint) => println!("Move the {:?} on {}", hint.moving_piece, hint.origin_square),
                Err(e) => println!("{}", e),
            },
            "retry" => report(engine.retry_after_incorrect()),
            "solution" => engine.play_full_solution(),
            "restart" => engine.restart(),
            "back" => report(engine.step_history_backward()),
            "forward" => report(engine.step_history_forward()),
            mv => match parse_move(mv) {
                Some((origin, destination, promotion)) => {
                    match engine.attempt_move(origin, destination, promotion) {
                        Ok(AttemptOutcome::Rejected) => println!("Illegal move."),
                        Ok(_) => {}
                        Err(e) => println!("{}", e),
                    }
                }
                None => println!("Unrecognised input: {}", mv),
            },
        }
        run_pending(&mut engine, &config, &mut progress)?;
        print_status(&engine);
        io::stdout().flush()?;
    }

    engine.cancel();
    progress.save()?;
    Ok(())
}

/// Drive ticks until no deferred move is outstanding, printing events.
fn run_pending(
    engine: &mut Engine,
    config: &TrainerConfig,
    progress: &mut PuzzleProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    print_events(engine.drain_events(), progress)?;
    while engine.is_pending() {
        std::thread::sleep(config.tick_interval());
        let events = engine.tick()?;
        print_events(events, progress)?;
    }
    Ok(())
}

fn print_events(events: Vec<SolveEvent>, progress: &mut PuzzleProgress) -> io::Result<()> {
    for event in events {
        match event {
            SolveEvent::PreMoveApplied { notation } => println!("Opponent plays {}", notation),
            SolveEvent::MoveAccepted { notation, .. } => println!("{} - correct!", notation),
            SolveEvent::MoveRejected { .. } => {}
            SolveEvent::MoveIncorrect { notation, .. } => {
                println!("{} is not the answer. Type 'retry' or 'solution'.", notation)
            }
            SolveEvent::AutoReplyApplied { notation, .. } => println!("Opponent replies {}", notation),
            SolveEvent::RetryStarted { .. } => println!("Try again."),
            SolveEvent::ReplayApplied { notation } => println!("Opponent plays {}", notation),
            SolveEvent::PlaybackStep { notation, .. } => println!("  {}", notation),
            SolveEvent::HistoryStepped { history_pointer } => println!("Move {}", history_pointer),
            SolveEvent::Restarted => println!("Restarted."),
            SolveEvent::Solved(record) => {
                if record.assisted {
                    println!("Solution complete.");
                } else {
                    println!("Solved! ({} failed attempts)", record.failed_attempts);
                }
                progress.record_solved(&record);
                progress.save()?;
            }
        }
    }
    Ok(())
}

fn print_status(engine: &Engine) {
    let snapshot = engine.snapshot();
    println!(
        "[{:?}] {}/{} {:?} to move | {}",
        snapshot.last_attempt_outcome,
        snapshot.cursor,
        snapshot.total_steps,
        snapshot.side_to_move,
        snapshot.current_position
    );
}

fn report(result: Result<(), puzzle_trainer::solve::EngineError>) {
    if let Err(e) = result {
        println!("{}", e);
    }
}

/// "e2e4" or "e7e8q".
fn parse_move(input: &str) -> Option<(Square, Square, Option<PromotionPiece>)> {
    if !input.is_ascii() || !(4..=5).contains(&input.len()) {
        return None;
    }
    let origin = input[0..2].parse().ok()?;
    let destination = input[2..4].parse().ok()?;
    let promotion = match input.chars().nth(4) {
        Some(c) => Some(PromotionPiece::from_char(c)?),
        None => None,
    };
    Some((origin, destination, promotion))
}
