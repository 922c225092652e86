//! The puzzle-solving state machine.
//!
//! One engine drives one session: it validates the solver's moves against the
//! scripted solution, plays the automated side after a short delay, and lets
//! the solver retry, ask for a hint, watch the full solution, or browse the
//! finished line. The host calls [`PuzzleSolveEngine::tick`] every 100ms;
//! deferred moves only land during a tick.

use super::types::{
    AttemptOutcome, EngineError, Hint, SessionSnapshot, SolveEvent, SolveState, SolveTiming,
    SolvedRecord,
};
use crate::core::scheduler::DeferredSlot;
use crate::puzzle::Puzzle;
use crate::rules::{normalize_san, ChessRules, PromotionPiece, Square};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

/// A scripted ply: the pre-move or a solution step by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptedMove {
    PreMove,
    Step(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredAction {
    /// Opening pre-move after construction or restart.
    PreMove,
    /// Automated reply; consumes the step.
    AutoReply { step: usize },
    /// Re-play of an already consumed automated ply after a retry.
    Replay { target: ScriptedMove },
    /// One ply of full-solution playback.
    Playback { target: ScriptedMove },
}

pub struct PuzzleSolveEngine<R: ChessRules> {
    rules: R,
    puzzle: Puzzle,
    timing: SolveTiming,
    session_id: Uuid,
    starting_position: R::Position,

    // Session state
    position: R::Position,
    cursor: usize,
    state: SolveState,
    history_pointer: usize,
    pending: DeferredSlot<DeferredAction>,

    // Bookkeeping
    failed_attempts: u32,
    playing_solution: bool,
    assisted: bool,
    events: Vec<SolveEvent>,
}

impl<R: ChessRules> PuzzleSolveEngine<R> {
    /// Start a session with the default delays.
    pub fn create(puzzle: Puzzle, rules: R) -> Result<Self, EngineError> {
        Self::with_timing(puzzle, rules, SolveTiming::default())
    }

    pub fn with_timing(puzzle: Puzzle, rules: R, timing: SolveTiming) -> Result<Self, EngineError> {
        puzzle.validate()?;
        let starting_position = rules.load(&puzzle.starting_position)?;

        let mut engine = Self {
            position: starting_position.clone(),
            starting_position,
            rules,
            puzzle,
            timing,
            session_id: Uuid::new_v4(),
            cursor: 0,
            state: SolveState::Idle,
            history_pointer: 0,
            pending: DeferredSlot::new(),
            failed_attempts: 0,
            playing_solution: false,
            assisted: false,
            events: Vec::new(),
        };
        info!(
            puzzle_id = %engine.puzzle.id,
            session_id = %engine.session_id,
            steps = engine.puzzle.solution_steps.len(),
            "puzzle session created"
        );
        engine.reset_session();
        Ok(engine)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn position(&self) -> &R::Position {
        &self.position
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> SolveState {
        self.state
    }

    pub fn history_pointer(&self) -> usize {
        self.history_pointer
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn is_at_terminal(&self) -> bool {
        self.cursor == self.puzzle.solution_steps.len()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_position: self.rules.serialize(&self.position),
            side_to_move: self.rules.turn_color(&self.position),
            cursor: self.cursor,
            total_steps: self.puzzle.solution_steps.len(),
            last_attempt_outcome: self.state,
            history_pointer: self.history_pointer,
            is_at_terminal: self.is_at_terminal(),
            failed_attempts: self.failed_attempts,
            pending_action: self.pending.is_pending(),
            is_playing_solution: self.playing_solution,
        }
    }

    /// Destinations reachable from `square`, for move-input affordances.
    pub fn legal_destinations(&self, square: Square) -> Vec<Square> {
        self.rules.legal_moves_from(&self.position, square)
    }

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<SolveEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Operations ──────────────────────────────────────────────

    /// Try the solver's move. Illegal moves come back `Rejected` with nothing
    /// changed; legal moves that miss the script come back `Incorrect` and stay
    /// on the board.
    pub fn attempt_move(
        &mut self,
        origin: Square,
        destination: Square,
        promotion: Option<PromotionPiece>,
    ) -> Result<AttemptOutcome, EngineError> {
        const OP: &str = "attempt a move";
        if !self.state.is_awaiting_human() {
            return Err(self.invalid(OP));
        }
        if self.pending.is_pending() {
            debug!(puzzle_id = %self.puzzle.id, "move refused during deferred action");
            return Err(EngineError::ActionPending { operation: OP });
        }
        let Some(expected) = self.puzzle.solution_steps.get(self.cursor) else {
            return Err(self.invalid(OP));
        };

        let Some(applied) = self
            .rules
            .apply_move(&self.position, origin, destination, promotion)
        else {
            debug!(%origin, %destination, "move rejected by rules");
            self.events.push(SolveEvent::MoveRejected {
                origin,
                destination,
            });
            return Ok(AttemptOutcome::Rejected);
        };

        let matches = normalize_san(&applied.notation)
            == normalize_san(&expected.expected_move_notation);
        self.position = applied.position;

        if !matches {
            self.state = SolveState::Incorrect;
            self.failed_attempts += 1;
            debug!(
                cursor = self.cursor,
                played = %applied.notation,
                failed_attempts = self.failed_attempts,
                "incorrect move"
            );
            self.events.push(SolveEvent::MoveIncorrect {
                notation: applied.notation,
                failed_attempts: self.failed_attempts,
            });
            return Ok(AttemptOutcome::Incorrect);
        }

        self.cursor += 1;
        debug!(cursor = self.cursor, played = %applied.notation, "correct move");
        self.events.push(SolveEvent::MoveAccepted {
            cursor: self.cursor,
            notation: applied.notation,
        });

        if self.is_at_terminal() {
            self.mark_solved();
            return Ok(AttemptOutcome::Solved);
        }
        self.state = SolveState::Correct;
        self.schedule_automated_step();
        Ok(AttemptOutcome::Correct)
    }

    /// Rewind to the decision point before the last incorrect move.
    ///
    /// The wrong move is undone. If the ply before it belonged to the
    /// automated side (a reply or the pre-move), that ply is undone as well
    /// and played again after a delay, so the solver sees the reply land the
    /// way it did the first time.
    pub fn retry_after_incorrect(&mut self) -> Result<(), EngineError> {
        if self.state != SolveState::Incorrect {
            return Err(self.invalid("retry"));
        }

        self.position = self.rules.undo(&self.position);
        let previous = if self.cursor == 0 {
            self.puzzle.pre_move.as_ref().map(|_| ScriptedMove::PreMove)
        } else {
            Some(ScriptedMove::Step(self.cursor - 1))
        };

        if let Some(target) = previous.filter(|t| self.is_automated(*t)) {
            self.position = self.rules.undo(&self.position);
            let delay = match target {
                ScriptedMove::PreMove => self.timing.pre_move_delay_ticks,
                ScriptedMove::Step(_) => self.timing.auto_reply_delay_ticks,
            };
            self.pending
                .schedule_once(delay, DeferredAction::Replay { target });
        }

        self.state = SolveState::Correct;
        debug!(cursor = self.cursor, replaying = self.pending.is_pending(), "retry");
        self.events.push(SolveEvent::RetryStarted {
            cursor: self.cursor,
        });
        Ok(())
    }

    /// The piece and square of the solver's next scripted move. Read-only.
    /// Refused while a deferred move is pending, since the step at the cursor
    /// then belongs to the automated side.
    pub fn reveal_hint(&self) -> Result<Hint, EngineError> {
        const OP: &str = "reveal a hint";
        if self.state == SolveState::Solved {
            return Err(self.invalid(OP));
        }
        if self.pending.is_pending() {
            return Err(EngineError::ActionPending { operation: OP });
        }
        let step = self
            .puzzle
            .solution_steps
            .get(self.cursor)
            .ok_or_else(|| self.invalid(OP))?;
        Ok(Hint {
            moving_piece: step.piece(),
            origin_square: step.origin_square,
        })
    }

    /// Reset to the starting position and play the whole script, pre-move
    /// included, one ply per pre-move delay. Ends in `Solved`.
    pub fn play_full_solution(&mut self) {
        self.pending.cancel();
        self.position = self.starting_position.clone();
        self.cursor = 0;
        self.history_pointer = 0;
        self.state = SolveState::Idle;
        self.playing_solution = true;
        self.assisted = true;

        let first = if self.puzzle.pre_move.is_some() {
            ScriptedMove::PreMove
        } else {
            ScriptedMove::Step(0)
        };
        info!(puzzle_id = %self.puzzle.id, "playing full solution");
        self.pending.schedule_once(
            self.timing.pre_move_delay_ticks,
            DeferredAction::Playback { target: first },
        );
    }

    /// Back to construction-time state, rescheduling the pre-move if any.
    pub fn restart(&mut self) {
        info!(puzzle_id = %self.puzzle.id, "restart");
        self.reset_session();
        self.events.push(SolveEvent::Restarted);
    }

    /// Drop any pending deferred move. Call before discarding the session.
    pub fn cancel(&mut self) {
        if self.pending.cancel().is_some() {
            debug!(puzzle_id = %self.puzzle.id, "pending action cancelled");
        }
        self.playing_solution = false;
    }

    /// Undo one ply of the finished line without leaving `Solved`.
    pub fn step_history_backward(&mut self) -> Result<(), EngineError> {
        const OP: &str = "step history backward";
        if self.state != SolveState::Solved {
            return Err(self.invalid(OP));
        }
        if self.history_pointer == 0 {
            return Err(EngineError::HistoryBoundary { operation: OP });
        }
        self.position = self.rules.undo(&self.position);
        self.history_pointer -= 1;
        self.events.push(SolveEvent::HistoryStepped {
            history_pointer: self.history_pointer,
        });
        Ok(())
    }

    /// Replay the next ply of the finished line without leaving `Solved`.
    pub fn step_history_forward(&mut self) -> Result<(), EngineError> {
        const OP: &str = "step history forward";
        if self.state != SolveState::Solved {
            return Err(self.invalid(OP));
        }
        if self.history_pointer >= self.cursor {
            return Err(EngineError::HistoryBoundary { operation: OP });
        }
        self.apply_scripted(ScriptedMove::Step(self.history_pointer))?;
        self.history_pointer += 1;
        self.events.push(SolveEvent::HistoryStepped {
            history_pointer: self.history_pointer,
        });
        Ok(())
    }

    /// Advance the deferred-action clock by one tick, firing the pending
    /// action when due. Returns every event queued so far.
    pub fn tick(&mut self) -> Result<Vec<SolveEvent>, EngineError> {
        if let Some(action) = self.pending.tick() {
            self.fire(action)?;
        }
        Ok(self.drain_events())
    }

    // ── Internals ───────────────────────────────────────────────

    fn invalid(&self, operation: &'static str) -> EngineError {
        debug!(operation, state = ?self.state, "operation refused");
        EngineError::InvalidOperation {
            operation,
            state: self.state,
        }
    }

    fn reset_session(&mut self) {
        self.pending.cancel();
        self.position = self.starting_position.clone();
        self.cursor = 0;
        self.history_pointer = 0;
        self.failed_attempts = 0;
        self.playing_solution = false;
        self.assisted = false;

        if self.puzzle.pre_move.is_some() {
            self.state = SolveState::AwaitingPreMove;
            self.pending
                .schedule_once(self.timing.pre_move_delay_ticks, DeferredAction::PreMove);
        } else {
            self.state = SolveState::Idle;
            self.schedule_automated_step();
        }
    }

    fn is_automated(&self, target: ScriptedMove) -> bool {
        match target {
            ScriptedMove::PreMove => self.puzzle.pre_move.is_some(),
            ScriptedMove::Step(i) => self
                .puzzle
                .solution_steps
                .get(i)
                .map_or(false, |s| s.is_automated()),
        }
    }

    /// Queue the step at the cursor if the automated side plays it.
    fn schedule_automated_step(&mut self) {
        if self.is_automated(ScriptedMove::Step(self.cursor)) {
            self.pending.schedule_once(
                self.timing.auto_reply_delay_ticks,
                DeferredAction::AutoReply { step: self.cursor },
            );
        }
    }

    /// Play a scripted ply on the current position, returning its notation.
    fn apply_scripted(&mut self, target: ScriptedMove) -> Result<String, EngineError> {
        let (origin, destination, promotion, notation) = match target {
            ScriptedMove::PreMove => {
                let Some(pre) = self.puzzle.pre_move.as_ref() else {
                    return Ok(String::new());
                };
                (
                    pre.origin_square,
                    pre.destination_square,
                    pre.promotion(),
                    &pre.move_notation,
                )
            }
            ScriptedMove::Step(i) => {
                let Some(step) = self.puzzle.solution_steps.get(i) else {
                    return Err(EngineError::HistoryBoundary {
                        operation: "play a scripted move",
                    });
                };
                (
                    step.origin_square,
                    step.destination_square,
                    step.promotion(),
                    &step.expected_move_notation,
                )
            }
        };

        let applied = self
            .rules
            .apply_move(&self.position, origin, destination, promotion)
            .ok_or_else(|| EngineError::IllegalScriptedMove {
                notation: notation.clone(),
            })?;
        self.position = applied.position;
        Ok(applied.notation)
    }

    fn fire(&mut self, action: DeferredAction) -> Result<(), EngineError> {
        debug!(?action, cursor = self.cursor, "deferred action fired");
        match action {
            DeferredAction::PreMove => {
                let notation = self.apply_scripted(ScriptedMove::PreMove)?;
                self.state = SolveState::Idle;
                self.events.push(SolveEvent::PreMoveApplied { notation });
                self.schedule_automated_step();
            }
            DeferredAction::AutoReply { step } => {
                let notation = self.apply_scripted(ScriptedMove::Step(step))?;
                self.cursor = step + 1;
                self.events.push(SolveEvent::AutoReplyApplied {
                    cursor: self.cursor,
                    notation,
                });
                if self.is_at_terminal() {
                    self.mark_solved();
                } else {
                    self.schedule_automated_step();
                }
            }
            DeferredAction::Replay { target } => {
                let notation = self.apply_scripted(target)?;
                self.events.push(SolveEvent::ReplayApplied { notation });
            }
            DeferredAction::Playback { target } => {
                let notation = self.apply_scripted(target)?;
                let next = match target {
                    ScriptedMove::PreMove => 0,
                    ScriptedMove::Step(i) => {
                        self.cursor = i + 1;
                        i + 1
                    }
                };
                self.events.push(SolveEvent::PlaybackStep {
                    cursor: self.cursor,
                    notation,
                });
                if next < self.puzzle.solution_steps.len() {
                    self.pending.schedule_once(
                        self.timing.pre_move_delay_ticks,
                        DeferredAction::Playback {
                            target: ScriptedMove::Step(next),
                        },
                    );
                } else {
                    self.playing_solution = false;
                    self.mark_solved();
                }
            }
        }
        Ok(())
    }

    fn mark_solved(&mut self) {
        self.state = SolveState::Solved;
        self.history_pointer = self.cursor;
        info!(
            puzzle_id = %self.puzzle.id,
            failed_attempts = self.failed_attempts,
            assisted = self.assisted,
            "puzzle solved"
        );
        self.events.push(SolveEvent::Solved(SolvedRecord {
            session_id: self.session_id,
            puzzle_id: self.puzzle.id.clone(),
            failed_attempts: self.failed_attempts,
            assisted: self.assisted,
            solved_at: Utc::now(),
        }));
    }
}
