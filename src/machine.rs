//! This module defines the `TuringMachine` engine, which owns the live tape, head, current
//! state and rule table of a loaded program, applies transitions one at a time, and keeps a
//! rewindable [`History`] of every step.

use crate::config::Config;
use crate::history::{History, Snapshot};
use crate::loader::ProgramLoader;
use crate::program::{Program, StateSet};
use crate::table::{TransitionKey, TransitionTable};
use crate::tape::Tape;
use crate::ticker::Ticker;
use crate::types::{Action, Halt, Position, Status, Step, Symbol, Transition, TuringMachineError};
use std::ops::Range;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// A single-tape deterministic Turing Machine with time-travel history.
///
/// The engine is `Ready`, `Running` (stepping on every elapsed tick of its own
/// [`Ticker`]) or `Halted`. Halting is reported through [`Step`] and [`Status`], never as
/// an error.
pub struct TuringMachine {
    program: Program,
    config: Config,
    states: StateSet,
    halt_states: StateSet,
    transitions: TransitionTable,
    tape: Tape,
    head: Position,
    state: String,
    status: Status,
    last_halt: Option<Halt>,
    history: History,
    ticker: Option<Ticker>,
}

impl TuringMachine {
    /// Creates a new engine from `program` with the default [`Config`].
    pub fn new(program: Program) -> Self {
        Self::with_config(program, Config::default())
    }

    pub fn with_config(program: Program, config: Config) -> Self {
        let tape = Tape::from_input(&program.initial_tape, program.tape_offset);
        let root = Snapshot::root(tape.clone(), program.start_position, &program.initial_state);

        let mut machine = Self {
            states: program.states.clone(),
            halt_states: program.halt_states.clone(),
            transitions: program.transitions.clone(),
            tape,
            head: program.start_position,
            state: program.initial_state.clone(),
            status: Status::Ready,
            last_halt: None,
            history: History::new(root),
            ticker: None,
            program,
            config,
        };
        machine.refresh_status();
        machine
    }

    /// Replaces the loaded program and re-initializes everything from it.
    pub fn load(&mut self, program: Program) {
        self.program = program;
        self.reset();
    }

    /// Validates `content` as a JSON program and loads it.
    ///
    /// On failure the current program, tape and history are left untouched.
    pub fn load_json(&mut self, content: &str) -> Result<(), TuringMachineError> {
        let program = ProgramLoader::load_program_with_limit(content, self.config.max_program_size)
            .inspect_err(|e| warn!(error = %e, "program import rejected"))?;
        self.load(program);
        Ok(())
    }

    /// Restores the loaded program's rules, tape, head and state, and starts a fresh history.
    pub fn reset(&mut self) {
        self.pause();
        self.states = self.program.states.clone();
        self.halt_states = self.program.halt_states.clone();
        self.transitions = self.program.transitions.clone();
        self.tape = Tape::from_input(&self.program.initial_tape, self.program.tape_offset);
        self.head = self.program.start_position;
        self.state = self.program.initial_state.clone();
        let root = self.snapshot_root();
        self.history.reset(root);
        self.refresh_status();

        info!(
            state = %self.state,
            head = self.head,
            rules = self.transitions.len(),
            "machine reset"
        );
    }

    /// Applies exactly one transition.
    ///
    /// * `Step::Continue` if a rule fired and the machine is not in a halt state.
    /// * `Step::Halt(Halt::Reached(_))` if the rule that fired led into a halt state. That
    ///   step is recorded in the history like any other.
    /// * `Step::Halt(Halt::NoTransition { .. })` if no rule matches. Nothing is written,
    ///   the head does not move and no history entry is added.
    /// * `Step::Halt(Halt::EdgeOfTape { .. })` if the matching rule would move the head
    ///   outside the `i64` range. Like a missing rule, this changes nothing else.
    /// * `Step::Ignored` if the engine was already halted.
    pub fn step(&mut self) -> Step {
        if self.status == Status::Halted {
            return Step::Ignored;
        }

        let read = self.tape.read(self.head);
        let transition = match self.transitions.lookup(&self.state, read) {
            Some(transition) => transition.clone(),
            None => {
                let halt = Halt::NoTransition {
                    state: self.state.clone(),
                    symbol: read,
                };
                debug!(state = %self.state, symbol = %read, "no matching transition");
                self.halt(halt.clone());
                return Step::Halt(halt);
            }
        };

        let Some(head) = self.head.checked_add(transition.direction.offset()) else {
            let halt = Halt::EdgeOfTape { position: self.head };
            warn!(position = self.head, "head would leave the tape");
            self.halt(halt.clone());
            return Step::Halt(halt);
        };

        self.tape.write(self.head, transition.write);
        self.head = head;

        let from_state = std::mem::replace(&mut self.state, transition.next_state.clone());
        let action = Action {
            read,
            write: transition.write,
            direction: transition.direction,
            from_state,
            to_state: transition.next_state,
        };
        debug!(step = self.history.cursor() + 1, %action, head = self.head, "step");

        self.history.append(Snapshot {
            tape: self.tape.clone(),
            head: self.head,
            state: self.state.clone(),
            action: Some(action),
        });

        if self.halt_states.contains(&self.state) {
            let halt = Halt::Reached(self.state.clone());
            self.halt(halt.clone());
            return Step::Halt(halt);
        }

        Step::Continue
    }

    /// Steps until the machine halts or `max_steps` transitions have been applied.
    ///
    /// Returns the last step outcome; `Step::Continue` means the budget ran out.
    pub fn run_to_halt(&mut self) -> Step {
        for _ in 0..self.config.max_steps {
            match self.step() {
                Step::Continue => continue,
                outcome => return outcome,
            }
        }

        Step::Continue
    }

    /// Enters Run mode using the configured tick interval. Returns false if halted.
    pub fn run(&mut self) -> bool {
        self.run_at(Instant::now())
    }

    /// Enters Run mode with ticks counted from `now`.
    ///
    /// Calling this while already running keeps the existing schedule.
    pub fn run_at(&mut self, now: Instant) -> bool {
        match self.status {
            Status::Halted => false,
            Status::Running => true,
            Status::Ready => {
                self.status = Status::Running;
                self.ticker = Some(Ticker::start(self.config.tick_interval, now));
                debug!(interval_ms = self.config.tick_interval.as_millis() as u64, "run");
                true
            }
        }
    }

    /// Leaves Run mode. The pending tick is cancelled.
    pub fn pause(&mut self) {
        if self.status == Status::Running {
            self.status = Status::Ready;
            debug!("pause");
        }
        self.ticker = None;
    }

    /// Drives Run mode: performs one step if a tick is due at `now`.
    ///
    /// Returns `None` when not running or when no tick is due yet.
    pub fn tick(&mut self, now: Instant) -> Option<Step> {
        if self.status != Status::Running {
            return None;
        }
        if !self.ticker.as_mut()?.poll(now) {
            return None;
        }
        trace!("tick");
        Some(self.step())
    }

    /// Time left until the next Run mode tick, if running.
    pub fn next_tick_in(&self, now: Instant) -> Option<Duration> {
        self.ticker.as_ref().map(|ticker| ticker.remaining(now))
    }

    /// Replaces the live tape, head and state with history entry `index`.
    ///
    /// Leaves Run mode first. An out-of-range index changes nothing.
    pub fn seek(&mut self, index: usize) -> Result<(), TuringMachineError> {
        if index >= self.history.len() {
            return Err(TuringMachineError::IndexOutOfRange {
                index,
                len: self.history.len(),
            });
        }

        self.pause();
        let snapshot = self.history.seek(index)?.clone();
        self.tape = snapshot.tape;
        self.head = snapshot.head;
        self.state = snapshot.state;
        self.refresh_status();

        debug!(index, state = %self.state, "seek");
        Ok(())
    }

    /// Seeks one entry back. Returns false at the root.
    pub fn step_back(&mut self) -> bool {
        match self.history.cursor().checked_sub(1) {
            Some(index) => self.seek(index).is_ok(),
            None => false,
        }
    }

    /// Seeks one entry forward without executing anything. Returns false at the newest entry.
    pub fn step_forward(&mut self) -> bool {
        self.seek(self.history.cursor() + 1).is_ok()
    }

    /// Writes `symbol` at `position` and restarts history from the edited machine.
    pub fn edit_tape_cell(&mut self, position: Position, symbol: Symbol) {
        self.pause();
        self.tape.write(position, symbol);
        debug!(position, %symbol, "tape edited");
        self.rebase_history();
    }

    /// Relocates the head and restarts history from the edited machine.
    pub fn move_head(&mut self, position: Position) {
        self.pause();
        self.head = position;
        debug!(position, "head moved");
        self.rebase_history();
    }

    /// Reassigns the current state and restarts history from the edited machine.
    ///
    /// Any name is accepted; undeclared states are executable like declared ones.
    pub fn set_current_state(&mut self, state: impl Into<String>) {
        self.pause();
        self.state = state.into();
        debug!(state = %self.state, "current state set");
        self.rebase_history();
    }

    /// Adds `state` to the halt set, or removes it if already there.
    ///
    /// The name does not have to be declared, the same way a loaded program's halt states
    /// are not cross-checked against its states. Declared states are left unchanged.
    ///
    /// Returns true if the state is a halt state afterwards.
    pub fn toggle_halt(&mut self, state: &str) -> bool {
        self.pause();
        let halting = if self.halt_states.remove(state) {
            false
        } else {
            self.halt_states.insert(state);
            true
        };
        debug!(state, halting, "halt set toggled");
        self.refresh_status();
        halting
    }

    pub fn add_state(&mut self, name: impl Into<String>) -> Result<(), TuringMachineError> {
        let name = name.into();
        if self.states.contains(&name) {
            return Err(TuringMachineError::DuplicateState(name));
        }
        debug!(state = %name, "state added");
        self.states.insert(name);
        Ok(())
    }

    /// Removes a declared state, also dropping it from the halt set.
    ///
    /// Refused with `StateInUse` if the state is current, or is the source or destination
    /// of any rule.
    pub fn delete_state(&mut self, name: &str) -> Result<(), TuringMachineError> {
        if !self.states.contains(name) {
            return Err(TuringMachineError::UnknownState(name.to_string()));
        }

        let reason = if self.state == name {
            Some("it is the current state")
        } else if self.transitions.references(name) {
            Some("it is referenced by a transition")
        } else {
            None
        };

        if let Some(reason) = reason {
            warn!(state = name, reason, "state deletion refused");
            return Err(TuringMachineError::StateInUse {
                state: name.to_string(),
                reason: reason.to_string(),
            });
        }

        self.states.remove(name);
        self.halt_states.remove(name);
        debug!(state = name, "state deleted");
        Ok(())
    }

    /// Inserts or replaces a rule, returning the replaced rule if any.
    pub fn upsert_transition(
        &mut self,
        key: TransitionKey,
        value: Transition,
    ) -> Option<Transition> {
        self.pause();
        debug!(%key, write = %value.write, direction = %value.direction, next = %value.next_state, "transition upserted");
        let previous = self.transitions.upsert(key, value);
        self.refresh_status();
        previous
    }

    pub fn delete_transition(&mut self, state: &str, symbol: Symbol) -> Option<Transition> {
        self.pause();
        let removed = self.transitions.remove(state, symbol);
        debug!(state, %symbol, removed = removed.is_some(), "transition deleted");
        self.refresh_status();
        removed
    }

    /// Builds a program describing the live machine: its rules, declared and halting
    /// states, and the current tape, head and state as the starting configuration.
    pub fn export(&self) -> Program {
        let (tape_offset, initial_tape) = self.tape.contents();

        Program {
            states: self.states.clone(),
            initial_state: self.state.clone(),
            halt_states: self.halt_states.clone(),
            transitions: self.transitions.clone(),
            initial_tape,
            tape_offset,
            start_position: self.head,
        }
    }

    /// Exports the live machine as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, TuringMachineError> {
        ProgramLoader::to_json(&self.export())
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_halted(&self) -> bool {
        self.status == Status::Halted
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    /// Why the machine last halted, if it is halted.
    pub fn last_halt(&self) -> Option<&Halt> {
        self.last_halt.as_ref()
    }

    /// The transition that produced the current history entry.
    pub fn last_action(&self) -> Option<&Action> {
        self.history.current().action.as_ref()
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn head(&self) -> Position {
        self.head
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// The symbols in `range`, blanks included, for rendering a window of the tape.
    pub fn tape_window(&self, range: Range<Position>) -> Vec<Symbol> {
        self.tape.window(range)
    }

    /// The symbol currently under the head.
    pub fn symbol(&self) -> Symbol {
        self.tape.read(self.head)
    }

    pub fn is_halt_state(&self, state: &str) -> bool {
        self.halt_states.contains(state)
    }

    pub fn states(&self) -> &StateSet {
        &self.states
    }

    pub fn halt_states(&self) -> &StateSet {
        &self.halt_states
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Number of steps between the history root and the current entry.
    pub fn step_count(&self) -> usize {
        self.history.cursor()
    }

    /// The program the machine was loaded from, unaffected by later edits.
    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn snapshot_root(&self) -> Snapshot {
        Snapshot::root(self.tape.clone(), self.head, &self.state)
    }

    /// Drops all history and roots a new one at the live machine.
    fn rebase_history(&mut self) {
        let root = self.snapshot_root();
        self.history.reset(root);
        self.refresh_status();
    }

    fn halt(&mut self, halt: Halt) {
        self.status = Status::Halted;
        self.ticker = None;
        self.last_halt = Some(halt);
    }

    /// `Halted` iff the current state is a halt state, else `Ready`. Never called while
    /// running.
    fn refresh_status(&mut self) {
        if self.halt_states.contains(&self.state) {
            self.status = Status::Halted;
            self.last_halt = Some(Halt::Reached(self.state.clone()));
        } else {
            self.status = Status::Ready;
            self.last_halt = None;
        }
    }
}
