// Cross-cutting properties of the engine and its history.

use proptest::prelude::*;
use std::collections::BTreeMap;
use tur_rewind::{
    presets, Config, Direction, Program, ProgramLoader, Snapshot, Status, Step, Tape,
    Transition, TransitionKey, TransitionTable, TuringMachine, BLANK_SYMBOL,
};

const STATES: [&str; 4] = ["a", "b", "c", "h"];
const SYMBOLS: [char; 3] = ['_', '0', '1'];

type RuleSpec = (usize, usize, usize, bool, usize);

fn rules_strategy() -> impl Strategy<Value = Vec<RuleSpec>> {
    prop::collection::vec((0..3usize, 0..3usize, 0..3usize, any::<bool>(), 0..4usize), 0..12)
}

fn build_program(rules: &[RuleSpec], tape: &str, head: i64) -> Program {
    let mut table = TransitionTable::new();
    for &(state, read, write, right, next) in rules {
        let direction = if right { Direction::Right } else { Direction::Left };
        table.upsert(
            TransitionKey::new(STATES[state], SYMBOLS[read]),
            Transition::new(SYMBOLS[write], direction, STATES[next]),
        );
    }

    Program::new(STATES.into_iter().collect(), "a", table)
        .with_halt_states(["h"].into_iter().collect())
        .with_tape(tape, head)
}

fn small_machine(program: Program) -> TuringMachine {
    TuringMachine::with_config(program, Config::default().with_max_steps(64))
}

fn entries(machine: &TuringMachine) -> Vec<Snapshot> {
    machine.history().iter().cloned().collect()
}

proptest! {
    #[test]
    fn tape_matches_map_model(writes in prop::collection::vec((-20i64..20, prop::sample::select(SYMBOLS.to_vec())), 0..40)) {
        let mut tape = Tape::new();
        let mut model = BTreeMap::new();
        for (position, symbol) in writes {
            tape.write(position, symbol);
            model.insert(position, symbol);
        }

        for position in -25i64..25 {
            let expected = model.get(&position).copied().unwrap_or(BLANK_SYMBOL);
            prop_assert_eq!(tape.read(position), expected);
        }
        let non_blank = model.values().filter(|s| **s != BLANK_SYMBOL).count();
        prop_assert_eq!(tape.non_blank_count(), non_blank);
    }

    #[test]
    fn execution_is_deterministic(rules in rules_strategy(), tape in "[01_]{0,8}", head in -2i64..10) {
        let program = build_program(&rules, &tape, head);
        let mut first = small_machine(program.clone());
        let mut second = small_machine(program);

        let first_outcome = first.run_to_halt();
        let second_outcome = second.run_to_halt();

        prop_assert_eq!(first_outcome, second_outcome);
        prop_assert_eq!(entries(&first), entries(&second));
    }

    #[test]
    fn history_replays_consistently(rules in rules_strategy(), tape in "[01_]{0,8}", head in -2i64..10, pick in any::<prop::sample::Index>()) {
        let mut machine = small_machine(build_program(&rules, &tape, head));
        machine.run_to_halt();
        let recorded = entries(&machine);
        let len = recorded.len();

        let index = pick.index(len);
        machine.seek(index).unwrap();
        prop_assert_eq!(machine.tape(), &recorded[index].tape);
        prop_assert_eq!(machine.head(), recorded[index].head);
        prop_assert_eq!(machine.state(), recorded[index].state.as_str());

        if index + 1 < len {
            machine.seek(index + 1).unwrap();
            prop_assert_eq!(machine.tape(), &recorded[index + 1].tape);
            prop_assert_eq!(machine.head(), recorded[index + 1].head);
        }
        prop_assert_eq!(entries(&machine), recorded.clone());

        // Each entry is the previous one with its recorded action applied.
        for pair in recorded.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            let action = after.action.as_ref().unwrap();
            prop_assert_eq!(before.tape.read(before.head), action.read);
            prop_assert_eq!(after.tape.read(before.head), action.write);
            prop_assert_eq!(after.head, before.head + action.direction.offset());
            prop_assert_eq!(&before.state, &action.from_state);
            prop_assert_eq!(&after.state, &action.to_state);
        }
    }

    #[test]
    fn export_import_round_trip(rules in rules_strategy(), tape in "[01_]{0,8}", head in -2i64..10, steps in 0usize..20) {
        let mut machine = small_machine(build_program(&rules, &tape, head));
        for _ in 0..steps {
            machine.step();
        }

        let json = machine.export_json().unwrap();
        let restored = TuringMachine::new(ProgramLoader::load_program_from_string(&json).unwrap());

        prop_assert_eq!(restored.tape(), machine.tape());
        prop_assert_eq!(restored.head(), machine.head());
        prop_assert_eq!(restored.state(), machine.state());
        prop_assert_eq!(restored.states(), machine.states());
        prop_assert_eq!(restored.halt_states(), machine.halt_states());
        prop_assert_eq!(restored.transitions(), machine.transitions());
    }
}

#[test]
fn halted_machine_ignores_steps() {
    let mut machine = TuringMachine::new(presets::by_name("Busy Beaver 3").unwrap().program.clone());
    machine.run_to_halt();
    let before = entries(&machine);
    let (tape, head, state) = (machine.tape().clone(), machine.head(), machine.state().to_string());

    for _ in 0..5 {
        assert_eq!(machine.step(), Step::Ignored);
    }

    assert_eq!(machine.status(), Status::Halted);
    assert_eq!(machine.tape(), &tape);
    assert_eq!(machine.head(), head);
    assert_eq!(machine.state(), state);
    assert_eq!(entries(&machine), before);
}

#[test]
fn edit_mid_history_truncates_to_single_root() {
    let mut machine = TuringMachine::new(presets::by_name("Busy Beaver 3").unwrap().program.clone());
    machine.run_to_halt();
    assert_eq!(machine.history().len(), 14);

    for edit in 0..3 {
        machine.run_to_halt();
        machine.seek(4).unwrap();
        match edit {
            0 => machine.edit_tape_cell(40, '1'),
            1 => machine.move_head(7),
            _ => machine.set_current_state("B"),
        }

        assert_eq!(machine.history().len(), 1);
        let root = machine.history().current();
        assert!(root.action.is_none());
        assert_eq!(&root.tape, machine.tape());
        assert_eq!(root.head, machine.head());
        assert_eq!(root.state, machine.state());
    }
}

#[test]
fn undo_then_diverge_discards_forward_entries() {
    let mut machine = TuringMachine::new(presets::by_name("Binary Increment").unwrap().program.clone());
    machine.run_to_halt();
    assert_eq!(machine.history().len(), 4);

    machine.seek(1).unwrap();
    assert_eq!(machine.status(), Status::Ready);
    assert_eq!(machine.step(), Step::Continue);

    assert_eq!(machine.history().len(), 3);
    assert_eq!(machine.history().cursor(), 2);
}

#[test]
fn failed_import_leaves_machine_untouched() {
    let mut machine = TuringMachine::new(presets::by_name("Binary Increment").unwrap().program.clone());
    machine.step();
    let before = entries(&machine);

    assert!(machine.load_json("{\"initialState\": \"q\", \"transitions\": {}}").is_err());
    assert!(machine.load_json("not json").is_err());

    assert_eq!(entries(&machine), before);
    assert_eq!(machine.state(), "carry");
    assert_eq!(machine.transitions().len(), 3);
}
