use clap::Parser;
use std::error::Error;
use std::io::{self, Read};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tur_rewind::{presets, Config, Program, ProgramLoader, Step, TuringMachine};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tur-rewind --preset \"Busy Beaver 3\" --debug
  tur-rewind -p machine.json --run --interval-ms 100
  cat machine.json | tur-rewind --export")]
struct Cli {
    /// The JSON program file to execute. Reads stdin when piped and no program is given.
    #[clap(short, long)]
    program: Option<String>,

    /// Run a built-in program instead of a file
    #[clap(long, conflicts_with = "program")]
    preset: Option<String>,

    /// List the built-in programs and exit
    #[clap(long)]
    list: bool,

    /// Replace the initial tape, starting at position 0
    #[clap(short, long)]
    input: Option<String>,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Step on a timer instead of as fast as possible
    #[clap(long)]
    run: bool,

    /// Delay between steps in run mode
    #[clap(long, default_value_t = 250)]
    interval_ms: u64,

    /// Give up after this many steps
    #[clap(long, default_value_t = tur_rewind::types::MAX_EXECUTION_STEPS)]
    max_steps: usize,

    /// Print the final machine as a JSON program
    #[clap(long)]
    export: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list {
        for name in presets::names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let config = Config::default()
        .with_tick_interval(Duration::from_millis(cli.interval_ms))
        .with_max_steps(cli.max_steps);
    let mut machine = TuringMachine::with_config(load_program(&cli)?, config);
    debug!(
        states = machine.states().len(),
        rules = machine.transitions().len(),
        "program loaded"
    );

    if let Some(input) = &cli.input {
        let (offset, current) = machine.tape().contents();
        for i in 0..current.chars().count() as i64 {
            if let Some(position) = offset.checked_add(i) {
                machine.edit_tape_cell(position, tur_rewind::BLANK_SYMBOL);
            }
        }
        for (position, symbol) in input.chars().enumerate() {
            machine.edit_tape_cell(position as i64, symbol);
        }
    }

    if cli.debug {
        print_state(&machine);
    }

    let outcome = if cli.run {
        run_timed(&mut machine, cli.debug)
    } else {
        run_stepped(&mut machine, cli.debug)
    };

    match outcome {
        Step::Halt(halt) => eprintln!("\nMachine halted: {}.", halt),
        Step::Ignored => eprintln!("\nMachine is already halted."),
        Step::Continue => eprintln!(
            "\nMachine stopped after {} steps without halting.",
            machine.step_count()
        ),
    }

    if cli.export {
        println!("{}", machine.export_json()?);
    } else {
        println!("{}", machine.tape());
    }

    Ok(())
}

/// Loads the program from a file, a preset, or stdin, in that order.
fn load_program(cli: &Cli) -> Result<Program, Box<dyn Error>> {
    if let Some(path) = &cli.program {
        return Ok(ProgramLoader::load_program(Path::new(path))?);
    }

    if let Some(name) = &cli.preset {
        return presets::by_name(name)
            .map(|preset| preset.program.clone())
            .ok_or_else(|| format!("Unknown preset '{}'. Use --list to see them.", name).into());
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(ProgramLoader::load_program_from_string(&buffer)?);
    }

    Err("No program given. Use --program, --preset, or pipe a program via stdin.".into())
}

fn run_stepped(machine: &mut TuringMachine, debug: bool) -> Step {
    if !debug {
        return machine.run_to_halt();
    }

    for _ in 0..machine.config().max_steps {
        let outcome = machine.step();
        match outcome {
            Step::Continue => print_state(machine),
            Step::Halt(_) => {
                print_state(machine);
                return outcome;
            }
            Step::Ignored => return outcome,
        }
    }

    Step::Continue
}

/// Drives Run mode: sleeps until the next tick is due, then lets the machine step.
fn run_timed(machine: &mut TuringMachine, debug: bool) -> Step {
    if !machine.run() {
        return Step::Ignored;
    }

    let mut steps = 0;
    while machine.is_running() && steps < machine.config().max_steps {
        let now = Instant::now();
        if let Some(wait) = machine.next_tick_in(now) {
            thread::sleep(wait);
        }

        match machine.tick(Instant::now()) {
            Some(Step::Continue) => {
                steps += 1;
                if debug {
                    print_state(machine);
                }
            }
            Some(outcome) => {
                if debug {
                    print_state(machine);
                }
                return outcome;
            }
            None => {}
        }
    }

    machine.pause();
    Step::Continue
}

fn print_state(machine: &TuringMachine) {
    let head = machine.head();
    let left: String = machine
        .tape_window(head.saturating_sub(8)..head)
        .into_iter()
        .collect();
    let right: String = machine
        .tape_window(head.saturating_add(1)..head.saturating_add(9))
        .into_iter()
        .collect();

    println!(
        "Step: {:>4}, State: {:<8} Head: {:>4}, Tape: {}[{}]{}",
        machine.step_count(),
        machine.state(),
        head,
        left,
        machine.symbol(),
        right,
    );
}
