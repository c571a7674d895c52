use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use tmsim::{
    random_input, seeded_input, unreachable_states, Halt, MachineError, MachineLibrary,
    MachineSpec, Metadata, RunOutcome, Runtime, SpecLoader, Status, Step, MAX_EXECUTION_STEPS,
};

/// Runs a single-tape Turing machine against an input string.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmsim-cli machines/binary-increment.json --input 1011
  cat machines/even-parity.json | tmsim-cli --random 12 --debug
  tmsim-cli --machine \"Endless Scan\" --input 0 --max-steps 500")]
struct Cli {
    /// Path to a machine definition (.json).
    /// Can also pipe the definition via stdin.
    machine_file: Option<PathBuf>,

    /// Name of a built-in machine to run instead of a file
    #[clap(short, long)]
    machine: Option<String>,

    /// The input written on the tape
    #[clap(short, long, default_value = "")]
    input: String,

    /// Generate a random input of this length instead of using --input
    #[clap(short, long, conflicts_with = "input")]
    random: Option<usize>,

    /// Seed for --random, for reproducible inputs
    #[clap(long, requires = "random")]
    seed: Option<u64>,

    /// Stop after this many steps if the machine has not halted
    #[clap(short = 's', long, default_value_t = MAX_EXECUTION_STEPS)]
    max_steps: usize,

    /// Pause between steps, in milliseconds
    #[clap(long, default_value_t = 0)]
    delay_ms: u64,

    /// Print each step of the execution
    #[clap(short, long)]
    debug: bool,

    /// List the built-in machines and exit
    #[clap(short, long)]
    list: bool,

    /// Write the loaded definition to this path before running
    #[clap(long)]
    export: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list {
        for (index, name) in MachineLibrary::list_names().iter().enumerate() {
            println!("{:>2}. {}", index + 1, name);
        }
        return ExitCode::SUCCESS;
    }

    let source = match cli.source() {
        Some(source) => source,
        None => Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "no machine given; pass a file, --machine <name>, or pipe a definition",
            )
            .exit(),
    };

    let result = run(&cli, &source);
    if let Err(e) = &result {
        eprintln!("Error: {}", e);
    }
    ExitCode::from(exit_status(&result))
}

/// Where the machine definition is read from.
#[derive(Debug, PartialEq)]
enum Source<'a> {
    File(&'a Path),
    Builtin(&'a str),
    Stdin,
}

impl Cli {
    /// Picks a file path, then a built-in name, and finally stdin when it is piped.
    fn source(&self) -> Option<Source<'_>> {
        if let Some(path) = &self.machine_file {
            Some(Source::File(path))
        } else if let Some(name) = &self.machine {
            Some(Source::Builtin(name))
        } else if atty::isnt(atty::Stream::Stdin) {
            Some(Source::Stdin)
        } else {
            None
        }
    }
}

/// Maps the result of a run to the process exit status: 0 when accepted, 2 when
/// rejected, 3 when the step budget ran out and 1 on any error.
fn exit_status(result: &Result<RunOutcome, MachineError>) -> u8 {
    match result {
        Ok(RunOutcome::Halted(Halt::Accepted)) => 0,
        Ok(RunOutcome::Halted(_)) => 2,
        Ok(RunOutcome::Exhausted { .. }) => 3,
        Err(_) => 1,
    }
}

fn run(cli: &Cli, source: &Source) -> Result<RunOutcome, MachineError> {
    let (spec, metadata) = load_spec(source)?;

    for state in unreachable_states(&spec) {
        log::warn!("state {} is unreachable from {}", state, spec.start_state());
    }

    if let Some(path) = &cli.export {
        SpecLoader::save_spec(path, &spec, Some(metadata.unwrap_or_default().stamped()))?;
    }

    let input = match (cli.random, cli.seed) {
        (Some(len), Some(seed)) => seeded_input(&spec, len, seed),
        (Some(len), None) => random_input(&spec, len, &mut rand::thread_rng()),
        (None, _) => cli.input.clone(),
    };

    let mut runtime = Runtime::new(spec, &input)?;
    let outcome = drive(&mut runtime, cli.max_steps, cli.debug, cli.delay_ms);

    match &outcome {
        RunOutcome::Halted(halt) => {
            println!("\nMachine {} after {} steps.", halt, runtime.step_count())
        }
        RunOutcome::Exhausted { steps } => {
            println!("\nMachine still running after {} steps; giving up.", steps)
        }
    }
    println!("{}", runtime.tape_string());

    Ok(outcome)
}

/// Loads the machine definition named by `source`.
fn load_spec(source: &Source) -> Result<(MachineSpec, Option<Metadata>), MachineError> {
    match source {
        Source::File(path) => SpecLoader::load_spec(path),
        Source::Builtin(name) => {
            let entry = MachineLibrary::get_by_name(name)?;
            let metadata = Metadata {
                name: Some(entry.name.clone()),
                description: entry.description.clone(),
                exported_at: None,
            };
            Ok((MachineSpec::clone(&entry.spec), Some(metadata)))
        }
        Source::Stdin => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(|e| {
                MachineError::FileError(format!("Failed to read from stdin: {}", e))
            })?;
            SpecLoader::load_spec_from_string(&buffer)
        }
    }
}

/// Steps the runtime until it halts or `max_steps` steps have run, optionally
/// printing every configuration and pausing between steps.
fn drive(runtime: &mut Runtime, max_steps: usize, debug: bool, delay_ms: u64) -> RunOutcome {
    if !debug && delay_ms == 0 {
        return runtime.run(max_steps);
    }

    if debug {
        println!("{}", runtime.snapshot());
    }

    for _ in 0..max_steps {
        let step = runtime.step();
        if debug {
            println!("{}", runtime.snapshot());
        }

        if let Step::Halt(halt) = step {
            return RunOutcome::Halted(halt);
        }

        if delay_ms > 0 {
            thread::sleep(Duration::from_millis(delay_ms));
        }
    }

    match runtime.status() {
        Status::Halted(halt) => RunOutcome::Halted(halt),
        Status::Running => RunOutcome::Exhausted {
            steps: runtime.step_count(),
        },
    }
}
