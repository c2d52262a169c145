// Tamsin: Command-line runner for the Tamsin grammar language.
// Copyright (C) 2019 Charles Johnson
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! # Command-line runner for the Tamsin grammar language.
//!
//! Usage:
//!   tamsin [--debug] `<grammar>`        - Run a grammar over standard input
//!   tamsin [--debug] run `<grammar>`    - Same as above
//!   tamsin scan                       - Print the grammar language tokens of standard input
//!   tamsin parse `<grammar>`            - Print a grammar as it was parsed

use clap::{ArgAction, Parser, Subcommand};
use log::{debug, Level};
use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process,
    rc::Rc,
};
use tamsin::{
    logging::SlogObserver,
    parser,
    scanner::{Scanning, TamsinEngine, Utf8Engine},
    Buffer, Interpreter, Outcome, Scanner, Term,
};

#[derive(Parser)]
#[command(name = "tamsin", version, about = "Runs programs written in the Tamsin grammar language")]
struct Cli {
    /// Trace the interpretation on standard error
    #[arg(long, global = true)]
    debug: bool,
    /// Log more of what the library does (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Command>,
    /// Grammar to run over standard input
    grammar: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a grammar over standard input
    Run { grammar: PathBuf },
    /// Print the grammar language tokens of standard input, one per line
    Scan,
    /// Print a grammar as it was parsed
    Parse { grammar: PathBuf },
}

/// Why the runner stopped early, with the exit code to report it with.
enum Exit {
    /// The grammar failed on its input.
    Failure(Term),
    /// The grammar couldn't be run at all.
    Fatal(String),
}

impl Exit {
    fn code(&self) -> i32 {
        match self {
            Self::Failure(_) => 1,
            Self::Fatal(_) => 2,
        }
    }
}

impl From<io::Error> for Exit {
    fn from(error: io::Error) -> Self {
        Self::Fatal(error.to_string())
    }
}

impl From<tamsin::TamsinError> for Exit {
    fn from(error: tamsin::TamsinError) -> Self {
        Self::Fatal(error.to_string())
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let result = match (&cli.command, &cli.grammar) {
        (Some(Command::Run { grammar }), _) | (None, Some(grammar)) => run(grammar, cli.debug),
        (Some(Command::Scan), _) => scan(),
        (Some(Command::Parse { grammar }), _) => parse(grammar),
        (None, None) => Err(Exit::Fatal("no grammar given, see --help".into())),
    };
    if let Err(exit) = result {
        match &exit {
            Exit::Failure(term) => eprintln!("{}", term),
            Exit::Fatal(message) => eprintln!("tamsin: {}", message),
        }
        process::exit(exit.code());
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => return,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };
    if let Err(error) = simple_logger::init_with_level(level) {
        eprintln!("tamsin: logging unavailable: {}", error);
    }
}

fn read_grammar(path: &Path) -> Result<Vec<u8>, Exit> {
    debug!("reading grammar from {}", path.display());
    fs::read(path).map_err(|error| Exit::Fatal(format!("can't read {}: {}", path.display(), error)))
}

fn read_stdin() -> Result<Vec<u8>, Exit> {
    let mut input = Vec::new();
    io::stdin().read_to_end(&mut input)?;
    Ok(input)
}

fn run(path: &Path, debug: bool) -> Result<(), Exit> {
    let filename = path.display().to_string();
    let program = tamsin::compile(read_grammar(path)?, &filename)?;
    let scanner = Scanner::new(Buffer::new(read_stdin()?, "<stdin>"), Rc::new(Utf8Engine));
    let mut interpreter = Interpreter::new(Rc::new(program), scanner);
    if debug {
        interpreter = interpreter.with_observer(SlogObserver::stderr());
    }
    match interpreter.interpret_program()? {
        Outcome::Success(term) => {
            let mut stdout = io::stdout();
            stdout.write_all(&term.flatten())?;
            stdout.write_all(b"\n")?;
            Ok(())
        },
        Outcome::Failure(term) => Err(Exit::Failure(term)),
    }
}

fn scan() -> Result<(), Exit> {
    let mut scanner = Scanner::new(Buffer::new(read_stdin()?, "<stdin>"), Rc::new(TamsinEngine));
    let mut stdout = io::stdout();
    loop {
        let token = scanner.consume_any()?;
        if token.is_eof() {
            break;
        }
        stdout.write_all(&token.flatten())?;
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

fn parse(path: &Path) -> Result<(), Exit> {
    let filename = path.display().to_string();
    let program = parser::Parser::new(read_grammar(path)?, filename).grammar()?;
    println!("{}", program);
    Ok(())
}
