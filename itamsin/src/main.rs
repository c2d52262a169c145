// ITamsin: Interactive Shell for the Tamsin grammar language.
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
//! # Interactive Shell for the Tamsin grammar language.
//! Loads a grammar and runs it over every line entered.

extern crate linefeed;
extern crate tamsin;

use clap::Parser;
use linefeed::{Interface, ReadResult};
use log::{info, Level};
use std::{fs, io, path::PathBuf, process, rc::Rc};
use tamsin::{
    compile, observer::LogObserver, scanner::Utf8Engine, Buffer, Interpreter, Outcome, Program,
    Scanner, TamsinResult,
};

#[derive(Parser)]
#[command(name = "itamsin", version, about = "Runs a Tamsin grammar over each line entered")]
struct Cli {
    /// Grammar to run
    grammar: PathBuf,
    /// Log what the library does
    #[arg(short, long)]
    verbose: bool,
}

fn load(cli: &Cli) -> Result<Rc<Program>, String> {
    let source = fs::read(&cli.grammar)
        .map_err(|error| format!("can't read {}: {}", cli.grammar.display(), error))?;
    let program = compile(source, &cli.grammar.display().to_string()).map_err(|error| error.to_string())?;
    info!("loaded {}", cli.grammar.display());
    Ok(Rc::new(program))
}

/// Runs the grammar over one line, reporting every production through the log when verbose.
fn run_line(program: &Rc<Program>, line: &str, verbose: bool) -> TamsinResult<Outcome> {
    let scanner = Scanner::new(Buffer::new(line, "<line>"), Rc::new(Utf8Engine));
    let mut interpreter = Interpreter::new(program.clone(), scanner);
    if verbose {
        interpreter = interpreter.with_observer(LogObserver);
    }
    interpreter.interpret_program()
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        if let Err(error) = simple_logger::init_with_level(Level::Debug) {
            eprintln!("logging unavailable: {}", error);
        }
    }
    let program = match load(&cli) {
        Ok(program) => program,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(2);
        },
    };
    let reader = Interface::new("ITamsin")?;
    println!("ITamsin Copyright (C) 2019 Charles Johnson.\nThis program comes with ABSOLUTELY NO WARRANTY.\nThis is free software, and you are welcome to redistribute it under certain\nconditions; visit https://www.gnu.org/licenses/gpl-3.0.en.html for more details.");
    reader.set_prompt(">>> ")?;
    while let ReadResult::Input(input) = reader.read_line()? {
        match run_line(&program, &input, cli.verbose) {
            Ok(Outcome::Success(term)) => println!("{}", term),
            Ok(Outcome::Failure(term)) => println!("failure: {}", term),
            Err(error) => println!("error: {}", error),
        }
        reader.add_history_unique(input);
    }
    println!("Exiting");
    Ok(())
}
