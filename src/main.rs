// ABOUTME: Command-line entry point: interactive REPL or script execution

use clap::Parser;
use mallow::config::{HISTORY_FILE, HISTORY_SIZE, PROMPT};
use mallow::error::LispError;
use mallow::interpreter::Interpreter;
use mallow::printer::pr_str;
use mallow::value::Value;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::path::PathBuf;

/// A small Lisp interpreter with tail calls, macros, and first-class exceptions
#[derive(Parser, Debug)]
#[command(name = "mallow")]
#[command(version)]
#[command(about = "A small Lisp interpreter")]
struct CliArgs {
    /// Script file to evaluate (starts the REPL when omitted)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Arguments exposed to the script as *ARGV*
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    script_args: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let interpreter = Interpreter::new();

    // Script mode: bind *ARGV*, run the file through load-file, exit.
    // Language-level exceptions print but do not fail the process.
    if let Some(script) = args.script {
        interpreter.set_argv(&args.script_args);
        let path = Value::string(script.display().to_string());
        let call = format!("(load-file {})", pr_str(&path, true));
        if let Err(err) = interpreter.rep(&call) {
            print_exception(err);
        }
        return Ok(());
    }

    let config = Config::builder()
        .max_history_size(HISTORY_SIZE)?
        .auto_add_history(true)
        .build();
    let mut editor = DefaultEditor::with_config(config)?;
    let _ = editor.load_history(HISTORY_FILE);

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => match interpreter.rep(&line) {
                Ok(Some(output)) => println!("{}", output),
                Ok(None) => {} // blank line or comment, nothing to print
                Err(err) => print_exception(err),
            },
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    let _ = editor.save_history(HISTORY_FILE);
    Ok(())
}

/// Any single cycle's failure leaves the loop running; the thrown value is
/// printed unreadably, as the user's program produced it
fn print_exception(err: LispError) {
    println!("Exception {}", pr_str(&err.into_value(), false));
}
