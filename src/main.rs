// arbcalc: arbitrary-width postfix calculator with heap accounting

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use rustyline::{error::ReadlineError, DefaultEditor};
use tracing_subscriber::{fmt, EnvFilter};

use arbcalc::interpreter::engine::Interpreter;
use arbcalc::interpreter::errors::RuntimeError;
use arbcalc::memory::{format_bytes, heap::Heap};
use arbcalc::ui::App;

/// Postfix calculator over arbitrary-width integers
#[derive(Debug, Parser)]
#[command(name = "arbcalc", version, about)]
struct Cli {
    /// Evaluate an expression (repeatable, run in order)
    #[arg(short = 'e', long = "expr", value_name = "EXPR")]
    exprs: Vec<String>,

    /// Evaluate a source file (repeatable, run after expressions)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Evaluate standard input after expressions and files
    #[arg(short, long)]
    stdin: bool,

    /// Start the interactive prompt (default when there is nothing else to run)
    #[arg(short, long)]
    repl: bool,

    /// Report wall time for the whole run
    #[arg(short, long)]
    time: bool,

    /// Debug logging and heap statistics at exit
    #[arg(short, long)]
    verbose: bool,

    /// Open the terminal inspector once everything else has run
    #[arg(short, long)]
    inspect: bool,
}

/// How a batch or session ended, when it did not fail fatally
enum Outcome {
    Done,
    Quit,
    Failed,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "arbcalc=debug" } else { "arbcalc=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn flush_output(interpreter: &mut Interpreter) {
    for line in interpreter.terminal_mut().take_new() {
        println!("{}", line);
    }
}

fn report(err: &RuntimeError) {
    eprintln!("{} error: {}", err.category(), err);
}

/// Run one non-interactive input; recoverable errors end the invocation
fn run_batch(
    interpreter: &mut Interpreter,
    label: &str,
    source: &str,
) -> Result<Outcome, RuntimeError> {
    tracing::debug!(input = label, bytes = source.len(), "running batch");
    let result = interpreter.run(source);
    flush_output(interpreter);

    match result {
        Ok(()) => Ok(Outcome::Done),
        Err(RuntimeError::InteractiveQuit) => Ok(Outcome::Quit),
        Err(err) if err.is_recoverable() => {
            eprintln!("{}:", label);
            report(&err);
            Ok(Outcome::Failed)
        }
        Err(err) => Err(err),
    }
}

fn remember(editor: &mut DefaultEditor, line: &str) {
    if let Err(err) = editor.add_history_entry(line) {
        tracing::warn!(error = %err, "could not record history entry");
    }
}

fn repl(interpreter: &mut Interpreter) -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = DefaultEditor::new()?;

    loop {
        let prompt = format!("{}>> ", interpreter.stack().len());
        match editor.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                remember(&mut editor, &line);

                let result = interpreter.run(&line);
                flush_output(interpreter);
                match result {
                    Ok(()) => {
                        if let Some(top) = interpreter.stack().last() {
                            println!("^{}", top);
                        }
                    }
                    Err(RuntimeError::InteractiveQuit) => break,
                    Err(err) if err.is_recoverable() => report(&err),
                    Err(err) => return Err(err.into()),
                }
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                interpreter.cancel();
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn inspect(interpreter: Interpreter) -> Result<(), Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(interpreter);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let started = Instant::now();
    let mut interpreter = Interpreter::new(Heap::new());
    let mut outcome = Outcome::Done;

    let mut batches: Vec<(String, String)> = cli
        .exprs
        .iter()
        .enumerate()
        .map(|(i, expr)| (format!("expression {}", i + 1), expr.clone()))
        .collect();
    for path in &cli.files {
        let source = fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
        batches.push((path.display().to_string(), source));
    }
    if cli.stdin {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        batches.push(("<stdin>".to_string(), source));
    }

    let has_work = !batches.is_empty();
    for (label, source) in &batches {
        outcome = run_batch(&mut interpreter, label, source)?;
        if !matches!(outcome, Outcome::Done) {
            break;
        }
    }

    if matches!(outcome, Outcome::Done) && (cli.repl || !has_work) {
        repl(&mut interpreter)?;
    }

    if cli.time {
        eprintln!("elapsed: {:.3?}", started.elapsed());
    }

    if cli.verbose {
        let stats = interpreter.heap().stats();
        eprintln!(
            "heap: {} live in {} blocks, peak {} in {} blocks ({} allocations, {} reallocations, {} releases)",
            format_bytes(stats.current_bytes),
            stats.live_entries,
            format_bytes(stats.peak_bytes),
            stats.peak_entries,
            stats.allocations,
            stats.reallocations,
            stats.releases,
        );
    }

    if cli.inspect {
        inspect(interpreter)?;
    }

    Ok(match outcome {
        Outcome::Failed => ExitCode::FAILURE,
        Outcome::Done | Outcome::Quit => ExitCode::SUCCESS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustyline::history::History;

    #[test]
    fn remember_records_history() {
        let mut editor = DefaultEditor::new().unwrap();
        remember(&mut editor, "1 2 +");
        remember(&mut editor, "dup *");
        assert_eq!(editor.history().len(), 2);
    }
}
