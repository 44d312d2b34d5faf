//! # CQL CLI
//!
//! An interactive shell and batch runner for CQL. With no arguments it
//! starts a REPL; given a script path it runs the whole file as one program;
//! given a CSV file it imports it as a table named after the file stem and
//! prints it.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser as ClapParser;
use rustyline::{error::ReadlineError, Editor};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cql::files::Paths;
use cql::lang::ast::{ImportTable, PrintTable, Statement};
use cql::Interpreter;

#[derive(ClapParser)]
#[command(name = "cql", version, about = "Interpreter for the CQL query language")]
struct Args {
    /// A CQL script to run, or a CSV file to import and print. Starts a
    /// REPL when omitted.
    path: Option<PathBuf>,

    /// Directory bare IMPORT filenames resolve against.
    #[arg(long, default_value = cql::files::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Directory bare EXPORT filenames resolve against.
    #[arg(long, default_value = cql::files::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let mut interpreter = Interpreter::with_paths(Paths {
        data_dir: args.data_dir,
        output_dir: args.output_dir,
    });

    match args.path {
        Some(path) if is_csv_file(&path) => run_datafile(&mut interpreter, &path),
        Some(path) => run_file(&mut interpreter, &path),
        None => {
            repl(&mut interpreter);
            ExitCode::SUCCESS
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn is_csv_file(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"))
        && path.is_file()
}

/// Run a whole script file as one program.
fn run_file(interpreter: &mut Interpreter, path: &Path) -> ExitCode {
    let script = match std::fs::read_to_string(path) {
        Ok(script) => script,
        Err(err) => {
            eprintln!("Error reading {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = interpreter.run(&script) {
        eprintln!("Error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Import a CSV file as a table named after its stem, then print it.
fn run_datafile(interpreter: &mut Interpreter, path: &Path) -> ExitCode {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());

    // A bare filename would resolve under the data directory; anchor the
    // path the user actually named to the current directory instead.
    let filename = if path.parent().map_or(true, |p| p.as_os_str().is_empty()) {
        Path::new(".").join(path).display().to_string()
    } else {
        path.display().to_string()
    };

    println!("Importing '{}' as table '{name}'", path.display());
    let statements = [
        Statement::Import(ImportTable {
            name: name.clone(),
            filename,
        }),
        Statement::Print(PrintTable { name }),
    ];

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for statement in &statements {
        if let Err(err) = interpreter.run_statement(statement, &mut out) {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

/// The interactive shell. Each line is executed as a one-statement program;
/// a missing `;` is appended. Meta-commands start with `:` and are handled
/// outside the grammar.
fn repl(interpreter: &mut Interpreter) {
    println!("CQL v{}", env!("CARGO_PKG_VERSION"));
    println!("Enter \":help\" for usage hints.");

    let mut editor = Editor::<()>::new();
    loop {
        let readline = editor.readline("cql> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line);

                if let Some(meta) = line.strip_prefix(':') {
                    if handle_meta_command(meta, interpreter) {
                        break;
                    }
                    continue;
                }

                let statement = normalize_statement(line);
                if let Err(err) = interpreter.run(&statement) {
                    eprintln!("Error: {err}");
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }
}

/// A REPL line is one statement; append the terminator when it is missing.
fn normalize_statement(line: &str) -> String {
    if line.ends_with(';') {
        line.to_string()
    } else {
        format!("{line};")
    }
}

/// Handle a `:` meta-command. Returns `true` when the REPL should exit.
fn handle_meta_command(command: &str, interpreter: &Interpreter) -> bool {
    match command.trim() {
        "help" => {
            println!(":help     Show this help");
            println!(":tables   List stored tables");
            println!(":quit     Exit this program");
            println!(":exit     Exit this program");
            false
        }
        "tables" => {
            let names = interpreter.store().table_names();
            if names.is_empty() {
                println!("(no tables)");
            } else {
                println!("{}", names.join("  "));
            }
            false
        }
        "quit" | "exit" => true,
        other => {
            eprintln!("Error: unknown command: :{other}");
            eprintln!("Use :help for a list of commands.");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_appends_a_missing_terminator() {
        assert_eq!(normalize_statement("PRINT TABLE t"), "PRINT TABLE t;");
        assert_eq!(normalize_statement("PRINT TABLE t;"), "PRINT TABLE t;");
    }

    #[test]
    fn only_existing_csv_files_trigger_auto_import() {
        assert!(!is_csv_file(Path::new("missing.csv")));
        assert!(!is_csv_file(Path::new("script.cql")));
    }
}
