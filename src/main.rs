//! nodeshell - An interactive command interpreter over a tree of named objects.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use nodeshell::cli::{Cli, OutputFormat};
use nodeshell::commands::CommandResult;
use nodeshell::config::Config;
use nodeshell::error::NodeshellError;
use nodeshell::host::{Host, NodeTree};
use nodeshell::interpreter::Interpreter;
use nodeshell::logging;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if cli.log_file {
        logging::init_file_logging();
    } else {
        logging::init_stderr_logging();
    }

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let mut tree = sample_scene().context("failed to build the sample scene")?;
    let mut interpreter = Interpreter::new(&tree);
    for diagnostic in interpreter.diagnostics() {
        let err = NodeshellError::from(diagnostic.clone());
        warn!(category = err.category(), error = %err, "command not available");
    }
    interpreter.configure(&tree, config.interpreter)?;

    if cli.is_batch() {
        run_batch(cli, &mut interpreter, &mut tree)
    } else {
        run_repl(cli.output, &mut interpreter, &mut tree)?;
        Ok(ExitCode::SUCCESS)
    }
}

/// Runs `-c` commands in order. Any failure makes the exit code non-zero.
fn run_batch(cli: &Cli, interpreter: &mut Interpreter, tree: &mut NodeTree) -> Result<ExitCode> {
    let mut failed = false;
    for line in &cli.commands {
        let result = interpreter.execute(tree, line);
        print_result(cli.output, &result)?;
        failed |= !result.success;
        if result.is_exit() {
            break;
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn run_repl(format: OutputFormat, interpreter: &mut Interpreter, tree: &mut NodeTree) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let mut stdout = io::stdout();
        write!(stdout, "{}", interpreter.options().prompt)?;
        stdout.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let result = interpreter.execute(tree, &line);
        print_result(format, &result)?;
        if result.is_exit() {
            break;
        }
    }

    Ok(())
}

fn print_result(format: OutputFormat, result: &CommandResult) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(result)?),
        OutputFormat::Text if result.message.is_empty() => {}
        OutputFormat::Text if result.success => println!("{}", result.message),
        OutputFormat::Text => eprintln!("{}", result.message),
    }
    Ok(())
}

/// Builds the tree the binary navigates.
fn sample_scene() -> Result<NodeTree> {
    let mut tree = NodeTree::new();
    let root = tree.root();

    let level = tree.add_child(root, "level")?;
    tree.add_child(level, "player")?;
    tree.add_child(level, "camera")?;
    let ui = tree.add_child(root, "ui")?;
    tree.add_child(ui, "hud")?;

    Ok(tree)
}
