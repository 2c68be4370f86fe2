use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox as lox;

use lox::ast_printer::AstPrinter;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::scanner::{tokenize, Scanner};
use lox::session::{Failure, Session};

/// Exit code for lex, parse and resolve errors.
const EXIT_STATIC: i32 = 65;
/// Exit code for runtime errors.
const EXIT_RUNTIME: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to a file
    #[arg(long, global = true)]
    log: bool,

    /// File written when --log is given
    #[arg(long, global = true, default_value = "app.log")]
    log_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print tokens as JSON, one per line
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: PathBuf },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs a program from a file, or starts a prompt when no file is given
    Run { filename: Option<PathBuf> },
}

/// Reads the contents of a file into a String
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = String::new();

    let bytes = reader
        .read_to_string(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger(path: &Path) -> Result<()> {
    let log_file = File::create(path).context(format!("Failed to create {:?}", path))?;

    Builder::new()
        .format(|buf, record| {
            // Strip the crate prefix from the module path
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // RUST_LOG below overrides
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to {:?}", path);
    Ok(())
}

fn report(failure: &Failure) -> i32 {
    for error in failure.errors() {
        eprintln!("{}", error);
    }

    match failure {
        Failure::Static(_) => EXIT_STATIC,
        Failure::Runtime(_) => EXIT_RUNTIME,
    }
}

fn tokenize_command(filename: &Path, json: bool) -> Result<i32> {
    let source = read_file(filename)?;
    let mut tokenized = true;

    for token in Scanner::new(source.as_bytes()) {
        match token {
            Ok(token) if json => println!("{}", serde_json::to_string(&token)?),
            Ok(token) => println!("{}", token),
            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    Ok(if tokenized { 0 } else { EXIT_STATIC })
}

fn parse_command(filename: &Path, evaluate: bool) -> Result<i32> {
    let source = read_file(filename)?;
    let (tokens, errors) = tokenize(&source);

    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{}", e);
        }
        return Ok(EXIT_STATIC);
    }

    let expr = match Parser::new(&tokens).parse_expression() {
        Ok(expr) => expr,
        Err(e) => {
            debug!("Parse debug: {}", e);
            eprintln!("{}", e);
            return Ok(EXIT_STATIC);
        }
    };

    if !evaluate {
        println!("{}", AstPrinter.print(&expr));
        return Ok(0);
    }

    match Interpreter::new().evaluate(&expr) {
        Ok(value) => {
            println!("{}", value);
            Ok(0)
        }
        Err(e) => {
            eprintln!("{}", e);
            Ok(EXIT_RUNTIME)
        }
    }
}

fn run_file(filename: &Path) -> Result<i32> {
    let source = read_file(filename)?;
    info!("Provided input:\n {}", source);

    let mut session = Session::new();

    Ok(match session.run(&source) {
        Ok(()) => {
            info!("Program executed successfully");
            0
        }
        Err(failure) => report(&failure),
    })
}

/// Each line is its own unit; an error ends the line, not the session.
fn run_prompt() -> Result<i32> {
    let mut session = Session::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            return Ok(0);
        };

        if let Err(failure) = session.run(&line?) {
            report(&failure);
        }
    }
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger(&args.log_file)?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let code = match &args.commands {
        Commands::Tokenize { filename, json } => tokenize_command(filename, *json)?,
        Commands::Parse { filename } => parse_command(filename, false)?,
        Commands::Evaluate { filename } => parse_command(filename, true)?,
        Commands::Run {
            filename: Some(filename),
        } => run_file(filename)?,
        Commands::Run { filename: None } => run_prompt()?,
    };

    if code != 0 {
        debug!("Exiting with code {}", code);
        std::process::exit(code);
    }

    Ok(())
}
