use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use loxwalk::ast_printer::AstPrinter;
use loxwalk::error::Diagnostics;
use loxwalk::parser::Parser;
use loxwalk::scanner::Scanner;
use loxwalk::{Lox, RunStatus};

#[derive(ClapParser, Debug)]
#[command(version, about = "Tree-walking interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print tokens as JSON lines instead of `KIND lexeme literal`
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: PathBuf },

    /// Runs input from a file as a program
    Run { filename: PathBuf },

    /// Reads and runs one line at a time; globals persist between lines
    Repl,
}

/// Reads the contents of a file into a String
fn read_file(filename: PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("File {:?} is not valid UTF-8", filename))
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip the crate prefix from module paths
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("loxwalk::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env() // RUST_LOG overrides the default level
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    for e in diagnostics.errors() {
        eprintln!("{}", e);
    }
}

fn tokenize(filename: PathBuf, json: bool) -> Result<i32> {
    let source = read_file(filename)?;
    let mut diagnostics = Diagnostics::new();

    for result in Scanner::new(&source) {
        match result {
            Ok(token) => {
                debug!("Scanned token: {}", token);

                if json {
                    println!("{}", serde_json::to_string(&token)?);
                } else {
                    println!("{}", token);
                }
            }

            Err(e) => {
                eprintln!("{}", e);
                diagnostics.report(e);
            }
        }
    }

    Ok(diagnostics.exit_code())
}

fn parse(filename: PathBuf) -> Result<i32> {
    let source = read_file(filename)?;
    let mut diagnostics = Diagnostics::new();

    let tokens = loxwalk::scanner::scan(&source, &mut diagnostics);

    if !diagnostics.had_error() {
        if let Some(expr) = Parser::new(&tokens).parse_expression(&mut diagnostics) {
            let ast = AstPrinter.print(&expr);

            debug!("AST: {}", ast);
            println!("{}", ast);
        }
    }

    print_diagnostics(&diagnostics);

    Ok(diagnostics.exit_code())
}

fn run(filename: PathBuf) -> Result<i32> {
    let source = read_file(filename)?;

    info!("Provided input:\n {}", source);

    let mut lox = Lox::new();
    let status = lox.run(&source);

    print_diagnostics(lox.diagnostics());

    Ok(status.exit_code())
}

fn repl() -> Result<i32> {
    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        if line.trim().is_empty() {
            continue;
        }

        let status = lox.run(&line);
        debug!("REPL line finished with {:?}", status);

        if status != RunStatus::Ok {
            print_diagnostics(lox.diagnostics());
        }
    }

    Ok(0)
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let code = match args.commands {
        Commands::Tokenize { filename, json } => tokenize(filename, json)?,
        Commands::Parse { filename } => parse(filename)?,
        Commands::Run { filename } => run(filename)?,
        Commands::Repl => repl()?,
    };

    if code != 0 {
        debug!("Exiting with code {}", code);
        std::process::exit(code);
    }

    Ok(())
}
