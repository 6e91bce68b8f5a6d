use std::io::{self, BufRead, Write};

use calculator::{CalcError, Calculator, Lexer, ModuloOperand, Options, Trailing, check_terminator};
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use miette::{IntoDiagnostic, WrapErr};

#[derive(Parser, Debug)]
#[command(version, about = "Evaluate arithmetic expressions")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Statement terminator allowed before and after an expression
    #[arg(long, global = true, default_value_t = ';', value_parser = parse_terminator)]
    terminator: char,

    /// Precedence of the right operand of `%`
    #[arg(long, global = true, value_enum, default_value_t = ModuloOperand::Term)]
    modulo_operand: ModuloOperand,

    /// Ignore anything after a complete expression instead of failing
    #[arg(long, global = true)]
    allow_trailing: bool,

    /// Maximum nesting of parentheses and unary signs
    #[arg(long, global = true, default_value_t = 256)]
    max_depth: usize,

    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate each expression, or every line of stdin when none are given
    Eval { expressions: Vec<String> },
    /// Print the tokens of an expression
    Tokenize { expression: String },
    /// Evaluate expressions interactively
    Repl,
}

fn parse_terminator(s: &str) -> Result<char, String> {
    let terminator = s.parse::<char>().map_err(|e| e.to_string())?;
    check_terminator(terminator).map_err(|e| e.to_string())
}

impl Args {
    fn options(&self) -> Options {
        Options {
            terminator: self.terminator,
            modulo_operand: self.modulo_operand,
            trailing: if self.allow_trailing {
                Trailing::Ignore
            } else {
                Trailing::Reject
            },
            max_depth: self.max_depth,
        }
    }
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let calc = Calculator::with_options(args.options())?;

    match args.command {
        Commands::Eval { expressions } => {
            let inputs = if expressions.is_empty() {
                io::stdin()
                    .lock()
                    .lines()
                    .collect::<Result<Vec<_>, _>>()
                    .into_diagnostic()
                    .wrap_err("reading expressions from stdin failed")?
                    .into_iter()
                    .filter(|line| !line.trim().is_empty())
                    .collect()
            } else {
                expressions
            };

            let mut failed = false;
            for input in &inputs {
                match calc.evaluate(input) {
                    Ok(value) => println!("{value}"),
                    Err(e) => {
                        eprintln!("{:?}", miette::Report::new(e));
                        failed = true;
                    }
                }
            }
            if failed {
                std::process::exit(65);
            }
        }
        Commands::Tokenize { expression } => {
            for token in Lexer::with_terminator(None, &expression, calc.options().terminator) {
                let token = match token {
                    Ok(token) => token,
                    Err(e) => {
                        if let CalcError::BadToken(bad) = &e {
                            eprintln!("Error: Unexpected character: {}", bad.token);
                        }
                        eprintln!("{:?}", miette::Report::new(e));
                        std::process::exit(65);
                    }
                };
                println!("{token}");
            }
            println!("EOF  null");
        }
        Commands::Repl => repl(&calc.named("<repl>"))?,
    }
    Ok(())
}

fn repl(calc: &Calculator) -> miette::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush().into_diagnostic()?;

        let mut line = String::new();
        let read = stdin
            .read_line(&mut line)
            .into_diagnostic()
            .wrap_err("reading input failed")?;
        if read == 0 {
            println!();
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        match calc.evaluate(line) {
            Ok(value) => println!("{value}"),
            Err(e) => eprintln!("{:?}", miette::Report::new(e)),
        }
    }
    Ok(())
}
