use clap::{Parser, Subcommand};
use luachunk_lexer::TokenKind;
use std::path::Path;

#[derive(Parser)]
#[command(name = "luachunk")]
#[command(about = "Split Lua source into statement-aligned chunks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the token stream for a Lua file
    Tokens {
        /// Input .lua file
        path: String,
    },

    /// Print the statement chunks for a Lua file
    Chunks {
        /// Input .lua file
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Tokens { path } => cmd_tokens(&path),
        Command::Chunks { path } => cmd_chunks(&path),
    }
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_tokens(path: &str) {
    let source = read_source(path);

    let output = luachunk_lexer::Scanner::tokenize(&source);
    for token in &output.tokens {
        if token.kind == TokenKind::Eof {
            break;
        }
        println!("{}:{}: {:?}", token.span.line, token.span.column, token.kind);
    }
}

fn cmd_chunks(path: &str) {
    let source = read_source(path);

    let chunks = match luachunk_parser::chunk_source(&source, path) {
        Ok(chunks) => chunks,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    for chunk in &chunks {
        println!("--------------");
        println!("{}", chunk.text);
    }
}
