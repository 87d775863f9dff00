//! `shiroc`: the CLI entry point (spec §3.3 ambient stack), grounded in the
//! teacher's `src/bin/why/{cli.rs,main.rs}` — a `clap`-derived `Cli`, a
//! `--verbosity` flag feeding `simple_logger`, then a thin `main` that hands
//! off to the library and turns the result into an exit code.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info};

use shiro_lib::ast::printer::Printer;
use shiro_lib::driver::Builder;

/// Compiler front-end for the Shiro systems language.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Project root directory containing `shiro.toml`.
    #[arg(index = 1)]
    root: PathBuf,

    /// Specify the log level of the compiler.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    verbosity: LogLevel,

    /// Pretty-print every module's parsed AST before semantic analysis.
    #[arg(long)]
    dump_ast: bool,

    /// Pretty-print every module's symbol table after semantic analysis.
    #[arg(long)]
    dump_symbols: bool,
}

#[derive(ValueEnum, Clone, Default, Debug)]
enum LogLevel {
    #[default]
    #[value(alias("0"))]
    Error,
    #[value(alias("1"))]
    Warn,
    #[value(alias("2"))]
    Info,
    #[value(alias("3"))]
    Debug,
    #[value(alias("4"))]
    Trace,
}

impl From<LogLevel> for log::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();
    simple_logger::init_with_level(args.verbosity.clone().into()).unwrap();

    let mut builder = match Builder::from_root(args.root.clone()) {
        Ok(b) => b,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    info!("building project '{}' from {}", builder.project_name, args.root.display());

    if let Err(e) = builder.build() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    if args.dump_ast {
        for (name, module) in &builder.modules {
            for root in &module.roots {
                info!("AST of module '{name}', file '{}':\n{}", root.file, Printer::print_root(root));
            }
        }
    }

    if args.dump_symbols {
        for (name, module) in &builder.modules {
            let names: Vec<&str> = builder.ctx.symbols.scope(module.global).names().map(|(n, _)| n).collect();
            info!("symbols declared in module '{name}': {names:?}");
        }
    }

    for diag in builder.ctx.diagnostics.iter() {
        eprintln!("{diag}");
    }

    if builder.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
