// compi: C subset to synchronous VHDL compiler

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use crossterm::tty::IsTty;

use compi::diagnostics::{self, Category, Diagnostic, DiagnosticRenderer, Severity};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Parser, Debug)]
#[command(
    name = "compi",
    version,
    about = "Compile a C subset to synchronous VHDL",
    long_about = "Compile a C subset to synchronous VHDL.\n\n\
Every function becomes an entity with clk, reset, one input port per \
parameter and a result output port. The function body runs inside a single \
clocked process."
)]
struct Cli {
    /// C source file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// VHDL output file (stdout when omitted)
    #[arg(value_name = "OUTPUT", conflicts_with = "output_flag")]
    output: Option<PathBuf>,

    /// VHDL output file, alternative to the positional OUTPUT
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output_flag: Option<PathBuf>,

    /// Print the parsed AST to stderr before generating code
    #[arg(long)]
    dump_ast: bool,

    /// When to color diagnostics
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, value_name = "WHEN")]
    color: ColorChoice,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => io::stderr().is_tty(),
    };
    let file_name = cli.input.display().to_string();

    let source = match fs::read_to_string(&cli.input) {
        Ok(source) => source,
        Err(err) => {
            let diag = Diagnostic::new(
                Severity::Error,
                Category::General,
                format!("cannot read input: {}", err),
            )
            .with_file(&file_name);
            eprint!("{}", DiagnosticRenderer::new(color).render(&diag));
            return ExitCode::FAILURE;
        }
    };
    let renderer = DiagnosticRenderer::new(color).with_source(&file_name, &source);

    log::info!("parsing {}", file_name);
    let compilation = match compi::compile(&source) {
        Ok(compilation) => compilation,
        Err(err) => {
            let diag = Diagnostic::from(&err);
            eprint!("{}", renderer.render(&diag));
            if let Some(summary) = diagnostics::summary(std::slice::from_ref(&diag)) {
                eprintln!("{}", summary);
            }
            return ExitCode::FAILURE;
        }
    };

    for diag in &compilation.diagnostics {
        eprint!("{}", renderer.render(diag));
    }

    if cli.dump_ast {
        eprint!("{}", compilation.program.render_tree());
    }

    let written = match cli.output.or(cli.output_flag) {
        Some(path) => fs::write(&path, &compilation.vhdl).map(|()| {
            log::info!("wrote {}", path.display());
        }),
        None => io::stdout().write_all(compilation.vhdl.as_bytes()),
    };
    if let Err(err) = written {
        let diag = Diagnostic::new(
            Severity::Error,
            Category::General,
            format!("cannot write output: {}", err),
        );
        eprint!("{}", renderer.render(&diag));
        return ExitCode::FAILURE;
    }

    if let Some(summary) = diagnostics::summary(&compilation.diagnostics) {
        eprintln!("{}", summary);
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_and_flag_output() {
        let cli = Cli::try_parse_from(["compi", "in.c", "out.vhd"]).unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("out.vhd")));

        let cli = Cli::try_parse_from(["compi", "in.c", "-o", "x.vhd", "-vv"]).unwrap();
        assert_eq!(cli.output_flag, Some(PathBuf::from("x.vhd")));
        assert_eq!(cli.verbose, 2);

        assert!(Cli::try_parse_from(["compi", "in.c", "a.vhd", "-o", "b.vhd"]).is_err());
    }
}
