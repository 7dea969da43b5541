//! Deptrace CLI entry point

use clap::Parser;
use deptrace::cli::Cli;
use deptrace::trace::output::{create_formatter, OutputFormat};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable
    let filter = if cli.verbose {
        EnvFilter::new("deptrace=debug")
    } else {
        EnvFilter::try_from_env("DEPTRACE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let format = OutputFormat::from_json_flag(cli.command.wants_json());

    let code = match deptrace::cli::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            let rendered = create_formatter(format, 0).format_error(&e.report());
            match format {
                OutputFormat::Json => println!("{}", rendered),
                OutputFormat::Plain => eprint!("{}", rendered),
            }
            e.exit_code()
        }
    };

    std::process::exit(code);
}
