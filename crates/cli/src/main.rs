use anyhow::Result;
use cmdr_opts::{Command, Outcome};
use tracing_subscriber::{EnvFilter, fmt};

/// Caller state mutated by the option handlers.
#[derive(Debug, Default)]
struct Flags {
    verbose: bool,
    required: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();

    let argv: Vec<String> = std::env::args().collect();

    let mut command = Command::new("cmdr", env!("CARGO_PKG_VERSION"), Flags::default());
    command.set_usage("[options] [ARG1 [ARG2 [ARG3]]]");

    command.option("-v", "--verbose", "enable verbose output", |flags, _context| {
        flags.verbose = true;
    })?;
    command.option(
        "-r",
        "--required <arg>",
        "a value that must follow the flag",
        |flags, context| {
            flags.required = context.value.map(str::to_string);
        },
    )?;
    command.option(
        "-o",
        "--optional [arg]",
        "a value that may follow the flag",
        |_flags, context| match context.value {
            Some(value) => println!("Optional: {value}"),
            None => println!("Optional: enabled"),
        },
    )?;

    tracing::debug!("parsing argument vector");
    match command.parse(&argv)? {
        Outcome::HelpRequested | Outcome::VersionRequested => return Ok(()),
        Outcome::Completed => {}
    }

    // The engine imposes no positional limit; that policy lives here.
    let args = command.additional_args();
    if args.len() > 3 {
        eprintln!("Too many command line arguments were specified");
        command.help();
        std::process::exit(1);
    }

    if args.is_empty() {
        println!("No additional args");
    } else {
        println!("Additional args:");
        for arg in args {
            println!("  - '{arg}'");
        }
    }

    let flags = command.state();
    if let Some(required) = &flags.required {
        println!("Required is: {required}");
    }
    println!(
        "Verbose status is {}",
        if flags.verbose { "enabled" } else { "disabled" }
    );

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
