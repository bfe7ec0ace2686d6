use std::env;

use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use oryx::{base_env, config::Config, do_file, eval::eval_bytes, last, repl::repl};

fn print_usage() {
    eprintln!("oryx: an embeddable expression language");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  oryx                 Start the interactive prompt");
    eprintln!("  oryx <expr>..        Evaluate each expression and print its value");
    eprintln!("  oryx -f <file>       Evaluate a program file and print its last value");
    eprintln!("  oryx --help          Show this help message");
    eprintln!("  oryx --version       Show version information");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ORYX_LOG      log filter (default: warn)");
    eprintln!("  ORYX_PROMPT   prompt text (default: \"oryx> \")");
    eprintln!("  ORYX_HISTORY  file to keep prompt history in");
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let config = Config::from_env();
    init_tracing(&config);

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => repl(&config, &base_env(None)).into_diagnostic(),
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        Some("--version" | "-V") => {
            println!("oryx {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some("-f") => {
            let [_, path] = args.as_slice() else {
                print_usage();
                std::process::exit(2);
            };
            let value = do_file(path, None)?;
            println!("{value}");
            Ok(())
        }
        Some(_) => {
            // one scope for all of them, so later expressions see earlier definitions
            let env = base_env(None);
            for expr in &args {
                let value = eval_bytes(expr.as_bytes(), &env).and_then(last)?;
                println!("{value}");
            }
            Ok(())
        }
    }
}
