use colored::Colorize;
use invariant_gate_cli::CliError;

fn main() {
    let code = match invariant_gate_cli::run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            CliError::EXIT_CODE
        }
    };
    std::process::exit(code);
}
