use colored::Colorize;

fn main() {
    if let Err(err) = habitstake_cli::run() {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}
