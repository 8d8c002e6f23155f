//! bnd - bindery command-line entry point.

use bindery::cli;
use bindery::ui::output;

fn main() {
    if let Err(error) = cli::run() {
        output::error(format!("{error:#}"));
        std::process::exit(1);
    }
}
