//! afterschool entry point
//!
//! Parses arguments and dispatches through `cli::run`. Failures are logged as
//! a FATAL line on stderr and the process exits non-zero.

use afterschool::cli;
use afterschool::observability::Logger;

fn main() {
    if let Err(e) = cli::run() {
        Logger::fatal(
            "AFTERSCHOOL_FATAL",
            &[("code", e.code_str()), ("message", e.message())],
        );
        std::process::exit(1);
    }
}
