use std::process::ExitCode;

fn main() -> ExitCode {
    match gitpix::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            gitpix::ui::output::error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
