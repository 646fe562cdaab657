use std::process::ExitCode;

mod host;
mod hw;

/// Exit code the process supervisor treats as a restart request.
const RESTART_EXIT_CODE: u8 = 75;

#[tokio::main]
async fn main() -> ExitCode {
    match host::run().await {
        Ok(host::Exit::Normal) => ExitCode::SUCCESS,
        Ok(host::Exit::Restart) => ExitCode::from(RESTART_EXIT_CODE),
        Err(err) => {
            eprintln!("fatal: {err:#}");
            ExitCode::FAILURE
        }
    }
}
