mod cli;
mod play;
mod render;
mod replay;

use oshi_diagnosis::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
