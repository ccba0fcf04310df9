//! archimap-export: convert the architecture SQLite database into paginated
//! JSON files and a search index for fast static loading.

use std::process::ExitCode;

fn main() -> ExitCode {
    match archimap_export::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(usage) = err.downcast_ref::<clap::Error>() {
                let _ = usage.print();
                // --help and --version are reported through the same path.
                return if usage.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
            }
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
