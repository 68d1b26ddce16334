//! Tracing subscriber setup shared by both binaries.

/// Initialize logging to stderr.
///
/// Respects `RUST_LOG` if set, otherwise picks defaults based on the verbose
/// flag.
pub fn init(verbose: bool) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "mp4dash=trace,dash_av=debug".to_string()
        } else {
            "mp4dash=info,dash_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();
}
