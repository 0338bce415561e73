//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a `-v` count.
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "wxo_bridge=info",
        1 => "wxo_bridge=debug",
        _ => "wxo_bridge=trace",
    }
}

/// Install a stderr fmt subscriber. `RUST_LOG` wins over `verbose`.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(default_directive(0), "wxo_bridge=info");
        assert_eq!(default_directive(1), "wxo_bridge=debug");
        assert_eq!(default_directive(5), "wxo_bridge=trace");
    }
}
