use log::LevelFilter;

/// Level selected by the `-q` / `-v` flags.
pub fn level(quiet: bool, verbose: u8) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the global logger on stderr. `RUST_LOG` takes precedence over
/// the flags.
pub fn init(quiet: bool, verbose: u8) {
    env_logger::builder()
        .format_timestamp(None)
        .filter_level(level(quiet, verbose))
        .parse_default_env()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level(true, 0), LevelFilter::Error);
        assert_eq!(level(false, 0), LevelFilter::Warn);
        assert_eq!(level(false, 1), LevelFilter::Info);
        assert_eq!(level(false, 2), LevelFilter::Debug);
        assert_eq!(level(false, 7), LevelFilter::Trace);
    }
}
