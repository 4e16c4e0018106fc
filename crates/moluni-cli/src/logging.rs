use log::LevelFilter;

/// Instala `env_logger` en stderr. `RUST_LOG` tiene prioridad sobre los
/// flags `-v`/`-q`.
pub fn setup_logging(verbosity: u8, quiet: bool) {
    let level = level_for(verbosity, quiet);
    let _ = env_logger::Builder::new().filter_level(level)
                                      .format_target(false)
                                      .parse_default_env()
                                      .try_init();
}

fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
