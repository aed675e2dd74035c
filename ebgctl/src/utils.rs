#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Quiet,
    Normal,
    Verbose,
}

static mut LOG_LEVEL: LogLevel = LogLevel::Normal;

/// Applies the command-line flags. Quiet wins over verbose.
pub fn init_log_level(quiet: bool, verbose: bool) {
    set_log_level(resolve(quiet, verbose));
}

pub fn set_log_level(level: LogLevel) {
    unsafe {
        LOG_LEVEL = level;
    }
}

pub fn log_level() -> LogLevel {
    unsafe { LOG_LEVEL }
}

fn resolve(quiet: bool, verbose: bool) -> LogLevel {
    if quiet {
        LogLevel::Quiet
    } else if verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    }
}

#[macro_export]
macro_rules! log_normal {
    ($($arg:tt)*) => {
        if $crate::utils::log_level() != $crate::utils::LogLevel::Quiet {
            println!("[ebgctl] {}", format_args!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_verbose {
    ($($arg:tt)*) => {
        if $crate::utils::log_level() == $crate::utils::LogLevel::Verbose {
            println!("[ebgctl] {}", format_args!($($arg)*));
        }
    };
}
