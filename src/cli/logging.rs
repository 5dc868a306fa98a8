// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Console output macros shared by the library and the CLI.
//!
//! Output is filtered by a global [`LogLevel`]: `Quiet` keeps only errors,
//! `Normal` adds warnings and results, `Verbose` adds progress detail.

use std::sync::atomic::{AtomicU8, Ordering};

/// Console verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Errors only.
    Quiet = 0,
    /// Errors, warnings and results.
    Normal = 1,
    /// Everything, including section headers and per-keypoint detail.
    Verbose = 2,
}

impl LogLevel {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Quiet,
            1 => Self::Normal,
            _ => Self::Verbose,
        }
    }
}

static LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Verbose as u8);

/// Set the global log level.
pub fn set_level(level: LogLevel) {
    LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Current global log level.
pub fn level() -> LogLevel {
    LogLevel::from_u8(LEVEL.load(Ordering::Relaxed))
}

/// Toggle between `Verbose` and `Normal`.
pub fn set_verbose(verbose: bool) {
    set_level(if verbose { LogLevel::Verbose } else { LogLevel::Normal });
}

/// Check if verbose output is enabled.
pub fn is_verbose() -> bool {
    level() >= LogLevel::Verbose
}

/// Check if warnings and results should be printed.
pub fn is_enabled() -> bool {
    level() >= LogLevel::Normal
}

/// Macro for standard info messages.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        if $crate::cli::logging::is_enabled() {
            println!("{}", format!($($arg)*));
        }
    }
}

/// Macro for warning messages.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        if $crate::cli::logging::is_enabled() {
            eprintln!("{} {}", "WARNING ⚠️".yellow().bold(), format!($($arg)*));
        }
    }}
}

/// Macro for error messages.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "Error:".red().bold(), format!($($arg)*));
    }}
}

/// Macro for success messages.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        if $crate::cli::logging::is_enabled() {
            println!("{} {}", "✅".green(), format!($($arg)*));
        }
    }}
}

/// Macro for messages printed only in verbose mode.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::cli::logging::is_verbose() {
            println!("{}", format!($($arg)*));
        }
    }
}

/// Macro for section headers, printed only in verbose mode.
#[macro_export]
macro_rules! section {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        if $crate::cli::logging::is_verbose() {
            println!();
            println!("{}", format!($($arg)*).cyan().bold());
        }
    }}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels() {
        set_level(LogLevel::Quiet);
        assert!(!is_enabled());
        assert!(!is_verbose());

        set_verbose(false);
        assert_eq!(level(), LogLevel::Normal);
        assert!(is_enabled());
        assert!(!is_verbose());

        set_verbose(true);
        assert_eq!(level(), LogLevel::Verbose);
        assert!(is_verbose());
    }

    #[test]
    fn test_level_from_u8() {
        assert_eq!(LogLevel::from_u8(0), LogLevel::Quiet);
        assert_eq!(LogLevel::from_u8(1), LogLevel::Normal);
        assert_eq!(LogLevel::from_u8(9), LogLevel::Verbose);
    }
}
