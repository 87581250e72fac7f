/// Log tags identifying the subsystem a message originates from
///
/// Each tag maps to a --debug-<module> command-line flag and a console color.
use colored::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Store,
    Limiter,
    Hub,
    Coordinator,
    Webserver,
}

impl LogTag {
    /// Plain uppercase name used in file output
    pub fn to_plain_string(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Store => "STORE",
            LogTag::Limiter => "LIMITER",
            LogTag::Hub => "HUB",
            LogTag::Coordinator => "COORD",
            LogTag::Webserver => "WEB",
        }
    }

    /// Key used for the --debug-<module> flag
    pub fn to_debug_key(&self) -> &'static str {
        match self {
            LogTag::System => "system",
            LogTag::Config => "config",
            LogTag::Store => "store",
            LogTag::Limiter => "limiter",
            LogTag::Hub => "hub",
            LogTag::Coordinator => "coordinator",
            LogTag::Webserver => "webserver",
        }
    }

    /// Console color for the tag column
    pub fn color(&self) -> Color {
        match self {
            LogTag::System => Color::White,
            LogTag::Config => Color::Yellow,
            LogTag::Store => Color::Green,
            LogTag::Limiter => Color::Magenta,
            LogTag::Hub => Color::Cyan,
            LogTag::Coordinator => Color::Blue,
            LogTag::Webserver => Color::BrightBlue,
        }
    }

    /// All known tags (used when printing debug flag help)
    pub fn all() -> &'static [LogTag] {
        &[
            LogTag::System,
            LogTag::Config,
            LogTag::Store,
            LogTag::Limiter,
            LogTag::Hub,
            LogTag::Coordinator,
            LogTag::Webserver,
        ]
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
