use eyre::eyre;

use crate::app_error::AppResult;

pub const DEFAULT_HEADLESS_FRAMES: u64 = 3;

/// Process arguments the application understands. Flags are matched
/// case-insensitively and may start with `-` or `/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppCommandLine {
    pub use_warp_device: bool,
    pub windowed: bool,
    pub debug_layer: bool,
    pub headless: bool,
    pub frames: Option<u64>,
}

impl Default for AppCommandLine {
    fn default() -> Self {
        Self {
            use_warp_device: false,
            windowed: true,
            debug_layer: cfg!(debug_assertions),
            headless: false,
            frames: None,
        }
    }
}

impl AppCommandLine {
    /// Frame limit for the render loop. Headless runs always stop.
    pub fn frame_limit(&self) -> Option<u64> {
        match (self.frames, self.headless) {
            (Some(frames), _) => Some(frames),
            (None, true) => Some(DEFAULT_HEADLESS_FRAMES),
            (None, false) => None,
        }
    }
}

/// Builds an AppCommandLine from the process arguments
pub fn build_command_line() -> AppResult<AppCommandLine> {
    parse_command_line(std::env::args().skip(1))
}

pub fn parse_command_line<I, S>(args: I) -> AppResult<AppCommandLine>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut command_line = AppCommandLine::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let arg = arg.as_ref();
        let Some(flag) = arg.strip_prefix('-').or_else(|| arg.strip_prefix('/')) else {
            continue;
        };
        match flag.to_ascii_lowercase().as_str() {
            "warp" => command_line.use_warp_device = true,
            "fullscreen" => command_line.windowed = false,
            "nodebug" => command_line.debug_layer = false,
            "headless" => command_line.headless = true,
            "frames" => {
                let value = args
                    .next()
                    .ok_or_else(|| eyre!("-frames expects a frame count"))?;
                let frames = value
                    .as_ref()
                    .parse::<u64>()
                    .map_err(|error| eyre!("invalid frame count {:?}: {error}", value.as_ref()))?;
                command_line.frames = Some(frames);
            }
            _ => {}
        }
    }

    Ok(command_line)
}
