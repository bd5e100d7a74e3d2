use std::path::PathBuf;

pub type AppResult<T, E = AppReport> = core::result::Result<T, E>;

pub struct AppReport {
    inner: eyre::Report,
}

impl AppReport {
    /// Adds a line of context on top of the existing chain.
    pub fn wrap(self, context: &'static str) -> Self {
        Self {
            inner: self.inner.wrap_err(context),
        }
    }

    /// Finds the first error of type `E` anywhere in the chain.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        self.inner.chain().find_map(|cause| cause.downcast_ref::<E>())
    }
}

impl From<eyre::Report> for AppReport {
    fn from(report: eyre::Report) -> Self {
        Self { inner: report }
    }
}

impl From<GraphicsError> for AppReport {
    fn from(error: GraphicsError) -> Self {
        Self {
            inner: eyre::Report::new(error),
        }
    }
}

impl From<std::io::Error> for AppReport {
    fn from(error: std::io::Error) -> Self {
        Self {
            inner: eyre::Report::new(error),
        }
    }
}

impl std::fmt::Display for AppReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

impl std::fmt::Debug for AppReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

/// Attaches the name of the step that was running when a call failed.
pub trait WrapStep<T> {
    fn step(self, context: &'static str) -> AppResult<T>;
}

impl<T, E> WrapStep<T> for Result<T, E>
where
    E: Into<AppReport>,
{
    fn step(self, context: &'static str) -> AppResult<T> {
        self.map_err(|error| error.into().wrap(context))
    }
}

/// Failures the graphics context can name. Everything else arrives as an
/// opaque API error.
#[derive(Debug)]
pub enum GraphicsError {
    NoSuitableAdapter,
    DebugLayer(String),
    ShaderCompilation { path: PathBuf, log: String },
    CommandListState { expected: &'static str, found: &'static str },
    Api { call: &'static str, reason: String },
}

impl std::error::Error for GraphicsError {}

impl std::fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphicsError::NoSuitableAdapter => {
                write!(f, "no suitable adapter supports the requested feature level")
            }
            GraphicsError::DebugLayer(reason) => {
                write!(f, "failed to enable the debug layer: {reason}")
            }
            GraphicsError::ShaderCompilation { path, log } => {
                write!(f, "failed to compile shader {}: {log}", path.display())
            }
            GraphicsError::CommandListState { expected, found } => {
                write!(f, "command list must be {expected} but is {found}")
            }
            GraphicsError::Api { call, reason } => write!(f, "{call} failed: {reason}"),
        }
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for AppReport {
    fn from(error: windows::core::Error) -> Self {
        Self {
            inner: eyre::Report::new(WrappedWindowsError::from(error)),
        }
    }
}

#[cfg(windows)]
pub struct WrappedWindowsError {
    inner: windows::core::Error,
}

#[cfg(windows)]
impl From<windows::core::Error> for WrappedWindowsError {
    fn from(error: windows::core::Error) -> Self {
        Self { inner: error }
    }
}

#[cfg(windows)]
impl std::error::Error for WrappedWindowsError {}

#[cfg(windows)]
impl std::fmt::Display for WrappedWindowsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?})", self.inner.message(), self.inner.code())
    }
}

#[cfg(windows)]
impl std::fmt::Debug for WrappedWindowsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}
