use std::fmt;

/// Fatal startup failures. The runtime never enters its frame loop after one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// Event loop or window could not be created.
    ContextCreation(String),
    /// GPU instance, adapter, device or surface could not be set up.
    ModuleInit(String),
}

impl InitError {
    pub(crate) fn context_creation(what: &str, err: impl fmt::Display) -> Self {
        Self::ContextCreation(format!("{what}: {err}"))
    }

    pub(crate) fn module_init(what: &str, err: impl fmt::Display) -> Self {
        Self::ModuleInit(format!("{what}: {err}"))
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContextCreation(msg) => write!(f, "window/context creation failed: {msg}"),
            Self::ModuleInit(msg) => write!(f, "graphics module initialization failed: {msg}"),
        }
    }
}

impl std::error::Error for InitError {}
