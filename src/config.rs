use std::time::Duration;

pub const DEFAULT_MAX_IMPORT_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Applied to custom keyword handlers that were registered without a
    /// timeout of their own. `None` waits indefinitely.
    pub handler_timeout: Option<Duration>,
    pub max_import_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            handler_timeout: None,
            max_import_depth: DEFAULT_MAX_IMPORT_DEPTH,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = Some(timeout);
        self
    }

    pub fn with_max_import_depth(mut self, depth: usize) -> Self {
        self.max_import_depth = depth;
        self
    }
}
