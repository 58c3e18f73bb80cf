//! Command dispatch table.
//!
//! Hosts implement [`crate::backend::Shell::dispatch_command`] however they
//! like; this registry is the batteries-included version: closures keyed by
//! action id, with a fallback that treats unregistered ids as navigation
//! paths.

use std::collections::HashMap;

use tracing::debug;

type Handler = Box<dyn Fn() + Send + Sync>;

pub struct CommandRegistry {
    handlers: HashMap<String, Handler>,
    fallback: Box<dyn Fn(&str) + Send + Sync>,
}

impl CommandRegistry {
    /// `fallback` receives any id with no registered handler.
    pub fn new(fallback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: Box::new(fallback),
        }
    }

    pub fn register(&mut self, id: impl Into<String>, handler: impl Fn() + Send + Sync + 'static) {
        self.handlers.insert(id.into(), Box::new(handler));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    pub fn dispatch(&self, id: &str) {
        match self.handlers.get(id) {
            Some(handler) => handler(),
            None => {
                debug!(id, "command_fallback_navigation");
                (self.fallback)(id);
            }
        }
    }
}
