use crate::error::{constants, ProtocolError, Result};
use crate::protocol::message::Command;
use crate::protocol::opcode::Opcode;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::trace;

type HandlerFn = dyn Fn(&Command) -> Result<Option<Command>> + Send + Sync + 'static;

/// Routes decoded commands to handlers keyed by opcode.
///
/// A handler may answer with a command to send back. Cloning the dispatcher
/// shares the registry. Handlers run after the registry lock is released, so
/// a handler may register further handlers.
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Arc<RwLock<HashMap<Opcode, Arc<HandlerFn>>>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Install `handler` for `opcode`, replacing any previous one.
    pub fn register<F>(&self, opcode: Opcode, handler: F) -> Result<()>
    where
        F: Fn(&Command) -> Result<Option<Command>> + Send + Sync + 'static,
    {
        let mut handlers = self
            .handlers
            .write()
            .map_err(|_| ProtocolError::Dispatch(constants::ERR_HANDLERS_POISONED.to_string()))?;

        handlers.insert(opcode, Arc::new(handler));
        Ok(())
    }

    pub fn is_registered(&self, opcode: Opcode) -> bool {
        self.handlers
            .read()
            .map(|handlers| handlers.contains_key(&opcode))
            .unwrap_or(false)
    }

    pub fn dispatch(&self, command: &Command) -> Result<Option<Command>> {
        let opcode = command.opcode();

        let handler = self
            .handlers
            .read()
            .map_err(|_| ProtocolError::Dispatch(constants::ERR_HANDLERS_POISONED.to_string()))?
            .get(&opcode)
            .cloned()
            .ok_or(ProtocolError::UnknownOpcode(opcode.as_u8()))?;

        trace!(%opcode, "dispatching command");
        handler(command)
    }
}
