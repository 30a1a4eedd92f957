use std::sync::Arc;

use chrono::Utc;

use crate::commands::{self, SwitchAction, SwitchOutcome};
use crate::config::{ClientConfig, Credentials};
use crate::devices::Device;
use crate::directory::DeviceDirectory;
use crate::error::Result;
use crate::session::{MemorySessionStore, SessionManager, SessionState, SessionStore};
use crate::transport::{HttpTransport, Transport};

/// The main interface to the fritz box smart home outlets.
///
/// All methods take `&self`, share it between threads with an [`Arc`].
pub struct FritzClient {
    transport: Box<dyn Transport>,
    session: SessionManager,
    directory: DeviceDirectory,
}

impl std::fmt::Debug for FritzClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FritzClient")
            .field("session", &self.session)
            .field("devices", &self.directory.snapshot().len())
            .finish()
    }
}

impl FritzClient {
    /// Client over HTTP that keeps its session in memory only.
    pub fn new(config: &ClientConfig, credentials: Credentials) -> Result<Self> {
        Self::with_store(config, credentials, MemorySessionStore::new())
    }

    pub fn with_store(
        config: &ClientConfig,
        credentials: Credentials,
        store: impl SessionStore + 'static,
    ) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        let session = SessionManager::new(config, credentials, store);
        Ok(Self::with_transport(transport, session))
    }

    pub fn with_transport(transport: impl Transport + 'static, session: SessionManager) -> Self {
        FritzClient {
            transport: Box::new(transport),
            session,
            directory: DeviceDirectory::new(),
        }
    }

    /// Logs in, even if the current session is still valid.
    pub fn login(&self) -> Result<()> {
        self.session.authenticate(self.transport.as_ref())?;
        Ok(())
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state(Utc::now())
    }

    /// Fetches the switchable devices and replaces the snapshot. If the
    /// fritz box no longer accepts the session, logs in once more and
    /// retries.
    pub fn list_devices(&self) -> Result<Arc<Vec<Device>>> {
        self.list_attempt(0)
    }

    /// The last fetched devices, without talking to the fritz box.
    pub fn devices(&self) -> Arc<Vec<Device>> {
        self.directory.snapshot()
    }

    pub fn device(&self, ain: &str) -> Option<Device> {
        self.directory.get(ain)
    }

    pub fn toggle(&self, ain: &str) -> Result<SwitchOutcome> {
        self.switch(ain, SwitchAction::Toggle)
    }

    pub fn turn_on(&self, ain: &str) -> Result<SwitchOutcome> {
        self.switch(ain, SwitchAction::On)
    }

    pub fn turn_off(&self, ain: &str) -> Result<SwitchOutcome> {
        self.switch(ain, SwitchAction::Off)
    }

    /// Sends `action` for `ain`. Never retried: a rejected session is
    /// dropped so the next call logs in again, and the error is returned.
    pub fn switch(&self, ain: &str, action: SwitchAction) -> Result<SwitchOutcome> {
        let sid = self.session.token(self.transport.as_ref())?;
        match commands::switch(self.transport.as_ref(), &sid, ain, action) {
            Ok(outcome) => {
                self.directory.apply(&outcome);
                Ok(outcome)
            }
            Err(err) => {
                if err.needs_reauthentication() {
                    self.session.invalidate_token(&sid);
                }
                Err(err)
            }
        }
    }

    // -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

    fn list_attempt(&self, attempt: usize) -> Result<Arc<Vec<Device>>> {
        let sid = self.session.token(self.transport.as_ref())?;
        match self.directory.refresh(self.transport.as_ref(), &sid) {
            Err(err) if err.needs_reauthentication() && attempt == 0 => {
                self.session.invalidate_token(&sid);
                self.list_attempt(attempt + 1)
            }
            result => result,
        }
    }
}
