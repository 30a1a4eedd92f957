#[derive(thiserror::Error, Debug)]
pub enum FritzError {
    #[error("invalid url: `{0}`")]
    InvalidUrl(String),

    #[error("empty response from fritz box")]
    EmptyResponse,

    #[error("cannot read from fritz box: `{0}`")]
    ReadFailure(String),

    #[error("Request forbidden. Are you logged in, is the sid correct and recent?")]
    Forbidden,

    #[error("fritz box did not send a login challenge")]
    ChallengeMissing,

    #[error("invalid session id received, check user name and password")]
    InvalidToken,

    #[error("login blocked by fritz box for {0} seconds")]
    LoginBlocked(u32),

    #[error("cannot parse xml: `{0}`")]
    ParseFailure(String),

    #[error("unexpected response to `{context}`: {response:?}")]
    UnexpectedResponse { context: String, response: String },

    #[error("session is no longer accepted, re-authentication required")]
    ReauthenticationRequired,

    #[error("device `{ain}`: {source}")]
    Device {
        ain: String,
        #[source]
        source: Box<FritzError>,
    },

    #[error("unable to access session file: {0}")]
    SessionFile(#[from] std::io::Error),

    #[error("unable to read session file: {0}")]
    SessionFormat(#[from] serde_yaml::Error),
}

impl FritzError {
    /// Wraps `self` with the identifier of the device the failed request was
    /// about.
    pub(crate) fn for_device(self, ain: impl ToString) -> Self {
        FritzError::Device {
            ain: ain.to_string(),
            source: Box::new(self),
        }
    }

    /// True for the conditions the fritz box produces when the session id was
    /// dropped on its side. The caller should log in again before retrying.
    pub fn needs_reauthentication(&self) -> bool {
        match self {
            FritzError::EmptyResponse
            | FritzError::Forbidden
            | FritzError::ReauthenticationRequired => true,
            FritzError::Device { source, .. } => source.needs_reauthentication(),
            _ => false,
        }
    }

    /// The device identifier attached to a failed device command.
    pub fn ain(&self) -> Option<&str> {
        match self {
            FritzError::Device { ain, .. } => Some(ain),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FritzError {
    fn from(err: reqwest::Error) -> Self {
        FritzError::ReadFailure(err.to_string())
    }
}

impl From<serde_xml_rs::Error> for FritzError {
    fn from(err: serde_xml_rs::Error) -> Self {
        FritzError::ParseFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FritzError>;
