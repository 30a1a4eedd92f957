use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};

use crate::config::ClientConfig;
use crate::error::{FritzError, Result};

/// Something that can GET a path relative to the fritz box and hand back the
/// response body. Retries are left to the caller.
pub trait Transport: Send + Sync {
    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String>;
}

/// [`Transport`] over plain HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url,
            client: builder.build()?,
        })
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|err| FritzError::InvalidUrl(format!("{path}: {err}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = self.url(path, query)?;
        let response = self.client.get(url).send()?;
        let status = response.status();
        debug!(
            "[fritz api] GET {} status: {:?} {:?}",
            path,
            status,
            status.canonical_reason().unwrap_or_default()
        );

        if status == StatusCode::FORBIDDEN {
            return Err(FritzError::Forbidden);
        }
        let body = response.error_for_status()?.text()?;
        if body.is_empty() {
            return Err(FritzError::EmptyResponse);
        }
        Ok(body)
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::Transport;
    use crate::error::Result;

    pub(crate) type Query = HashMap<String, String>;
    type Handler = dyn Fn(&str, &Query) -> Result<String> + Send + Sync;

    /// Answers requests with a closure and records every request it saw.
    pub(crate) struct FakeTransport {
        handler: Box<Handler>,
        pub(crate) calls: Arc<Mutex<Vec<(String, Query)>>>,
    }

    impl FakeTransport {
        pub(crate) fn new(
            handler: impl Fn(&str, &Query) -> Result<String> + Send + Sync + 'static,
        ) -> Self {
            Self {
                handler: Box::new(handler),
                calls: Default::default(),
            }
        }

        /// Number of requests that were sent to `path` with `switchcmd` (or no
        /// `switchcmd` when `None`).
        pub(crate) fn count(calls: &Mutex<Vec<(String, Query)>>, path: &str, cmd: Option<&str>) -> usize {
            calls
                .lock()
                .iter()
                .filter(|(p, q)| p == path && q.get("switchcmd").map(String::as_str) == cmd)
                .count()
        }
    }

    impl Transport for FakeTransport {
        fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
            let query: Query = query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.calls.lock().push((path.to_string(), query.clone()));
            (self.handler)(path, &query)
        }
    }

    pub(crate) const CHALLENGE_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<SessionInfo><SID>0000000000000000</SID><Challenge>1234567z</Challenge><BlockTime>0</BlockTime><Rights></Rights></SessionInfo>"#;

    pub(crate) fn sid_xml(sid: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<SessionInfo><SID>{sid}</SID><Challenge>1234567z</Challenge><BlockTime>0</BlockTime><Rights><Name>HomeAuto</Name><Access>2</Access></Rights></SessionInfo>"#
        )
    }

    pub(crate) const DEVICE_LIST_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<devicelist version="1" fwversion="7.29">
<device identifier="11657 0272633" id="16" functionbitmask="35712" fwversion="04.16" manufacturer="AVM" productname="FRITZ!DECT 200">
  <present>1</present><txbusy>0</txbusy><name>Lampe</name>
  <switch><state>0</state><mode>manuell</mode><lock>0</lock><devicelock>0</devicelock></switch>
  <powermeter><voltage>229978</voltage><power>0</power><energy>12345</energy></powermeter>
  <temperature><celsius>215</celsius><offset>0</offset></temperature>
</device>
<device identifier="09995 0335100" id="17" functionbitmask="320" fwversion="04.94" manufacturer="AVM" productname="FRITZ!DECT 301">
  <present>1</present><name>Heizung</name>
  <temperature><celsius>195</celsius><offset>0</offset></temperature>
</device>
<device identifier="08761 0000434" id="18" functionbitmask="kaputt" fwversion="04.16" manufacturer="AVM" productname="FRITZ!DECT 200">
  <present>1</present><name>Kaputt</name>
  <switch><state>1</state></switch>
</device>
<device identifier="11657 0000001" id="19" functionbitmask="35712" fwversion="04.16" manufacturer="AVM" productname="FRITZ!DECT 210">
  <present>1</present><name>Büro</name>
  <switch><state>1</state><mode>auto</mode><lock>0</lock><devicelock>0</devicelock></switch>
  <powermeter><voltage>230100</voltage><power>61230</power><energy>200</energy></powermeter>
  <temperature><celsius>230</celsius><offset>0</offset></temperature>
</device>
</devicelist>"#;

    /// Answers the login handshake: no query -> challenge, with a response ->
    /// `sid`.
    pub(crate) fn login(query: &Query, sid: &str) -> Result<String> {
        if query.contains_key("response") {
            Ok(sid_xml(sid))
        } else {
            Ok(CHALLENGE_XML.to_string())
        }
    }
}
