use std::any::Any;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::endpoint::{EndpointAddr, ServiceUrl};
use crate::net;
use crate::response::ResponseFuture;

/// Reserved attachment key signalling that the call should be invoked
/// asynchronously. Transport implementations read it as a raw string so
/// third-party peers stay interoperable.
pub const ASYNC_ATTACHMENT_KEY: &str = "async";

/// Reserved attachment key signalling that no response is expected.
/// Transport implementations read it as a raw string.
pub const RETURN_ATTACHMENT_KEY: &str = "return";

/// Shape of a call as signalled through the reserved attachment keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallMode {
    Sync,
    Async,
    OneWay,
}

/// Per-call metadata record threaded through a single remote invocation
///
/// One context belongs to exactly one logical call. It is passed by mutable
/// reference through the call path and never shared between tasks, so no
/// locking is involved; a task spawned from within a call builds its own
/// context.
///
/// The transport layer reads the method signature and attachments during
/// dispatch and attaches the in-flight response once the request is on the
/// wire.
#[derive(Default)]
pub struct CallContext {
    pending_response: Option<Box<dyn Any + Send>>,
    urls: Option<Vec<ServiceUrl>>,
    url: Option<ServiceUrl>,
    method_name: Option<String>,
    parameter_types: Vec<String>,
    arguments: Vec<Vec<u8>>,
    local_address: Option<EndpointAddr>,
    remote_address: Option<EndpointAddr>,
    attachments: HashMap<String, String>,
    values: HashMap<String, Box<dyn Any + Send>>,
    service_addr: Option<String>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every field so the context can be reused at a request boundary
    /// without leaking metadata from the previous call. Idempotent.
    pub fn reset(&mut self) {
        tracing::trace!("resetting call context");
        *self = Self::default();
    }

    /// True when this side is the provider (server) of the call
    ///
    /// A provider observes the remote address as the caller, whose port or
    /// host differs from the provider's own advertised url. Absent url or
    /// remote address reads as false.
    pub fn is_provider_side(&self) -> bool {
        let (Some(url), Some(remote)) = (&self.url, &self.remote_address) else {
            return false;
        };
        url.port() != remote.port()
            || net::filter_local_host(url.ip())
                != net::filter_local_host(&remote.host_for_compare())
    }

    /// True when this side is the consumer (client) of the call
    ///
    /// A consumer observes the remote address as the provider's advertised
    /// endpoint, so url and remote address coincide.
    pub fn is_consumer_side(&self) -> bool {
        let (Some(url), Some(remote)) = (&self.url, &self.remote_address) else {
            return false;
        };
        url.port() == remote.port()
            && net::filter_local_host(url.ip())
                == net::filter_local_host(&remote.host_for_compare())
    }

    /// Candidate endpoints for the call; a single resolved url is presented
    /// as a one-element list
    pub fn urls(&self) -> Option<Vec<ServiceUrl>> {
        match (&self.urls, &self.url) {
            (None, Some(url)) => Some(vec![url.clone()]),
            (urls, _) => urls.clone(),
        }
    }

    pub fn set_urls(&mut self, urls: Vec<ServiceUrl>) -> &mut Self {
        self.urls = Some(urls);
        self
    }

    pub fn url(&self) -> Option<&ServiceUrl> {
        self.url.as_ref()
    }

    pub fn set_url(&mut self, url: ServiceUrl) -> &mut Self {
        self.url = Some(url);
        self
    }

    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    pub fn set_method_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.method_name = Some(name.into());
        self
    }

    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }

    pub fn set_parameter_types(&mut self, types: Vec<String>) -> &mut Self {
        self.parameter_types = types;
        self
    }

    /// Codec-neutral argument payloads, written once per call and read by
    /// the serialization layer
    pub fn arguments(&self) -> &[Vec<u8>] {
        &self.arguments
    }

    pub fn set_arguments(&mut self, arguments: Vec<Vec<u8>>) -> &mut Self {
        self.arguments = arguments;
        self
    }

    /// Attach the in-flight response for the current call
    ///
    /// A previously attached response is silently discarded; the context
    /// performs no cancellation of its own.
    pub fn set_pending_response<T: Send + 'static>(
        &mut self,
        future: ResponseFuture<T>,
    ) -> &mut Self {
        self.pending_response = Some(Box::new(future));
        self
    }

    /// Take ownership of the attached in-flight response
    ///
    /// Returns `None` when nothing is attached. A response carrying a
    /// different payload type also reads as `None` but stays attached, so a
    /// mistyped read does not destroy the real response.
    pub fn take_pending_response<T: Send + 'static>(&mut self) -> Option<ResponseFuture<T>> {
        let pending = self.pending_response.take()?;
        match pending.downcast::<ResponseFuture<T>>() {
            Ok(future) => Some(*future),
            Err(other) => {
                self.pending_response = Some(other);
                None
            }
        }
    }

    pub fn has_pending_response(&self) -> bool {
        self.pending_response.is_some()
    }

    pub fn set_local_address(&mut self, address: impl Into<EndpointAddr>) -> &mut Self {
        self.local_address = Some(address.into());
        self
    }

    pub fn local_address(&self) -> Option<&EndpointAddr> {
        self.local_address.as_ref()
    }

    pub fn set_remote_address(&mut self, address: impl Into<EndpointAddr>) -> &mut Self {
        self.remote_address = Some(address.into());
        self
    }

    pub fn remote_address(&self) -> Option<&EndpointAddr> {
        self.remote_address.as_ref()
    }

    /// Local host for display purposes
    ///
    /// Resolved local addresses are loopback-normalized; when no usable
    /// local address is set this falls back to the process's own detected
    /// host.
    pub fn local_host(&self) -> String {
        let host = self.local_address.as_ref().map(|addr| match addr.ip() {
            Some(ip) => net::filter_local_host(&ip.to_string()),
            None => addr.host().to_string(),
        });
        match host {
            Some(host) if !host.is_empty() => host,
            _ => net::local_host().to_string(),
        }
    }

    /// Literal local host name, falling back like `local_host`
    pub fn local_host_name(&self) -> String {
        match self.local_address.as_ref().map(EndpointAddr::host) {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => self.local_host(),
        }
    }

    /// Remote host for display purposes
    ///
    /// Unlike `local_host` there is no fallback when no remote address is
    /// set; downstream side detection depends on the distinction.
    pub fn remote_host(&self) -> Option<String> {
        self.remote_address.as_ref().map(|addr| match addr.ip() {
            Some(ip) => net::filter_local_host(&ip.to_string()),
            None => addr.host().to_string(),
        })
    }

    pub fn remote_host_name(&self) -> Option<&str> {
        self.remote_address.as_ref().map(EndpointAddr::host)
    }

    pub fn local_port(&self) -> u16 {
        self.local_address.as_ref().map_or(0, EndpointAddr::port)
    }

    pub fn remote_port(&self) -> u16 {
        self.remote_address.as_ref().map_or(0, EndpointAddr::port)
    }

    /// `"host:port"` form of the local endpoint, port 0 when unset
    pub fn local_address_string(&self) -> String {
        format!("{}:{}", self.local_host(), self.local_port())
    }

    /// `"host:port"` form of the remote endpoint, empty host and port 0
    /// when unset
    pub fn remote_address_string(&self) -> String {
        format!(
            "{}:{}",
            self.remote_host().unwrap_or_default(),
            self.remote_port()
        )
    }

    pub fn attachment(&self, key: &str) -> Option<&str> {
        self.attachments.get(key).map(String::as_str)
    }

    /// Set a propagated call attachment
    ///
    /// An empty value removes the key, so the map never holds a blank
    /// signal for a present key.
    pub fn set_attachment(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        if value.is_empty() {
            self.attachments.remove(&key);
        } else {
            self.attachments.insert(key, value);
        }
        self
    }

    pub fn remove_attachment(&mut self, key: &str) -> &mut Self {
        self.attachments.remove(key);
        self
    }

    pub fn attachments(&self) -> &HashMap<String, String> {
        &self.attachments
    }

    /// Replace the whole attachment map; blank values are dropped
    pub fn replace_attachments(&mut self, attachments: HashMap<String, String>) -> &mut Self {
        self.attachments.clear();
        self.attachments
            .extend(attachments.into_iter().filter(|(_, value)| !value.is_empty()));
        self
    }

    pub fn clear_attachments(&mut self) -> &mut Self {
        self.attachments.clear();
        self
    }

    /// Read a local scratch value
    ///
    /// Values are purely local extension data and never travel on the wire.
    pub fn value<T: 'static>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|value| value.downcast_ref())
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: impl Any + Send) -> &mut Self {
        self.values.insert(key.into(), Box::new(value));
        self
    }

    pub fn remove_value(&mut self, key: &str) -> &mut Self {
        self.values.remove(key);
        self
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Free-form annotation for the resolved service endpoint
    pub fn service_addr(&self) -> Option<&str> {
        self.service_addr.as_deref()
    }

    pub fn set_service_addr(&mut self, addr: impl Into<String>) -> &mut Self {
        self.service_addr = Some(addr.into());
        self
    }

    /// Call shape currently signalled through the reserved attachment keys
    pub fn call_mode(&self) -> CallMode {
        if self.attachment(RETURN_ATTACHMENT_KEY) == Some("false") {
            CallMode::OneWay
        } else if self.attachment(ASYNC_ATTACHMENT_KEY) == Some("true") {
            CallMode::Async
        } else {
            CallMode::Sync
        }
    }

    pub(crate) fn set_call_mode(&mut self, mode: CallMode) {
        match mode {
            CallMode::Sync => {}
            CallMode::Async => {
                self.set_attachment(ASYNC_ATTACHMENT_KEY, "true");
            }
            CallMode::OneWay => {
                self.set_attachment(RETURN_ATTACHMENT_KEY, "false");
            }
        }
    }

    pub(crate) fn clear_call_mode(&mut self, mode: CallMode) {
        match mode {
            CallMode::Sync => {}
            CallMode::Async => {
                self.remove_attachment(ASYNC_ATTACHMENT_KEY);
            }
            CallMode::OneWay => {
                self.remove_attachment(RETURN_ATTACHMENT_KEY);
            }
        }
    }
}
