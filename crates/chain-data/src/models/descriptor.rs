//! Source descriptors: which chain data source to bind and how.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use super::types::{Param, SourceName};

/// How a binder session obtains values from its source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceMode {
    /// Invoke the source once and store the result.
    OneShot,

    /// Open a subscription and store every delivered value.
    #[default]
    Subscribe,

    /// Repeat the one-shot call on an interval.
    ///
    /// `None` falls back to the binder's configured poll interval.
    Poll { interval: Option<Duration> },
}

/// Options accepted alongside a source name, mirroring the call shape
/// `(name, { noSubscription, params })`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceOptions {
    /// Invoke once instead of subscribing
    pub no_subscription: bool,

    /// Invocation parameters, in order
    pub params: Vec<Param>,
}

impl SourceOptions {
    pub fn one_shot() -> Self {
        Self {
            no_subscription: true,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// Identifies a remote data source, its parameters and its mode.
///
/// Immutable once a binding has been established from it.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceDescriptor {
    name: SourceName,
    params: Vec<Param>,
    mode: SourceMode,
}

impl SourceDescriptor {
    /// Subscription descriptor with no parameters.
    pub fn subscribe(name: impl Into<SourceName>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            mode: SourceMode::Subscribe,
        }
    }

    /// One-shot descriptor with no parameters.
    pub fn one_shot(name: impl Into<SourceName>) -> Self {
        Self {
            mode: SourceMode::OneShot,
            ..Self::subscribe(name)
        }
    }

    /// Polling descriptor; `None` uses the binder's default interval.
    pub fn poll(name: impl Into<SourceName>, interval: Option<Duration>) -> Self {
        Self {
            mode: SourceMode::Poll { interval },
            ..Self::subscribe(name)
        }
    }

    /// Append an invocation parameter.
    pub fn with_param(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            SourceMode::OneShot => "once",
            SourceMode::Subscribe => "subscribe",
            SourceMode::Poll { .. } => "poll",
        };
        write!(f, "{}[{}]", self.name, mode)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
            write!(f, "({})", params.join(", "))?;
        }
        Ok(())
    }
}

impl From<&'static str> for SourceDescriptor {
    fn from(name: &'static str) -> Self {
        Self::subscribe(Cow::Borrowed(name))
    }
}

impl From<String> for SourceDescriptor {
    fn from(name: String) -> Self {
        Self::subscribe(Cow::Owned(name))
    }
}

impl<N: Into<SourceName>> From<(N, SourceOptions)> for SourceDescriptor {
    fn from((name, options): (N, SourceOptions)) -> Self {
        Self {
            name: name.into(),
            params: options.params,
            mode: if options.no_subscription {
                SourceMode::OneShot
            } else {
                SourceMode::Subscribe
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_name_defaults_to_subscription() {
        let descriptor = SourceDescriptor::from("getValidators");
        assert_eq!(descriptor.name(), "getValidators");
        assert_eq!(descriptor.mode(), SourceMode::Subscribe);
        assert!(descriptor.params().is_empty());
    }

    #[test]
    fn test_options_pair() {
        let descriptor = SourceDescriptor::from((
            "getValidatorPreferences",
            SourceOptions::default().with_param("0xABC"),
        ));
        assert_eq!(descriptor.mode(), SourceMode::Subscribe);
        assert_eq!(descriptor.params(), &[Param::from("0xABC")]);

        let descriptor = SourceDescriptor::from(("getEraLength", SourceOptions::one_shot()));
        assert_eq!(descriptor.mode(), SourceMode::OneShot);
    }

    #[test]
    fn test_display() {
        let descriptor = SourceDescriptor::subscribe("getValidatorPreferences").with_param("0xABC");
        assert_eq!(
            descriptor.to_string(),
            "getValidatorPreferences[subscribe](\"0xABC\")"
        );
        assert_eq!(
            SourceDescriptor::poll("getBlockNumber", None).to_string(),
            "getBlockNumber[poll]"
        );
    }
}
