use std::borrow::Cow;
use std::error::Error;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::catalog::{self, CORE_ERROR_DOMAIN};
use crate::record::{
    ErrorRecord, SharedError, ARGUMENT_NAME_KEY, ARGUMENT_VALUE_KEY, DEVELOPER_MESSAGE_KEY,
    UNDERLYING_ERROR_KEY,
};
use crate::reporter::ErrorReporter;

/// Optional inputs shared by both factory constructors.
///
/// ## Examples
/// ```rust
/// use sdk_errors::ErrorParams;
///
/// let params = ErrorParams::new()
///     .with_domain("com.example.app")
///     .with_message("token expired")
///     .with_info("retry_after", 30);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ErrorParams {
    domain: Option<String>,
    user_info: Map<String, Value>,
    message: Option<String>,
    underlying: Option<SharedError>,
}

impl ErrorParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Like [`Self::with_message`], but a `None` leaves the message unset.
    pub fn with_optional_message(mut self, message: Option<impl Into<String>>) -> Self {
        self.message = message.map(Into::into);
        self
    }

    pub fn with_user_info(mut self, info: Map<String, Value>) -> Self {
        self.user_info.extend(info);
        self
    }

    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.user_info.insert(key.into(), value.into());
        self
    }

    pub fn with_underlying<E>(mut self, error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.underlying = Some(Arc::new(error));
        self
    }

    pub fn with_shared_underlying(mut self, error: SharedError) -> Self {
        self.underlying = Some(error);
        self
    }
}

/// Construction of structured errors. Every call reports exactly once.
pub trait ErrorFactory: Send + Sync {
    fn build_error(&self, code: i64, params: ErrorParams) -> ErrorRecord;

    fn build_invalid_argument_error(
        &self,
        argument_name: &str,
        argument_value: Option<&str>,
        params: ErrorParams,
    ) -> ErrorRecord;
}

/// [`ErrorFactory`] that forwards `(code, domain, message)` of every built
/// error to an [`ErrorReporter`] before handing the error back.
#[derive(Clone)]
pub struct ReportingErrorFactory {
    reporter: Arc<dyn ErrorReporter>,
    default_domain: Cow<'static, str>,
}

impl ReportingErrorFactory {
    pub fn new(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            reporter,
            default_domain: Cow::Borrowed(CORE_ERROR_DOMAIN),
        }
    }

    /// Override the domain used when callers supply none.
    pub fn with_default_domain(mut self, domain: impl Into<Cow<'static, str>>) -> Self {
        self.default_domain = domain.into();
        self
    }

    fn assemble(&self, code: i64, params: ErrorParams) -> ErrorRecord {
        let ErrorParams {
            domain,
            mut user_info,
            message,
            underlying,
        } = params;

        user_info.retain(|_, v| !v.is_null());
        if let Some(message) = &message {
            user_info.insert(DEVELOPER_MESSAGE_KEY.into(), Value::String(message.clone()));
        }
        if let Some(underlying) = &underlying {
            user_info.insert(
                UNDERLYING_ERROR_KEY.into(),
                Value::String(underlying.to_string()),
            );
        }

        let domain = domain.unwrap_or_else(|| self.default_domain.to_string());
        ErrorRecord::new(domain, code, message, underlying, user_info)
    }

    fn report(&self, record: ErrorRecord) -> ErrorRecord {
        self.reporter
            .capture(record.code(), record.domain(), record.message());
        record
    }
}

impl ErrorFactory for ReportingErrorFactory {
    fn build_error(&self, code: i64, params: ErrorParams) -> ErrorRecord {
        self.report(self.assemble(code, params))
    }

    fn build_invalid_argument_error(
        &self,
        argument_name: &str,
        argument_value: Option<&str>,
        mut params: ErrorParams,
    ) -> ErrorRecord {
        if params.message.is_none() {
            params.message = Some(format!(
                "Invalid value for {}: {}",
                argument_name,
                argument_value.unwrap_or("(null)")
            ));
        }
        params
            .user_info
            .insert(ARGUMENT_NAME_KEY.into(), Value::String(argument_name.into()));
        match argument_value {
            Some(value) => {
                params
                    .user_info
                    .insert(ARGUMENT_VALUE_KEY.into(), Value::String(value.into()));
            }
            None => {
                params.user_info.remove(ARGUMENT_VALUE_KEY);
            }
        }

        let record = self
            .assemble(catalog::INVALID_ARGUMENT.code, params)
            .with_argument(argument_name.into(), argument_value.map(str::to_owned));
        self.report(record)
    }
}
