/// 异步客户端配置校验
///
/// 校验在创建任何网络资源之前执行，遇到第一条违反的规则即返回错误。

use url::Url;

use crate::config::{
    AsyncHttpClientConfig, FileStoreConfig, TlsKeyManagersProviderConfig,
    TlsKeyManagersProviderType, TlsTrustManagersProviderConfig, TlsTrustManagersProviderType,
};
use crate::error::ConfigError;

/// 异步客户端在配置路径中的上下文标记
pub const ASYNC_CONTEXT: &str = "async";

/// 拼接配置项路径，例如 `async-client.max-concurrency`
pub fn option_path(context: &str, option: &str) -> String {
    format!("{}-client.{}", context, option)
}

/// 代理端点校验器
pub trait ProxyEndpointValidator {
    fn validate(&self, client_name: &str, endpoint: &Url, context: &str) -> Result<(), ConfigError>;
}

/// TLS 证书来源配置校验器
pub trait TlsConfigValidator {
    fn validate_key_managers(
        &self,
        client_name: &str,
        config: &TlsKeyManagersProviderConfig,
        context: &str,
    ) -> Result<(), ConfigError>;

    fn validate_trust_managers(
        &self,
        client_name: &str,
        config: &TlsTrustManagersProviderConfig,
        context: &str,
    ) -> Result<(), ConfigError>;
}

/// 默认代理端点校验
///
/// 端点只能包含 scheme、host 和可选端口。
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProxyEndpointValidator;

impl ProxyEndpointValidator for DefaultProxyEndpointValidator {
    fn validate(&self, client_name: &str, endpoint: &Url, context: &str) -> Result<(), ConfigError> {
        let option = option_path(context, "proxy.endpoint");
        let reject = |reason: &str| -> Result<(), ConfigError> {
            Err(ConfigError::invalid_proxy_endpoint(
                client_name,
                option.as_str(),
                endpoint.as_str(),
                reason,
            ))
        };

        if endpoint.host_str().map_or(true, str::is_empty) {
            return reject("host must be specified");
        }
        if !endpoint.username().is_empty() || endpoint.password().is_some() {
            return reject("user info is not supported.");
        }
        // Url 会把空路径规范化为 "/"
        if !matches!(endpoint.path(), "" | "/") {
            return reject("path is not supported.");
        }
        if endpoint.query().is_some() {
            return reject("query is not supported.");
        }
        if endpoint.fragment().is_some() {
            return reject("fragment is not supported.");
        }
        Ok(())
    }
}

/// 默认 TLS 来源校验：文件证书库必须给出路径和类型
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTlsConfigValidator;

impl DefaultTlsConfigValidator {
    fn validate_file_store(
        client_name: &str,
        context: &str,
        store_kind: &str,
        file_store: Option<&FileStoreConfig>,
    ) -> Result<(), ConfigError> {
        let option = |suffix: &str| {
            option_path(context, &format!("tls-{}-managers-provider.file-store{}", store_kind, suffix))
        };

        let Some(file_store) = file_store else {
            return Err(ConfigError::missing_field(
                client_name,
                option(""),
                "must be specified if 'file-store' provider type is used",
            ));
        };
        if file_store.path.is_none() {
            return Err(ConfigError::missing_field(
                client_name,
                option(".path"),
                "should be specified if 'file-store' provider is used.",
            ));
        }
        if file_store.store_type.is_none() {
            return Err(ConfigError::missing_field(
                client_name,
                option(".type"),
                "should be specified if 'file-store' provider is used.",
            ));
        }
        Ok(())
    }
}

impl TlsConfigValidator for DefaultTlsConfigValidator {
    fn validate_key_managers(
        &self,
        client_name: &str,
        config: &TlsKeyManagersProviderConfig,
        context: &str,
    ) -> Result<(), ConfigError> {
        if config.provider_type == TlsKeyManagersProviderType::FileStore {
            Self::validate_file_store(client_name, context, "key", config.file_store.as_ref())?;
        }
        Ok(())
    }

    fn validate_trust_managers(
        &self,
        client_name: &str,
        config: &TlsTrustManagersProviderConfig,
        context: &str,
    ) -> Result<(), ConfigError> {
        if config.provider_type == TlsTrustManagersProviderType::FileStore {
            Self::validate_file_store(client_name, context, "trust", config.file_store.as_ref())?;
        }
        Ok(())
    }
}

/// 使用默认校验器校验异步客户端配置
pub fn validate(client_name: &str, config: &AsyncHttpClientConfig) -> Result<(), ConfigError> {
    validate_with(
        client_name,
        config,
        &DefaultProxyEndpointValidator,
        &DefaultTlsConfigValidator,
    )
}

/// 校验异步客户端配置，代理端点和 TLS 来源交给外部校验器
pub fn validate_with(
    client_name: &str,
    config: &AsyncHttpClientConfig,
    proxy_validator: &dyn ProxyEndpointValidator,
    tls_validator: &dyn TlsConfigValidator,
) -> Result<(), ConfigError> {
    let invalid = |option: &str, reason: &str| -> Result<(), ConfigError> {
        Err(ConfigError::invalid_value(
            client_name,
            option_path(ASYNC_CONTEXT, option),
            reason,
        ))
    };

    if config.max_concurrency <= 0 {
        return invalid("max-concurrency", "may not be negative or zero.");
    }

    if matches!(config.http2.max_streams, Some(streams) if streams <= 0) {
        return invalid("http2.max-streams", "may not be negative.");
    }

    if matches!(config.http2.initial_window_size, Some(size) if size <= 0) {
        return invalid("http2.initial-window-size", "may not be negative.");
    }

    if config.max_pending_connection_acquires <= 0 {
        return invalid("max-pending-connection-acquires", "may not be negative or zero.");
    }

    if config.event_loop.override_enabled
        && matches!(config.event_loop.number_of_threads, Some(threads) if threads <= 0)
    {
        return invalid("event-loop.number-of-threads", "may not be negative or zero.");
    }

    if config.proxy.enabled {
        if let Some(endpoint) = &config.proxy.endpoint {
            proxy_validator.validate(client_name, endpoint.url(), ASYNC_CONTEXT)?;
        }
    }

    tls_validator.validate_key_managers(client_name, &config.tls_key_managers_provider, ASYNC_CONTEXT)?;
    tls_validator.validate_trust_managers(client_name, &config.tls_trust_managers_provider, ASYNC_CONTEXT)?;

    Ok(())
}
