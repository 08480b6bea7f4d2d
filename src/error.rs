use std::path::PathBuf;

/// 配置错误
///
/// 所有校验失败都是同步、不可重试、启动期致命的错误。
/// 错误信息以点分配置路径开头（`<client>.<context>-client.<option>`），
/// 方便在日志中区分多个客户端。
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 取值非法
    #[error("{client}.{option} {reason}")]
    InvalidValue {
        client: String,
        option: String,
        reason: String,
    },

    /// 代理端点非法
    #[error("{client}.{option} ({endpoint}) - {reason}")]
    InvalidProxyEndpoint {
        client: String,
        option: String,
        endpoint: String,
        reason: String,
    },

    /// 缺少必填项
    #[error("{client}.{option} {reason}")]
    MissingRequiredField {
        client: String,
        option: String,
        reason: String,
    },

    /// 配置解析失败
    #[error("Failed to parse async client configuration: {reason}")]
    Parse { reason: String },
}

impl ConfigError {
    /// 创建取值非法错误
    pub fn invalid_value(
        client: impl Into<String>,
        option: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            client: client.into(),
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// 创建代理端点错误
    pub fn invalid_proxy_endpoint(
        client: impl Into<String>,
        option: impl Into<String>,
        endpoint: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidProxyEndpoint {
            client: client.into(),
            option: option.into(),
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// 创建缺少必填项错误
    pub fn missing_field(
        client: impl Into<String>,
        option: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MissingRequiredField {
            client: client.into(),
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// 出错的客户端名称
    pub fn client(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidValue { client, .. }
            | ConfigError::InvalidProxyEndpoint { client, .. }
            | ConfigError::MissingRequiredField { client, .. } => Some(client),
            ConfigError::Parse { .. } => None,
        }
    }

    /// 出错的配置项路径（不含客户端名称）
    pub fn option(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidValue { option, .. }
            | ConfigError::InvalidProxyEndpoint { option, .. }
            | ConfigError::MissingRequiredField { option, .. } => Some(option),
            ConfigError::Parse { .. } => None,
        }
    }

    /// 获取错误代码
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::InvalidValue { .. } => "INVALID_VALUE",
            ConfigError::InvalidProxyEndpoint { .. } => "INVALID_PROXY_ENDPOINT",
            ConfigError::MissingRequiredField { .. } => "MISSING_FIELD",
            ConfigError::Parse { .. } => "PARSE_ERROR",
        }
    }

    /// 配置错误不可重试
    pub fn is_retryable(&self) -> bool {
        false
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        ConfigError::Parse {
            reason: error.to_string(),
        }
    }
}

/// TLS 证书材料加载错误
#[derive(Debug, thiserror::Error)]
pub enum TlsMaterialError {
    #[error("Failed to read store '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse PEM data in '{path}': {reason}")]
    Pem { path: PathBuf, reason: String },

    #[error("Unsupported store type '{store_type}' (only 'pem' is supported)")]
    UnsupportedStoreType { store_type: String },

    #[error("No private key found in '{path}'")]
    MissingPrivateKey { path: PathBuf },

    #[error("No certificates found in '{path}'")]
    NoCertificates { path: PathBuf },

    #[error("TLS configuration error: {0}")]
    Rustls(#[from] rustls::Error),
}
