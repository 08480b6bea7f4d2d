/// asynctrans-config - 异步 HTTP 传输配置
///
/// 在启动阶段把已加载的异步 HTTP 客户端配置校验后，逐项写入基于事件循环的
/// 传输层构建器，并决定使用共享还是专用事件循环。

// 配置模型
pub mod config;

// 校验与错误
pub mod validation;
pub mod error;

// TLS 证书来源
pub mod tls;

// 传输层构建器与事件循环
pub mod transport;

// 配置记录器
pub mod recorder;

// 重新导出核心类型
pub use config::{
    AsyncHttpClientConfig, EventLoopConfig, FileStoreConfig, Http2Config, Protocol, ProxyConfig,
    ProxyEndpoint, SslProviderType, TlsKeyManagersProviderConfig, TlsKeyManagersProviderType,
    TlsTrustManagersProviderConfig, TlsTrustManagersProviderType,
};
pub use error::{ConfigError, TlsMaterialError};
pub use recorder::AsyncTransportRecorder;
pub use tls::{
    client_tls_config, DefaultTlsProviderResolver, KeyManagersProvider, TlsProviderResolver,
    TrustManagersProvider,
};
pub use transport::{
    AsyncHttpClientBuilder, EventLoopGroupSource, EventLoopGroupSpec, Http2Configuration,
    ProxyConfiguration, SharedEventLoopGroup, SslProvider, TransportBuilder,
};
pub use validation::{validate, ProxyEndpointValidator, TlsConfigValidator};

// 便捷的类型别名
pub type Result<T> = std::result::Result<T, ConfigError>;
