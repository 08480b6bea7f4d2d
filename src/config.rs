/// 异步 HTTP 客户端配置模型
///
/// 每个命名客户端读取一次，之后只读。字段取值在进入传输层之前
/// 由 [`crate::validation`] 校验。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// 传输协议版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Protocol {
    #[default]
    #[serde(rename = "http1-1")]
    Http1_1,
    #[serde(rename = "http2")]
    Http2,
}

/// SSL 实现选择
///
/// 无法识别的取值落到 `Unrecognized`，映射时按 JDK 处理。
/// 原始取值不会保留，再次序列化时写出的是 `"unrecognized"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslProviderType {
    Jdk,
    Openssl,
    OpensslRefcnt,
    #[serde(other)]
    Unrecognized,
}

/// HTTP/2 配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Http2Config {
    /// 初始窗口大小，存在时必须 > 0
    pub initial_window_size: Option<i32>,
    /// 单连接最大并发流，存在时必须 > 0
    pub max_streams: Option<i64>,
    /// 健康检查 PING 周期
    pub health_check_ping_period: Option<Duration>,
}

/// 代理配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProxyConfig {
    /// 是否启用代理
    pub enabled: bool,
    /// 代理端点，端口缺省时由传输层推断
    pub endpoint: Option<ProxyEndpoint>,
    /// 不走代理的主机
    pub non_proxy_hosts: Option<Vec<String>>,
}

/// 代理端点
///
/// `Url` 会丢弃与 scheme 默认值相同的端口，这里另外记录配置中显式写出的端口，
/// 只有未写端口时 [`ProxyEndpoint::port`] 才返回 `None`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProxyEndpoint {
    source: String,
    url: Url,
    port: Option<u16>,
}

impl ProxyEndpoint {
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(input)?;
        let port = if has_explicit_port(input) {
            url.port_or_known_default()
        } else {
            None
        };
        Ok(Self {
            source: input.to_string(),
            url,
            port,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// 显式配置的端口
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// 配置中的原始写法
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl TryFrom<String> for ProxyEndpoint {
    type Error = url::ParseError;

    fn try_from(input: String) -> Result<Self, Self::Error> {
        Self::parse(&input)
    }
}

impl From<ProxyEndpoint> for String {
    fn from(endpoint: ProxyEndpoint) -> Self {
        endpoint.source
    }
}

/// authority 部分是否带有非空端口
fn has_explicit_port(input: &str) -> bool {
    let Some((_, rest)) = input.trim().split_once("://") else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    // IPv6 地址本身带冒号
    let port_part = match host_port.rfind(']') {
        Some(end) => &host_port[end + 1..],
        None => host_port,
    };
    port_part
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty())
}

/// 文件证书库配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FileStoreConfig {
    /// 证书库路径
    pub path: Option<PathBuf>,
    /// 证书库类型
    #[serde(rename = "type")]
    pub store_type: Option<String>,
}

impl FileStoreConfig {
    pub fn pem(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            store_type: Some("pem".to_string()),
        }
    }
}

/// 客户端证书（key managers）来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TlsKeyManagersProviderType {
    /// 不提供客户端证书
    None,
    /// 从进程环境读取
    #[default]
    SystemProperty,
    /// 从文件证书库读取
    FileStore,
}

/// 信任证书（trust managers）来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TlsTrustManagersProviderType {
    /// 信任所有证书（仅用于测试环境）
    TrustAll,
    /// 使用传输层默认信任库
    #[default]
    SystemProperty,
    /// 从文件证书库读取
    FileStore,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TlsKeyManagersProviderConfig {
    #[serde(rename = "type")]
    pub provider_type: TlsKeyManagersProviderType,
    pub file_store: Option<FileStoreConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TlsTrustManagersProviderConfig {
    #[serde(rename = "type")]
    pub provider_type: TlsTrustManagersProviderType,
    pub file_store: Option<FileStoreConfig>,
}

/// 事件循环配置
///
/// `override` 为 false 时使用调用方提供的共享事件循环，
/// 为 true 时由传输层按本配置创建专用事件循环。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EventLoopConfig {
    #[serde(rename = "override")]
    pub override_enabled: bool,
    /// 专用事件循环线程数
    pub number_of_threads: Option<i32>,
    /// 专用事件循环线程名前缀
    pub thread_name_prefix: Option<String>,
}

impl EventLoopConfig {
    /// 专用事件循环配置
    pub fn dedicated(number_of_threads: Option<i32>, thread_name_prefix: Option<&str>) -> Self {
        Self {
            override_enabled: true,
            number_of_threads,
            thread_name_prefix: thread_name_prefix.map(str::to_string),
        }
    }
}

/// 异步 HTTP 客户端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AsyncHttpClientConfig {
    /// 从连接池获取连接的超时时间
    pub connection_acquisition_timeout: Duration,
    /// 连接最大空闲时间
    pub connection_max_idle_time: Duration,
    /// 建立连接超时时间
    pub connection_timeout: Duration,
    /// 连接最大存活时间，缺省时不限制
    pub connection_time_to_live: Option<Duration>,
    /// 最大并发连接数
    pub max_concurrency: i32,
    /// 最大排队获取连接请求数
    pub max_pending_connection_acquires: i32,
    /// 读超时时间
    pub read_timeout: Duration,
    /// 写超时时间
    pub write_timeout: Duration,
    /// TCP keepalive
    pub tcp_keep_alive: bool,
    /// 是否启用空闲连接回收
    pub use_idle_connection_reaper: bool,
    /// 协议版本
    pub protocol: Protocol,
    /// SSL 实现，缺省时由传输层决定
    pub ssl_provider: Option<SslProviderType>,
    pub http2: Http2Config,
    pub proxy: ProxyConfig,
    pub tls_key_managers_provider: TlsKeyManagersProviderConfig,
    pub tls_trust_managers_provider: TlsTrustManagersProviderConfig,
    pub event_loop: EventLoopConfig,
}

impl Default for AsyncHttpClientConfig {
    fn default() -> Self {
        Self {
            connection_acquisition_timeout: Duration::from_secs(2),
            connection_max_idle_time: Duration::from_secs(5),
            connection_timeout: Duration::from_secs(10),
            connection_time_to_live: None,
            max_concurrency: 50,
            max_pending_connection_acquires: 10_000,
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(30),
            tcp_keep_alive: false,
            use_idle_connection_reaper: true,
            protocol: Protocol::Http1_1,
            ssl_provider: None,
            http2: Http2Config::default(),
            proxy: ProxyConfig::default(),
            tls_key_managers_provider: TlsKeyManagersProviderConfig::default(),
            tls_trust_managers_provider: TlsTrustManagersProviderConfig::default(),
            event_loop: EventLoopConfig::default(),
        }
    }
}

impl AsyncHttpClientConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 TOML 文本加载配置，缺省项取默认值
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// 设置最大并发连接数
    pub fn with_max_concurrency(mut self, max_concurrency: i32) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// 设置最大排队获取连接请求数
    pub fn with_max_pending_connection_acquires(mut self, max_pending: i32) -> Self {
        self.max_pending_connection_acquires = max_pending;
        self
    }

    /// 设置连接最大存活时间
    pub fn with_connection_time_to_live(mut self, ttl: Option<Duration>) -> Self {
        self.connection_time_to_live = ttl;
        self
    }

    /// 设置协议版本
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// 设置 SSL 实现
    pub fn with_ssl_provider(mut self, ssl_provider: Option<SslProviderType>) -> Self {
        self.ssl_provider = ssl_provider;
        self
    }

    /// 设置 HTTP/2 配置
    pub fn with_http2(mut self, http2: Http2Config) -> Self {
        self.http2 = http2;
        self
    }

    /// 设置代理配置
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = proxy;
        self
    }

    /// 设置客户端证书来源
    pub fn with_tls_key_managers_provider(mut self, config: TlsKeyManagersProviderConfig) -> Self {
        self.tls_key_managers_provider = config;
        self
    }

    /// 设置信任证书来源
    pub fn with_tls_trust_managers_provider(mut self, config: TlsTrustManagersProviderConfig) -> Self {
        self.tls_trust_managers_provider = config;
        self
    }

    /// 设置事件循环配置
    pub fn with_event_loop(mut self, event_loop: EventLoopConfig) -> Self {
        self.event_loop = event_loop;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AsyncHttpClientConfig::default();
        assert_eq!(config.max_concurrency, 50);
        assert_eq!(config.max_pending_connection_acquires, 10_000);
        assert_eq!(config.connection_timeout, Duration::from_secs(10));
        assert_eq!(config.connection_time_to_live, None);
        assert!(config.use_idle_connection_reaper);
        assert!(!config.tcp_keep_alive);
        assert_eq!(config.protocol, Protocol::Http1_1);
        assert_eq!(
            config.tls_key_managers_provider.provider_type,
            TlsKeyManagersProviderType::SystemProperty
        );
        assert!(!config.event_loop.override_enabled);
    }

    #[test]
    fn test_load_from_toml() {
        let config = AsyncHttpClientConfig::from_toml_str(
            r#"
            max-concurrency = 20
            protocol = "http2"
            ssl-provider = "openssl-refcnt"
            connection-time-to-live = { secs = 60, nanos = 0 }

            [http2]
            max-streams = 100

            [proxy]
            enabled = true
            endpoint = "http://proxy.local:3128"
            non-proxy-hosts = ["localhost", "localhost"]

            [tls-trust-managers-provider]
            type = "file-store"
            file-store = { path = "/etc/ca.pem", type = "pem" }

            [event-loop]
            override = true
            number-of-threads = 4
            thread-name-prefix = "s3-io"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_concurrency, 20);
        assert_eq!(config.max_pending_connection_acquires, 10_000);
        assert_eq!(config.protocol, Protocol::Http2);
        assert_eq!(config.ssl_provider, Some(SslProviderType::OpensslRefcnt));
        assert_eq!(config.connection_time_to_live, Some(Duration::from_secs(60)));
        assert_eq!(config.http2.max_streams, Some(100));
        assert_eq!(config.http2.initial_window_size, None);
        assert!(config.proxy.enabled);
        assert_eq!(config.proxy.endpoint.as_ref().and_then(ProxyEndpoint::port), Some(3128));
        assert_eq!(
            config.tls_trust_managers_provider.file_store,
            Some(FileStoreConfig::pem("/etc/ca.pem"))
        );
        assert_eq!(config.event_loop, EventLoopConfig::dedicated(Some(4), Some("s3-io")));
    }

    #[test]
    fn test_unknown_ssl_provider_is_kept_as_unrecognized() {
        let config = AsyncHttpClientConfig::from_toml_str(r#"ssl-provider = "boringssl""#).unwrap();
        assert_eq!(config.ssl_provider, Some(SslProviderType::Unrecognized));
    }

    #[test]
    fn test_unrecognized_ssl_provider_serializes_as_unrecognized() {
        #[derive(Serialize)]
        struct Wrapper {
            ssl_provider: SslProviderType,
        }

        let config = AsyncHttpClientConfig::from_toml_str(r#"ssl-provider = "boringssl""#).unwrap();
        let wrapper = Wrapper {
            ssl_provider: config.ssl_provider.unwrap(),
        };
        assert_eq!(toml::to_string(&wrapper).unwrap().trim(), r#"ssl_provider = "unrecognized""#);
    }

    #[test]
    fn test_proxy_endpoint_keeps_explicit_default_port() {
        for (input, port) in [
            ("http://proxy.local:80", Some(80)),
            ("https://proxy.local:443", Some(443)),
            ("http://proxy.local:8080", Some(8080)),
            ("http://user:pw@proxy.local:80/", Some(80)),
            ("http://[::1]:80", Some(80)),
            ("http://proxy.local", None),
            ("http://proxy.local:/", None),
            ("http://[::1]", None),
        ] {
            let endpoint = ProxyEndpoint::parse(input).unwrap();
            assert_eq!(endpoint.port(), port, "{}", input);
            assert_eq!(endpoint.as_str(), input);
        }
        assert!(ProxyEndpoint::parse("not a url").is_err());
    }

    #[test]
    fn test_proxy_endpoint_from_toml() {
        let config = AsyncHttpClientConfig::from_toml_str(
            r#"
            [proxy]
            enabled = true
            endpoint = "http://proxy.local:80"
            "#,
        )
        .unwrap();
        let endpoint = config.proxy.endpoint.unwrap();
        assert_eq!(endpoint.port(), Some(80));
        assert_eq!(endpoint.url().port(), None);

        assert!(AsyncHttpClientConfig::from_toml_str("proxy = { endpoint = \"::\" }").is_err());
    }

    #[test]
    fn test_negative_values_survive_loading() {
        let config = AsyncHttpClientConfig::from_toml_str("max-concurrency = -1").unwrap();
        assert_eq!(config.max_concurrency, -1);
    }

    #[test]
    fn test_parse_error() {
        let error = AsyncHttpClientConfig::from_toml_str("max-concurrency = \"many\"").unwrap_err();
        assert_eq!(error.error_code(), "PARSE_ERROR");
    }
}
