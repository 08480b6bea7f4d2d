/// 传输层构建器
///
/// 传输层拥有的参数累加器。本 crate 只逐项调用 setter，
/// 最终由传输层读取这些参数创建客户端。

use std::collections::HashSet;
use std::time::Duration;

use crate::config::{Protocol, SslProviderType};
use crate::tls::{KeyManagersProvider, TrustManagersProvider};
use super::event_loop::{EventLoopGroupSpec, SharedEventLoopGroup};

/// 传输层原生 SSL 实现
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SslProvider {
    Jdk,
    OpenSsl,
    OpenSslRefcnt,
}

impl From<SslProviderType> for SslProvider {
    fn from(provider: SslProviderType) -> Self {
        match provider {
            SslProviderType::Jdk => SslProvider::Jdk,
            SslProviderType::Openssl => SslProvider::OpenSsl,
            SslProviderType::OpensslRefcnt => SslProvider::OpenSslRefcnt,
            // 无法识别的取值按 JDK 处理
            SslProviderType::Unrecognized => SslProvider::Jdk,
        }
    }
}

/// HTTP/2 配置
///
/// 只在至少设置了窗口大小或最大流数时才会创建。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Http2Configuration {
    pub initial_window_size: Option<i32>,
    pub max_streams: Option<i64>,
    pub health_check_ping_period: Option<Duration>,
}

/// 代理配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfiguration {
    pub scheme: String,
    pub host: String,
    /// 缺省时由传输层按 scheme 推断端口
    pub port: Option<u16>,
    pub non_proxy_hosts: HashSet<String>,
}

/// 事件循环来源
#[derive(Debug, Clone)]
pub enum EventLoopGroupSource {
    /// 专用事件循环规格，由传输层创建并负责关闭
    Dedicated(EventLoopGroupSpec),
    /// 调用方拥有的共享事件循环，传输层只借用
    Shared(SharedEventLoopGroup),
}

/// 异步 HTTP 客户端构建器接口
///
/// 每个 setter 对应一个配置项，未调用即表示沿用传输层默认值。
pub trait AsyncHttpClientBuilder {
    fn connection_acquisition_timeout(&mut self, timeout: Duration);
    fn connection_max_idle_time(&mut self, idle_time: Duration);
    fn connection_timeout(&mut self, timeout: Duration);
    fn connection_time_to_live(&mut self, ttl: Duration);
    fn max_concurrency(&mut self, max_concurrency: i32);
    fn max_pending_connection_acquires(&mut self, max_pending: i32);
    fn protocol(&mut self, protocol: Protocol);
    fn read_timeout(&mut self, timeout: Duration);
    fn write_timeout(&mut self, timeout: Duration);
    fn tcp_keep_alive(&mut self, keep_alive: bool);
    fn ssl_provider(&mut self, provider: SslProvider);
    fn use_idle_connection_reaper(&mut self, enabled: bool);
    fn http2_configuration(&mut self, http2: Http2Configuration);
    fn proxy_configuration(&mut self, proxy: ProxyConfiguration);
    fn tls_key_managers_provider(&mut self, provider: KeyManagersProvider);
    fn tls_trust_managers_provider(&mut self, provider: TrustManagersProvider);
    /// 挂载共享事件循环
    fn event_loop_group(&mut self, group: SharedEventLoopGroup);
    /// 挂载专用事件循环规格
    fn event_loop_group_builder(&mut self, spec: EventLoopGroupSpec);
}

/// 默认传输层构建器
#[derive(Debug, Clone, Default)]
pub struct TransportBuilder {
    connection_acquisition_timeout: Option<Duration>,
    connection_max_idle_time: Option<Duration>,
    connection_timeout: Option<Duration>,
    connection_time_to_live: Option<Duration>,
    max_concurrency: Option<i32>,
    max_pending_connection_acquires: Option<i32>,
    protocol: Option<Protocol>,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    tcp_keep_alive: Option<bool>,
    ssl_provider: Option<SslProvider>,
    use_idle_connection_reaper: Option<bool>,
    http2_configuration: Option<Http2Configuration>,
    proxy_configuration: Option<ProxyConfiguration>,
    tls_key_managers_provider: Option<KeyManagersProvider>,
    tls_trust_managers_provider: Option<TrustManagersProvider>,
    event_loop_group: Option<EventLoopGroupSource>,
}

impl TransportBuilder {
    /// 创建空构建器
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_connection_acquisition_timeout(&self) -> Option<Duration> {
        self.connection_acquisition_timeout
    }

    pub fn get_connection_max_idle_time(&self) -> Option<Duration> {
        self.connection_max_idle_time
    }

    pub fn get_connection_timeout(&self) -> Option<Duration> {
        self.connection_timeout
    }

    pub fn get_connection_time_to_live(&self) -> Option<Duration> {
        self.connection_time_to_live
    }

    pub fn get_max_concurrency(&self) -> Option<i32> {
        self.max_concurrency
    }

    pub fn get_max_pending_connection_acquires(&self) -> Option<i32> {
        self.max_pending_connection_acquires
    }

    pub fn get_protocol(&self) -> Option<Protocol> {
        self.protocol
    }

    pub fn get_read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    pub fn get_write_timeout(&self) -> Option<Duration> {
        self.write_timeout
    }

    pub fn get_tcp_keep_alive(&self) -> Option<bool> {
        self.tcp_keep_alive
    }

    pub fn get_ssl_provider(&self) -> Option<SslProvider> {
        self.ssl_provider
    }

    pub fn get_use_idle_connection_reaper(&self) -> Option<bool> {
        self.use_idle_connection_reaper
    }

    pub fn get_http2_configuration(&self) -> Option<&Http2Configuration> {
        self.http2_configuration.as_ref()
    }

    pub fn get_proxy_configuration(&self) -> Option<&ProxyConfiguration> {
        self.proxy_configuration.as_ref()
    }

    pub fn get_tls_key_managers_provider(&self) -> Option<&KeyManagersProvider> {
        self.tls_key_managers_provider.as_ref()
    }

    pub fn get_tls_trust_managers_provider(&self) -> Option<&TrustManagersProvider> {
        self.tls_trust_managers_provider.as_ref()
    }

    pub fn get_event_loop_group(&self) -> Option<&EventLoopGroupSource> {
        self.event_loop_group.as_ref()
    }

    /// 取出事件循环来源，传输层创建客户端时使用
    pub fn take_event_loop_group(&mut self) -> Option<EventLoopGroupSource> {
        self.event_loop_group.take()
    }
}

impl AsyncHttpClientBuilder for TransportBuilder {
    fn connection_acquisition_timeout(&mut self, timeout: Duration) {
        self.connection_acquisition_timeout = Some(timeout);
    }

    fn connection_max_idle_time(&mut self, idle_time: Duration) {
        self.connection_max_idle_time = Some(idle_time);
    }

    fn connection_timeout(&mut self, timeout: Duration) {
        self.connection_timeout = Some(timeout);
    }

    fn connection_time_to_live(&mut self, ttl: Duration) {
        self.connection_time_to_live = Some(ttl);
    }

    fn max_concurrency(&mut self, max_concurrency: i32) {
        self.max_concurrency = Some(max_concurrency);
    }

    fn max_pending_connection_acquires(&mut self, max_pending: i32) {
        self.max_pending_connection_acquires = Some(max_pending);
    }

    fn protocol(&mut self, protocol: Protocol) {
        self.protocol = Some(protocol);
    }

    fn read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = Some(timeout);
    }

    fn write_timeout(&mut self, timeout: Duration) {
        self.write_timeout = Some(timeout);
    }

    fn tcp_keep_alive(&mut self, keep_alive: bool) {
        self.tcp_keep_alive = Some(keep_alive);
    }

    fn ssl_provider(&mut self, provider: SslProvider) {
        self.ssl_provider = Some(provider);
    }

    fn use_idle_connection_reaper(&mut self, enabled: bool) {
        self.use_idle_connection_reaper = Some(enabled);
    }

    fn http2_configuration(&mut self, http2: Http2Configuration) {
        self.http2_configuration = Some(http2);
    }

    fn proxy_configuration(&mut self, proxy: ProxyConfiguration) {
        self.proxy_configuration = Some(proxy);
    }

    fn tls_key_managers_provider(&mut self, provider: KeyManagersProvider) {
        self.tls_key_managers_provider = Some(provider);
    }

    fn tls_trust_managers_provider(&mut self, provider: TrustManagersProvider) {
        self.tls_trust_managers_provider = Some(provider);
    }

    fn event_loop_group(&mut self, group: SharedEventLoopGroup) {
        self.event_loop_group = Some(EventLoopGroupSource::Shared(group));
    }

    fn event_loop_group_builder(&mut self, spec: EventLoopGroupSpec) {
        self.event_loop_group = Some(EventLoopGroupSource::Dedicated(spec));
    }
}
