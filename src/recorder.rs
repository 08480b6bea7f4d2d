/// 异步传输配置记录器
///
/// 启动阶段为每个命名客户端调用一次：先校验配置，再把配置逐项
/// 写入传输层构建器，最后单独挂载事件循环。

use std::num::NonZeroUsize;

use tokio::runtime::Handle;

use crate::config::{AsyncHttpClientConfig, EventLoopConfig, Http2Config, ProxyConfig};
use crate::error::ConfigError;
use crate::tls::{DefaultTlsProviderResolver, TlsProviderResolver};
use crate::transport::{
    AsyncHttpClientBuilder, EventLoopGroupSpec, Http2Configuration, ProxyConfiguration,
    SharedEventLoopGroup, SslProvider, ThreadNamePolicy, TransportBuilder,
};
use crate::validation::{
    self, DefaultProxyEndpointValidator, DefaultTlsConfigValidator, ProxyEndpointValidator,
    TlsConfigValidator,
};

/// 异步传输配置记录器
///
/// 代理端点校验、TLS 来源校验和 TLS 提供者解析都可以替换。
/// 记录器本身不保存任何跨调用状态。
pub struct AsyncTransportRecorder {
    proxy_validator: Box<dyn ProxyEndpointValidator + Send + Sync>,
    tls_validator: Box<dyn TlsConfigValidator + Send + Sync>,
    tls_resolver: Box<dyn TlsProviderResolver + Send + Sync>,
}

impl Default for AsyncTransportRecorder {
    fn default() -> Self {
        Self {
            proxy_validator: Box::new(DefaultProxyEndpointValidator),
            tls_validator: Box::new(DefaultTlsConfigValidator),
            tls_resolver: Box::new(DefaultTlsProviderResolver),
        }
    }
}

impl AsyncTransportRecorder {
    /// 使用默认校验器和解析器
    pub fn new() -> Self {
        Self::default()
    }

    /// 替换代理端点校验器
    pub fn with_proxy_validator<V>(mut self, validator: V) -> Self
    where
        V: ProxyEndpointValidator + Send + Sync + 'static,
    {
        self.proxy_validator = Box::new(validator);
        self
    }

    /// 替换 TLS 来源校验器
    pub fn with_tls_validator<V>(mut self, validator: V) -> Self
    where
        V: TlsConfigValidator + Send + Sync + 'static,
    {
        self.tls_validator = Box::new(validator);
        self
    }

    /// 替换 TLS 提供者解析器
    pub fn with_tls_resolver<R>(mut self, resolver: R) -> Self
    where
        R: TlsProviderResolver + Send + Sync + 'static,
    {
        self.tls_resolver = Box::new(resolver);
        self
    }

    /// 校验配置，遇到第一条违反的规则即返回
    pub fn validate(&self, client_name: &str, config: &AsyncHttpClientConfig) -> Result<(), ConfigError> {
        validation::validate_with(
            client_name,
            config,
            self.proxy_validator.as_ref(),
            self.tls_validator.as_ref(),
        )
    }

    /// 校验并生成传输层构建器
    pub fn configure_async(
        &self,
        client_name: &str,
        config: &AsyncHttpClientConfig,
    ) -> Result<TransportBuilder, ConfigError> {
        self.validate(client_name, config)?;
        let builder = self.assemble(config);
        tracing::info!("🔧 异步客户端 {} 配置完成", client_name);
        Ok(builder)
    }

    /// 把已校验的配置写入新的传输层构建器
    pub fn assemble(&self, config: &AsyncHttpClientConfig) -> TransportBuilder {
        self.assemble_into(config, TransportBuilder::new())
    }

    /// 把已校验的配置写入给定构建器
    ///
    /// 不再重复校验。可选项缺省时不调用对应 setter，保留传输层默认值。
    pub fn assemble_into<B: AsyncHttpClientBuilder>(
        &self,
        config: &AsyncHttpClientConfig,
        mut builder: B,
    ) -> B {
        builder.connection_acquisition_timeout(config.connection_acquisition_timeout);
        builder.connection_max_idle_time(config.connection_max_idle_time);
        builder.connection_timeout(config.connection_timeout);
        if let Some(ttl) = config.connection_time_to_live {
            builder.connection_time_to_live(ttl);
        }
        builder.max_concurrency(config.max_concurrency);
        builder.max_pending_connection_acquires(config.max_pending_connection_acquires);
        builder.protocol(config.protocol);
        builder.read_timeout(config.read_timeout);
        builder.write_timeout(config.write_timeout);
        builder.tcp_keep_alive(config.tcp_keep_alive);
        if let Some(provider) = config.ssl_provider {
            builder.ssl_provider(SslProvider::from(provider));
        }
        builder.use_idle_connection_reaper(config.use_idle_connection_reaper);

        if let Some(http2) = http2_configuration(&config.http2) {
            tracing::debug!(?http2, "应用 HTTP/2 配置");
            builder.http2_configuration(http2);
        }

        if let Some(proxy) = proxy_configuration(&config.proxy) {
            tracing::debug!(scheme = %proxy.scheme, host = %proxy.host, port = ?proxy.port, "应用代理配置");
            builder.proxy_configuration(proxy);
        }

        builder.tls_key_managers_provider(
            self.tls_resolver.key_managers_provider(&config.tls_key_managers_provider),
        );
        if let Some(provider) = self
            .tls_resolver
            .trust_managers_provider(&config.tls_trust_managers_provider)
        {
            builder.tls_trust_managers_provider(provider);
        }

        builder
    }

    /// 挂载事件循环
    ///
    /// `override` 为 true 时挂载专用事件循环规格，`shared_loop_factory` 不会被调用；
    /// 否则调用一次 `shared_loop_factory` 获取调用方的运行时句柄并挂载。
    pub fn configure_event_loop<B, F>(
        &self,
        mut builder: B,
        shared_loop_factory: F,
        config: &EventLoopConfig,
    ) -> B
    where
        B: AsyncHttpClientBuilder,
        F: FnOnce() -> Handle,
    {
        if config.override_enabled {
            let spec = event_loop_spec(config);
            tracing::debug!(threads = ?spec.number_of_threads(), "使用专用事件循环");
            builder.event_loop_group_builder(spec);
        } else {
            tracing::debug!("使用共享事件循环");
            builder.event_loop_group(SharedEventLoopGroup::new(shared_loop_factory()));
        }
        builder
    }
}

/// 窗口大小或最大流数至少有一个时才生成 HTTP/2 配置
///
/// 只设置健康检查周期时不会生成，该周期随之被忽略。
fn http2_configuration(http2: &Http2Config) -> Option<Http2Configuration> {
    if http2.initial_window_size.is_none() && http2.max_streams.is_none() {
        return None;
    }
    Some(Http2Configuration {
        initial_window_size: http2.initial_window_size,
        max_streams: http2.max_streams,
        health_check_ping_period: http2.health_check_ping_period,
    })
}

fn proxy_configuration(proxy: &ProxyConfig) -> Option<ProxyConfiguration> {
    if !proxy.enabled {
        return None;
    }
    let endpoint = proxy.endpoint.as_ref()?;
    Some(ProxyConfiguration {
        scheme: endpoint.url().scheme().to_string(),
        host: endpoint.url().host_str().unwrap_or_default().to_string(),
        port: endpoint.port(),
        non_proxy_hosts: proxy.non_proxy_hosts.iter().flatten().cloned().collect(),
    })
}

fn event_loop_spec(config: &EventLoopConfig) -> EventLoopGroupSpec {
    let mut spec = EventLoopGroupSpec::new();
    if let Some(threads) = config.number_of_threads {
        match usize::try_from(threads).ok().and_then(NonZeroUsize::new) {
            Some(threads) => spec = spec.with_number_of_threads(threads),
            None => tracing::warn!(threads, "事件循环线程数无效，使用传输层默认值"),
        }
    }
    if let Some(prefix) = &config.thread_name_prefix {
        spec = spec.with_thread_naming(ThreadNamePolicy::new(prefix.as_str()));
    }
    spec
}
