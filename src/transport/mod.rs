pub mod builder;
pub mod event_loop;

// 重新导出构建器接口和默认实现
pub use builder::{
    AsyncHttpClientBuilder, TransportBuilder, EventLoopGroupSource,
    Http2Configuration, ProxyConfiguration, SslProvider
};

// 重新导出事件循环类型
pub use event_loop::{
    EventLoopGroupSpec, SharedEventLoopGroup, ThreadNamePolicy
};
