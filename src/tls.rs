/// TLS 证书来源
///
/// 把配置里的 key/trust managers 来源解析成传输层可用的提供者，
/// 并负责从 PEM 证书库加载证书材料。

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, RootCertStore, SignatureScheme};

use crate::config::{
    FileStoreConfig, TlsKeyManagersProviderConfig, TlsKeyManagersProviderType,
    TlsTrustManagersProviderConfig, TlsTrustManagersProviderType,
};
use crate::error::TlsMaterialError;

/// 客户端证书库路径的环境变量
pub const KEY_STORE_ENV: &str = "TLS_KEY_STORE";
/// 客户端证书库类型的环境变量，缺省为 pem
pub const KEY_STORE_TYPE_ENV: &str = "TLS_KEY_STORE_TYPE";

const PEM_STORE_TYPE: &str = "pem";

/// 文件证书库
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStoreProvider {
    path: PathBuf,
    store_type: String,
}

impl FileStoreProvider {
    pub fn new(path: impl Into<PathBuf>, store_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            store_type: store_type.into(),
        }
    }

    fn from_config(config: Option<&FileStoreConfig>) -> Option<Self> {
        let config = config?;
        Some(Self::new(config.path.clone()?, config.store_type.clone()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store_type(&self) -> &str {
        &self.store_type
    }

    fn read(&self) -> Result<Vec<u8>, TlsMaterialError> {
        if !self.store_type.eq_ignore_ascii_case(PEM_STORE_TYPE) {
            return Err(TlsMaterialError::UnsupportedStoreType {
                store_type: self.store_type.clone(),
            });
        }
        std::fs::read(&self.path).map_err(|source| TlsMaterialError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn certificates(&self, pem: &[u8]) -> Result<Vec<CertificateDer<'static>>, TlsMaterialError> {
        let certs = rustls_pemfile::certs(&mut Cursor::new(pem))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TlsMaterialError::Pem {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        if certs.is_empty() {
            return Err(TlsMaterialError::NoCertificates { path: self.path.clone() });
        }
        Ok(certs)
    }

    /// 加载证书链和私钥
    pub fn load_key_material(&self) -> Result<ClientKeyMaterial, TlsMaterialError> {
        let pem = self.read()?;
        let certificates = self.certificates(&pem)?;
        let private_key = rustls_pemfile::private_key(&mut Cursor::new(&pem))
            .map_err(|e| TlsMaterialError::Pem {
                path: self.path.clone(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| TlsMaterialError::MissingPrivateKey { path: self.path.clone() })?;
        Ok(ClientKeyMaterial {
            certificates,
            private_key,
        })
    }

    /// 加载信任证书
    pub fn load_root_store(&self) -> Result<RootCertStore, TlsMaterialError> {
        let pem = self.read()?;
        let mut roots = RootCertStore::empty();
        for cert in self.certificates(&pem)? {
            roots.add(cert)?;
        }
        Ok(roots)
    }
}

/// 客户端证书材料
#[derive(Debug)]
pub struct ClientKeyMaterial {
    pub certificates: Vec<CertificateDer<'static>>,
    pub private_key: PrivateKeyDer<'static>,
}

/// 客户端证书（key managers）提供者
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyManagersProvider {
    /// 不提供客户端证书
    None,
    /// 从环境变量指定的证书库读取
    SystemProperty,
    FileStore(FileStoreProvider),
}

impl KeyManagersProvider {
    /// 加载客户端证书材料，没有可用证书时返回 `None`
    pub fn key_material(&self) -> Result<Option<ClientKeyMaterial>, TlsMaterialError> {
        match self {
            KeyManagersProvider::None => Ok(None),
            KeyManagersProvider::SystemProperty => {
                let Ok(path) = std::env::var(KEY_STORE_ENV) else {
                    return Ok(None);
                };
                let store_type = std::env::var(KEY_STORE_TYPE_ENV)
                    .unwrap_or_else(|_| PEM_STORE_TYPE.to_string());
                FileStoreProvider::new(path, store_type).load_key_material().map(Some)
            }
            KeyManagersProvider::FileStore(store) => store.load_key_material().map(Some),
        }
    }
}

/// 信任证书（trust managers）提供者
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustManagersProvider {
    /// 不校验服务端证书
    TrustAll,
    FileStore(FileStoreProvider),
}

/// 信任材料
#[derive(Debug)]
pub enum TrustMaterial {
    TrustAll,
    Roots(RootCertStore),
}

impl TrustManagersProvider {
    pub fn trust_material(&self) -> Result<TrustMaterial, TlsMaterialError> {
        match self {
            TrustManagersProvider::TrustAll => Ok(TrustMaterial::TrustAll),
            TrustManagersProvider::FileStore(store) => store.load_root_store().map(TrustMaterial::Roots),
        }
    }
}

/// TLS 提供者解析器
pub trait TlsProviderResolver {
    /// 总是返回一个提供者，必要时退化为不提供证书
    fn key_managers_provider(&self, config: &TlsKeyManagersProviderConfig) -> KeyManagersProvider;

    /// 返回 `None` 表示沿用传输层默认信任库
    fn trust_managers_provider(
        &self,
        config: &TlsTrustManagersProviderConfig,
    ) -> Option<TrustManagersProvider>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTlsProviderResolver;

impl TlsProviderResolver for DefaultTlsProviderResolver {
    fn key_managers_provider(&self, config: &TlsKeyManagersProviderConfig) -> KeyManagersProvider {
        match config.provider_type {
            TlsKeyManagersProviderType::None => KeyManagersProvider::None,
            TlsKeyManagersProviderType::SystemProperty => KeyManagersProvider::SystemProperty,
            TlsKeyManagersProviderType::FileStore => {
                match FileStoreProvider::from_config(config.file_store.as_ref()) {
                    Some(store) => KeyManagersProvider::FileStore(store),
                    None => {
                        tracing::warn!("file-store key managers provider is incomplete, no client certificate will be used");
                        KeyManagersProvider::None
                    }
                }
            }
        }
    }

    fn trust_managers_provider(
        &self,
        config: &TlsTrustManagersProviderConfig,
    ) -> Option<TrustManagersProvider> {
        match config.provider_type {
            TlsTrustManagersProviderType::TrustAll => Some(TrustManagersProvider::TrustAll),
            TlsTrustManagersProviderType::SystemProperty => None,
            TlsTrustManagersProviderType::FileStore => {
                FileStoreProvider::from_config(config.file_store.as_ref()).map(TrustManagersProvider::FileStore)
            }
        }
    }
}

#[derive(Debug)]
struct TrustAllVerifier;

impl ServerCertVerifier for TrustAllVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}

/// 由已解析的提供者生成 rustls 客户端配置
///
/// 没有信任提供者时使用 webpki 内置根证书。
pub fn client_tls_config(
    key_managers: Option<&KeyManagersProvider>,
    trust_managers: Option<&TrustManagersProvider>,
) -> Result<rustls::ClientConfig, TlsMaterialError> {
    let builder = rustls::ClientConfig::builder();
    let builder = match trust_managers.map(TrustManagersProvider::trust_material).transpose()? {
        Some(TrustMaterial::TrustAll) => {
            tracing::debug!("[SECURITY] trust-all provider, server certificates are not verified");
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(TrustAllVerifier))
        }
        Some(TrustMaterial::Roots(roots)) => builder.with_root_certificates(roots),
        None => {
            let mut roots = RootCertStore::empty();
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            builder.with_root_certificates(roots)
        }
    };

    match key_managers.map(KeyManagersProvider::key_material).transpose()?.flatten() {
        Some(material) => Ok(builder.with_client_auth_cert(material.certificates, material.private_key)?),
        None => Ok(builder.with_no_client_auth()),
    }
}
