use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use url::Url;

use crate::byte_range::ByteRange;
use crate::config::RunConfig;
use crate::error::{FetchError, Result};
use crate::fetcher::{ObjectReader, ObjectStore};
use crate::metadata::ObjectMetadata;
use crate::tls;

#[derive(Clone, Debug)]
pub struct S3Agent {
    client: Client,
}

// see:
// https://docs.aws.amazon.com/sdk-for-rust/latest/dg/rust_s3_code_examples.html

impl S3Agent {
    /// Build a client bound to the configured endpoint with static
    /// credentials. Nothing is sent over the network here.
    pub async fn new(config: &RunConfig) -> Result<Self> {
        let endpoint = resolve_endpoint(&config.endpoint, config.secure)?;
        debug!(
            "using endpoint {}, region {}, skip_tls_verify: {}",
            endpoint, config.region, config.skip_tls_verify
        );

        // static long-term credentials, no session token
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "s3fetch-static",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if config.skip_tls_verify {
            warn!("TLS certificate verification is disabled");
            loader = loader.http_client(tls::insecure_http_client());
        }
        let sdk_config = loader.load().await;

        // s3-compatible stores generally don't resolve virtual-hosted buckets
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
        })
    }
}

impl ObjectStore for S3Agent {
    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        debug!("fetching metadata for s3://{}/{}", bucket, key);

        let head = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| FetchError::MetadataFetch(DisplayErrorContext(&e).to_string()))?;

        Ok(ObjectMetadata::from_head_object(key, &head))
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        range: Option<&ByteRange>,
    ) -> Result<ObjectReader> {
        if range.is_some_and(ByteRange::is_empty) {
            debug!("empty range requested for s3://{}/{}, skipping download", bucket, key);
            return Ok(Box::new(tokio::io::empty()));
        }

        let header = range.and_then(ByteRange::header_value);
        debug!(
            "downloading s3://{}/{} with range {}",
            bucket,
            key,
            header.as_deref().unwrap_or("<none>")
        );

        let object = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .set_range(header)
            .send()
            .await
            .map_err(|e| FetchError::ObjectFetch(DisplayErrorContext(&e).to_string()))?;

        Ok(Box::new(ByteStream::into_async_read(object.body)))
    }
}

/// Normalize the endpoint so its scheme agrees with `secure`. An endpoint
/// without a scheme gets one.
pub fn resolve_endpoint(endpoint: &str, secure: bool) -> Result<String> {
    let endpoint = endpoint.trim();
    let scheme = if secure { "https" } else { "http" };

    let mut url = if endpoint.contains("://") {
        Url::parse(endpoint)
    } else {
        Url::parse(&format!("{}://{}", scheme, endpoint))
    }
    .map_err(|e| FetchError::ClientConstruction(format!("invalid endpoint '{}': {}", endpoint, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(FetchError::ClientConstruction(format!(
                "invalid endpoint '{}': unsupported scheme '{}'",
                endpoint, other
            )))
        }
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(FetchError::ClientConstruction(format!(
            "invalid endpoint '{}': missing host",
            endpoint
        )));
    }
    if url.scheme() != scheme {
        warn!(
            "endpoint scheme '{}' overridden by --secure={}",
            url.scheme(),
            secure
        );
        url.set_scheme(scheme).map_err(|_| {
            FetchError::ClientConstruction(format!("cannot use {} with endpoint '{}'", scheme, endpoint))
        })?;
    }

    Ok(url.as_str().trim_end_matches('/').to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio_rustls::TlsAcceptor;

    #[test]
    fn keeps_matching_scheme() {
        assert_eq!(
            resolve_endpoint("https://localhost:9443", true).unwrap(),
            "https://localhost:9443"
        );
        assert_eq!(
            resolve_endpoint("http://minio.local:9000/", false).unwrap(),
            "http://minio.local:9000"
        );
    }

    #[test]
    fn adds_scheme_from_secure_flag() {
        assert_eq!(
            resolve_endpoint("localhost:9000", false).unwrap(),
            "http://localhost:9000"
        );
        assert_eq!(
            resolve_endpoint("play.min.io", true).unwrap(),
            "https://play.min.io"
        );
    }

    #[test]
    fn secure_flag_overrides_scheme() {
        assert_eq!(
            resolve_endpoint("https://localhost:9443", false).unwrap(),
            "http://localhost:9443"
        );
        assert_eq!(
            resolve_endpoint("http://localhost:9000", true).unwrap(),
            "https://localhost:9000"
        );
    }

    #[test]
    fn rejects_malformed_endpoints() {
        for bad in ["ftp://host", "https://", "http://exa mple.com", "https://host:notaport"] {
            assert!(
                matches!(
                    resolve_endpoint(bad, true),
                    Err(FetchError::ClientConstruction(_))
                ),
                "{}",
                bad
            );
        }
    }

    fn run_config(endpoint: &str, secure: bool, skip_tls_verify: bool) -> RunConfig {
        RunConfig {
            endpoint: endpoint.to_owned(),
            access_key: "a".to_owned(),
            secret_key: "s".to_owned(),
            bucket: "b".to_owned(),
            object: "o".to_owned(),
            region: "us-east-1".to_owned(),
            range: None,
            secure,
            skip_tls_verify,
        }
    }

    /// Serve a canned HEAD response over TLS with a freshly generated
    /// self-signed certificate.
    async fn serve_self_signed() -> SocketAddr {
        let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_owned()]).unwrap();
        let server_config = rustls::ServerConfig::builder()
            .with_safe_defaults()
            .with_no_client_auth()
            .with_single_cert(
                vec![rustls::Certificate(cert.serialize_der().unwrap())],
                rustls::PrivateKey(cert.serialize_private_key_der()),
            )
            .unwrap();
        let acceptor = TlsAcceptor::from(Arc::new(server_config));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let acceptor = acceptor.clone();
                tokio::spawn(async move {
                    // clients that verify the certificate abort the handshake
                    let Ok(mut tls) = acceptor.accept(stream).await else {
                        return;
                    };
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match tls.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }
                    let _ = tls
                        .write_all(
                            b"HTTP/1.1 200 OK\r\n\
                              Content-Length: 3\r\n\
                              Content-Type: text/plain\r\n\
                              ETag: \"abc\"\r\n\
                              Connection: close\r\n\r\n",
                        )
                        .await;
                    let _ = tls.shutdown().await;
                });
            }
        });

        addr
    }

    #[tokio::test]
    async fn builds_client_without_network() {
        let config = run_config("http://127.0.0.1:1", false, true);
        assert!(S3Agent::new(&config).await.is_ok());

        let config = RunConfig {
            endpoint: "ftp://127.0.0.1".to_owned(),
            ..config
        };
        assert!(matches!(
            S3Agent::new(&config).await,
            Err(FetchError::ClientConstruction(_))
        ));
    }

    #[tokio::test]
    async fn empty_range_skips_the_request() {
        // nothing listens on port 1, so any request would fail
        let agent = S3Agent::new(&run_config("http://127.0.0.1:1", false, false))
            .await
            .unwrap();
        let range = ByteRange::new(5, 5).unwrap();

        let reader = agent.get_object("b", "o", Some(&range)).await.unwrap();
        let data = crate::fetcher::drain(reader).await.unwrap();

        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn skip_tls_verify_accepts_self_signed_certificate() {
        let addr = serve_self_signed().await;
        let endpoint = format!("https://{}", addr);

        let strict = S3Agent::new(&run_config(&endpoint, true, false))
            .await
            .unwrap();
        match strict.stat_object("b", "o").await {
            Err(FetchError::MetadataFetch(msg)) => {
                assert!(msg.to_lowercase().contains("certificate"), "{}", msg)
            }
            other => panic!("expected a certificate failure, got {:?}", other),
        }

        let insecure = S3Agent::new(&run_config(&endpoint, true, true))
            .await
            .unwrap();
        let metadata = insecure.stat_object("b", "o").await.unwrap();
        assert_eq!(metadata.key, "o");
        assert_eq!(metadata.size, Some(3));
        assert_eq!(metadata.etag.as_deref(), Some("\"abc\""));
        assert_eq!(metadata.content_type.as_deref(), Some("text/plain"));
    }
}
