mod harness;

use harness::mock_upstream::{IMAGE_BYTES, MockUpstream, Reply};
use secrecy::SecretString;
use text2img_config::{ImageGenConfig, ProviderKind};
use text2img_imagegen::{ErrorKind, ImageGenError, ImageGenProvider, Provider};

fn config(provider: ProviderKind, base_url: String, model: &str, keys: &[&str]) -> ImageGenConfig {
    ImageGenConfig {
        provider,
        api_keys: keys.iter().map(|k| SecretString::from((*k).to_owned())).collect(),
        model: model.to_owned(),
        base_url: Some(base_url),
        ..ImageGenConfig::default()
    }
}

fn gitee(mock: &MockUpstream, keys: &[&str]) -> Provider {
    Provider::from_config(&config(ProviderKind::Gitee, mock.base_url(), "z-image-turbo", keys))
}

#[tokio::test]
async fn gitee_rotates_keys_across_requests() {
    let mock = MockUpstream::start(Reply::Base64).await.unwrap();
    let provider = gitee(&mock, &["key-a", "key-b"]);

    for _ in 0..3 {
        provider.generate_image("a lighthouse", "1024x1024").await.unwrap();
    }

    let auth: Vec<_> = mock
        .requests()
        .into_iter()
        .map(|r| r.authorization.unwrap_or_default())
        .collect();
    assert_eq!(auth, ["Bearer key-a", "Bearer key-b", "Bearer key-a"]);

    match &provider {
        Provider::Gitee(inner) => assert_eq!(inner.cached_clients(), 2),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn gitee_repeated_key_reuses_its_client() {
    let mock = MockUpstream::start(Reply::Base64).await.unwrap();
    let provider = gitee(&mock, &["dup", "dup", "other"]);

    for _ in 0..3 {
        provider.generate_image("a kite", "1024x1024").await.unwrap();
    }

    match &provider {
        Provider::Gitee(inner) => assert_eq!(inner.cached_clients(), 2),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn gitee_sends_prompt_size_and_negative_prompt() {
    let mock = MockUpstream::start(Reply::Base64).await.unwrap();
    let provider = gitee(&mock, &["key"]);

    let image = provider.generate_image("a red fox", "1024x576").await.unwrap();
    assert_eq!(image.data, IMAGE_BYTES);
    assert_eq!(image.extension, ".jpg");

    let request = &mock.requests()[0];
    assert_eq!(request.path, "/v1/images/generations");
    assert_eq!(request.body["prompt"], "a red fox");
    assert_eq!(request.body["model"], "z-image-turbo");
    assert_eq!(request.body["size"], "1024x576");
    assert!(request.body["negative_prompt"].as_str().unwrap().contains("low quality"));
}

#[tokio::test]
async fn gitee_downloads_url_results() {
    let mock = MockUpstream::start(Reply::Url).await.unwrap();
    let provider = gitee(&mock, &["key"]);

    let image = provider.generate_image("a bridge", "1024x1024").await.unwrap();
    assert_eq!(image.data, IMAGE_BYTES);
}

#[tokio::test]
async fn gitee_unauthorized_reports_bad_key() {
    let mock = MockUpstream::start(Reply::Status(401, "{\"error\":\"unauthorized\"}")).await.unwrap();
    let provider = gitee(&mock, &["stale"]);

    let err = provider.generate_image("x", "1024x1024").await.unwrap_err();
    assert!(matches!(err, ImageGenError::AuthenticationFailed(_)));
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("invalid or expired"));
}

#[tokio::test]
async fn gitee_rate_limit_and_server_errors() {
    let mock = MockUpstream::start(Reply::Status(429, "slow down")).await.unwrap();
    let provider = gitee(&mock, &["key"]);

    let err = provider.generate_image("x", "1024x1024").await.unwrap_err();
    assert!(matches!(err, ImageGenError::RateLimited(_)));

    mock.set_reply(Reply::Status(503, "maintenance"));
    let err = provider.generate_image("x", "1024x1024").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn gitee_empty_and_missing_image_data() {
    let mock = MockUpstream::start(Reply::EmptyData).await.unwrap();
    let provider = gitee(&mock, &["key"]);

    let err = provider.generate_image("x", "1024x1024").await.unwrap_err();
    assert!(matches!(err, ImageGenError::InvalidResponse(_)));
    assert_eq!(err.kind(), ErrorKind::ResponseShape);

    mock.set_reply(Reply::MissingImage);
    let err = provider.generate_image("x", "1024x1024").await.unwrap_err();
    assert!(matches!(err, ImageGenError::NoImageData(_)));
}

#[tokio::test]
async fn broken_download_is_a_transport_error() {
    let mock = MockUpstream::start(Reply::BrokenDownload).await.unwrap();
    let provider = gitee(&mock, &["key"]);

    let err = provider.generate_image("x", "1024x1024").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("failed to download image"));
}

#[tokio::test]
async fn empty_key_pool_fails_before_any_request() {
    let mock = MockUpstream::start(Reply::Base64).await.unwrap();
    let provider = gitee(&mock, &[]);

    let err = provider.generate_image("x", "1024x1024").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn aliyun_downloads_png_and_limits_wan_to_one_image() {
    let mock = MockUpstream::start(Reply::Url).await.unwrap();
    let provider = Provider::from_config(&config(
        ProviderKind::Aliyun,
        mock.aliyun_base_url(),
        "wan2.6-t2i",
        &["sk-one", "sk-two"],
    ));

    let image = provider.generate_image("a teapot", "1280*1280").await.unwrap();
    assert_eq!(image.data, IMAGE_BYTES);
    assert_eq!(image.extension, ".png");

    provider.generate_image("a teapot", "1280*1280").await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests[0].path, "/aliyun/generation");
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer sk-one"));
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer sk-two"));

    let body = &requests[0].body;
    assert_eq!(body["model"], "wan2.6-t2i");
    assert_eq!(body["input"]["messages"][0]["content"][0]["text"], "a teapot");
    assert_eq!(body["parameters"]["size"], "1280*1280");
    assert_eq!(body["parameters"]["n"], 1);
}

#[tokio::test]
async fn aliyun_missing_image_path_is_a_parse_error() {
    let mock = MockUpstream::start(Reply::MissingImage).await.unwrap();
    let provider = Provider::from_config(&config(
        ProviderKind::Aliyun,
        mock.aliyun_base_url(),
        "qwen-image-plus",
        &["sk"],
    ));

    let err = provider.generate_image("x", "1328*1328").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResponseShape);
    assert!(err.to_string().starts_with("failed to parse Aliyun response"));
    assert!(mock.requests()[0].body["parameters"].get("n").is_none());
}

#[tokio::test]
async fn aliyun_error_status_includes_body() {
    let mock = MockUpstream::start(Reply::Status(400, "InvalidParameter")).await.unwrap();
    let provider = Provider::from_config(&config(
        ProviderKind::Aliyun,
        mock.aliyun_base_url(),
        "qwen-image-plus",
        &["sk"],
    ));

    let err = provider.generate_image("x", "1328*1328").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("InvalidParameter"));
}

#[tokio::test]
async fn volcengine_disables_watermark_and_returns_jpg() {
    let mock = MockUpstream::start(Reply::Base64).await.unwrap();
    let provider = Provider::from_config(&config(
        ProviderKind::Volcengine,
        mock.base_url(),
        "doubao-seedream-4-5-251128",
        &["ark-key"],
    ));

    let image = provider.generate_image("a harbor at dusk", "2048x2048").await.unwrap();
    assert_eq!(image.data, IMAGE_BYTES);
    assert_eq!(image.extension, ".jpg");

    let request = &mock.requests()[0];
    assert_eq!(request.authorization.as_deref(), Some("Bearer ark-key"));
    assert_eq!(request.body["watermark"], false);
    assert_eq!(request.body["size"], "2048x2048");
    assert_eq!(request.body["model"], "doubao-seedream-4-5-251128");
}

#[tokio::test]
async fn volcengine_empty_data() {
    let mock = MockUpstream::start(Reply::EmptyData).await.unwrap();
    let provider = Provider::from_config(&config(
        ProviderKind::Volcengine,
        mock.base_url(),
        "doubao-seedream-4-0-250828",
        &["ark-key"],
    ));

    let err = provider.generate_image("x", "2048x2048").await.unwrap_err();
    assert!(matches!(err, ImageGenError::InvalidResponse(_)));
}

#[tokio::test]
async fn close_is_idempotent_and_provider_stays_usable() {
    let mock = MockUpstream::start(Reply::Url).await.unwrap();
    let provider = gitee(&mock, &["key"]);

    provider.generate_image("x", "1024x1024").await.unwrap();
    provider.close();
    provider.close();

    provider.generate_image("x", "1024x1024").await.unwrap();
    assert_eq!(mock.requests().len(), 2);
}

#[test]
fn provider_names_and_tables_follow_config() {
    let provider = Provider::from_config(&ImageGenConfig {
        provider: ProviderKind::Volcengine,
        model: "doubao-seedream-3-0-t2i".to_owned(),
        ..ImageGenConfig::default()
    });

    assert_eq!(provider.name(), "volcengine");
    assert_eq!(provider.kind(), ProviderKind::Volcengine);
    assert!(provider.supported_ratios().contains("1:1"));
}
