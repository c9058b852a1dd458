#[cfg(test)]
mod tests {
    use crate::auth::{create_calendar_hub, AuthError, GoogleCredentials};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use coffeechat_config::GcalConfig;

    const CREDENTIALS: &str = r#"{
        "client_id": "id.apps.googleusercontent.com",
        "client_secret": "shh",
        "refresh_token": "1//refresh"
    }"#;

    #[test]
    fn parses_raw_json_credentials() {
        let creds = GoogleCredentials::parse(CREDENTIALS).expect("valid credentials");
        assert_eq!(creds.client_id, "id.apps.googleusercontent.com");
        assert_eq!(creds.refresh_token, "1//refresh");
    }

    #[test]
    fn exported_credentials_become_an_authorized_user_secret() {
        let exported = r#"{
            "client_id": "id",
            "client_secret": "shh",
            "refresh_token": "1//refresh",
            "token_uri": "https://oauth2.googleapis.com/token",
            "type": "authorized_user"
        }"#;
        let secret = GoogleCredentials::parse(exported)
            .expect("token_uri and type are tolerated")
            .into_secret();
        assert_eq!(secret.client_id, "id");
        assert_eq!(secret.client_secret, "shh");
        assert_eq!(secret.refresh_token, "1//refresh");
        assert_eq!(secret.key_type, "authorized_user");
    }

    #[test]
    fn parses_base64_credentials_with_surrounding_whitespace() {
        let encoded = format!("  {}\n", STANDARD.encode(CREDENTIALS));
        let creds = GoogleCredentials::parse(&encoded).expect("valid credentials");
        assert_eq!(creds.client_secret, "shh");
    }

    #[test]
    fn missing_fields_are_named() {
        let err = GoogleCredentials::parse(r#"{"client_id": "id", "client_secret": ""}"#)
            .expect_err("incomplete credentials");
        match err {
            AuthError::MissingFields(fields) => {
                assert_eq!(fields, vec!["refresh_token", "client_secret"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            GoogleCredentials::parse("not json at all"),
            Err(AuthError::InvalidCredentials(_))
        ));
        assert!(matches!(
            GoogleCredentials::parse("   "),
            Err(AuthError::EmptyCredentials)
        ));
    }

    #[tokio::test]
    async fn hub_requires_some_credentials() {
        let result = create_calendar_hub(&GcalConfig::default()).await;
        assert!(matches!(result, Err(AuthError::NotConfigured)));
    }

    #[tokio::test]
    async fn hub_reports_missing_key_file() {
        let config = GcalConfig {
            key_path: Some("does-not-exist/service-account.json".to_string()),
            ..Default::default()
        };
        let err = create_calendar_hub(&config)
            .await
            .err()
            .expect("missing key file");
        assert!(matches!(err, AuthError::Io(_)), "got {err}");
    }
}
