// tests/notify_env.rs
use hackathon_monitor::notify::webhook::WebhookNotifier;

const ENV_KEY: &str = "MONITOR_WEBHOOK_URL";

#[serial_test::serial]
#[test]
fn webhook_sink_is_configured_only_with_env_url() {
    std::env::set_var(ENV_KEY, "https://hooks.example.test/T000/B000");
    assert!(WebhookNotifier::from_env().is_configured());

    std::env::remove_var(ENV_KEY);
    assert!(!WebhookNotifier::from_env().is_configured());
}
