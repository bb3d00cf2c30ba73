use raffle_bot::config::Config;
use std::env;
use std::sync::Mutex;

// Mutex to ensure config tests run sequentially to avoid environment variable conflicts
static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_config_from_env_with_all_vars() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token_123");
    env::set_var("ADMIN_USER_ID", "424242");
    env::set_var("DATABASE_URL", "sqlite:test.db");
    env::set_var("HTTP_PORT", "8080");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "test_token_123");
    assert_eq!(config.admin_user_id, 424242);
    assert_eq!(config.database_url, "sqlite:test.db");
    assert_eq!(config.http_port, 8080);

    // Clean up
    env::remove_var("TELEGRAM_BOT_TOKEN");
    env::remove_var("ADMIN_USER_ID");
    env::remove_var("DATABASE_URL");
    env::remove_var("HTTP_PORT");
}

#[test]
fn test_config_from_env_with_defaults() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();

    // Only set required token, let others use defaults
    env::set_var("TELEGRAM_BOT_TOKEN", "required_token");
    env::remove_var("ADMIN_USER_ID");
    env::remove_var("DATABASE_URL");
    env::remove_var("HTTP_PORT");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "required_token");
    assert_eq!(config.admin_user_id, 0);
    assert_eq!(config.database_url, "sqlite:./data/raffle.db");
    assert_eq!(config.http_port, 3000);

    // Clean up
    env::remove_var("TELEGRAM_BOT_TOKEN");
}

#[test]
fn test_config_missing_required_token() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();

    env::remove_var("TELEGRAM_BOT_TOKEN");

    let result = Config::from_env();
    assert!(result.is_err());

    let error_msg = result.unwrap_err().to_string();
    assert!(error_msg.contains("TELEGRAM_BOT_TOKEN must be set"));
}

#[test]
fn test_config_invalid_admin_id() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("ADMIN_USER_ID", "not_a_number");

    let result = Config::from_env();
    assert!(result.is_err());

    let error_msg = result.unwrap_err().to_string();
    assert!(error_msg.contains("Invalid ADMIN_USER_ID"));

    // Clean up
    env::remove_var("TELEGRAM_BOT_TOKEN");
    env::remove_var("ADMIN_USER_ID");
}

#[test]
fn test_config_invalid_port() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::remove_var("ADMIN_USER_ID");
    env::set_var("HTTP_PORT", "invalid_port");

    let result = Config::from_env();
    assert!(result.is_err());

    let error_msg = result.unwrap_err().to_string();
    assert!(error_msg.contains("Invalid HTTP_PORT"));

    // Clean up
    env::remove_var("TELEGRAM_BOT_TOKEN");
    env::remove_var("HTTP_PORT");
}

#[test]
fn test_config_empty_values() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();

    // Empty token should fail
    env::set_var("TELEGRAM_BOT_TOKEN", "");
    let result = Config::from_env();
    assert!(result.is_err());

    // Empty optional values fall back to defaults
    env::set_var("TELEGRAM_BOT_TOKEN", "valid_token");
    env::set_var("ADMIN_USER_ID", "");
    env::set_var("DATABASE_URL", "");
    env::remove_var("HTTP_PORT");
    let config = Config::from_env().unwrap();
    assert_eq!(config.admin_user_id, 0);
    assert_eq!(config.database_url, "sqlite:./data/raffle.db");

    // Clean up
    env::remove_var("TELEGRAM_BOT_TOKEN");
    env::remove_var("ADMIN_USER_ID");
    env::remove_var("DATABASE_URL");
}

#[test]
fn test_config_whitespace_handling() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();

    env::set_var("TELEGRAM_BOT_TOKEN", "token_value");
    env::set_var("ADMIN_USER_ID", "  12345  ");
    env::set_var("HTTP_PORT", "  3000  ");
    env::remove_var("DATABASE_URL");

    let config = Config::from_env().unwrap();

    // Numeric values are parsed with surrounding whitespace trimmed
    assert_eq!(config.admin_user_id, 12345);
    assert_eq!(config.http_port, 3000);

    // Clean up
    env::remove_var("TELEGRAM_BOT_TOKEN");
    env::remove_var("ADMIN_USER_ID");
    env::remove_var("HTTP_PORT");
}
