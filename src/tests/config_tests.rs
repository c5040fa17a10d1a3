#[cfg(test)]
mod tests {
    use crate::config::{self, AppConfig};

    #[test]
    fn test_valid_config_does_not_error() {
        let result = config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_embedded_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.session.lifetime_hours, 12);
        assert_eq!(cfg.session.cookie_name, "session");
        assert_eq!(cfg.auth.bcrypt_cost, 12);
        assert_eq!(cfg.snippets.latest_limit, 10);
        assert!(cfg.database.url.starts_with("sqlite://"));
        assert!(config::validate(&cfg).is_ok());
    }

    #[test]
    fn test_invalid_port() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        let err = config::validate(&cfg).unwrap_err();
        assert!(err.to_string().contains("invalid server.port"));
    }

    #[test]
    fn test_invalid_session_settings() {
        let mut cfg = AppConfig::default();
        cfg.session.lifetime_hours = 0;
        let err = config::validate(&cfg).unwrap_err();
        assert!(err.to_string().contains("session.lifetime_hours"));

        let mut cfg = AppConfig::default();
        cfg.session.cookie_name = "  ".to_string();
        let err = config::validate(&cfg).unwrap_err();
        assert!(err.to_string().contains("session.cookie_name"));
    }

    #[test]
    fn test_invalid_bcrypt_cost() {
        for cost in [3, 32] {
            let mut cfg = AppConfig::default();
            cfg.auth.bcrypt_cost = cost;
            let err = config::validate(&cfg).unwrap_err();
            assert!(err.to_string().contains("auth.bcrypt_cost"), "cost {}", cost);
        }
    }

    #[test]
    fn test_invalid_latest_limit() {
        let mut cfg = AppConfig::default();
        cfg.snippets.latest_limit = 0;
        let err = config::validate(&cfg).unwrap_err();
        assert!(err.to_string().contains("snippets.latest_limit"));
    }

    #[test]
    fn test_ensure_sqlite_parent_dir_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("snipbox.db");
        let url = format!("sqlite://{}", db_path.display());

        config::ensure_sqlite_parent_dir(&url).unwrap();
        assert!(dir.path().join("nested").is_dir());

        // Non-file URLs are left alone.
        config::ensure_sqlite_parent_dir("sqlite::memory:").unwrap();
    }
}
