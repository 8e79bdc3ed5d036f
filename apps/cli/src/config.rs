use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;

#[derive(Debug)]
pub struct Settings {
    pub catalog_url: String,
    pub database_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_url: "https://holy-willow-kdhcompany-277b699c.koyeb.app".into(),
            database_url: "sqlite://./data/roster.db".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("roster.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("catalog_url") {
                settings.catalog_url = v.clone();
            }
            if let Some(v) = file_cfg.get("database_url") {
                settings.database_url = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("ROSTER_CATALOG_URL") {
        settings.catalog_url = v;
    }
    if let Ok(v) = std::env::var("APP__CATALOG_URL") {
        settings.catalog_url = v;
    }

    if let Ok(v) = std::env::var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Ok(v) = std::env::var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    settings
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    ensure_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

fn ensure_parent_dir_exists(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        sync::Mutex,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    // Settings tests mutate the working directory and process environment,
    // which are global, so they serialize on this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const SETTINGS_VARS: [&str; 4] = [
        "ROSTER_CATALOG_URL",
        "APP__CATALOG_URL",
        "DATABASE_URL",
        "APP__DATABASE_URL",
    ];

    #[test]
    fn normalizes_plain_file_path_to_sqlite_url() {
        assert_eq!(
            normalize_database_url("./data/roster.db"),
            "sqlite://./data/roster.db"
        );
    }

    #[test]
    fn leaves_memory_url_untouched() {
        assert_eq!(
            normalize_database_url("sqlite::memory:"),
            "sqlite::memory:"
        );
    }

    #[test]
    fn env_overrides_take_precedence_over_file_and_defaults() {
        let _guard = ENV_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for var in SETTINGS_VARS {
            env::remove_var(var);
        }

        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let temp_root = env::temp_dir().join(format!("roster_cli_settings_{suffix}"));
        fs::create_dir_all(&temp_root).expect("temp root");

        let original_dir = env::current_dir().expect("cwd");
        env::set_current_dir(&temp_root).expect("set cwd");

        let defaults = load_settings();
        assert_eq!(defaults.catalog_url, Settings::default().catalog_url);
        assert_eq!(defaults.database_url, Settings::default().database_url);

        fs::write(
            "roster.toml",
            "catalog_url = \"http://file.example\"\ndatabase_url = \"sqlite://./file/roster.db\"\n",
        )
        .expect("write config file");
        let from_file = load_settings();
        assert_eq!(from_file.catalog_url, "http://file.example");
        assert_eq!(from_file.database_url, "sqlite://./file/roster.db");

        env::set_var("ROSTER_CATALOG_URL", "http://env.example");
        env::set_var("DATABASE_URL", "sqlite://./env/roster.db");
        let from_env = load_settings();
        assert_eq!(from_env.catalog_url, "http://env.example");
        assert_eq!(from_env.database_url, "sqlite://./env/roster.db");

        env::set_var("APP__CATALOG_URL", "http://app-env.example");
        env::set_var("APP__DATABASE_URL", "sqlite://./app-env/roster.db");
        let from_app_env = load_settings();
        assert_eq!(from_app_env.catalog_url, "http://app-env.example");
        assert_eq!(from_app_env.database_url, "sqlite://./app-env/roster.db");

        for var in SETTINGS_VARS {
            env::remove_var(var);
        }
        env::set_current_dir(original_dir).expect("restore cwd");
        fs::remove_dir_all(temp_root).expect("cleanup");
    }

    #[test]
    fn creates_parent_dir_for_relative_sqlite_url() {
        let _guard = ENV_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();

        let temp_root = env::temp_dir().join(format!("roster_cli_test_{suffix}"));
        fs::create_dir_all(&temp_root).expect("temp root");

        let original_dir = env::current_dir().expect("cwd");
        env::set_current_dir(&temp_root).expect("set cwd");

        prepare_database_url("./data/roster.db").expect("prepare db url");
        assert!(temp_root.join("data").exists());

        env::set_current_dir(original_dir).expect("restore cwd");
        fs::remove_dir_all(temp_root).expect("cleanup");
    }
}
