use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by merging defaults, TOML, environment variables, and JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from_dir("config")
    }

    /// Loads configuration from `<dir>/Config.toml` and `<dir>/Config.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_from_dir(dir: &str) -> Result<AppConfig> {
        let config: AppConfig = Self::base(dir)
            .merge(Env::prefixed("FNO_").split("__"))
            .join(Json::file(format!("{dir}/Config.json")))
            .extract()?;

        Ok(config)
    }

    /// Loads configuration with a specific profile layered over `Config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        Self::load_profile_from_dir("config", profile)
    }

    /// Loads `<dir>/Config.toml`, then `<dir>/Config.<profile>.toml`, then the
    /// environment and `<dir>/Config.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_profile_from_dir(dir: &str, profile: &str) -> Result<AppConfig> {
        let config: AppConfig = Self::base(dir)
            .merge(Toml::file(format!("{dir}/Config.{profile}.toml")))
            .merge(Env::prefixed("FNO_").split("__"))
            .join(Json::file(format!("{dir}/Config.json")))
            .extract()?;

        Ok(config)
    }

    fn base(dir: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(format!("{dir}/Config.toml")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SortOrder;
    use crate::contract::ExpiryMonth;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_apply_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config.token_selector.oi_threshold, dec!(4));
            assert_eq!(config.token_selector.atm_pct, dec!(8));
            assert_eq!(config.token_selector.index_exclusions, vec!["NIFTY"]);
            assert_eq!(config.reconciliation.exposure_unit, dec!(100000));
            Ok(())
        });
    }

    #[test]
    fn toml_and_env_layers_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/Config.toml",
                r#"
                [token_selector]
                month = "FEB"
                oi_threshold = 10
                sort = "descending"
                "#,
            )?;
            jail.set_env("FNO_TOKEN_SELECTOR__ATM_PCT", "12");

            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config.token_selector.month, Some(ExpiryMonth::Feb));
            assert_eq!(config.token_selector.oi_threshold, dec!(10));
            assert_eq!(config.token_selector.atm_pct, dec!(12));
            assert_eq!(config.token_selector.sort, SortOrder::Descending);
            Ok(())
        });
    }

    #[test]
    fn profile_file_layers_over_base() {
        figment::Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/Config.toml", "[atm_position]\nrange = 5\n")?;
            jail.create_file("config/Config.expiry.toml", "[atm_position]\nrange = 20\n")?;

            let config = ConfigLoader::load_with_profile("expiry").map_err(|e| e.to_string())?;
            assert_eq!(config.atm_position.range, dec!(20));
            Ok(())
        });
    }
}
