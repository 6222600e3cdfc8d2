use covault_core::foundation::CovaultError;
use covault_core::infrastructure::config::AppConfig;
use log::warn;

pub fn init_logging(level: &str) -> Result<(), CovaultError> {
    let filter = tracing_subscriber::EnvFilter::try_new(level)
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .map_err(|err| CovaultError::Message(err.to_string()))?;
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init();
    Ok(())
}

pub fn load_app_config() -> Result<AppConfig, CovaultError> {
    let config = covault_core::infrastructure::config::load_app_config()?;
    if let Err(errors) = config.validate() {
        for err in errors {
            warn!("config validation error: {}", err);
        }
    }
    Ok(config)
}
