use lens_config::LensConfig;

/// Warn about env vars that look like config but did not take effect.
pub fn warn_unconfigured(config: &LensConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &LensConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();
    let mut warnings = Vec::new();

    if !config.analyzer.is_configured()
        && keys
            .iter()
            .any(|k| k.starts_with("LENS_ANALYZER") && !k.starts_with("LENS_ANALYZER__"))
    {
        warnings.push(
            "Analyzer config appears default while LENS_ANALYZER* env vars exist. Use double underscores (example: LENS_ANALYZER__ENDPOINT)."
                .to_string(),
        );
    }

    if config.guard.restricted_classes.is_empty()
        && keys
            .iter()
            .any(|k| k.starts_with("LENS_GUARD") && !k.starts_with("LENS_GUARD__"))
    {
        warnings.push(
            "Guard config appears default while LENS_GUARD* env vars exist. Use double underscores (example: LENS_GUARD__RESTRICTED_CLASSES)."
                .to_string(),
        );
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(keys: &[&str]) -> Vec<(String, String)> {
        keys.iter()
            .map(|k| ((*k).to_string(), "x".to_string()))
            .collect()
    }

    #[test]
    fn warns_on_single_underscore_keys() {
        let warnings = collect_unconfigured_warnings(
            &LensConfig::default(),
            env(&["LENS_ANALYZER_ENDPOINT", "LENS_GUARD_RESTRICTED_CLASSES"]),
        );
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn quiet_when_keys_are_well_formed_or_configured() {
        assert!(
            collect_unconfigured_warnings(&LensConfig::default(), env(&["LENS_ANALYZER__MODEL"]))
                .is_empty()
        );

        let mut config = LensConfig::default();
        config.analyzer.endpoint = "http://localhost:9000".to_string();
        assert!(
            collect_unconfigured_warnings(&config, env(&["LENS_ANALYZER_ENDPOINT"])).is_empty()
        );
    }
}
