//! Built-in platform extractors.
//!
//! Each platform module provides a [`PlatformExtractor`](donation_registry::PlatformExtractor)
//! implementation; [`builtin_registry`] binds them to their registry names.

pub mod youtube;

use donation_registry::ExtractorRegistry;

pub use youtube::YouTubeExtractor;

/// Registry with every built-in platform registered under its canonical name.
pub fn builtin_registry() -> ExtractorRegistry {
    let mut registry = ExtractorRegistry::new();
    register_builtin_platforms(&mut registry);
    registry
}

pub fn register_builtin_platforms(registry: &mut ExtractorRegistry) {
    registry.register(youtube::PLATFORM, |config| Box::new(YouTubeExtractor::new(config)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use donation_types::PlatformConfig;

    #[test]
    fn builtin_registry_creates_youtube() {
        let registry = builtin_registry();
        assert_eq!(registry.platforms().collect::<Vec<_>>(), vec!["YouTube"]);

        let extractor = registry
            .create(
                "YouTube",
                PlatformConfig {
                    platform: "YouTube".into(),
                    tables: Vec::new(),
                },
            )
            .expect("create youtube extractor");
        assert_eq!(extractor.platform(), "YouTube");
        assert_eq!(extractor.file_input().accepted_types, "application/zip");
    }
}
