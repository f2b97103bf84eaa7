use std::{fmt, sync::Arc};

use donation_types::PlatformConfig;
use indexmap::IndexMap;
use tracing::debug;

use crate::{error::RegistryError, extractor::PlatformExtractor};

/// Builds an extractor for one platform from that platform's configuration.
pub type ExtractorFactory = Arc<dyn Fn(PlatformConfig) -> Box<dyn PlatformExtractor> + Send + Sync>;

/// Maps platform names to extractor factories.
///
/// Registrations happen once at startup; during a session the registry is
/// only read. Registering a name twice keeps the latest factory.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    factories: IndexMap<String, ExtractorFactory>,
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("platforms", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `platform` to `factory`, replacing any earlier binding.
    pub fn register<F>(&mut self, platform: impl Into<String>, factory: F)
    where
        F: Fn(PlatformConfig) -> Box<dyn PlatformExtractor> + Send + Sync + 'static,
    {
        let platform = platform.into();
        let replaced = self.factories.insert(platform.clone(), Arc::new(factory)).is_some();
        debug!(platform = %platform, replaced, "registered platform extractor");
    }

    /// Creates an extractor for `platform`, handing it `config` unchecked.
    pub fn create(&self, platform: &str, config: PlatformConfig) -> Result<Box<dyn PlatformExtractor>, RegistryError> {
        let factory = self.factories.get(platform).ok_or_else(|| RegistryError::UnknownPlatform {
            platform: platform.to_string(),
        })?;
        Ok(factory(config))
    }

    pub fn contains(&self, platform: &str) -> bool {
        self.factories.contains_key(platform)
    }

    /// Registered platform names in registration order.
    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
