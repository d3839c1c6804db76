//! Besitzer aller Caches einer geladenen Welt.

use std::sync::Arc;

use anyhow::Result;

use crate::cache::{
    DefinitionFileReader, PrefabDescriptorReader, PrefabModelResolver, TemplateCache, TokenResolver,
};
use crate::core::WorldMap;
use crate::fs::FileSystem;
use crate::geometry::LaneGeometryCalculator;
use crate::ppd::PrefabDecoder;
use crate::shared::GeometryOptions;
use crate::sii::DefinitionParser;

/// Welt plus alle davon abgeleiteten Caches.
///
/// Ersetzt prozessweite Singletons: jede geladene Welt hat genau einen
/// Kontext, und [`unload`](Self::unload) leert alle Caches gemeinsam.
pub struct WorldContext {
    options: GeometryOptions,
    world: WorldMap,
    definitions: Arc<DefinitionFileReader>,
    prefabs: Arc<PrefabDescriptorReader>,
    tokens: Arc<TokenResolver>,
    models: Arc<PrefabModelResolver>,
    templates: Arc<TemplateCache>,
    lanes: Arc<LaneGeometryCalculator>,
}

impl WorldContext {
    /// Kontext mit Standard-Parser (SII-Text) und JSON-Prefab-Decoder.
    pub fn new(fs: Arc<dyn FileSystem>, world: WorldMap, options: GeometryOptions) -> Result<Self> {
        let definitions = Arc::new(DefinitionFileReader::new(Arc::clone(&fs)));
        let prefabs = Arc::new(PrefabDescriptorReader::new(fs));
        Self::assemble(definitions, prefabs, world, options)
    }

    /// Kontext mit eigenem Definitions-Parser und Prefab-Decoder.
    pub fn with_decoders(
        fs: Arc<dyn FileSystem>,
        parser: Box<dyn DefinitionParser>,
        decoder: Box<dyn PrefabDecoder>,
        world: WorldMap,
        options: GeometryOptions,
    ) -> Result<Self> {
        let definitions = Arc::new(DefinitionFileReader::with_parser(Arc::clone(&fs), parser));
        let prefabs = Arc::new(PrefabDescriptorReader::with_decoder(fs, decoder));
        Self::assemble(definitions, prefabs, world, options)
    }

    fn assemble(
        definitions: Arc<DefinitionFileReader>,
        prefabs: Arc<PrefabDescriptorReader>,
        world: WorldMap,
        options: GeometryOptions,
    ) -> Result<Self> {
        let tokens = Arc::new(TokenResolver::new(Arc::clone(&definitions), &options)?);
        let models = Arc::new(PrefabModelResolver::new(
            Arc::clone(&tokens),
            Arc::clone(&prefabs),
        ));
        let templates = Arc::new(TemplateCache::new(Arc::clone(&definitions), &options)?);
        let lanes = Arc::new(LaneGeometryCalculator::new(
            Arc::clone(&templates),
            options.lane_width,
        ));

        Ok(Self {
            options,
            world,
            definitions,
            prefabs,
            tokens,
            models,
            templates,
            lanes,
        })
    }

    /// Optionen dieser Welt.
    pub fn options(&self) -> &GeometryOptions {
        &self.options
    }

    /// Die geladene Welt.
    pub fn world(&self) -> &WorldMap {
        &self.world
    }

    /// Reader für Definitionsdateien.
    pub fn definitions(&self) -> &Arc<DefinitionFileReader> {
        &self.definitions
    }

    /// Reader für Prefab-Deskriptoren.
    pub fn prefabs(&self) -> &Arc<PrefabDescriptorReader> {
        &self.prefabs
    }

    /// Token-Resolver der Prefab-Registraturen.
    pub fn tokens(&self) -> &Arc<TokenResolver> {
        &self.tokens
    }

    /// Prefab-Modelle inklusive Negativ-Cache.
    pub fn models(&self) -> &Arc<PrefabModelResolver> {
        &self.models
    }

    /// Road-Look-Templates.
    pub fn templates(&self) -> &Arc<TemplateCache> {
        &self.templates
    }

    /// Spur-Offsets pro Road-Type.
    pub fn lanes(&self) -> &Arc<LaneGeometryCalculator> {
        &self.lanes
    }

    /// Ersetzt die Welt und leert alle Caches gemeinsam.
    pub fn reload(&mut self, world: WorldMap) {
        self.clear_caches();
        self.world = world;
    }

    /// Entlädt die Welt: leere Tabellen, leere Caches.
    pub fn unload(&mut self) {
        self.reload(WorldMap::default());
        log::info!("Welt entladen");
    }

    fn clear_caches(&self) {
        self.lanes.clear();
        self.templates.clear();
        self.models.clear();
        self.tokens.clear();
        self.prefabs.clear();
        self.definitions.clear();
    }
}
