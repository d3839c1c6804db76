#![no_main]

use ets2_map_geometry::{DefinitionParser, MemoryFileSystem, SiiTextParser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Includes verweisen ins Leere; der Parser darf nur Fehler liefern, nie paniken.
    let fs = MemoryFileSystem::new();
    let _ = SiiTextParser.parse("/def/world/fuzz.sii", data, &fs);
});
