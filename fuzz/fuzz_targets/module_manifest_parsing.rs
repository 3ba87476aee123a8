#![no_main]
use std::path::Path;

use hwstage::catalog::{DescriptorValidator, ModuleManifest};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary module.toml text must parse or fail with an error, never panic
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(manifest) = ModuleManifest::parse(text, Path::new("module.toml")) {
        let descriptor = manifest.to_descriptor(Path::new("fuzz/module"));
        let _ = DescriptorValidator::new().validate(&descriptor);

        // Re-serialized manifests parse back to the same value
        if let Ok(serialized) = toml::to_string(&manifest) {
            let reparsed = ModuleManifest::parse(&serialized, Path::new("module.toml"));
            assert_eq!(reparsed.ok().as_ref(), Some(&manifest));
        }
    }
});
