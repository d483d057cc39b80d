//! Object manifest inspector
//!
//! Loads a YAML object manifest and prints, for every object, its payload kind,
//! size, byte footprint and the wgpu binding it would be given.
//!
//! # Usage
//! ```bash
//! cargo run --example describe -- manifests/sample.yaml --verbose
//! ```

use clap::Parser;
use gpu_object::{ObjectType, byte_size_of, element_count, manifest::ObjectManifest, wgpu_desc};
use std::path::PathBuf;

/// Command-line arguments for the manifest inspector
#[derive(Parser)]
#[command(version, about = "Describe the GPU objects declared in a manifest")]
struct Args {
    /// Manifest file path
    manifest: PathBuf,

    /// Log manifest compilation at debug level
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose { tracing::Level::TRACE } else { tracing::Level::INFO };
    let subscriber = tracing_subscriber::fmt().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let manifest = ObjectManifest::from_file(&args.manifest)?;
    let objects = manifest.compile()?;
    tracing::info!("Loaded {} objects from {}", objects.len(), args.manifest.display());

    let mut total_bytes = 0u64;
    for (slot, mut named) in (0u32..).zip(objects) {
        let object = &mut named.object;
        object.assign_binding(slot)?;

        let payload = match object.reference() {
            Some(id) => format!("ref #{id}"),
            None => format!("{} inline bytes", object.get_inline_data().map_or(0, |data| data.len())),
        };
        let binding = match object.object_type {
            ObjectType::Unknown => "unresolved".to_string(),
            _ => match wgpu_desc::binding_type(object) {
                Ok(binding_type) => format!("{binding_type:?}"),
                Err(e) => format!("error: {e}"),
            },
        };

        let bytes = byte_size_of(object);
        total_bytes = total_bytes.saturating_add(bytes);

        println!(
            "@{} {:<16} {:?} {:?} {:?} size={:?} elements={} bytes={} payload={}",
            object.binding_slot()?,
            named.name,
            object.access,
            object.object_type,
            object.data_type,
            object.size,
            element_count(&object.size),
            bytes,
            payload
        );
        println!("    binding: {binding}");
    }

    println!("total: {total_bytes} bytes");
    Ok(())
}
