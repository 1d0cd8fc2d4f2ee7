//! Used for generating build information for the indexer.

use std::{env, error::Error};
use vergen::{BuildBuilder, CargoBuilder, Emitter};

fn main() -> Result<(), Box<dyn Error>> {
    let mut emitter = Emitter::default();

    let build_builder = BuildBuilder::default().build_timestamp(true).build()?;

    // Add build timestamp information.
    emitter.add_instructions(&build_builder)?;

    let cargo_builder = CargoBuilder::default().features(true).target_triple(true).build()?;

    // Add cargo features and target information.
    emitter.add_instructions(&cargo_builder)?;

    emitter.emit_and_set()?;

    // The commit is provided by the release pipeline, local builds report "unknown".
    println!("cargo:rerun-if-env-changed=GIT_SHA");
    let sha = env::var("GIT_SHA").unwrap_or_else(|_| "unknown".to_string());
    let short_sha: String = sha.chars().take(8).collect();
    println!("cargo:rustc-env=KONA_INDEXER_GIT_SHA_SHORT={short_sha}");

    let out_dir = env::var("OUT_DIR")?;
    let profile =
        out_dir.rsplit(std::path::MAIN_SEPARATOR).nth(3).ok_or("unexpected OUT_DIR layout")?;
    println!("cargo:rustc-env=KONA_INDEXER_BUILD_PROFILE={profile}");

    Ok(())
}
