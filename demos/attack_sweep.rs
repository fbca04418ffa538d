//! Attack Sweep Example
//!
//! Generates a rotation challenge and a nonuniform crop challenge from two
//! base images. The perturbation here copies the source bytes; a real one
//! would call an image library.
//!
//! Run with: cargo run --example attack_sweep

use std::fs;

use twizzle::store::Database;
use twizzle::sweep::{
    create_attack_challenge, from_fn, Attack, CropMargins, ParameterSet, SweepEngine,
};

fn main() -> anyhow::Result<()> {
    twizzle::logging::init_from_env();
    println!("=== Twizzle Attack Sweep ===\n");

    let dir = tempfile::tempdir()?;
    let base_dir = dir.path().join("originals");
    let target_dir = dir.path().join("attacked");
    fs::create_dir_all(&base_dir)?;
    fs::create_dir_all(&target_dir)?;

    let originals: Vec<String> = ["lena", "peppers"]
        .iter()
        .map(|stem| {
            let path = base_dir.join(format!("{stem}.png"));
            fs::write(&path, stem.as_bytes())?;
            Ok(path.to_string_lossy().into_owned())
        })
        .collect::<std::io::Result<_>>()?;

    let copy = from_fn(|src, _value, dst| {
        fs::copy(src, dst)?;
        Ok(())
    });

    let db = Database::in_memory();

    // -------------------------------------------------------------------------
    // 1. Range sweep
    // -------------------------------------------------------------------------
    println!("1. Rotation (cropped) 0..360 step 45");
    let range = Attack::RotationCropped.range(0.0, 360.0, 45.0)?;
    let rotation = SweepEngine::range(Attack::RotationCropped, range, copy)?;
    let challenge =
        create_attack_challenge(&db.challenges(), "rotation_cropped", &rotation, &originals, &target_dir)?;
    println!("   {} pairs, first: {}", challenge.len(), challenge.comparatives()[0]);

    // -------------------------------------------------------------------------
    // 2. Explicit set sweep
    // -------------------------------------------------------------------------
    println!("\n2. Crop (nonuniform), two margin sets");
    let mut builder = ParameterSet::builder();
    builder.push(CropMargins::new(0.1, 0.0, 0.1, 0.0)?)?;
    builder.push(CropMargins::new(0.0, 0.2, 0.0, 0.3)?)?;
    let crop = SweepEngine::crop_set(builder.build()?, copy);
    let challenge =
        create_attack_challenge(&db.challenges(), "crop_nonuniform", &crop, &originals, &target_dir)?;
    println!("   {} pairs, metadata: {}", challenge.len(), serde_json::to_string(challenge.metadata())?);

    // -------------------------------------------------------------------------
    // 3. Every catalog attack and its domain
    // -------------------------------------------------------------------------
    println!("\n3. Attack catalog:");
    for attack in Attack::ALL {
        match attack.domain() {
            Some(domain) => println!("   {:<20} {domain}", attack.name()),
            None => println!("   {:<20} ({:?})", attack.name(), attack.kind()),
        }
    }

    Ok(())
}
