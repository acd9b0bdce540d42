use std::{env, error::Error, fs, path::PathBuf};

const SETTINGS_FILENAME: &str = "settings.json";

// Ship the default settings next to the compiled binary.
fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed={SETTINGS_FILENAME}");

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let target_dir = out_dir
        .ancestors()
        .nth(3)
        .ok_or("OUT_DIR is not nested inside a target profile directory")?;

    fs::copy(SETTINGS_FILENAME, target_dir.join(SETTINGS_FILENAME))?;
    Ok(())
}
