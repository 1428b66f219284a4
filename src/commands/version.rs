use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("grid-node version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
