fn main() -> Result<(), Box<dyn std::error::Error>> {
    towerofsong::runtime::run()?;
    Ok(())
}
