use anyhow::Result;

fn main() -> Result<()> {
    qrforge::cli::run()
}
