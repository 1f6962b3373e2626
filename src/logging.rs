use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs the process-wide subscriber.
///
/// Called once per binary before any handler work; Lambda forwards the
/// output to CloudWatch, which supplies its own timestamps and rejects ANSI
/// escapes.
pub fn init_logging() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
