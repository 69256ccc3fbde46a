use anyhow::Context;
use tumae_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Tumae settings")?;
    tumae_app::serve(&settings).await
}
