use gptalk_config::Config;

/// Strategy for initializing the configuration.
///
/// This strategy creates the default configuration file at `~/gptalk/config.json`
/// and refuses to overwrite an existing one.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        Config::create_config()
    }
}
