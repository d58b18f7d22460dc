use tracing::info;

use super::init_common_components;

/// Input parameters for the Thread command strategy.
#[derive(Debug, Clone)]
pub struct ThreadInput {
    /// Assistant to run on the new thread
    pub assistant_id: String,
    pub message: String,
    /// Delete the thread after reading the reply
    pub delete: bool,
}

/// Strategy for running a hosted assistant on a new thread.
#[derive(Debug, Clone, Copy)]
pub struct ThreadStrategy;

impl super::CommandStrategy for ThreadStrategy {
    type Input = ThreadInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components()?;

        let reply = common
            .provider
            .create_thread(&input.message, &input.assistant_id)
            .await?;

        if reply.message.is_empty() {
            println!("(no reply from assistant)");
        } else {
            println!("{}", reply.message);
        }
        println!("thread: {}", reply.thread_id);

        if input.delete {
            let deleted = common.provider.delete_thread(&reply.thread_id).await?;
            info!("Thread {} deleted: {deleted}", reply.thread_id);
        }

        Ok(())
    }
}
