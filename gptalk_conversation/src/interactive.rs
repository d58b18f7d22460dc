use std::io::{self, Write};

use futures_util::StreamExt;
use gptalk_core::LLMProvider;
use tracing::{debug, info};

use crate::ConversationManager;

impl<P> ConversationManager<P>
where
    P: LLMProvider + Send + Sync,
{
    /// Run an interactive conversation loop on stdin/stdout.
    ///
    /// Replies are printed as they stream in. `/reset` clears the history and
    /// `/history` prints its size.
    pub async fn run_interactive(&self) -> io::Result<()> {
        println!(
            "=== Conversation: {} ({}) ===",
            self.config().conversation_id,
            self.config().chat_model
        );
        println!("Type 'exit', 'quit', or Ctrl+C to end the conversation.");
        println!("Type '/reset' to forget the history, '/history' to inspect it.\n");

        let mut stdout = io::stdout();
        loop {
            print!("> ");
            stdout.flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                break;
            }
            let input = input.trim();

            match input {
                "" => continue,
                "exit" | "quit" | "q" => break,
                "/reset" => {
                    self.clear_history();
                    println!("History cleared.\n");
                    continue;
                }
                "/history" => {
                    let stats = self.history_stats();
                    println!(
                        "{} turns ({} user, {} assistant), {} characters\n",
                        stats.total_turns,
                        stats.user_turns,
                        stats.assistant_turns,
                        stats.total_characters
                    );
                    continue;
                }
                _ => {}
            }

            let mut fragments = match self.send_message_stream(input).await {
                Ok(fragments) => fragments,
                Err(e) => {
                    eprintln!("Error: {e}");
                    continue;
                }
            };

            println!();
            while let Some(fragment) = fragments.next().await {
                match fragment {
                    Ok(text) => {
                        print!("{text}");
                        stdout.flush()?;
                    }
                    Err(e) => {
                        eprintln!("\nError: {e}");
                        break;
                    }
                }
            }
            println!("\n");
            debug!("History holds {} turns", self.history_stats().total_turns);
        }

        info!(
            "Conversation ended. Total exchanges: {}",
            self.history_stats().assistant_turns
        );
        Ok(())
    }
}
