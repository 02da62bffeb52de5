use anyhow::{anyhow, Result};
use clap::Parser;

use kbqa_answer::GeminiClient;
use kbqa_cli::{init_tracing, load_settings};

#[derive(Parser, Debug)]
#[command(name = "kbqa-models", about = "List generator models usable with the configured API key")]
struct ModelsCli {
    /// Also print every supported generation method
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = ModelsCli::parse();
    let settings = load_settings()?;
    let client = GeminiClient::from_settings(&settings.generator).map_err(|e| anyhow!(e.user_message()))?;
    let models = client.list_models()?;
    if models.is_empty() {
        println!("No models supporting generateContent were found.");
        return Ok(());
    }
    for m in models {
        println!("{}  {}", m.name, m.display_name);
        if cli.verbose {
            println!("    methods: {}", m.supported_generation_methods.join(", "));
        }
    }
    Ok(())
}
