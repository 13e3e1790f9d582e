use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tokio::sync::mpsc;

use careermate_chat::{
    acquire_location, ChatController, IpLocation, LocationProvider, NoLocation, SendOutcome,
    StaticLocation,
};
use careermate_core::prompts::SUGGESTIONS;
use careermate_core::Config;
use careermate_llm::GeminiGateway;

mod logging;
mod render;

use logging::init_logging;
use render::{render_message, render_suggestions, EventRenderer};

#[derive(Parser, Debug)]
#[command(name = "careermate")]
#[command(about = "CareerMate: interview prep, resume help and places nearby")]
#[command(version)]
struct Cli {
    /// Gemini API key (overrides GEMINI_API_KEY / API_KEY and the config file)
    #[arg(long)]
    api_key: Option<String>,

    /// Model name
    #[arg(long)]
    model: Option<String>,

    /// Gemini API base URL
    #[arg(long)]
    api_base: Option<String>,

    /// Fixed location as "latitude,longitude"
    #[arg(long, conflicts_with = "no_location")]
    location: Option<String>,

    /// IP geolocation endpoint
    #[arg(long)]
    locate_url: Option<String>,

    /// Run without location; map queries will ask for it
    #[arg(long)]
    no_location: bool,

    /// Enable debug mode
    #[arg(long, short, env = "DEBUG", default_value = "false")]
    debug: bool,
}

impl Cli {
    fn apply_to(&self, config: &mut Config) {
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        }
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(base) = &self.api_base {
            config.api_base = Some(base.clone());
        }
        if let Some(location) = &self.location {
            config.location = Some(location.clone());
            config.no_location = false;
        }
        if let Some(url) = &self.locate_url {
            config.locate_url = Some(url.clone());
        }
        if self.no_location {
            config.no_location = true;
        }
    }
}

fn location_provider(config: &Config) -> anyhow::Result<Box<dyn LocationProvider>> {
    if config.no_location {
        return Ok(Box::new(NoLocation));
    }
    if let Some(coordinates) = config.fixed_location()? {
        return Ok(Box::new(StaticLocation(coordinates)));
    }
    Ok(Box::new(IpLocation::new(config.locate_url())))
}

/// Map `1`-`3` to the matching suggestion while suggestions are on screen.
fn resolve_input(input: &str, suggestions_visible: bool) -> &str {
    if suggestions_visible {
        if let Ok(n) = input.parse::<usize>() {
            if let Some(suggestion) = n.checked_sub(1).and_then(|i| SUGGESTIONS.get(i)) {
                return suggestion.text;
            }
        }
    }
    input
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let mut config = Config::load().context("Failed to load configuration")?;
    cli.apply_to(&mut config);

    let gateway = GeminiGateway::from_config(&config)?;
    log::info!("Using model {} at {}", gateway.model(), config.api_base());

    let provider = location_provider(&config)?;
    let location = acquire_location(provider.as_ref()).await;

    let mut controller = ChatController::new(Arc::new(gateway), location);
    run_interactive_chat(&mut controller).await
}

async fn run_interactive_chat(controller: &mut ChatController) -> anyhow::Result<()> {
    println!("{}", "💼 CareerMate".cyan().bold());
    println!("{}", "Your AI career advisor".dimmed());
    println!("{}", "Type 'exit' or 'quit' to leave".dimmed());
    if let Some(error) = &controller.location().error {
        println!("{}", error.yellow());
    }
    println!();

    for message in controller.conversation().messages() {
        println!("{}", render_message(message));
        println!();
    }

    loop {
        let suggestions_visible = controller.conversation().suggestions_visible();
        if suggestions_visible {
            println!("{}", render_suggestions(SUGGESTIONS));
            println!();
        }

        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            println!();
            break;
        }
        let input = input.trim();

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("{}", "👋 Goodbye!".cyan());
            break;
        }
        if input.is_empty() {
            continue;
        }

        let text = resolve_input(input, suggestions_visible);
        if text != input {
            println!("{} {}", "You:".cyan().bold(), text);
        }

        let (event_tx, mut event_rx) = mpsc::channel(64);
        let dispatch = async {
            let event_tx = event_tx;
            controller.send_message(text, &event_tx).await
        };
        let render = async {
            let mut renderer = EventRenderer::new();
            let mut stdout = io::stdout();
            while let Some(event) = event_rx.recv().await {
                renderer.handle(&event, &mut stdout)?;
            }
            Ok::<_, io::Error>(())
        };

        let (outcome, rendered) = tokio::join!(dispatch, render);
        rendered?;

        match outcome {
            SendOutcome::Failed(route) => {
                log::warn!("{:?} turn failed, apology recorded", route);
            }
            other => log::debug!("Turn outcome: {:?}", other),
        }
    }

    Ok(())
}
