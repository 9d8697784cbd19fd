use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use forgeconf::{ApiKey, ForgeConfig};
use serde::Serialize;

use logoforge::audio;
use logoforge::contract::{Category, ContractLayer};
use logoforge::router::{Invocation, LabArguments, RenderView, Router};
use logoforge::stream::{LiveStream, StreamCore, StreamSnapshot};
use logoforge::telemetry;

/// Generative branding agents from the command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file, loaded after the system and user files
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the live gallery stream and print what changes
    Stream {
        /// How long to run
        #[arg(long, default_value = "30")]
        seconds: u64,
    },

    /// Run one lab agent (social, domain, persona, pitch, newsletter, color)
    Agent {
        id: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "Tech")]
        category: Category,
    },

    /// Marketplace bundle metadata for a category
    Bundle {
        #[arg(long, default_value = "Tech")]
        category: Category,
    },

    /// Social ad campaign for a bundle
    Campaign {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "Tech")]
        category: Category,
    },

    /// Search-grounded trademark check
    Trademark {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "Tech")]
        category: Category,
    },

    /// Maps-grounded competitor research around a coordinate
    Competitors {
        #[arg(long, default_value = "Tech")]
        category: Category,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },

    /// Video prompt for a logo intro animation
    Animate {
        #[arg(long)]
        description: String,
    },

    /// Speak a brand script and write it as WAV
    Voice {
        #[arg(long, default_value = "")]
        script: String,
        #[arg(long, default_value = "voice.wav")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ForgeConfig::load_from(cli.config.as_deref()).context("Failed to load config")?;
    let guard = telemetry::init(&config.telemetry).context("Failed to initialize telemetry")?;

    let api_key = ApiKey::from_env().context("Backend credential is not configured")?;
    let contract =
        ContractLayer::gemini(&config.backend, api_key).context("Failed to build backend client")?;

    let result = run(cli.command, &config, contract).await;
    guard.shutdown();
    result
}

async fn run(command: Command, config: &ForgeConfig, contract: ContractLayer) -> Result<()> {
    match command {
        Command::Stream { seconds } => stream(config, contract, seconds).await,
        Command::Agent {
            id,
            subject,
            category,
        } => {
            let router = Router::new(contract);
            match router.invoke(&id, LabArguments::new(subject, category)).await {
                Invocation::Completed(view) => print_view(&view),
                Invocation::Rejected(rejection) => anyhow::bail!("Rejected: {:?}", rejection),
                Invocation::Failed(message) => anyhow::bail!(message),
            }
            Ok(())
        }
        Command::Bundle { category } => print_json(&contract.bundle_metadata(category).await?),
        Command::Campaign { title, category } => {
            print_json(&contract.ad_campaign(&title, category).await?)
        }
        Command::Trademark { title, category } => {
            print_json(&contract.trademark_safety(category, &title).await?)
        }
        Command::Competitors { category, lat, lng } => {
            print_json(&contract.local_competitors(category, lat, lng).await?)
        }
        Command::Animate { description } => {
            println!("{}", contract.animation_prompt(&description).await?);
            Ok(())
        }
        Command::Voice { script, out } => {
            let Some(payload) = contract.brand_voice(&script).await? else {
                println!("No audio returned, skipping playback");
                return Ok(());
            };
            let buffer = audio::decode_payload(
                payload.as_str(),
                config.backend.sample_rate,
                config.backend.channels as usize,
            )
            .context("Failed to decode speech payload")?;
            buffer
                .write_wav(&out)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!(
                "Wrote {:.2}s of audio to {}",
                buffer.duration_secs(),
                out.display()
            );
            Ok(())
        }
    }
}

async fn stream(config: &ForgeConfig, contract: ContractLayer, seconds: u64) -> Result<()> {
    let live = LiveStream::spawn(StreamCore::new(config.stream.clone()), contract);
    let mut updates = live.subscribe();
    let mut last = live.snapshot();
    println!(
        "Gallery seeded with {} items, counter {}",
        last.gallery.len(),
        last.state.synthetic_counter
    );

    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = updates.borrow_and_update().clone();
                print_delta(&last, &next);
                last = next;
            }
        }
    }

    live.shutdown().await;
    Ok(())
}

fn print_delta(previous: &StreamSnapshot, next: &StreamSnapshot) {
    if let Some(item) = next.gallery.first() {
        if previous.gallery.first().map(|p| &p.id) != Some(&item.id) {
            println!(
                "+ {} {} by {} ({}, complexity {})  counter {}",
                item.id,
                item.style,
                item.agent,
                item.category,
                item.complexity,
                next.state.synthetic_counter
            );
        }
    }
    if let Some(entry) = next.log.first() {
        if previous.log.first().map(|p| p.id) != Some(entry.id) {
            println!("  {}", entry.message);
        }
    }
}

fn print_view(view: &RenderView) {
    match view {
        RenderView::Table { columns, rows } => {
            println!("{}", columns.join(" | "));
            for row in rows {
                println!("{}", row.join(" | "));
            }
        }
        RenderView::Cards { cards } => {
            for card in cards {
                println!("[{}]", card.key);
                for (name, value) in &card.fields {
                    println!("  {}: {}", name, value);
                }
            }
        }
        RenderView::Text { text } | RenderView::Serialized { text } => println!("{}", text),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
