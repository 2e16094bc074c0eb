use std::path::PathBuf;
use std::sync::Arc;

use artgen::{
    logger::{self, LoggerConfig},
    Config, GalleryStore, GenerationRequest, ImageGenerator, PollinationsClient, RemoteGateway,
    SpeechRequest, Studio, Voice,
};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "artgen", version, about = "Generate images and speech from text prompts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate an image and add it to the gallery
    Generate(GenerateArgs),
    /// Inspect or edit the local gallery
    #[command(subcommand)]
    Gallery(GalleryCommand),
    /// Turn text into speech
    Speak(SpeakArgs),
    /// List the image models the provider offers
    Models,
    /// Run the HTTP gateway
    #[cfg(feature = "server")]
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    prompt: String,
    #[arg(long, default_value = "flux")]
    model: String,
    #[arg(long, default_value_t = 1024)]
    width: u32,
    #[arg(long, default_value_t = 1024)]
    height: u32,
    #[arg(long)]
    seed: Option<i64>,
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    nologo: bool,
    #[arg(long)]
    enhance: bool,
    #[arg(long)]
    private: bool,
    #[arg(long)]
    safe: bool,
    /// Only honoured by gptimage
    #[arg(long)]
    transparent: bool,
    /// Source image URL for image-to-image generation
    #[arg(long)]
    image: Option<String>,
    #[arg(long)]
    referrer: Option<String>,
    #[arg(long)]
    temperature: Option<f64>,
    /// Use a running `artgen serve` instead of calling the provider directly
    #[arg(long)]
    server: Option<String>,
}

#[derive(Debug, Subcommand)]
enum GalleryCommand {
    List,
    Remove { id: String },
    Clear,
    Download {
        id: String,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Debug, Args)]
struct SpeakArgs {
    prompt: String,
    #[arg(long, default_value = "nova")]
    voice: Voice,
    #[arg(long, default_value = ".")]
    dir: PathBuf,
}

#[cfg(feature = "server")]
#[derive(Debug, Args)]
struct ServeArgs {
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    host: Option<String>,
}

impl GenerateArgs {
    fn to_request(&self) -> GenerationRequest {
        let mut request = GenerationRequest::new(&self.prompt)
            .with_model(&self.model)
            .with_size(self.width, self.height)
            .with_nologo(self.nologo)
            .with_enhance(self.enhance)
            .with_private(self.private)
            .with_safe(self.safe)
            .with_transparent(self.transparent);
        request.seed = self.seed.map(Into::into);
        request.image = self.image.clone();
        request.referrer = self.referrer.clone();
        request.temperature = self.temperature;
        request
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    logger::init_with_config(LoggerConfig::from_env())?;
    if !dotenv_loaded {
        log::debug!("No .env file found, using system environment variables");
    }

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        #[cfg(feature = "server")]
        Command::Serve(args) => {
            let mut config = config;
            if let Some(port) = args.port {
                config.server = config.server.with_port(port);
            }
            if let Some(host) = args.host {
                config.server = config.server.with_host(host);
            }
            artgen::server::run(config).await?;
        }
        Command::Models => {
            let client = PollinationsClient::new(config.pollinations.clone());
            let list = client.models().list_models().await;
            for model in &list.models {
                println!("{}", model);
            }
            if list.fallback {
                log::warn!("⚠️  Showing the built-in model list");
            }
        }
        command => run_studio(command, config).await?,
    }

    Ok(())
}

async fn run_studio(command: Command, config: Config) -> artgen::Result<()> {
    let client = PollinationsClient::new(config.pollinations.clone());
    let gallery = GalleryStore::from_config(&config.store)?;

    let remote = match &command {
        Command::Generate(args) => args.server.clone(),
        _ => None,
    };
    let generator: Arc<dyn ImageGenerator> = match remote {
        Some(url) => Arc::new(RemoteGateway::new(url)),
        None => Arc::new(client.image().clone()),
    };
    let mut studio = Studio::new(generator, client.transport(), &config.pollinations, gallery);

    match command {
        Command::Generate(args) => {
            let record = studio.generate(args.to_request()).await?;
            println!("{}\t{}", record.id, record.url);
        }
        Command::Gallery(GalleryCommand::List) => {
            let stats = studio.gallery().stats();
            log::info!(
                "🖼️  {} images in the gallery (newest: {}, oldest: {})",
                stats.total_records,
                stats.newest_id.as_deref().unwrap_or("-"),
                stats.oldest_id.as_deref().unwrap_or("-")
            );
            for record in studio.gallery().records() {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.id,
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    record.prompt,
                    record.url
                );
            }
        }
        Command::Gallery(GalleryCommand::Remove { id }) => {
            if studio.gallery().get(&id).is_none() {
                log::warn!("⚠️  No gallery image with id {}", id);
            }
            studio.gallery_mut().remove(&id)?;
        }
        Command::Gallery(GalleryCommand::Clear) => {
            let removed = studio.gallery().len();
            studio.gallery_mut().clear()?;
            log::info!("🧹 Removed {} images from the gallery", removed);
        }
        Command::Gallery(GalleryCommand::Download { id, dir }) => {
            let path = studio.download(&id, &dir).await?;
            println!("{}", path.display());
        }
        Command::Speak(args) => {
            let request = SpeechRequest::new(args.prompt).with_voice(args.voice);
            let clip = studio.speak(request.clone()).await?;
            let path = studio.save_clip(&request, &clip, &args.dir).await?;
            println!("{}", path.display());
        }
        Command::Models => {}
        #[cfg(feature = "server")]
        Command::Serve(_) => {}
    }

    Ok(())
}
