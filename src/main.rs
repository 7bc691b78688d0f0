use clap::{Parser, Subcommand};
use log::{error, info};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

use pantry_chef::capture::{split_transcript, IngredientCapture};
use pantry_chef::catalog::DietaryRestriction;
use pantry_chef::orchestrator::{AppState, ImageStatus, Orchestrator, SubmitOutcome};
use pantry_chef::presentation::{self, cards};
use pantry_chef::session::{self, Reply, Session};
use pantry_chef::{orchestrator_from_config, AppConfig};

#[derive(Parser)]
#[command(name = "pantry-chef")]
#[command(version, about = "Recipes, dish photos and variations from the ingredients you have", long_about = None)]
struct Cli {
    /// Gemini API key (overrides configuration)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one batch of recipes and print them
    Generate {
        /// Available ingredient; repeat the flag or separate with commas
        #[arg(short, long = "ingredient", required = true)]
        ingredients: Vec<String>,
        /// Dietary restriction id or label (vegetarian, vegan, gluten-free, dairy-free, low-carb)
        #[arg(short, long = "diet")]
        diets: Vec<String>,
        /// Number of recipes to generate (1-5)
        #[arg(short, long)]
        count: Option<u8>,
        /// Also suggest variations for every recipe
        #[arg(long)]
        variations: bool,
        /// Write the generated dish photos into this directory
        #[arg(long, value_name = "DIR")]
        save_images: Option<PathBuf>,
    },
    /// Start an interactive session
    Interactive,
    /// Browse the ingredient catalog
    Catalog {
        /// Only show ingredients containing this text
        search: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command {
        Commands::Catalog { search } => {
            let capture = IngredientCapture::default();
            println!(
                "{}",
                session::render_catalog(search.as_deref().unwrap_or_default(), &capture)
            );
        }
        Commands::Generate {
            ingredients,
            diets,
            count,
            variations,
            save_images,
        } => {
            let mut capture =
                IngredientCapture::new(count.unwrap_or(config.default_recipe_count));
            for entry in &ingredients {
                for token in split_transcript(entry) {
                    capture.add(&token);
                }
            }
            for diet in &diets {
                let restriction = DietaryRestriction::parse(diet)
                    .ok_or_else(|| format!("Unknown dietary restriction: {}", diet))?;
                if !capture.restrictions().contains(&restriction) {
                    capture.toggle_restriction(restriction);
                }
            }

            let mut orchestrator = connect(&config, cli.api_key.as_deref())?;
            generate(&mut orchestrator, &capture, variations).await?;

            if let Some(dir) = save_images {
                write_images(&dir, orchestrator.state()).await?;
            }
        }
        Commands::Interactive => {
            let orchestrator = connect(&config, cli.api_key.as_deref())?;
            let capture = IngredientCapture::new(config.default_recipe_count);
            interactive(Session::new(capture, orchestrator)).await?;
        }
    }

    Ok(())
}

fn connect(
    config: &AppConfig,
    api_key: Option<&str>,
) -> Result<Orchestrator, Box<dyn std::error::Error>> {
    let mut orchestrator = orchestrator_from_config(config)?;
    if let Some(key) = api_key {
        orchestrator.select_credential(key);
    }
    Ok(orchestrator)
}

async fn generate(
    orchestrator: &mut Orchestrator,
    capture: &IngredientCapture,
    variations: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = capture
        .submission()
        .ok_or("At least one ingredient is required")?;

    let mut progress = orchestrator.progress_updates();
    tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let step = *progress.borrow();
            if let Some(step) = step {
                eprintln!("{}", presentation::render_progress(step));
            }
        }
    });

    match orchestrator.submit(request).await {
        SubmitOutcome::Shown(count) => info!("Received {} recipes", count),
        SubmitOutcome::CredentialRequired => {
            eprintln!("{}", presentation::render_credential_notice());
            return Err("No usable API key".into());
        }
        SubmitOutcome::Failed(kind) => {
            let message = orchestrator.state().error().unwrap_or_default().to_string();
            eprintln!("{}", presentation::render_error(&message));
            return Err(format!("Generation failed ({:?})", kind).into());
        }
        SubmitOutcome::Empty => return Err("At least one ingredient is required".into()),
    }

    if variations {
        let titles: Vec<String> = orchestrator
            .state()
            .recipes()
            .unwrap_or_default()
            .iter()
            .map(|r| r.title.clone())
            .collect();
        for title in titles {
            orchestrator.request_variations(&title);
        }
    }

    orchestrator.settle().await;
    println!("{}", presentation::render_state(orchestrator.state()));
    Ok(())
}

async fn write_images(dir: &Path, state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    tokio::fs::create_dir_all(dir).await?;
    for card in cards(state) {
        let ImageStatus::Ready(uri) = card.image else {
            continue;
        };
        let Some((mime, bytes)) = presentation::decode_data_uri(uri) else {
            error!("Image for {} is not a base64 data URI", card.recipe.title);
            continue;
        };
        let path = dir.join(format!(
            "{}-{}.{}",
            card.index,
            presentation::slug(&card.recipe.title),
            presentation::image_extension(&mime)
        ));
        tokio::fs::write(&path, bytes).await?;
        println!("{}", path.display());
    }
    Ok(())
}

async fn interactive(mut session: Session) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", session.start());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match session.handle_line(&line).await {
                    Reply::Continue(output) if output.is_empty() => {}
                    Reply::Continue(output) => println!("{}", output),
                    Reply::Quit => break,
                }
            }
            update = session.next_update() => {
                if let Some(text) = update {
                    println!("\n{}", text);
                }
            }
        }
    }

    Ok(())
}
