use anyhow::{anyhow, Result};
use clap::{crate_version, App, Arg};
use draftpress::build::Publisher;
use draftpress::config::Config;
use draftpress::git::Git;
use draftpress::openai::OpenAi;
use draftpress::prompt::{ask_topic, confirm_publish};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let matches = App::new("draftpress")
        .version(crate_version!())
        .about("Generates blog drafts with a language model and publishes them")
        .arg(
            Arg::with_name("publish")
                .long("publish")
                .value_name("PATH")
                .takes_value(true)
                .help(
                    "Publish an existing .md or .html draft instead of \
                     generating one",
                ),
        )
        .arg(
            Arg::with_name("project")
                .long("project")
                .value_name("DIR")
                .takes_value(true)
                .help(
                    "Directory from which to search for draftpress.yaml \
                     (default: .)",
                ),
        )
        .get_matches();

    let project_dir = match matches.value_of("project") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let config = Config::load(&project_dir)?;
    let git = Git::new(&config.root_directory);
    let publisher = Publisher {
        config: &config,
        vcs: &git,
    };

    match matches.value_of("publish") {
        Some(path) => publish_existing(&publisher, Path::new(path)),
        None => interactive(&publisher),
    }
}

fn publish_existing(publisher: &Publisher, path: &Path) -> Result<()> {
    let publication = publisher.publish_existing(path)?;
    match &publication.push_error {
        None => println!("Published and pushed to GitHub."),
        Some(err) => {
            println!("{}", err);
            println!(
                "Published locally. Git push failed — \
                 run 'git push' manually."
            );
        }
    }
    println!("URL: {}", publication.url);
    Ok(())
}

fn interactive(publisher: &Publisher) -> Result<()> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    let topic = ask_topic(&mut input, &mut output)?;
    if topic.is_empty() {
        return Err(anyhow!("Topic is required."));
    }

    let config = publisher.config;
    let service = OpenAi::from_env(config.model.clone(), config.temperature)?;
    println!("Generating article...");
    let draft = publisher.create_draft(&service, &topic)?;
    println!("Draft saved: {}", draft.path.display());

    if !confirm_publish(&mut input, &mut output)? {
        println!(
            "Draft left in {}. Edit and run again to publish later.",
            config.drafts_directory.display()
        );
        return Ok(());
    }

    let title = publisher.draft_title(&draft.slug)?;
    let publication = publisher.publish_draft(&draft.slug, &title)?;
    match &publication.push_error {
        None => println!("Published and pushed to GitHub."),
        Some(err) => {
            println!("{}", err);
            println!(
                "Publish completed locally; git push failed. \
                 Run git push manually."
            );
        }
    }
    println!("URL: {}", publication.url);
    Ok(())
}
