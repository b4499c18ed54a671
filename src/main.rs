use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use ilview::{
    AssemblyLoader, DecompilationOptions, Entity, EntitySelector, Language, Languages,
    PlainTextOutput, TextOutput, TokenTextOutput,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Plain text listing
    Text,
    /// One JSON array of token spans per line
    Tokens,
}

/// Render .NET assembly metadata as IL or another output language
#[derive(Debug, Parser)]
#[command(name = "ilview", version)]
struct Args {
    /// Assembly metadata in JSON form
    #[arg(required_unless_present = "list_languages")]
    input: Option<PathBuf>,

    /// Output language, e.g. "IL", "il-structured" or "comments"
    #[arg(short, long, default_value = "IL")]
    language: String,

    /// Entity to render: assembly, namespace:<ns>, type:<Full.Name>,
    /// method|field|property|event:<Full.Type>::<name>
    #[arg(short, long, default_value = "assembly")]
    entity: EntitySelector,

    /// Render bodies, references and module contents
    #[arg(short, long)]
    full: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print the available languages and exit
    #[arg(long)]
    list_languages: bool,
}

fn render(
    language: &dyn Language,
    entity: &Entity<'_>,
    output: &mut dyn TextOutput,
    options: &DecompilationOptions,
) -> Result<()> {
    match entity {
        Entity::Assembly(assembly) => language.decompile_assembly(assembly, output, options),
        Entity::Namespace(namespace, types) => {
            language.decompile_namespace(namespace, types, output, options)
        }
        Entity::Type(ty) => language.decompile_type(ty, output, options),
        Entity::Method(method) => language.decompile_method(method, output, options),
        Entity::Field(field) => language.decompile_field(field, output, options),
        Entity::Property(property) => language.decompile_property(property, output, options),
        Entity::Event(event) => language.decompile_event(event, output, options),
    }
    .with_context(|| format!("Failed to render with language {}", language))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let languages = Languages::with_defaults();

    if args.list_languages {
        for language in languages.all() {
            println!("{}\t{}", language, language.file_extension());
        }
        return Ok(());
    }

    let language = languages.get(&args.language).ok_or_else(|| {
        anyhow!(
            "Unknown language `{}`; available: {}",
            args.language,
            languages.names().join(", ")
        )
    })?;

    let input = args
        .input
        .as_deref()
        .ok_or_else(|| anyhow!("No input file given"))?;
    let assembly = AssemblyLoader::load_file(input)?;
    let entity = args.entity.resolve(&assembly)?;
    info!(language = language.name(), entity = ?args.entity, "rendering");

    let options = DecompilationOptions {
        full_decompilation: args.full,
        ..DecompilationOptions::default()
    };

    match args.format {
        OutputFormat::Text => {
            let mut output = PlainTextOutput::new();
            render(language, &entity, &mut output, &options)?;
            print!("{}", output);
        }
        OutputFormat::Tokens => {
            let mut output = TokenTextOutput::new();
            render(language, &entity, &mut output, &options)?;
            for line in output.lines() {
                println!("{}", serde_json::to_string(&line.spans)?);
            }
        }
    }

    Ok(())
}
