//! Local Schema CLI
//!
//! Command-line interface for building schema.org JSON-LD documents.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use local_schema::{
    build, build_raw, extract, load_form, load_place, render, script_tag, suggested_file_name,
    BlankPolicy, BuildOptions, Cardinality, Config, EntityKind, ExtractOptions, FormField,
    FormState, History, LocationField, Notice, Shape, Snapshot, DEFAULT_HISTORY_PATH,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "local-schema")]
#[command(about = "Generate schema.org JSON-LD for local and medical businesses")]
#[command(version)]
struct Cli {
    /// Place-lookup API key, appended to lookup URLs
    #[arg(long, env = "LOCAL_SCHEMA_PLACES_KEY", hide_env_values = true, global = true)]
    places_key: Option<String>,

    /// History file
    #[arg(
        long,
        env = "LOCAL_SCHEMA_HISTORY",
        default_value = DEFAULT_HISTORY_PATH,
        global = true
    )]
    history_file: PathBuf,

    /// Remote history collection URL
    #[arg(long, env = "LOCAL_SCHEMA_HISTORY_URL", global = true)]
    history_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ShapeArgs {
    /// Document flavor: medical, local-business or service
    #[arg(long, default_value = "medical")]
    flavor: String,

    /// Medical entity: practitioner or clinic
    #[arg(long, default_value = "practitioner")]
    entity: String,

    /// Medical locations: single or multiple
    #[arg(long, default_value = "single")]
    cardinality: String,

    /// Business type tag for the local-business flavor (repeatable)
    #[arg(long = "business-type")]
    business_types: Vec<String>,
}

impl ShapeArgs {
    fn shape(&self) -> Result<Shape, u8> {
        match self.flavor.as_str() {
            "medical" => {
                let entity = EntityKind::parse(&self.entity).ok_or_else(|| {
                    eprintln!(
                        "Error: unknown entity \"{}\": expected practitioner or clinic",
                        self.entity
                    );
                    2u8
                })?;
                let cardinality = Cardinality::parse(&self.cardinality).ok_or_else(|| {
                    eprintln!(
                        "Error: unknown cardinality \"{}\": expected single or multiple",
                        self.cardinality
                    );
                    2u8
                })?;
                Ok(Shape::medical(entity, cardinality))
            }
            "local-business" => Ok(Shape::local_business(self.business_types.iter().cloned())),
            "service" => Ok(Shape::Service),
            other => {
                eprintln!(
                    "Error: unknown flavor \"{}\": expected medical, local-business or service",
                    other
                );
                Err(2)
            }
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default form for a shape
    Init {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Build a JSON-LD document from a form
    Build {
        /// Form source: file path or URL (http:// or https://)
        form: String,

        #[command(flatten)]
        shape: ShapeArgs,

        /// Fill blank fields with visible placeholders instead of omitting them
        #[arg(long)]
        placeholders: bool,

        /// Skip the final cleaning pass
        #[arg(long)]
        raw: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Wrap the document in a <script type="application/ld+json"> element
        #[arg(long)]
        embed: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Extract address fields from a place record
    Extract {
        /// Place source: file path or lookup URL
        place: String,

        /// Set areaServed to the resolved city
        #[arg(long)]
        area_served: bool,

        /// Also take phone number and website from the place
        #[arg(long)]
        details: bool,

        /// Merge the fields into this form file
        #[arg(long)]
        merge: Option<PathBuf>,

        /// Merge into the location at this index instead of the top level
        #[arg(long, requires = "merge")]
        location: Option<usize>,
    },

    /// Set one field of a form file
    Set {
        /// Form file to update
        form: PathBuf,

        /// Field name (e.g. name, city, instagram)
        field: String,

        /// New value
        value: String,

        /// Update the location at this index
        #[arg(long)]
        location: Option<usize>,
    },

    /// Manage saved snapshots
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Print the suggested file name for a shape's document
    FileName {
        #[command(flatten)]
        shape: ShapeArgs,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Build a form and save it with its document
    Save {
        /// Form source: file path or URL
        form: String,

        #[command(flatten)]
        shape: ShapeArgs,

        /// Snapshot name (defaults to the form's name)
        #[arg(long)]
        name: Option<String>,

        /// Build with placeholders
        #[arg(long)]
        placeholders: bool,
    },

    /// List snapshots, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a snapshot
    Delete {
        /// Snapshot id
        id: String,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::new()
        .places_key(cli.places_key)
        .history_path(cli.history_file)
        .history_url(cli.history_url);

    let result = match cli.command {
        Commands::Init { shape, output } => run_init(&shape, output.as_deref()),

        Commands::Build {
            form,
            shape,
            placeholders,
            raw,
            pretty,
            embed,
            output,
        } => run_build(BuildArgs {
            form,
            shape,
            placeholders,
            raw,
            pretty,
            embed,
            output,
        }),

        Commands::Extract {
            place,
            area_served,
            details,
            merge,
            location,
        } => run_extract(
            &config,
            &place,
            ExtractOptions {
                area_served,
                business_details: details,
            },
            merge.as_deref(),
            location,
        ),

        Commands::Set {
            form,
            field,
            value,
            location,
        } => run_set(&form, &field, value, location),

        Commands::History { action } => run_history(&config, action),

        Commands::FileName { shape } => shape.shape().map(|shape| {
            println!("{}", suggested_file_name(&shape));
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_init(shape: &ShapeArgs, output: Option<&Path>) -> Result<(), u8> {
    let shape = shape.shape()?;
    let form = FormState::for_shape(&shape);
    let content = serde_json::to_string_pretty(&form).map_err(|e| {
        eprintln!("Error serializing form: {}", e);
        2u8
    })?;
    write_output(output, &content)
}

struct BuildArgs {
    form: String,
    shape: ShapeArgs,
    placeholders: bool,
    raw: bool,
    pretty: bool,
    embed: bool,
    output: Option<PathBuf>,
}

fn run_build(args: BuildArgs) -> Result<(), u8> {
    let shape = args.shape.shape()?;
    let form = load_form(&args.form).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let options = build_options(args.placeholders);
    let document = if args.raw {
        build_raw(&shape, &form, &options)
    } else {
        build(&shape, &form, &options)
    };

    let content = if args.embed {
        script_tag(&document, args.pretty)
    } else {
        render(&document, args.pretty)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    write_output(args.output.as_deref(), &content)
}

fn run_extract(
    config: &Config,
    source: &str,
    options: ExtractOptions,
    merge: Option<&Path>,
    location: Option<usize>,
) -> Result<(), u8> {
    let place = load_place(source, &config.places).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let fields = extract(&place, &options);
    if !fields.is_complete() {
        eprintln!("warning: place is missing street, city or coordinates; fill them in with `set`");
    }

    if let Some(path) = merge {
        let mut form = load_form_file(path)?;
        match location {
            Some(index) => location_at(&mut form, index)?.apply_place(&fields),
            None => form.apply_place(&fields),
        }
        return save_form(path, &form);
    }

    let content = serde_json::to_string_pretty(&fields).map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;
    println!("{}", content);
    Ok(())
}

fn run_set(path: &Path, field: &str, value: String, location: Option<usize>) -> Result<(), u8> {
    let mut form = load_form_file(path)?;

    match location {
        Some(index) => {
            let field = LocationField::parse(field).ok_or_else(|| unknown_field(field))?;
            location_at(&mut form, index)?.set(field, value);
        }
        None => {
            let field = FormField::parse(field).ok_or_else(|| unknown_field(field))?;
            form.set(field, value);
        }
    }

    save_form(path, &form)
}

fn run_history(config: &Config, action: HistoryAction) -> Result<(), u8> {
    let history = History::from_config(config);

    match action {
        HistoryAction::Save {
            form: source,
            shape,
            name,
            placeholders,
        } => {
            let shape = shape.shape()?;
            let form = load_form(&source).map_err(|e| {
                eprintln!("Error: {}", e);
                e.exit_code() as u8
            })?;
            let document = build(&shape, &form, &build_options(placeholders));
            let name = name
                .filter(|n| !n.trim().is_empty())
                .or_else(|| Some(form.name.trim().to_string()).filter(|n| !n.is_empty()))
                .unwrap_or_else(|| shape.label());

            let saved = history
                .save(Snapshot::new(name, shape, form, document))
                .map_err(store_failure)?;
            report_notice(saved.notice.as_ref());
            println!("{}", saved.value.id);
            Ok(())
        }

        HistoryAction::List { json } => {
            let listed = history.list().map_err(store_failure)?;
            report_notice(listed.notice.as_ref());

            if json {
                let content = serde_json::to_string_pretty(&listed.value).map_err(|e| {
                    eprintln!("Error serializing output: {}", e);
                    2u8
                })?;
                println!("{}", content);
            } else {
                for snapshot in &listed.value {
                    println!(
                        "{}  {}  {:<22}  {}{}",
                        snapshot.id,
                        snapshot.created_at.format("%Y-%m-%d %H:%M"),
                        snapshot.shape.label(),
                        snapshot.name,
                        if snapshot.synced { "  (synced)" } else { "" }
                    );
                }
            }
            Ok(())
        }

        HistoryAction::Delete { id } => {
            let deleted = history.delete(&id).map_err(store_failure)?;
            report_notice(deleted.notice.as_ref());
            Ok(())
        }
    }
}

fn build_options(placeholders: bool) -> BuildOptions {
    let policy = if placeholders {
        BlankPolicy::Placeholder
    } else {
        BlankPolicy::Omit
    };
    BuildOptions::new().blank_policy(policy)
}

fn load_form_file(path: &Path) -> Result<FormState, u8> {
    let source = path.to_string_lossy();
    load_form(&source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn save_form(path: &Path, form: &FormState) -> Result<(), u8> {
    let content = serde_json::to_string_pretty(form).map_err(|e| {
        eprintln!("Error serializing form: {}", e);
        2u8
    })?;
    std::fs::write(path, content).map_err(|e| {
        eprintln!("Error writing to {}: {}", path.display(), e);
        3u8
    })
}

fn location_at(form: &mut FormState, index: usize) -> Result<&mut local_schema::Location, u8> {
    let count = form.locations.len();
    form.location_mut(index).ok_or_else(|| {
        eprintln!(
            "Error: no location at index {} (form has {})",
            index, count
        );
        1u8
    })
}

fn unknown_field(field: &str) -> u8 {
    eprintln!("Error: unknown field \"{}\"", field);
    2
}

fn store_failure(e: local_schema::StoreError) -> u8 {
    eprintln!("Error: {}", e);
    e.exit_code() as u8
}

fn report_notice(notice: Option<&Notice>) {
    if let Some(notice) = notice {
        eprintln!("notice: {}", notice);
    }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), u8> {
    match output {
        Some(path) => std::fs::write(path, content).map_err(|e| {
            eprintln!("Error writing to {}: {}", path.display(), e);
            3u8
        }),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
