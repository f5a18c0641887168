//! MockThis CLI
//!
//! Command-line interface for creating and managing mock endpoints.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mockthis::{
    check_country, check_descriptor, check_email, check_full_name, check_github_handle,
    flatten_into, load_endpoint_file, normalize, normalize_patch, prompt_until_valid,
    registration, ApiClient, ApiError, ConfigError, FlagSet, HandshakeTiming, LoginHandshake,
    SessionError, SessionStore, DEFAULT_API_URL,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mockthis")]
#[command(about = "Create and manage MockThis mock endpoints")]
#[command(version)]
struct Cli {
    /// API base URL
    #[arg(long, global = true, env = "MOCKTHIS_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Directory holding the stored session (default: ~/.mockthis)
    #[arg(long, global = true, env = "MOCKTHIS_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with a one-time email link
    Login {
        /// Account email (prompted if omitted)
        email: Option<String>,
    },

    /// Register a new account, then log in
    Register {
        /// Full name (prompted if omitted)
        #[arg(long)]
        name: Option<String>,

        /// Email (prompted if omitted)
        #[arg(long)]
        email: Option<String>,

        /// GitHub handle (prompted if omitted)
        #[arg(long)]
        github_handle: Option<String>,

        /// 2-letter country code (prompted if omitted)
        #[arg(long)]
        country: Option<String>,
    },

    /// Create a mock endpoint from flags and/or a JSON/YAML file
    Create {
        #[command(flatten)]
        endpoint: EndpointArgs,
    },

    /// List your endpoints
    List,

    /// Show one endpoint by id or mock identifier
    Get {
        /// Endpoint id or mock identifier
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::List)]
        output: OutputFormat,
    },

    /// Update the fields given on the command line or in a file
    Update {
        /// Endpoint id
        id: String,

        #[command(flatten)]
        endpoint: EndpointArgs,
    },

    /// Delete an endpoint
    Delete {
        /// Endpoint id
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    List,
    Table,
    Json,
}

/// Endpoint flags shared by `create` and `update`.
#[derive(Args)]
struct EndpointArgs {
    /// JSON or YAML file with a top-level `endpoint` mapping
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// HTTP method (default: GET)
    #[arg(long)]
    method: Option<String>,

    /// Response status code, 100-599 (default: 200)
    #[arg(long)]
    http_status: Option<String>,

    /// Response Content-Type (default: application/json)
    #[arg(long)]
    content_type: Option<String>,

    /// Response charset (default: UTF-8)
    #[arg(long)]
    charset: Option<String>,

    /// Response headers: JSON object or key=value pairs
    #[arg(long)]
    headers: Option<String>,

    /// JSON Schema for the response body
    #[arg(long)]
    schema: Option<String>,

    /// Response body
    #[arg(long)]
    body: Option<String>,

    /// Auth scheme: basic, api-key, bearer-token, oauth2, jwt
    #[arg(long)]
    auth_type: Option<String>,

    /// Auth properties: JSON object or key=value pairs
    #[arg(long)]
    auth_properties: Option<String>,

    /// Expected request Content-Type
    #[arg(long)]
    request_content_type: Option<String>,

    /// JSON Schema for the request body
    #[arg(long)]
    request_schema: Option<String>,

    /// Print the request body instead of sending it
    #[arg(long)]
    dry_run: bool,
}

impl EndpointArgs {
    fn explicit(&self) -> [(&'static str, Option<&String>); 11] {
        [
            ("method", self.method.as_ref()),
            ("http-status", self.http_status.as_ref()),
            ("content-type", self.content_type.as_ref()),
            ("charset", self.charset.as_ref()),
            ("headers", self.headers.as_ref()),
            ("schema", self.schema.as_ref()),
            ("body", self.body.as_ref()),
            ("auth-type", self.auth_type.as_ref()),
            ("auth-properties", self.auth_properties.as_ref()),
            ("request-content-type", self.request_content_type.as_ref()),
            ("request-schema", self.request_schema.as_ref()),
        ]
    }

    /// File values first, then explicit flags on top.
    fn flags(&self) -> Result<FlagSet, ConfigError> {
        let mut flags = FlagSet::endpoint();
        if let Some(path) = &self.file {
            let endpoint = load_endpoint_file(path)?;
            flatten_into(&endpoint, &mut flags)?;
        }
        for (name, value) in self.explicit() {
            if let Some(value) = value {
                flags.set(name, value.as_str())?;
            }
        }
        Ok(flags)
    }
}

/// Global settings every command needs.
struct Context {
    api_url: String,
    config_dir: Option<PathBuf>,
}

impl Context {
    fn store(&self) -> Result<SessionStore, u8> {
        match &self.config_dir {
            Some(dir) => Ok(SessionStore::new(dir)),
            None => SessionStore::default_location().map_err(report),
        }
    }

    fn client(&self) -> Result<ApiClient, u8> {
        ApiClient::new(self.api_url.as_str()).map_err(report)
    }

    /// Client carrying the stored session token.
    fn authorized_client(&self) -> Result<ApiClient, u8> {
        let session = self.store()?.load().map_err(report)?;
        Ok(self.client()?.with_token(session.token))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context {
        api_url: cli.api_url,
        config_dir: cli.config_dir,
    };

    let result = match cli.command {
        Commands::Login { email } => run_login(&ctx, email).await,
        Commands::Register {
            name,
            email,
            github_handle,
            country,
        } => run_register(&ctx, RegisterArgs {
            name,
            email,
            github_handle,
            country,
        })
        .await,
        Commands::Create { endpoint } => run_create(&ctx, &endpoint).await,
        Commands::List => run_list(&ctx).await,
        Commands::Get { id, output } => run_get(&ctx, &id, output).await,
        Commands::Update { id, endpoint } => run_update(&ctx, &id, &endpoint).await,
        Commands::Delete { id } => run_delete(&ctx, &id).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "mockthis=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("MOCKTHIS_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

trait Failure: Display {
    fn exit_code(&self) -> i32;
}

impl Failure for ApiError {
    fn exit_code(&self) -> i32 {
        ApiError::exit_code(self)
    }
}

impl Failure for SessionError {
    fn exit_code(&self) -> i32 {
        SessionError::exit_code(self)
    }
}

impl Failure for ConfigError {
    fn exit_code(&self) -> i32 {
        ConfigError::exit_code(self)
    }
}

/// Print an error to stderr and return its exit code.
fn report<E: Failure>(e: E) -> u8 {
    eprintln!("Error: {}", e);
    e.exit_code() as u8
}

fn report_config(e: ConfigError) -> u8 {
    if let ConfigError::SchemaMismatch { errors } = &e {
        eprintln!("Error: {}:", e);
        for error in errors {
            eprintln!("  {}", error);
        }
        return e.exit_code() as u8;
    }
    report(e)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), u8> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;
    println!("{}", json);
    Ok(())
}

async fn run_create(ctx: &Context, args: &EndpointArgs) -> Result<(), u8> {
    let flags = args.flags().map_err(report_config)?;
    let descriptor = normalize(&flags).map_err(report_config)?;
    check_descriptor(&descriptor).map_err(report_config)?;

    if args.dry_run {
        return print_json(&descriptor);
    }

    let client = ctx.authorized_client()?;
    let created = client.create_endpoint(&descriptor).await.map_err(report)?;
    println!("Endpoint created successfully!");
    println!("Mock URL: {}", created.mock_url);
    Ok(())
}

async fn run_update(ctx: &Context, id: &str, args: &EndpointArgs) -> Result<(), u8> {
    let flags = args.flags().map_err(report_config)?;
    let patch = normalize_patch(&flags).map_err(report_config)?;

    if args.dry_run {
        return print_json(&patch);
    }

    let client = ctx.authorized_client()?;
    let updated = client.update_endpoint(id, &patch).await.map_err(report)?;
    println!("Endpoint updated successfully!");
    if !updated.is_null() {
        print_json(&updated)?;
    }
    Ok(())
}

async fn run_list(ctx: &Context) -> Result<(), u8> {
    let client = ctx.authorized_client()?;
    let endpoints = client.list_endpoints().await.map_err(report)?;
    print_json(&endpoints)
}

async fn run_get(ctx: &Context, id: &str, output: OutputFormat) -> Result<(), u8> {
    let client = ctx.authorized_client()?;
    let endpoint = client.find_endpoint(id).await.map_err(report)?;

    match output {
        OutputFormat::Json => print_json(&endpoint)?,
        OutputFormat::List => print_details(&endpoint),
        OutputFormat::Table => print_table(&endpoint),
    }
    Ok(())
}

async fn run_delete(ctx: &Context, id: &str) -> Result<(), u8> {
    let client = ctx.authorized_client()?;
    client.delete_endpoint(id).await.map_err(report)?;
    println!("Endpoint deleted successfully!");
    Ok(())
}

const DETAIL_FIELDS: &[(&str, &str)] = &[
    ("ID", "id"),
    ("Mock Identifier", "mockIdentifier"),
    ("Method", "method"),
    ("HTTP Status", "httpStatus"),
    ("Created At", "createdAt"),
    ("Endpoint URL", "endpointUrl"),
    ("Response Content Type", "responseContentType"),
    ("Charset", "charset"),
    ("Response Body", "responseBody"),
];

/// Render a record field for display; strings without quotes, missing as empty.
fn field_text(endpoint: &Value, key: &str) -> String {
    match endpoint.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn print_details(endpoint: &Value) {
    println!("Endpoint Details:");
    for (label, key) in DETAIL_FIELDS {
        println!("{}: {}", label, field_text(endpoint, key));
    }

    if let Some(headers) = endpoint.get("httpHeaders").and_then(Value::as_object) {
        println!("HTTP Headers:");
        for (name, value) in headers {
            println!("  {}: {}", name, value.as_str().map_or_else(|| value.to_string(), String::from));
        }
    }

    if let Some(auth) = endpoint.get("authCredentials").and_then(Value::as_object) {
        println!("Auth Credentials:");
        for (name, value) in auth {
            println!("  {}: {}", name, value.as_str().map_or_else(|| value.to_string(), String::from));
        }
    }

    if let Some(curl) = endpoint.get("curl").and_then(Value::as_str) {
        println!("CURL: {}", curl);
    }
}

fn print_table(endpoint: &Value) {
    println!("| Key | Value |");
    println!("|-----|-------|");
    for (label, key) in DETAIL_FIELDS {
        println!("| {} | {} |", label, field_text(endpoint, key));
    }
}

/// Read one answer per prompt from stdin until it passes `check`.
fn ask<F>(question: &str, check: F) -> Result<String, u8>
where
    F: Fn(&str) -> Result<String, ConfigError>,
{
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    prompt_until_valid(&mut input, &mut output, question, check).map_err(|e| {
        eprintln!("Error reading input: {}", e);
        3u8
    })
}

/// Use the flag value if given (it must be valid), else prompt.
fn given_or_ask<F>(given: Option<String>, question: &str, check: F) -> Result<String, u8>
where
    F: Fn(&str) -> Result<String, ConfigError>,
{
    match given {
        Some(value) => check(value.as_str()).map_err(report_config),
        None => ask(question, check),
    }
}

async fn run_login(ctx: &Context, email: Option<String>) -> Result<(), u8> {
    let email = given_or_ask(email, "Enter your email", check_email)?;
    login(ctx, &email).await
}

async fn login(ctx: &Context, email: &str) -> Result<(), u8> {
    let store = ctx.store()?;
    let mut handshake = LoginHandshake::new(ctx.client()?, HandshakeTiming::default());

    let ticket = handshake.begin(email).await.map_err(report)?;
    if !ticket.message.is_empty() {
        println!("{}", ticket.message);
    }
    println!("Please check your email and click the magic link.");
    io::stdout().flush().map_err(|_| 3u8)?;

    let session = handshake.await_verification().await.map_err(report)?;
    store.save(&session).map_err(report)?;
    println!("Login successful!");
    Ok(())
}

struct RegisterArgs {
    name: Option<String>,
    email: Option<String>,
    github_handle: Option<String>,
    country: Option<String>,
}

async fn run_register(ctx: &Context, args: RegisterArgs) -> Result<(), u8> {
    let full_name = given_or_ask(args.name, "Enter your full name", check_full_name)?;
    let email = given_or_ask(args.email, "Enter your email", check_email)?;
    let github_handle = given_or_ask(args.github_handle, "Enter your GitHub handle", check_github_handle)?;
    let country = given_or_ask(args.country, "Enter your country (2-letter code)", check_country)?;

    let registration =
        registration(&full_name, &email, &github_handle, &country).map_err(report_config)?;
    let message = ctx
        .client()?
        .register(&registration)
        .await
        .map_err(report)?;
    if !message.is_empty() {
        println!("{}", message);
    }

    login(ctx, &registration.email).await
}
