use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use labtrack_client::config::{ClientConfig, ConfigError};
use labtrack_client::net::api::StorageKind;
use labtrack_client::net::types::{ChangeStatusRequest, MoveSampleRequest, SampleQuery, SampleStatus};
use labtrack_client::pages::dashboard::DashboardSummary;
use labtrack_client::pages::login::{LoginError, LoginForm};
use labtrack_client::pages::sample_form::{SampleForm, SampleFormError};
use labtrack_client::storage::StorageError;
use labtrack_client::{ApiError, AppContext};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{}", .0.user_message(&.0.to_string()))]
    Api(#[from] ApiError),
    #[error("{}", .0.message())]
    Login(#[from] LoginError),
    #[error("{}", .0.message())]
    SampleForm(#[from] SampleFormError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("not signed in; run `labtrack login` first")]
    NotSignedIn,
}

#[derive(Parser, Debug)]
#[command(name = "labtrack", about = "LabTrack sample-tracking client")]
struct Cli {
    /// API base URL, e.g. `http://localhost:3000/api`.
    #[arg(long, env = "LABTRACK_API_URL")]
    api_url: Option<String>,

    /// Where the session and tokens are persisted between runs.
    #[arg(long, env = "LABTRACK_STATE_FILE")]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "LABTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Show the persisted session without touching the network.
    Whoami,
    /// Re-read the profile from the server and store it.
    Me,
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
    /// Check a role or permission against the current session.
    Can {
        #[arg(long, conflicts_with = "permission", required_unless_present = "permission")]
        role: Option<String>,
        #[arg(long)]
        permission: Option<String>,
    },
    /// Resolve a path through the route guard.
    Route { path: String },
    Dashboard,
    Lab(LabCommand),
    Sample(SampleCommand),
    Storage(StorageCommand),
}

#[derive(Args, Debug)]
struct LabCommand {
    #[command(subcommand)]
    command: LabSubcommand,
}

#[derive(Subcommand, Debug)]
enum LabSubcommand {
    List,
    Current,
    Get {
        id: String,
    },
    Stats {
        id: String,
    },
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: String,
        #[arg(long)]
        data: String,
    },
}

#[derive(Args, Debug)]
struct SampleCommand {
    #[command(subcommand)]
    command: SampleSubcommand,
}

#[derive(Subcommand, Debug)]
enum SampleSubcommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = labtrack_client::net::types::DEFAULT_PAGE_SIZE)]
        limit: u32,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<SampleStatus>,
    },
    Get {
        id: String,
    },
    Barcode {
        barcode: String,
    },
    History {
        id: String,
    },
    Expiring {
        #[arg(long)]
        days: Option<u32>,
    },
    Create(SampleFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: SampleFields,
    },
    Move {
        id: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Status {
        id: String,
        #[arg(value_parser = parse_status)]
        status: SampleStatus,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete {
        id: String,
    },
    Types,
}

#[derive(Args, Debug, Default)]
struct SampleFields {
    #[arg(long)]
    barcode: Option<String>,
    #[arg(long)]
    patient_code: Option<String>,
    #[arg(long)]
    request_code: Option<String>,
    #[arg(long)]
    sample_type: Option<String>,
    #[arg(long)]
    volume_ml: Option<String>,
    /// `YYYY-MM-DDTHH:MM` (UTC) or RFC 3339.
    #[arg(long)]
    collected_at: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339.
    #[arg(long)]
    expires_on: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct StorageCommand {
    #[command(subcommand)]
    command: StorageSubcommand,
}

#[derive(Subcommand, Debug)]
enum StorageSubcommand {
    Hierarchy,
    Occupancy,
    List {
        kind: KindArg,
    },
    Get {
        kind: KindArg,
        id: String,
    },
    Create {
        kind: KindArg,
        #[arg(long)]
        data: String,
    },
    Update {
        kind: KindArg,
        id: String,
        #[arg(long)]
        data: String,
    },
    Positions {
        #[arg(long)]
        box_id: Option<String>,
    },
    Block {
        position_id: String,
    },
    Unblock {
        position_id: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Room,
    Freezer,
    Box,
}

impl From<KindArg> for StorageKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Room => Self::Room,
            KindArg::Freezer => Self::Freezer,
            KindArg::Box => Self::Box,
        }
    }
}

fn parse_status(raw: &str) -> Result<SampleStatus, String> {
    SampleStatus::parse(raw).ok_or_else(|| {
        let known = SampleStatus::ALL.map(SampleStatus::as_str).join(", ");
        format!("unknown status `{raw}` (expected one of {known})")
    })
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.api_url.as_deref(), cli.state_file)?;
    let app = AppContext::new(&config)?;

    match cli.command {
        Command::Login { username, password } => run_login(&app, &username, &password).await,
        Command::Logout => {
            let route = app.logout().await;
            println!("signed out; now at {route}");
            Ok(())
        }
        Command::Whoami => print_json(&json!({
            "isAuthenticated": app.session.is_authenticated(),
            "user": app.session.user(),
        })),
        Command::Me => {
            require_session(&app)?;
            let user = app.refresh_profile().await?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::ChangePassword { current, new } => {
            require_session(&app)?;
            let response = app.api.auth().change_password(&current, &new).await?;
            print_json(&response.body)
        }
        Command::Can { role, permission } => {
            let allowed = match (role, permission) {
                (Some(role), _) => app.session.has_role(&role),
                (None, Some(permission)) => app.session.has_permission(&permission),
                (None, None) => false,
            };
            println!("{allowed}");
            Ok(())
        }
        Command::Route { path } => {
            let route = app.navigator.navigate(&path);
            println!("{route}\t{}", route.title());
            Ok(())
        }
        Command::Dashboard => {
            require_session(&app)?;
            let summary = DashboardSummary::load(&app.session, &app.api).await;
            print_json(&serde_json::to_value(summary)?)
        }
        Command::Lab(lab) => run_lab(&app, lab).await,
        Command::Sample(sample) => run_sample(&app, sample).await,
        Command::Storage(storage) => run_storage(&app, storage).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("labtrack=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(api_url: Option<&str>, state_file: Option<PathBuf>) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = api_url {
        config = config.with_api_url(api_url)?;
    }
    if let Some(state_file) = state_file {
        config.state_file = state_file;
    }
    Ok(config)
}

fn require_session(app: &AppContext) -> Result<(), CliError> {
    if app.session.is_authenticated() { Ok(()) } else { Err(CliError::NotSignedIn) }
}

async fn run_login(app: &AppContext, username: &str, password: &str) -> Result<(), CliError> {
    let form = LoginForm::new(username, password);
    let route = form.submit(&app.session, &app.api).await?;
    let route = app.navigator.navigate(route.path());
    let name = app.session.user().map(|user| user.full_name).unwrap_or_default();
    println!("signed in as {name}; now at {route}");
    Ok(())
}

async fn run_lab(app: &AppContext, lab: LabCommand) -> Result<(), CliError> {
    require_session(app)?;
    let api = app.api.laboratories();
    let response = match lab.command {
        LabSubcommand::List => api.list().await?,
        LabSubcommand::Current => api.current().await?,
        LabSubcommand::Get { id } => api.get(&id).await?,
        LabSubcommand::Stats { id } => api.statistics(&id).await?,
        LabSubcommand::Create { data } => api.create(&parse_data(&data)?).await?,
        LabSubcommand::Update { id, data } => api.update(&id, &parse_data(&data)?).await?,
    };
    print_json(&response.body)
}

async fn run_sample(app: &AppContext, sample: SampleCommand) -> Result<(), CliError> {
    require_session(app)?;
    let api = app.api.samples();
    let response = match sample.command {
        SampleSubcommand::List { page, limit, search, status } => {
            api.list(&SampleQuery { page, limit, search, status }).await?
        }
        SampleSubcommand::Get { id } => api.get(&id).await?,
        SampleSubcommand::Barcode { barcode } => api.by_barcode(&barcode).await?,
        SampleSubcommand::History { id } => api.history(&id).await?,
        SampleSubcommand::Expiring { days } => api.expiring(days).await?,
        SampleSubcommand::Create(fields) => {
            let body = fields.apply(SampleForm::new()).submit(&app.api).await?;
            return print_json(&body);
        }
        SampleSubcommand::Update { id, fields } => {
            let existing = api.get(&id).await?.body;
            let mut form = SampleForm::edit(&existing);
            form.sample_id = Some(id);
            let body = fields.apply(form).submit(&app.api).await?;
            return print_json(&body);
        }
        SampleSubcommand::Move { id, to, reason, notes } => {
            let body = MoveSampleRequest { to_position_id: &to, reason: reason.as_deref(), notes: notes.as_deref() };
            api.move_to(&id, &body).await?
        }
        SampleSubcommand::Status { id, status, reason, notes } => {
            let body = ChangeStatusRequest { status, reason: reason.as_deref(), notes: notes.as_deref() };
            api.change_status(&id, &body).await?
        }
        SampleSubcommand::Delete { id } => api.delete(&id).await?,
        SampleSubcommand::Types => api.sample_types().await?,
    };
    print_json(&response.body)
}

impl SampleFields {
    /// Overlay the flags that were given onto `form`.
    fn apply(self, mut form: SampleForm) -> SampleForm {
        let slots = [
            (self.barcode, &mut form.barcode),
            (self.patient_code, &mut form.patient_code),
            (self.request_code, &mut form.request_code),
            (self.sample_type, &mut form.sample_type_id),
            (self.volume_ml, &mut form.volume_ml),
            (self.collected_at, &mut form.collection_datetime),
            (self.expires_on, &mut form.expiration_date),
            (self.notes, &mut form.notes),
        ];
        for (value, slot) in slots {
            if let Some(value) = value {
                *slot = value;
            }
        }
        form
    }
}

async fn run_storage(app: &AppContext, storage: StorageCommand) -> Result<(), CliError> {
    require_session(app)?;
    let api = app.api.storage();
    let response = match storage.command {
        StorageSubcommand::Hierarchy => api.hierarchy().await?,
        StorageSubcommand::Occupancy => api.occupancy().await?,
        StorageSubcommand::List { kind } => api.list(kind.into()).await?,
        StorageSubcommand::Get { kind, id } => api.get(kind.into(), &id).await?,
        StorageSubcommand::Create { kind, data } => api.create(kind.into(), &parse_data(&data)?).await?,
        StorageSubcommand::Update { kind, id, data } => api.update(kind.into(), &id, &parse_data(&data)?).await?,
        StorageSubcommand::Positions { box_id } => api.available_positions(box_id.as_deref()).await?,
        StorageSubcommand::Block { position_id } => api.set_position_blocked(&position_id, true).await?,
        StorageSubcommand::Unblock { position_id } => api.set_position_blocked(&position_id, false).await?,
    };
    print_json(&response.body)
}

fn parse_data(data: &str) -> Result<Value, CliError> {
    Ok(serde_json::from_str::<Value>(data)?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
