//! Application wiring and command handlers.
//!
//! `App` loads the configuration, builds the per-origin session store and the
//! API client, and subscribes to session events. Each subcommand is one
//! handler that calls the client and prints through `ui::render`.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use vision_core::api::{ApiClient, FilePart};
use vision_core::auth::{CredentialStore, SessionEvent, SessionStore};
use vision_core::config::{origin_slug, Config};
use vision_core::models::{
    AdminPropertyFilter, AppointmentFilters, DashboardStats, NewAppointment, PropertyFilters,
    PropertyForm, UserForm,
};

use crate::ui::{prompt, render};
use crate::{Commands, LeadCommands, PropertyCommands, PropertyFields, UserCommands};

const USERNAME_ENV: &str = "VISION_USERNAME";
const PASSWORD_ENV: &str = "VISION_PASSWORD";

const NOT_LOGGED_IN: &str = "Not logged in. Run `vision login` first.";

pub struct App {
    config: Config,
    client: ApiClient,
    json: bool,
}

impl App {
    pub fn new(json: bool) -> Result<Self> {
        let mut config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        config.apply_env();
        debug!(api_url = %config.api_url(), "Config loaded");

        let storage = config
            .session_storage()
            .context("Could not locate session storage")?;
        debug!(dir = ?storage.dir(), "Session storage configured");

        let session = Arc::new(SessionStore::new(storage));
        let client = ApiClient::from_config(&config, session)?;

        client.subscribe(|event| match event {
            SessionEvent::Expired { endpoint } => {
                debug!(endpoint = %endpoint, "Session expired");
                eprintln!("Your session has expired. Run `vision login` to sign in again.");
            }
            SessionEvent::LoggedIn { username } => info!(username = %username, "Session started"),
            SessionEvent::LoggedOut => info!("Session ended"),
        });

        Ok(Self { config, client, json })
    }

    pub async fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Login { username, remember } => self.login(username, remember).await,
            Commands::Logout { forget } => {
                self.logout(forget);
                Ok(())
            }
            Commands::Whoami => self.whoami().await,
            Commands::Home => self.home().await,
            Commands::Search {
                location,
                property_type,
                max_price,
            } => self.search(location, property_type, max_price).await,
            Commands::Show { id } => self.show(&id).await,
            Commands::Interest {
                property_id,
                name,
                phone,
                email,
                message,
            } => {
                let lead = NewAppointment {
                    property_id,
                    client_name: name,
                    client_phone: phone,
                    client_email: email,
                    client_message: message,
                };
                self.interest(lead).await
            }
            Commands::Dashboard => self.dashboard().await,
            Commands::Properties { action } => self.properties(action).await,
            Commands::Leads { action } => self.leads(action).await,
            Commands::Users { action } => self.users(action).await,
            Commands::Config {
                api_url,
                asset_url,
                timeout,
            } => self.configure(api_url, asset_url, timeout),
        }
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Print `value` as JSON in `--json` mode, otherwise the rendered text.
    fn output<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }

    fn done(&self, message: &str) {
        if !self.json {
            println!("{}", message);
        }
    }

    fn require_login(&self) -> Result<()> {
        if !self.client.is_authenticated() {
            anyhow::bail!(NOT_LOGGED_IN);
        }
        Ok(())
    }

    /// Keychain scope for remembered passwords
    fn origin(&self) -> String {
        origin_slug(&self.config.api_url())
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    async fn login(&mut self, username: Option<String>, remember: bool) -> Result<()> {
        let origin = self.origin();

        let username = match username.or_else(|| non_empty_env(USERNAME_ENV)) {
            Some(username) => username,
            None => prompt::prompt_username(self.config.last_username.as_deref())?,
        };

        let password = match non_empty_env(PASSWORD_ENV) {
            Some(password) => password,
            None => Self::stored_or_prompted_password(&origin, &username)?,
        };

        if password.is_empty() {
            anyhow::bail!("Username and password required");
        }

        eprintln!("Authenticating...");
        let session = self.client.login(&username, &password).await?;

        if remember {
            if let Err(e) = CredentialStore::store(&origin, &username, &password) {
                warn!(error = %e, "Failed to store credentials");
            }
        }

        self.config.last_username = Some(username.clone());
        if let Err(e) = remember_username(&username) {
            warn!(error = %e, "Failed to save config");
        }

        let name = session
            .user
            .as_ref()
            .map(|u| u.display_name().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or(username);
        self.done(&format!("Logged in as {}", name));
        Ok(())
    }

    fn stored_or_prompted_password(origin: &str, username: &str) -> Result<String> {
        if CredentialStore::has_credentials(origin, username)
            && prompt::confirm("Use stored password?", true)?
        {
            return CredentialStore::get_password(origin, username);
        }
        prompt::prompt_password("Password")
    }

    fn logout(&self, forget: bool) {
        self.client.logout();

        if forget {
            if let Some(username) = &self.config.last_username {
                if let Err(e) = CredentialStore::delete(&self.origin(), username) {
                    warn!(error = %e, "Failed to remove stored credentials");
                }
            }
        }
        self.done("Logged out.");
    }

    async fn whoami(&self) -> Result<()> {
        self.require_login()?;
        let user = self.client.me().await?;
        self.output(&user, || render::user_profile(&user))
    }

    // =========================================================================
    // Public pages
    // =========================================================================

    async fn home(&self) -> Result<()> {
        let properties = self.client.featured_properties().await?.into_data()?;
        let asset_base = self.config.asset_base_url();
        self.output(&properties, || {
            render::property_cards(&properties, &asset_base, "Nenhum imóvel em destaque no momento.")
        })
    }

    async fn search(
        &self,
        location: Option<String>,
        property_type: Option<String>,
        max_price: Option<String>,
    ) -> Result<()> {
        let filters = PropertyFilters::from_search(
            location.as_deref().unwrap_or_default(),
            property_type.as_deref().unwrap_or_default(),
            max_price.as_deref().unwrap_or_default(),
        );
        let properties = self.client.list_properties(&filters).await?.into_data()?;
        let asset_base = self.config.asset_base_url();
        self.output(&properties, || {
            render::property_cards(&properties, &asset_base, "Nenhum imóvel encontrado.")
        })
    }

    async fn show(&self, id: &str) -> Result<()> {
        let property = self.client.get_property(id).await?.into_data()?;
        let asset_base = self.config.asset_base_url();
        self.output(&property, || render::property_detail(&property, &asset_base))
    }

    async fn interest(&self, lead: NewAppointment) -> Result<()> {
        if lead.client_name.trim().is_empty() || lead.client_phone.trim().is_empty() {
            anyhow::bail!("Name and phone are required");
        }
        let response = self.client.create_appointment(&lead).await?;
        self.output(&response, || {
            "Thanks! A broker will contact you soon.".to_string()
        })
    }

    // =========================================================================
    // Admin panel
    // =========================================================================

    async fn dashboard(&self) -> Result<()> {
        self.require_login()?;

        let user = match self.client.me().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Failed to load profile for dashboard");
                if !e.is_session_expired() {
                    self.client.logout();
                }
                return Err(e).context("Could not load your profile; please log in again");
            }
        };

        // Leads are admin-only; fetch them alongside the listings
        let all_properties = PropertyFilters::default();
        let all_leads = AppointmentFilters::default();
        let (properties, leads) = futures::join!(
            self.client.list_properties(&all_properties),
            async {
                if user.is_admin() {
                    Some(self.client.list_appointments(&all_leads).await)
                } else {
                    None
                }
            }
        );

        let properties = properties?.into_data()?;
        let leads = match leads {
            Some(Ok(response)) => response.into_data().ok(),
            Some(Err(e)) => {
                warn!(error = %e, "Failed to load leads for dashboard");
                None
            }
            None => None,
        };

        let stats = DashboardStats::compute(&properties, leads.as_deref());
        self.output(&stats, || render::dashboard(&user, &stats))
    }

    async fn properties(&self, action: PropertyCommands) -> Result<()> {
        self.require_login()?;

        match action {
            PropertyCommands::List {
                search,
                property_type,
                status,
            } => {
                let properties = self
                    .client
                    .list_properties(&PropertyFilters::default())
                    .await?
                    .into_data()?;
                let filter = AdminPropertyFilter {
                    search,
                    property_type,
                    status,
                };
                let visible = filter.apply(&properties);
                self.output(&visible, || render::admin_property_table(&visible))
            }
            PropertyCommands::Create { fields } => {
                if fields.title.is_none() || fields.price.is_none() || fields.location.is_none() {
                    anyhow::bail!("--title, --price and --location are required");
                }
                let form = property_form(fields)?;
                let created = self.client.create_property(&form).await?.into_data()?;
                info!(id = %created.id, "Property created");
                self.output(&created, || format!("Created property {}", created.id))
            }
            PropertyCommands::Update { id, fields } => {
                let form = property_form(fields)?;
                if form.is_empty() {
                    anyhow::bail!("Nothing to update");
                }
                let response = self.client.update_property(&id, &form).await?;
                self.output(&response, || format!("Updated property {}", id))
            }
            PropertyCommands::Activate { id } => self.set_active(&id, true).await,
            PropertyCommands::Deactivate { id } => self.set_active(&id, false).await,
            PropertyCommands::Delete { id, yes } => {
                if !yes && !prompt::confirm(&format!("Delete property {}?", id), false)? {
                    return Ok(());
                }
                let response = self.client.delete_property(&id).await?;
                self.output(&response, || format!("Deleted property {}", id))
            }
        }
    }

    async fn set_active(&self, id: &str, active: bool) -> Result<()> {
        let response = self.client.set_property_active(id, active).await?;
        self.output(&response, || {
            if active {
                format!("Property {} is now visible", id)
            } else {
                format!("Property {} is now hidden", id)
            }
        })
    }

    async fn leads(&self, action: LeadCommands) -> Result<()> {
        self.require_login()?;

        match action {
            LeadCommands::List { status, property } => {
                let filters = AppointmentFilters {
                    status,
                    property_id: property,
                };
                let leads = self.client.list_appointments(&filters).await?.into_data()?;
                self.output(&leads, || render::leads(&leads))
            }
            LeadCommands::Show { id } => {
                let lead = self.client.get_appointment(&id).await?.into_data()?;
                self.output(&lead, || render::lead_card(&lead))
            }
            LeadCommands::Status { id, status } => {
                let response = self.client.update_appointment_status(&id, &status).await?;
                self.output(&response, || format!("Lead {} marked as {}", id, status))
            }
            LeadCommands::Delete { id, yes } => {
                if !yes && !prompt::confirm(&format!("Delete lead {}?", id), false)? {
                    return Ok(());
                }
                let response = self.client.delete_appointment(&id).await?;
                self.output(&response, || format!("Deleted lead {}", id))
            }
        }
    }

    async fn users(&self, action: UserCommands) -> Result<()> {
        self.require_login()?;

        match action {
            UserCommands::List => {
                let users = self.client.list_users().await?.into_data()?;
                self.output(&users, || render::users_table(&users))
            }
            UserCommands::Brokers => {
                let brokers = self.client.list_brokers().await?.into_data()?;
                self.output(&brokers, || render::users_table(&brokers))
            }
            UserCommands::Show { id } => {
                let user = self.client.get_user(&id).await?.into_data()?;
                self.output(&user, || render::user_profile(&user))
            }
            UserCommands::Create {
                name,
                username,
                email,
                role,
            } => {
                let password = prompt::prompt_password("Password for the new account")?;
                if password.is_empty() {
                    anyhow::bail!("A password is required for new accounts");
                }
                let form = UserForm {
                    name: Some(name),
                    username: Some(username),
                    email: Some(email).filter(|e| !e.is_empty()),
                    role: Some(role),
                    password: None,
                }
                .with_password(Some(password));

                let created = self.client.create_user(&form).await?.into_data()?;
                self.output(&created, || {
                    format!("Created {} {}", created.role, created.username)
                })
            }
            UserCommands::Update {
                id,
                name,
                username,
                email,
                role,
                password,
            } => {
                let new_password = if password {
                    Some(prompt::prompt_password("New password (blank keeps the current one)")?)
                } else {
                    None
                };
                let form = UserForm {
                    name,
                    username,
                    email,
                    role,
                    password: None,
                }
                .with_password(new_password);
                if form == UserForm::default() {
                    anyhow::bail!("Nothing to update");
                }

                let response = self.client.update_user(&id, &form).await?;
                self.output(&response, || format!("Updated user {}", id))
            }
            UserCommands::Delete { id, yes } => {
                let users = self.client.list_users().await?.into_data()?;
                if let Some(target) = users.iter().find(|u| u.id == id.as_str()) {
                    if !target.can_delete(&users) {
                        anyhow::bail!("Cannot delete the last administrator");
                    }
                }
                if !yes && !prompt::confirm(&format!("Delete user {}?", id), false)? {
                    return Ok(());
                }
                let response = self.client.delete_user(&id).await?;
                self.output(&response, || format!("Deleted user {}", id))
            }
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    fn configure(
        &mut self,
        api_url: Option<String>,
        asset_url: Option<String>,
        timeout: Option<u64>,
    ) -> Result<()> {
        let mut stored = Config::load()?;
        let changed = api_url.is_some() || asset_url.is_some() || timeout.is_some();

        if let Some(url) = api_url {
            stored.api_url = Some(url);
        }
        if let Some(url) = asset_url {
            stored.asset_base_url = Some(url);
        }
        if let Some(secs) = timeout {
            stored.request_timeout_secs = Some(secs);
        }

        if changed {
            stored.save().context("Failed to save config")?;
            info!("Config updated");
        }
        stored.apply_env();
        self.config = stored;

        let summary = ConfigSummary {
            api_url: self.config.api_url(),
            asset_base_url: self.config.asset_base_url(),
            request_timeout_secs: self.config.request_timeout().map(|t| t.as_secs()),
            last_username: self.config.last_username.clone(),
        };
        self.output(&summary, || {
            let timeout = summary
                .request_timeout_secs
                .map(|s| format!("{}s", s))
                .unwrap_or_else(|| "none".to_string());
            [
                format!("API URL:    {}", summary.api_url),
                format!("Images:     {}", summary.asset_base_url),
                format!("Timeout:    {}", timeout),
                format!("Last login: {}", summary.last_username.as_deref().unwrap_or("-")),
            ]
            .join("\n")
        })
    }
}

#[derive(Serialize)]
struct ConfigSummary {
    api_url: String,
    asset_base_url: String,
    request_timeout_secs: Option<u64>,
    last_username: Option<String>,
}

/// Record the last username in the stored config, leaving environment
/// overrides out of the file.
fn remember_username(username: &str) -> Result<()> {
    let mut stored = Config::load()?;
    stored.last_username = Some(username.to_string());
    stored.save()
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Build the multipart form for a create or update, reading image files.
fn property_form(fields: PropertyFields) -> Result<PropertyForm> {
    let images = fields
        .images
        .iter()
        .map(|path| {
            FilePart::from_path(path).with_context(|| format!("Failed to read image {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PropertyForm {
        title: fields.title,
        description: fields.description,
        property_type: fields.property_type,
        price: fields.price,
        location: fields.location,
        area: fields.area,
        bedrooms: fields.bedrooms,
        bathrooms: fields.bathrooms,
        garages: fields.garages,
        active: None,
        images,
    })
}
