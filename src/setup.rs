// Setup flow: menu, prompts, then organization -> project -> wait -> key ->
// env file, strictly in that order. Each step either feeds the next one or
// ends the run with a `SetupOutcome`; nothing is retried and a project that
// was created is never deleted again.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::api::{find_public_key, ApiError, CreateProjectRequest, ManagementApi, Project};
use crate::config::Config;
use crate::envfile::{EnvFile, SaveOutcome, KEY_VAR, URL_VAR};
use crate::region;
use crate::ui::{MessageStyle, UserInterface};

const TOKENS_PAGE: &str = "https://supabase.com/dashboard/account/tokens";

/// How a run ended. Only missing secrets and an unusable organization are
/// failures as far as the exit status goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    Completed { url: String, env_file: SaveOutcome },
    /// The project exists but its public key could not be fetched.
    KeyUnavailable { url: String },
    ProjectNotCreated,
    MissingToken,
    MissingPassword,
    NoOrganization,
    OrganizationLookupFailed,
    ManualGuide,
    InvalidChoice,
}

impl SetupOutcome {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SetupOutcome::MissingToken
                | SetupOutcome::MissingPassword
                | SetupOutcome::NoOrganization
                | SetupOutcome::OrganizationLookupFailed
        )
    }

    pub fn exit_status(&self) -> u8 {
        if self.is_fatal() {
            1
        } else {
            0
        }
    }
}

/// Entry point of the interactive tool: shows the menu and runs the chosen
/// option to completion.
pub fn main_menu(
    ui: &dyn UserInterface,
    api: &dyn ManagementApi,
    config: &Config,
) -> Result<SetupOutcome> {
    print_header(ui);
    ui.print("Choose an option:");
    ui.print("1. Create project via API (requires access token)");
    ui.print("2. Manual setup guide (create via web dashboard)");
    ui.print("");

    let choice = ui.prompt_input("Enter choice (1 or 2)")?;
    match choice.trim() {
        "1" => create_via_api(ui, api, config),
        "2" => {
            print_manual_guide(ui);
            Ok(SetupOutcome::ManualGuide)
        }
        _ => {
            ui.print("Invalid choice. Exiting.");
            Ok(SetupOutcome::InvalidChoice)
        }
    }
}

fn print_header(ui: &dyn UserInterface) {
    let rule = "=".repeat(60);
    ui.print(&rule);
    ui.print_styled("🚀 Supabase Project Creation Helper", MessageStyle::Bold);
    ui.print(&rule);
    ui.print("");
}

/// Asks for every input, then talks to the API.
pub fn create_via_api(
    ui: &dyn UserInterface,
    api: &dyn ManagementApi,
    config: &Config,
) -> Result<SetupOutcome> {
    let token = match read_access_token(ui)? {
        Some(token) => token,
        None => {
            ui.print_styled("❌ Token is required!", MessageStyle::Error);
            return Ok(SetupOutcome::MissingToken);
        }
    };

    let name = ui
        .prompt_input(&format!(
            "Project name (default: {})",
            config.default_project_name
        ))
        .context("Reading project name")?;
    let name = match name.trim() {
        "" => config.default_project_name.clone(),
        given => given.to_string(),
    };

    let password = ui
        .prompt_secret("Database password")
        .context("Reading database password")?;
    let password = password.trim();
    if password.is_empty() {
        ui.print_styled("❌ Database password is required!", MessageStyle::Error);
        return Ok(SetupOutcome::MissingPassword);
    }

    ui.print("");
    ui.print("Available regions:");
    for line in region::menu_lines() {
        ui.print(&line);
    }
    let answer = ui
        .prompt_input(&format!(
            "Select region (1-{}, default: 1)",
            region::REGIONS.len()
        ))
        .context("Reading region")?;
    let region = region::parse_choice(&answer);

    let organization_id = match resolve_organization(ui, api, &token, config) {
        Ok(id) => id,
        Err(outcome) => return Ok(outcome),
    };

    let request = CreateProjectRequest::free(&name, &organization_id, region.code, password);
    let project = match create_project(ui, api, &token, &request) {
        Some(project) => project,
        None => return Ok(SetupOutcome::ProjectNotCreated),
    };

    finish_setup(ui, api, &token, &project, config)
}

fn read_access_token(ui: &dyn UserInterface) -> Result<Option<String>> {
    ui.print(
        "To create a project via API, you need a Supabase access token.",
    );
    ui.print("");
    ui.print("How to get your access token:");
    ui.print(&format!("1. Go to {}", TOKENS_PAGE));
    ui.print("2. Click 'Generate New Token'");
    ui.print("3. Copy the token");
    ui.print("");

    let token = ui
        .prompt_secret("Enter your Supabase access token")
        .context("Reading access token")?;
    let token = token.trim();
    Ok((!token.is_empty()).then(|| token.to_string()))
}

/// Uses the configured organization or the first one the token can see.
/// Any failure here ends the run.
fn resolve_organization(
    ui: &dyn UserInterface,
    api: &dyn ManagementApi,
    token: &str,
    config: &Config,
) -> std::result::Result<String, SetupOutcome> {
    if let Some(id) = &config.organization_id {
        info!(organization = %id, "using configured organization");
        return Ok(id.clone());
    }

    match api.list_organizations(token) {
        Ok(orgs) => match orgs.into_iter().next() {
            Some(org) => {
                ui.print_styled(
                    &format!("✓ Found organization: {}", org.name),
                    MessageStyle::Success,
                );
                Ok(org.id)
            }
            None => {
                ui.print_styled(
                    "❌ No organizations found. Please create one in Supabase dashboard first.",
                    MessageStyle::Error,
                );
                Err(SetupOutcome::NoOrganization)
            }
        },
        Err(err) => {
            report_api_error(
                ui,
                "❌ Error fetching organizations",
                &err,
                MessageStyle::Error,
            );
            Err(SetupOutcome::OrganizationLookupFailed)
        }
    }
}

fn create_project(
    ui: &dyn UserInterface,
    api: &dyn ManagementApi,
    token: &str,
    request: &CreateProjectRequest,
) -> Option<Project> {
    ui.print("");
    ui.print(&format!("📦 Creating project '{}'...", request.name));
    ui.print("   This may take 2-3 minutes...");

    match api.create_project(token, request) {
        Ok(project) => {
            ui.print_styled("✅ Project created successfully!", MessageStyle::Success);
            Some(project)
        }
        Err(err) => {
            report_api_error(ui, "❌ Error creating project", &err, MessageStyle::Error);
            None
        }
    }
}

/// Waits, fetches the public key and writes the env file, or explains how
/// to do it by hand when the key is not available yet.
fn finish_setup(
    ui: &dyn UserInterface,
    api: &dyn ManagementApi,
    token: &str,
    project: &Project,
    config: &Config,
) -> Result<SetupOutcome> {
    let url = project.url();

    ui.print("");
    ui.print("📋 Project Details:");
    ui.print(&format!("   ID: {}", project.id));
    ui.print(&format!("   URL: {}", url));
    ui.print(&format!("   Status: {}", project.status));
    ui.print("");
    ui.print("⏳ Waiting for project to be ready...");
    ui.print("   (This may take 2-3 minutes)");
    ui.wait("Waiting before fetching API keys...", config.key_wait);

    let anon_key = match fetch_public_key(ui, api, token, &project.id) {
        Some(key) => key,
        None => {
            print_manual_key_instructions(ui, project, &url, &config.env_file);
            return Ok(SetupOutcome::KeyUnavailable { url });
        }
    };

    let env_file = EnvFile::new(&config.env_file);
    let saved = env_file.save(&url, &anon_key, |path| {
        ui.print("");
        ui.confirm(&format!("⚠️  {} already exists. Overwrite?", path.display()))
            .context("Reading overwrite confirmation")
    })?;

    match saved {
        SaveOutcome::Kept => ui.print("Keeping existing file."),
        SaveOutcome::Written => {
            ui.print("");
            ui.print_styled(
                &format!("✅ Saved credentials to {}", env_file.path().display()),
                MessageStyle::Success,
            );
            ui.print("");
            ui.print_styled("⚠️  Remember to:", MessageStyle::Warning);
            ui.print(&format!(
                "   1. Add {} to .gitignore",
                env_file.path().display()
            ));
            ui.print(
                "   2. Set these as environment variables in Vercel for production",
            );
        }
    }

    ui.print("");
    ui.print_styled("✅ Setup complete!", MessageStyle::Success);
    ui.print("");
    ui.print("📝 Next steps:");
    ui.print("   1. Wait 2-3 minutes for project to fully initialize");
    ui.print(&format!("   2. Go to {}", project.dashboard_url()));
    ui.print(
        "   3. Run the SQL schema from supabase-schema.sql in SQL Editor",
    );
    ui.print("   4. Test locally: npm run dev");

    Ok(SetupOutcome::Completed {
        url,
        env_file: saved,
    })
}

/// One lookup, no polling. Failures are reported and turn into `None`.
fn fetch_public_key(
    ui: &dyn UserInterface,
    api: &dyn ManagementApi,
    token: &str,
    project_id: &str,
) -> Option<String> {
    match api.list_api_keys(token, project_id) {
        Ok(keys) => {
            let found = find_public_key(&keys).map(str::to_string);
            if found.is_none() {
                warn!(
                    project = %project_id,
                    keys = keys.len(),
                    "no anon or public key in response"
                );
            }
            found
        }
        Err(err @ ApiError::Status { .. }) => {
            report_api_error(
                ui,
                "⚠️  Could not fetch API keys",
                &err,
                MessageStyle::Warning,
            );
            None
        }
        Err(err) => {
            ui.print_styled(
                &format!("⚠️  Error fetching API keys: {}", err),
                MessageStyle::Warning,
            );
            None
        }
    }
}

fn print_manual_key_instructions(
    ui: &dyn UserInterface,
    project: &Project,
    url: &str,
    env_file: &Path,
) {
    ui.print("");
    ui.print_styled(
        "⚠️  Could not fetch API key automatically.",
        MessageStyle::Warning,
    );
    ui.print("   Please get it manually from:");
    ui.print(&format!("   {}", project.api_settings_url()));
    ui.print("");
    ui.print(&format!("   Then create {} with:", env_file.display()));
    ui.print(&format!("   {}={}", URL_VAR, url));
    ui.print(&format!("   {}=<your-anon-key>", KEY_VAR));
}

/// Prints the status line then the body exactly as the server sent it.
fn report_api_error(ui: &dyn UserInterface, what: &str, err: &ApiError, style: MessageStyle) {
    warn!(error = %err, "{}", what);
    match err {
        ApiError::Status { status, body } => {
            ui.print_styled(&format!("{}: {}", what, status), style);
            ui.print(body);
        }
        other => ui.print_styled(&format!("{}: {}", what, other), style),
    }
}

pub fn print_manual_guide(ui: &dyn UserInterface) {
    let rule = "=".repeat(60);
    ui.print("");
    ui.print(&rule);
    ui.print_styled("📖 Manual Setup Guide", MessageStyle::Bold);
    ui.print(&rule);
    ui.print("");
    ui.print("1. Go to https://supabase.com/dashboard");
    ui.print("2. Click 'New Project'");
    ui.print("3. Fill in project details");
    ui.print("4. Get your credentials from Settings → API");
    ui.print("5. Run: ./setup-supabase.sh");
    ui.print("");
    ui.print("Or see QUICK_START.md for detailed instructions");
}
