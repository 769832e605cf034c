use crate::identity::{IdentityState, MountOutcome};
use crate::models::ProjectStatus;
use crate::navigation::{FORGOT_PASSWORD_ROUTE, HOME_ROUTE, SIGN_IN_ROUTE};
use crate::services::{
    AcceptInvitationRequest, CategoryClient, CategoryForm, DesignClient, DesignForm,
    ForgotPasswordRequest, OrderClient, ProductClient, ProductForm, ProjectClient, ProjectForm,
    ResetPasswordRequest, SignInRequest, TimelineClient, TimelineForm,
};
use crate::views::{RecordView, ViewScope};
use crate::Console;
use anyhow::{bail, Context, Result};
use api_core::{ApiClient, ApiError, Upload};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "admin-console")]
#[command(about = "Archflaire admin console", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Request a password reset email
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password using the emailed reset token
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirmation: String,
    },
    /// Inspect or accept an invitation
    Invitation {
        #[command(subcommand)]
        action: InvitationAction,
    },
    /// List records of a resource
    List {
        #[arg(value_enum)]
        resource: Resource,
        /// Page for paginated resources (orders, designs)
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show one record
    Show {
        #[arg(value_enum)]
        resource: Resource,
        id: u64,
    },
    /// Create a record
    Create {
        #[command(subcommand)]
        record: CreateRecord,
    },
    /// Update a record; every field is sent, so pass the full record
    Update {
        #[command(subcommand)]
        record: UpdateRecord,
    },
    /// Delete one record
    Delete {
        #[arg(value_enum)]
        resource: Resource,
        id: u64,
    },
    /// Project timeline entries
    Timeline {
        #[command(subcommand)]
        action: TimelineAction,
    },
    /// Remove a single image from a design
    DeleteDesignImage { image_id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum InvitationAction {
    Verify {
        token: String,
    },
    Accept {
        token: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirmation: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TimelineAction {
    Show { project_id: u64, timeline_id: u64 },
    Delete { project_id: u64, timeline_id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum CreateRecord {
    Category(CategoryArgs),
    Product(ProductArgs),
    Project(ProjectArgs),
    Timeline {
        project_id: u64,
        #[command(flatten)]
        fields: TimelineArgs,
    },
    Design(DesignArgs),
}

#[derive(Subcommand, Debug)]
pub enum UpdateRecord {
    Category {
        id: u64,
        #[command(flatten)]
        fields: CategoryArgs,
    },
    Product {
        id: u64,
        #[command(flatten)]
        fields: ProductArgs,
        /// Storage path of an existing image to remove (repeatable)
        #[arg(long = "delete-image")]
        delete_images: Vec<String>,
    },
    Project {
        id: u64,
        #[command(flatten)]
        fields: ProjectArgs,
    },
    Timeline {
        project_id: u64,
        timeline_id: u64,
        #[command(flatten)]
        fields: TimelineArgs,
        /// Id of an existing image to keep (repeatable); others are dropped
        #[arg(long = "keep-image")]
        keep_images: Vec<u64>,
    },
    Design {
        id: u64,
        #[command(flatten)]
        fields: DesignArgs,
    },
}

#[derive(Args, Debug)]
pub struct CategoryArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub inactive: bool,
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ProductArgs {
    #[arg(long)]
    pub category_id: u64,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: f64,
    #[arg(long)]
    pub stock_quantity: i64,
    #[arg(long)]
    pub sku: String,
    #[arg(long)]
    pub inactive: bool,
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub start_date: NaiveDate,
    /// YYYY-MM-DD
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    /// pending, in_progress or completed
    #[arg(long, default_value = "pending", value_parser = parse_status)]
    pub status: ProjectStatus,
}

#[derive(Args, Debug)]
pub struct TimelineArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date: NaiveDate,
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DesignArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,
}

fn parse_status(value: &str) -> Result<ProjectStatus, String> {
    [
        ProjectStatus::Pending,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
    ]
    .into_iter()
    .find(|status| status.as_str() == value)
    .ok_or_else(|| format!("unknown status `{}`", value))
}

async fn read_upload(path: &Path) -> Result<Upload> {
    Upload::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn read_uploads(paths: &[PathBuf]) -> Result<Vec<Upload>> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        uploads.push(read_upload(path).await?);
    }
    Ok(uploads)
}

impl CategoryArgs {
    async fn into_form(self) -> Result<CategoryForm> {
        let image = match &self.image {
            Some(path) => Some(read_upload(path).await?),
            None => None,
        };
        Ok(CategoryForm {
            name: self.name,
            description: self.description,
            is_active: !self.inactive,
            image,
        })
    }
}

impl ProductArgs {
    async fn into_form(self) -> Result<ProductForm> {
        let images = read_uploads(&self.images).await?;
        Ok(ProductForm {
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            price: self.price,
            stock_quantity: self.stock_quantity,
            sku: self.sku,
            is_active: !self.inactive,
            images,
        })
    }
}

impl ProjectArgs {
    fn into_form(self) -> ProjectForm {
        ProjectForm {
            title: self.title,
            description: self.description,
            location: self.location,
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status,
        }
    }
}

impl TimelineArgs {
    async fn into_form(self) -> Result<TimelineForm> {
        let images = read_uploads(&self.images).await?;
        Ok(TimelineForm {
            title: self.title,
            description: self.description,
            timeline_date: self.date,
            images,
        })
    }
}

impl DesignArgs {
    async fn into_form(self) -> Result<DesignForm> {
        let images = read_uploads(&self.images).await?;
        Ok(DesignForm {
            title: self.title,
            description: self.description,
            images,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Resource {
    Categories,
    Products,
    Orders,
    Projects,
    Designs,
}

impl Resource {
    fn plural(&self) -> &'static str {
        match self {
            Resource::Categories => "categories",
            Resource::Products => "products",
            Resource::Orders => "orders",
            Resource::Projects => "projects",
            Resource::Designs => "designs",
        }
    }

    fn singular(&self) -> &'static str {
        match self {
            Resource::Categories => "category",
            Resource::Products => "product",
            Resource::Orders => "order",
            Resource::Projects => "project",
            Resource::Designs => "design",
        }
    }
}

/// Keeps the server's message as the headline and the error as the cause.
fn fail(err: ApiError, fallback: &str) -> anyhow::Error {
    let message = err.user_message(fallback);
    anyhow::Error::new(err).context(message)
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Prints the saved record when the server echoes it back.
fn print_saved<W: Write, T: Serialize>(out: &mut W, record: Option<T>, what: &str) -> Result<()> {
    match record {
        Some(record) => print_json(out, &record),
        None => {
            writeln!(out, "{} saved", what)?;
            Ok(())
        }
    }
}

/// Loads one record through a view slot, the way a detail screen does.
async fn show_record<W, K, T, F, Fut>(
    console: &Console,
    out: &mut W,
    key: K,
    fallback: &str,
    fetch: F,
) -> Result<()>
where
    W: Write,
    K: Clone,
    T: Clone + Serialize,
    F: FnOnce(ApiClient) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let scope = ViewScope::new();
    let view = RecordView::new(&scope, console.api());
    let record = view.load(key, fetch).await.map_err(|e| fail(e, fallback))?;
    print_json(out, &record)
}

pub async fn run<W: Write>(command: Commands, console: &Console, out: &mut W) -> Result<()> {
    match command {
        Commands::Login { email, password } => {
            let profile = console
                .auth()
                .sign_in(&SignInRequest { email, password })
                .await
                .map_err(|e| fail(e, "Invalid credentials"))?;
            writeln!(out, "Signed in as {}", profile.display_name)?;
            console.navigator().navigate(HOME_ROUTE);
        }
        Commands::Logout => {
            console.identity().logout().await;
            writeln!(out, "Signed out")?;
        }
        Commands::Whoami => {
            let mut identity = console.identity();
            let outcome = identity.mount().await;
            match identity.state() {
                IdentityState::Authenticated(profile) => {
                    writeln!(
                        out,
                        "{} ({}) {}",
                        identity.display_name(),
                        identity.initials(),
                        profile.role.as_deref().unwrap_or("")
                    )?;
                }
                _ => {
                    let note = match outcome {
                        MountOutcome::Rejected => "Session expired; sign in again",
                        MountOutcome::Unreachable => "Could not reach the API; session kept",
                        _ => "Not signed in",
                    };
                    writeln!(out, "{} ({})", identity.display_name(), note)?;
                }
            }
        }
        Commands::ForgotPassword { email } => {
            let message = console
                .auth()
                .forgot_password(&ForgotPasswordRequest { email })
                .await
                .map_err(|e| fail(e, "Failed to process password reset request"))?;
            writeln!(
                out,
                "{}",
                message.unwrap_or_else(|| "Password reset instructions sent to your email".into())
            )?;
            console.navigator().navigate(SIGN_IN_ROUTE);
        }
        Commands::ResetPassword {
            email,
            token,
            password,
            password_confirmation,
        } => {
            if token.trim().is_empty() || email.trim().is_empty() {
                console.navigator().navigate(FORGOT_PASSWORD_ROUTE);
                bail!("Invalid or expired password reset link");
            }
            let message = console
                .auth()
                .reset_password(&ResetPasswordRequest {
                    email,
                    token,
                    password,
                    password_confirmation,
                })
                .await
                .map_err(|e| fail(e, "Failed to reset password"))?;
            writeln!(
                out,
                "{}",
                message.unwrap_or_else(|| "Password reset successful".into())
            )?;
            console.navigator().navigate(SIGN_IN_ROUTE);
        }
        Commands::Invitation { action } => match action {
            InvitationAction::Verify { token } => {
                let invitation = console
                    .auth()
                    .verify_invitation(&token)
                    .await
                    .map_err(|e| fail(e, "Invalid or expired invitation"))?;
                writeln!(
                    out,
                    "Invited by {} as {} ({})",
                    invitation.client_name, invitation.role, invitation.email
                )?;
            }
            InvitationAction::Accept {
                token,
                name,
                password,
                password_confirmation,
            } => {
                let profile = console
                    .auth()
                    .accept_invitation(
                        &token,
                        &AcceptInvitationRequest {
                            name,
                            password,
                            password_confirmation,
                        },
                    )
                    .await
                    .map_err(|e| fail(e, "Registration failed"))?;
                writeln!(out, "Welcome, {}", profile.display_name)?;
                console.navigator().navigate(HOME_ROUTE);
            }
        },
        Commands::List { resource, page } => {
            let fallback = format!("Failed to load {}", resource.plural());
            match resource {
                Resource::Categories => {
                    let rows = console.categories().list().await.map_err(|e| fail(e, &fallback))?;
                    print_json(out, &rows)?;
                }
                Resource::Products => {
                    let rows = console.products().list().await.map_err(|e| fail(e, &fallback))?;
                    print_json(out, &rows)?;
                }
                Resource::Orders => {
                    let rows = console.orders().list(page).await.map_err(|e| fail(e, &fallback))?;
                    print_json(out, &rows)?;
                }
                Resource::Projects => {
                    let rows = console.projects().list().await.map_err(|e| fail(e, &fallback))?;
                    print_json(out, &rows)?;
                }
                Resource::Designs => {
                    let rows = console.designs().list(page).await.map_err(|e| fail(e, &fallback))?;
                    print_json(out, &rows)?;
                }
            }
        }
        Commands::Show { resource, id } => {
            let fallback = format!("Failed to fetch {} details", resource.singular());
            match resource {
                Resource::Categories => {
                    show_record(console, out, id, &fallback, move |api| async move {
                        CategoryClient::new(api).get(id).await
                    })
                    .await?
                }
                Resource::Products => {
                    show_record(console, out, id, &fallback, move |api| async move {
                        ProductClient::new(api).get(id).await
                    })
                    .await?
                }
                Resource::Orders => {
                    show_record(console, out, id, &fallback, move |api| async move {
                        OrderClient::new(api).get(id).await
                    })
                    .await?
                }
                Resource::Projects => {
                    show_record(console, out, id, &fallback, move |api| async move {
                        ProjectClient::new(api).get(id).await
                    })
                    .await?
                }
                Resource::Designs => {
                    show_record(console, out, id, &fallback, move |api| async move {
                        DesignClient::new(api).get(id).await
                    })
                    .await?
                }
            }
        }
        Commands::Create { record } => match record {
            CreateRecord::Category(fields) => {
                let saved = console
                    .categories()
                    .create(&fields.into_form().await?)
                    .await
                    .map_err(|e| fail(e, "Failed to create category. Please try again."))?;
                print_saved(out, saved, "Category")?;
            }
            CreateRecord::Product(fields) => {
                let saved = console
                    .products()
                    .create(&fields.into_form().await?)
                    .await
                    .map_err(|e| fail(e, "Failed to create product"))?;
                print_saved(out, saved, "Product")?;
            }
            CreateRecord::Project(fields) => {
                let saved = console
                    .projects()
                    .create(&fields.into_form())
                    .await
                    .map_err(|e| fail(e, "Failed to create project"))?;
                print_saved(out, saved, "Project")?;
            }
            CreateRecord::Timeline { project_id, fields } => {
                let saved = console
                    .timelines()
                    .create(project_id, &fields.into_form().await?)
                    .await
                    .map_err(|e| fail(e, "Failed to create timeline"))?;
                print_saved(out, saved, "Timeline")?;
            }
            CreateRecord::Design(fields) => {
                let saved = console
                    .designs()
                    .create(&fields.into_form().await?)
                    .await
                    .map_err(|e| fail(e, "Failed to create design"))?;
                print_saved(out, saved, "Design")?;
            }
        },
        Commands::Update { record } => match record {
            UpdateRecord::Category { id, fields } => {
                let saved = console
                    .categories()
                    .update(id, &fields.into_form().await?)
                    .await
                    .map_err(|e| fail(e, "Failed to update category"))?;
                print_saved(out, saved, "Category")?;
            }
            UpdateRecord::Product {
                id,
                fields,
                delete_images,
            } => {
                let saved = console
                    .products()
                    .update(id, &fields.into_form().await?, &delete_images)
                    .await
                    .map_err(|e| fail(e, "Failed to update product"))?;
                print_saved(out, saved, "Product")?;
            }
            UpdateRecord::Project { id, fields } => {
                let saved = console
                    .projects()
                    .update(id, &fields.into_form())
                    .await
                    .map_err(|e| fail(e, "Failed to update project"))?;
                print_saved(out, saved, "Project")?;
            }
            UpdateRecord::Timeline {
                project_id,
                timeline_id,
                fields,
                keep_images,
            } => {
                let saved = console
                    .timelines()
                    .update(
                        project_id,
                        timeline_id,
                        &fields.into_form().await?,
                        &keep_images,
                    )
                    .await
                    .map_err(|e| fail(e, "Failed to update timeline"))?;
                print_saved(out, saved, "Timeline")?;
            }
            UpdateRecord::Design { id, fields } => {
                let saved = console
                    .designs()
                    .update(id, &fields.into_form().await?)
                    .await
                    .map_err(|e| fail(e, "Failed to update design"))?;
                print_saved(out, saved, "Design")?;
            }
        },
        Commands::Delete { resource, id } => {
            let fallback = format!("Failed to delete {}", resource.singular());
            let message = match resource {
                Resource::Categories => console.categories().delete(id).await,
                Resource::Products => console.products().delete(id).await,
                Resource::Projects => console.projects().delete(id).await,
                Resource::Designs => console.designs().delete(id).await,
                Resource::Orders => bail!("orders cannot be deleted"),
            }
            .map_err(|e| fail(e, &fallback))?;
            writeln!(
                out,
                "{}",
                message.unwrap_or_else(|| format!("Deleted {} {}", resource.singular(), id))
            )?;
        }
        Commands::Timeline { action } => match action {
            TimelineAction::Show {
                project_id,
                timeline_id,
            } => {
                show_record(
                    console,
                    out,
                    (project_id, timeline_id),
                    "Failed to fetch timeline details",
                    move |api| async move { TimelineClient::new(api).get(project_id, timeline_id).await },
                )
                .await?;
            }
            TimelineAction::Delete {
                project_id,
                timeline_id,
            } => {
                let message = console
                    .timelines()
                    .delete(project_id, timeline_id)
                    .await
                    .map_err(|e| fail(e, "Failed to delete timeline"))?;
                writeln!(
                    out,
                    "{}",
                    message.unwrap_or_else(|| format!("Deleted timeline {}", timeline_id))
                )?;
            }
        },
        Commands::DeleteDesignImage { image_id } => {
            let message = console
                .designs()
                .delete_image(image_id)
                .await
                .map_err(|e| fail(e, "Failed to delete image"))?;
            writeln!(
                out,
                "{}",
                message.unwrap_or_else(|| format!("Deleted image {}", image_id))
            )?;
        }
    }

    Ok(())
}
